/// Hindley-Milner type inference over the AST.
///
/// Types live in an arena keyed by integer id; a type variable carries an
/// optional bound instance, updated on union with path compression on find.
/// The checker is advisory: it never mutates the AST or touches the
/// evaluator's environments, and `check` collects errors per declaration
/// instead of aborting.
use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::ast::*;
use crate::location::Loc;

mod infer;

#[derive(Debug, Clone, Error)]
#[error("{loc}: error: {msg}")]
pub struct TypeError {
    pub msg: String,
    pub loc: Loc,
}

pub type TypeId = usize;

#[derive(Debug, Clone)]
pub enum Ty {
    /// Type variable; `instance` is the union-find parent link.
    Var { instance: Option<TypeId> },
    Int,
    Float,
    Bool,
    Str,
    Unit,
    Fn { params: Vec<TypeId>, ret: TypeId },
    List(TypeId),
    Tuple(Vec<TypeId>),
    Record(Vec<(String, TypeId)>),
    Map { key: TypeId, value: TypeId },
    Adt { name: String, args: Vec<TypeId> },
    /// Named generic ("a"-style); unifies with anything.
    Generic(String),
}

/// Polymorphic type: quantified variables plus the body type.
#[derive(Debug, Clone)]
pub struct Scheme {
    pub vars: Vec<TypeId>,
    pub ty: TypeId,
}

impl Scheme {
    fn mono(ty: TypeId) -> Self {
        Scheme {
            vars: Vec::new(),
            ty,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CtorSig {
    pub type_name: String,
    pub fields: Vec<TypeId>,
    pub ret: TypeId,
}

pub struct TypeChecker {
    arena: Vec<Ty>,
    scopes: Vec<HashMap<String, Scheme>>,
    ctors: HashMap<String, CtorSig>,
}

/// Run the advisory check over a whole program, collecting one error list.
pub fn check(program: &Program) -> Vec<TypeError> {
    TypeChecker::new().check_program(program)
}

impl TypeChecker {
    pub fn new() -> Self {
        let mut tc = TypeChecker {
            arena: Vec::new(),
            scopes: vec![HashMap::new()],
            ctors: HashMap::new(),
        };
        tc.register_builtins();
        tc
    }

    pub fn check_program(&mut self, program: &Program) -> Vec<TypeError> {
        let mut errors = Vec::new();
        for decl in &program.decls {
            if let Err(e) = self.check_decl(decl) {
                errors.push(e);
            }
        }
        errors
    }

    /// Infer a whole program, returning the type of the last expression
    /// declaration (Unit when there is none). Stops at the first error.
    pub fn infer_program(&mut self, program: &Program) -> Result<TypeId, TypeError> {
        let mut last = self.insert(Ty::Unit);
        for decl in &program.decls {
            match &decl.kind {
                DeclKind::Expr(expr) => last = self.infer_expr(expr)?,
                _ => self.check_decl(decl)?,
            }
        }
        Ok(last)
    }

    fn check_decl(&mut self, decl: &Decl) -> Result<(), TypeError> {
        match &decl.kind {
            DeclKind::Expr(expr) => {
                self.infer_expr(expr)?;
            }
            DeclKind::Type(td) => self.register_type_def(td),
            DeclKind::Module(md) => {
                self.push_scope();
                let result = md.body.iter().try_for_each(|e| self.infer_expr(e).map(|_| ()));
                self.pop_scope();
                result?;
            }
            // File imports are resolved at run time only
            DeclKind::Import { .. } => {}
        }
        Ok(())
    }

    /// Register constructor signatures: each constructor becomes a binding
    /// whose type is a function from its field types to the declaring ADT.
    fn register_type_def(&mut self, td: &TypeDef) {
        let args: Vec<TypeId> = td
            .params
            .iter()
            .map(|p| self.insert(Ty::Generic(p.clone())))
            .collect();
        let ret = self.insert(Ty::Adt {
            name: td.name.clone(),
            args,
        });

        for ctor in &td.ctors {
            let fields: Vec<TypeId> = ctor
                .fields
                .iter()
                .map(|te| self.resolve_type_expr(te))
                .collect();

            let binding_ty = if fields.is_empty() {
                ret
            } else {
                self.insert(Ty::Fn {
                    params: fields.clone(),
                    ret,
                })
            };
            self.define(&ctor.name, Scheme::mono(binding_ty));
            self.ctors.insert(
                ctor.name.clone(),
                CtorSig {
                    type_name: td.name.clone(),
                    fields,
                    ret,
                },
            );
        }
    }

    pub(crate) fn ctor_sig(&self, name: &str) -> Option<CtorSig> {
        self.ctors.get(name).cloned()
    }

    // -----------------------------------------------------------------------
    // Arena and environment
    // -----------------------------------------------------------------------

    pub(crate) fn insert(&mut self, ty: Ty) -> TypeId {
        self.arena.push(ty);
        self.arena.len() - 1
    }

    pub(crate) fn fresh_var(&mut self) -> TypeId {
        self.insert(Ty::Var { instance: None })
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub(crate) fn define(&mut self, name: &str, scheme: Scheme) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name.to_string(), scheme);
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Scheme> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
    }

    // -----------------------------------------------------------------------
    // Union-find
    // -----------------------------------------------------------------------

    /// Chase a variable's bound instance to its representative, compressing
    /// the path on the way back.
    pub(crate) fn find(&mut self, t: TypeId) -> TypeId {
        match self.arena[t] {
            Ty::Var {
                instance: Some(inst),
            } => {
                let root = self.find(inst);
                self.arena[t] = Ty::Var {
                    instance: Some(root),
                };
                root
            }
            _ => t,
        }
    }

    pub(crate) fn unify(&mut self, a: TypeId, b: TypeId, loc: &Loc) -> Result<(), TypeError> {
        let a = self.find(a);
        let b = self.find(b);
        if a == b {
            return Ok(());
        }

        match (self.arena[a].clone(), self.arena[b].clone()) {
            (Ty::Var { .. }, _) => {
                if self.occurs_in(a, b) {
                    return Err(TypeError {
                        msg: "Infinite type".to_string(),
                        loc: loc.clone(),
                    });
                }
                self.arena[a] = Ty::Var { instance: Some(b) };
                Ok(())
            }
            (_, Ty::Var { .. }) => {
                if self.occurs_in(b, a) {
                    return Err(TypeError {
                        msg: "Infinite type".to_string(),
                        loc: loc.clone(),
                    });
                }
                self.arena[b] = Ty::Var { instance: Some(a) };
                Ok(())
            }

            // Generic types unify with anything
            (Ty::Generic(_), _) | (_, Ty::Generic(_)) => Ok(()),

            (Ty::Int, Ty::Int)
            | (Ty::Float, Ty::Float)
            | (Ty::Bool, Ty::Bool)
            | (Ty::Str, Ty::Str)
            | (Ty::Unit, Ty::Unit) => Ok(()),

            (
                Ty::Fn {
                    params: p1,
                    ret: r1,
                },
                Ty::Fn {
                    params: p2,
                    ret: r2,
                },
            ) => {
                if p1.len() != p2.len() {
                    return Err(TypeError {
                        msg: "Function arity mismatch".to_string(),
                        loc: loc.clone(),
                    });
                }
                for (x, y) in p1.iter().zip(p2.iter()) {
                    self.unify(*x, *y, loc)?;
                }
                self.unify(r1, r2, loc)
            }

            (Ty::List(x), Ty::List(y)) => self.unify(x, y, loc),

            (Ty::Tuple(xs), Ty::Tuple(ys)) => {
                if xs.len() != ys.len() {
                    return Err(TypeError {
                        msg: "Tuple size mismatch".to_string(),
                        loc: loc.clone(),
                    });
                }
                for (x, y) in xs.iter().zip(ys.iter()) {
                    self.unify(*x, *y, loc)?;
                }
                Ok(())
            }

            (Ty::Record(xs), Ty::Record(ys)) => {
                if xs.len() != ys.len() {
                    return self.unify_mismatch(a, b, loc);
                }
                for (name, x) in &xs {
                    match ys.iter().find(|(n, _)| n == name) {
                        Some((_, y)) => self.unify(*x, *y, loc)?,
                        None => return self.unify_mismatch(a, b, loc),
                    }
                }
                Ok(())
            }

            (
                Ty::Map {
                    key: k1,
                    value: v1,
                },
                Ty::Map {
                    key: k2,
                    value: v2,
                },
            ) => {
                self.unify(k1, k2, loc)?;
                self.unify(v1, v2, loc)
            }

            (
                Ty::Adt {
                    name: n1,
                    args: a1,
                },
                Ty::Adt {
                    name: n2,
                    args: a2,
                },
            ) => {
                if n1 != n2 || a1.len() != a2.len() {
                    return self.unify_mismatch(a, b, loc);
                }
                for (x, y) in a1.iter().zip(a2.iter()) {
                    self.unify(*x, *y, loc)?;
                }
                Ok(())
            }

            _ => self.unify_mismatch(a, b, loc),
        }
    }

    fn unify_mismatch(&mut self, a: TypeId, b: TypeId, loc: &Loc) -> Result<(), TypeError> {
        let left = self.display(a);
        let right = self.display(b);
        Err(TypeError {
            msg: format!("Cannot unify {} with {}", left, right),
            loc: loc.clone(),
        })
    }

    /// Occurs check: does variable `var` appear inside `t`?
    fn occurs_in(&mut self, var: TypeId, t: TypeId) -> bool {
        let t = self.find(t);
        if t == var {
            return true;
        }
        match self.arena[t].clone() {
            Ty::Fn { params, ret } => {
                params.iter().any(|p| self.occurs_in(var, *p)) || self.occurs_in(var, ret)
            }
            Ty::List(elem) => self.occurs_in(var, elem),
            Ty::Tuple(items) => items.iter().any(|i| self.occurs_in(var, *i)),
            Ty::Record(fields) => fields.iter().any(|(_, f)| self.occurs_in(var, *f)),
            Ty::Map { key, value } => self.occurs_in(var, key) || self.occurs_in(var, value),
            Ty::Adt { args, .. } => args.iter().any(|a| self.occurs_in(var, *a)),
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Generalization and instantiation
    // -----------------------------------------------------------------------

    fn free_type_vars(&mut self, t: TypeId, out: &mut HashSet<TypeId>) {
        let t = self.find(t);
        match self.arena[t].clone() {
            Ty::Var { .. } => {
                out.insert(t);
            }
            Ty::Fn { params, ret } => {
                for p in params {
                    self.free_type_vars(p, out);
                }
                self.free_type_vars(ret, out);
            }
            Ty::List(elem) => self.free_type_vars(elem, out),
            Ty::Tuple(items) => {
                for i in items {
                    self.free_type_vars(i, out);
                }
            }
            Ty::Record(fields) => {
                for (_, f) in fields {
                    self.free_type_vars(f, out);
                }
            }
            Ty::Map { key, value } => {
                self.free_type_vars(key, out);
                self.free_type_vars(value, out);
            }
            Ty::Adt { args, .. } => {
                for a in args {
                    self.free_type_vars(a, out);
                }
            }
            _ => {}
        }
    }

    fn free_in_env(&mut self) -> HashSet<TypeId> {
        let mut out = HashSet::new();
        let schemes: Vec<Scheme> = self
            .scopes
            .iter()
            .flat_map(|scope| scope.values().cloned())
            .collect();
        for scheme in schemes {
            let mut free = HashSet::new();
            self.free_type_vars(scheme.ty, &mut free);
            for var in &scheme.vars {
                let var = self.find(*var);
                free.remove(&var);
            }
            out.extend(free);
        }
        out
    }

    /// Quantify the variables free in `ty` but not free in the environment.
    pub(crate) fn generalize(&mut self, ty: TypeId) -> Scheme {
        let mut free = HashSet::new();
        self.free_type_vars(ty, &mut free);
        let env_free = self.free_in_env();

        let mut vars: Vec<TypeId> = free.difference(&env_free).copied().collect();
        vars.sort_unstable();
        Scheme { vars, ty }
    }

    /// Fresh monomorphic instance of a scheme: every quantified variable is
    /// replaced by a fresh variable throughout the body.
    pub(crate) fn instantiate(&mut self, scheme: &Scheme) -> TypeId {
        let mut subst: HashMap<TypeId, TypeId> = HashMap::new();
        for var in &scheme.vars {
            let var = self.find(*var);
            let fresh = self.fresh_var();
            subst.insert(var, fresh);
        }
        self.substitute(scheme.ty, &subst)
    }

    fn substitute(&mut self, t: TypeId, subst: &HashMap<TypeId, TypeId>) -> TypeId {
        let t = self.find(t);
        if let Some(replacement) = subst.get(&t) {
            return *replacement;
        }
        match self.arena[t].clone() {
            Ty::Fn { params, ret } => {
                let params = params.iter().map(|p| self.substitute(*p, subst)).collect();
                let ret = self.substitute(ret, subst);
                self.insert(Ty::Fn { params, ret })
            }
            Ty::List(elem) => {
                let elem = self.substitute(elem, subst);
                self.insert(Ty::List(elem))
            }
            Ty::Tuple(items) => {
                let items = items.iter().map(|i| self.substitute(*i, subst)).collect();
                self.insert(Ty::Tuple(items))
            }
            Ty::Record(fields) => {
                let fields = fields
                    .iter()
                    .map(|(n, f)| (n.clone(), self.substitute(*f, subst)))
                    .collect();
                self.insert(Ty::Record(fields))
            }
            Ty::Map { key, value } => {
                let key = self.substitute(key, subst);
                let value = self.substitute(value, subst);
                self.insert(Ty::Map { key, value })
            }
            Ty::Adt { name, args } => {
                let args = args.iter().map(|a| self.substitute(*a, subst)).collect();
                self.insert(Ty::Adt { name, args })
            }
            _ => t,
        }
    }

    // -----------------------------------------------------------------------
    // Annotations and display
    // -----------------------------------------------------------------------

    pub(crate) fn resolve_type_expr(&mut self, te: &TypeExpr) -> TypeId {
        match &te.kind {
            TypeExprKind::Name { name, args } => match name.as_str() {
                "Int" => self.insert(Ty::Int),
                "Float" => self.insert(Ty::Float),
                "Bool" => self.insert(Ty::Bool),
                "String" => self.insert(Ty::Str),
                "Unit" => self.insert(Ty::Unit),
                "Map" if args.len() == 2 => {
                    let key = self.resolve_type_expr(&args[0]);
                    let value = self.resolve_type_expr(&args[1]);
                    self.insert(Ty::Map { key, value })
                }
                _ => {
                    // Lowercase names are "a"-style generics
                    if name.chars().next().map(char::is_lowercase).unwrap_or(false) {
                        self.insert(Ty::Generic(name.clone()))
                    } else {
                        let args = args.iter().map(|a| self.resolve_type_expr(a)).collect();
                        self.insert(Ty::Adt {
                            name: name.clone(),
                            args,
                        })
                    }
                }
            },
            TypeExprKind::Fn { params, ret } => {
                let params = params.iter().map(|p| self.resolve_type_expr(p)).collect();
                let ret = self.resolve_type_expr(ret);
                self.insert(Ty::Fn { params, ret })
            }
            TypeExprKind::Tuple(items) => {
                if items.is_empty() {
                    return self.insert(Ty::Unit);
                }
                let items = items.iter().map(|i| self.resolve_type_expr(i)).collect();
                self.insert(Ty::Tuple(items))
            }
            TypeExprKind::Record(fields) => {
                let fields = fields
                    .iter()
                    .map(|(n, f)| (n.clone(), self.resolve_type_expr(f)))
                    .collect();
                self.insert(Ty::Record(fields))
            }
            TypeExprKind::List(elem) => {
                let elem = self.resolve_type_expr(elem);
                self.insert(Ty::List(elem))
            }
        }
    }

    pub fn display(&mut self, t: TypeId) -> String {
        let t = self.find(t);
        match self.arena[t].clone() {
            Ty::Var { .. } => format!("t{}", t),
            Ty::Int => "Int".to_string(),
            Ty::Float => "Float".to_string(),
            Ty::Bool => "Bool".to_string(),
            Ty::Str => "String".to_string(),
            Ty::Unit => "()".to_string(),
            Ty::Fn { params, ret } => {
                let params: Vec<String> = params.iter().map(|p| self.display(*p)).collect();
                format!("({}) -> {}", params.join(", "), self.display(ret))
            }
            Ty::List(elem) => format!("[{}]", self.display(elem)),
            Ty::Tuple(items) => {
                let items: Vec<String> = items.iter().map(|i| self.display(*i)).collect();
                format!("({})", items.join(", "))
            }
            Ty::Record(fields) => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|(n, f)| format!("{}: {}", n, self.display(*f)))
                    .collect();
                format!("{{ {} }}", fields.join(", "))
            }
            Ty::Map { key, value } => {
                format!("Map<{}, {}>", self.display(key), self.display(value))
            }
            Ty::Adt { name, args } => {
                if args.is_empty() {
                    name
                } else {
                    let args: Vec<String> = args.iter().map(|a| self.display(*a)).collect();
                    format!("{}<{}>", name, args.join(", "))
                }
            }
            Ty::Generic(name) => name,
        }
    }

    // -----------------------------------------------------------------------
    // Builtin signatures
    // -----------------------------------------------------------------------

    fn register_builtins(&mut self) {
        let a = self.insert(Ty::Generic("a".to_string()));
        let b = self.insert(Ty::Generic("b".to_string()));
        let int = self.insert(Ty::Int);
        let float = self.insert(Ty::Float);
        let boolean = self.insert(Ty::Bool);
        let string = self.insert(Ty::Str);
        let unit = self.insert(Ty::Unit);
        let list_a = self.insert(Ty::List(a));
        let list_int = self.insert(Ty::List(int));
        let list_str = self.insert(Ty::List(string));

        let define_fn = |tc: &mut Self, name: &str, params: Vec<TypeId>, ret: TypeId| {
            let ty = tc.insert(Ty::Fn { params, ret });
            tc.define(name, Scheme::mono(ty));
        };

        define_fn(self, "print", vec![a], unit);
        define_fn(self, "println", vec![a], unit);
        define_fn(self, "str", vec![a], string);
        define_fn(self, "int", vec![a], int);
        define_fn(self, "float", vec![a], float);
        define_fn(self, "input", vec![], string);
        define_fn(self, "input_prompt", vec![string], string);
        define_fn(self, "error", vec![string], a);
        define_fn(self, "assert", vec![boolean, string], unit);

        define_fn(self, "head", vec![list_a], a);
        define_fn(self, "tail", vec![list_a], list_a);
        define_fn(self, "cons", vec![a, list_a], list_a);
        define_fn(self, "len", vec![a], int);
        define_fn(self, "empty", vec![a], boolean);
        define_fn(self, "append", vec![list_a, a], list_a);
        define_fn(self, "concat", vec![list_a, list_a], list_a);
        define_fn(self, "reverse", vec![list_a], list_a);
        define_fn(self, "nth", vec![list_a, int], a);
        define_fn(self, "range", vec![int, int], list_int);
        define_fn(self, "sort", vec![list_a], list_a);
        define_fn(self, "compare", vec![a, a], int);

        let fn_a_b = self.insert(Ty::Fn {
            params: vec![a],
            ret: b,
        });
        let list_b = self.insert(Ty::List(b));
        define_fn(self, "map", vec![fn_a_b, list_a], list_b);
        let fn_a_bool = self.insert(Ty::Fn {
            params: vec![a],
            ret: boolean,
        });
        define_fn(self, "filter", vec![fn_a_bool, list_a], list_a);
        let fn_b_a_b = self.insert(Ty::Fn {
            params: vec![b, a],
            ret: b,
        });
        define_fn(self, "fold", vec![fn_b_a_b, b, list_a], b);

        for name in ["abs", "floor", "ceil", "round"] {
            define_fn(self, name, vec![a], int);
        }
        for name in [
            "sqrt", "sin", "cos", "tan", "asin", "acos", "atan", "log", "log10", "exp",
        ] {
            define_fn(self, name, vec![a], float);
        }
        define_fn(self, "pow", vec![a, a], float);
        define_fn(self, "atan2", vec![a, a], float);
        define_fn(self, "min", vec![a, a], a);
        define_fn(self, "max", vec![a, a], a);
        define_fn(self, "random", vec![], float);
        define_fn(self, "random_int", vec![int, int], int);
        self.define("pi", Scheme::mono(float));
        self.define("e", Scheme::mono(float));

        define_fn(self, "substr", vec![string, int, int], string);
        define_fn(self, "split", vec![string, string], list_str);
        define_fn(self, "join", vec![list_a, string], string);
        for name in ["uppercase", "lowercase", "trim", "trim_start", "trim_end"] {
            define_fn(self, name, vec![string], string);
        }
        for name in ["contains", "starts_with", "ends_with"] {
            define_fn(self, name, vec![string, string], boolean);
        }
        define_fn(self, "replace", vec![string, string, string], string);
        define_fn(self, "replace_all", vec![string, string, string], string);
        define_fn(self, "char_at", vec![string, int], string);
        define_fn(self, "chars", vec![string], list_str);
        define_fn(self, "index_of", vec![string, string], int);

        for name in [
            "is_int", "is_float", "is_string", "is_bool", "is_list", "is_tuple", "is_record",
            "is_fn",
        ] {
            define_fn(self, name, vec![a], boolean);
        }

        define_fn(self, "file_read", vec![string], string);
        define_fn(self, "file_write", vec![string, string], unit);
        define_fn(self, "file_append", vec![string, string], unit);
        define_fn(self, "file_exists", vec![string], boolean);
        define_fn(self, "file_delete", vec![string], boolean);
        define_fn(self, "file_lines", vec![string], list_str);
        define_fn(self, "dir_list", vec![string], list_str);
        define_fn(self, "dir_exists", vec![string], boolean);
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}
