use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::ast::*;
use crate::env::{EnvRef, Environment};
use crate::location::Loc;
use crate::source::{find_module_file, parse_source};
use crate::value::{AdtValue, Builtin, Closure, RuntimeError, Value};

mod builtins;
mod eval;
mod ops;
mod patterns;

pub struct Evaluator {
    pub globals: EnvRef,
    /// Loaded module environments, keyed by module name.
    module_cache: HashMap<String, EnvRef>,
    /// Names currently being loaded; guards against cyclic imports.
    loading: Vec<String>,
    base_path: PathBuf,
    search_paths: Vec<PathBuf>,
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator::with_env(Environment::global())
    }

    pub fn with_env(globals: EnvRef) -> Self {
        Evaluator {
            globals,
            module_cache: HashMap::new(),
            loading: Vec::new(),
            base_path: PathBuf::from("."),
            search_paths: Vec::new(),
        }
    }

    pub fn set_base_path(&mut self, path: impl Into<PathBuf>) {
        self.base_path = path.into();
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    /// Evaluate a program in the root environment; expression declarations
    /// thread through and the last one's value is returned.
    pub fn eval_program(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        let env = Rc::clone(&self.globals);
        self.eval_program_in(program, &env)
    }

    fn eval_program_in(&mut self, program: &Program, env: &EnvRef) -> Result<Value, RuntimeError> {
        let mut result = Value::Unit;
        for decl in &program.decls {
            match &decl.kind {
                DeclKind::Expr(expr) => result = self.eval_expr(expr, env)?,
                _ => self.eval_decl(decl, env)?,
            }
        }
        Ok(result)
    }

    pub fn eval_decl(&mut self, decl: &Decl, env: &EnvRef) -> Result<(), RuntimeError> {
        match &decl.kind {
            DeclKind::Expr(expr) => {
                self.eval_expr(expr, env)?;
            }
            DeclKind::Type(td) => self.eval_type_def(td, env, &decl.loc)?,
            DeclKind::Module(md) => {
                let module_env = Environment::extend(env);
                for expr in &md.body {
                    self.eval_expr(expr, &module_env)?;
                }
                env.borrow_mut().define_module(&md.name, module_env);
            }
            DeclKind::Import { module, alias } => {
                let module_env = self.load_module(module, &decl.loc)?;
                let name = alias.as_deref().unwrap_or(module);
                env.borrow_mut().define_module(name, module_env);
            }
        }
        Ok(())
    }

    /// Record the type definition and synthesize one binding per constructor:
    /// nullary constructors become ADT values, n-ary ones become builtins
    /// that package their arguments into an ADT instance.
    fn eval_type_def(
        &mut self,
        td: &TypeDef,
        env: &EnvRef,
        _loc: &Loc,
    ) -> Result<(), RuntimeError> {
        let def = env.borrow_mut().define_type(td.clone());

        for ctor in &def.ctors {
            let value = if ctor.fields.is_empty() {
                Value::Adt(Rc::new(AdtValue {
                    type_name: def.name.clone(),
                    ctor: ctor.name.clone(),
                    fields: Vec::new(),
                }))
            } else {
                Value::Builtin(Builtin {
                    name: format!("__ctor:{}.{}", def.name, ctor.name),
                    arity: ctor.fields.len() as i32,
                })
            };
            env.borrow_mut().insert(&ctor.name, value);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Module loading
    // -------------------------------------------------------------------------

    fn cycle_display(loading: &[String], next: &str) -> String {
        let mut chain: Vec<&str> = loading.iter().map(String::as_str).collect();
        chain.push(next);
        chain.join(" -> ")
    }

    pub fn load_module(&mut self, name: &str, loc: &Loc) -> Result<EnvRef, RuntimeError> {
        if let Some(cached) = self.module_cache.get(name) {
            return Ok(Rc::clone(cached));
        }

        if self.loading.iter().any(|n| n == name) {
            return Err(RuntimeError::new(
                format!(
                    "Cyclic import detected: {}",
                    Self::cycle_display(&self.loading, name)
                ),
                loc,
            ));
        }

        let path = find_module_file(name, &self.base_path, &self.search_paths).ok_or_else(
            || RuntimeError::new(format!("Cannot find module: {}", name), loc),
        )?;

        self.loading.push(name.to_string());
        let result = (|| -> Result<EnvRef, RuntimeError> {
            let src = std::fs::read_to_string(&path).map_err(|e| {
                RuntimeError::new(
                    format!("Cannot read module file: {}: {}", path.display(), e),
                    loc,
                )
            })?;
            let program = parse_source(&src, &path.display().to_string())
                .map_err(|e| RuntimeError::new(e, loc))?;

            // Modules are evaluated in a child of the root environment, with
            // the base path pointing at the module file's directory.
            let module_env = Environment::extend(&self.globals);
            let old_base = std::mem::replace(
                &mut self.base_path,
                path.parent().map(PathBuf::from).unwrap_or_default(),
            );
            let outcome = self.eval_program_in(&program, &module_env);
            self.base_path = old_base;

            outcome.map(|_| module_env)
        })();
        // Marker is cleared on completion and on error (recovery)
        self.loading.pop();

        let module_env = result?;
        self.module_cache
            .insert(name.to_string(), Rc::clone(&module_env));
        Ok(module_env)
    }

    // -------------------------------------------------------------------------
    // Forcing and calls
    // -------------------------------------------------------------------------

    /// Chase thunks until a non-thunk value is reached, caching each thunk's
    /// result after its first force. A no-op on non-thunks.
    pub fn force(&mut self, value: Value) -> Result<Value, RuntimeError> {
        let mut value = value;
        loop {
            let thunk = match value {
                Value::Thunk(t) => t,
                other => return Ok(other),
            };
            let cached = thunk.cached.borrow().clone();
            match cached {
                Some(v) => value = v,
                None => {
                    let computed = self.eval_expr(&thunk.expr, &thunk.env)?;
                    *thunk.cached.borrow_mut() = Some(computed.clone());
                    value = computed;
                }
            }
        }
    }

    pub fn call_value(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        loc: &Loc,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Builtin(b) => {
                if b.arity >= 0 && args.len() != b.arity as usize {
                    return Err(RuntimeError::new(
                        format!(
                            "{}() expects {} arguments, got {}",
                            b.name.strip_prefix("__ctor:").unwrap_or(&b.name),
                            b.arity,
                            args.len()
                        ),
                        loc,
                    ));
                }
                self.call_builtin(&b.name, args, loc)
            }
            Value::Closure(closure) => self.call_closure(&closure, args, loc),
            other => Err(RuntimeError::new(
                format!(
                    "Cannot call non-function value: {}",
                    crate::value::render_nested(&other)
                ),
                loc,
            )),
        }
    }

    fn call_closure(
        &mut self,
        closure: &Closure,
        args: Vec<Value>,
        loc: &Loc,
    ) -> Result<Value, RuntimeError> {
        if args.len() != closure.params.len() {
            return Err(RuntimeError::new(
                format!(
                    "Wrong number of arguments: expected {}, got {}",
                    closure.params.len(),
                    args.len()
                ),
                loc,
            ));
        }

        let call_env = Environment::extend(&closure.env);
        for (param, arg) in closure.params.iter().zip(args) {
            call_env.borrow_mut().insert(param, arg);
        }

        self.eval_expr(&closure.body, &call_env)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
