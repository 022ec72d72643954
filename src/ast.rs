use std::rc::Rc;

use crate::location::Loc;

#[derive(Debug, Clone, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnOp {
    Neg,
    Not,
}

/// One segment of an interpolated string: literal text or an embedded
/// expression (sub-parsed by the parser from the lexer's raw text).
#[derive(Debug, Clone, PartialEq)]
pub enum StrPart {
    Literal(String),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    InterpStr(Vec<StrPart>),
    Ident(String),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Let {
        name: String,
        annotation: Option<TypeExpr>,
        value: Box<Expr>,
        is_const: bool,
    },
    Assign {
        name: String,
        value: Box<Expr>,
    },
    /// Named function definition; binds a closure in the enclosing scope.
    Fn {
        name: String,
        params: Vec<Param>,
        return_annotation: Option<TypeExpr>,
        body: Rc<Expr>,
    },
    Lambda {
        params: Vec<Param>,
        body: Rc<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    While {
        condition: Box<Expr>,
        body: Box<Expr>,
    },
    For {
        var: String,
        iterable: Box<Expr>,
        body: Box<Expr>,
    },
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Record(Vec<(String, Expr)>),
    Map(Vec<(Expr, Expr)>),
    Field {
        object: Box<Expr>,
        field: String,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    Block(Vec<Expr>),
    /// Explicit `Module::member` access.
    ModuleMember {
        module: String,
        member: String,
    },
    /// `Type.Ctor(args)` where `Type` was declared earlier in the same parse.
    Ctor {
        type_name: String,
        ctor: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternKind {
    Wildcard,
    Var(String),
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    /// `[p1, …, pn]`, optionally ending in `...rest`.
    List {
        elements: Vec<Pattern>,
        rest: Option<String>,
    },
    Tuple(Vec<Pattern>),
    /// Structural subset match on field names; extra fields are ignored.
    Record(Vec<(String, Pattern)>),
    Ctor {
        name: String,
        args: Vec<Pattern>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    /// Named type with optional type arguments: `Int`, `Option<T>`.
    Name {
        name: String,
        args: Vec<TypeExpr>,
    },
    /// `(T1, T2) -> R`
    Fn {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
    },
    Tuple(Vec<TypeExpr>),
    Record(Vec<(String, TypeExpr)>),
    List(Box<TypeExpr>),
}

/// One constructor in a `type` declaration, with positional field types.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeCtor {
    pub name: String,
    pub fields: Vec<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub params: Vec<String>,
    pub ctors: Vec<TypeCtor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDef {
    pub name: String,
    pub body: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub kind: DeclKind,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    Expr(Expr),
    Type(TypeDef),
    Module(ModuleDef),
    Import {
        module: String,
        alias: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub decls: Vec<Decl>,
}
