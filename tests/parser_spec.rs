/// Spec tests for the Setsuna parser.
///
/// The tests lower source text to the AST and check its structure,
/// covering the disambiguation rules: record vs block, lambda vs
/// parenthesized expression, constructor vs variable patterns, and the
/// precedence/associativity table.
use setsuna::ast::*;
use setsuna::lexer::Lexer;
use setsuna::parser::Parser;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse(src: &str) -> Program {
    let tokens = Lexer::new(src, "<test>").tokenize().expect("lex failed");
    Parser::new(tokens).parse().expect("parse failed")
}

fn parse_err(src: &str) -> String {
    let tokens = Lexer::new(src, "<test>").tokenize().expect("lex failed");
    Parser::new(tokens).parse().unwrap_err().to_string()
}

/// First declaration as an expression.
fn expr(src: &str) -> Expr {
    let program = parse(src);
    match program.decls.into_iter().next().expect("no declarations").kind {
        DeclKind::Expr(e) => e,
        other => panic!("expected expression declaration, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Literals and identifiers
// ---------------------------------------------------------------------------

#[test]
fn int_literal() {
    assert_eq!(expr("42").kind, ExprKind::Int(42));
}

#[test]
fn float_literal() {
    assert_eq!(expr("2.5").kind, ExprKind::Float(2.5));
}

#[test]
fn string_literal() {
    assert_eq!(expr("\"hi\"").kind, ExprKind::Str("hi".to_string()));
}

#[test]
fn bool_literals() {
    assert_eq!(expr("true").kind, ExprKind::Bool(true));
    assert_eq!(expr("false").kind, ExprKind::Bool(false));
}

#[test]
fn identifier() {
    assert_eq!(expr("abc").kind, ExprKind::Ident("abc".to_string()));
}

// ---------------------------------------------------------------------------
// Operators: precedence and associativity
// ---------------------------------------------------------------------------

#[test]
fn mul_binds_tighter_than_add() {
    // 2 + 3 * 4 => 2 + (3 * 4)
    let e = expr("2 + 3 * 4");
    match e.kind {
        ExprKind::Binary {
            op: BinOp::Add,
            right,
            ..
        } => assert!(matches!(
            right.kind,
            ExprKind::Binary { op: BinOp::Mul, .. }
        )),
        other => panic!("expected Add at root, got {:?}", other),
    }
}

#[test]
fn subtraction_is_left_associative() {
    // 1 - 2 - 3 => (1 - 2) - 3
    let e = expr("1 - 2 - 3");
    match e.kind {
        ExprKind::Binary {
            op: BinOp::Sub,
            left,
            right,
        } => {
            assert!(matches!(
                left.kind,
                ExprKind::Binary { op: BinOp::Sub, .. }
            ));
            assert_eq!(right.kind, ExprKind::Int(3));
        }
        other => panic!("expected Sub at root, got {:?}", other),
    }
}

#[test]
fn comparison_binds_tighter_than_equality() {
    // a == b < c => a == (b < c)
    let e = expr("a == b < c");
    match e.kind {
        ExprKind::Binary {
            op: BinOp::Eq,
            right,
            ..
        } => assert!(matches!(
            right.kind,
            ExprKind::Binary { op: BinOp::Lt, .. }
        )),
        other => panic!("expected Eq at root, got {:?}", other),
    }
}

#[test]
fn and_binds_tighter_than_or() {
    // a || b && c => a || (b && c)
    let e = expr("a || b && c");
    match e.kind {
        ExprKind::Binary {
            op: BinOp::Or,
            right,
            ..
        } => assert!(matches!(
            right.kind,
            ExprKind::Binary { op: BinOp::And, .. }
        )),
        other => panic!("expected Or at root, got {:?}", other),
    }
}

#[test]
fn unary_minus_and_not() {
    assert!(matches!(
        expr("-x").kind,
        ExprKind::Unary { op: UnOp::Neg, .. }
    ));
    assert!(matches!(
        expr("!x").kind,
        ExprKind::Unary { op: UnOp::Not, .. }
    ));
}

#[test]
fn unary_binds_tighter_than_mul() {
    // -a * b => (-a) * b
    let e = expr("-a * b");
    match e.kind {
        ExprKind::Binary {
            op: BinOp::Mul,
            left,
            ..
        } => assert!(matches!(left.kind, ExprKind::Unary { op: UnOp::Neg, .. })),
        other => panic!("expected Mul at root, got {:?}", other),
    }
}

#[test]
fn modulo_operator() {
    assert!(matches!(
        expr("a % b").kind,
        ExprKind::Binary { op: BinOp::Mod, .. }
    ));
}

// ---------------------------------------------------------------------------
// Grouping, tuples, lambdas
// ---------------------------------------------------------------------------

#[test]
fn parenthesized_expression_is_grouping() {
    assert_eq!(expr("(x)").kind, ExprKind::Ident("x".to_string()));
}

#[test]
fn empty_parens_are_unit_tuple() {
    assert_eq!(expr("()").kind, ExprKind::Tuple(Vec::new()));
}

#[test]
fn comma_makes_a_tuple() {
    match expr("(1, 2, 3)").kind {
        ExprKind::Tuple(items) => assert_eq!(items.len(), 3),
        other => panic!("expected tuple, got {:?}", other),
    }
}

#[test]
fn lambda_single_param() {
    match expr("(x) => x").kind {
        ExprKind::Lambda { params, .. } => {
            assert_eq!(params.len(), 1);
            assert_eq!(params[0].name, "x");
        }
        other => panic!("expected lambda, got {:?}", other),
    }
}

#[test]
fn lambda_multi_param() {
    match expr("(a, b) => a + b").kind {
        ExprKind::Lambda { params, .. } => {
            let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, vec!["a", "b"]);
        }
        other => panic!("expected lambda, got {:?}", other),
    }
}

#[test]
fn lambda_with_annotated_param() {
    match expr("(x: Int) => x").kind {
        ExprKind::Lambda { params, .. } => assert!(params[0].annotation.is_some()),
        other => panic!("expected lambda, got {:?}", other),
    }
}

#[test]
fn ident_tuple_without_arrow_reparses_as_tuple() {
    // The parser consumes (a, b) as a parameter list, finds no `=>`,
    // restores its position and reparses as a tuple of identifiers.
    match expr("(a, b)").kind {
        ExprKind::Tuple(items) => {
            assert_eq!(items[0].kind, ExprKind::Ident("a".to_string()));
            assert_eq!(items[1].kind, ExprKind::Ident("b".to_string()));
        }
        other => panic!("expected tuple, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Record vs block disambiguation
// ---------------------------------------------------------------------------

#[test]
fn brace_with_field_colon_is_record() {
    match expr("{ x: 1, y: 2 }").kind {
        ExprKind::Record(fields) => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].0, "x");
        }
        other => panic!("expected record, got {:?}", other),
    }
}

#[test]
fn brace_without_colon_is_block() {
    assert!(matches!(expr("{ 1 }").kind, ExprKind::Block(_)));
}

#[test]
fn empty_braces_are_a_block() {
    assert_eq!(expr("{}").kind, ExprKind::Block(Vec::new()));
}

#[test]
fn record_lookahead_skips_newlines() {
    match expr("{\n  x: 1\n}").kind {
        ExprKind::Record(fields) => assert_eq!(fields[0].0, "x"),
        other => panic!("expected record, got {:?}", other),
    }
}

#[test]
fn block_with_statements() {
    match expr("{ print(x); x = x + 1 }").kind {
        ExprKind::Block(exprs) => assert_eq!(exprs.len(), 2),
        other => panic!("expected block, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[test]
fn list_literal() {
    match expr("[1, 2, 3]").kind {
        ExprKind::List(items) => assert_eq!(items.len(), 3),
        other => panic!("expected list, got {:?}", other),
    }
}

#[test]
fn empty_list() {
    assert_eq!(expr("[]").kind, ExprKind::List(Vec::new()));
}

#[test]
fn map_literal() {
    match expr("%{ \"a\": 1, \"b\": 2 }").kind {
        ExprKind::Map(entries) => assert_eq!(entries.len(), 2),
        other => panic!("expected map, got {:?}", other),
    }
}

#[test]
fn empty_map() {
    assert_eq!(expr("%{ }").kind, ExprKind::Map(Vec::new()));
}

// ---------------------------------------------------------------------------
// let / const / assignment
// ---------------------------------------------------------------------------

#[test]
fn let_binding() {
    match expr("let x = 5").kind {
        ExprKind::Let {
            name,
            is_const,
            annotation,
            ..
        } => {
            assert_eq!(name, "x");
            assert!(!is_const);
            assert!(annotation.is_none());
        }
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn const_binding() {
    match expr("const x = 5").kind {
        ExprKind::Let { is_const, .. } => assert!(is_const),
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn let_with_type_annotation() {
    match expr("let x: Int = 5").kind {
        ExprKind::Let { annotation, .. } => {
            let annotation = annotation.expect("missing annotation");
            assert!(matches!(
                annotation.kind,
                TypeExprKind::Name { ref name, .. } if name == "Int"
            ));
        }
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn assignment() {
    match expr("x = 5").kind {
        ExprKind::Assign { name, .. } => assert_eq!(name, "x"),
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn equality_is_not_assignment() {
    assert!(matches!(
        expr("x == 5").kind,
        ExprKind::Binary { op: BinOp::Eq, .. }
    ));
}

// ---------------------------------------------------------------------------
// Functions, calls, field access
// ---------------------------------------------------------------------------

#[test]
fn fn_with_block_body() {
    match expr("fn add(a, b) { a + b }").kind {
        ExprKind::Fn { name, params, body, .. } => {
            assert_eq!(name, "add");
            assert_eq!(params.len(), 2);
            assert!(matches!(body.kind, ExprKind::Block(_)));
        }
        other => panic!("expected fn, got {:?}", other),
    }
}

#[test]
fn fn_with_expression_body() {
    match expr("fn sq(x) => x * x").kind {
        ExprKind::Fn { body, .. } => {
            assert!(matches!(body.kind, ExprKind::Binary { op: BinOp::Mul, .. }))
        }
        other => panic!("expected fn, got {:?}", other),
    }
}

#[test]
fn fn_with_return_annotation() {
    match expr("fn f(x: Int): Int => x").kind {
        ExprKind::Fn {
            return_annotation, ..
        } => assert!(return_annotation.is_some()),
        other => panic!("expected fn, got {:?}", other),
    }
}

#[test]
fn call_with_args() {
    match expr("f(1, 2)").kind {
        ExprKind::Call { callee, args } => {
            assert_eq!(callee.kind, ExprKind::Ident("f".to_string()));
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn curried_call_chain() {
    // f(1)(2) => Call(Call(f, [1]), [2])
    match expr("f(1)(2)").kind {
        ExprKind::Call { callee, .. } => {
            assert!(matches!(callee.kind, ExprKind::Call { .. }))
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn field_access() {
    match expr("p.name").kind {
        ExprKind::Field { object, field } => {
            assert_eq!(object.kind, ExprKind::Ident("p".to_string()));
            assert_eq!(field, "name");
        }
        other => panic!("expected field access, got {:?}", other),
    }
}

#[test]
fn chained_field_access_and_call() {
    // a.b.c(1) => Call(Field(Field(a, b), c), [1])
    match expr("a.b.c(1)").kind {
        ExprKind::Call { callee, .. } => match callee.kind {
            ExprKind::Field { object, field } => {
                assert_eq!(field, "c");
                assert!(matches!(object.kind, ExprKind::Field { .. }));
            }
            other => panic!("expected field access, got {:?}", other),
        },
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn module_member_via_double_colon() {
    match expr("Math::add").kind {
        ExprKind::ModuleMember { module, member } => {
            assert_eq!(module, "Math");
            assert_eq!(member, "add");
        }
        other => panic!("expected module member, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Control flow
// ---------------------------------------------------------------------------

#[test]
fn if_with_else() {
    match expr("if x { 1 } else { 2 }").kind {
        ExprKind::If { else_branch, .. } => assert!(else_branch.is_some()),
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn if_without_else() {
    match expr("if x { 1 }").kind {
        ExprKind::If { else_branch, .. } => assert!(else_branch.is_none()),
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn else_if_chain() {
    match expr("if a { 1 } else if b { 2 } else { 3 }").kind {
        ExprKind::If { else_branch, .. } => {
            assert!(matches!(else_branch.unwrap().kind, ExprKind::If { .. }))
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn while_loop() {
    assert!(matches!(
        expr("while x < 3 { x = x + 1 }").kind,
        ExprKind::While { .. }
    ));
}

#[test]
fn for_loop() {
    match expr("for v in xs { v }").kind {
        ExprKind::For { var, .. } => assert_eq!(var, "v"),
        other => panic!("expected for, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Match and patterns
// ---------------------------------------------------------------------------

fn match_arms(src: &str) -> Vec<MatchArm> {
    match expr(src).kind {
        ExprKind::Match { arms, .. } => arms,
        other => panic!("expected match, got {:?}", other),
    }
}

#[test]
fn match_literal_and_wildcard_arms() {
    let arms = match_arms("match n { 0 => 1, _ => 2 }");
    assert_eq!(arms.len(), 2);
    assert_eq!(arms[0].pattern.kind, PatternKind::Int(0));
    assert_eq!(arms[1].pattern.kind, PatternKind::Wildcard);
}

#[test]
fn bare_identifier_is_a_variable_pattern() {
    let arms = match_arms("match n { x => x }");
    assert_eq!(arms[0].pattern.kind, PatternKind::Var("x".to_string()));
}

#[test]
fn identifier_with_paren_is_a_constructor_pattern() {
    let arms = match_arms("match v { Some(x) => x }");
    match &arms[0].pattern.kind {
        PatternKind::Ctor { name, args } => {
            assert_eq!(name, "Some");
            assert_eq!(args.len(), 1);
        }
        other => panic!("expected constructor pattern, got {:?}", other),
    }
}

#[test]
fn match_guard() {
    let arms = match_arms("match n { x if x > 0 => x, _ => 0 }");
    assert!(arms[0].guard.is_some());
    assert!(arms[1].guard.is_none());
}

#[test]
fn list_pattern_with_rest() {
    let arms = match_arms("match xs { [a, b, ...rest] => rest }");
    match &arms[0].pattern.kind {
        PatternKind::List { elements, rest } => {
            assert_eq!(elements.len(), 2);
            assert_eq!(rest.as_deref(), Some("rest"));
        }
        other => panic!("expected list pattern, got {:?}", other),
    }
}

#[test]
fn empty_list_pattern() {
    let arms = match_arms("match xs { [] => 0 }");
    assert_eq!(
        arms[0].pattern.kind,
        PatternKind::List {
            elements: Vec::new(),
            rest: None
        }
    );
}

#[test]
fn tuple_pattern() {
    let arms = match_arms("match p { (a, b) => a }");
    match &arms[0].pattern.kind {
        PatternKind::Tuple(items) => assert_eq!(items.len(), 2),
        other => panic!("expected tuple pattern, got {:?}", other),
    }
}

#[test]
fn record_pattern() {
    let arms = match_arms("match p { { name: n, age: a } => n }");
    match &arms[0].pattern.kind {
        PatternKind::Record(fields) => {
            assert_eq!(fields[0].0, "name");
            assert_eq!(fields[1].0, "age");
        }
        other => panic!("expected record pattern, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[test]
fn type_definition() {
    let program = parse("type Shape { Circle(Float), Rect(Float, Float), Point }");
    match &program.decls[0].kind {
        DeclKind::Type(td) => {
            assert_eq!(td.name, "Shape");
            let arities: Vec<usize> = td.ctors.iter().map(|c| c.fields.len()).collect();
            assert_eq!(arities, vec![1, 2, 0]);
        }
        other => panic!("expected type def, got {:?}", other),
    }
}

#[test]
fn type_definition_with_params() {
    let program = parse("type Option<T> { Some(T), None }");
    match &program.decls[0].kind {
        DeclKind::Type(td) => assert_eq!(td.params, vec!["T".to_string()]),
        other => panic!("expected type def, got {:?}", other),
    }
}

#[test]
fn module_definition() {
    let program = parse("module M { fn sq(x) => x * x }");
    match &program.decls[0].kind {
        DeclKind::Module(md) => {
            assert_eq!(md.name, "M");
            assert_eq!(md.body.len(), 1);
        }
        other => panic!("expected module def, got {:?}", other),
    }
}

#[test]
fn import_declaration() {
    let program = parse("import Math");
    assert_eq!(
        program.decls[0].kind,
        DeclKind::Import {
            module: "Math".to_string(),
            alias: None
        }
    );
}

#[test]
fn import_with_alias() {
    let program = parse("import Math as M");
    assert_eq!(
        program.decls[0].kind,
        DeclKind::Import {
            module: "Math".to_string(),
            alias: Some("M".to_string())
        }
    );
}

#[test]
fn ctor_call_recognised_after_type_declaration() {
    let program = parse("type Tree { Leaf(x) }\nTree.Leaf(1)");
    match &program.decls[1].kind {
        DeclKind::Expr(e) => match &e.kind {
            ExprKind::Ctor {
                type_name, ctor, ..
            } => {
                assert_eq!(type_name, "Tree");
                assert_eq!(ctor, "Leaf");
            }
            other => panic!("expected ctor call, got {:?}", other),
        },
        other => panic!("expected expression, got {:?}", other),
    }
}

#[test]
fn dotted_call_on_unknown_name_stays_a_call() {
    assert!(matches!(expr("Math.sq(5)").kind, ExprKind::Call { .. }));
}

// ---------------------------------------------------------------------------
// Interpolated strings
// ---------------------------------------------------------------------------

#[test]
fn fstring_parts_are_parsed() {
    match expr("f\"a {1 + 2} b\"").kind {
        ExprKind::InterpStr(parts) => {
            assert_eq!(parts.len(), 3);
            assert_eq!(parts[0], StrPart::Literal("a ".to_string()));
            assert!(matches!(parts[1], StrPart::Expr(_)));
        }
        other => panic!("expected interpolated string, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Determinism and errors
// ---------------------------------------------------------------------------

#[test]
fn parse_is_deterministic() {
    let src = "type T { A(Int), B }\nfn f(x) { match x { A(n) => n, B => 0 } }\nf(A(3))";
    assert_eq!(parse(src), parse(src));
}

#[test]
fn every_expression_carries_a_location() {
    let e = expr("1 + 2");
    assert_eq!(e.loc.line, 1);
    match e.kind {
        ExprKind::Binary { left, right, .. } => {
            assert_eq!(left.loc.col, 1);
            assert_eq!(right.loc.col, 5);
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn missing_paren_is_an_error() {
    assert!(parse_err("f(1, 2").contains("error"));
}

#[test]
fn unexpected_token_is_an_error() {
    let err = parse_err("let = 5");
    assert!(err.contains("Expected identifier"), "got: {}", err);
}

#[test]
fn match_without_arrow_is_an_error() {
    assert!(parse_err("match x { 1, 2 }").contains("Expected '=>'"));
}
