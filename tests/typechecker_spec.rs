/// Spec tests for the Setsuna type inferencer.
///
/// `infer` returns the displayed type of a program's last expression;
/// `check` runs the advisory whole-program pass and returns its error
/// messages. The inferencer never executes anything.
use setsuna::ast::Program;
use setsuna::lexer::Lexer;
use setsuna::parser::Parser;
use setsuna::typechecker::{self, TypeChecker};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse(src: &str) -> Program {
    let tokens = Lexer::new(src, "<test>").tokenize().expect("lex failed");
    Parser::new(tokens).parse().expect("parse failed")
}

fn infer(src: &str) -> String {
    let mut tc = TypeChecker::new();
    let ty = tc.infer_program(&parse(src)).expect("inference failed");
    tc.display(ty)
}

fn infer_err(src: &str) -> String {
    let mut tc = TypeChecker::new();
    tc.infer_program(&parse(src))
        .expect_err("expected type error")
        .to_string()
}

fn check(src: &str) -> Vec<String> {
    typechecker::check(&parse(src))
        .into_iter()
        .map(|e| e.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Literals and simple expressions
// ---------------------------------------------------------------------------

#[test]
fn literal_types() {
    assert_eq!(infer("1"), "Int");
    assert_eq!(infer("1.5"), "Float");
    assert_eq!(infer("\"x\""), "String");
    assert_eq!(infer("true"), "Bool");
    assert_eq!(infer("()"), "()");
}

#[test]
fn interpolated_string_is_a_string() {
    assert_eq!(infer("let x = 1\nf\"v={x}\""), "String");
}

#[test]
fn arithmetic_unifies_operands() {
    assert_eq!(infer("1 + 2"), "Int");
    assert_eq!(infer("1.5 * 2.0"), "Float");
}

#[test]
fn comparison_yields_bool() {
    assert_eq!(infer("1 < 2"), "Bool");
    assert_eq!(infer("1 == 2"), "Bool");
}

#[test]
fn logic_operands_must_be_bool() {
    assert!(infer_err("1 && true").contains("Cannot unify"));
}

#[test]
fn not_requires_bool() {
    assert!(infer_err("!1").contains("Cannot unify"));
}

#[test]
fn undefined_variable_is_reported() {
    assert!(infer_err("nope").contains("Undefined variable: nope"));
}

// ---------------------------------------------------------------------------
// Functions: inference, generalization, instantiation
// ---------------------------------------------------------------------------

#[test]
fn lambda_parameter_is_inferred_from_use() {
    assert_eq!(infer("(x) => x + 1"), "(Int) -> Int");
}

#[test]
fn call_result_is_inferred() {
    assert_eq!(infer("let inc = (x) => x + 1\ninc(41)"), "Int");
}

#[test]
fn identity_is_polymorphic_across_uses() {
    // id generalizes to ∀a. a -> a; each use instantiates it afresh
    let src = "let id = (x) => x\n(id(1), id(\"hello\"))";
    assert_eq!(infer(src), "(Int, String)");
    assert!(check(src).is_empty());
}

#[test]
fn monomorphic_parameter_rejects_a_second_type() {
    let src = "let x = (y) => y + 1\nx(true)";
    let err = infer_err(src);
    assert!(err.contains("Cannot unify"), "got: {}", err);
    assert!(err.contains("Bool"), "got: {}", err);
}

#[test]
fn self_application_is_an_infinite_type() {
    assert!(infer_err("let f = (x) => x(x)").contains("Infinite type"));
}

#[test]
fn call_arity_mismatch() {
    assert!(infer_err("let f = (a, b) => a\nf(1)").contains("Function arity mismatch"));
}

#[test]
fn calling_a_non_function_fails() {
    assert!(infer_err("let x = 1\nx(2)").contains("Cannot unify"));
}

#[test]
fn named_fn_may_recurse() {
    let src = "fn f(n) { match n { 0 => 1, _ => n * f(n - 1) } }\nf(10)";
    assert_eq!(infer(src), "Int");
    assert!(check(src).is_empty());
}

#[test]
fn annotated_parameters_constrain_the_body() {
    assert!(infer_err("fn f(x: Int) => x\nf(\"s\")").contains("Cannot unify"));
}

#[test]
fn return_annotation_is_checked() {
    assert!(infer_err("fn f(x): Int => \"s\"").contains("Cannot unify"));
}

// ---------------------------------------------------------------------------
// let annotations
// ---------------------------------------------------------------------------

#[test]
fn matching_annotation_is_accepted() {
    assert_eq!(infer("let x: Int = 1\nx"), "Int");
}

#[test]
fn mismatched_annotation_is_rejected() {
    assert!(infer_err("let x: Int = \"s\"").contains("Cannot unify"));
}

#[test]
fn list_annotation() {
    assert_eq!(infer("let xs: [Int] = [1, 2]\nxs"), "[Int]");
}

// ---------------------------------------------------------------------------
// Control flow
// ---------------------------------------------------------------------------

#[test]
fn if_branches_must_unify() {
    assert_eq!(infer("if true { 1 } else { 2 }"), "Int");
    assert!(infer_err("if true { 1 } else { \"x\" }").contains("Cannot unify"));
}

#[test]
fn if_condition_must_be_bool() {
    assert!(infer_err("if 1 { 2 }").contains("Cannot unify"));
}

#[test]
fn while_condition_must_be_bool() {
    assert!(infer_err("while 1 { 2 }").contains("Cannot unify"));
}

#[test]
fn for_requires_a_list_and_types_the_variable() {
    assert_eq!(infer("for x in [1, 2] { x + 1 }"), "Int");
    assert!(infer_err("for x in 5 { x }").contains("Cannot unify"));
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[test]
fn list_elements_unify_to_one_type() {
    assert_eq!(infer("[1, 2, 3]"), "[Int]");
    assert!(infer_err("[1, \"a\"]").contains("Cannot unify"));
}

#[test]
fn tuple_propagates_element_types() {
    assert_eq!(infer("(1, \"a\", true)"), "(Int, String, Bool)");
}

#[test]
fn record_builds_a_record_type() {
    assert_eq!(infer("{ x: 1, y: \"a\" }"), "{ x: Int, y: String }");
}

#[test]
fn record_field_access_picks_the_field_type() {
    assert_eq!(infer("let p = { x: 1 }\np.x"), "Int");
}

#[test]
fn unknown_record_field_is_reported() {
    assert!(infer_err("let p = { x: 1 }\np.y").contains("Unknown field: y"));
}

#[test]
fn tuple_index_types() {
    assert_eq!(infer("let t = (1, \"a\")\nt.1"), "String");
}

#[test]
fn map_unifies_keys_and_values() {
    assert_eq!(infer("%{ 1: \"a\", 2: \"b\" }"), "Map<Int, String>");
    assert!(infer_err("%{ 1: \"a\", \"x\": \"b\" }").contains("Cannot unify"));
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

#[test]
fn match_arm_bodies_unify() {
    assert_eq!(infer("match 1 { 0 => 10, _ => 20 }"), "Int");
    assert!(infer_err("match 1 { 0 => 10, _ => \"x\" }").contains("Cannot unify"));
}

#[test]
fn literal_pattern_constrains_the_scrutinee() {
    assert!(infer_err("match \"s\" { 0 => 1, _ => 2 }").contains("Cannot unify"));
}

#[test]
fn list_pattern_types_bindings() {
    assert_eq!(infer("match [1, 2] { [x, ...rest] => x }"), "Int");
    assert_eq!(infer("match [1, 2] { [x, ...rest] => rest }"), "[Int]");
}

#[test]
fn tuple_pattern_types_bindings() {
    assert_eq!(infer("match (1, \"a\") { (n, s) => s }"), "String");
}

#[test]
fn guard_must_be_bool() {
    assert!(infer_err("match 1 { x if x => 1, _ => 2 }").contains("Cannot unify"));
}

// ---------------------------------------------------------------------------
// Algebraic data types
// ---------------------------------------------------------------------------

#[test]
fn constructor_call_returns_the_adt_type() {
    assert_eq!(infer("type Shape { Circle(Float), Point }\nCircle(1.0)"), "Shape");
    assert_eq!(infer("type Shape { Circle(Float), Point }\nPoint"), "Shape");
}

#[test]
fn constructor_field_types_are_enforced() {
    assert!(infer_err("type Shape { Circle(Float) }\nCircle(true)").contains("Cannot unify"));
}

#[test]
fn qualified_constructor_call_types() {
    assert_eq!(infer("type Tree { Leaf(Int) }\nTree.Leaf(1)"), "Tree");
}

#[test]
fn constructor_pattern_types_its_bindings() {
    let src = "type Tree { Leaf(Int), Node(Int, Int) }
match Leaf(1) { Leaf(x) => x, Node(a, b) => a + b }";
    assert_eq!(infer(src), "Int");
}

#[test]
fn generic_constructor_fields_accept_anything() {
    let src = "type Box { Wrap(x) }\n(Wrap(1), Wrap(\"s\"))";
    assert!(check(src).is_empty());
}

#[test]
fn tree_sum_program_checks_clean() {
    let src = "type Tree { Leaf(x), Node(l, r) }
fn s(t) { match t { Leaf(x) => x, Node(l, r) => s(l) + s(r) } }
s(Node(Node(Leaf(1), Leaf(2)), Leaf(3)))";
    assert!(check(src).is_empty());
}

// ---------------------------------------------------------------------------
// Builtin signatures
// ---------------------------------------------------------------------------

#[test]
fn builtin_signatures() {
    assert_eq!(infer("len(\"abc\")"), "Int");
    assert_eq!(infer("range(1, 5)"), "[Int]");
    assert_eq!(infer("split(\"a,b\", \",\")"), "[String]");
    assert_eq!(infer("str(42)"), "String");
}

#[test]
fn builtin_argument_types_are_checked() {
    assert!(infer_err("range(\"a\", 2)").contains("Cannot unify"));
}

// ---------------------------------------------------------------------------
// Advisory behavior
// ---------------------------------------------------------------------------

#[test]
fn check_collects_errors_per_declaration() {
    // Both bad declarations are reported; the good one in between passes
    let errors = check("1 + \"a\"\nlet ok = 2\ntrue && 3");
    assert_eq!(errors.len(), 2);
}

#[test]
fn check_reports_locations() {
    let errors = check("let x = 1\n1 + \"a\"");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("<test>:2:"), "got: {}", errors[0]);
}

#[test]
fn module_bodies_are_checked() {
    let errors = check("module M { 1 + \"a\" }");
    assert_eq!(errors.len(), 1);
}

#[test]
fn imports_are_skipped() {
    assert!(check("import something").is_empty());
}
