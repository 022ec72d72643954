/// The builtin helper catalogue. Each submodule registers its functions as
/// opaque `Builtin` values and answers `call` for the names it owns; the
/// evaluator dispatches by name. Higher-order helpers (`map`, `filter`,
/// `fold`) and ADT constructors are dispatched inside the evaluator instead,
/// since they call back into closures.
use std::io::Write;

use crate::env::Environment;
use crate::location::Loc;
use crate::value::{render_value, Builtin, RuntimeError, Value};

mod fs;
mod list;
mod math;
mod string;

pub(crate) fn register(env: &mut Environment, name: &str, arity: i32) {
    env.insert(
        name,
        Value::Builtin(Builtin {
            name: name.to_string(),
            arity,
        }),
    );
}

pub fn register_all(env: &mut Environment) {
    for (name, arity) in [
        ("print", 1),
        ("println", 1),
        ("str", 1),
        ("int", 1),
        ("float", 1),
        ("input", -1),
        ("input_prompt", 1),
        ("error", 1),
        ("assert", 2),
        ("is_int", 1),
        ("is_float", 1),
        ("is_string", 1),
        ("is_bool", 1),
        ("is_list", 1),
        ("is_tuple", 1),
        ("is_record", 1),
        ("is_fn", 1),
        // evaluator-dispatched, registered here for arity checking
        ("map", 2),
        ("filter", 2),
        ("fold", 3),
    ] {
        register(env, name, arity);
    }

    math::register(env);
    list::register(env);
    string::register(env);
    fs::register(env);
}

/// Pure-catalogue dispatch; `None` means the name is not a builtin here.
pub fn call(name: &str, args: &[Value], loc: &Loc) -> Option<Result<Value, RuntimeError>> {
    if let Some(r) = call_core(name, args, loc) {
        return Some(r);
    }
    if let Some(r) = math::call(name, args, loc) {
        return Some(r);
    }
    if let Some(r) = list::call(name, args, loc) {
        return Some(r);
    }
    if let Some(r) = string::call(name, args, loc) {
        return Some(r);
    }
    fs::call(name, args, loc)
}

fn call_core(name: &str, args: &[Value], loc: &Loc) -> Option<Result<Value, RuntimeError>> {
    match name {
        "print" | "println" => Some({
            println!("{}", render_value(&args[0]));
            Ok(Value::Unit)
        }),
        "str" => Some(Ok(Value::Str(render_value(&args[0])))),
        "int" => Some(to_int(&args[0], loc)),
        "float" => Some(to_float(&args[0], loc)),
        "input" => Some(read_input(args, loc)),
        "input_prompt" => Some(read_input(args, loc)),
        "error" => Some(Err(RuntimeError::new(render_value(&args[0]), loc))),
        "assert" => Some(match &args[0] {
            Value::Bool(true) => Ok(Value::Unit),
            Value::Bool(false) => Err(RuntimeError::new(
                format!("Assertion failed: {}", render_value(&args[1])),
                loc,
            )),
            _ => Err(RuntimeError::new("assert: expected Bool condition", loc)),
        }),
        "is_int" => Some(Ok(Value::Bool(matches!(args[0], Value::Int(_))))),
        "is_float" => Some(Ok(Value::Bool(matches!(args[0], Value::Float(_))))),
        "is_string" => Some(Ok(Value::Bool(matches!(args[0], Value::Str(_))))),
        "is_bool" => Some(Ok(Value::Bool(matches!(args[0], Value::Bool(_))))),
        "is_list" => Some(Ok(Value::Bool(matches!(args[0], Value::List(_))))),
        "is_tuple" => Some(Ok(Value::Bool(matches!(args[0], Value::Tuple(_))))),
        "is_record" => Some(Ok(Value::Bool(matches!(args[0], Value::Record(_))))),
        "is_fn" => Some(Ok(Value::Bool(matches!(
            args[0],
            Value::Closure(_) | Value::Builtin(_)
        )))),
        _ => None,
    }
}

fn to_int(val: &Value, loc: &Loc) -> Result<Value, RuntimeError> {
    match val {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(f) => Ok(Value::Int(*f as i64)),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| RuntimeError::new(format!("Cannot convert to int: \"{}\"", s), loc)),
        _ => Err(RuntimeError::new("Cannot convert to int", loc)),
    }
}

fn to_float(val: &Value, loc: &Loc) -> Result<Value, RuntimeError> {
    match val {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| RuntimeError::new(format!("Cannot convert to float: \"{}\"", s), loc)),
        _ => Err(RuntimeError::new("Cannot convert to float", loc)),
    }
}

fn read_input(args: &[Value], loc: &Loc) -> Result<Value, RuntimeError> {
    if let Some(prompt) = args.first() {
        print!("{}", render_value(prompt));
        std::io::stdout().flush().ok();
    }
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| RuntimeError::new(format!("input: {}", e), loc))?;
    if line.ends_with('\n') {
        line.pop();
    }
    if line.ends_with('\r') {
        line.pop();
    }
    Ok(Value::Str(line))
}

// ─── Shared argument helpers ─────────────────────────────────────────────────

pub(self) fn expect_str<'a>(
    val: &'a Value,
    what: &str,
    loc: &Loc,
) -> Result<&'a str, RuntimeError> {
    match val {
        Value::Str(s) => Ok(s),
        _ => Err(RuntimeError::new(format!("{}: expected string", what), loc)),
    }
}

pub(self) fn expect_int(val: &Value, what: &str, loc: &Loc) -> Result<i64, RuntimeError> {
    match val {
        Value::Int(i) => Ok(*i),
        _ => Err(RuntimeError::new(format!("{}: expected int", what), loc)),
    }
}

pub(self) fn expect_list<'a>(
    val: &'a Value,
    what: &str,
    loc: &Loc,
) -> Result<&'a [Value], RuntimeError> {
    match val {
        Value::List(items) => Ok(items),
        _ => Err(RuntimeError::new(format!("{}: expected list", what), loc)),
    }
}

/// Numeric view of a value, for math helpers that compute in floats.
pub(self) fn expect_num(val: &Value, what: &str, loc: &Loc) -> Result<f64, RuntimeError> {
    match val {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        _ => Err(RuntimeError::new(format!("{}: expected number", what), loc)),
    }
}
