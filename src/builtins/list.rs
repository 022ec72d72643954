use super::{expect_int, expect_list, expect_num, expect_str};
use crate::env::Environment;
use crate::location::Loc;
use crate::value::{RuntimeError, Value};

pub fn register(env: &mut Environment) {
    for (name, arity) in [
        ("head", 1),
        ("tail", 1),
        ("cons", 2),
        ("len", 1),
        ("empty", 1),
        ("append", 2),
        ("concat", 2),
        ("reverse", 1),
        ("nth", 2),
        ("range", 2),
        ("sort", 1),
        ("compare", 2),
    ] {
        super::register(env, name, arity);
    }
}

pub fn call(name: &str, args: &[Value], loc: &Loc) -> Option<Result<Value, RuntimeError>> {
    let result = match name {
        "head" => expect_list(&args[0], "head", loc).and_then(|items| {
            items
                .first()
                .cloned()
                .ok_or_else(|| RuntimeError::new("head: empty list", loc))
        }),
        "tail" => expect_list(&args[0], "tail", loc).and_then(|items| {
            if items.is_empty() {
                Err(RuntimeError::new("tail: empty list", loc))
            } else {
                Ok(Value::List(items[1..].to_vec()))
            }
        }),
        "cons" => expect_list(&args[1], "cons", loc).map(|items| {
            let mut result = Vec::with_capacity(items.len() + 1);
            result.push(args[0].clone());
            result.extend_from_slice(items);
            Value::List(result)
        }),
        "len" => match &args[0] {
            Value::List(items) => Ok(Value::Int(items.len() as i64)),
            Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
            Value::Tuple(items) => Ok(Value::Int(items.len() as i64)),
            _ => Err(RuntimeError::new("len: expected list, string, or tuple", loc)),
        },
        "empty" => match &args[0] {
            Value::List(items) => Ok(Value::Bool(items.is_empty())),
            Value::Str(s) => Ok(Value::Bool(s.is_empty())),
            _ => Err(RuntimeError::new("empty: expected list or string", loc)),
        },
        "append" => expect_list(&args[0], "append", loc).map(|items| {
            let mut result = items.to_vec();
            result.push(args[1].clone());
            Value::List(result)
        }),
        "concat" => {
            let a = match expect_list(&args[0], "concat", loc) {
                Ok(items) => items,
                Err(e) => return Some(Err(e)),
            };
            expect_list(&args[1], "concat", loc).map(|b| {
                let mut result = a.to_vec();
                result.extend_from_slice(b);
                Value::List(result)
            })
        }
        "reverse" => expect_list(&args[0], "reverse", loc).map(|items| {
            let mut result = items.to_vec();
            result.reverse();
            Value::List(result)
        }),
        "nth" => {
            let items = match expect_list(&args[0], "nth", loc) {
                Ok(items) => items,
                Err(e) => return Some(Err(e)),
            };
            expect_int(&args[1], "nth", loc).and_then(|idx| {
                usize::try_from(idx)
                    .ok()
                    .and_then(|i| items.get(i).cloned())
                    .ok_or_else(|| RuntimeError::new("nth: index out of bounds", loc))
            })
        }
        "range" => {
            let start = match expect_int(&args[0], "range", loc) {
                Ok(i) => i,
                Err(e) => return Some(Err(e)),
            };
            expect_int(&args[1], "range", loc)
                .map(|end| Value::List((start..end).map(Value::Int).collect()))
        }
        "sort" => sort(&args[0], loc),
        "compare" => compare(&args[0], &args[1], loc),
        _ => return None,
    };
    Some(result)
}

/// Ascending sort over a homogeneous list of numbers or strings; the first
/// element decides which.
fn sort(list: &Value, loc: &Loc) -> Result<Value, RuntimeError> {
    let items = expect_list(list, "sort", loc)?;
    if items.is_empty() {
        return Ok(Value::List(Vec::new()));
    }

    let mut result = items.to_vec();
    match &result[0] {
        Value::Int(_) | Value::Float(_) => {
            for item in &result {
                expect_num(item, "sort", loc)?;
            }
            result.sort_by(|a, b| {
                let x = expect_num(a, "sort", loc).unwrap_or(f64::NAN);
                let y = expect_num(b, "sort", loc).unwrap_or(f64::NAN);
                x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        Value::Str(_) => {
            for item in &result {
                expect_str(item, "sort", loc)?;
            }
            result.sort_by(|a, b| match (a, b) {
                (Value::Str(x), Value::Str(y)) => x.cmp(y),
                _ => std::cmp::Ordering::Equal,
            });
        }
        _ => {
            return Err(RuntimeError::new(
                "sort: can only sort lists of numbers or strings",
                loc,
            ))
        }
    }
    Ok(Value::List(result))
}

/// Three-way comparison of numbers or strings, as -1 / 0 / 1.
fn compare(a: &Value, b: &Value, loc: &Loc) -> Result<Value, RuntimeError> {
    let ordering = match (a, b) {
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        _ => {
            let x = expect_num(a, "compare", loc)
                .map_err(|_| RuntimeError::new("compare: can only compare numbers or strings", loc))?;
            let y = expect_num(b, "compare", loc)
                .map_err(|_| RuntimeError::new("compare: can only compare numbers or strings", loc))?;
            x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal)
        }
    };
    Ok(Value::Int(match ordering {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }))
}
