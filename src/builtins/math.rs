/// Numeric helpers. Trigonometry, logarithms and `sqrt`/`pow` compute in
/// floats; `floor`/`ceil`/`round` return ints; `min`/`max` stay integral
/// when both operands are.
use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{expect_int, expect_num};
use crate::env::Environment;
use crate::location::Loc;
use crate::value::{RuntimeError, Value};

pub fn register(env: &mut Environment) {
    for (name, arity) in [
        ("abs", 1),
        ("floor", 1),
        ("ceil", 1),
        ("round", 1),
        ("sqrt", 1),
        ("pow", 2),
        ("min", 2),
        ("max", 2),
        ("sin", 1),
        ("cos", 1),
        ("tan", 1),
        ("asin", 1),
        ("acos", 1),
        ("atan", 1),
        ("atan2", 2),
        ("log", 1),
        ("log10", 1),
        ("exp", 1),
        ("random", 0),
        ("random_int", 2),
    ] {
        super::register(env, name, arity);
    }

    // Mathematical constants
    env.insert("pi", Value::Float(std::f64::consts::PI));
    env.insert("e", Value::Float(std::f64::consts::E));
}

pub fn call(name: &str, args: &[Value], loc: &Loc) -> Option<Result<Value, RuntimeError>> {
    let result = match name {
        "abs" => match &args[0] {
            Value::Int(i) => Ok(Value::Int(i.wrapping_abs())),
            Value::Float(f) => Ok(Value::Float(f.abs())),
            _ => Err(RuntimeError::new("abs: expected number", loc)),
        },
        "floor" => expect_num(&args[0], "floor", loc).map(|n| Value::Int(n.floor() as i64)),
        "ceil" => expect_num(&args[0], "ceil", loc).map(|n| Value::Int(n.ceil() as i64)),
        "round" => expect_num(&args[0], "round", loc).map(|n| Value::Int(n.round() as i64)),
        "sqrt" => expect_num(&args[0], "sqrt", loc).map(|n| Value::Float(n.sqrt())),
        "pow" => {
            let base = match expect_num(&args[0], "pow", loc) {
                Ok(n) => n,
                Err(e) => return Some(Err(e)),
            };
            expect_num(&args[1], "pow", loc).map(|e| Value::Float(base.powf(e)))
        }
        "min" | "max" => min_max(name, &args[0], &args[1], loc),
        "sin" => expect_num(&args[0], "sin", loc).map(|n| Value::Float(n.sin())),
        "cos" => expect_num(&args[0], "cos", loc).map(|n| Value::Float(n.cos())),
        "tan" => expect_num(&args[0], "tan", loc).map(|n| Value::Float(n.tan())),
        "asin" => expect_num(&args[0], "asin", loc).map(|n| Value::Float(n.asin())),
        "acos" => expect_num(&args[0], "acos", loc).map(|n| Value::Float(n.acos())),
        "atan" => expect_num(&args[0], "atan", loc).map(|n| Value::Float(n.atan())),
        "atan2" => {
            let y = match expect_num(&args[0], "atan2", loc) {
                Ok(n) => n,
                Err(e) => return Some(Err(e)),
            };
            expect_num(&args[1], "atan2", loc).map(|x| Value::Float(y.atan2(x)))
        }
        "log" => expect_num(&args[0], "log", loc).map(|n| Value::Float(n.ln())),
        "log10" => expect_num(&args[0], "log10", loc).map(|n| Value::Float(n.log10())),
        "exp" => expect_num(&args[0], "exp", loc).map(|n| Value::Float(n.exp())),
        "random" => Ok(Value::Float(next_random())),
        "random_int" => random_int(&args[0], &args[1], loc),
        _ => return None,
    };
    Some(result)
}

fn min_max(name: &str, a: &Value, b: &Value, loc: &Loc) -> Result<Value, RuntimeError> {
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        let v = if name == "min" {
            (*x).min(*y)
        } else {
            (*x).max(*y)
        };
        return Ok(Value::Int(v));
    }
    let x = expect_num(a, name, loc)?;
    let y = expect_num(b, name, loc)?;
    Ok(Value::Float(if name == "min" { x.min(y) } else { x.max(y) }))
}

fn random_int(min: &Value, max: &Value, loc: &Loc) -> Result<Value, RuntimeError> {
    let lo = expect_int(min, "random_int", loc)?;
    let hi = expect_int(max, "random_int", loc)?;
    if hi < lo {
        return Err(RuntimeError::new("random_int: max is below min", loc));
    }
    let span = (hi - lo) as u64 + 1;
    let r = (next_random() * span as f64) as u64 % span;
    Ok(Value::Int(lo + r as i64))
}

thread_local! {
    static RNG_STATE: Cell<u64> = Cell::new(0);
}

/// xorshift64* seeded from the clock; quality is fine for a language helper.
fn next_random() -> f64 {
    RNG_STATE.with(|state| {
        let mut x = state.get();
        if x == 0 {
            x = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0x9e3779b97f4a7c15)
                | 1;
        }
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        state.set(x);
        (x.wrapping_mul(0x2545f4914f6cdd1d) >> 11) as f64 / (1u64 << 53) as f64
    })
}
