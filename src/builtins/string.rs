use super::{expect_int, expect_list, expect_str};
use crate::env::Environment;
use crate::location::Loc;
use crate::value::{render_value, RuntimeError, Value};

pub fn register(env: &mut Environment) {
    for (name, arity) in [
        ("substr", 3),
        ("split", 2),
        ("join", 2),
        ("uppercase", 1),
        ("lowercase", 1),
        ("trim", 1),
        ("trim_start", 1),
        ("trim_end", 1),
        ("contains", 2),
        ("starts_with", 2),
        ("ends_with", 2),
        ("replace", 3),
        ("replace_all", 3),
        ("char_at", 2),
        ("chars", 1),
        ("index_of", 2),
    ] {
        super::register(env, name, arity);
    }
}

pub fn call(name: &str, args: &[Value], loc: &Loc) -> Option<Result<Value, RuntimeError>> {
    let result = match name {
        "substr" => substr(args, loc),
        "split" => split(args, loc),
        "join" => join(args, loc),
        "uppercase" => {
            expect_str(&args[0], "uppercase", loc).map(|s| Value::Str(s.to_uppercase()))
        }
        "lowercase" => {
            expect_str(&args[0], "lowercase", loc).map(|s| Value::Str(s.to_lowercase()))
        }
        "trim" => expect_str(&args[0], "trim", loc).map(|s| Value::Str(s.trim().to_string())),
        "trim_start" => {
            expect_str(&args[0], "trim_start", loc).map(|s| Value::Str(s.trim_start().to_string()))
        }
        "trim_end" => {
            expect_str(&args[0], "trim_end", loc).map(|s| Value::Str(s.trim_end().to_string()))
        }
        "contains" => two_strs(args, "contains", loc).map(|(s, n)| Value::Bool(s.contains(n))),
        "starts_with" => {
            two_strs(args, "starts_with", loc).map(|(s, p)| Value::Bool(s.starts_with(p)))
        }
        "ends_with" => {
            two_strs(args, "ends_with", loc).map(|(s, x)| Value::Bool(s.ends_with(x)))
        }
        "replace" => replace(args, loc, false),
        "replace_all" => replace(args, loc, true),
        "char_at" => char_at(args, loc),
        "chars" => expect_str(&args[0], "chars", loc).map(|s| {
            Value::List(s.chars().map(|c| Value::Str(c.to_string())).collect())
        }),
        "index_of" => two_strs(args, "index_of", loc).map(|(s, n)| {
            // Index is in characters, consistent with char_at / substr
            match s.find(n) {
                Some(byte_pos) => Value::Int(s[..byte_pos].chars().count() as i64),
                None => Value::Int(-1),
            }
        }),
        _ => return None,
    };
    Some(result)
}

fn two_strs<'a>(
    args: &'a [Value],
    what: &str,
    loc: &Loc,
) -> Result<(&'a str, &'a str), RuntimeError> {
    Ok((
        expect_str(&args[0], what, loc)?,
        expect_str(&args[1], what, loc)?,
    ))
}

fn substr(args: &[Value], loc: &Loc) -> Result<Value, RuntimeError> {
    let s = expect_str(&args[0], "substr", loc)?;
    let start = expect_int(&args[1], "substr", loc)?;
    let len = expect_int(&args[2], "substr", loc)?;
    let start = usize::try_from(start)
        .map_err(|_| RuntimeError::new("substr: index out of bounds", loc))?;
    let len = usize::try_from(len).unwrap_or(0);

    let chars: Vec<char> = s.chars().collect();
    if start > chars.len() {
        return Err(RuntimeError::new("substr: index out of bounds", loc));
    }
    let end = (start + len).min(chars.len());
    Ok(Value::Str(chars[start..end].iter().collect()))
}

fn split(args: &[Value], loc: &Loc) -> Result<Value, RuntimeError> {
    let (s, delim) = two_strs(args, "split", loc)?;
    if delim.is_empty() {
        return Err(RuntimeError::new("split: empty delimiter", loc));
    }
    Ok(Value::List(
        s.split(delim)
            .map(|part| Value::Str(part.to_string()))
            .collect(),
    ))
}

fn join(args: &[Value], loc: &Loc) -> Result<Value, RuntimeError> {
    let items = expect_list(&args[0], "join", loc)?;
    let delim = expect_str(&args[1], "join", loc)?;
    let parts: Vec<String> = items.iter().map(render_value).collect();
    Ok(Value::Str(parts.join(delim)))
}

fn replace(args: &[Value], loc: &Loc, all: bool) -> Result<Value, RuntimeError> {
    let what = if all { "replace_all" } else { "replace" };
    let s = expect_str(&args[0], what, loc)?;
    let old = expect_str(&args[1], what, loc)?;
    let new = expect_str(&args[2], what, loc)?;
    if old.is_empty() {
        return Ok(Value::Str(s.to_string()));
    }
    let replaced = if all {
        s.replace(old, new)
    } else {
        s.replacen(old, new, 1)
    };
    Ok(Value::Str(replaced))
}

fn char_at(args: &[Value], loc: &Loc) -> Result<Value, RuntimeError> {
    let s = expect_str(&args[0], "char_at", loc)?;
    let idx = expect_int(&args[1], "char_at", loc)?;
    usize::try_from(idx)
        .ok()
        .and_then(|i| s.chars().nth(i))
        .map(|c| Value::Str(c.to_string()))
        .ok_or_else(|| RuntimeError::new("char_at: index out of bounds", loc))
}
