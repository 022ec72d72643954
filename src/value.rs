/// Core Setsuna runtime value type and associated utilities.
///
/// Lives in its own module so the interpreter, the builtin catalogue and the
/// REPL can all import it without circular dependencies.
use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::Expr;
use crate::env::EnvRef;
use crate::location::Loc;

// ---------------------------------------------------------------------------
// RuntimeError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
#[error("{loc}: error: {msg}")]
pub struct RuntimeError {
    pub msg: String,
    pub loc: Loc,
}

impl RuntimeError {
    pub fn new(msg: impl Into<String>, loc: &Loc) -> Self {
        RuntimeError {
            msg: msg.into(),
            loc: loc.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Closure {
    pub params: Vec<String>,
    pub body: Rc<Expr>,
    pub env: EnvRef,
}

/// Opaque callable of fixed arity; `-1` means variadic. Bodies are dispatched
/// by name inside the evaluator so the value itself stays plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct Builtin {
    pub name: String,
    pub arity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdtValue {
    pub type_name: String,
    pub ctor: String,
    pub fields: Vec<Value>,
}

/// Deferred expression plus the environment needed to resume it. The cache
/// is filled on first force; the strict core never constructs one.
#[derive(Debug)]
pub struct ThunkValue {
    pub expr: Rc<Expr>,
    pub env: EnvRef,
    pub cached: RefCell<Option<Value>>,
}

#[derive(Debug, Clone)]
pub enum Value {
    Unit,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// Field insertion order is stable within an instance but not observable
    /// to the language; equality ignores it.
    Record(Vec<(String, Value)>),
    /// Ordered entries keyed by structural value equality.
    Map(Vec<(Value, Value)>),
    Closure(Rc<Closure>),
    Builtin(Builtin),
    Adt(Rc<AdtValue>),
    Thunk(Rc<ThunkValue>),
}

impl PartialEq for Value {
    /// Structural equality: same tagged variant with equal components,
    /// recursively. No numeric coercion. Records compare field sets, maps
    /// compare by key lookup; closures and thunks only equal themselves.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.iter().any(|(k2, v2)| k == k2 && v == v2))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| map_get(b, k) == Some(v))
            }
            (Value::Adt(a), Value::Adt(b)) => {
                a.type_name == b.type_name && a.ctor == b.ctor && a.fields == b.fields
            }
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Thunk(a), Value::Thunk(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Look up a map entry by structural key equality.
pub fn map_get<'a>(entries: &'a [(Value, Value)], key: &Value) -> Option<&'a Value> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Insert or overwrite a map entry; a later entry for an equal key replaces
/// the earlier one in place.
pub fn map_insert(entries: &mut Vec<(Value, Value)>, key: Value, value: Value) {
    for (k, v) in entries.iter_mut() {
        if *k == key {
            *v = value;
            return;
        }
    }
    entries.push((key, value));
}

// ---------------------------------------------------------------------------
// Canonical printing
// ---------------------------------------------------------------------------

fn fmt_float(f: f64) -> String {
    let s = format!("{}", f);
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{}.0", s)
    }
}

/// Canonical text form of a value: strings appear raw at the top level.
/// Used by `print`, uncaught top-level results and string interpolation.
pub fn render_value(val: &Value) -> String {
    match val {
        Value::Str(s) => s.clone(),
        other => render_nested(other),
    }
}

/// Like `render_value` but strings get quoted — the form used inside lists,
/// tuples, records and maps.
pub fn render_nested(val: &Value) -> String {
    match val {
        Value::Unit => "()".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => fmt_float(*f),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Str(s) => format!("\"{}\"", s),
        Value::List(items) => {
            let parts: Vec<String> = items.iter().map(render_nested).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Tuple(items) => {
            let parts: Vec<String> = items.iter().map(render_nested).collect();
            format!("({})", parts.join(", "))
        }
        Value::Record(fields) => {
            let parts: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{}: {}", k, render_nested(v)))
                .collect();
            format!("{{ {} }}", parts.join(", "))
        }
        Value::Map(entries) => {
            let parts: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", render_nested(k), render_nested(v)))
                .collect();
            format!("%{{ {} }}", parts.join(", "))
        }
        Value::Adt(adt) => {
            if adt.fields.is_empty() {
                adt.ctor.clone()
            } else {
                let parts: Vec<String> = adt.fields.iter().map(render_nested).collect();
                format!("{}({})", adt.ctor, parts.join(", "))
            }
        }
        Value::Closure(_) => "<fn>".to_string(),
        Value::Builtin(b) => format!("<builtin:{}>", b.name),
        Value::Thunk(_) => "<thunk>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_rendering_keeps_trailing_zero() {
        assert_eq!(render_nested(&Value::Float(4.0)), "4.0");
        assert_eq!(render_nested(&Value::Float(3.14)), "3.14");
    }

    #[test]
    fn string_raw_at_top_level_quoted_nested() {
        assert_eq!(render_value(&Value::Str("hi".into())), "hi");
        assert_eq!(
            render_value(&Value::List(vec![Value::Str("hi".into())])),
            "[\"hi\"]"
        );
    }

    #[test]
    fn record_equality_ignores_field_order() {
        let a = Value::Record(vec![
            ("x".to_string(), Value::Int(1)),
            ("y".to_string(), Value::Int(2)),
        ]);
        let b = Value::Record(vec![
            ("y".to_string(), Value::Int(2)),
            ("x".to_string(), Value::Int(1)),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn map_insert_overwrites_equal_key() {
        let mut entries = Vec::new();
        map_insert(&mut entries, Value::Int(1), Value::Str("a".into()));
        map_insert(&mut entries, Value::Int(1), Value::Str("b".into()));
        assert_eq!(entries.len(), 1);
        assert_eq!(map_get(&entries, &Value::Int(1)), Some(&Value::Str("b".into())));
    }

    #[test]
    fn no_numeric_coercion_in_equality() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }
}
