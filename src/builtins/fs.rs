use std::fs;
use std::io::Write;

use super::expect_str;
use crate::env::Environment;
use crate::location::Loc;
use crate::value::{RuntimeError, Value};

pub fn register(env: &mut Environment) {
    for (name, arity) in [
        ("file_read", 1),
        ("file_write", 2),
        ("file_append", 2),
        ("file_exists", 1),
        ("file_delete", 1),
        ("file_lines", 1),
        ("dir_list", 1),
        ("dir_exists", 1),
    ] {
        super::register(env, name, arity);
    }
}

pub fn call(name: &str, args: &[Value], loc: &Loc) -> Option<Result<Value, RuntimeError>> {
    let result = match name {
        "file_read" => expect_str(&args[0], "file_read", loc).and_then(|path| {
            fs::read_to_string(path).map(Value::Str).map_err(|e| {
                RuntimeError::new(format!("file_read: could not open file: {}: {}", path, e), loc)
            })
        }),
        "file_write" => write_file(args, loc, false),
        "file_append" => write_file(args, loc, true),
        "file_exists" => expect_str(&args[0], "file_exists", loc)
            .map(|path| Value::Bool(std::path::Path::new(path).exists())),
        "file_delete" => expect_str(&args[0], "file_delete", loc).and_then(|path| {
            match fs::remove_file(path) {
                Ok(_) => Ok(Value::Bool(true)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Value::Bool(false)),
                Err(e) => Err(RuntimeError::new(format!("file_delete: {}", e), loc)),
            }
        }),
        "file_lines" => expect_str(&args[0], "file_lines", loc).and_then(|path| {
            let content = fs::read_to_string(path).map_err(|e| {
                RuntimeError::new(
                    format!("file_lines: could not open file: {}: {}", path, e),
                    loc,
                )
            })?;
            Ok(Value::List(
                content
                    .lines()
                    .map(|line| Value::Str(line.to_string()))
                    .collect(),
            ))
        }),
        "dir_list" => expect_str(&args[0], "dir_list", loc).and_then(|path| {
            let entries = fs::read_dir(path)
                .map_err(|e| RuntimeError::new(format!("dir_list: {}", e), loc))?;
            let mut names = Vec::new();
            for entry in entries {
                let entry =
                    entry.map_err(|e| RuntimeError::new(format!("dir_list: {}", e), loc))?;
                names.push(Value::Str(entry.file_name().to_string_lossy().into_owned()));
            }
            Ok(Value::List(names))
        }),
        "dir_exists" => expect_str(&args[0], "dir_exists", loc)
            .map(|path| Value::Bool(std::path::Path::new(path).is_dir())),
        _ => return None,
    };
    Some(result)
}

fn write_file(args: &[Value], loc: &Loc, append: bool) -> Result<Value, RuntimeError> {
    let what = if append { "file_append" } else { "file_write" };
    let path = expect_str(&args[0], what, loc)?;
    let content = expect_str(&args[1], what, loc)?;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(|e| {
            RuntimeError::new(
                format!("{}: could not open file for writing: {}: {}", what, path, e),
                loc,
            )
        })?;
    file.write_all(content.as_bytes())
        .map_err(|e| RuntimeError::new(format!("{}: {}", what, e), loc))?;
    Ok(Value::Unit)
}
