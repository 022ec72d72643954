use std::path::{Path, PathBuf};

use crate::ast::Program;
use crate::lexer::Lexer;
use crate::parser::Parser;

pub fn parse_source(source: &str, filename: &str) -> Result<Program, String> {
    let mut lexer = Lexer::new(source, filename);
    let tokens = lexer.tokenize().map_err(|e| e.to_string())?;
    let mut parser = Parser::new(tokens);
    parser.parse().map_err(|e| e.to_string())
}

/// Resolve a bare module name to a `.stsn` file. Tried in order: the current
/// base path, each configured search path, the working directory, then the
/// installation locations.
pub fn find_module_file(
    name: &str,
    base_path: &Path,
    search_paths: &[PathBuf],
) -> Option<PathBuf> {
    let filename = format!("{}.stsn", name);

    let candidate = base_path.join(&filename);
    if candidate.exists() {
        return Some(candidate);
    }

    for dir in search_paths {
        let candidate = dir.join(&filename);
        if candidate.exists() {
            return Some(candidate);
        }
    }

    let cwd = PathBuf::from(&filename);
    if cwd.exists() {
        return Some(cwd);
    }

    for dir in [
        "stdlib",
        "../stdlib",
        "/usr/local/share/setsuna/stdlib",
        "/usr/share/setsuna/stdlib",
    ] {
        let candidate = Path::new(dir).join(&filename);
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}
