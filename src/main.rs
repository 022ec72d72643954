use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser as ClapParser;
use colored::Colorize;

use setsuna::interpreter::Evaluator;
use setsuna::source::parse_source;
use setsuna::typechecker;
use setsuna::value::{render_value, Value};

#[derive(ClapParser)]
#[command(name = "setsuna", version, about = "The Setsuna programming language")]
struct Cli {
    /// Script to run (`.stsn`); starts the REPL when omitted
    file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let code = match cli.file {
        Some(file) => run_file(&file),
        None => {
            repl();
            0
        }
    };
    std::process::exit(code);
}

fn run_file(path: &Path) -> i32 {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!(
                "{}",
                format!("Could not open file: {}: {}", path.display(), e).red()
            );
            return 1;
        }
    };

    let filename = path.display().to_string();
    let program = match parse_source(&source, &filename) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e.red());
            return 1;
        }
    };

    // The checker is advisory: report, then execute regardless
    for te in typechecker::check(&program) {
        eprintln!("{}", te.to_string().yellow());
    }

    let mut evaluator = Evaluator::new();
    if let Some(parent) = path.parent() {
        evaluator.set_base_path(parent);
    }
    load_prelude(&mut evaluator);

    match evaluator.eval_program(&program) {
        Ok(value) => {
            if value != Value::Unit {
                println!("{}", render_value(&value));
            }
            0
        }
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            1
        }
    }
}

const PRELUDE_PATHS: &[&str] = &[
    "stdlib/prelude.stsn",
    "../stdlib/prelude.stsn",
    "../../stdlib/prelude.stsn",
    "/usr/local/share/setsuna/prelude.stsn",
    "/usr/share/setsuna/prelude.stsn",
];

/// Execute the standard-library prelude in the global environment before
/// user code. Its absence is not an error.
fn load_prelude(evaluator: &mut Evaluator) {
    let Some(path) = PRELUDE_PATHS.iter().find(|p| Path::new(p).exists()) else {
        return;
    };
    let Ok(source) = fs::read_to_string(path) else {
        return;
    };

    let outcome = parse_source(&source, path)
        .map_err(|e| e.to_string())
        .and_then(|program| {
            evaluator
                .eval_program(&program)
                .map(|_| ())
                .map_err(|e| e.to_string())
        });
    if let Err(e) = outcome {
        eprintln!("{}", format!("Warning: failed to load prelude: {}", e).yellow());
    }
}

/// Interactive prompt. Lines accumulate until `{}`/`[]`/`()` balance, then
/// the buffer is parsed and evaluated; non-unit results echo as `=> value`.
fn repl() {
    println!(
        "Setsuna v{} - Functional Programming Language",
        env!("CARGO_PKG_VERSION")
    );
    println!("Type expressions to evaluate. Type 'exit' or Ctrl+D to quit.\n");

    let mut evaluator = Evaluator::new();
    load_prelude(&mut evaluator);

    let stdin = io::stdin();
    let mut buffer = String::new();
    let (mut braces, mut brackets, mut parens) = (0i32, 0i32, 0i32);

    loop {
        let prompt = if buffer.is_empty() { ">> " } else { ".. " };
        print!("{}", prompt.cyan());
        io::stdout().flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(_) => break,
        }
        let line = line.trim_end_matches(['\n', '\r']);

        if buffer.is_empty() && line.trim() == "exit" {
            println!("Goodbye!");
            break;
        }

        for c in line.chars() {
            match c {
                '{' => braces += 1,
                '}' => braces -= 1,
                '[' => brackets += 1,
                ']' => brackets -= 1,
                '(' => parens += 1,
                ')' => parens -= 1,
                _ => {}
            }
        }

        buffer.push_str(line);
        buffer.push('\n');

        if braces > 0 || brackets > 0 || parens > 0 {
            continue;
        }
        braces = 0;
        brackets = 0;
        parens = 0;

        let source = std::mem::take(&mut buffer);
        if source.trim().is_empty() {
            continue;
        }

        match parse_source(&source, "<repl>") {
            Ok(program) => match evaluator.eval_program(&program) {
                Ok(value) => {
                    if value != Value::Unit {
                        println!("=> {}", render_value(&value));
                    }
                }
                Err(e) => eprintln!("{}", e.to_string().red()),
            },
            Err(e) => eprintln!("{}", e.red()),
        }
    }
}
