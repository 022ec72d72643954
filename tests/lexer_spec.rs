/// Spec tests for the Setsuna lexer.
///
/// Each test verifies that specific source text tokenises to the expected
/// sequence of token kinds. Structural tokens (Newline, Eof) are filtered
/// out unless the test is specifically about structure or locations.
use setsuna::lexer::{Lexer, TokenKind};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn lex_all(src: &str) -> Vec<TokenKind> {
    Lexer::new(src, "<test>")
        .tokenize()
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn lex(src: &str) -> Vec<TokenKind> {
    lex_all(src)
        .into_iter()
        .filter(|k| !matches!(k, TokenKind::Newline | TokenKind::Eof))
        .collect()
}

fn lex_err(src: &str) -> String {
    Lexer::new(src, "<test>")
        .tokenize()
        .unwrap_err()
        .to_string()
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

#[test]
fn int_literal() {
    assert_eq!(lex("42"), vec![TokenKind::Int(42)]);
}

#[test]
fn int_zero() {
    assert_eq!(lex("0"), vec![TokenKind::Int(0)]);
}

#[test]
fn float_literal() {
    assert_eq!(lex("3.14"), vec![TokenKind::Float(3.14)]);
}

#[test]
fn int_then_method_dot_is_not_float() {
    // A dot not followed by a digit stays a Dot token
    assert_eq!(
        lex("1.x"),
        vec![
            TokenKind::Int(1),
            TokenKind::Dot,
            TokenKind::Ident("x".to_string())
        ]
    );
}

#[test]
fn string_basic() {
    assert_eq!(lex("\"hello\""), vec![TokenKind::Str("hello".to_string())]);
}

#[test]
fn string_empty() {
    assert_eq!(lex("\"\""), vec![TokenKind::Str(String::new())]);
}

#[test]
fn string_escapes() {
    assert_eq!(
        lex(r#""a\nb\tc\\d\"e""#),
        vec![TokenKind::Str("a\nb\tc\\d\"e".to_string())]
    );
}

#[test]
fn string_unknown_escape_keeps_char() {
    assert_eq!(lex(r#""a\qb""#), vec![TokenKind::Str("aqb".to_string())]);
}

#[test]
fn string_unterminated_is_error() {
    assert!(lex_err("\"abc").contains("Unterminated string"));
}

#[test]
fn bool_keywords() {
    assert_eq!(lex("true false"), vec![TokenKind::True, TokenKind::False]);
}

// ---------------------------------------------------------------------------
// Interpolated strings
// ---------------------------------------------------------------------------

#[test]
fn fstring_splits_literal_and_expr_parts() {
    assert_eq!(
        lex("f\"a {x} b\""),
        vec![TokenKind::FStr(vec![
            (false, "a ".to_string()),
            (true, "x".to_string()),
            (false, " b".to_string()),
        ])]
    );
}

#[test]
fn fstring_nested_braces_balance() {
    assert_eq!(
        lex("f\"{ { a: 1 } }\""),
        vec![TokenKind::FStr(vec![(true, " { a: 1 } ".to_string())])]
    );
}

#[test]
fn fstring_without_interpolation() {
    assert_eq!(
        lex("f\"plain\""),
        vec![TokenKind::FStr(vec![(false, "plain".to_string())])]
    );
}

#[test]
fn ident_starting_with_f_is_not_fstring() {
    assert_eq!(lex("foo"), vec![TokenKind::Ident("foo".to_string())]);
}

// ---------------------------------------------------------------------------
// Identifiers and keywords
// ---------------------------------------------------------------------------

#[test]
fn ident_simple() {
    assert_eq!(lex("myVar"), vec![TokenKind::Ident("myVar".to_string())]);
}

#[test]
fn ident_with_underscore_and_digits() {
    assert_eq!(lex("_x1"), vec![TokenKind::Ident("_x1".to_string())]);
}

#[test]
fn all_keywords() {
    assert_eq!(
        lex("let const fn if else match while for in as type module import"),
        vec![
            TokenKind::Let,
            TokenKind::Const,
            TokenKind::Fn,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::Match,
            TokenKind::While,
            TokenKind::For,
            TokenKind::In,
            TokenKind::As,
            TokenKind::Type,
            TokenKind::Module,
            TokenKind::Import,
        ]
    );
}

#[test]
fn keyword_prefix_is_ident() {
    assert_eq!(lex("letter"), vec![TokenKind::Ident("letter".to_string())]);
}

// ---------------------------------------------------------------------------
// Operators and delimiters
// ---------------------------------------------------------------------------

#[test]
fn single_char_operators() {
    assert_eq!(
        lex("+ - * / % < > ! ="),
        vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::Not,
            TokenKind::Assign,
        ]
    );
}

#[test]
fn multi_char_operators() {
    assert_eq!(
        lex("=> == != <= >= && || ::"),
        vec![
            TokenKind::FatArrow,
            TokenKind::Eq,
            TokenKind::Neq,
            TokenKind::Lte,
            TokenKind::Gte,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::DoubleColon,
        ]
    );
}

#[test]
fn dotdotdot() {
    assert_eq!(
        lex("...rest"),
        vec![TokenKind::DotDotDot, TokenKind::Ident("rest".to_string())]
    );
}

#[test]
fn map_start_token() {
    assert_eq!(
        lex("%{ }"),
        vec![TokenKind::MapStart, TokenKind::RBrace]
    );
}

#[test]
fn percent_alone_is_modulo() {
    assert_eq!(
        lex("a % b"),
        vec![
            TokenKind::Ident("a".to_string()),
            TokenKind::Percent,
            TokenKind::Ident("b".to_string())
        ]
    );
}

#[test]
fn delimiters() {
    assert_eq!(
        lex("( ) { } [ ] , : ; ."),
        vec![
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::Semicolon,
            TokenKind::Dot,
        ]
    );
}

#[test]
fn lone_ampersand_is_error() {
    assert!(lex_err("a & b").contains("Unexpected character"));
}

#[test]
fn lone_pipe_is_error() {
    assert!(lex_err("a | b").contains("Unexpected character"));
}

// ---------------------------------------------------------------------------
// Comments, whitespace, newlines
// ---------------------------------------------------------------------------

#[test]
fn line_comment_skipped() {
    assert_eq!(lex("1 // comment\n2"), vec![TokenKind::Int(1), TokenKind::Int(2)]);
}

#[test]
fn newline_is_a_token() {
    assert_eq!(
        lex_all("1\n2"),
        vec![
            TokenKind::Int(1),
            TokenKind::Newline,
            TokenKind::Int(2),
            TokenKind::Eof
        ]
    );
}

#[test]
fn crlf_newline_handling() {
    assert_eq!(
        lex_all("1\r\n2"),
        vec![
            TokenKind::Int(1),
            TokenKind::Newline,
            TokenKind::Int(2),
            TokenKind::Eof
        ]
    );
}

#[test]
fn eof_always_last() {
    assert_eq!(lex_all(""), vec![TokenKind::Eof]);
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

#[test]
fn token_columns_advance() {
    let tokens = Lexer::new("let xs = 1", "<test>").tokenize().unwrap();
    let cols: Vec<usize> = tokens.iter().map(|t| t.loc.col).collect();
    assert_eq!(cols, vec![1, 5, 8, 10, 11]);
}

#[test]
fn token_lines_advance() {
    let tokens = Lexer::new("1\n  2", "<test>").tokenize().unwrap();
    assert_eq!(tokens[0].loc.line, 1);
    assert_eq!(tokens[2].loc.line, 2);
    assert_eq!(tokens[2].loc.col, 3);
}

#[test]
fn unknown_char_error_has_exact_column() {
    // '@' sits at line 1, column 5
    let err = lex_err("let @");
    assert!(err.contains("<test>:1:5"), "got: {}", err);
    assert!(err.contains("Unexpected character"), "got: {}", err);
}

#[test]
fn filename_attached_to_locations() {
    let tokens = Lexer::new("1", "demo.stsn").tokenize().unwrap();
    assert_eq!(&*tokens[0].loc.file, "demo.stsn");
}
