use std::rc::Rc;

use thiserror::Error;

use crate::location::Loc;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    /// Interpolated string `f"…"`, pre-split into (is_expr, text) parts.
    /// Expression parts hold raw source text; the parser sub-parses them.
    FStr(Vec<(bool, String)>),
    Ident(String),
    // Keywords
    Let,
    Const,
    Fn,
    If,
    Else,
    Match,
    While,
    For,
    In,
    As,
    Type,
    Module,
    Import,
    True,
    False,
    // Operators
    Plus,        // +
    Minus,       // -
    Star,        // *
    Slash,       // /
    Percent,     // %
    Eq,          // ==
    Neq,         // !=
    Lt,          // <
    Gt,          // >
    Lte,         // <=
    Gte,         // >=
    And,         // &&
    Or,          // ||
    Not,         // !
    Assign,      // =
    FatArrow,    // =>
    // Delimiters
    LParen,      // (
    RParen,      // )
    LBrace,      // {
    RBrace,      // }
    LBracket,    // [
    RBracket,    // ]
    MapStart,    // %{
    Comma,       // ,
    Colon,       // :
    DoubleColon, // ::
    Semicolon,   // ;
    Dot,         // .
    DotDotDot,   // ...
    // Structure
    Newline,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: Loc,
}

#[derive(Debug, Error)]
#[error("{loc}: error: {msg}")]
pub struct LexerError {
    pub msg: String,
    pub loc: Loc,
}

fn keyword(s: &str) -> Option<TokenKind> {
    match s {
        "let" => Some(TokenKind::Let),
        "const" => Some(TokenKind::Const),
        "fn" => Some(TokenKind::Fn),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "match" => Some(TokenKind::Match),
        "while" => Some(TokenKind::While),
        "for" => Some(TokenKind::For),
        "in" => Some(TokenKind::In),
        "as" => Some(TokenKind::As),
        "type" => Some(TokenKind::Type),
        "module" => Some(TokenKind::Module),
        "import" => Some(TokenKind::Import),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        _ => None,
    }
}

pub struct Lexer {
    chars: Vec<char>,
    file: Rc<str>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str, filename: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            file: Rc::from(filename),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn error(&self, msg: impl Into<String>) -> LexerError {
        LexerError {
            msg: msg.into(),
            loc: self.here(),
        }
    }

    fn here(&self) -> Loc {
        Loc::new(Rc::clone(&self.file), self.line, self.col)
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.current() {
                Some(' ') | Some('\t') | Some('\r') => {
                    self.advance();
                }
                Some('/') if self.peek(1) == Some('/') => {
                    while let Some(c) = self.current() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace_and_comments();

        let loc = self.here();

        let ch = match self.current() {
            Some(c) => c,
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    loc,
                })
            }
        };

        if ch == '\n' {
            self.advance();
            return Ok(Token {
                kind: TokenKind::Newline,
                loc,
            });
        }

        if ch.is_ascii_digit() {
            return self.scan_number();
        }

        if ch == '"' {
            return self.scan_string();
        }

        // Interpolated string: f"..."
        if ch == 'f' && self.peek(1) == Some('"') {
            return self.scan_fstring();
        }

        if ch.is_alphabetic() || ch == '_' {
            return Ok(self.scan_identifier());
        }

        self.scan_operator()
    }

    fn scan_number(&mut self) -> Result<Token, LexerError> {
        let loc = self.here();
        let mut text = String::new();
        let mut is_float = false;

        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if self.current() == Some('.') && self.peek(1).map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            is_float = true;
            text.push('.');
            self.advance();
            while let Some(c) = self.current() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let kind = if is_float {
            let f: f64 = text
                .parse()
                .map_err(|_| self.error("Invalid floating-point literal"))?;
            TokenKind::Float(f)
        } else {
            let i: i64 = text
                .parse()
                .map_err(|_| self.error("Invalid integer literal"))?;
            TokenKind::Int(i)
        };
        Ok(Token { kind, loc })
    }

    fn scan_escape(&mut self, out: &mut String) -> Result<(), LexerError> {
        self.advance(); // consume backslash
        match self.advance() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            // Unknown escape keeps the trailing character verbatim
            Some(c) => out.push(c),
            None => return Err(self.error("Unterminated string literal")),
        }
        Ok(())
    }

    fn scan_string(&mut self) -> Result<Token, LexerError> {
        let loc = self.here();
        self.advance(); // opening quote

        let mut text = String::new();
        loop {
            match self.current() {
                None => {
                    return Err(LexerError {
                        msg: "Unterminated string literal".to_string(),
                        loc,
                    })
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => self.scan_escape(&mut text)?,
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }

        Ok(Token {
            kind: TokenKind::Str(text),
            loc,
        })
    }

    /// `f"text {expr} text"` — literal runs and brace-balanced expression
    /// regions are split here; the parser re-parses the expression text.
    fn scan_fstring(&mut self) -> Result<Token, LexerError> {
        let loc = self.here();
        self.advance(); // 'f'
        self.advance(); // opening quote

        let mut parts: Vec<(bool, String)> = Vec::new();
        let mut current = String::new();

        loop {
            match self.current() {
                None => {
                    return Err(LexerError {
                        msg: "Unterminated string literal".to_string(),
                        loc,
                    })
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('{') => {
                    if !current.is_empty() {
                        parts.push((false, std::mem::take(&mut current)));
                    }
                    self.advance();
                    let mut expr_text = String::new();
                    let mut depth = 1usize;
                    loop {
                        match self.current() {
                            None => {
                                return Err(LexerError {
                                    msg: "Unterminated interpolation in string".to_string(),
                                    loc,
                                })
                            }
                            Some('{') => {
                                depth += 1;
                                expr_text.push('{');
                                self.advance();
                            }
                            Some('}') => {
                                depth -= 1;
                                self.advance();
                                if depth == 0 {
                                    break;
                                }
                                expr_text.push('}');
                            }
                            Some(c) => {
                                expr_text.push(c);
                                self.advance();
                            }
                        }
                    }
                    parts.push((true, expr_text));
                }
                Some('\\') => self.scan_escape(&mut current)?,
                Some(c) => {
                    current.push(c);
                    self.advance();
                }
            }
        }

        if !current.is_empty() {
            parts.push((false, current));
        }

        Ok(Token {
            kind: TokenKind::FStr(parts),
            loc,
        })
    }

    fn scan_identifier(&mut self) -> Token {
        let loc = self.here();
        let mut ident = String::new();

        while let Some(c) = self.current() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = keyword(&ident).unwrap_or(TokenKind::Ident(ident));
        Token { kind, loc }
    }

    fn scan_operator(&mut self) -> Result<Token, LexerError> {
        let loc = self.here();
        let ch = self.current().unwrap();

        // Two-character operators by lookahead, then the three-character `...`
        let two = self.peek(1);
        let kind = match (ch, two) {
            ('=', Some('>')) => {
                self.advance();
                self.advance();
                TokenKind::FatArrow
            }
            ('=', Some('=')) => {
                self.advance();
                self.advance();
                TokenKind::Eq
            }
            ('!', Some('=')) => {
                self.advance();
                self.advance();
                TokenKind::Neq
            }
            ('<', Some('=')) => {
                self.advance();
                self.advance();
                TokenKind::Lte
            }
            ('>', Some('=')) => {
                self.advance();
                self.advance();
                TokenKind::Gte
            }
            ('&', Some('&')) => {
                self.advance();
                self.advance();
                TokenKind::And
            }
            ('|', Some('|')) => {
                self.advance();
                self.advance();
                TokenKind::Or
            }
            (':', Some(':')) => {
                self.advance();
                self.advance();
                TokenKind::DoubleColon
            }
            ('.', Some('.')) if self.peek(2) == Some('.') => {
                self.advance();
                self.advance();
                self.advance();
                TokenKind::DotDotDot
            }
            ('%', Some('{')) => {
                self.advance();
                self.advance();
                TokenKind::MapStart
            }
            _ => {
                self.advance();
                match ch {
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    '*' => TokenKind::Star,
                    '/' => TokenKind::Slash,
                    '%' => TokenKind::Percent,
                    '<' => TokenKind::Lt,
                    '>' => TokenKind::Gt,
                    '!' => TokenKind::Not,
                    '=' => TokenKind::Assign,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    ',' => TokenKind::Comma,
                    ':' => TokenKind::Colon,
                    ';' => TokenKind::Semicolon,
                    '.' => TokenKind::Dot,
                    other => {
                        return Err(LexerError {
                            msg: format!("Unexpected character: '{}'", other),
                            loc,
                        })
                    }
                }
            }
        };

        Ok(Token { kind, loc })
    }
}
