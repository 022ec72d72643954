use super::*;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            known_types: HashSet::new(),
        }
    }

    pub(super) fn error(&self, msg: impl Into<String>) -> ParseError {
        ParseError {
            msg: msg.into(),
            loc: self.current().loc.clone(),
        }
    }

    pub(super) fn current(&self) -> &Token {
        if self.pos < self.tokens.len() {
            &self.tokens[self.pos]
        } else {
            self.tokens.last().unwrap()
        }
    }

    pub(super) fn peek(&self, offset: usize) -> &Token {
        let idx = self.pos + offset;
        if idx < self.tokens.len() {
            &self.tokens[idx]
        } else {
            self.tokens.last().unwrap()
        }
    }

    pub(super) fn loc(&self) -> Loc {
        self.current().loc.clone()
    }

    pub(super) fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    pub(super) fn save(&self) -> usize {
        self.pos
    }

    pub(super) fn restore(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    pub(super) fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("{}, found {:?}", what, self.current().kind)))
        }
    }

    pub(super) fn expect_ident(&mut self, what: &str) -> Result<(String, Loc), ParseError> {
        match self.current().kind.clone() {
            TokenKind::Ident(name) => {
                let loc = self.loc();
                self.advance();
                Ok((name, loc))
            }
            other => Err(self.error(format!("{}, found {:?}", what, other))),
        }
    }

    pub(super) fn is_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    pub(super) fn skip_newlines(&mut self) {
        while matches!(self.current().kind, TokenKind::Newline) {
            self.advance();
        }
    }

    /// Newlines and semicolons both separate expressions in sequence position.
    pub(super) fn skip_separators(&mut self) {
        while matches!(
            self.current().kind,
            TokenKind::Newline | TokenKind::Semicolon
        ) {
            self.advance();
        }
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut decls = Vec::new();
        self.skip_separators();

        while !self.is_eof() {
            decls.push(self.parse_decl()?);
            self.skip_separators();
        }

        Ok(Program { decls })
    }

    pub(super) fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        let loc = self.loc();
        let kind = match self.current().kind {
            TokenKind::Type => DeclKind::Type(self.parse_type_def()?),
            TokenKind::Module => DeclKind::Module(self.parse_module_def()?),
            TokenKind::Import => self.parse_import()?,
            _ => DeclKind::Expr(self.parse_expr()?),
        };
        Ok(Decl { kind, loc })
    }
}
