use super::*;

impl Parser {
    pub(super) fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        let loc = self.loc();

        match self.current().kind.clone() {
            TokenKind::Int(i) => {
                self.advance();
                Ok(Pattern {
                    kind: PatternKind::Int(i),
                    loc,
                })
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Pattern {
                    kind: PatternKind::Float(f),
                    loc,
                })
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Pattern {
                    kind: PatternKind::Str(s),
                    loc,
                })
            }
            TokenKind::True => {
                self.advance();
                Ok(Pattern {
                    kind: PatternKind::Bool(true),
                    loc,
                })
            }
            TokenKind::False => {
                self.advance();
                Ok(Pattern {
                    kind: PatternKind::Bool(false),
                    loc,
                })
            }
            TokenKind::LBracket => self.parse_list_pattern(loc),
            TokenKind::LParen => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&TokenKind::RParen) && !self.is_eof() {
                    if self.match_kind(&TokenKind::Comma) {
                        continue;
                    }
                    elements.push(self.parse_pattern()?);
                }
                self.expect(&TokenKind::RParen, "Expected ')'")?;
                Ok(Pattern {
                    kind: PatternKind::Tuple(elements),
                    loc,
                })
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                while !self.check(&TokenKind::RBrace) && !self.is_eof() {
                    if self.match_kind(&TokenKind::Comma) || self.match_kind(&TokenKind::Newline) {
                        continue;
                    }
                    let (name, _) = self.expect_ident("Expected field name")?;
                    self.expect(&TokenKind::Colon, "Expected ':'")?;
                    let pat = self.parse_pattern()?;
                    fields.push((name, pat));
                }
                self.expect(&TokenKind::RBrace, "Expected '}'")?;
                Ok(Pattern {
                    kind: PatternKind::Record(fields),
                    loc,
                })
            }
            TokenKind::Ident(name) => {
                self.advance();

                // The wildcard is the identifier of that literal name
                if name == "_" {
                    return Ok(Pattern {
                        kind: PatternKind::Wildcard,
                        loc,
                    });
                }

                // A trailing identifier followed by `(` begins a constructor
                // pattern; a bare identifier binds a variable.
                if self.check(&TokenKind::LParen) {
                    self.advance();
                    let mut args = Vec::new();
                    while !self.check(&TokenKind::RParen) && !self.is_eof() {
                        if self.match_kind(&TokenKind::Comma) {
                            continue;
                        }
                        args.push(self.parse_pattern()?);
                    }
                    self.expect(&TokenKind::RParen, "Expected ')'")?;
                    return Ok(Pattern {
                        kind: PatternKind::Ctor { name, args },
                        loc,
                    });
                }

                Ok(Pattern {
                    kind: PatternKind::Var(name),
                    loc,
                })
            }
            ref other => Err(self.error(format!("Expected pattern, found {:?}", other))),
        }
    }

    /// `[p1, …, pn]` optionally ending in `, ...rest`.
    fn parse_list_pattern(&mut self, loc: Loc) -> Result<Pattern, ParseError> {
        self.advance(); // [
        let mut elements = Vec::new();
        let mut rest = None;

        while !self.check(&TokenKind::RBracket) && !self.is_eof() {
            if self.match_kind(&TokenKind::Comma) {
                continue;
            }
            if self.match_kind(&TokenKind::DotDotDot) {
                let (name, _) = self.expect_ident("Expected identifier after '...'")?;
                rest = Some(name);
                break;
            }
            elements.push(self.parse_pattern()?);
        }

        self.expect(&TokenKind::RBracket, "Expected ']'")?;
        Ok(Pattern {
            kind: PatternKind::List { elements, rest },
            loc,
        })
    }
}
