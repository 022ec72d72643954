use super::*;

impl Parser {
    pub(super) fn parse_type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        let loc = self.loc();

        // Function type `(T1, T2) => R` or tuple type `(T1, T2)`
        if self.match_kind(&TokenKind::LParen) {
            let mut elements = Vec::new();
            while !self.check(&TokenKind::RParen) && !self.is_eof() {
                if self.match_kind(&TokenKind::Comma) {
                    continue;
                }
                elements.push(self.parse_type_expr()?);
            }
            self.expect(&TokenKind::RParen, "Expected ')'")?;

            if self.match_kind(&TokenKind::FatArrow) {
                let ret = self.parse_type_expr()?;
                return Ok(TypeExpr {
                    kind: TypeExprKind::Fn {
                        params: elements,
                        ret: Box::new(ret),
                    },
                    loc,
                });
            }

            return Ok(TypeExpr {
                kind: TypeExprKind::Tuple(elements),
                loc,
            });
        }

        // List type `[T]`
        if self.match_kind(&TokenKind::LBracket) {
            let elem = self.parse_type_expr()?;
            self.expect(&TokenKind::RBracket, "Expected ']'")?;
            return Ok(TypeExpr {
                kind: TypeExprKind::List(Box::new(elem)),
                loc,
            });
        }

        // Record type `{ name: T, … }`
        if self.match_kind(&TokenKind::LBrace) {
            let mut fields = Vec::new();
            while !self.check(&TokenKind::RBrace) && !self.is_eof() {
                if self.match_kind(&TokenKind::Comma) || self.match_kind(&TokenKind::Newline) {
                    continue;
                }
                let (name, _) = self.expect_ident("Expected field name")?;
                self.expect(&TokenKind::Colon, "Expected ':'")?;
                fields.push((name, self.parse_type_expr()?));
            }
            self.expect(&TokenKind::RBrace, "Expected '}'")?;
            return Ok(TypeExpr {
                kind: TypeExprKind::Record(fields),
                loc,
            });
        }

        // Named type `Int`, `Option<T>`
        if matches!(self.current().kind, TokenKind::Ident(_)) {
            let (name, _) = self.expect_ident("Expected type name")?;
            let mut args = Vec::new();
            if self.match_kind(&TokenKind::Lt) {
                loop {
                    args.push(self.parse_type_expr()?);
                    if !self.match_kind(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::Gt, "Expected '>'")?;
            }
            return Ok(TypeExpr {
                kind: TypeExprKind::Name { name, args },
                loc,
            });
        }

        Err(self.error("Expected type expression"))
    }
}
