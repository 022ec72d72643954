use super::*;
use crate::lexer::Lexer;

impl Parser {
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.skip_newlines();

        match self.current().kind {
            TokenKind::Let => return self.parse_let(false),
            TokenKind::Const => return self.parse_let(true),
            TokenKind::Fn => return self.parse_fn_def(),
            TokenKind::If => return self.parse_if(),
            TokenKind::Match => return self.parse_match(),
            TokenKind::While => return self.parse_while(),
            TokenKind::For => return self.parse_for(),
            _ => {}
        }

        // Assignment: a bare identifier followed by a single `=`
        if matches!(self.current().kind, TokenKind::Ident(_))
            && self.peek(1).kind == TokenKind::Assign
        {
            let loc = self.loc();
            let (name, _) = self.expect_ident("Expected identifier")?;
            self.advance(); // =
            let value = self.parse_expr()?;
            return Ok(Expr {
                kind: ExprKind::Assign {
                    name,
                    value: Box::new(value),
                },
                loc,
            });
        }

        // `{ … }` is a record only when the first meaningful token inside is
        // an identifier immediately followed by `:`; otherwise it is a block.
        if self.check(&TokenKind::LBrace) && !self.brace_starts_record() {
            return self.parse_block();
        }

        self.parse_or()
    }

    /// Lookahead for the record-vs-block decision, skipping newlines.
    pub(super) fn brace_starts_record(&self) -> bool {
        let mut offset = 1;
        while matches!(self.peek(offset).kind, TokenKind::Newline) {
            offset += 1;
        }
        matches!(self.peek(offset).kind, TokenKind::Ident(_))
            && self.peek(offset + 1).kind == TokenKind::Colon
    }

    fn parse_let(&mut self, is_const: bool) -> Result<Expr, ParseError> {
        let loc = self.loc();
        self.advance(); // let / const

        let (name, _) = self.expect_ident("Expected identifier")?;

        let annotation = if self.match_kind(&TokenKind::Colon) {
            Some(self.parse_type_expr()?)
        } else {
            None
        };

        self.expect(&TokenKind::Assign, "Expected '='")?;
        let value = self.parse_expr()?;

        Ok(Expr {
            kind: ExprKind::Let {
                name,
                annotation,
                value: Box::new(value),
                is_const,
            },
            loc,
        })
    }

    fn parse_fn_def(&mut self) -> Result<Expr, ParseError> {
        let loc = self.loc();
        self.advance(); // fn

        let (name, _) = self.expect_ident("Expected function name")?;
        let params = self.parse_params()?;

        let return_annotation = if self.match_kind(&TokenKind::Colon) {
            Some(self.parse_type_expr()?)
        } else {
            None
        };

        let body = if self.match_kind(&TokenKind::FatArrow) {
            self.parse_expr()?
        } else {
            self.parse_block()?
        };

        Ok(Expr {
            kind: ExprKind::Fn {
                name,
                params,
                return_annotation,
                body: Rc::new(body),
            },
            loc,
        })
    }

    pub(super) fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(&TokenKind::LParen, "Expected '('")?;
        let mut params = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.is_eof() {
            if self.match_kind(&TokenKind::Comma) {
                continue;
            }
            let (name, _) = self.expect_ident("Expected parameter name")?;
            let annotation = if self.match_kind(&TokenKind::Colon) {
                Some(self.parse_type_expr()?)
            } else {
                None
            };
            params.push(Param { name, annotation });
        }

        self.expect(&TokenKind::RParen, "Expected ')'")?;
        Ok(params)
    }

    fn parse_if(&mut self) -> Result<Expr, ParseError> {
        let loc = self.loc();
        self.advance(); // if

        let condition = self.parse_expr()?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.match_kind(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(self.parse_block()?))
            }
        } else {
            None
        };

        Ok(Expr {
            kind: ExprKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch,
            },
            loc,
        })
    }

    fn parse_while(&mut self) -> Result<Expr, ParseError> {
        let loc = self.loc();
        self.advance(); // while

        let condition = self.parse_expr()?;
        let body = self.parse_block()?;

        Ok(Expr {
            kind: ExprKind::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            loc,
        })
    }

    fn parse_for(&mut self) -> Result<Expr, ParseError> {
        let loc = self.loc();
        self.advance(); // for

        let (var, _) = self.expect_ident("Expected loop variable")?;
        self.expect(&TokenKind::In, "Expected 'in'")?;
        let iterable = self.parse_expr()?;
        let body = self.parse_block()?;

        Ok(Expr {
            kind: ExprKind::For {
                var,
                iterable: Box::new(iterable),
                body: Box::new(body),
            },
            loc,
        })
    }

    fn parse_match(&mut self) -> Result<Expr, ParseError> {
        let loc = self.loc();
        self.advance(); // match

        let scrutinee = self.parse_expr()?;
        self.expect(&TokenKind::LBrace, "Expected '{'")?;
        self.skip_newlines();

        let mut arms = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            let pattern = self.parse_pattern()?;

            let guard = if self.match_kind(&TokenKind::If) {
                Some(self.parse_expr()?)
            } else {
                None
            };

            self.expect(&TokenKind::FatArrow, "Expected '=>'")?;
            let body = self.parse_expr()?;

            arms.push(MatchArm {
                pattern,
                guard,
                body,
            });

            if !self.check(&TokenKind::RBrace) {
                self.match_kind(&TokenKind::Comma);
            }
            self.skip_newlines();
        }

        self.expect(&TokenKind::RBrace, "Expected '}'")?;

        Ok(Expr {
            kind: ExprKind::Match {
                scrutinee: Box::new(scrutinee),
                arms,
            },
            loc,
        })
    }

    pub(super) fn parse_block(&mut self) -> Result<Expr, ParseError> {
        let loc = self.loc();
        self.expect(&TokenKind::LBrace, "Expected '{'")?;
        self.skip_separators();

        let mut exprs = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            exprs.push(self.parse_expr()?);
            self.skip_separators();
        }

        self.expect(&TokenKind::RBrace, "Expected '}'")?;

        Ok(Expr {
            kind: ExprKind::Block(exprs),
            loc,
        })
    }

    // -----------------------------------------------------------------------
    // Binary operators, lowest to highest precedence; all left-associative
    // -----------------------------------------------------------------------

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::Or) {
            let loc = self.loc();
            self.advance();
            let right = self.parse_and()?;
            left = binary(BinOp::Or, left, right, loc);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.check(&TokenKind::And) {
            let loc = self.loc();
            self.advance();
            let right = self.parse_equality()?;
            left = binary(BinOp::And, left, right, loc);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Eq => BinOp::Eq,
                TokenKind::Neq => BinOp::Neq,
                _ => break,
            };
            let loc = self.loc();
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(op, left, right, loc);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Lte => BinOp::Lte,
                TokenKind::Gte => BinOp::Gte,
                _ => break,
            };
            let loc = self.loc();
            self.advance();
            let right = self.parse_term()?;
            left = binary(op, left, right, loc);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let loc = self.loc();
            self.advance();
            let right = self.parse_factor()?;
            left = binary(op, left, right, loc);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let loc = self.loc();
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right, loc);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current().kind {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Not => UnOp::Not,
            _ => return self.parse_postfix(),
        };
        let loc = self.loc();
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            loc,
        })
    }

    // -----------------------------------------------------------------------
    // Postfix: calls, field access, `::` module access
    // -----------------------------------------------------------------------

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&TokenKind::LParen) {
                let loc = self.loc();
                let args = self.parse_args()?;
                expr = self.make_call(expr, args, loc);
            } else if self.check(&TokenKind::Dot) {
                let loc = self.loc();
                self.advance();
                // Tuple indices (`t.0`) arrive as integer tokens
                let field = match self.current().kind.clone() {
                    TokenKind::Ident(name) => {
                        self.advance();
                        name
                    }
                    TokenKind::Int(i) => {
                        self.advance();
                        i.to_string()
                    }
                    other => {
                        return Err(
                            self.error(format!("Expected field name after '.', found {:?}", other))
                        )
                    }
                };
                expr = Expr {
                    kind: ExprKind::Field {
                        object: Box::new(expr),
                        field,
                    },
                    loc,
                };
            } else if self.check(&TokenKind::DoubleColon) {
                let loc = self.loc();
                self.advance();
                let (member, _) = self.expect_ident("Expected member name after '::'")?;
                let module = match expr.kind {
                    ExprKind::Ident(name) => name,
                    _ => return Err(self.error("Expected module name before '::'")),
                };
                expr = Expr {
                    kind: ExprKind::ModuleMember { module, member },
                    loc,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// `Type.Ctor(args)` becomes a constructor call when `Type` names a type
    /// declared earlier in this parse; everything else stays a plain call.
    fn make_call(&self, callee: Expr, args: Vec<Expr>, loc: Loc) -> Expr {
        if let ExprKind::Field { object, field } = &callee.kind {
            if let ExprKind::Ident(type_name) = &object.kind {
                if self.known_types.contains(type_name) {
                    return Expr {
                        kind: ExprKind::Ctor {
                            type_name: type_name.clone(),
                            ctor: field.clone(),
                            args,
                        },
                        loc,
                    };
                }
            }
        }
        Expr {
            kind: ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            loc,
        }
    }

    pub(super) fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LParen, "Expected '('")?;
        let mut args = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.is_eof() {
            if self.match_kind(&TokenKind::Comma) || self.match_kind(&TokenKind::Newline) {
                continue;
            }
            args.push(self.parse_expr()?);
        }

        self.expect(&TokenKind::RParen, "Expected ')'")?;
        Ok(args)
    }

    // -----------------------------------------------------------------------
    // Atoms
    // -----------------------------------------------------------------------

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.loc();

        match self.current().kind.clone() {
            TokenKind::Int(i) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Int(i),
                    loc,
                })
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Float(f),
                    loc,
                })
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Str(s),
                    loc,
                })
            }
            TokenKind::FStr(parts) => {
                self.advance();
                let parts = self.parse_fstring_parts(parts, &loc)?;
                Ok(Expr {
                    kind: ExprKind::InterpStr(parts),
                    loc,
                })
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(true),
                    loc,
                })
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(false),
                    loc,
                })
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Ident(name),
                    loc,
                })
            }
            TokenKind::LParen => self.parse_paren(loc),
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&TokenKind::RBracket) && !self.is_eof() {
                    if self.match_kind(&TokenKind::Comma) || self.match_kind(&TokenKind::Newline) {
                        continue;
                    }
                    elements.push(self.parse_expr()?);
                }
                self.expect(&TokenKind::RBracket, "Expected ']'")?;
                Ok(Expr {
                    kind: ExprKind::List(elements),
                    loc,
                })
            }
            TokenKind::LBrace => {
                if self.brace_starts_record() {
                    self.parse_record(loc)
                } else {
                    self.parse_block()
                }
            }
            TokenKind::MapStart => self.parse_map(loc),
            ref other => Err(self.error(format!("Unexpected token in expression: {:?}", other))),
        }
    }

    /// `( expr )` grouping, `( a, b )` tuple, `()` unit, or a lambda prefix.
    /// A consumed parameter list that is not followed by `=>` restores the
    /// cursor and reparses as a parenthesized expression or tuple.
    fn parse_paren(&mut self, loc: Loc) -> Result<Expr, ParseError> {
        self.advance(); // (

        if self.match_kind(&TokenKind::RParen) {
            return Ok(Expr {
                kind: ExprKind::Tuple(Vec::new()),
                loc,
            });
        }

        if matches!(self.current().kind, TokenKind::Ident(_)) {
            let saved = self.save();
            if let Some(params) = self.try_lambda_params() {
                let body = self.parse_expr()?;
                return Ok(Expr {
                    kind: ExprKind::Lambda {
                        params,
                        body: Rc::new(body),
                    },
                    loc,
                });
            }
            self.restore(saved);
        }

        let first = self.parse_expr()?;

        if self.check(&TokenKind::Comma) {
            let mut elements = vec![first];
            while self.match_kind(&TokenKind::Comma) {
                if self.check(&TokenKind::RParen) {
                    break;
                }
                elements.push(self.parse_expr()?);
            }
            self.expect(&TokenKind::RParen, "Expected ')'")?;
            return Ok(Expr {
                kind: ExprKind::Tuple(elements),
                loc,
            });
        }

        self.expect(&TokenKind::RParen, "Expected ')'")?;
        Ok(first)
    }

    /// Attempt `ident (: type)? (, ident (: type)?)* ) =>`; returns the
    /// parameter list with the `=>` consumed, or None without judging.
    fn try_lambda_params(&mut self) -> Option<Vec<Param>> {
        let mut params = Vec::new();

        loop {
            let name = match self.current().kind.clone() {
                TokenKind::Ident(name) => name,
                _ => return None,
            };
            self.advance();

            let annotation = if self.match_kind(&TokenKind::Colon) {
                match self.parse_type_expr() {
                    Ok(te) => Some(te),
                    Err(_) => return None,
                }
            } else {
                None
            };
            params.push(Param { name, annotation });

            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }

        if self.match_kind(&TokenKind::RParen) && self.match_kind(&TokenKind::FatArrow) {
            Some(params)
        } else {
            None
        }
    }

    fn parse_record(&mut self, loc: Loc) -> Result<Expr, ParseError> {
        self.advance(); // {
        let mut fields = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            if self.match_kind(&TokenKind::Comma) || self.match_kind(&TokenKind::Newline) {
                continue;
            }
            let (name, _) = self.expect_ident("Expected field name")?;
            self.expect(&TokenKind::Colon, "Expected ':'")?;
            let value = self.parse_expr()?;
            fields.push((name, value));
        }

        self.expect(&TokenKind::RBrace, "Expected '}'")?;
        Ok(Expr {
            kind: ExprKind::Record(fields),
            loc,
        })
    }

    fn parse_map(&mut self, loc: Loc) -> Result<Expr, ParseError> {
        self.advance(); // %{
        let mut entries = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            if self.match_kind(&TokenKind::Comma) || self.match_kind(&TokenKind::Newline) {
                continue;
            }
            let key = self.parse_expr()?;
            self.expect(&TokenKind::Colon, "Expected ':'")?;
            let value = self.parse_expr()?;
            entries.push((key, value));
        }

        self.expect(&TokenKind::RBrace, "Expected '}'")?;
        Ok(Expr {
            kind: ExprKind::Map(entries),
            loc,
        })
    }

    fn parse_fstring_parts(
        &self,
        raw: Vec<(bool, String)>,
        loc: &Loc,
    ) -> Result<Vec<StrPart>, ParseError> {
        let mut parts = Vec::new();
        for (is_expr, text) in raw {
            if !is_expr {
                parts.push(StrPart::Literal(text));
                continue;
            }
            if text.trim().is_empty() {
                parts.push(StrPart::Literal(String::new()));
                continue;
            }
            let mut lexer = Lexer::new(&text, &loc.file);
            let tokens = lexer.tokenize().map_err(|e| ParseError {
                msg: format!("Error in interpolation: {}", e.msg),
                loc: loc.clone(),
            })?;
            let mut sub = Parser::new(tokens);
            let expr = sub.parse_expr().map_err(|e| ParseError {
                msg: format!("Error in interpolation: {}", e.msg),
                loc: loc.clone(),
            })?;
            parts.push(StrPart::Expr(Box::new(expr)));
        }
        Ok(parts)
    }
}

fn binary(op: BinOp, left: Expr, right: Expr, loc: Loc) -> Expr {
    Expr {
        kind: ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        loc,
    }
}
