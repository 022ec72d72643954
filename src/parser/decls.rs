use super::*;

impl Parser {
    pub(super) fn parse_type_def(&mut self) -> Result<TypeDef, ParseError> {
        self.advance(); // type

        let (name, _) = self.expect_ident("Expected type name")?;
        self.known_types.insert(name.clone());

        // Optional type parameters <T, U>
        let mut params = Vec::new();
        if self.match_kind(&TokenKind::Lt) {
            loop {
                let (param, _) = self.expect_ident("Expected type parameter")?;
                params.push(param);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::Gt, "Expected '>'")?;
        }

        self.expect(&TokenKind::LBrace, "Expected '{'")?;
        self.skip_newlines();

        let mut ctors = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            let (ctor_name, _) = self.expect_ident("Expected constructor name")?;

            let mut fields = Vec::new();
            if self.match_kind(&TokenKind::LParen) {
                while !self.check(&TokenKind::RParen) && !self.is_eof() {
                    if self.match_kind(&TokenKind::Comma) {
                        continue;
                    }
                    fields.push(self.parse_type_expr()?);
                }
                self.expect(&TokenKind::RParen, "Expected ')'")?;
            }

            ctors.push(TypeCtor {
                name: ctor_name,
                fields,
            });

            if !self.check(&TokenKind::RBrace) {
                self.match_kind(&TokenKind::Comma);
            }
            self.skip_newlines();
        }

        self.expect(&TokenKind::RBrace, "Expected '}'")?;

        Ok(TypeDef {
            name,
            params,
            ctors,
        })
    }

    pub(super) fn parse_module_def(&mut self) -> Result<ModuleDef, ParseError> {
        self.advance(); // module

        let (name, _) = self.expect_ident("Expected module name")?;
        self.expect(&TokenKind::LBrace, "Expected '{'")?;
        self.skip_separators();

        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            body.push(self.parse_expr()?);
            self.skip_separators();
        }

        self.expect(&TokenKind::RBrace, "Expected '}'")?;

        Ok(ModuleDef { name, body })
    }

    pub(super) fn parse_import(&mut self) -> Result<DeclKind, ParseError> {
        self.advance(); // import

        let (module, _) = self.expect_ident("Expected module name")?;
        let alias = if self.match_kind(&TokenKind::As) {
            let (alias, _) = self.expect_ident("Expected alias after 'as'")?;
            Some(alias)
        } else {
            None
        };
        self.match_kind(&TokenKind::Semicolon);

        Ok(DeclKind::Import { module, alias })
    }
}
