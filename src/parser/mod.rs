use std::collections::HashSet;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::*;
use crate::lexer::{Token, TokenKind};
use crate::location::Loc;

#[derive(Debug, Error)]
#[error("{loc}: error: {msg}")]
pub struct ParseError {
    pub msg: String,
    pub loc: Loc,
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Type names declared earlier in this parse; lets `Type.Ctor(args)`
    /// lower to a constructor call instead of a field-access call.
    known_types: HashSet<String>,
}

mod core;
mod decls;
mod expr;
mod patterns;
mod types;
