use std::fmt;
use std::rc::Rc;

/// Position of a token, AST node or diagnostic in a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Loc {
    pub file: Rc<str>,
    pub line: usize,
    pub col: usize,
}

impl Loc {
    pub fn new(file: Rc<str>, line: usize, col: usize) -> Self {
        Loc { file, line, col }
    }

    /// Location for values synthesized outside any source file.
    pub fn internal() -> Self {
        Loc {
            file: Rc::from("<internal>"),
            line: 0,
            col: 0,
        }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}
