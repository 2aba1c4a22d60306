use std::fmt;
use std::sync::Arc;

/// A position in a source stylesheet, tracking file, line and column.
///
/// The path is shared between every node parsed from the same file, so
/// cloning a span never copies the path text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub path: Arc<str>,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(path: impl Into<Arc<str>>, line: usize, column: usize) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }
}

impl Default for Span {
    /// An anonymous span for synthesized nodes (`stdin`, line 1, column 1).
    fn default() -> Self {
        Self::new("stdin", 1, 1)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.line, self.column)
    }
}
