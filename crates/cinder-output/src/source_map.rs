//! Source-map recorder.
//!
//! Follows the generated text cursor as the renderer appends output and
//! records which source position each mapped region came from. Encoding the
//! mappings into a `.map` file is left to the caller.

use crate::RenderError;
use cinder_ast::Span;

/// A 0-based position in the generated CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Generated text starting at `generated` originates from `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub source: Span,
    pub generated: Position,
}

#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    position: Position,
    /// Widths of every completed line, so a retracted line restores its column.
    line_widths: Vec<usize>,
    mappings: Vec<Mapping>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cursor at the end of everything appended so far.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Advance the cursor over `text`. Columns count Unicode scalar values.
    pub fn update_column(&mut self, text: &str) {
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            self.position.column += first.chars().count();
        }
        for line in lines {
            self.line_widths.push(self.position.column);
            self.position.line += 1;
            self.position.column = line.chars().count();
        }
    }

    /// Retract the most recently completed line after its newline was
    /// trimmed from the output.
    pub fn remove_line(&mut self) -> Result<(), RenderError> {
        let width = self.line_widths.pop().ok_or(RenderError::NoLineToRetract)?;
        self.position.line -= 1;
        self.position.column = width;
        Ok(())
    }

    /// Step back over one trimmed character on the current line.
    pub fn remove_column(&mut self) {
        self.position.column = self.position.column.saturating_sub(1);
    }

    /// Record that output from the current cursor onward comes from `span`.
    pub fn add_mapping(&mut self, span: &Span) {
        self.mappings.push(Mapping {
            source: span.clone(),
            generated: self.position,
        });
    }
}
