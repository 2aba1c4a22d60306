//! Single-node serializer.
//!
//! Produces the plain textual form of one node: selectors, values,
//! declarations and the other leaf statements. The nested renderer uses it
//! for everything that has no block structure of its own.

use cinder_ast::{
    Comment, Declaration, ExprKind, Expression, Extension, Import, ListSeparator, SelectorList,
};

/// Accumulates the serialized text of the nodes it visits.
#[derive(Debug, Default)]
pub struct Inspect {
    buffer: String,
}

impl Inspect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn into_buffer(self) -> String {
        self.buffer
    }

    /// `a, .b > c`
    pub fn selector(&mut self, list: &SelectorList) {
        self.buffer.push_str(&list.selectors.join(", "));
    }

    pub fn expression(&mut self, expr: &Expression) {
        match &expr.kind {
            ExprKind::String(text) => self.buffer.push_str(text),
            ExprKind::Number { value, unit } => {
                self.buffer.push_str(&format_number(*value));
                self.buffer.push_str(unit);
            }
            ExprKind::Color { r, g, b, a } => {
                self.buffer.push_str(&format_color(*r, *g, *b, *a));
            }
            ExprKind::Boolean(b) => self.buffer.push_str(if *b { "true" } else { "false" }),
            ExprKind::Null => {}
            ExprKind::List { items, separator } => {
                let separator = match separator {
                    ListSeparator::Space => " ",
                    ListSeparator::Comma => ", ",
                };
                // Invisible items are dropped along with their separator.
                let mut first = true;
                for item in items.iter().filter(|item| !item.is_invisible()) {
                    if !first {
                        self.buffer.push_str(separator);
                    }
                    first = false;
                    self.expression(item);
                }
            }
            ExprKind::Function { name, args } => {
                self.buffer.push_str(name);
                self.buffer.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.buffer.push_str(", ");
                    }
                    self.expression(arg);
                }
                self.buffer.push(')');
            }
        }
    }

    /// `property: value;` or `property: value !important;`
    pub fn declaration(&mut self, decl: &Declaration) {
        self.buffer.push_str(&decl.property);
        self.buffer.push_str(": ");
        self.expression(&decl.value);
        if decl.important {
            self.buffer.push_str(" !important");
        }
        self.buffer.push(';');
    }

    pub fn extension(&mut self, ext: &Extension) {
        self.buffer.push_str("@extend ");
        self.selector(&ext.selector);
        self.buffer.push(';');
    }

    pub fn comment(&mut self, comment: &Comment) {
        self.buffer.push_str(&comment.text);
    }

    /// `@import "a.css", url(b.css) screen;`
    pub fn import(&mut self, import: &Import) {
        self.buffer.push_str("@import ");
        for (i, url) in import.urls.iter().enumerate() {
            if i > 0 {
                self.buffer.push_str(", ");
            }
            self.expression(url);
        }
        if let Some(media) = &import.media {
            self.buffer.push(' ');
            self.expression(media);
        }
        self.buffer.push(';');
    }
}

/// Format a number, removing `.0` for integers.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// `#rrggbb` when opaque, `rgba(r, g, b, a)` otherwise.
fn format_color(r: u8, g: u8, b: u8, a: f64) -> String {
    if a >= 1.0 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("rgba({r}, {g}, {b}, {})", format_number(a))
    }
}
