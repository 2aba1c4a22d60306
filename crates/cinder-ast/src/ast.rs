//! Resolved stylesheet syntax tree.
//!
//! Contains statement-level nodes (rules, media blocks, at-rules, imports,
//! declarations) and value-level expressions. By the time a tree reaches the
//! output stage every variable, mixin and function has been resolved, so
//! expressions here are plain values.

use crate::Span;

// ---------------------------------------------------------------------------
// Statement-level AST
// ---------------------------------------------------------------------------

/// An ordered sequence of statements.
///
/// The root block is the whole compiled stylesheet; every other block is the
/// body of a rule, media block or at-rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub is_root: bool,
}

impl Block {
    /// The top-level block of a stylesheet.
    pub fn root(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            is_root: true,
        }
    }

    /// A block nested inside a rule, media block or at-rule.
    pub fn nested(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            is_root: false,
        }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Whether any child must be emitted after this block closes.
    pub fn has_hoistable(&self) -> bool {
        self.statements.iter().any(Statement::is_hoistable)
    }

    /// Whether any child is emitted in place, inside this block's braces.
    pub fn has_non_hoistable(&self) -> bool {
        self.statements.iter().any(|s| !s.is_hoistable())
    }
}

/// A statement inside a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A bare nested block.
    Block(Block),

    /// A qualified rule: `a, b { ... }`.
    Rule(Rule),

    /// An `@media` block.
    Media(MediaBlock),

    /// Any other at-rule: `@font-face { ... }`, `@charset "utf-8";`.
    AtRule(AtRule),

    /// An `@import` of a plain CSS file.
    Import(Import),

    /// A `property: value` declaration.
    Declaration(Declaration),

    /// An `@extend` directive. Never printed.
    Extension(Extension),

    /// A preserved `/* ... */` comment.
    Comment(Comment),
}

impl Statement {
    /// Hoistable statements are emitted at the enclosing scope after their
    /// parent body closes, rather than inside it.
    pub fn is_hoistable(&self) -> bool {
        matches!(
            self,
            Statement::Rule(_) | Statement::Media(_) | Statement::AtRule(_)
        )
    }

    /// The statement's own body, if it has one.
    pub fn body(&self) -> Option<&Block> {
        match self {
            Statement::Block(block) => Some(block),
            Statement::Rule(rule) => Some(&rule.block),
            Statement::Media(media) => Some(&media.block),
            Statement::AtRule(at_rule) => at_rule.block.as_ref(),
            Statement::Import(_)
            | Statement::Declaration(_)
            | Statement::Extension(_)
            | Statement::Comment(_) => None,
        }
    }
}

/// A qualified rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: SelectorList,
    pub block: Block,
    pub span: Span,
}

impl Rule {
    pub fn new(selector: SelectorList, statements: Vec<Statement>) -> Self {
        Self {
            selector,
            block: Block::nested(statements),
            span: Span::default(),
        }
    }
}

/// An `@media` block.
///
/// `selector` is set when the media query was bubbled out of a rule and must
/// keep applying to that rule's selector.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaBlock {
    pub queries: Expression,
    pub selector: Option<SelectorList>,
    pub block: Block,
    pub span: Span,
}

impl MediaBlock {
    pub fn new(queries: Expression, statements: Vec<Statement>) -> Self {
        Self {
            queries,
            selector: None,
            block: Block::nested(statements),
            span: Span::default(),
        }
    }

    /// Scope the media block to the selector of the rule it was bubbled from.
    pub fn within(mut self, selector: SelectorList) -> Self {
        self.selector = Some(selector);
        self
    }
}

/// A generic at-rule. `keyword` includes the leading `@`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub keyword: String,
    pub selector: Option<SelectorList>,
    pub value: Option<Expression>,
    pub block: Option<Block>,
    pub span: Span,
}

impl AtRule {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            selector: None,
            value: None,
            block: None,
            span: Span::default(),
        }
    }

    pub fn with_selector(mut self, selector: SelectorList) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn with_value(mut self, value: Expression) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_block(mut self, statements: Vec<Statement>) -> Self {
        self.block = Some(Block::nested(statements));
        self
    }
}

/// An `@import` that survived to output (plain CSS imports and `url()`s).
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub urls: Vec<Expression>,
    pub media: Option<Expression>,
    pub span: Span,
}

impl Import {
    pub fn new(urls: Vec<Expression>) -> Self {
        Self {
            urls,
            media: None,
            span: Span::default(),
        }
    }
}

/// A `property: value` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: Expression,
    pub important: bool,
    pub span: Span,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: Expression) -> Self {
        Self {
            property: property.into(),
            value,
            important: false,
            span: Span::default(),
        }
    }

    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }
}

/// An `@extend` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    pub selector: SelectorList,
    pub span: Span,
}

impl Extension {
    pub fn new(selector: SelectorList) -> Self {
        Self {
            selector,
            span: Span::default(),
        }
    }
}

/// A preserved comment, including its `/*` and `*/` delimiters.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            span: Span::default(),
        }
    }
}

/// A comma-separated list of resolved complex selectors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<String>,
}

impl SelectorList {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

macro_rules! impl_into_statement {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Statement {
                fn from(node: $ty) -> Self {
                    Statement::$variant(node)
                }
            }
        )*
    };
}

impl_into_statement! {
    Block(Block),
    Rule(Rule),
    Media(MediaBlock),
    AtRule(AtRule),
    Import(Import),
    Declaration(Declaration),
    Extension(Extension),
    Comment(Comment),
}

// ---------------------------------------------------------------------------
// Expression-level AST
// ---------------------------------------------------------------------------

/// A resolved value.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// String constant. Holds the raw text, quotes included when quoted:
    /// `red`, `"Helvetica Neue"`.
    String(String),

    /// Number with an optional unit: `10px`, `1.5`, `50%`
    Number { value: f64, unit: String },

    /// Color with 8-bit channels and an alpha in `0.0..=1.0`
    Color { r: u8, g: u8, b: u8, a: f64 },

    /// Boolean literal: `true`, `false`
    Boolean(bool),

    /// Null literal. Prints as nothing.
    Null,

    /// Space- or comma-separated list: `1px solid red`, `a, b`
    List {
        items: Vec<Expression>,
        separator: ListSeparator,
    },

    /// Plain CSS function call left for the browser: `url(a.png)`, `calc(...)`
    Function { name: String, args: Vec<Expression> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSeparator {
    Space,
    Comma,
}

impl Expression {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    /// An unquoted string such as an identifier: `red`, `bold`.
    pub fn string(text: impl Into<String>) -> Self {
        Self::new(ExprKind::String(text.into()))
    }

    /// A double-quoted string. The quotes are part of the stored text.
    pub fn quoted(text: &str) -> Self {
        Self::new(ExprKind::String(format!("\"{text}\"")))
    }

    pub fn number(value: f64, unit: impl Into<String>) -> Self {
        Self::new(ExprKind::Number {
            value,
            unit: unit.into(),
        })
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(ExprKind::Color { r, g, b, a: 1.0 })
    }

    pub fn null() -> Self {
        Self::new(ExprKind::Null)
    }

    pub fn space_list(items: Vec<Expression>) -> Self {
        Self::new(ExprKind::List {
            items,
            separator: ListSeparator::Space,
        })
    }

    pub fn comma_list(items: Vec<Expression>) -> Self {
        Self::new(ExprKind::List {
            items,
            separator: ListSeparator::Comma,
        })
    }

    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::new(ExprKind::Function {
            name: name.into(),
            args,
        })
    }

    /// Whether this value contributes no visible output.
    ///
    /// `null` and the empty unquoted string are invisible; a list is
    /// invisible when all of its items are (so the empty list is too).
    pub fn is_invisible(&self) -> bool {
        match &self.kind {
            ExprKind::Null => true,
            ExprKind::String(text) => text.is_empty(),
            ExprKind::List { items, .. } => items.iter().all(Expression::is_invisible),
            ExprKind::Number { .. }
            | ExprKind::Color { .. }
            | ExprKind::Boolean(_)
            | ExprKind::Function { .. } => false,
        }
    }
}
