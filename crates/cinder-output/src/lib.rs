//! Cinder Output
//!
//! Renders a resolved stylesheet tree as nested-style CSS. Plain `@import`
//! statements are collected separately so the caller can place them at the
//! top of the final stylesheet, and a source map follows every character
//! written to the CSS buffer.
//!
//! ```text
//! Block (root) → render() → RenderOutput { css, imports, source_map }
//! ```

pub mod inspect;
pub mod nested;
pub mod source_map;
pub mod visibility;

use cinder_ast::Block;

pub use nested::NestedRenderer;
pub use source_map::SourceMap;

/// Rendering options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit a `/* line N, path */` comment before every rule.
    pub source_comments: bool,
}

impl RenderOptions {
    pub fn with_source_comments(mut self, enabled: bool) -> Self {
        self.source_comments = enabled;
        self
    }
}

/// The rendered output of a stylesheet.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub css: String,
    /// Collected `@import` statements, one per line.
    pub imports: String,
    pub source_map: SourceMap,
}

impl RenderOutput {
    /// The final stylesheet: imports first, then the rendered CSS.
    pub fn stylesheet(&self) -> String {
        if self.imports.is_empty() {
            self.css.clone()
        } else {
            format!("{}\n{}", self.imports, self.css)
        }
    }
}

/// Internal renderer invariant violated. Invisible content is never an
/// error; it simply renders nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Render error: cannot trim an empty output buffer")]
    EmptyBuffer,

    #[error("Render error: source map has no completed line to retract")]
    NoLineToRetract,
}

/// Render a root block as nested-style CSS.
pub fn render(root: &Block, options: &RenderOptions) -> Result<RenderOutput, RenderError> {
    let _span = tracing::debug_span!("render", statements = root.len()).entered();

    let mut renderer = NestedRenderer::new(options);
    renderer.render_block(root)?;
    let output = renderer.finish();

    tracing::debug!(
        css_bytes = output.css.len(),
        mappings = output.source_map.mappings().len(),
        "rendered nested stylesheet"
    );
    Ok(output)
}
