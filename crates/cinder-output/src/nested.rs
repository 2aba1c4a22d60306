//! Nested output style.
//!
//! Walks the resolved tree and prints each rule with its declarations inside
//! the braces and its nested rules, media blocks and at-rules hoisted after
//! the closing brace, one level deeper:
//!
//! ```text
//! a {
//!   color: red; }
//!   a b {
//!     color: blue; }
//! ```
//!
//! Every statement is printed followed by a newline. Closing a body trims
//! that last newline so the brace lands on the final statement's line, and
//! the source map is told to retract the line it already counted.

use crate::inspect::Inspect;
use crate::source_map::SourceMap;
use crate::visibility::{has_printable_children, is_suppressed};
use crate::{RenderError, RenderOptions, RenderOutput};
use cinder_ast::{AtRule, Block, Expression, Import, MediaBlock, Rule, SelectorList, Statement};

const INDENT: &str = "  ";

/// Renderer state for one pass over a stylesheet.
#[derive(Debug)]
pub struct NestedRenderer {
    buffer: String,
    imports: String,
    indentation: usize,
    source_comments: bool,
    source_map: SourceMap,
}

impl NestedRenderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            buffer: String::new(),
            imports: String::new(),
            indentation: 0,
            source_comments: options.source_comments,
            source_map: SourceMap::new(),
        }
    }

    pub fn indentation(&self) -> usize {
        self.indentation
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn imports(&self) -> &str {
        &self.imports
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    pub fn finish(self) -> RenderOutput {
        RenderOutput {
            css: self.buffer,
            imports: self.imports,
            source_map: self.source_map,
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Render one statement into the output or import buffer.
    pub fn render(&mut self, stmt: &Statement) -> Result<(), RenderError> {
        match stmt {
            Statement::Block(block) => self.render_block(block),
            Statement::Rule(rule) => {
                if has_printable_children(stmt) {
                    self.render_rule(rule)
                } else {
                    tracing::trace!(
                        line = rule.span.line,
                        path = %rule.span.path,
                        "skipping rule without printable children"
                    );
                    Ok(())
                }
            }
            Statement::Media(media) => self.render_media(media),
            Statement::AtRule(at_rule) => self.render_at_rule(at_rule),
            Statement::Import(import) => {
                self.render_import(import);
                Ok(())
            }
            Statement::Declaration(decl) => {
                self.fallback(|i| i.declaration(decl));
                Ok(())
            }
            Statement::Extension(ext) => {
                self.fallback(|i| i.extension(ext));
                Ok(())
            }
            Statement::Comment(comment) => {
                self.fallback(|i| i.comment(comment));
                Ok(())
            }
        }
    }

    /// Render the top-level statements of a stylesheet, separating those that
    /// printed something with a blank line. Nested blocks are printed by the
    /// construct that owns them, so they are ignored here.
    pub fn render_block(&mut self, block: &Block) -> Result<(), RenderError> {
        if !block.is_root {
            return Ok(());
        }
        let last = block.len().saturating_sub(1);
        for (i, stmt) in block.statements.iter().enumerate() {
            let before = self.buffer.len();
            self.render(stmt)?;
            if i < last && self.buffer.len() > before {
                self.append("\n");
            }
        }
        Ok(())
    }

    fn render_import(&mut self, import: &Import) {
        let mut inspect = Inspect::new();
        inspect.import(import);
        if !self.imports.is_empty() {
            self.imports.push('\n');
        }
        self.imports.push_str(inspect.buffer());
    }

    // =========================================================================
    // Rules
    // =========================================================================

    fn render_rule(&mut self, rule: &Rule) -> Result<(), RenderError> {
        if rule.selector.is_empty() {
            return Ok(());
        }

        let block = &rule.block;
        let opened = block.has_non_hoistable();
        if opened {
            self.indent();
            if self.source_comments {
                self.append(&format!(
                    "/* line {}, {} */\n",
                    rule.span.line, rule.span.path
                ));
                self.indent();
            }
            self.render_selector(&rule.selector);
            self.append(" {\n");
            self.nested(|r| r.render_in_place(block))?;
            self.retract_trailing_newline()?;
            self.append(" }\n");
        }

        if block.has_hoistable() {
            // Hoisted children sit one level under the rule they came from,
            // unless the rule itself printed nothing.
            if opened {
                self.nested(|r| r.render_hoisted(block))?;
            } else {
                self.render_hoisted(block)?;
            }
        }
        Ok(())
    }

    fn render_media(&mut self, media: &MediaBlock) -> Result<(), RenderError> {
        let block = &media.block;

        self.indent();
        self.source_map.add_mapping(&media.span);
        self.append("@media ");
        self.render_expression(&media.queries);
        self.append(" {\n");

        match media.selector.as_ref().filter(|_| block.has_non_hoistable()) {
            // Bubbled out of a rule: restate the rule's selector inside the
            // query so the declarations keep their scope.
            Some(selector) => self.nested(|r| {
                r.indent();
                r.render_selector(selector);
                r.append(" {\n");
                r.nested(|r| r.render_in_place(block))?;
                r.retract_trailing_newline()?;
                r.append(" }\n");
                r.nested(|r| r.render_hoisted(block))
            })?,
            None => self.nested(|r| {
                r.render_in_place(block)?;
                r.render_hoisted(block)
            })?,
        }

        self.retract_trailing_newline()?;
        self.append(" }\n");
        Ok(())
    }

    fn render_at_rule(&mut self, at_rule: &AtRule) -> Result<(), RenderError> {
        self.append(&at_rule.keyword);
        if let Some(selector) = &at_rule.selector {
            self.append(" ");
            self.render_selector(selector);
        } else if let Some(value) = &at_rule.value {
            self.append(" ");
            self.render_expression(value);
        }

        let Some(block) = &at_rule.block else {
            self.append(";");
            return Ok(());
        };

        self.append(" {\n");
        self.nested(|r| {
            r.render_in_place(block)?;
            for stmt in block.statements.iter().filter(|s| s.is_hoistable()) {
                r.render(stmt)?;
                r.append("\n");
            }
            Ok(())
        })?;

        // Each hoisted child already ends in a newline before the extra one
        // appended above.
        self.retract_trailing_newline()?;
        if block.has_hoistable() {
            self.retract_trailing_newline()?;
        }
        self.append(" }\n");
        Ok(())
    }

    /// Print the non-hoistable children of `block`, one per line.
    fn render_in_place(&mut self, block: &Block) -> Result<(), RenderError> {
        for stmt in &block.statements {
            if stmt.is_hoistable() || is_suppressed(stmt) {
                continue;
            }
            if stmt.body().is_none() {
                self.indent();
            }
            self.render(stmt)?;
            self.append("\n");
        }
        Ok(())
    }

    fn render_hoisted(&mut self, block: &Block) -> Result<(), RenderError> {
        for stmt in block.statements.iter().filter(|s| s.is_hoistable()) {
            self.render(stmt)?;
        }
        Ok(())
    }

    // =========================================================================
    // Leaves
    // =========================================================================

    fn render_selector(&mut self, selector: &SelectorList) {
        self.fallback(|i| i.selector(selector));
    }

    fn render_expression(&mut self, expr: &Expression) {
        self.fallback(|i| i.expression(expr));
    }

    fn fallback(&mut self, inspect: impl FnOnce(&mut Inspect)) {
        let mut inspector = Inspect::new();
        inspect(&mut inspector);
        self.append(inspector.buffer());
    }

    // =========================================================================
    // Buffer management
    // =========================================================================

    fn append(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.source_map.update_column(text);
    }

    fn indent(&mut self) {
        let indent = INDENT.repeat(self.indentation);
        self.append(&indent);
    }

    /// Run `f` one indentation level deeper. The level is restored on every
    /// exit path, errors included.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, RenderError>,
    ) -> Result<T, RenderError> {
        self.indentation += 1;
        let result = f(self);
        self.indentation -= 1;
        result
    }

    /// Remove the last character of the output and retract the source-map
    /// line it ended.
    fn retract_trailing_newline(&mut self) -> Result<(), RenderError> {
        match self.buffer.pop() {
            Some('\n') => self.source_map.remove_line(),
            Some(other) => {
                tracing::debug!(trimmed = ?other, "trimmed a non-newline character");
                self.source_map.remove_column();
                Ok(())
            }
            None => Err(RenderError::EmptyBuffer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_ast::{Comment, Declaration, Extension, Span};
    use pretty_assertions::assert_eq;

    fn selector(text: &str) -> SelectorList {
        SelectorList::new([text])
    }

    fn decl(property: &str, value: &str) -> Statement {
        Declaration::new(property, Expression::string(value)).into()
    }

    fn rule(sel: &str, statements: Vec<Statement>) -> Statement {
        Rule::new(selector(sel), statements).into()
    }

    fn media(query: &str, statements: Vec<Statement>) -> MediaBlock {
        MediaBlock::new(Expression::string(query), statements)
    }

    fn import(url: &str) -> Statement {
        Import::new(vec![Expression::quoted(url)]).into()
    }

    fn render_with(options: &RenderOptions, statements: Vec<Statement>) -> NestedRenderer {
        let mut renderer = NestedRenderer::new(options);
        renderer.render_block(&Block::root(statements)).unwrap();
        renderer
    }

    fn render_css(statements: Vec<Statement>) -> String {
        render_with(&RenderOptions::default(), statements).finish().css
    }

    // =========================================================================
    // Rules
    // =========================================================================

    #[test]
    fn test_simple_rule() {
        let css = render_css(vec![rule("a", vec![decl("color", "red")])]);
        assert_eq!(css, "a {\n  color: red; }\n");
    }

    #[test]
    fn test_selector_list_and_declarations() {
        let css = render_css(vec![Rule::new(
            SelectorList::new(["a", "b"]),
            vec![decl("color", "red"), decl("display", "block")],
        )
        .into()]);
        assert_eq!(css, "a, b {\n  color: red;\n  display: block; }\n");
    }

    #[test]
    fn test_extend_only_rule_vanishes() {
        let css = render_css(vec![rule(
            "a",
            vec![Extension::new(selector(".b")).into()],
        )]);
        assert_eq!(css, "");
    }

    #[test]
    fn test_empty_rule_vanishes() {
        assert_eq!(render_css(vec![rule("a", vec![])]), "");
    }

    #[test]
    fn test_empty_selector_vanishes() {
        let css = render_css(vec![Rule::new(
            SelectorList::default(),
            vec![decl("color", "red")],
        )
        .into()]);
        assert_eq!(css, "");
    }

    #[test]
    fn test_extend_not_printed_among_declarations() {
        let css = render_css(vec![rule(
            "a",
            vec![Extension::new(selector(".b")).into(), decl("color", "red")],
        )]);
        assert_eq!(css, "a {\n  color: red; }\n");
    }

    #[test]
    fn test_empty_string_declaration_omitted() {
        let css = render_css(vec![rule(
            "a",
            vec![decl("font", ""), decl("color", "red")],
        )]);
        assert_eq!(css, "a {\n  color: red; }\n");
    }

    #[test]
    fn test_invisible_list_declaration_omitted() {
        let css = render_css(vec![rule(
            "a",
            vec![
                Declaration::new(
                    "margin",
                    Expression::space_list(vec![Expression::null(), Expression::string("")]),
                )
                .into(),
                decl("color", "red"),
            ],
        )]);
        assert_eq!(css, "a {\n  color: red; }\n");
    }

    #[test]
    fn test_rule_with_only_omitted_declarations_keeps_braces() {
        let css = render_css(vec![rule("a", vec![decl("font", "")])]);
        assert_eq!(css, "a { }\n");
    }

    #[test]
    fn test_comment_inside_rule() {
        let css = render_css(vec![rule(
            "a",
            vec![Comment::new("/* note */").into(), decl("color", "red")],
        )]);
        assert_eq!(css, "a {\n  /* note */\n  color: red; }\n");
    }

    #[test]
    fn test_nested_rule_hoisted() {
        let css = render_css(vec![rule(
            "a",
            vec![
                decl("color", "red"),
                rule("a b", vec![decl("color", "blue")]),
            ],
        )]);
        assert_eq!(
            css,
            "a {\n  color: red; }\n  a b {\n    color: blue; }\n"
        );
    }

    #[test]
    fn test_hoisted_content_follows_closing_brace_in_order() {
        let css = render_css(vec![rule(
            "a",
            vec![
                rule("a b", vec![decl("color", "blue")]),
                decl("color", "red"),
                rule("a c", vec![decl("color", "green")]),
                decl("display", "block"),
            ],
        )]);
        assert_eq!(
            css,
            "a {\n  color: red;\n  display: block; }\n  a b {\n    color: blue; }\n  a c {\n    color: green; }\n"
        );
    }

    #[test]
    fn test_rule_without_declarations_hoists_at_same_depth() {
        let css = render_css(vec![rule(
            "a",
            vec![rule("a b", vec![decl("color", "blue")])],
        )]);
        assert_eq!(css, "a b {\n  color: blue; }\n");
    }

    #[test]
    fn test_source_comments() {
        let options = RenderOptions::default().with_source_comments(true);
        let stmt = Rule {
            span: Span::new("main.scss", 3, 1),
            ..Rule::new(selector("a"), vec![decl("color", "red")])
        };
        let css = render_with(&options, vec![stmt.into()]).finish().css;
        assert_eq!(css, "/* line 3, main.scss */\na {\n  color: red; }\n");
    }

    #[test]
    fn test_source_comments_on_hoisted_rule() {
        let options = RenderOptions::default().with_source_comments(true);
        let inner = Rule {
            span: Span::new("main.scss", 5, 3),
            ..Rule::new(selector("a b"), vec![decl("color", "blue")])
        };
        let outer = Rule {
            span: Span::new("main.scss", 3, 1),
            ..Rule::new(selector("a"), vec![decl("color", "red"), inner.into()])
        };
        let css = render_with(&options, vec![outer.into()]).finish().css;
        assert_eq!(
            css,
            "/* line 3, main.scss */\na {\n  color: red; }\n  /* line 5, main.scss */\n  a b {\n    color: blue; }\n"
        );
    }

    // =========================================================================
    // Media blocks
    // =========================================================================

    #[test]
    fn test_media_with_rule() {
        let css = render_css(vec![media(
            "screen",
            vec![rule("a", vec![decl("color", "red")])],
        )
        .into()]);
        assert_eq!(css, "@media screen {\n  a {\n    color: red; } }\n");
    }

    #[test]
    fn test_media_bubbled_from_rule() {
        let bubbled = media("print", vec![decl("color", "black")]).within(selector("a"));
        let css = render_css(vec![rule(
            "a",
            vec![decl("color", "red"), bubbled.into()],
        )]);
        assert_eq!(
            css,
            "a {\n  color: red; }\n  @media print {\n    a {\n      color: black; } }\n"
        );
    }

    #[test]
    fn test_media_wrapper_with_hoisted_rule() {
        let bubbled = media(
            "print",
            vec![
                decl("color", "black"),
                rule("a b", vec![decl("color", "gray")]),
            ],
        )
        .within(selector("a"));
        let css = render_css(vec![bubbled.into()]);
        assert_eq!(
            css,
            "@media print {\n  a {\n    color: black; }\n    a b {\n      color: gray; } }\n"
        );
    }

    #[test]
    fn test_media_selector_ignored_without_declarations() {
        let bubbled = media("print", vec![rule("a b", vec![decl("color", "gray")])])
            .within(selector("a"));
        let css = render_css(vec![bubbled.into()]);
        assert_eq!(css, "@media print {\n  a b {\n    color: gray; } }\n");
    }

    #[test]
    fn test_media_query_list() {
        let queries = Expression::comma_list(vec![
            Expression::string("screen"),
            Expression::string("print and (orientation: landscape)"),
        ]);
        let css = render_css(vec![MediaBlock::new(
            queries,
            vec![rule("a", vec![decl("color", "red")])],
        )
        .into()]);
        assert_eq!(
            css,
            "@media screen, print and (orientation: landscape) {\n  a {\n    color: red; } }\n"
        );
    }

    #[test]
    fn test_media_skips_suppressed_declarations() {
        let bubbled = media(
            "print",
            vec![decl("font", ""), decl("color", "black")],
        )
        .within(selector("a"));
        let css = render_css(vec![bubbled.into()]);
        assert_eq!(css, "@media print {\n  a {\n    color: black; } }\n");
    }

    // =========================================================================
    // Generic at-rules
    // =========================================================================

    #[test]
    fn test_bodyless_at_rule() {
        let charset = AtRule::new("@charset").with_value(Expression::quoted("utf-8"));
        assert_eq!(render_css(vec![charset.into()]), "@charset \"utf-8\";");
    }

    #[test]
    fn test_at_rule_with_declarations() {
        let font_face = AtRule::new("@font-face").with_block(vec![
            Declaration::new("font-family", Expression::quoted("Inter")).into(),
            decl("src", "url(inter.woff2)"),
        ]);
        assert_eq!(
            render_css(vec![font_face.into()]),
            "@font-face {\n  font-family: \"Inter\";\n  src: url(inter.woff2); }\n"
        );
    }

    #[test]
    fn test_at_rule_with_hoisted_rule() {
        let supports = AtRule::new("@supports")
            .with_value(Expression::string("(display: grid)"))
            .with_block(vec![rule("a", vec![decl("display", "grid")])]);
        assert_eq!(
            render_css(vec![supports.into()]),
            "@supports (display: grid) {\n  a {\n    display: grid; } }\n"
        );
    }

    #[test]
    fn test_at_rule_selector_prelude() {
        let page = AtRule::new("@page")
            .with_selector(selector(":first"))
            .with_value(Expression::string("ignored"))
            .with_block(vec![decl("margin", "1in")]);
        assert_eq!(render_css(vec![page.into()]), "@page :first {\n  margin: 1in; }\n");
    }

    #[test]
    fn test_nested_at_rule_does_not_indent_itself() {
        let page = AtRule::new("@page").with_block(vec![
            decl("margin", "1in"),
            AtRule::new("@top-center")
                .with_block(vec![Declaration::new("content", Expression::quoted("x")).into()])
                .into(),
        ]);
        assert_eq!(
            render_css(vec![page.into()]),
            "@page {\n  margin: 1in;\n@top-center {\n    content: \"x\"; } }\n"
        );
    }

    #[test]
    fn test_double_trim_after_bodyless_hoisted_at_rule() {
        let wrapper = AtRule::new("@layer").with_block(vec![AtRule::new("@charset")
            .with_value(Expression::quoted("a"))
            .into()]);
        let renderer = render_with(&RenderOptions::default(), vec![wrapper.into()]);
        assert_eq!(renderer.buffer(), "@layer {\n@charset \"a\" }\n");
        assert_eq!(renderer.source_map().position().line, 2);
        assert_eq!(renderer.source_map().position().column, 0);
    }

    // =========================================================================
    // Root block and imports
    // =========================================================================

    #[test]
    fn test_root_separates_statements() {
        let css = render_css(vec![
            rule("a", vec![decl("color", "red")]),
            rule("b", vec![decl("color", "blue")]),
        ]);
        assert_eq!(css, "a {\n  color: red; }\n\nb {\n  color: blue; }\n");
    }

    #[test]
    fn test_root_skips_separator_for_invisible_rule() {
        let css = render_css(vec![
            rule("a", vec![Extension::new(selector(".x")).into()]),
            rule("b", vec![decl("color", "blue")]),
        ]);
        assert_eq!(css, "b {\n  color: blue; }\n");
    }

    #[test]
    fn test_root_fallback_statements() {
        let css = render_css(vec![
            Comment::new("/* header */").into(),
            rule("a", vec![decl("color", "red")]),
        ]);
        assert_eq!(css, "/* header */\na {\n  color: red; }\n");
    }

    #[test]
    fn test_nested_block_not_rendered_alone() {
        let mut renderer = NestedRenderer::new(&RenderOptions::default());
        renderer
            .render(&Block::nested(vec![decl("color", "red")]).into())
            .unwrap();
        assert_eq!(renderer.buffer(), "");
    }

    #[test]
    fn test_imports_diverted() {
        let renderer = render_with(
            &RenderOptions::default(),
            vec![
                import("a.css"),
                import("b.css"),
                import("c.css"),
                rule("x", vec![decl("color", "red")]),
            ],
        );
        assert_eq!(
            renderer.imports(),
            "@import \"a.css\";\n@import \"b.css\";\n@import \"c.css\";"
        );
        assert_eq!(renderer.buffer(), "x {\n  color: red; }\n");
    }

    #[test]
    fn test_imports_between_rules() {
        let renderer = render_with(
            &RenderOptions::default(),
            vec![
                import("a.css"),
                rule("x", vec![decl("color", "red")]),
                import("b.css"),
                rule("y", vec![decl("color", "blue")]),
            ],
        );
        assert_eq!(renderer.imports(), "@import \"a.css\";\n@import \"b.css\";");
        assert!(!renderer.buffer().contains("@import"));
        assert_eq!(
            renderer.buffer(),
            "x {\n  color: red; }\n\ny {\n  color: blue; }\n"
        );
    }

    // =========================================================================
    // State invariants
    // =========================================================================

    #[test]
    fn test_indentation_restored() {
        let renderer = render_with(
            &RenderOptions::default(),
            vec![rule(
                "a",
                vec![
                    decl("color", "red"),
                    media("print", vec![decl("color", "black")])
                        .within(selector("a"))
                        .into(),
                    rule("a b", vec![rule("a b c", vec![decl("color", "blue")])]),
                ],
            )],
        );
        assert_eq!(renderer.indentation(), 0);
    }

    #[test]
    fn test_source_map_line_matches_output() {
        let renderer = render_with(
            &RenderOptions::default(),
            vec![
                rule(
                    "a",
                    vec![decl("color", "red"), rule("a b", vec![decl("color", "blue")])],
                ),
                media("screen", vec![rule("c", vec![decl("color", "green")])]).into(),
            ],
        );
        let newlines = renderer.buffer().matches('\n').count();
        assert_eq!(renderer.source_map().position().line, newlines);
        assert_eq!(renderer.source_map().position().column, 0);
    }

    #[test]
    fn test_media_records_mapping() {
        let query = MediaBlock {
            span: Span::new("main.scss", 7, 1),
            ..media("print", vec![rule("a", vec![decl("color", "black")])])
        };
        let renderer = render_with(
            &RenderOptions::default(),
            vec![rule("a", vec![decl("color", "red")]), query.into()],
        );
        let mappings = renderer.source_map().mappings();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].source, Span::new("main.scss", 7, 1));
        assert_eq!(mappings[0].generated.line, 3);
        assert_eq!(mappings[0].generated.column, 0);
    }

    #[test]
    fn test_retract_empty_buffer_is_error() {
        let mut renderer = NestedRenderer::new(&RenderOptions::default());
        assert_eq!(
            renderer.retract_trailing_newline(),
            Err(RenderError::EmptyBuffer)
        );
    }

    #[test]
    fn test_nested_restores_indentation_on_error() {
        let mut renderer = NestedRenderer::new(&RenderOptions::default());
        let result = renderer.nested(|r| r.nested(|r| r.retract_trailing_newline()));
        assert_eq!(result, Err(RenderError::EmptyBuffer));
        assert_eq!(renderer.indentation(), 0);
    }
}
