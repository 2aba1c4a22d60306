//! Decides which statements produce output.

use cinder_ast::{Block, ExprKind, Statement};

/// Whether a statement has anything to print. Only rules can be empty.
pub fn has_printable_children(stmt: &Statement) -> bool {
    match stmt {
        Statement::Rule(rule) => block_has_printable_children(&rule.block),
        _ => true,
    }
}

/// Whether a block holds anything other than `@extend` directives.
///
/// The first nested block found decides the result on its own; siblings
/// after it are not scanned.
pub fn block_has_printable_children(block: &Block) -> bool {
    for stmt in &block.statements {
        match stmt {
            Statement::Block(nested) => return block_has_printable_children(nested),
            Statement::Extension(_) => continue,
            _ => return true,
        }
    }
    false
}

/// Whether a non-hoistable child is dropped from its parent body: `@extend`
/// directives, and declarations whose value prints nothing.
pub fn is_suppressed(stmt: &Statement) -> bool {
    match stmt {
        Statement::Extension(_) => true,
        Statement::Declaration(decl) => match &decl.value.kind {
            ExprKind::String(text) => text.is_empty(),
            ExprKind::List { items, .. } => items.iter().all(|item| item.is_invisible()),
            _ => false,
        },
        _ => false,
    }
}
