use crate::syntax::{AccessorBody, PropertyDeclaration};

/// Source text of a single-expression accessor body, verbatim.
///
/// Block bodies, auto accessors and bodiless members yield `None`.
pub fn extract_expression_body(node: &PropertyDeclaration) -> Option<&str> {
    match node.body.as_ref()? {
        AccessorBody::Expression { text } => Some(text.as_str()),
        AccessorBody::Block { .. } | AccessorBody::Auto => None,
    }
}
