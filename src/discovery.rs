//! Discovery Module for the Bonsai generator
//!
//! Walks every syntax tree, keeps property declarations that carry the marker
//! attribute and resolves them to semantic symbols. Discovery is best-effort:
//! anything that fails to resolve is skipped, never reported.

use tracing::debug;

use crate::outcome::{Outcome, SkipReason};
use crate::semantic::{PropertySymbol, SemanticModel, TypeRef};
use crate::syntax::{PropertyDeclaration, SyntaxTree};
use crate::visitor::{walk_trees, SyntaxVisitor};

// ═══════════════════════════════════════════════════════════════════════════════
// CANDIDATE
// ═══════════════════════════════════════════════════════════════════════════════

/// A marker-annotated property together with the syntax it was declared by.
#[derive(Debug, Clone)]
pub struct Candidate<'ast> {
    pub symbol: PropertySymbol,
    pub node: &'ast PropertyDeclaration,
}

impl<'ast> Candidate<'ast> {
    pub fn name(&self) -> &str {
        &self.symbol.name
    }

    pub fn is_static(&self) -> bool {
        self.symbol.is_static
    }

    pub fn declared_type(&self) -> &TypeRef {
        &self.symbol.declared_type
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ATTRIBUTED PROPERTY COLLECTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Collects properties with at least one attribute. Unattributed properties
/// never reach the resolver.
#[derive(Default)]
struct AttributedProperties<'ast> {
    found: Vec<&'ast PropertyDeclaration>,
}

impl<'ast> SyntaxVisitor<'ast> for AttributedProperties<'ast> {
    fn visit_property(&mut self, property: &'ast PropertyDeclaration) {
        if !property.attributes.is_empty() {
            self.found.push(property);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CANDIDATE DISCOVERY
// ═══════════════════════════════════════════════════════════════════════════════

/// Discover every candidate in `trees`, in tree order then declaration order.
///
/// Properties carrying attributes but not the marker produce neither a
/// candidate nor a skip.
pub fn discover_candidates<'ast, M: SemanticModel + ?Sized>(
    model: &M,
    trees: &'ast [SyntaxTree],
    marker_attribute: &str,
) -> Vec<Outcome<Candidate<'ast>>> {
    let mut collector = AttributedProperties::default();
    walk_trees(&mut collector, trees);

    collector
        .found
        .into_iter()
        .filter_map(|node| resolve_candidate(model, node, marker_attribute))
        .collect()
}

fn resolve_candidate<'ast, M: SemanticModel + ?Sized>(
    model: &M,
    node: &'ast PropertyDeclaration,
    marker_attribute: &str,
) -> Option<Outcome<Candidate<'ast>>> {
    let Some(symbol) = model.resolve_property(node) else {
        debug!(property = %node.name, "skipping unresolved property");
        return Some(Outcome::Skipped(SkipReason::UnresolvedSymbol {
            property: node.name.clone(),
        }));
    };

    let marked = model
        .attributes(&symbol)
        .iter()
        .any(|attribute| attribute.attribute_class.as_deref() == Some(marker_attribute));
    if !marked {
        return None;
    }

    if !symbol.has_accessor_syntax {
        debug!(property = %symbol.name, "skipping property without accessor syntax");
        return Some(Outcome::Skipped(SkipReason::MissingAccessorSyntax {
            property: symbol.name,
        }));
    }

    Some(Outcome::Emitted(Candidate { symbol, node }))
}
