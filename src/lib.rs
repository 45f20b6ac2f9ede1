//! # Bonsai Generator
//!
//! A build-time pass that finds properties marked `[Bonsai]` and emits, for
//! each one, a `{Name}Bonsai()` method returning a textual description of the
//! property's type and expression body.
//!
//! ## Pipeline
//!
//! 1. **Discovery** (`discovery`): attributed property declarations are
//!    resolved through a `SemanticModel`; those carrying the marker become
//!    candidates.
//! 2. **Grouping** (`grouping`): candidates are grouped by their directly
//!    enclosing type. Types nested inside another type are dropped whole.
//! 3. **Emission** (`codegen`): one partial redeclaration per owning type, one
//!    method per expression-bodied candidate. Method bodies are
//!    `describe_type(..) + " Expression: " + <expression text>`.
//!
//! The marker attribute definition (`bootstrap`) is emitted on every pass.
//!
//! ## Failure Policy
//!
//! Nothing in a pass is fatal and nothing is reported to the user. Unresolved
//! symbols, nested owners and non-expression bodies are skipped; the skips are
//! visible on `PassReport` and in `tracing` output at debug level only.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod body;
mod bootstrap;
mod cache;
mod codegen;
mod discovery;
mod error;
mod generator;
mod grouping;
mod host;
mod model;
mod options;
mod outcome;
mod semantic;
mod signature;
mod syntax;
mod validate;
mod visitor;


pub use body::extract_expression_body;
pub use bootstrap::marker_attribute_source;
pub use cache::OutputCache;
pub use codegen::{escape_string_literal, GeneratedMember, GeneratedSource};
pub use discovery::{discover_candidates, Candidate};
pub use error::{CacheError, HostError};
pub use generator::{generate, BonsaiGenerator, PassPlan, PassReport};
pub use grouping::{group_by_owner, CandidateGroup, OwningType};
pub use host::{load_directory, load_tree, run_directory, write_sources, HostOptions};
pub use model::{Compilation, ModelOptions};
pub use options::GeneratorOptions;
pub use outcome::{Outcome, SkipReason};
pub use semantic::{
    AttributeData, ContainingSymbol, PropertySymbol, SemanticModel, SymbolId, TypeRef, TypeSymbol,
};
pub use signature::describe_type;
pub use syntax::{
    AccessorBody, AttributeSyntax, DelegateDeclaration, MemberDeclaration, Modifier,
    NamespaceDeclaration, NodeId, PropertyDeclaration, SyntaxTree, TypeDeclaration, TypeKind,
    TypeSyntax, TypeSyntaxError,
};
pub use validate::{validate_tree, ValidationError};
pub use visitor::SyntaxVisitor;

/// Run one pass over a JSON array of syntax trees with default options.
#[cfg(feature = "napi")]
#[napi]
pub fn generate_bonsai_native(trees_json: String) -> napi::Result<Vec<GeneratedSource>> {
    let trees: Vec<SyntaxTree> = serde_json::from_str(&trees_json)
        .map_err(|e| napi::Error::from_reason(format!("Invalid syntax trees: {}", e)))?;

    for tree in &trees {
        let errors = validate_tree(tree);
        if let Some(first) = errors.first() {
            return Err(napi::Error::from_reason(format!("{}: {}", tree.path, first)));
        }
    }

    let compilation = Compilation::new(trees, ModelOptions::default());
    Ok(generate(&compilation))
}
