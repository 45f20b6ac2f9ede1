//! Semantic capability consumed by a generation pass.
//!
//! The pipeline never talks to a concrete compiler. Whatever resolves symbols
//! (the in-memory `Compilation`, a test double, a host bridge) implements
//! `SemanticModel` and the pipeline only sees these types.

use serde::{Deserialize, Serialize};

use crate::syntax::{PropertyDeclaration, TypeKind};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct SymbolId(pub u32);

/// A resolved reference to a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    /// Simple name, never qualified
    pub name: String,
    pub is_function: bool,
    /// Positional type arguments, in declaration order
    pub arguments: Vec<TypeRef>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_function: false,
            arguments: Vec::new(),
        }
    }

    pub fn function(name: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            is_function: true,
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySymbol {
    pub id: SymbolId,
    pub name: String,
    pub is_static: bool,
    pub declared_type: TypeRef,
    /// False for members whose getter has no syntax (abstract, bodiless)
    pub has_accessor_syntax: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainingSymbol {
    /// Fully qualified namespace; empty for the global namespace
    Namespace(String),
    Type(SymbolId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSymbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: TypeKind,
    pub containing_namespace: String,
    pub containing_symbol: ContainingSymbol,
}

impl TypeSymbol {
    /// True when the type is declared directly inside its namespace.
    pub fn is_namespace_member(&self) -> bool {
        matches!(
            &self.containing_symbol,
            ContainingSymbol::Namespace(ns) if *ns == self.containing_namespace
        )
    }

    pub fn display_name(&self) -> String {
        if self.containing_namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.containing_namespace, self.name)
        }
    }
}

/// An attribute applied to a symbol. `attribute_class` is the fully qualified
/// name of the attribute type, `None` if the name did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeData {
    pub attribute_class: Option<String>,
}

pub trait SemanticModel {
    fn resolve_property(&self, node: &PropertyDeclaration) -> Option<PropertySymbol>;

    fn attributes(&self, symbol: &PropertySymbol) -> Vec<AttributeData>;

    /// Positional type arguments of a function-valued type, `None` for any other type.
    fn type_arguments<'t>(&self, ty: &'t TypeRef) -> Option<&'t [TypeRef]> {
        ty.is_function.then_some(ty.arguments.as_slice())
    }

    fn containing_type(&self, symbol: &PropertySymbol) -> Option<TypeSymbol>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_symbol(containing: ContainingSymbol) -> TypeSymbol {
        TypeSymbol {
            id: SymbolId(1),
            name: "Program".to_string(),
            kind: TypeKind::Class,
            containing_namespace: "Demo".to_string(),
            containing_symbol: containing,
        }
    }

    #[test]
    fn test_namespace_membership() {
        assert!(type_symbol(ContainingSymbol::Namespace("Demo".to_string())).is_namespace_member());
        assert!(!type_symbol(ContainingSymbol::Type(SymbolId(0))).is_namespace_member());
        assert!(!type_symbol(ContainingSymbol::Namespace("Other".to_string())).is_namespace_member());
    }

    #[test]
    fn test_display_name_in_global_namespace() {
        let mut symbol = type_symbol(ContainingSymbol::Namespace(String::new()));
        symbol.containing_namespace = String::new();
        assert_eq!(symbol.display_name(), "Program");
        assert!(symbol.is_namespace_member());
    }
}
