//! Structural checks for declaration trees supplied by a host.
//!
//! Names end up verbatim in generated source, so anything that would not be
//! a legal identifier is rejected at load time rather than emitted.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::syntax::{
    DelegateDeclaration, NamespaceDeclaration, PropertyDeclaration, SyntaxTree, TypeDeclaration,
};
use crate::visitor::{walk_namespace, walk_tree, walk_type, SyntaxVisitor};

lazy_static! {
    /// A single identifier, optionally `@`-escaped
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^@?[\p{L}_][\p{L}\p{N}_]*$").unwrap();

    /// Dot-separated identifiers
    static ref QUALIFIED_NAME_RE: Regex =
        Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*(\.[\p{L}_][\p{L}\p{N}_]*)*$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{name}' is not a valid {context} name")]
    InvalidIdentifier { name: String, context: &'static str },

    #[error("'{name}' is not a valid qualified {context} name")]
    InvalidQualifiedName { name: String, context: &'static str },

    #[error("namespace '{namespace}' is declared inside type '{owner}'")]
    NamespaceInsideType { namespace: String, owner: String },
}

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

pub fn is_qualified_name(name: &str) -> bool {
    QUALIFIED_NAME_RE.is_match(name)
}

/// Every problem found in `tree`, in traversal order. Empty means valid.
pub fn validate_tree(tree: &SyntaxTree) -> Vec<ValidationError> {
    let mut validator = TreeValidator::default();
    validator.visit_tree(tree);
    validator.errors
}

#[derive(Default)]
struct TreeValidator {
    errors: Vec<ValidationError>,
    enclosing_types: Vec<String>,
}

impl TreeValidator {
    fn check_identifier(&mut self, name: &str, context: &'static str) {
        if !is_identifier(name) {
            self.errors.push(ValidationError::InvalidIdentifier {
                name: name.to_string(),
                context,
            });
        }
    }

    fn check_qualified(&mut self, name: &str, context: &'static str) {
        if !is_qualified_name(name) {
            self.errors.push(ValidationError::InvalidQualifiedName {
                name: name.to_string(),
                context,
            });
        }
    }
}

impl<'ast> SyntaxVisitor<'ast> for TreeValidator {
    fn visit_tree(&mut self, tree: &'ast SyntaxTree) {
        for using in &tree.usings {
            self.check_qualified(using, "using");
        }
        walk_tree(self, tree);
    }

    fn visit_namespace(&mut self, namespace: &'ast NamespaceDeclaration) {
        self.check_qualified(&namespace.name, "namespace");
        if let Some(owner) = self.enclosing_types.last() {
            self.errors.push(ValidationError::NamespaceInsideType {
                namespace: namespace.name.clone(),
                owner: owner.clone(),
            });
            return;
        }
        walk_namespace(self, namespace);
    }

    fn visit_type(&mut self, ty: &'ast TypeDeclaration) {
        self.check_identifier(&ty.name, "type");
        self.enclosing_types.push(ty.name.clone());
        walk_type(self, ty);
        self.enclosing_types.pop();
    }

    fn visit_delegate(&mut self, delegate: &'ast DelegateDeclaration) {
        self.check_identifier(&delegate.name, "delegate");
    }

    fn visit_property(&mut self, property: &'ast PropertyDeclaration) {
        self.check_identifier(&property.name, "property");
        for attribute in &property.attributes {
            self.check_qualified(&attribute.name, "attribute");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{AttributeSyntax, MemberDeclaration, TypeKind, TypeSyntax};

    fn property(name: &str, attribute: &str) -> MemberDeclaration {
        MemberDeclaration::Property(PropertyDeclaration {
            id: Default::default(),
            name: name.to_string(),
            modifiers: vec![],
            declared_type: TypeSyntax::named("int"),
            attributes: vec![AttributeSyntax::new(attribute)],
            body: None,
        })
    }

    fn type_decl(name: &str, members: Vec<MemberDeclaration>) -> MemberDeclaration {
        MemberDeclaration::Type(TypeDeclaration {
            id: Default::default(),
            name: name.to_string(),
            type_kind: TypeKind::Class,
            members,
        })
    }

    #[test]
    fn test_identifier_patterns() {
        assert!(is_identifier("StringLength"));
        assert!(is_identifier("_value1"));
        assert!(is_identifier("@class"));
        assert!(is_identifier("Größe"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("has space"));
        assert!(!is_identifier("Demo.Program"));
        assert!(is_qualified_name("Demo.App"));
        assert!(!is_qualified_name("Demo..App"));
        assert!(!is_qualified_name(".Demo"));
    }

    #[test]
    fn test_valid_tree_has_no_errors() {
        let tree = SyntaxTree {
            path: "ok.cs".to_string(),
            usings: vec!["System.Linq".to_string()],
            members: vec![MemberDeclaration::Namespace(NamespaceDeclaration {
                name: "Demo.App".to_string(),
                members: vec![type_decl("Program", vec![property("Value", "Bonsai.Bonsai")])],
            })],
        };
        assert!(validate_tree(&tree).is_empty());
    }

    #[test]
    fn test_invalid_names_are_reported_in_order() {
        let tree = SyntaxTree {
            path: "bad.cs".to_string(),
            usings: vec!["System.".to_string()],
            members: vec![type_decl(
                "Program",
                vec![
                    property("not valid", "Bonsai"),
                    MemberDeclaration::Namespace(NamespaceDeclaration {
                        name: "Inner".to_string(),
                        members: vec![],
                    }),
                ],
            )],
        };

        assert_eq!(
            validate_tree(&tree),
            vec![
                ValidationError::InvalidQualifiedName {
                    name: "System.".to_string(),
                    context: "using"
                },
                ValidationError::InvalidIdentifier {
                    name: "not valid".to_string(),
                    context: "property"
                },
                ValidationError::NamespaceInsideType {
                    namespace: "Inner".to_string(),
                    owner: "Program".to_string()
                },
            ]
        );
    }
}
