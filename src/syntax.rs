//! Syntax Module for the Bonsai generator
//!
//! The declaration tree handed to a generation pass. Hosts either build it
//! directly or load it from JSON (see `host`). Node ids are not part of the
//! serialized form; `assign_node_ids` numbers every declaration once the trees
//! are owned by a compilation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// NODE IDENTITY
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

// ═══════════════════════════════════════════════════════════════════════════════
// DECLARATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// One source file worth of declarations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxTree {
    #[serde(default)]
    pub path: String,
    /// Namespaces imported at the top of the file
    #[serde(default)]
    pub usings: Vec<String>,
    #[serde(default)]
    pub members: Vec<MemberDeclaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "declaration", rename_all = "camelCase")]
pub enum MemberDeclaration {
    Namespace(NamespaceDeclaration),
    Type(TypeDeclaration),
    Delegate(DelegateDeclaration),
    Property(PropertyDeclaration),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceDeclaration {
    /// May be dotted (`Demo.Inner`)
    pub name: String,
    #[serde(default)]
    pub members: Vec<MemberDeclaration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Record,
    Interface,
}

impl TypeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Record => "record",
            TypeKind::Interface => "interface",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDeclaration {
    #[serde(skip)]
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub type_kind: TypeKind,
    #[serde(default)]
    pub members: Vec<MemberDeclaration>,
}

/// A user-declared function-valued type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateDeclaration {
    #[serde(skip)]
    pub id: NodeId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Internal,
    Static,
    Abstract,
    Virtual,
    Override,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSyntax {
    /// Name as written, e.g. `Bonsai` or `Bonsai.BonsaiAttribute`
    pub name: String,
}

impl AttributeSyntax {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// How a property's getter is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "camelCase")]
pub enum AccessorBody {
    /// `=> expression`, text kept exactly as it appears in source
    Expression { text: String },
    /// `{ get { ... } }`
    Block {
        #[serde(default)]
        statements: Vec<String>,
    },
    /// `{ get; }`
    Auto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDeclaration {
    #[serde(skip)]
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(rename = "type")]
    pub declared_type: TypeSyntax,
    #[serde(default)]
    pub attributes: Vec<AttributeSyntax>,
    /// `None` when the member has no accessor syntax at all
    #[serde(default)]
    pub body: Option<AccessorBody>,
}

impl PropertyDeclaration {
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TYPE SYNTAX
// ═══════════════════════════════════════════════════════════════════════════════

/// A type as written: `System.Func<string, int>`, `int[]`, `Person?`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeSyntax {
    /// Possibly qualified name without type arguments
    pub name: String,
    pub arguments: Vec<TypeSyntax>,
    /// Trailing `?` and `[]` markers
    pub suffix: String,
}

impl TypeSyntax {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            suffix: String::new(),
        }
    }

    pub fn generic(name: impl Into<String>, arguments: Vec<TypeSyntax>) -> Self {
        Self {
            name: name.into(),
            arguments,
            suffix: String::new(),
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.name.contains('.')
    }

    /// Last segment of the name, suffix included.
    pub fn simple_name(&self) -> String {
        let last = self.name.rsplit('.').next().unwrap_or(&self.name);
        format!("{}{}", last, self.suffix)
    }
}

impl fmt::Display for TypeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.arguments.is_empty() {
            f.write_str("<")?;
            for (index, argument) in self.arguments.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", argument)?;
            }
            f.write_str(">")?;
        }
        f.write_str(&self.suffix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeSyntaxError {
    #[error("expected a type name at position {position}")]
    ExpectedName { position: usize },
    #[error("unexpected '{found}' at position {position}")]
    Unexpected { found: char, position: usize },
    #[error("unexpected end of type syntax")]
    UnexpectedEnd,
}

impl FromStr for TypeSyntax {
    type Err = TypeSyntaxError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeParser {
            chars: source.chars().collect(),
            pos: 0,
        };
        let parsed = parser.parse_type()?;
        parser.skip_whitespace();
        if let Some(found) = parser.peek() {
            return Err(TypeSyntaxError::Unexpected {
                found,
                position: parser.pos,
            });
        }
        Ok(parsed)
    }
}

impl TryFrom<String> for TypeSyntax {
    type Error = TypeSyntaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeSyntax> for String {
    fn from(value: TypeSyntax) -> Self {
        value.to_string()
    }
}

struct TypeParser {
    chars: Vec<char>,
    pos: usize,
}

impl TypeParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn parse_type(&mut self) -> Result<TypeSyntax, TypeSyntaxError> {
        self.skip_whitespace();
        let name = self.parse_qualified_name()?;

        let mut arguments = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some('<') {
            self.pos += 1;
            loop {
                arguments.push(self.parse_type()?);
                self.skip_whitespace();
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some('>') => {
                        self.pos += 1;
                        break;
                    }
                    Some(found) => {
                        return Err(TypeSyntaxError::Unexpected {
                            found,
                            position: self.pos,
                        })
                    }
                    None => return Err(TypeSyntaxError::UnexpectedEnd),
                }
            }
        }

        let suffix = self.parse_suffix()?;
        Ok(TypeSyntax {
            name,
            arguments,
            suffix,
        })
    }

    fn parse_qualified_name(&mut self) -> Result<String, TypeSyntaxError> {
        let mut name = self.parse_identifier()?;
        while self.peek() == Some('.') {
            self.pos += 1;
            name.push('.');
            name.push_str(&self.parse_identifier()?);
        }
        Ok(name)
    }

    fn parse_identifier(&mut self) -> Result<String, TypeSyntaxError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => self.pos += 1,
            Some(_) => return Err(TypeSyntaxError::ExpectedName { position: start }),
            None => return Err(TypeSyntaxError::UnexpectedEnd),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_suffix(&mut self) -> Result<String, TypeSyntaxError> {
        let mut suffix = String::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('?') => {
                    suffix.push('?');
                    self.pos += 1;
                }
                Some('[') => {
                    suffix.push('[');
                    self.pos += 1;
                    loop {
                        match self.peek() {
                            Some(']') => {
                                suffix.push(']');
                                self.pos += 1;
                                break;
                            }
                            Some(',') => {
                                suffix.push(',');
                                self.pos += 1;
                            }
                            Some(c) if c.is_whitespace() => self.pos += 1,
                            Some(found) => {
                                return Err(TypeSyntaxError::Unexpected {
                                    found,
                                    position: self.pos,
                                })
                            }
                            None => return Err(TypeSyntaxError::UnexpectedEnd),
                        }
                    }
                }
                _ => return Ok(suffix),
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE NUMBERING
// ═══════════════════════════════════════════════════════════════════════════════

/// Give every type, delegate and property declaration a distinct id.
/// Numbering follows tree order, then pre-order within each tree.
pub fn assign_node_ids(trees: &mut [SyntaxTree]) {
    let mut next = 0u32;
    for tree in trees.iter_mut() {
        number_members(&mut tree.members, &mut next);
    }
}

fn number_members(members: &mut [MemberDeclaration], next: &mut u32) {
    for member in members {
        match member {
            MemberDeclaration::Namespace(ns) => number_members(&mut ns.members, next),
            MemberDeclaration::Type(ty) => {
                ty.id = take_id(next);
                number_members(&mut ty.members, next);
            }
            MemberDeclaration::Delegate(delegate) => delegate.id = take_id(next),
            MemberDeclaration::Property(property) => property.id = take_id(next),
        }
    }
}

fn take_id(next: &mut u32) -> NodeId {
    let id = NodeId(*next);
    *next += 1;
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generic_type() {
        let ty: TypeSyntax = "Func<string, int>".parse().unwrap();
        assert_eq!(ty.name, "Func");
        assert_eq!(ty.arguments.len(), 2);
        assert_eq!(ty.arguments[0].name, "string");
        assert_eq!(ty.arguments[1].name, "int");
        assert_eq!(ty.to_string(), "Func<string, int>");
        assert_eq!(
            ty,
            TypeSyntax::generic(
                "Func",
                vec![TypeSyntax::named("string"), TypeSyntax::named("int")]
            )
        );
    }

    #[test]
    fn test_parse_nested_and_suffixed_type() {
        let ty: TypeSyntax = "System.Func<List<int>, int[]?>".parse().unwrap();
        assert_eq!(ty.simple_name(), "Func");
        assert!(ty.is_qualified());
        assert_eq!(ty.arguments[0].arguments[0].name, "int");
        assert_eq!(ty.arguments[1].suffix, "[]?");
        assert_eq!(ty.arguments[1].simple_name(), "int[]?");
    }

    #[test]
    fn test_parse_rejects_malformed_type() {
        assert_eq!(
            "Func<string".parse::<TypeSyntax>(),
            Err(TypeSyntaxError::UnexpectedEnd)
        );
        assert!(matches!(
            "Func<string int>".parse::<TypeSyntax>(),
            Err(TypeSyntaxError::Unexpected { found: 'i', .. })
        ));
        assert!(matches!(
            "<int>".parse::<TypeSyntax>(),
            Err(TypeSyntaxError::ExpectedName { position: 0 })
        ));
    }

    #[test]
    fn test_tree_from_json() {
        let json = r#"{
            "path": "Program.cs",
            "usings": ["System"],
            "members": [{
                "declaration": "namespace",
                "name": "Demo",
                "members": [{
                    "declaration": "type",
                    "name": "Program",
                    "typeKind": "class",
                    "members": [{
                        "declaration": "property",
                        "name": "StringLength",
                        "modifiers": ["public", "static"],
                        "type": "Func<string, int>",
                        "attributes": ["Bonsai"],
                        "body": { "form": "expression", "text": "message => message.Length" }
                    }]
                }]
            }]
        }"#;

        let mut trees = vec![serde_json::from_str::<SyntaxTree>(json).unwrap()];
        assign_node_ids(&mut trees);

        let MemberDeclaration::Namespace(ns) = &trees[0].members[0] else {
            panic!("expected namespace");
        };
        let MemberDeclaration::Type(ty) = &ns.members[0] else {
            panic!("expected type");
        };
        let MemberDeclaration::Property(property) = &ty.members[0] else {
            panic!("expected property");
        };
        assert_eq!(ty.id, NodeId(0));
        assert_eq!(property.id, NodeId(1));
        assert!(property.has_modifier(Modifier::Static));
        assert_eq!(property.attributes, vec![AttributeSyntax::new("Bonsai")]);
        assert_eq!(
            property.body,
            Some(AccessorBody::Expression {
                text: "message => message.Length".to_string()
            })
        );
    }
}
