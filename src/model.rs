//! In-memory semantic model.
//!
//! `Compilation` owns a set of syntax trees and answers the `SemanticModel`
//! queries a generation pass makes. Name lookup follows the usual rules for
//! namespaced languages: enclosing types, then enclosing namespaces from the
//! innermost outwards (ending at the global namespace), then imported
//! namespaces.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::options::DEFAULT_MARKER_ATTRIBUTE;
use crate::semantic::{
    AttributeData, ContainingSymbol, PropertySymbol, SemanticModel, SymbolId, TypeRef, TypeSymbol,
};
use crate::syntax::{
    assign_node_ids, DelegateDeclaration, Modifier, NamespaceDeclaration, PropertyDeclaration,
    SyntaxTree, TypeDeclaration, TypeSyntax,
};
use crate::visitor::{walk_namespace, walk_tree, walk_trees, walk_type, SyntaxVisitor};

const ATTRIBUTE_SUFFIX: &str = "Attribute";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelOptions {
    /// Fully qualified names of built-in function-valued types
    pub function_types: Vec<String>,
    /// Namespaces visible in every tree without a `using`
    pub implicit_usings: Vec<String>,
    /// Attribute classes that exist without a declaration in the trees,
    /// such as the bootstrap marker
    pub attribute_classes: Vec<String>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            function_types: vec!["System.Func".to_string(), "System.Action".to_string()],
            implicit_usings: vec!["System".to_string()],
            attribute_classes: vec![DEFAULT_MARKER_ATTRIBUTE.to_string()],
        }
    }
}

impl ModelOptions {
    /// Registers `fqn` as an attribute class, once.
    pub fn with_attribute_class(mut self, fqn: &str) -> Self {
        if !self.attribute_classes.iter().any(|class| class == fqn) {
            self.attribute_classes.push(fqn.to_string());
        }
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SYMBOL TABLE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct KnownType {
    is_function: bool,
}

/// Where a name is looked up from.
#[derive(Debug, Clone, Default)]
struct Scope {
    /// Fully qualified enclosing namespace, empty for global
    namespace: String,
    /// Fully qualified enclosing types, innermost first
    types: Vec<String>,
    usings: Vec<String>,
}

impl Scope {
    fn candidate_names(&self, name: &str) -> Vec<String> {
        let mut names = Vec::new();
        for ty in &self.types {
            names.push(qualify(ty, name));
        }

        let mut namespace = self.namespace.as_str();
        loop {
            names.push(qualify(namespace, name));
            if namespace.is_empty() {
                break;
            }
            namespace = namespace.rsplit_once('.').map_or("", |(parent, _)| parent);
        }

        for using in &self.usings {
            names.push(qualify(using, name));
        }
        names
    }
}

fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[derive(Debug, Clone)]
struct PropertyEntry {
    symbol: PropertySymbol,
    owner: Option<SymbolId>,
    attributes: Vec<AttributeData>,
}

#[derive(Debug, Default)]
struct SymbolTable {
    types: HashMap<SymbolId, TypeSymbol>,
    known_types: HashMap<String, KnownType>,
    attribute_classes: HashSet<String>,
    properties: HashMap<SymbolId, PropertyEntry>,
}

impl SymbolTable {
    fn build(trees: &[SyntaxTree], options: &ModelOptions) -> Self {
        let mut collector = DeclarationCollector {
            implicit_usings: &options.implicit_usings,
            ..Default::default()
        };
        walk_trees(&mut collector, trees);

        let mut table = SymbolTable::default();
        for fqn in &options.function_types {
            table
                .known_types
                .insert(fqn.clone(), KnownType { is_function: true });
        }
        table
            .attribute_classes
            .extend(options.attribute_classes.iter().cloned());

        for (fqn, symbol) in &collector.types {
            if symbol.name.ends_with(ATTRIBUTE_SUFFIX) {
                table.attribute_classes.insert(fqn.clone());
            }
            table
                .known_types
                .insert(fqn.clone(), KnownType { is_function: false });
        }
        for fqn in &collector.delegates {
            table
                .known_types
                .insert(fqn.clone(), KnownType { is_function: true });
        }
        table.types = collector
            .types
            .into_iter()
            .map(|(_, symbol)| (symbol.id, symbol))
            .collect();

        for pending in collector.properties {
            let entry = table.resolve_property_entry(&pending);
            table.properties.insert(entry.symbol.id, entry);
        }
        table
    }

    fn resolve_property_entry(&self, pending: &PendingProperty<'_>) -> PropertyEntry {
        let node = pending.node;
        let symbol = PropertySymbol {
            id: SymbolId(node.id.0),
            name: node.name.clone(),
            is_static: node.has_modifier(Modifier::Static),
            declared_type: self.resolve_type(&node.declared_type, &pending.scope),
            has_accessor_syntax: node.body.is_some() && !node.has_modifier(Modifier::Abstract),
        };
        let attributes = node
            .attributes
            .iter()
            .map(|attribute| AttributeData {
                attribute_class: self.resolve_attribute(&attribute.name, &pending.scope),
            })
            .collect();

        PropertyEntry {
            symbol,
            owner: pending.owner,
            attributes,
        }
    }

    fn resolve_type(&self, syntax: &TypeSyntax, scope: &Scope) -> TypeRef {
        let arguments = syntax
            .arguments
            .iter()
            .map(|argument| self.resolve_type(argument, scope))
            .collect();
        let known = scope
            .candidate_names(&syntax.name)
            .into_iter()
            .find_map(|fqn| self.known_types.get(&fqn));

        TypeRef {
            name: syntax.simple_name(),
            // `Func<int>[]` is an array, not a function
            is_function: syntax.suffix.is_empty() && known.is_some_and(|k| k.is_function),
            arguments,
        }
    }

    fn resolve_attribute(&self, name: &str, scope: &Scope) -> Option<String> {
        let suffixed = format!("{}{}", name, ATTRIBUTE_SUFFIX);
        // bound so the iterator is dropped before `suffixed`
        let found = [name, suffixed.as_str()]
            .into_iter()
            .flat_map(|form| scope.candidate_names(form))
            .find(|fqn| self.attribute_classes.contains(fqn));
        found
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECLARATION COLLECTION
// ═══════════════════════════════════════════════════════════════════════════════

struct PendingProperty<'ast> {
    node: &'ast PropertyDeclaration,
    scope: Scope,
    owner: Option<SymbolId>,
}

#[derive(Default)]
struct DeclarationCollector<'ast> {
    implicit_usings: &'ast [String],
    usings: Vec<String>,
    namespace: Vec<String>,
    /// Enclosing types, outermost first: (symbol, fully qualified name)
    type_path: Vec<(SymbolId, String)>,
    /// Keyed by fully qualified name; partial declarations share one symbol
    types: Vec<(String, TypeSymbol)>,
    type_index: HashMap<String, usize>,
    /// Fully qualified delegate names
    delegates: Vec<String>,
    properties: Vec<PendingProperty<'ast>>,
}

impl<'ast> DeclarationCollector<'ast> {
    fn current_namespace(&self) -> String {
        self.namespace.join(".")
    }

    fn current_prefix(&self) -> String {
        match self.type_path.last() {
            Some((_, fqn)) => fqn.clone(),
            None => self.current_namespace(),
        }
    }

    fn scope(&self) -> Scope {
        Scope {
            namespace: self.current_namespace(),
            types: self.type_path.iter().rev().map(|(_, fqn)| fqn.clone()).collect(),
            usings: self.usings.clone(),
        }
    }
}

impl<'ast> SyntaxVisitor<'ast> for DeclarationCollector<'ast> {
    fn visit_tree(&mut self, tree: &'ast SyntaxTree) {
        self.usings = tree.usings.clone();
        self.usings.extend(self.implicit_usings.iter().cloned());
        self.namespace.clear();
        self.type_path.clear();
        walk_tree(self, tree);
    }

    fn visit_namespace(&mut self, namespace: &'ast NamespaceDeclaration) {
        let segments: Vec<String> = namespace.name.split('.').map(str::to_string).collect();
        let depth = segments.len();
        self.namespace.extend(segments);
        walk_namespace(self, namespace);
        let keep = self.namespace.len() - depth;
        self.namespace.truncate(keep);
    }

    fn visit_type(&mut self, ty: &'ast TypeDeclaration) {
        let fqn = qualify(&self.current_prefix(), &ty.name);
        let id = match self.type_index.get(&fqn) {
            Some(&index) => self.types[index].1.id,
            None => {
                let containing_namespace = self.current_namespace();
                let containing_symbol = match self.type_path.last() {
                    Some((outer, _)) => ContainingSymbol::Type(*outer),
                    None => ContainingSymbol::Namespace(containing_namespace.clone()),
                };
                let symbol = TypeSymbol {
                    id: SymbolId(ty.id.0),
                    name: ty.name.clone(),
                    kind: ty.type_kind,
                    containing_namespace,
                    containing_symbol,
                };
                self.type_index.insert(fqn.clone(), self.types.len());
                self.types.push((fqn.clone(), symbol));
                SymbolId(ty.id.0)
            }
        };

        self.type_path.push((id, fqn));
        walk_type(self, ty);
        self.type_path.pop();
    }

    fn visit_delegate(&mut self, delegate: &'ast DelegateDeclaration) {
        let fqn = qualify(&self.current_prefix(), &delegate.name);
        self.delegates.push(fqn);
    }

    fn visit_property(&mut self, property: &'ast PropertyDeclaration) {
        self.properties.push(PendingProperty {
            node: property,
            scope: self.scope(),
            owner: self.type_path.last().map(|(id, _)| *id),
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILATION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct Compilation {
    trees: Vec<SyntaxTree>,
    options: ModelOptions,
    table: SymbolTable,
}

impl Compilation {
    pub fn new(mut trees: Vec<SyntaxTree>, options: ModelOptions) -> Self {
        assign_node_ids(&mut trees);
        let table = SymbolTable::build(&trees, &options);
        Self {
            trees,
            options,
            table,
        }
    }

    pub fn syntax_trees(&self) -> &[SyntaxTree] {
        &self.trees
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn type_symbol(&self, id: SymbolId) -> Option<&TypeSymbol> {
        self.table.types.get(&id)
    }
}

impl SemanticModel for Compilation {
    fn resolve_property(&self, node: &PropertyDeclaration) -> Option<PropertySymbol> {
        self.table
            .properties
            .get(&SymbolId(node.id.0))
            .filter(|entry| entry.symbol.name == node.name)
            .map(|entry| entry.symbol.clone())
    }

    fn attributes(&self, symbol: &PropertySymbol) -> Vec<AttributeData> {
        self.table
            .properties
            .get(&symbol.id)
            .map(|entry| entry.attributes.clone())
            .unwrap_or_default()
    }

    fn containing_type(&self, symbol: &PropertySymbol) -> Option<TypeSymbol> {
        let owner = self.table.properties.get(&symbol.id)?.owner?;
        self.table.types.get(&owner).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{AccessorBody, AttributeSyntax, MemberDeclaration, TypeKind};

    fn property(name: &str, ty: &str, attributes: &[&str]) -> MemberDeclaration {
        MemberDeclaration::Property(PropertyDeclaration {
            id: Default::default(),
            name: name.to_string(),
            modifiers: vec![Modifier::Public, Modifier::Static],
            declared_type: ty.parse().unwrap(),
            attributes: attributes.iter().map(|a| AttributeSyntax::new(*a)).collect(),
            body: Some(AccessorBody::Expression {
                text: "default".to_string(),
            }),
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

    fn namespace(name: &str, members: Vec<MemberDeclaration>) -> MemberDeclaration {
        MemberDeclaration::Namespace(NamespaceDeclaration {
            name: name.to_string(),
            members,
        })
    }

    fn tree(usings: &[&str], members: Vec<MemberDeclaration>) -> SyntaxTree {
        SyntaxTree {
            path: "test.cs".to_string(),
            usings: usings.iter().map(|u| u.to_string()).collect(),
            members,
        }
    }

    #[derive(Default)]
    struct Properties<'a>(Vec<&'a PropertyDeclaration>);

    impl<'a> SyntaxVisitor<'a> for Properties<'a> {
        fn visit_property(&mut self, property: &'a PropertyDeclaration) {
            self.0.push(property);
        }
    }

    fn properties(compilation: &Compilation) -> Vec<&PropertyDeclaration> {
        let mut collector = Properties::default();
        walk_trees(&mut collector, compilation.syntax_trees());
        collector.0
    }

    fn resolve(compilation: &Compilation, name: &str) -> PropertySymbol {
        let node = properties(compilation)
            .into_iter()
            .find(|p| p.name == name)
            .unwrap();
        compilation.resolve_property(node).unwrap()
    }

    #[test]
    fn test_builtin_function_type_through_implicit_using() {
        let compilation = Compilation::new(
            vec![tree(
                &[],
                vec![namespace(
                    "Demo",
                    vec![type_decl(
                        "Program",
                        vec![property("StringLength", "Func<string, int>", &["Bonsai"])],
                    )],
                )],
            )],
            ModelOptions::default(),
        );

        let symbol = resolve(&compilation, "StringLength");
        assert!(symbol.is_static);
        assert!(symbol.declared_type.is_function);
        assert_eq!(symbol.declared_type.name, "Func");
        assert_eq!(symbol.declared_type.arguments[0].name, "string");
        assert!(!symbol.declared_type.arguments[0].is_function);
    }

    #[test]
    fn test_attribute_resolution_with_and_without_suffix() {
        let compilation = Compilation::new(
            vec![tree(
                &["Bonsai"],
                vec![type_decl(
                    "Program",
                    vec![
                        property("Short", "int", &["Bonsai"]),
                        property("Long", "int", &["BonsaiAttribute"]),
                        property("Qualified", "int", &["Bonsai.Bonsai"]),
                        property("Unknown", "int", &["Missing"]),
                    ],
                )],
            )],
            ModelOptions::default(),
        );

        for name in ["Short", "Long", "Qualified"] {
            let symbol = resolve(&compilation, name);
            assert_eq!(
                compilation.attributes(&symbol),
                vec![AttributeData {
                    attribute_class: Some("Bonsai.BonsaiAttribute".to_string())
                }],
                "{name} should resolve to the marker"
            );
        }
        let unknown = resolve(&compilation, "Unknown");
        assert_eq!(
            compilation.attributes(&unknown),
            vec![AttributeData {
                attribute_class: None
            }]
        );
    }

    #[test]
    fn test_declared_attribute_and_delegate_types() {
        let compilation = Compilation::new(
            vec![tree(
                &[],
                vec![namespace(
                    "Demo",
                    vec![
                        type_decl("TraceAttribute", vec![]),
                        MemberDeclaration::Delegate(DelegateDeclaration {
                            id: Default::default(),
                            name: "Increment".to_string(),
                        }),
                        type_decl("Program", vec![property("Next", "Increment", &["Trace"])]),
                    ],
                )],
            )],
            ModelOptions::default(),
        );

        let symbol = resolve(&compilation, "Next");
        assert!(symbol.declared_type.is_function);
        assert!(symbol.declared_type.arguments.is_empty());
        assert_eq!(
            compilation.attributes(&symbol)[0].attribute_class.as_deref(),
            Some("Demo.TraceAttribute")
        );
    }

    #[test]
    fn test_nested_and_partial_containment() {
        let compilation = Compilation::new(
            vec![
                tree(
                    &[],
                    vec![namespace(
                        "Demo.App",
                        vec![type_decl(
                            "Outer",
                            vec![
                                property("Top", "int", &[]),
                                type_decl("Inner", vec![property("Deep", "int", &[])]),
                            ],
                        )],
                    )],
                ),
                tree(
                    &[],
                    vec![namespace(
                        "Demo.App",
                        vec![type_decl("Outer", vec![property("Other", "int", &[])])],
                    )],
                ),
            ],
            ModelOptions::default(),
        );

        let top = compilation
            .containing_type(&resolve(&compilation, "Top"))
            .unwrap();
        assert_eq!(top.containing_namespace, "Demo.App");
        assert!(top.is_namespace_member());

        let other = compilation
            .containing_type(&resolve(&compilation, "Other"))
            .unwrap();
        assert_eq!(other.id, top.id, "partial declarations share one symbol");

        let inner = compilation
            .containing_type(&resolve(&compilation, "Deep"))
            .unwrap();
        assert_eq!(inner.name, "Inner");
        assert_eq!(inner.containing_namespace, "Demo.App");
        assert_eq!(inner.containing_symbol, ContainingSymbol::Type(top.id));
        assert!(!inner.is_namespace_member());
        assert_eq!(compilation.type_symbol(top.id).unwrap().name, "Outer");
    }

    #[test]
    fn test_foreign_node_does_not_resolve() {
        let compilation = Compilation::new(
            vec![tree(&[], vec![type_decl("Program", vec![property("A", "int", &[])])])],
            ModelOptions::default(),
        );
        let MemberDeclaration::Property(foreign) = property("Elsewhere", "int", &[]) else {
            unreachable!()
        };
        assert!(compilation.resolve_property(&foreign).is_none());
    }

    #[test]
    fn test_abstract_property_has_no_accessor_syntax() {
        let mut abstract_member = property("Shape", "Func<int>", &["Bonsai"]);
        if let MemberDeclaration::Property(p) = &mut abstract_member {
            p.modifiers.push(Modifier::Abstract);
        }
        let compilation = Compilation::new(
            vec![tree(&[], vec![type_decl("Base", vec![abstract_member])])],
            ModelOptions::default(),
        );
        assert!(!resolve(&compilation, "Shape").has_accessor_syntax);
    }
}
