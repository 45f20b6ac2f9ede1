use crate::syntax::{
    DelegateDeclaration, MemberDeclaration, NamespaceDeclaration, PropertyDeclaration, SyntaxTree,
    TypeDeclaration,
};

/// The SyntaxVisitor trait defines the single traversal mechanism for declaration trees.
///
/// Rules:
/// 1. Traversal order is fixed: trees in order, members pre-order.
/// 2. Implementers override `visit_*` methods to add behavior.
/// 3. Implementers MUST call the matching `walk_*` function to continue traversal
///    unless pruning is intended.
///
/// Nodes are borrowed for `'ast`, so visitors may keep references to them.
pub trait SyntaxVisitor<'ast> {
    fn visit_tree(&mut self, tree: &'ast SyntaxTree) {
        walk_tree(self, tree);
    }

    fn visit_member(&mut self, member: &'ast MemberDeclaration) {
        walk_member(self, member);
    }

    fn visit_namespace(&mut self, namespace: &'ast NamespaceDeclaration) {
        walk_namespace(self, namespace);
    }

    fn visit_type(&mut self, ty: &'ast TypeDeclaration) {
        walk_type(self, ty);
    }

    fn visit_delegate(&mut self, _delegate: &'ast DelegateDeclaration) {
        // Leaf node
    }

    fn visit_property(&mut self, _property: &'ast PropertyDeclaration) {
        // Leaf node
    }

    fn visit_members(&mut self, members: &'ast [MemberDeclaration]) {
        walk_members(self, members);
    }
}

pub fn walk_trees<'ast, V: SyntaxVisitor<'ast> + ?Sized>(visitor: &mut V, trees: &'ast [SyntaxTree]) {
    for tree in trees {
        visitor.visit_tree(tree);
    }
}

pub fn walk_tree<'ast, V: SyntaxVisitor<'ast> + ?Sized>(visitor: &mut V, tree: &'ast SyntaxTree) {
    visitor.visit_members(&tree.members);
}

pub fn walk_members<'ast, V: SyntaxVisitor<'ast> + ?Sized>(
    visitor: &mut V,
    members: &'ast [MemberDeclaration],
) {
    for member in members {
        visitor.visit_member(member);
    }
}

pub fn walk_member<'ast, V: SyntaxVisitor<'ast> + ?Sized>(
    visitor: &mut V,
    member: &'ast MemberDeclaration,
) {
    match member {
        MemberDeclaration::Namespace(ns) => visitor.visit_namespace(ns),
        MemberDeclaration::Type(ty) => visitor.visit_type(ty),
        MemberDeclaration::Delegate(delegate) => visitor.visit_delegate(delegate),
        MemberDeclaration::Property(property) => visitor.visit_property(property),
    }
}

pub fn walk_namespace<'ast, V: SyntaxVisitor<'ast> + ?Sized>(
    visitor: &mut V,
    namespace: &'ast NamespaceDeclaration,
) {
    visitor.visit_members(&namespace.members);
}

pub fn walk_type<'ast, V: SyntaxVisitor<'ast> + ?Sized>(visitor: &mut V, ty: &'ast TypeDeclaration) {
    visitor.visit_members(&ty.members);
}
