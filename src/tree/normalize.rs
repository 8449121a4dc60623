//! Canonical layout applied after building and merging.
//!
//! Singleton methods move under a synthetic `SingletonClass` scope, then siblings are
//! sorted by group, visibility and name so unchanged input always renders identically.

use super::arena::{DeclTree, NodeId};
use super::node::{Node, Scope, ScopeKind};

pub fn normalize(tree: &mut DeclTree) {
    let root = tree.root();
    nest_singleton_methods(tree, root);
    sort_siblings(tree, root);
}

fn nest_singleton_methods(tree: &mut DeclTree, id: NodeId) {
    let scopes: Vec<NodeId> = tree
        .children(id)
        .iter()
        .copied()
        .filter(|&c| matches!(tree.get(c), Node::Scope(s) if s.kind != ScopeKind::SingletonClass))
        .collect();
    for scope in scopes {
        let singletons: Vec<NodeId> = tree
            .children(scope)
            .iter()
            .copied()
            .filter(|&c| matches!(tree.get(c), Node::Method(m) if m.singleton))
            .collect();
        if !singletons.is_empty() {
            let holder = tree.add_child(
                scope,
                Node::Scope(Scope::new(ScopeKind::SingletonClass, "self")),
            );
            for method in singletons {
                let old_key = tree.get(method).key();
                tree.reparent(method, holder);
                if let Some(m) = tree.get_mut(method).as_method_mut() {
                    m.singleton = false;
                }
                tree.rekey(method, &old_key);
            }
        }
        nest_singleton_methods(tree, scope);
    }
}

fn sort_siblings(tree: &mut DeclTree, id: NodeId) {
    let mut keyed: Vec<(u8, u8, String, NodeId)> = tree
        .children(id)
        .iter()
        .map(|&c| {
            let n = tree.get(c);
            (n.group_rank(), n.visibility_rank(), n.name(), c)
        })
        .collect();
    keyed.sort_by(|a, b| (a.0, a.1, &a.2).cmp(&(b.0, b.1, &b.2)));
    let ordered: Vec<NodeId> = keyed.into_iter().map(|(_, _, _, c)| c).collect();
    *tree.children_mut(id) = ordered.clone();
    for child in ordered {
        sort_siblings(tree, child);
    }
}
