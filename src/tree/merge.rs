//! Merging two declaration trees.
//!
//! Both trees are walked in lock-step by structural key. Paths present on one side are
//! copied as-is, identical nodes are kept once, scopes recurse, and differing leaves
//! become [`Conflict`]s resolved by [`Keep`]. Merge never fails.

use serde::Serialize;
use std::fmt;

use super::arena::{DeclTree, NodeId};
use super::node::{Node, Scope};
use crate::types::{Keep, Name};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Scope,
    Method,
    Const,
    Mixin,
    TypeVariable,
    Enum,
}

impl ConflictKind {
    fn of(node: &Node) -> Self {
        match node {
            Node::Root | Node::Scope(_) => ConflictKind::Scope,
            Node::Method(_) => ConflictKind::Method,
            Node::Const(_) => ConflictKind::Const,
            Node::Mixin(_) => ConflictKind::Mixin,
            Node::TypeVariable(_) => ConflictKind::TypeVariable,
            Node::EnumBlock(_) => ConflictKind::Enum,
        }
    }
}

/// Two incompatible declarations for the same path. The losing side is dropped from the
/// merged tree; this record is the only trace of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conflict {
    pub path: Name,
    pub kind: ConflictKind,
    pub left: Node,
    pub right: Node,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} conflict at {}", self.kind, self.path.relative())
    }
}

#[derive(Debug)]
pub struct MergeOutcome {
    pub tree: DeclTree,
    pub conflicts: Vec<Conflict>,
}

/// Merge `left` and `right`; on conflict keep the side named by `keep`.
pub fn merge(left: &DeclTree, right: &DeclTree, keep: Keep) -> MergeOutcome {
    let mut tree = DeclTree::new();
    let root = tree.root();
    for &child in left.children(left.root()) {
        tree.copy_subtree(root, left, child);
    }
    let mut conflicts = Vec::new();
    merge_children(&mut tree, root, right, right.root(), keep, &mut conflicts);
    MergeOutcome { tree, conflicts }
}

/// Fold `trees` left to right, collecting every conflict.
pub fn merge_all(trees: impl IntoIterator<Item = DeclTree>, keep: Keep) -> MergeOutcome {
    let mut acc = MergeOutcome {
        tree: DeclTree::new(),
        conflicts: Vec::new(),
    };
    for tree in trees {
        let MergeOutcome { tree, conflicts } = merge(&acc.tree, &tree, keep);
        acc.tree = tree;
        acc.conflicts.extend(conflicts);
    }
    acc
}

fn merge_children(
    out: &mut DeclTree,
    into: NodeId,
    right: &DeclTree,
    from: NodeId,
    keep: Keep,
    conflicts: &mut Vec<Conflict>,
) {
    for &rc in right.children(from) {
        match out.find_child(into, &right.get(rc).key()) {
            None => {
                out.copy_subtree(into, right, rc);
            }
            Some(lc) => merge_node(out, lc, right, rc, keep, conflicts),
        }
    }
}

fn merge_node(
    out: &mut DeclTree,
    lc: NodeId,
    right: &DeclTree,
    rc: NodeId,
    keep: Keep,
    conflicts: &mut Vec<Conflict>,
) {
    if out.subtree_eq(lc, right, rc) {
        return;
    }
    let left_node = out.get(lc).clone();
    let right_node = right.get(rc);
    match (&left_node, right_node) {
        (Node::Scope(ls), Node::Scope(rs)) => {
            if !ls.header_eq(rs) {
                conflicts.push(Conflict {
                    path: Name::new(&out.path_of(lc)),
                    kind: ConflictKind::Scope,
                    left: left_node.clone(),
                    right: right_node.clone(),
                });
            }
            out.replace(lc, Node::Scope(merge_scope_meta(ls, rs, keep)));
            merge_children(out, lc, right, rc, keep, conflicts);
        }
        (l, r) if l == r => merge_children(out, lc, right, rc, keep, conflicts),
        (l, r) => {
            // A scope against anything else is a scope conflict, whichever side holds it.
            let kind = if r.is_scope() {
                ConflictKind::Scope
            } else {
                ConflictKind::of(l)
            };
            conflicts.push(Conflict {
                path: Name::new(&out.path_of(lc)),
                kind,
                left: l.clone(),
                right: r.clone(),
            });
            if keep == Keep::Right {
                out.replace(lc, r.clone());
                out.clear_children(lc);
                for &child in right.children(rc) {
                    out.copy_subtree(lc, right, child);
                }
            }
        }
    }
}

fn union(into: &mut Vec<String>, from: &[String]) {
    for item in from {
        if !into.contains(item) {
            into.push(item.clone());
        }
    }
}

/// Header from the kept side; list metadata is unioned, left entries first.
fn merge_scope_meta(left: &Scope, right: &Scope, keep: Keep) -> Scope {
    let mut merged = match keep {
        Keep::Left => left.clone(),
        Keep::Right => Scope {
            comments: left.comments.clone(),
            type_params: left.type_params.clone(),
            helpers: left.helpers.clone(),
            required_ancestors: left.required_ancestors.clone(),
            generic: left.generic,
            ..right.clone()
        },
    };
    if merged.comments.is_empty() {
        merged.comments = right.comments.clone();
    }
    union(&mut merged.type_params, &right.type_params);
    union(&mut merged.helpers, &right.helpers);
    union(&mut merged.required_ancestors, &right.required_ancestors);
    merged.generic |= right.generic;
    merged
}
