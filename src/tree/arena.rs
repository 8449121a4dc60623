//! Arena of declaration nodes indexed by [`NodeId`].
//!
//! Children are ordered lists of ids. A side index from `(parent, structural key)` to id
//! makes inserting a structurally identical sibling a no-op instead of a duplicate.

use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::fmt;

use super::node::Node;

/// Stable index into a [`DeclTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Clone, Debug)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Detached slots stay in the arena so ids remain stable.
    detached: bool,
}

#[derive(Clone, Debug)]
pub struct DeclTree {
    slots: Vec<Slot>,
    index: HashMap<(NodeId, String), NodeId>,
}

impl Default for DeclTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclTree {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                node: Node::Root,
                parent: None,
                children: Vec::new(),
                detached: false,
            }],
            index: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append `node` under `parent`. If a sibling with the same structural key exists,
    /// nothing is inserted and the existing id is returned.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let key = node.key();
        if let Some(&existing) = self.index.get(&(parent, key.clone())) {
            if self.slots[existing.0 as usize].node != node {
                log::debug!(
                    "keeping first {} `{}` under {}; later shape differs",
                    node.kind_name(),
                    node.name(),
                    parent
                );
            }
            return existing;
        }
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Slot {
            node,
            parent: Some(parent),
            children: Vec::new(),
            detached: false,
        });
        self.slots[parent.0 as usize].children.push(id);
        self.index.insert((parent, key), id);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.slots[id.0 as usize].node
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.slots[id.0 as usize].node
    }

    /// Replace a node's content while keeping its position and children. The structural key
    /// must not change.
    pub(crate) fn replace(&mut self, id: NodeId, node: Node) {
        debug_assert_eq!(self.get(id).key(), node.key());
        self.slots[id.0 as usize].node = node;
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0 as usize].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0 as usize].children
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        !self.slots[id.0 as usize].detached
    }

    pub fn find_child(&self, parent: NodeId, key: &str) -> Option<NodeId> {
        self.index.get(&(parent, key.to_string())).copied()
    }

    /// Top-level scope by full name (`Foo::Bar`).
    pub fn find_scope(&self, name: &str) -> Option<NodeId> {
        self.find_child(self.root(), &format!("decl:{name}"))
            .filter(|&id| self.get(id).is_scope())
    }

    /// Resolve a member path as produced by [`DeclTree::path_of`].
    pub fn find_path(&self, path: &str) -> Option<NodeId> {
        self.walk(self.root(), String::new())
            .into_iter()
            .find(|(_, p)| p == path)
            .map(|(id, _)| id)
    }

    /// Path of a node: top-level scopes use their full name, members append `::name`.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == self.root() {
                break;
            }
            parts.push(self.get(c).name());
            cur = self.parent(c);
        }
        parts.reverse();
        parts.join("::")
    }

    fn walk(&self, id: NodeId, prefix: String) -> Vec<(NodeId, String)> {
        let mut out = Vec::new();
        for &child in self.children(id) {
            let name = self.get(child).name();
            let path = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}::{name}")
            };
            out.push((child, path.clone()));
            out.extend(self.walk(child, path));
        }
        out
    }

    /// Every attached node's path, in tree order.
    pub fn paths(&self) -> Vec<String> {
        self.walk(self.root(), String::new())
            .into_iter()
            .map(|(_, p)| p)
            .collect()
    }

    /// Number of attached nodes, excluding the root.
    pub fn len(&self) -> usize {
        self.walk(self.root(), String::new()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root()).is_empty()
    }

    pub fn is_empty_scope(&self, id: NodeId) -> bool {
        self.get(id).is_scope() && self.children(id).is_empty()
    }

    /// Detach an empty scope. Returns false (and leaves the tree untouched) for anything
    /// that is not a childless scope.
    pub fn remove_empty_scope(&mut self, id: NodeId) -> bool {
        if id == self.root() || !self.is_empty_scope(id) || !self.is_attached(id) {
            return false;
        }
        let key = self.get(id).key();
        if let Some(parent) = self.parent(id) {
            self.slots[parent.0 as usize].children.retain(|&c| c != id);
            self.index.remove(&(parent, key));
        }
        let slot = &mut self.slots[id.0 as usize];
        slot.detached = true;
        slot.parent = None;
        true
    }

    /// Move `id` under `new_parent`, re-keying it. Used by normalization only.
    pub(crate) fn reparent(&mut self, id: NodeId, new_parent: NodeId) {
        let key = self.get(id).key();
        if let Some(old) = self.parent(id) {
            self.slots[old.0 as usize].children.retain(|&c| c != id);
            self.index.remove(&(old, key.clone()));
        }
        self.slots[id.0 as usize].parent = Some(new_parent);
        self.slots[new_parent.0 as usize].children.push(id);
        self.index.insert((new_parent, key), id);
    }

    /// Re-index a node whose key changed after an in-place edit.
    pub(crate) fn rekey(&mut self, id: NodeId, old_key: &str) {
        if let Some(parent) = self.parent(id) {
            self.index.remove(&(parent, old_key.to_string()));
            self.index.insert((parent, self.get(id).key()), id);
        }
    }

    /// Detach every child of `id` (and drop them from the key index).
    pub(crate) fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.slots[id.0 as usize].children);
        for child in children {
            let key = self.get(child).key();
            self.index.remove(&(id, key));
            let slot = &mut self.slots[child.0 as usize];
            slot.detached = true;
            slot.parent = None;
        }
    }

    pub(crate) fn children_mut(&mut self, id: NodeId) -> &mut Vec<NodeId> {
        &mut self.slots[id.0 as usize].children
    }

    /// Deep structural equality between `a` in `self` and `b` in `other`.
    pub fn subtree_eq(&self, a: NodeId, other: &DeclTree, b: NodeId) -> bool {
        if self.get(a) != other.get(b) {
            return false;
        }
        let (ca, cb) = (self.children(a), other.children(b));
        ca.len() == cb.len()
            && ca
                .iter()
                .zip(cb)
                .all(|(&x, &y)| self.subtree_eq(x, other, y))
    }

    /// Copy `src_id` (and its subtree) from `src` under `parent`. Returns the new id.
    pub fn copy_subtree(&mut self, parent: NodeId, src: &DeclTree, src_id: NodeId) -> NodeId {
        let id = self.add_child(parent, src.get(src_id).clone());
        for &child in src.children(src_id) {
            self.copy_subtree(id, src, child);
        }
        id
    }

    /// Deterministic nested JSON rendering of the whole tree.
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.children(self.root())
                .iter()
                .map(|&c| self.node_json(c))
                .collect(),
        )
    }

    fn node_json(&self, id: NodeId) -> Value {
        let mut obj = match serde_json::to_value(self.get(id)) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let children: Vec<Value> = self
            .children(id)
            .iter()
            .map(|&c| self.node_json(c))
            .collect();
        if !children.is_empty() {
            obj.insert("children".to_string(), json!(children));
        }
        Value::Object(obj)
    }

    /// Pretty JSON string of [`DeclTree::to_json`].
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_default()
    }
}
