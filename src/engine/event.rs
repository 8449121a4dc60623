//! Events dispatched to the listener chain during traversal.

use crate::runtime::{ObjectId, RuntimeParam, Signature};
use crate::tree::NodeId;
use crate::types::Name;

/// Closed set of traversal events. Every `*NodeAdded` node is attached before dispatch.
///
/// A scope's methods, mixins and type variables are attached before its `ScopeNodeAdded`
/// fires, and each of its `MethodNodeAdded` events is dispatched first. Scope-level
/// listener work on the owner has not run yet when a method event arrives.
#[derive(Clone, Debug)]
pub enum Event {
    SymbolFound {
        name: Name,
    },
    ConstantFound {
        name: Name,
        value: ObjectId,
    },
    ScopeNodeAdded {
        name: Name,
        value: ObjectId,
        node: NodeId,
    },
    ConstNodeAdded {
        name: Name,
        value: ObjectId,
        node: NodeId,
    },
    /// `name` is the owning scope; the method name lives on the node.
    MethodNodeAdded {
        name: Name,
        value: ObjectId,
        node: NodeId,
        signature: Option<Signature>,
        parameters: Vec<RuntimeParam>,
    },
}

impl Event {
    pub fn name(&self) -> &Name {
        match self {
            Event::SymbolFound { name }
            | Event::ConstantFound { name, .. }
            | Event::ScopeNodeAdded { name, .. }
            | Event::ConstNodeAdded { name, .. }
            | Event::MethodNodeAdded { name, .. } => name,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Event::SymbolFound { .. } => "symbol_found",
            Event::ConstantFound { .. } => "constant_found",
            Event::ScopeNodeAdded { .. } => "scope_node_added",
            Event::ConstNodeAdded { .. } => "const_node_added",
            Event::MethodNodeAdded { .. } => "method_node_added",
        }
    }

    /// Tree node carried by `*NodeAdded` events.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Event::ScopeNodeAdded { node, .. }
            | Event::ConstNodeAdded { node, .. }
            | Event::MethodNodeAdded { node, .. } => Some(*node),
            Event::SymbolFound { .. } | Event::ConstantFound { .. } => None,
        }
    }
}
