//! Declaration tree: node model, arena storage, merging and normalization.

pub mod arena;
pub mod merge;
pub mod node;
pub mod normalize;

pub use arena::{DeclTree, NodeId};
pub use merge::{Conflict, ConflictKind, MergeOutcome, merge, merge_all};
pub use node::{
    Const, ConstValue, EnumBlock, Method, Mixin, Node, Param, Scope, ScopeKind, SigMeta,
    TypeVariable, UNTYPED,
};
pub use normalize::normalize;
