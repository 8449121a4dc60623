//! Node model of the declaration tree.

use serde::Serialize;
use std::fmt;

use crate::runtime::{BoundKind, MixinKind, ParamKind, SigModifiers, Variance, Visibility};

/// Type used when no signature metadata exists.
pub const UNTYPED: &str = "any";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Class,
    Module,
    /// Synthetic scope holding a namespace's own (singleton) methods.
    SingletonClass,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub kind: ScopeKind,
    pub name: String,
    pub superclass: Option<String>,
    pub comments: Vec<String>,
    pub type_params: Vec<String>,
    /// Marks a scope that declares type parameters.
    pub generic: bool,
    pub helpers: Vec<String>,
    pub required_ancestors: Vec<String>,
}

impl Scope {
    pub fn new(kind: ScopeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            superclass: None,
            comments: Vec::new(),
            type_params: Vec::new(),
            generic: false,
            helpers: Vec::new(),
            required_ancestors: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>, superclass: Option<String>) -> Self {
        Self {
            superclass,
            ..Self::new(ScopeKind::Class, name)
        }
    }

    pub fn module(name: impl Into<String>) -> Self {
        Self::new(ScopeKind::Module, name)
    }

    /// Same declaration header: kind and superclass.
    pub fn header_eq(&self, other: &Scope) -> bool {
        self.kind == other.kind && self.superclass == other.superclass
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    #[serde(rename = "type")]
    pub ty: String,
}

impl Param {
    pub fn new(kind: ParamKind, name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            ty: ty.into(),
        }
    }

    pub fn untyped(kind: ParamKind, name: impl Into<String>) -> Self {
        Self::new(kind, name, UNTYPED)
    }
}

/// Signature metadata attached by the signatures listener.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SigMeta {
    /// True when the types come from a real signature rather than the untyped fallback.
    pub typed: bool,
    pub modifiers: SigModifiers,
    pub type_parameters: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Method {
    pub name: String,
    pub singleton: bool,
    pub visibility: Visibility,
    pub params: Vec<Param>,
    /// `None` is void.
    pub return_type: Option<String>,
    pub sig: SigMeta,
    pub comments: Vec<String>,
}

impl Method {
    pub fn new(name: impl Into<String>, singleton: bool) -> Self {
        Self {
            name: name.into(),
            singleton,
            visibility: Visibility::Public,
            params: Vec::new(),
            return_type: Some(UNTYPED.to_string()),
            sig: SigMeta::default(),
            comments: Vec::new(),
        }
    }

    /// Name as it appears in paths: `m` or `self.m`.
    pub fn path_segment(&self) -> String {
        if self.singleton {
            format!("self.{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// What a constant points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum ConstValue {
    /// Another name for a namespace.
    Alias(String),
    /// An instance of a named class.
    Instance(String),
    /// An instance of a class that has no name.
    AnonymousInstance,
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Alias(target) => write!(f, "::{target}"),
            ConstValue::Instance(class) => write!(f, "instance of ::{class}"),
            ConstValue::AnonymousInstance => f.write_str("instance of anonymous class"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Const {
    pub name: String,
    pub value: ConstValue,
    pub comments: Vec<String>,
}

impl Const {
    pub fn new(name: impl Into<String>, value: ConstValue) -> Self {
        Self {
            name: name.into(),
            value,
            comments: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Mixin {
    pub kind: MixinKind,
    pub target: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeVariable {
    pub name: String,
    pub variance: Variance,
    pub bounds: Vec<(BoundKind, String)>,
    pub singleton: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnumBlock {
    pub values: Vec<String>,
}

/// Tagged union of every node the tree can hold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    /// Synthetic top of the arena.
    Root,
    Scope(Scope),
    Method(Method),
    Const(Const),
    Mixin(Mixin),
    TypeVariable(TypeVariable),
    EnumBlock(EnumBlock),
}

impl Node {
    /// Structural key used to deduplicate siblings: kind plus name plus defining shape.
    /// Scopes and constants share the `decl:` namespace, so one name cannot be both.
    pub fn key(&self) -> String {
        match self {
            Node::Root => "root".to_string(),
            Node::Scope(s) => match s.kind {
                ScopeKind::SingletonClass => "singleton".to_string(),
                _ => format!("decl:{}", s.name),
            },
            Node::Method(m) => format!("method:{}", m.path_segment()),
            Node::Const(c) => format!("decl:{}", c.name),
            Node::Mixin(m) => format!("mixin:{}:{}", m.kind.as_str(), m.target),
            Node::TypeVariable(t) => format!("tvar:{}", t.name),
            Node::EnumBlock(_) => "enums".to_string(),
        }
    }

    /// Name used in paths and for sorting.
    pub fn name(&self) -> String {
        match self {
            Node::Root => String::new(),
            Node::Scope(s) => match s.kind {
                ScopeKind::SingletonClass => "self".to_string(),
                _ => s.name.clone(),
            },
            Node::Method(m) => m.path_segment(),
            Node::Const(c) => c.name.clone(),
            Node::Mixin(m) => m.target.clone(),
            Node::TypeVariable(t) => t.name.clone(),
            Node::EnumBlock(_) => "enums".to_string(),
        }
    }

    /// Rank of the node's group when siblings are sorted.
    pub fn group_rank(&self) -> u8 {
        match self {
            Node::Root => 0,
            Node::Mixin(m) => match m.kind {
                MixinKind::Include | MixinKind::Prepend | MixinKind::Extend => 1,
                MixinKind::MixesInClassMethods => 2,
            },
            Node::TypeVariable(_) => 3,
            Node::EnumBlock(_) => 4,
            Node::Const(_) => 5,
            Node::Scope(s) if s.kind == ScopeKind::SingletonClass => 6,
            Node::Method(_) => 7,
            Node::Scope(_) => 8,
        }
    }

    pub fn visibility_rank(&self) -> u8 {
        match self {
            Node::Method(m) => m.visibility as u8,
            _ => 0,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Root => "root",
            Node::Scope(_) => "scope",
            Node::Method(_) => "method",
            Node::Const(_) => "const",
            Node::Mixin(_) => "mixin",
            Node::TypeVariable(_) => "type_variable",
            Node::EnumBlock(_) => "enum_block",
        }
    }

    pub fn is_scope(&self) -> bool {
        matches!(self, Node::Scope(_))
    }

    pub fn as_scope(&self) -> Option<&Scope> {
        match self {
            Node::Scope(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scope_mut(&mut self) -> Option<&mut Scope> {
        match self {
            Node::Scope(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Node::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_method_mut(&mut self) -> Option<&mut Method> {
        match self {
            Node::Method(m) => Some(m),
            _ => None,
        }
    }

    /// Comment lines for nodes that carry documentation.
    pub fn comments_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Node::Scope(s) => Some(&mut s.comments),
            Node::Method(m) => Some(&mut m.comments),
            Node::Const(c) => Some(&mut c.comments),
            _ => None,
        }
    }
}
