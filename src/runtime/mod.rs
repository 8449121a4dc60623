//! Reflection surface of the live program being documented.
//!
//! The traversal engine never touches a host process directly; it asks a [`Runtime`]
//! for the shape of each entity. [`ProgramImage`] is the bundled implementation,
//! loaded from a snapshot captured at program-load time.

pub mod image;
pub mod observations;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::IntrospectError;
use crate::types::Name;

pub use image::{ImageBuilder, ObjectRecord, ProgramImage};
pub use observations::{MemberKey, ObservationLog, SourceLocation};

/// Opaque handle to a live entity (namespace or arbitrary value).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Namespace-like (`Class`, `Module`) or leaf value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Class,
    Module,
    Value,
}

impl ObjectKind {
    pub fn is_namespace(self) -> bool {
        matches!(self, ObjectKind::Class | ObjectKind::Module)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Required,
    Optional,
    Rest,
    KeywordRequired,
    KeywordOptional,
    KeywordRest,
    Block,
}

/// Parameter as the runtime reports it: kind and name, no type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeParam {
    pub kind: ParamKind,
    pub name: String,
}

impl RuntimeParam {
    pub fn new(kind: ParamKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SigModifiers {
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "override")]
    pub is_override: bool,
    #[serde(default)]
    pub overridable: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

/// Compiled type signature attached to a method.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Parameter name to type expression, in declaration order.
    #[serde(default)]
    pub params: Vec<(String, String)>,
    /// `None` means the method returns nothing useful (void).
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub modifiers: SigModifiers,
    #[serde(default)]
    pub type_parameters: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    /// Namespace that defines the method directly.
    pub owner: ObjectId,
    /// Defined on the namespace itself rather than on its instances.
    #[serde(default)]
    pub singleton: bool,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub parameters: Vec<RuntimeParam>,
    #[serde(default)]
    pub signature: Option<Signature>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixinKind {
    Include,
    Prepend,
    Extend,
    MixesInClassMethods,
}

impl MixinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MixinKind::Include => "include",
            MixinKind::Prepend => "prepend",
            MixinKind::Extend => "extend",
            MixinKind::MixesInClassMethods => "mixes_in_class_methods",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixinInfo {
    pub kind: MixinKind,
    pub target: ObjectId,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variance {
    #[default]
    Invariant,
    Covariant,
    Contravariant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    Fixed,
    Lower,
    Upper,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeVariableInfo {
    pub name: String,
    #[serde(default)]
    pub variance: Variance,
    #[serde(default)]
    pub bounds: Vec<(BoundKind, String)>,
    /// Declared on the namespace's singleton rather than its instances.
    #[serde(default)]
    pub singleton: bool,
}

/// Reflection queries over a loaded program.
///
/// Implementations must be shareable across worker threads: every method takes `&self`
/// and must not rely on hidden mutable caches.
pub trait Runtime: Sync {
    /// Handle of the root namespace (the implicit outermost scope).
    fn root_namespace(&self) -> ObjectId;

    fn resolve(&self, name: &Name) -> Option<ObjectId>;

    fn kind_of(&self, id: ObjectId) -> Result<ObjectKind, IntrospectError>;

    /// Qualified name, or `None` for anonymous entities.
    fn name_of(&self, id: ObjectId) -> Option<Name>;

    fn class_of(&self, id: ObjectId) -> Result<ObjectId, IntrospectError>;

    fn superclass_of(&self, id: ObjectId) -> Result<Option<ObjectId>, IntrospectError>;

    /// Simple names of constants declared directly inside a namespace.
    fn constants_of(&self, id: ObjectId) -> Result<Vec<String>, IntrospectError>;

    fn const_get(&self, id: ObjectId, name: &str) -> Result<Option<ObjectId>, IntrospectError>;

    /// Instance methods (`singleton == false`) or singleton methods visible on `id`,
    /// including inherited ones; callers filter on [`MethodInfo::owner`].
    fn methods_of(&self, id: ObjectId, singleton: bool)
    -> Result<Vec<MethodInfo>, IntrospectError>;

    fn mixins_of(&self, id: ObjectId) -> Result<Vec<MixinInfo>, IntrospectError>;

    fn type_variables_of(&self, id: ObjectId) -> Result<Vec<TypeVariableInfo>, IntrospectError>;

    /// Declaration-level markers such as `abstract`, `interface`, `sealed`, `final`.
    fn helpers_of(&self, _id: ObjectId) -> Result<Vec<String>, IntrospectError> {
        Ok(Vec::new())
    }

    /// Values of an enum-like namespace; `None` when it is not enum-like.
    fn enum_values_of(&self, _id: ObjectId) -> Result<Option<Vec<String>>, IntrospectError> {
        Ok(None)
    }

    /// Ancestors the namespace requires of anything it is mixed into.
    fn required_ancestors_of(&self, _id: ObjectId) -> Result<Vec<String>, IntrospectError> {
        Ok(Vec::new())
    }
}
