//! Program image: a serializable snapshot of a loaded program's object model.
//!
//! Captured by an instrumentation pass in the host process and consumed here through
//! the [`Runtime`] trait. [`ImageBuilder`] builds images in code (tests, embedding).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::IntrospectError;
use crate::runtime::{
    MemberKey, MethodInfo, MixinInfo, MixinKind, ObjectId, ObjectKind, ObservationLog,
    RuntimeParam, Runtime, Signature, SourceLocation, TypeVariableInfo, Visibility,
};
use crate::types::Name;

/// Name given to the root namespace by [`ImageBuilder`].
pub const ROOT_NAMESPACE_NAME: &str = "Object";

/// One live entity in the image. Handles are indices into [`ProgramImage::objects`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub kind: ObjectKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub superclass: Option<ObjectId>,
    /// Class of a leaf value.
    #[serde(default)]
    pub class: Option<ObjectId>,
    #[serde(default)]
    pub constants: BTreeMap<String, ObjectId>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub singleton_methods: Vec<MethodInfo>,
    #[serde(default)]
    pub mixins: Vec<MixinInfo>,
    #[serde(default)]
    pub type_variables: Vec<TypeVariableInfo>,
    #[serde(default)]
    pub helpers: Vec<String>,
    #[serde(default)]
    pub enum_values: Option<Vec<String>>,
    #[serde(default)]
    pub required_ancestors: Vec<String>,
    /// When set, member queries on this entity fail with this reason.
    #[serde(default)]
    pub broken: Option<String>,
}

impl ObjectRecord {
    fn new(kind: ObjectKind, name: Option<String>) -> Self {
        Self {
            kind,
            name,
            superclass: None,
            class: None,
            constants: BTreeMap::new(),
            methods: Vec::new(),
            singleton_methods: Vec::new(),
            mixins: Vec::new(),
            type_variables: Vec::new(),
            helpers: Vec::new(),
            enum_values: None,
            required_ancestors: Vec::new(),
            broken: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgramImage {
    pub root: ObjectId,
    pub objects: Vec<ObjectRecord>,
    #[serde(default)]
    pub observations: ObservationLog,
}

impl ProgramImage {
    pub fn from_json(s: &str) -> Result<Self> {
        let image: ProgramImage = serde_json::from_str(s).context("parse program image JSON")?;
        image.validate()?;
        Ok(image)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read program image {}", path.display()))?;
        Self::from_json(&s).with_context(|| format!("load program image {}", path.display()))
    }

    pub fn observations(&self) -> &ObservationLog {
        &self.observations
    }

    /// Every handle stored in the image must point at an object.
    fn validate(&self) -> Result<()> {
        let len = self.objects.len();
        let in_range = |id: ObjectId| (id.0 as usize) < len;
        anyhow::ensure!(in_range(self.root), "root handle #{} out of range", self.root);
        for (idx, rec) in self.objects.iter().enumerate() {
            let refs = rec
                .superclass
                .iter()
                .chain(rec.class.iter())
                .chain(rec.constants.values())
                .copied()
                .chain(rec.mixins.iter().map(|m| m.target))
                .chain(rec.methods.iter().map(|m| m.owner))
                .chain(rec.singleton_methods.iter().map(|m| m.owner));
            for id in refs {
                anyhow::ensure!(in_range(id), "object #{idx} references missing handle #{id}");
            }
        }
        Ok(())
    }

    fn record(&self, id: ObjectId) -> Result<&ObjectRecord, IntrospectError> {
        self.objects
            .get(id.0 as usize)
            .ok_or(IntrospectError::UnknownHandle(id))
    }

    /// Record that is safe to inspect for members; fails for `broken` entities.
    fn inspectable(&self, id: ObjectId) -> Result<&ObjectRecord, IntrospectError> {
        let rec = self.record(id)?;
        match &rec.broken {
            Some(reason) => Err(IntrospectError::inspect(self.describe(id), reason.clone())),
            None => Ok(rec),
        }
    }

    fn describe(&self, id: ObjectId) -> String {
        self.name_of(id)
            .map(|n| n.relative().to_string())
            .unwrap_or_else(|| format!("#<anonymous {id}>"))
    }
}

impl Runtime for ProgramImage {
    fn root_namespace(&self) -> ObjectId {
        self.root
    }

    fn resolve(&self, name: &Name) -> Option<ObjectId> {
        let mut current = self.root;
        for segment in name.segments() {
            current = *self.record(current).ok()?.constants.get(segment)?;
        }
        Some(current)
    }

    fn kind_of(&self, id: ObjectId) -> Result<ObjectKind, IntrospectError> {
        Ok(self.record(id)?.kind)
    }

    fn name_of(&self, id: ObjectId) -> Option<Name> {
        self.record(id).ok()?.name.as_deref().map(Name::new)
    }

    fn class_of(&self, id: ObjectId) -> Result<ObjectId, IntrospectError> {
        let rec = self.record(id)?;
        rec.class
            .ok_or_else(|| IntrospectError::inspect(self.describe(id), "no class recorded"))
    }

    fn superclass_of(&self, id: ObjectId) -> Result<Option<ObjectId>, IntrospectError> {
        Ok(self.record(id)?.superclass)
    }

    fn constants_of(&self, id: ObjectId) -> Result<Vec<String>, IntrospectError> {
        Ok(self.inspectable(id)?.constants.keys().cloned().collect())
    }

    fn const_get(&self, id: ObjectId, name: &str) -> Result<Option<ObjectId>, IntrospectError> {
        Ok(self.inspectable(id)?.constants.get(name).copied())
    }

    fn methods_of(
        &self,
        id: ObjectId,
        singleton: bool,
    ) -> Result<Vec<MethodInfo>, IntrospectError> {
        let mut out: Vec<MethodInfo> = Vec::new();
        let mut current = Some(id);
        let mut hops = 0;
        // Own methods first, then inherited ones not shadowed lower in the chain.
        while let Some(cur) = current {
            let rec = self.inspectable(cur)?;
            let list = if singleton {
                &rec.singleton_methods
            } else {
                &rec.methods
            };
            for m in list {
                if !out.iter().any(|seen| seen.name == m.name) {
                    out.push(MethodInfo {
                        singleton,
                        ..m.clone()
                    });
                }
            }
            current = rec.superclass;
            hops += 1;
            if hops > self.objects.len() {
                return Err(IntrospectError::inspect(
                    self.describe(id),
                    "superclass chain does not terminate",
                ));
            }
        }
        Ok(out)
    }

    fn mixins_of(&self, id: ObjectId) -> Result<Vec<MixinInfo>, IntrospectError> {
        Ok(self.inspectable(id)?.mixins.clone())
    }

    fn type_variables_of(&self, id: ObjectId) -> Result<Vec<TypeVariableInfo>, IntrospectError> {
        Ok(self.inspectable(id)?.type_variables.clone())
    }

    fn helpers_of(&self, id: ObjectId) -> Result<Vec<String>, IntrospectError> {
        Ok(self.inspectable(id)?.helpers.clone())
    }

    fn enum_values_of(&self, id: ObjectId) -> Result<Option<Vec<String>>, IntrospectError> {
        Ok(self.inspectable(id)?.enum_values.clone())
    }

    fn required_ancestors_of(&self, id: ObjectId) -> Result<Vec<String>, IntrospectError> {
        Ok(self.inspectable(id)?.required_ancestors.clone())
    }
}

/// Fluent construction of a [`ProgramImage`]. Paths are qualified names; missing parent
/// namespaces are created as modules.
pub struct ImageBuilder {
    objects: Vec<ObjectRecord>,
    observations: ObservationLog,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    pub fn new() -> Self {
        let root = ObjectRecord::new(
            ObjectKind::Class,
            Some(ROOT_NAMESPACE_NAME.to_string()),
        );
        let mut builder = Self {
            objects: vec![root],
            observations: ObservationLog::new(),
        };
        // The root namespace names itself: `Object::Object` is `Object`.
        builder.objects[0]
            .constants
            .insert(ROOT_NAMESPACE_NAME.to_string(), ObjectId(0));
        builder
    }

    pub fn root(&self) -> ObjectId {
        ObjectId(0)
    }

    fn push(&mut self, rec: ObjectRecord) -> ObjectId {
        self.objects.push(rec);
        ObjectId((self.objects.len() - 1) as u32)
    }

    fn rec_mut(&mut self, id: ObjectId) -> &mut ObjectRecord {
        &mut self.objects[id.0 as usize]
    }

    /// Namespace that will hold `path`'s last segment, creating modules on the way.
    fn parent_of(&mut self, path: &Name) -> ObjectId {
        let mut current = self.root();
        let segments: Vec<String> = path.segments().map(str::to_string).collect();
        let mut walked = Name::root();
        for seg in &segments[..segments.len().saturating_sub(1)] {
            walked = walked.child(seg);
            current = match self.objects[current.0 as usize].constants.get(seg) {
                Some(id) => *id,
                None => {
                    let rec = ObjectRecord::new(
                        ObjectKind::Module,
                        Some(walked.relative().to_string()),
                    );
                    let id = self.push(rec);
                    self.rec_mut(current).constants.insert(seg.clone(), id);
                    id
                }
            };
        }
        current
    }

    /// Bind `path` to `id` as a constant.
    pub fn constant(&mut self, path: &str, id: ObjectId) -> &mut Self {
        let name = Name::new(path);
        let parent = self.parent_of(&name);
        let seg = name.last_segment().to_string();
        self.rec_mut(parent).constants.insert(seg, id);
        self
    }

    fn named(&mut self, path: &str, kind: ObjectKind) -> ObjectId {
        let name = Name::new(path);
        let mut rec = ObjectRecord::new(kind, Some(name.relative().to_string()));
        if kind == ObjectKind::Class {
            rec.superclass = Some(self.root());
        }
        let id = self.push(rec);
        self.constant(path, id);
        id
    }

    pub fn class(&mut self, path: &str) -> ObjectId {
        self.named(path, ObjectKind::Class)
    }

    pub fn module(&mut self, path: &str) -> ObjectId {
        self.named(path, ObjectKind::Module)
    }

    pub fn anonymous_class(&mut self) -> ObjectId {
        let mut rec = ObjectRecord::new(ObjectKind::Class, None);
        rec.superclass = Some(self.root());
        self.push(rec)
    }

    /// Leaf value of class `class` bound at `path`.
    pub fn value(&mut self, path: &str, class: ObjectId) -> ObjectId {
        let mut rec = ObjectRecord::new(ObjectKind::Value, None);
        rec.class = Some(class);
        let id = self.push(rec);
        self.constant(path, id);
        id
    }

    pub fn superclass(&mut self, id: ObjectId, parent: ObjectId) -> &mut Self {
        self.rec_mut(id).superclass = Some(parent);
        self
    }

    pub fn method(&mut self, owner: ObjectId, name: &str, params: Vec<RuntimeParam>) -> &mut Self {
        self.method_full(owner, name, params, None, Visibility::Public, false)
    }

    pub fn singleton_method(
        &mut self,
        owner: ObjectId,
        name: &str,
        params: Vec<RuntimeParam>,
    ) -> &mut Self {
        self.method_full(owner, name, params, None, Visibility::Public, true)
    }

    pub fn method_full(
        &mut self,
        owner: ObjectId,
        name: &str,
        parameters: Vec<RuntimeParam>,
        signature: Option<Signature>,
        visibility: Visibility,
        singleton: bool,
    ) -> &mut Self {
        let info = MethodInfo {
            name: name.to_string(),
            owner,
            singleton,
            visibility,
            parameters,
            signature,
        };
        let rec = self.rec_mut(owner);
        let list = if singleton {
            &mut rec.singleton_methods
        } else {
            &mut rec.methods
        };
        list.retain(|m| m.name != info.name);
        list.push(info);
        self
    }

    pub fn mixin(&mut self, owner: ObjectId, kind: MixinKind, target: ObjectId) -> &mut Self {
        self.rec_mut(owner).mixins.push(MixinInfo { kind, target });
        self
    }

    pub fn type_variable(&mut self, owner: ObjectId, var: TypeVariableInfo) -> &mut Self {
        self.rec_mut(owner).type_variables.push(var);
        self
    }

    pub fn helper(&mut self, owner: ObjectId, helper: &str) -> &mut Self {
        self.rec_mut(owner).helpers.push(helper.to_string());
        self
    }

    pub fn enum_values(&mut self, owner: ObjectId, values: &[&str]) -> &mut Self {
        self.rec_mut(owner).enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn requires_ancestor(&mut self, owner: ObjectId, ancestor: &str) -> &mut Self {
        self.rec_mut(owner)
            .required_ancestors
            .push(ancestor.to_string());
        self
    }

    /// Make member queries on `id` fail, as an entity that raises under inspection would.
    pub fn broken(&mut self, id: ObjectId, reason: &str) -> &mut Self {
        self.rec_mut(id).broken = Some(reason.to_string());
        self
    }

    pub fn defined_at(&mut self, path: &str, file: &str, line: u32) -> &mut Self {
        self.observations
            .record_constant(&Name::new(path), SourceLocation::new(file, line));
        self
    }

    pub fn method_defined_at(
        &mut self,
        owner: &str,
        singleton: bool,
        method: &str,
        file: &str,
        line: u32,
    ) -> &mut Self {
        let owner = Name::new(owner);
        self.observations.record_method(
            MemberKey {
                owner: &owner,
                singleton,
                method,
            },
            SourceLocation::new(file, line),
        );
        self
    }

    pub fn mixin_declared_at(
        &mut self,
        owner: &str,
        kind: MixinKind,
        target: &str,
        file: &str,
        line: u32,
    ) -> &mut Self {
        self.observations.record_mixin(
            &Name::new(owner),
            kind,
            &Name::new(target),
            SourceLocation::new(file, line),
        );
        self
    }

    pub fn documented(&mut self, path: &str, lines: &[&str]) -> &mut Self {
        self.observations
            .record_documentation(path, lines.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn build(self) -> ProgramImage {
        ProgramImage {
            root: ObjectId(0),
            objects: self.objects,
            observations: self.observations,
        }
    }
}
