//! Traversal engine: drains the worklist breadth-first and grows one declaration tree.
//!
//! Structural members (methods, mixins, type variables) are attached before a scope's
//! `ScopeNodeAdded` is dispatched, so listeners always see a populated node. Introspection
//! failures are per-item warnings; listener failures abort the traversal.

use std::collections::HashMap;

use log::{debug, trace};

use crate::engine::event::Event;
use crate::engine::listener::{EventContext, ListenerChain, SetupContext};
use crate::engine::policy::FilteringPolicy;
use crate::engine::tools::is_valid_method_name;
use crate::engine::worklist::{WorkItem, Worklist};
use crate::error::{BuildError, IntrospectError};
use crate::pipeline::WarningSink;
use crate::runtime::{
    MethodInfo, MixinInfo, ObjectId, ObjectKind, ObservationLog, ParamKind, Runtime,
    RuntimeParam, TypeVariableInfo,
};
use crate::tree::{
    Const, ConstValue, DeclTree, Method, Mixin, Node, NodeId, Param, Scope, TypeVariable, UNTYPED,
};
use crate::types::{Name, Warning};

/// Result of one traversal.
#[derive(Debug)]
pub struct BuildOutput {
    pub tree: DeclTree,
    /// Warnings not forwarded to a [`WarningSink`].
    pub warnings: Vec<Warning>,
    /// Names popped from the worklist.
    pub expanded: usize,
}

pub struct TreeBuilder<'a> {
    runtime: &'a dyn Runtime,
    observations: &'a ObservationLog,
    policy: &'a dyn FilteringPolicy,
    listeners: ListenerChain,
    worklist: Worklist,
    tree: DeclTree,
    warnings: Vec<Warning>,
    sink: Option<WarningSink>,
    root: Option<Name>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(
        runtime: &'a dyn Runtime,
        observations: &'a ObservationLog,
        policy: &'a dyn FilteringPolicy,
        listeners: ListenerChain,
    ) -> Self {
        Self {
            runtime,
            observations,
            policy,
            listeners,
            worklist: Worklist::new(),
            tree: DeclTree::new(),
            warnings: Vec::new(),
            sink: None,
            root: None,
        }
    }

    /// Forward warnings to `sink` as they happen instead of collecting them.
    pub fn with_warning_sink(mut self, sink: WarningSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn push(&mut self, name: Name) -> bool {
        self.worklist.push(name)
    }

    pub fn push_constant(&mut self, name: Name, value: ObjectId) -> bool {
        self.worklist.push_constant(name, value)
    }

    /// Queue `roots` and drain the worklist. Only fatal errors are returned.
    pub fn run(mut self, roots: &[Name]) -> Result<BuildOutput, BuildError> {
        self.root = roots.first().cloned();
        for root in roots {
            self.worklist.push(root.clone());
        }
        let setup = SetupContext {
            runtime: self.runtime,
            observations: self.observations,
        };
        self.listeners.initialize(&setup)?;
        trace!("listeners: {}", self.listeners.names().join(", "));

        while let Some(item) = self.worklist.pop() {
            let name = item.name.clone();
            match self.expand(item) {
                Ok(()) => {}
                Err(BuildError::Introspect(e)) => {
                    debug!("skipping {name}: {e}");
                    self.warn(e.to_string());
                }
                Err(fatal) => return Err(fatal),
            }
        }
        debug!(
            "traversal of {} expanded {} names, {} nodes",
            self.root.as_ref().map(Name::relative).unwrap_or("<none>"),
            self.worklist.expanded(),
            self.tree.len()
        );
        Ok(BuildOutput {
            tree: self.tree,
            warnings: self.warnings,
            expanded: self.worklist.expanded(),
        })
    }

    fn warn(&mut self, message: String) {
        let warning = Warning::new(self.root.as_ref(), message);
        match &self.sink {
            Some(sink) => sink.emit(warning),
            None => self.warnings.push(warning),
        }
    }

    fn dispatch(&mut self, event: Event) -> Result<(), BuildError> {
        trace!("dispatch {} {}", event.kind_name(), event.name());
        let mut cx = EventContext {
            tree: &mut self.tree,
            worklist: &mut self.worklist,
            runtime: self.runtime,
            observations: self.observations,
            policy: self.policy,
        };
        let soft = self.listeners.dispatch(&event, &mut cx)?;
        for e in soft {
            self.warn(e.to_string());
        }
        Ok(())
    }

    fn expand(&mut self, item: WorkItem) -> Result<(), BuildError> {
        let WorkItem { name, value } = item;
        match value {
            Some(value) => self.dispatch(Event::ConstantFound {
                name: name.clone(),
                value,
            })?,
            None => self.dispatch(Event::SymbolFound { name: name.clone() })?,
        }
        if self.policy.skip_symbol(&name) {
            debug!("skip symbol {name}");
            return Ok(());
        }
        let handle = match value {
            Some(v) => v,
            None => self
                .runtime
                .resolve(&name)
                .ok_or_else(|| IntrospectError::UnresolvedName(name.clone()))?,
        };
        self.compile_constant(&name, handle)
    }

    fn compile_constant(&mut self, name: &Name, handle: ObjectId) -> Result<(), BuildError> {
        let kind = self.runtime.kind_of(handle)?;
        if !kind.is_namespace() {
            return self.compile_object(name, handle);
        }
        match self.runtime.name_of(handle) {
            Some(real) if real == *name => self.compile_scope(name, handle, kind),
            Some(real) => self.compile_alias(name, handle, real),
            // Anonymous namespace bound to a constant: document it under that constant.
            None => self.compile_scope(name, handle, kind),
        }
    }

    fn compile_alias(
        &mut self,
        name: &Name,
        handle: ObjectId,
        target: Name,
    ) -> Result<(), BuildError> {
        if self.policy.skip_alias(name, handle) {
            debug!("skip alias {name} = {target}");
            return Ok(());
        }
        let node = Node::Const(Const::new(
            name.relative(),
            ConstValue::Alias(target.relative().to_string()),
        ));
        let root = self.tree.root();
        let id = self.tree.add_child(root, node);
        self.dispatch(Event::ConstNodeAdded {
            name: name.clone(),
            value: handle,
            node: id,
        })?;
        self.worklist.push(target);
        Ok(())
    }

    fn compile_object(&mut self, name: &Name, handle: ObjectId) -> Result<(), BuildError> {
        if self.policy.skip_object(name, handle) {
            debug!("skip object {name}");
            return Ok(());
        }
        let class = self.runtime.class_of(handle)?;
        let value = match self.runtime.name_of(class) {
            Some(class_name) => ConstValue::Instance(class_name.relative().to_string()),
            None => ConstValue::AnonymousInstance,
        };
        let root = self.tree.root();
        let id = self
            .tree
            .add_child(root, Node::Const(Const::new(name.relative(), value)));
        self.dispatch(Event::ConstNodeAdded {
            name: name.clone(),
            value: handle,
            node: id,
        })
    }

    fn compile_scope(
        &mut self,
        name: &Name,
        handle: ObjectId,
        kind: ObjectKind,
    ) -> Result<(), BuildError> {
        if self.policy.skip_module(name, handle) {
            debug!("skip module {name}: defined outside the unit");
            return Ok(());
        }
        // Query everything first so a failing handle leaves no partial scope behind.
        let mut methods = Vec::new();
        for singleton in [false, true] {
            let mut own = self.runtime.methods_of(handle, singleton)?;
            own.retain(|m| m.owner == handle);
            own.sort_by(|a, b| a.name.cmp(&b.name));
            methods.extend(own);
        }
        let mixins = self.runtime.mixins_of(handle)?;
        let vars = self.runtime.type_variables_of(handle)?;
        let scope = match kind {
            ObjectKind::Class => Scope::class(name.relative(), self.superclass_name(handle)?),
            _ => Scope::module(name.relative()),
        };

        let root = self.tree.root();
        let node = self.tree.add_child(root, Node::Scope(scope));
        self.compile_methods(name, handle, node, methods)?;
        self.compile_mixins(name, node, mixins);
        self.compile_type_variables(node, vars);
        self.dispatch(Event::ScopeNodeAdded {
            name: name.clone(),
            value: handle,
            node,
        })
    }

    /// First named superclass, skipping anonymous ones. The root namespace means none.
    fn superclass_name(&mut self, handle: ObjectId) -> Result<Option<String>, IntrospectError> {
        let root = self.runtime.root_namespace();
        let mut current = self.runtime.superclass_of(handle)?;
        let mut hops = 0usize;
        while let Some(sc) = current {
            if sc == root {
                return Ok(None);
            }
            if let Some(sc_name) = self.runtime.name_of(sc) {
                let rendered = sc_name.relative().to_string();
                self.worklist.push(sc_name);
                return Ok(Some(rendered));
            }
            hops += 1;
            if hops > 64 {
                return Err(IntrospectError::inspect(
                    format!("#<anonymous {sc}>"),
                    "anonymous superclass chain too deep",
                ));
            }
            current = self.runtime.superclass_of(sc)?;
        }
        Ok(None)
    }

    fn compile_methods(
        &mut self,
        name: &Name,
        handle: ObjectId,
        node: NodeId,
        methods: Vec<MethodInfo>,
    ) -> Result<(), BuildError> {
        for info in methods {
            if !is_valid_method_name(&info.name) {
                debug!("skip method {name}#{}: not a valid method name", info.name);
                continue;
            }
            if self.policy.skip_method(name, handle, &info) {
                debug!("skip method {name}#{}: defined outside the unit", info.name);
                continue;
            }
            let method = match translate_method(name, &info) {
                Ok(m) => m,
                Err(e) => {
                    self.warn(e.to_string());
                    untyped_method(&info)
                }
            };
            let id = self.tree.add_child(node, Node::Method(method));
            self.dispatch(Event::MethodNodeAdded {
                name: name.clone(),
                value: handle,
                node: id,
                signature: info.signature,
                parameters: info.parameters,
            })?;
        }
        Ok(())
    }

    fn compile_mixins(&mut self, name: &Name, node: NodeId, mixins: Vec<MixinInfo>) {
        let observations = self.observations;
        for mixin in mixins {
            let Some(target) = self.runtime.name_of(mixin.target) else {
                debug!("skip anonymous {} on {name}", mixin.kind.as_str());
                continue;
            };
            let locations = observations.mixin_locations(name, mixin.kind, &target);
            if self.policy.skip_mixin(mixin.target, locations) {
                debug!(
                    "skip {} {target} on {name}: declared outside the unit",
                    mixin.kind.as_str()
                );
                continue;
            }
            self.tree.add_child(
                node,
                Node::Mixin(Mixin {
                    kind: mixin.kind,
                    target: target.relative().to_string(),
                }),
            );
            self.worklist.push(target);
        }
    }

    /// Type variables of the namespace and its singleton. Nothing is added when none exist.
    fn compile_type_variables(&mut self, node: NodeId, vars: Vec<TypeVariableInfo>) {
        if vars.is_empty() {
            return;
        }
        let names: Vec<String> = vars.iter().map(|v| v.name.clone()).collect();
        for var in vars {
            self.tree.add_child(
                node,
                Node::TypeVariable(TypeVariable {
                    name: var.name,
                    variance: var.variance,
                    bounds: var.bounds,
                    singleton: var.singleton,
                }),
            );
        }
        if let Some(scope) = self.tree.get_mut(node).as_scope_mut() {
            scope.type_params = names;
        }
    }
}

/// Name for parameters the runtime reports without one.
fn param_name(param: &RuntimeParam, position: usize) -> String {
    if !param.name.is_empty() {
        return param.name.clone();
    }
    match param.kind {
        ParamKind::Rest => "args".to_string(),
        ParamKind::KeywordRest => "kwargs".to_string(),
        ParamKind::Block => "blk".to_string(),
        _ => format!("arg{position}"),
    }
}

fn untyped_method(info: &MethodInfo) -> Method {
    let mut method = Method::new(&info.name, info.singleton);
    method.visibility = info.visibility;
    method.params = info
        .parameters
        .iter()
        .enumerate()
        .map(|(i, p)| Param::untyped(p.kind, param_name(p, i)))
        .collect();
    method.return_type = Some(UNTYPED.to_string());
    method
}

/// Method node with types from the signature, or untyped when there is none.
fn translate_method(owner: &Name, info: &MethodInfo) -> Result<Method, IntrospectError> {
    let Some(sig) = &info.signature else {
        return Ok(untyped_method(info));
    };
    let malformed = |reason: String| IntrospectError::MalformedSignature {
        owner: owner.relative().to_string(),
        method: info.name.clone(),
        reason,
    };
    if sig.params.len() != info.parameters.len() {
        return Err(malformed(format!(
            "signature declares {} parameters, method takes {}",
            sig.params.len(),
            info.parameters.len()
        )));
    }
    let types: HashMap<&str, &str> = sig
        .params
        .iter()
        .map(|(n, t)| (n.as_str(), t.as_str()))
        .collect();
    let mut params = Vec::with_capacity(info.parameters.len());
    for (i, p) in info.parameters.iter().enumerate() {
        let pname = param_name(p, i);
        let ty = types
            .get(pname.as_str())
            .ok_or_else(|| malformed(format!("no type for parameter `{pname}`")))?;
        params.push(Param::new(p.kind, pname, *ty));
    }
    let mut method = Method::new(&info.name, info.singleton);
    method.visibility = info.visibility;
    method.params = params;
    method.return_type = sig.return_type.clone();
    method.sig.typed = true;
    Ok(method)
}
