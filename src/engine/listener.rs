//! Listener chain: pluggable passes that decorate nodes as the traversal adds them.

use log::debug;

use crate::engine::event::Event;
use crate::engine::listeners::{
    DocumentationListener, EnumsListener, HelpersListener, RemoveEmptyScopesListener,
    RequiredAncestorsListener, SignaturesListener, SubconstantsListener,
};
use crate::engine::policy::FilteringPolicy;
use crate::engine::worklist::Worklist;
use crate::error::{BuildError, IntrospectError};
use crate::runtime::{ObservationLog, Runtime};
use crate::symbols::SymbolSet;
use crate::tree::DeclTree;

/// Read-only view handed to [`Listener::initialize`].
pub struct SetupContext<'a> {
    pub runtime: &'a dyn Runtime,
    pub observations: &'a ObservationLog,
}

/// What a listener may touch while handling one event.
pub struct EventContext<'a> {
    pub tree: &'a mut DeclTree,
    pub worklist: &'a mut Worklist,
    pub runtime: &'a dyn Runtime,
    pub observations: &'a ObservationLog,
    pub policy: &'a dyn FilteringPolicy,
}

pub trait Listener: Send {
    fn name(&self) -> &'static str;

    /// One-time setup before the first event.
    fn initialize(&mut self, _setup: &SetupContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Events the listener does not care about must be ignored, not rejected.
    fn on_event(&mut self, event: &Event, cx: &mut EventContext<'_>) -> Result<(), BuildError>;
}

/// Listeners in fixed dispatch order.
#[derive(Default)]
pub struct ListenerChain {
    listeners: Vec<Box<dyn Listener>>,
}

impl ListenerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, listener: impl Listener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn push(&mut self, listener: Box<dyn Listener>) {
        self.listeners.push(listener);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn initialize(&mut self, setup: &SetupContext<'_>) -> Result<(), BuildError> {
        for listener in &mut self.listeners {
            let name = listener.name();
            listener
                .initialize(setup)
                .map_err(|e| BuildError::listener(name, e))?;
        }
        Ok(())
    }

    /// Pass `event` to every listener in order. Introspection failures do not stop the
    /// chain: they are collected and returned so later listeners still see the event. A
    /// listener failure stops the chain and is returned as the error.
    pub fn dispatch(
        &mut self,
        event: &Event,
        cx: &mut EventContext<'_>,
    ) -> Result<Vec<IntrospectError>, BuildError> {
        let mut soft = Vec::new();
        for listener in &mut self.listeners {
            if let Some(node) = event.node()
                && !cx.tree.is_attached(node)
            {
                // An earlier listener removed the node; nothing left to decorate.
                break;
            }
            match listener.on_event(event, cx) {
                Ok(()) => {}
                Err(BuildError::Introspect(e)) => {
                    debug!("listener `{}` on {}: {e}", listener.name(), event.name());
                    soft.push(e);
                }
                Err(fatal) => return Err(fatal),
            }
        }
        Ok(soft)
    }
}

/// The standard chain. Documentation runs after signatures so both land on one node;
/// empty-scope removal runs last.
pub fn default_listeners(symbols: &SymbolSet) -> ListenerChain {
    ListenerChain::new()
        .with(SignaturesListener)
        .with(HelpersListener)
        .with(EnumsListener)
        .with(RequiredAncestorsListener)
        .with(SubconstantsListener)
        .with(DocumentationListener::default())
        .with(RemoveEmptyScopesListener::new(symbols.clone()))
}

/// Builds a fresh chain for each traversal; chains are stateful and never shared.
pub type ListenerFactory<'a> = dyn Fn() -> ListenerChain + Sync + 'a;
