//! Filtering policy: what the traversal emits, separate from what it finds.

use std::sync::Arc;

use log::debug;

use crate::engine::tools::{is_valid_constant_name, matches_any};
use crate::runtime::{MemberKey, MethodInfo, ObjectId, ObservationLog, SourceLocation};
use crate::symbols::SymbolSet;
use crate::types::Name;

/// Skip predicates for one documentation unit. Shared read-only across workers.
pub trait FilteringPolicy: Sync {
    fn skip_symbol(&self, name: &Name) -> bool;

    fn skip_subconstant(&self, name: &Name, value: ObjectId) -> bool;

    /// Constant bound to a namespace under a different name.
    fn skip_alias(&self, name: &Name, value: ObjectId) -> bool;

    /// Constant bound to a non-namespace value.
    fn skip_object(&self, name: &Name, value: ObjectId) -> bool;

    fn skip_module(&self, name: &Name, value: ObjectId) -> bool;

    fn skip_mixin(&self, value: ObjectId, locations: &[SourceLocation]) -> bool;

    /// `name` is the owning namespace.
    fn skip_method(&self, name: &Name, value: ObjectId, method: &MethodInfo) -> bool;
}

/// Policy that emits nothing the symbol set already declares and nothing defined outside
/// the unit's source boundary.
#[derive(Clone, Debug)]
pub struct UnitPolicy {
    symbols: SymbolSet,
    observations: Arc<ObservationLog>,
    /// Source path prefixes owned by the unit. Empty means everything.
    boundary: Vec<String>,
    requested: Vec<Name>,
    exclude: Vec<String>,
}

impl UnitPolicy {
    pub fn new(symbols: SymbolSet, observations: Arc<ObservationLog>) -> Self {
        Self {
            symbols,
            observations,
            boundary: Vec::new(),
            requested: Vec::new(),
            exclude: Vec::new(),
        }
    }

    pub fn with_boundary(mut self, prefixes: Vec<String>) -> Self {
        self.boundary = prefixes;
        self
    }

    pub fn with_requested(mut self, names: impl IntoIterator<Item = Name>) -> Self {
        self.requested = names.into_iter().collect();
        self
    }

    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }

    pub fn in_boundary(&self, loc: &SourceLocation) -> bool {
        self.boundary.is_empty() || self.boundary.iter().any(|p| loc.file.starts_with(p))
    }

    /// No recorded definition site counts as inside.
    fn defined_in_unit(&self, name: &Name) -> bool {
        let sites = self.observations.constant_locations(name);
        sites.is_empty() || sites.iter().any(|loc| self.in_boundary(loc))
    }

    fn excluded(&self, name: &Name) -> bool {
        let hit = matches_any(&self.exclude, name);
        if hit {
            debug!("{name} matches an exclude pattern");
        }
        hit
    }
}

impl FilteringPolicy for UnitPolicy {
    fn skip_symbol(&self, name: &Name) -> bool {
        self.excluded(name) || (self.symbols.contains(name) && !self.requested.contains(name))
    }

    fn skip_subconstant(&self, name: &Name, _value: ObjectId) -> bool {
        self.excluded(name) || !is_valid_constant_name(name.last_segment())
    }

    fn skip_alias(&self, name: &Name, _value: ObjectId) -> bool {
        self.symbols.contains(name) || !self.defined_in_unit(name)
    }

    fn skip_object(&self, name: &Name, _value: ObjectId) -> bool {
        self.symbols.contains(name) || !self.defined_in_unit(name)
    }

    fn skip_module(&self, name: &Name, _value: ObjectId) -> bool {
        !self.defined_in_unit(name)
    }

    fn skip_mixin(&self, _value: ObjectId, locations: &[SourceLocation]) -> bool {
        if self.boundary.is_empty() {
            return false;
        }
        !locations.iter().any(|loc| self.in_boundary(loc))
    }

    fn skip_method(&self, name: &Name, _value: ObjectId, method: &MethodInfo) -> bool {
        let key = MemberKey {
            owner: name,
            singleton: method.singleton,
            method: &method.name,
        };
        match self.observations.method_location(key) {
            Some(loc) => !self.in_boundary(loc),
            None => false,
        }
    }
}
