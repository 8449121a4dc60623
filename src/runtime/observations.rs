//! Observation log: declaration sites recorded once while the program was loading.
//!
//! Handed to the engine and filtering policies as a read-only dependency. Keys are
//! qualified names (relative form), so the log serializes to plain JSON maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::runtime::MixinKind;
use crate::types::Name;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    #[serde(default)]
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Key of a method: owner, singleton flag, method name. Renders as `Owner#m` or `Owner.m`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberKey<'a> {
    pub owner: &'a Name,
    pub singleton: bool,
    pub method: &'a str,
}

impl fmt::Display for MemberKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.singleton { "." } else { "#" };
        write!(f, "{}{}{}", self.owner.relative(), sep, self.method)
    }
}

fn mixin_key(owner: &Name, kind: MixinKind, target: &Name) -> String {
    format!(
        "{}|{}|{}",
        owner.relative(),
        kind.as_str(),
        target.relative()
    )
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationLog {
    /// Qualified constant name -> every site that (re)opened or assigned it.
    #[serde(default)]
    constants: BTreeMap<String, Vec<SourceLocation>>,
    /// `Owner#m` / `Owner.m` -> definition site.
    #[serde(default)]
    methods: BTreeMap<String, SourceLocation>,
    /// `Owner|kind|Target` -> declaration sites of the mixin.
    #[serde(default)]
    mixins: BTreeMap<String, Vec<SourceLocation>>,
    /// Tree path (`Foo::Bar`, `Foo::Bar::m`, `Foo::Bar::self.m`) -> documentation lines.
    #[serde(default)]
    documentation: BTreeMap<String, Vec<String>>,
}

impl ObservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_constant(&mut self, name: &Name, loc: SourceLocation) {
        let sites = self
            .constants
            .entry(name.relative().to_string())
            .or_default();
        if !sites.contains(&loc) {
            sites.push(loc);
        }
    }

    pub fn record_method(&mut self, key: MemberKey<'_>, loc: SourceLocation) {
        self.methods.insert(key.to_string(), loc);
    }

    pub fn record_mixin(
        &mut self,
        owner: &Name,
        kind: MixinKind,
        target: &Name,
        loc: SourceLocation,
    ) {
        let sites = self
            .mixins
            .entry(mixin_key(owner, kind, target))
            .or_default();
        if !sites.contains(&loc) {
            sites.push(loc);
        }
    }

    pub fn record_documentation(&mut self, path: &str, lines: Vec<String>) {
        self.documentation.insert(path.to_string(), lines);
    }

    pub fn constant_locations(&self, name: &Name) -> &[SourceLocation] {
        self.constants
            .get(name.relative())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn method_location(&self, key: MemberKey<'_>) -> Option<&SourceLocation> {
        self.methods.get(&key.to_string())
    }

    pub fn mixin_locations(
        &self,
        owner: &Name,
        kind: MixinKind,
        target: &Name,
    ) -> &[SourceLocation] {
        self.mixins
            .get(&mixin_key(owner, kind, target))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn documentation(&self) -> &BTreeMap<String, Vec<String>> {
        &self.documentation
    }
}
