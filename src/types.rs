//! Public and internal types for the declgen API and pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Separator between namespace segments.
pub const NAMESPACE_SEP: &str = "::";

/// Fully-qualified name of a type or constant.
///
/// The canonical form always starts with the root marker (`::`), so `Foo::Bar`,
/// `::Foo::Bar` and ` ::Foo::Bar ` are the same name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Name(String);

impl Name {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let rel = trimmed.strip_prefix(NAMESPACE_SEP).unwrap_or(trimmed);
        Name(format!("{NAMESPACE_SEP}{rel}"))
    }

    /// The root namespace itself (`::`).
    pub fn root() -> Self {
        Name(NAMESPACE_SEP.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == NAMESPACE_SEP
    }

    /// Canonical form, with the leading `::`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name without the root marker, as written inside the declaration tree.
    pub fn relative(&self) -> &str {
        &self.0[NAMESPACE_SEP.len()..]
    }

    /// Append one segment.
    pub fn child(&self, segment: &str) -> Name {
        if self.is_root() {
            Name::new(segment)
        } else {
            Name(format!("{}{NAMESPACE_SEP}{segment}", self.0))
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.relative()
            .split(NAMESPACE_SEP)
            .filter(|s| !s.is_empty())
    }

    /// Last segment, or empty for the root.
    pub fn last_segment(&self) -> &str {
        self.segments().last().unwrap_or("")
    }

    pub fn parent(&self) -> Option<Name> {
        let rel = self.relative();
        if rel.is_empty() {
            return None;
        }
        match rel.rfind(NAMESPACE_SEP) {
            Some(idx) => Some(Name::new(&rel[..idx])),
            None => Some(Name::root()),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name::new(&s)
    }
}

impl From<Name> for String {
    fn from(n: Name) -> Self {
        n.0
    }
}

/// Which side wins when two trees disagree at the same path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Keep {
    #[default]
    Left,
    Right,
}

/// Soft, human-readable problem found while building a tree. Never aborts a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    /// Root whose traversal produced the warning, when known.
    pub root: Option<Name>,
    pub message: String,
}

impl Warning {
    pub fn new(root: Option<&Name>, message: impl Into<String>) -> Self {
        Warning {
            root: root.cloned(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "[{}] {}", root.relative(), self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Lib-only options for [`generate`](crate::generate). Only the fields that apply when using the crate.
#[derive(Clone, Debug, Default)]
pub struct GenerateOpts {
    /// Override worker count. When None, derived from available parallelism.
    pub workers: Option<usize>,
    /// Side that wins merge conflicts between per-root trees.
    pub keep: Keep,
    /// Strict mode: fail on the first failed root instead of skipping it.
    pub strict: bool,
}

impl From<&GenerateOpts> for Opts {
    fn from(o: &GenerateOpts) -> Self {
        Opts {
            workers: o.workers,
            keep: o.keep,
            strict: o.strict,
            ..Opts::default()
        }
    }
}

/// Full options (CLI). Use [`GenerateOpts`] for lib.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// Override worker count. When None, derived from available parallelism.
    pub workers: Option<usize>,
    /// Side that wins merge conflicts between per-root trees.
    pub keep: Keep,
    /// Strict mode: fail on the first failed root instead of skipping it.
    pub strict: bool,
    /// Show progress bar and debug logs.
    pub verbose: bool,
    /// Exclude patterns over qualified names (glob syntax, e.g. `Foo::Internal*`).
    pub exclude: Vec<String>,
    /// Source path prefixes that make up the documented unit. Empty means everything.
    pub boundary: Vec<String>,
    /// Names to document even when the symbol set already knows them.
    pub requested: Vec<String>,
    /// Symbol table JSON file.
    pub symbols: Option<PathBuf>,
    /// External tool printing the symbol table JSON on stdout (program followed by args).
    pub symbol_command: Vec<String>,
    /// Write the tree here instead of stdout.
    pub output: Option<PathBuf>,
}
