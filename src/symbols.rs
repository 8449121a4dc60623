//! Known-symbol set: names the baseline type system already declares.
//!
//! Built once per run from the JSON symbol table printed by an external static
//! analysis tool, then shared read-only by every worker.

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use crate::types::Name;
use crate::utils::config::SymbolTableConsts;

/// Immutable set of known qualified names. Cloning shares the underlying set.
#[derive(Clone, Debug, Default)]
pub struct SymbolSet {
    names: Arc<HashSet<Name>>,
}

impl SymbolSet {
    pub fn new(names: HashSet<Name>) -> Self {
        Self {
            names: Arc::new(names),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order (for reports and tests).
    pub fn sorted(&self) -> Vec<Name> {
        let mut v: Vec<Name> = self.names.iter().cloned().collect();
        v.sort();
        v
    }
}

impl<S: AsRef<str>> FromIterator<S> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|s| Name::new(s.as_ref())).collect())
    }
}

/// Where the symbol table comes from.
#[derive(Clone, Debug, Default)]
pub enum SymbolSource {
    #[default]
    None,
    /// JSON file already produced by the tool.
    File(PathBuf),
    /// Program and arguments; the table is read from stdout.
    Command(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct SymbolName {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct SymbolEntry {
    #[serde(default)]
    kind: String,
    name: Option<SymbolName>,
    #[serde(default)]
    children: Vec<SymbolEntry>,
}

/// True when a segment is a synthetic or reserved name that must never be declared.
fn is_excluded_segment(segment: &str) -> bool {
    segment.is_empty()
        || segment
            .chars()
            .any(|c| SymbolTableConsts::RESERVED_CHARS.contains(&c))
        || segment.chars().all(|c| c.is_ascii_digit())
}

fn collect(entry: &SymbolEntry, prefix: &Name, out: &mut HashSet<Name>) {
    let segment = entry.name.as_ref().map(|n| n.name.as_str()).unwrap_or("");
    let is_root = segment == SymbolTableConsts::ROOT_SYMBOL;
    let allowed = SymbolTableConsts::ALLOWED_KINDS.contains(&entry.kind.as_str());

    let current = if is_root {
        prefix.clone()
    } else {
        if !allowed || is_excluded_segment(segment) {
            return;
        }
        let name = prefix.child(segment);
        out.insert(name.clone());
        name
    };

    for child in &entry.children {
        collect(child, &current, out);
    }
}

/// Parse the tool's nested JSON symbol table into a [`SymbolSet`].
pub fn parse_symbol_table(json: &str) -> Result<SymbolSet> {
    let root: SymbolEntry = serde_json::from_str(json).context("parse symbol table JSON")?;
    let mut names = HashSet::new();
    collect(&root, &Name::root(), &mut names);
    debug!("Loaded {} known symbols", names.len());
    Ok(SymbolSet::new(names))
}

/// Load the known-symbol set from `source`.
pub fn load_known_symbols(source: &SymbolSource) -> Result<SymbolSet> {
    match source {
        SymbolSource::None => Ok(SymbolSet::empty()),
        SymbolSource::File(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read symbol table {}", path.display()))?;
            parse_symbol_table(&s)
        }
        SymbolSource::Command(argv) => {
            let (program, args) = argv
                .split_first()
                .context("symbol command is empty")?;
            debug!("Running symbol table tool: {}", argv.join(" "));
            let output = Command::new(program)
                .args(args)
                .output()
                .with_context(|| format!("spawn symbol table tool `{program}`"))?;
            if !output.status.success() {
                anyhow::bail!(
                    "symbol table tool `{}` exited with {}: {}",
                    program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            let stdout =
                String::from_utf8(output.stdout).context("symbol table output is not UTF-8")?;
            parse_symbol_table(&stdout)
        }
    }
}
