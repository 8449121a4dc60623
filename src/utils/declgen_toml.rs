//! Load `.declgen.toml` from a directory (CLI only). Lib does not use this; the consuming program injects config via GenerateOpts.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::config::config_filename;
use crate::{Keep, Opts};

#[derive(Debug, Deserialize)]
pub struct DeclgenToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    workers: Option<usize>,
    keep: Option<Keep>,
    strict: Option<bool>,
    verbose: Option<bool>,
    exclude: Option<Vec<String>>,
    boundary: Option<Vec<String>>,
    requested: Option<Vec<String>>,
    symbols: Option<String>,
    symbol_command: Option<Vec<String>>,
    output: Option<String>,
}

/// Load `.declgen.toml` from `dir` if present. Returns None if file missing or unreadable. CLI only.
pub fn load_declgen_toml(dir: &Path) -> Option<DeclgenToml> {
    let path = dir.join(config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    toml::from_str(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($idx:expr, $opts:expr, $idx_field:ident => $opts_field:ident) => {
        if let Some(v) = $idx.$idx_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only set fields present in the file). Call before applying CLI.
pub fn apply_file_to_opts(file: &DeclgenToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(n) = s.workers {
        opts.workers = Some(n);
    }
    apply_file_opt!(s, opts, keep => keep);
    apply_file_opt!(s, opts, strict => strict);
    apply_file_opt!(s, opts, verbose => verbose);
    apply_file_opt!(s, opts, exclude => exclude);
    apply_file_opt!(s, opts, boundary => boundary);
    apply_file_opt!(s, opts, requested => requested);
    apply_file_opt!(s, opts, symbol_command => symbol_command);
    if let Some(ref p) = s.symbols {
        opts.symbols = Some(PathBuf::from(p));
    }
    if let Some(ref p) = s.output {
        opts.output = Some(PathBuf::from(p));
    }
}
