//! declgen: walks a loaded program's object model and builds a deterministic declaration
//! tree of its interface for external type checkers.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod runtime;
pub mod symbols;
pub mod tree;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use engine::{FilteringPolicy, ListenerChain, ListenerFactory, UnitPolicy, default_listeners};
pub use error::{BuildError, IntrospectError};
pub use pipeline::{GenerateContext, Generated};
pub use runtime::{ObservationLog, ProgramImage, Runtime};
pub use symbols::{SymbolSet, SymbolSource, load_known_symbols};
pub use tree::{DeclTree, merge, normalize};

use log::debug;

/// Result alias used by public declgen API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: one traversal per root (in parallel), merged and normalized.
///
/// `listeners` is called once per root so every traversal gets its own chain; pass
/// `&|| default_listeners(&symbols)` for the standard set. Roots that panic are reported in
/// [`Generated::failed_roots`] unless `opts.strict` is set, in which case the first one is
/// returned as the error. A listener failure is always returned as the error.
///
/// ```ignore
/// let image = declgen::ProgramImage::load(path)?;
/// let symbols = declgen::SymbolSet::empty();
/// let policy = declgen::UnitPolicy::new(symbols.clone(), Arc::new(image.observations().clone()));
/// let out = declgen::generate(&image, image.observations(), &policy,
///     &|| declgen::default_listeners(&symbols), &[Name::new("Post")], &GenerateOpts::default())?;
/// println!("{}", out.tree.to_json_string());
/// ```
pub fn generate(
    runtime: &dyn Runtime,
    observations: &ObservationLog,
    policy: &dyn FilteringPolicy,
    listeners: &ListenerFactory<'_>,
    roots: &[Name],
    opts: &GenerateOpts,
) -> Result<Generated> {
    let opts = Opts::from(opts);
    let config_str = format!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    debug!("{}", config_str);

    let cx = GenerateContext {
        runtime,
        observations,
        policy,
        listeners,
    };
    pipeline::generate_with_opts(&cx, roots, &opts, None)
}
