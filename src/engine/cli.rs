//! CLI command handler: load the image and symbol table, generate, write the tree.

use anyhow::{Context, Result};
use log::{debug, info};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::engine::arg_parser::Cli;
use crate::engine::progress::RootProgress;
use crate::engine::{UnitPolicy, default_listeners};
use crate::pipeline::{GenerateContext, generate_with_opts, top_level_roots};
use crate::runtime::ProgramImage;
use crate::symbols::{SymbolSource, load_known_symbols};
use crate::tree::DeclTree;
use crate::utils::{Colors, apply_file_to_opts, load_declgen_toml, setup_logging};
use crate::{Name, Opts};

/// `.declgen.toml` from the working directory first, then CLI flags on top.
fn setup_opts(cli: &Cli) -> Opts {
    let mut opts = Opts::default();
    let file = load_declgen_toml(Path::new("."));
    if let Some(ref f) = file {
        apply_file_to_opts(f, &mut opts);
    }
    apply_cli_to_opts(cli, &mut opts);
    setup_logging(opts.verbose);
    if file.is_some() {
        debug!("loaded settings from .declgen.toml");
    }
    opts
}

fn apply_cli_to_opts(cli: &Cli, opts: &mut Opts) {
    if cli.workers.is_some() {
        opts.workers = cli.workers;
    }
    if let Some(k) = cli.keep {
        opts.keep = k;
    }
    if let Some(v) = cli.strict {
        opts.strict = v;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    if !cli.boundary.is_empty() {
        opts.boundary = cli.boundary.clone();
    }
    if !cli.requested.is_empty() {
        opts.requested = cli.requested.clone();
    }
    if cli.symbols.is_some() {
        opts.symbols = cli.symbols.clone();
    }
    let symbol_command = cli.symbol_command_argv();
    if !symbol_command.is_empty() {
        opts.symbol_command = symbol_command;
    }
    if cli.output.is_some() {
        opts.output = cli.output.clone();
    }
}

fn symbol_source(opts: &Opts) -> SymbolSource {
    match (&opts.symbols, opts.symbol_command.is_empty()) {
        (Some(path), _) => SymbolSource::File(path.clone()),
        (None, false) => SymbolSource::Command(opts.symbol_command.clone()),
        (None, true) => SymbolSource::None,
    }
}

fn write_output(tree: &DeclTree, output: Option<&Path>) -> Result<()> {
    let json = tree.to_json_string();
    match output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("write {}", path.display())),
        None => {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{json}").context("write tree to stdout")
        }
    }
}

/// Generate the declaration tree for the roots named on the command line (or all
/// top-level constants) and write it as JSON.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli);
    let image = ProgramImage::load(&cli.image)?;
    let symbols = load_known_symbols(&symbol_source(&opts))?;
    debug!("{} known symbols", symbols.len());

    let roots: Vec<Name> = if cli.roots.is_empty() {
        top_level_roots(&image)?
    } else {
        cli.root_names()
    };
    let observations = Arc::new(image.observations().clone());
    let policy = UnitPolicy::new(symbols.clone(), Arc::clone(&observations))
        .with_boundary(opts.boundary.clone())
        .with_requested(opts.requested.iter().map(|r| Name::new(r)))
        .with_exclude(opts.exclude.clone());
    let factory = || default_listeners(&symbols);
    let cx = GenerateContext {
        runtime: &image,
        observations: &observations,
        policy: &policy,
        listeners: &factory,
    };

    let progress = opts.verbose.then(|| RootProgress::new(roots.len()));
    let on_done = progress.as_ref().map(RootProgress::callback);
    let generated = generate_with_opts(&cx, &roots, &opts, on_done.as_deref())?;
    if let Some(ref progress) = progress {
        progress.finish();
    }

    write_output(&generated.tree, opts.output.as_deref())?;
    info!(
        "{} declarations from {} roots",
        Colors::colorize(Colors::ADDED, &generated.tree.len().to_string()),
        roots.len() - generated.failed_roots.len()
    );
    if !generated.failed_roots.is_empty() {
        let failed: Vec<&str> = generated.failed_roots.iter().map(Name::relative).collect();
        info!(
            "{} failed: {}",
            Colors::colorize(Colors::FAILED, &failed.len().to_string()),
            failed.join(", ")
        );
    }
    Ok(())
}
