use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::slice;

use crate::Opts;
use crate::engine::{TreeBuilder, is_valid_constant_name};
use crate::pipeline::{self, GenerateContext, WarningSink};
use crate::runtime::Runtime;
use crate::tree::{Conflict, DeclTree, merge_all, normalize};
use crate::types::{Name, Warning};
use crate::utils::Colors;
use crate::utils::config::CONFLICT_LIST_THRESHOLD;

/// Merged, normalized result of a generation run.
#[derive(Debug)]
pub struct Generated {
    pub tree: DeclTree,
    pub conflicts: Vec<Conflict>,
    /// Soft problems from every traversal, grouped by root in input order.
    pub warnings: Vec<Warning>,
    /// Roots whose traversal failed; their slots contributed nothing to `tree`.
    pub failed_roots: Vec<Name>,
}

/// Every valid top-level constant of the root namespace, sorted. The root's own name is
/// left out.
pub fn top_level_roots(runtime: &dyn Runtime) -> Result<Vec<Name>> {
    let root = runtime.root_namespace();
    let own = runtime.name_of(root);
    let mut names = runtime
        .constants_of(root)
        .context("list top-level constants")?;
    names.sort();
    Ok(names
        .into_iter()
        .filter(|n| is_valid_constant_name(n))
        .filter(|n| own.as_ref().is_none_or(|o| o.relative() != n))
        .map(|n| Name::new(&n))
        .collect())
}

/// Build the tree for a single root with a fresh worklist and listener chain.
pub fn compile_root(
    cx: &GenerateContext<'_>,
    root: &Name,
    sink: &WarningSink,
) -> Result<DeclTree> {
    let output = TreeBuilder::new(cx.runtime, cx.observations, cx.policy, (cx.listeners)())
        .with_warning_sink(sink.clone())
        .run(slice::from_ref(root))
        .with_context(|| format!("build tree for {root}"))?;
    debug!("{root}: {} names expanded", output.expanded);
    Ok(output.tree)
}

/// Main orchestrator: one traversal per root through the executor, then merge and normalize.
/// `on_done` is called as each root finishes.
pub fn generate_with_opts(
    cx: &GenerateContext<'_>,
    roots: &[Name],
    opts: &Opts,
    on_done: Option<&(dyn Fn() + Sync)>,
) -> Result<Generated> {
    debug!("generating {} roots", roots.len());
    let outcome = pipeline::run_in_parallel(
        roots,
        |root, sink| compile_root(cx, root, sink),
        opts.workers,
        on_done,
    );
    let failed_roots = pipeline::check_for_failed_roots(opts, roots, &outcome.failures)?;

    let trees = outcome.results.into_iter().flatten();
    let merged = merge_all(trees, opts.keep);
    let mut tree = merged.tree;
    normalize(&mut tree);

    for w in &outcome.warnings {
        warn!("{w}");
    }
    report_conflicts(&merged.conflicts);
    info!(
        "{} roots, {} nodes, {} conflicts, {} warnings",
        roots.len(),
        tree.len(),
        merged.conflicts.len(),
        outcome.warnings.len()
    );

    Ok(Generated {
        tree,
        conflicts: merged.conflicts,
        warnings: outcome.warnings,
        failed_roots,
    })
}

/// Log conflicts; past the threshold only a summary is printed.
fn report_conflicts(conflicts: &[Conflict]) {
    if conflicts.is_empty() {
        return;
    }
    if conflicts.len() > CONFLICT_LIST_THRESHOLD {
        warn!(
            "{} merge conflicts (too many to list)",
            Colors::colorize(Colors::CONFLICT, &conflicts.len().to_string())
        );
        return;
    }
    for c in conflicts {
        warn!("{}", Colors::colorize(Colors::CONFLICT, &c.to_string()));
    }
}
