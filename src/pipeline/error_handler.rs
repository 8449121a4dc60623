use anyhow::Result;
use log::warn;

use crate::Opts;
use crate::pipeline::Failure;
use crate::types::Name;

/// Check executor failures. A fatal failure (a listener error) is always an error; in strict
/// mode so is the first failure of any kind. Otherwise the failed roots are logged and returned.
pub fn check_for_failed_roots(
    opts: &Opts,
    roots: &[Name],
    failures: &[Failure],
) -> Result<Vec<Name>> {
    if let Some(fatal) = failures.iter().find(|f| f.fatal) {
        anyhow::bail!("{}: {}", roots[fatal.index], fatal.message);
    }
    if opts.strict
        && let Some(first) = failures.first()
    {
        anyhow::bail!("{}: {}", roots[first.index], first.message);
    }
    let failed: Vec<Name> = failures.iter().map(|f| roots[f.index].clone()).collect();
    if !failed.is_empty() {
        warn!(
            "Skipped {} of {} roots due to build failures",
            failed.len(),
            roots.len()
        );
        if opts.verbose {
            for f in failures {
                eprintln!("  skipped: {} ({})", roots[f.index], f.message);
            }
        }
    }
    Ok(failed)
}
