//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;

// ---- Settings file ----

static CONFIG_FILENAME: OnceLock<String> = OnceLock::new();

/// Per-directory settings file, `.<package>.toml` (`.declgen.toml`).
pub fn config_filename() -> &'static str {
    CONFIG_FILENAME.get_or_init(|| format!(".{}.toml", env!("CARGO_PKG_NAME")))
}

// ---- Worker threads ----

/// Pool sizing for the parallel executor. Roots are mostly reflection calls, so a
/// small multiple of the available threads keeps every core busy.
#[derive(Clone, Copy, Debug)]
pub struct WorkerLimits {
    /// Threads reported by rayon.
    pub threads: usize,
}

impl WorkerLimits {
    pub const WORKERS_PER_THREAD: usize = 2;
    pub const MIN_WORKERS: usize = 2;
    pub const MAX_WORKERS: usize = 64;

    pub fn detect() -> Self {
        Self {
            threads: rayon::current_num_threads(),
        }
    }

    /// Worker count used when none is configured.
    pub fn default_workers(&self) -> usize {
        self.threads
            .saturating_mul(Self::WORKERS_PER_THREAD)
            .clamp(Self::MIN_WORKERS, Self::MAX_WORKERS)
    }
}

// ---- Executor ----

pub struct ExecutorConsts;

impl ExecutorConsts {
    /// Fewer items than this run sequentially on the caller's thread.
    pub const MIN_ITEMS_FOR_PARALLEL: usize = 2;
    /// Capacity of the job and result channels per worker.
    pub const CHANNEL_CAP_PER_WORKER: usize = 4;
}

// ---- Symbol table ----

pub struct SymbolTableConsts;

impl SymbolTableConsts {
    /// Declaration kinds kept from the symbol table; everything else is ignored.
    pub const ALLOWED_KINDS: &'static [&'static str] = &["CLASS_OR_MODULE", "STATIC_FIELD"];
    /// Name of the synthetic outermost entry.
    pub const ROOT_SYMBOL: &'static str = "<root>";
    /// Characters that only appear in synthetic names.
    pub const RESERVED_CHARS: &'static [char] = &['<', '>', '(', ')', '$', '#', ' '];
}

// ---- Output ----

/// Conflicts beyond this many are summarized instead of listed one by one.
pub const CONFLICT_LIST_THRESHOLD: usize = 100;
