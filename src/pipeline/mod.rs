//! Pipeline components: executor, per-root compilation, merge and error handling.

pub mod context;
pub mod error_handler;
pub mod executor;
pub mod orchestrator;
pub mod warnings;

pub use context::GenerateContext;
pub use error_handler::check_for_failed_roots;
pub use executor::{Failure, ParallelOutcome, run_in_parallel};
pub use orchestrator::{Generated, compile_root, generate_with_opts, top_level_roots};
pub use warnings::WarningSink;
