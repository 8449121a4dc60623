pub mod config;
pub mod declgen_toml;
pub mod logger;

pub use config::*;
pub use declgen_toml::{DeclgenToml, apply_file_to_opts, load_declgen_toml};
pub use logger::{Colors, setup_logging};
