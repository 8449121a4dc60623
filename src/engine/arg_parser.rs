use clap::Parser;
use std::path::PathBuf;

use crate::Keep;

/// Declaration generator for a loaded program image.
#[derive(Clone, Parser)]
#[command(name = "declgen")]
#[command(about = "Generate a declaration tree for the constants of a program image.")]
pub struct Cli {
    /// Program image JSON captured from the loaded program.
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Root constants to document. Default: every top-level constant in the image.
    #[arg(value_name = "ROOT")]
    pub roots: Vec<String>,

    /// Symbol table JSON listing names the baseline already declares.
    #[arg(long, short = 's')]
    pub symbols: Option<PathBuf>,

    /// Command that prints the symbol table JSON on stdout, quoted as one argument
    /// (`"srb-symbols --print-json"`). Split on whitespace.
    #[arg(long, value_name = "CMD")]
    pub symbol_command: Option<String>,

    /// Source path prefixes owned by the documented unit. Can specify multiple.
    #[arg(long, short = 'b', num_args = 1..)]
    pub boundary: Vec<String>,

    /// Names to document even when the symbol table already declares them.
    #[arg(long, short = 'r', num_args = 1..)]
    pub requested: Vec<String>,

    /// Exclude patterns over qualified names (glob syntax). Can specify multiple: -e 'Foo::*' Bar
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Worker threads. 1 runs every root sequentially.
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Side that wins when two roots disagree about the same declaration.
    #[arg(long, short = 'k', value_enum)]
    pub keep: Option<Keep>,

    /// Strict mode: fail on the first root that cannot be built instead of skipping it.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub strict: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Write the tree here instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn root_names(&self) -> Vec<crate::Name> {
        self.roots.iter().map(|r| crate::Name::new(r)).collect()
    }

    /// `--symbol-command` as program then args; empty when not given.
    pub fn symbol_command_argv(&self) -> Vec<String> {
        self.symbol_command
            .as_deref()
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
