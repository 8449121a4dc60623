//! Engine: traversal, filtering policy, listeners and the CLI front end.

pub mod arg_parser;
pub mod builder;
pub mod cli;
pub mod event;
pub mod listener;
pub mod listeners;
pub mod policy;
pub mod progress;
pub mod tools;
pub mod worklist;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use builder::{BuildOutput, TreeBuilder};
pub use cli::handle_run;
pub use event::Event;
pub use listener::{
    EventContext, Listener, ListenerChain, ListenerFactory, SetupContext, default_listeners,
};
pub use policy::{FilteringPolicy, UnitPolicy};
pub use tools::{glob_match, is_valid_constant_name, is_valid_method_name};
pub use worklist::{WorkItem, Worklist};
