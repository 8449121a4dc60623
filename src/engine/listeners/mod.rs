//! Standard listeners shipped with the engine.

mod documentation;
mod enums;
mod helpers;
mod remove_empty_scopes;
mod required_ancestors;
mod signatures;
mod subconstants;

pub use documentation::DocumentationListener;
pub use enums::EnumsListener;
pub use helpers::HelpersListener;
pub use remove_empty_scopes::RemoveEmptyScopesListener;
pub use required_ancestors::RequiredAncestorsListener;
pub use signatures::SignaturesListener;
pub use subconstants::SubconstantsListener;
