use log::debug;

use crate::engine::event::Event;
use crate::engine::listener::{EventContext, Listener};
use crate::error::BuildError;
use crate::symbols::SymbolSet;

/// Drops scopes that add nothing to a declaration the symbol set already knows.
pub struct RemoveEmptyScopesListener {
    symbols: SymbolSet,
}

impl RemoveEmptyScopesListener {
    pub fn new(symbols: SymbolSet) -> Self {
        Self { symbols }
    }
}

impl Listener for RemoveEmptyScopesListener {
    fn name(&self) -> &'static str {
        "remove_empty_scopes"
    }

    fn on_event(&mut self, event: &Event, cx: &mut EventContext<'_>) -> Result<(), BuildError> {
        let Event::ScopeNodeAdded { name, node, .. } = event else {
            return Ok(());
        };
        if self.symbols.contains(name) && cx.tree.remove_empty_scope(*node) {
            debug!("removed empty scope {name}: already declared");
        }
        Ok(())
    }
}
