use log::debug;

use crate::engine::event::Event;
use crate::engine::listener::{EventContext, Listener};
use crate::error::BuildError;
use crate::tree::{EnumBlock, Node};

/// Attaches an `enums` block to enum-like namespaces.
pub struct EnumsListener;

impl Listener for EnumsListener {
    fn name(&self) -> &'static str {
        "enums"
    }

    fn on_event(&mut self, event: &Event, cx: &mut EventContext<'_>) -> Result<(), BuildError> {
        let Event::ScopeNodeAdded { name, value, node } = event else {
            return Ok(());
        };
        let Some(values) = cx.runtime.enum_values_of(*value)? else {
            return Ok(());
        };
        if values.is_empty() {
            debug!("{name} is enum-like but declares no values");
            return Ok(());
        }
        cx.tree.add_child(*node, Node::EnumBlock(EnumBlock { values }));
        Ok(())
    }
}
