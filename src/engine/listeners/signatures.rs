use crate::engine::event::Event;
use crate::engine::listener::{EventContext, Listener};
use crate::error::BuildError;

/// Copies signature modifiers and method-level type parameters onto method nodes.
pub struct SignaturesListener;

impl Listener for SignaturesListener {
    fn name(&self) -> &'static str {
        "signatures"
    }

    fn on_event(&mut self, event: &Event, cx: &mut EventContext<'_>) -> Result<(), BuildError> {
        let Event::MethodNodeAdded {
            node,
            signature: Some(sig),
            ..
        } = event
        else {
            return Ok(());
        };
        if let Some(method) = cx.tree.get_mut(*node).as_method_mut()
            && method.sig.typed
        {
            method.sig.modifiers = sig.modifiers.clone();
            method.sig.type_parameters = sig.type_parameters.clone();
        }
        Ok(())
    }
}
