use crate::engine::event::Event;
use crate::engine::listener::{EventContext, Listener};
use crate::error::BuildError;

pub struct RequiredAncestorsListener;

impl Listener for RequiredAncestorsListener {
    fn name(&self) -> &'static str {
        "required_ancestors"
    }

    fn on_event(&mut self, event: &Event, cx: &mut EventContext<'_>) -> Result<(), BuildError> {
        let Event::ScopeNodeAdded { value, node, .. } = event else {
            return Ok(());
        };
        let ancestors = cx.runtime.required_ancestors_of(*value)?;
        if ancestors.is_empty() {
            return Ok(());
        }
        if let Some(scope) = cx.tree.get_mut(*node).as_scope_mut() {
            for ancestor in ancestors {
                if !scope.required_ancestors.contains(&ancestor) {
                    scope.required_ancestors.push(ancestor);
                }
            }
        }
        Ok(())
    }
}
