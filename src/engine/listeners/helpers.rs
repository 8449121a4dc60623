use crate::engine::event::Event;
use crate::engine::listener::{EventContext, Listener};
use crate::error::BuildError;

/// Declaration markers (`abstract`, `interface`, `sealed`, ...) plus the generic marker
/// for scopes that declare type parameters.
pub struct HelpersListener;

impl Listener for HelpersListener {
    fn name(&self) -> &'static str {
        "helpers"
    }

    fn on_event(&mut self, event: &Event, cx: &mut EventContext<'_>) -> Result<(), BuildError> {
        let Event::ScopeNodeAdded { value, node, .. } = event else {
            return Ok(());
        };
        let helpers = cx.runtime.helpers_of(*value)?;
        if let Some(scope) = cx.tree.get_mut(*node).as_scope_mut() {
            for helper in helpers {
                if !scope.helpers.contains(&helper) {
                    scope.helpers.push(helper);
                }
            }
            scope.generic = !scope.type_params.is_empty();
        }
        Ok(())
    }
}
