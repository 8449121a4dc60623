use log::debug;

use crate::engine::event::Event;
use crate::engine::listener::{EventContext, Listener};
use crate::error::BuildError;

/// Queues the constants declared directly inside each namespace, in sorted order.
pub struct SubconstantsListener;

impl Listener for SubconstantsListener {
    fn name(&self) -> &'static str {
        "subconstants"
    }

    fn on_event(&mut self, event: &Event, cx: &mut EventContext<'_>) -> Result<(), BuildError> {
        let Event::ScopeNodeAdded { name, value, .. } = event else {
            return Ok(());
        };
        let mut children = cx.runtime.constants_of(*value)?;
        children.sort();
        children.dedup();

        let root = cx.runtime.root_namespace();
        let root_name = cx.runtime.name_of(root);
        for child in children {
            // The root namespace lists itself as a nested constant.
            if *value == root && root_name.as_ref().is_some_and(|n| n.relative() == child) {
                continue;
            }
            let full = name.child(&child);
            let Some(target) = cx.runtime.const_get(*value, &child)? else {
                debug!("{full} vanished before it could be read");
                continue;
            };
            if target == *value {
                continue;
            }
            if cx.policy.skip_subconstant(&full, target) {
                debug!("skip subconstant {full}");
                continue;
            }
            cx.worklist.push_constant(full, target);
        }
        Ok(())
    }
}
