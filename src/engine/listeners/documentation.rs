use std::collections::BTreeMap;

use crate::engine::event::Event;
use crate::engine::listener::{EventContext, Listener, SetupContext};
use crate::error::BuildError;

/// Attaches documentation comments keyed by tree path. The index is copied once at
/// initialization.
#[derive(Default)]
pub struct DocumentationListener {
    index: BTreeMap<String, Vec<String>>,
}

impl Listener for DocumentationListener {
    fn name(&self) -> &'static str {
        "documentation"
    }

    fn initialize(&mut self, setup: &SetupContext<'_>) -> anyhow::Result<()> {
        self.index = setup.observations.documentation().clone();
        Ok(())
    }

    fn on_event(&mut self, event: &Event, cx: &mut EventContext<'_>) -> Result<(), BuildError> {
        let Some(node) = event.node() else {
            return Ok(());
        };
        if self.index.is_empty() {
            return Ok(());
        }
        let path = cx.tree.path_of(node);
        let Some(lines) = self.index.get(&path) else {
            return Ok(());
        };
        if let Some(comments) = cx.tree.get_mut(node).comments_mut()
            && comments.is_empty()
        {
            comments.extend(lines.iter().cloned());
        }
        Ok(())
    }
}
