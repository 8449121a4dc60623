//! Breadth-first queue of names awaiting expansion.

use std::collections::{HashSet, VecDeque};

use crate::runtime::ObjectId;
use crate::types::Name;

/// A queued name, with the live handle when it was reached through a constant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkItem {
    pub name: Name,
    pub value: Option<ObjectId>,
}

/// Pending names plus the set of names already seen. A name is expanded at most once.
#[derive(Debug, Default)]
pub struct Worklist {
    queue: VecDeque<WorkItem>,
    seen: HashSet<Name>,
    expanded: usize,
}

impl Worklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `name` unless it is already queued or visited. Returns true when queued.
    pub fn push(&mut self, name: Name) -> bool {
        self.enqueue(WorkItem { name, value: None })
    }

    /// Like [`Worklist::push`], remembering the live handle the name was reached through.
    pub fn push_constant(&mut self, name: Name, value: ObjectId) -> bool {
        self.enqueue(WorkItem {
            name,
            value: Some(value),
        })
    }

    fn enqueue(&mut self, item: WorkItem) -> bool {
        if !self.seen.insert(item.name.clone()) {
            return false;
        }
        self.queue.push_back(item);
        true
    }

    pub fn pop(&mut self) -> Option<WorkItem> {
        let item = self.queue.pop_front()?;
        self.expanded += 1;
        Some(item)
    }

    /// Queued or already expanded.
    pub fn contains(&self, name: &Name) -> bool {
        self.seen.contains(name)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of items popped so far.
    pub fn expanded(&self) -> usize {
        self.expanded
    }
}
