//! Shared, read-only inputs of one generation run.

use crate::engine::{FilteringPolicy, ListenerFactory};
use crate::runtime::{ObservationLog, Runtime};

/// Everything a traversal needs besides its root. Safe to share across workers: each
/// worker builds its own listener chain from `listeners`.
#[derive(Clone, Copy)]
pub struct GenerateContext<'a> {
    pub runtime: &'a dyn Runtime,
    pub observations: &'a ObservationLog,
    pub policy: &'a dyn FilteringPolicy,
    pub listeners: &'a ListenerFactory<'a>,
}
