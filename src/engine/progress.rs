//! Progress display for completed roots (verbose CLI runs only).

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

/// kdam bar counting finished roots. Cloning shares the same bar.
#[derive(Clone)]
pub struct RootProgress {
    bar: Arc<Mutex<Bar>>,
}

impl RootProgress {
    pub fn new(total: usize) -> Self {
        let bar = kdam::tqdm!(
            total = total,
            desc = "Generating",
            animation = Animation::Classic,
            unit = " roots"
        );
        Self {
            bar: Arc::new(Mutex::new(bar)),
        }
    }

    /// One more root done. Skips the redraw when the bar is busy.
    pub fn tick(&self) {
        if let Ok(mut bar) = self.bar.try_lock() {
            let _ = bar.update(1);
        }
    }

    /// Redraw with the final count and move past the bar's line.
    pub fn finish(&self) {
        if let Ok(mut bar) = self.bar.lock() {
            let _ = bar.refresh();
        }
        eprintln!();
    }

    /// Executor callback that ticks this bar.
    pub fn callback(&self) -> Box<dyn Fn() + Sync> {
        let progress = self.clone();
        Box::new(move || progress.tick())
    }
}
