//! Immutable registry snapshots for reader threads.
//!
//! The tick loop owns the live `Net`.  Renderers and consoles hold a
//! [`SnapshotCell`] and call [`load`](SnapshotCell::load) to get an
//! `Arc<Net>` that never changes underneath them.  Publishing swaps the whole
//! `Arc`; a reader that loaded before the swap keeps its old view.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::Net;

/// Shared handle to the most recently published registry.
#[derive(Clone)]
pub struct SnapshotCell {
    current: Arc<RwLock<Arc<Net>>>,
}

impl SnapshotCell {
    pub fn new(net: Net) -> Self {
        Self { current: Arc::new(RwLock::new(Arc::new(net))) }
    }

    /// The latest published view.  The lock is held only for the `Arc` clone.
    pub fn load(&self) -> Arc<Net> {
        Arc::clone(&self.current.read())
    }

    /// Replace the published view with a structural copy of `net`.
    pub fn publish(&self, net: &Net) {
        self.publish_arc(Arc::new(net.clone()));
    }

    pub fn publish_arc(&self, net: Arc<Net>) {
        *self.current.write() = net;
    }
}

impl std::fmt::Debug for SnapshotCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SnapshotCell").field(&*self.load()).finish()
    }
}
