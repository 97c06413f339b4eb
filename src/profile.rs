//! Synchronization profiling toggle.
//!
//! The profiler state is process-wide: [`SyncProfiler::global`] hands out
//! handles to one shared instance. Tests create private instances with
//! [`SyncProfiler::new`].

use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

/// A clonable handle to the sync-profile switch.
///
/// Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct SyncProfiler {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    enabled: AtomicBool,
    resets: AtomicU64,
}

static GLOBAL: OnceLock<SyncProfiler> = OnceLock::new();

impl SyncProfiler {
    /// Create a new, disabled profiler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide profiler.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.get_or_init(Self::new).clone()
    }

    /// Start collecting.
    pub fn enable(&self) {
        self.inner.enabled.store(true, Ordering::Relaxed);
    }

    /// Stop collecting. Collected data is kept.
    pub fn disable(&self) {
        self.inner.enabled.store(false, Ordering::Relaxed);
    }

    /// Discard collected data.
    pub fn reset(&self) {
        self.inner.resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns `true` while collecting.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Relaxed)
    }

    /// How many times the collected data was reset.
    #[must_use]
    pub fn reset_count(&self) -> u64 {
        self.inner.resets.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = SyncProfiler::new();
        let b = a.clone();

        a.enable();
        assert!(b.is_enabled());
        b.disable();
        assert!(!a.is_enabled());

        a.reset();
        a.reset();
        assert_eq!(b.reset_count(), 2);
    }

    #[test]
    fn global_is_shared() {
        let a = SyncProfiler::global();
        let b = SyncProfiler::global();
        let before = b.reset_count();
        a.reset();
        assert!(b.reset_count() > before);
    }
}
