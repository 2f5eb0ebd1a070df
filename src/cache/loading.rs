//! Loading flags
//!
//! A counter of outstanding operations. Each operation holds a guard; the
//! flag is set while any guard is alive and is released on every exit path.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts outstanding operations
#[derive(Debug, Default)]
pub struct LoadingCounter {
    outstanding: AtomicUsize,
}

impl LoadingCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one operation as started until the guard is dropped
    pub fn start(&self) -> LoadingGuard<'_> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        LoadingGuard { counter: self }
    }

    /// Whether any operation is outstanding
    pub fn is_loading(&self) -> bool {
        self.outstanding.load(Ordering::SeqCst) > 0
    }
}

/// Guard returned by [`LoadingCounter::start`]
#[must_use = "the loading flag clears as soon as the guard is dropped"]
pub struct LoadingGuard<'a> {
    counter: &'a LoadingCounter,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.counter.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}
