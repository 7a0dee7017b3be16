//! Free-list of idle [`Splicer`]s.
//!
//! A logging call acquires a [`PooledSplicer`], drives it through the three
//! passes, reads the text and export list, then drops it (or calls
//! [`free`](PooledSplicer::free)).  The splicer is cleared and handed back
//! to the pool unless it grew past the [`PoolConfig`] ceilings.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::PoolConfig;
use crate::splicer::Splicer;

/// Thread-safe pool of reusable splicers.
#[derive(Debug, Default)]
pub struct SplicerPool {
    idle: Mutex<Vec<Splicer>>,
    config: PoolConfig,
}

impl SplicerPool {
    pub fn new(config: PoolConfig) -> Self {
        Self { idle: Mutex::new(Vec::with_capacity(config.max_idle)), config }
    }

    /// Hand out an idle splicer, or a fresh one if none is idle.
    #[must_use]
    pub fn acquire(&self) -> PooledSplicer<'_> {
        let splicer = self.lock().pop().unwrap_or_else(|| {
            tracing::trace!("allocating fresh splicer");
            Splicer::new()
        });
        PooledSplicer { splicer, pool: self }
    }

    /// Clear `splicer` and keep it if it is small enough and there is room.
    fn release(&self, mut splicer: Splicer) {
        let text_capacity = splicer.text_capacity();
        let entries = splicer.entries();
        if text_capacity > self.config.max_text_capacity
            || splicer.scratch_capacity() > self.config.max_scratch_capacity
            || entries > self.config.max_entries
        {
            tracing::trace!(text_capacity, entries, "discarding oversized splicer");
            return;
        }
        splicer.clear();

        let mut idle = self.lock();
        if idle.len() < self.config.max_idle {
            idle.push(splicer);
        }
    }

    /// Number of idle splicers currently held.
    pub fn available(&self) -> usize {
        self.lock().len()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    // The free-list is a plain Vec; it stays valid after any panic.
    fn lock(&self) -> MutexGuard<'_, Vec<Splicer>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive use of one splicer; returns it to the pool on drop.
#[derive(Debug)]
pub struct PooledSplicer<'a> {
    splicer: Splicer,
    pool: &'a SplicerPool,
}

impl PooledSplicer<'_> {
    /// Release the splicer back to its pool now.
    pub fn free(self) {
        drop(self);
    }
}

impl Deref for PooledSplicer<'_> {
    type Target = Splicer;

    fn deref(&self) -> &Splicer {
        &self.splicer
    }
}

impl DerefMut for PooledSplicer<'_> {
    fn deref_mut(&mut self) -> &mut Splicer {
        &mut self.splicer
    }
}

impl Drop for PooledSplicer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.splicer));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
