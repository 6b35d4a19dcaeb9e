//! Read-through caching in front of point-value data sources.
//!
//! A [`GridDataSource`] answers "what is the value at grid index `n`". The
//! types in this module wrap a source and decide whether a read goes to the
//! source or is answered from a [`CacheStore`].

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

pub use self::{
    boundary::{BoundaryCache, Region},
    no_cache::NoCache,
    store::{CacheStore, LruStore, MapStore},
};
use crate::{context::ReadContext, error::GribError};

mod boundary;
mod no_cache;
mod store;

/// A source of values addressed by linear grid index.
pub trait GridDataSource: Send + Sync {
    /// Returns the value at grid index `n`.
    ///
    /// Implementations check `ctx` before any blocking read.
    fn read_grid_at(&self, ctx: &ReadContext, n: usize) -> Result<f32, GribError>;
}

impl<T: GridDataSource + ?Sized> GridDataSource for &T {
    fn read_grid_at(&self, ctx: &ReadContext, n: usize) -> Result<f32, GribError> {
        (**self).read_grid_at(ctx, n)
    }
}

impl<T: GridDataSource + ?Sized> GridDataSource for Arc<T> {
    fn read_grid_at(&self, ctx: &ReadContext, n: usize) -> Result<f32, GribError> {
        (**self).read_grid_at(ctx, n)
    }
}

impl<T: GridDataSource + ?Sized> GridDataSource for Box<T> {
    fn read_grid_at(&self, ctx: &ReadContext, n: usize) -> Result<f32, GribError> {
        (**self).read_grid_at(ctx, n)
    }
}

/// Counters of how reads through a cache were answered.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    bypasses: AtomicU64,
}

impl CacheStats {
    /// Reads answered from the store.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Reads that went to the source and were stored.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Reads that went to the source without touching the store.
    pub fn bypasses(&self) -> u64 {
        self.bypasses.load(Ordering::Relaxed)
    }

    /// Returns the share of cacheable reads answered from the store, in
    /// `[0, 1]`, or `0` before any cacheable read.
    ///
    /// # Examples
    ///
    /// ```
    /// let stats = gribpoint::CacheStats::default();
    /// assert_eq!(stats.hit_rate(), 0.);
    /// ```
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.
        } else {
            hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_bypass(&self) {
        self.bypasses.fetch_add(1, Ordering::Relaxed);
    }
}
