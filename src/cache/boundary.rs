use tracing::{debug, trace};

use super::{CacheStats, CacheStore, GridDataSource};
use crate::{context::ReadContext, error::GribError, grid::GridLayout};

/// A rectangle of grid points, inclusive on both ends, in `(i, j)` as
/// counted by [`GridLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub i_min: usize,
    pub i_max: usize,
    pub j_min: usize,
    pub j_max: usize,
}

impl Region {
    pub fn new(i_min: usize, i_max: usize, j_min: usize, j_max: usize) -> Self {
        Self {
            i_min,
            i_max,
            j_min,
            j_max,
        }
    }

    /// # Examples
    ///
    /// ```
    /// let region = gribpoint::Region::new(2, 4, 0, 1);
    /// assert!(region.contains(2, 1));
    /// assert!(region.contains(4, 0));
    /// assert!(!region.contains(5, 0));
    /// assert!(!region.contains(3, 2));
    /// ```
    pub fn contains(&self, i: usize, j: usize) -> bool {
        (self.i_min..=self.i_max).contains(&i) && (self.j_min..=self.j_max).contains(&j)
    }
}

/// A read-through cache for the grid points inside a [`Region`].
///
/// Reads inside the region are answered from the store when possible and
/// otherwise read once from the source and stored. Reads of grid points
/// outside the region go to the source and are not stored. Indices outside
/// the layout fail with [`GribError::OutOfBounds`] without reaching the
/// source.
///
/// Concurrent misses on the same index may each read the source.
///
/// # Examples
///
/// ```
/// use gribpoint::{
///     BoundaryCache, GridDataSource, GridLayout, GribError, MapStore, ReadContext, Region,
///     ScanningMode,
/// };
///
/// struct Index;
///
/// impl GridDataSource for Index {
///     fn read_grid_at(&self, ctx: &ReadContext, n: usize) -> Result<f32, GribError> {
///         ctx.check()?;
///         Ok(n as f32)
///     }
/// }
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let layout = GridLayout::new(10, 10, ScanningMode(0b01000000));
///     let cache = BoundaryCache::new(Region::new(0, 4, 0, 4), layout, Index, MapStore::new());
///     let ctx = ReadContext::background();
///
///     assert_eq!(cache.read_grid_at(&ctx, 11)?, 11.);
///     assert_eq!(cache.read_grid_at(&ctx, 11)?, 11.);
///     assert_eq!(cache.read_grid_at(&ctx, 99)?, 99.);
///     assert_eq!(cache.stats().misses(), 1);
///     assert_eq!(cache.stats().hits(), 1);
///     assert_eq!(cache.stats().bypasses(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct BoundaryCache<S, St> {
    region: Region,
    layout: GridLayout,
    source: S,
    store: St,
    stats: CacheStats,
}

impl<S, St: CacheStore> BoundaryCache<S, St> {
    pub fn new(region: Region, layout: GridLayout, source: S, store: St) -> Self {
        debug!(
            i_min = region.i_min,
            i_max = region.i_max,
            j_min = region.j_min,
            j_max = region.j_max,
            store = store.kind(),
            "boundary cache created"
        );
        Self {
            region,
            layout,
            source,
            store,
            stats: CacheStats::default(),
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }
}

impl<S: GridDataSource, St: CacheStore> GridDataSource for BoundaryCache<S, St> {
    fn read_grid_at(&self, ctx: &ReadContext, n: usize) -> Result<f32, GribError> {
        let (i, j) = self.layout.ij_of(n).ok_or(GribError::OutOfBounds {
            index: n,
            len: self.layout.len(),
        })?;

        if !self.region.contains(i, j) {
            trace!(index = n, i, j, "outside cached region");
            self.stats.record_bypass();
            return self.source.read_grid_at(ctx, n);
        }

        if let Some(value) = self.store.get(n) {
            trace!(index = n, "cache hit");
            self.stats.record_hit();
            return Ok(value);
        }

        trace!(index = n, "cache miss");
        let value = self.source.read_grid_at(ctx, n)?;
        self.store.set(n, value);
        self.stats.record_miss();
        Ok(value)
    }
}
