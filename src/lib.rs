//! Decoding of GRIB2 simple packing payloads into physical values and lookup of
//! grid points by index or by latitude/longitude.
//!
//! The crate covers the part of a GRIB2 reader that sits between an already
//! parsed message and the caller who wants "the value at this point":
//!
//! - [`regulation`]: the numeric conventions of the WMO regulations (signed
//!   integers, missing values, micro-degrees).
//! - [`SimplePacking`] and [`SimplePackingReader`]: Data Representation
//!   Template 5.0, decoded either as a whole or one grid point at a time.
//! - [`LambertGrid`]: Grid Definition Template 3.30 with conversion between
//!   grid indices and coordinates.
//! - [`BoundaryCache`], [`NoCache`] and the [`CacheStore`] implementations: a
//!   read-through cache in front of any [`GridDataSource`].
//!
//! # Examples
//!
//! ```
//! use gribpoint::{
//!     BoundaryCache, GridDataSource, GridLayout, MapStore, ReadContext, Region,
//!     ScanningMode, SimplePacking, SimplePackingParam, SimplePackingReader,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Four 4-bit values: 1, 2, 3, 4.
//!     let payload = vec![0x12, 0x34];
//!     let param = SimplePackingParam::new(10.0, 0, 1, 4);
//!     let packing = SimplePacking::new(param, 4);
//!     let reader = SimplePackingReader::new(payload, 0, 2, packing);
//!
//!     let layout = GridLayout::new(2, 2, ScanningMode(0b01000000));
//!     let cache = BoundaryCache::new(Region::new(0, 1, 0, 1), layout, reader, MapStore::new());
//!
//!     let ctx = ReadContext::background();
//!     assert_eq!(cache.read_grid_at(&ctx, 3)?, 1.4);
//!     assert_eq!(cache.read_grid_at(&ctx, 3)?, 1.4);
//!     assert_eq!(cache.stats().hits(), 1);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod codetables;
mod context;
mod decoder;
mod error;
mod grid;
mod helpers;
mod lookup;
mod reader;
pub mod regulation;

pub use crate::{
    cache::{
        BoundaryCache, CacheStats, CacheStore, GridDataSource, LruStore, MapStore, NoCache, Region,
    },
    context::*,
    decoder::*,
    error::*,
    grid::*,
    lookup::*,
    reader::*,
};
