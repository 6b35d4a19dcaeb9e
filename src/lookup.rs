use tracing::trace;

use crate::{cache::GridDataSource, context::ReadContext, error::GribError, grid::GridProjection};

/// Point lookup by latitude and longitude.
///
/// Couples a grid with a source of values on that grid; any cache can be put
/// between the two as the source.
///
/// # Examples
///
/// ```
/// use gribpoint::{
///     GridDataSource, GridPointReader, GridProjection, LambertGrid, LambertGridDefinition,
///     NoCache, ReadContext, SimplePacking, SimplePackingParam, SimplePackingReader,
/// };
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut template = vec![0u8; 67];
///     template[0] = 6;
///     template[16..20].copy_from_slice(&3u32.to_be_bytes());
///     template[20..24].copy_from_slice(&2u32.to_be_bytes());
///     template[24..28].copy_from_slice(&38_000_000u32.to_be_bytes());
///     template[28..32].copy_from_slice(&262_000_000u32.to_be_bytes());
///     template[33..37].copy_from_slice(&38_500_000u32.to_be_bytes());
///     template[37..41].copy_from_slice(&262_500_000u32.to_be_bytes());
///     template[41..45].copy_from_slice(&3_000_000u32.to_be_bytes());
///     template[45..49].copy_from_slice(&3_000_000u32.to_be_bytes());
///     template[50] = 0b01000000;
///     template[51..55].copy_from_slice(&38_500_000u32.to_be_bytes());
///     template[55..59].copy_from_slice(&38_500_000u32.to_be_bytes());
///     let grid = LambertGrid::new(LambertGridDefinition::from_buf(&template)?)?;
///
///     // Six 8-bit values: 0, 10, 20, 30, 40, 50.
///     let payload = vec![0, 10, 20, 30, 40, 50];
///     let packing = SimplePacking::new(SimplePackingParam::new(0.0, 0, 1, 8), 6);
///     let source = NoCache::new(SimplePackingReader::new(payload, 0, 6, packing));
///
///     let reader = GridPointReader::new(grid, source);
///     let ctx = ReadContext::background();
///     let (lat, lon) = reader.grid().grid_point(4).ok_or("no grid point")?;
///     assert_eq!(reader.read_at(&ctx, lat, lon)?, 4.0);
///     assert_eq!(reader.read_grid_at(&ctx, 5)?, 5.0);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GridPointReader<G, S> {
    grid: G,
    source: S,
}

impl<G, S> GridPointReader<G, S>
where
    G: GridProjection,
    S: GridDataSource,
{
    pub fn new(grid: G, source: S) -> Self {
        Self { grid, source }
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the value of the grid point nearest to `(lat, lon)`, in
    /// degrees. Coordinates outside the grid resolve to the nearest edge
    /// point.
    pub fn read_at(&self, ctx: &ReadContext, lat: f32, lon: f32) -> Result<f32, GribError> {
        let n = self.grid.grid_index(lat, lon);
        trace!(lat, lon, index = n, "coordinate resolved");
        self.source.read_grid_at(ctx, n)
    }
}

impl<G, S> GridDataSource for GridPointReader<G, S>
where
    G: GridProjection,
    S: GridDataSource,
{
    fn read_grid_at(&self, ctx: &ReadContext, n: usize) -> Result<f32, GribError> {
        self.source.read_grid_at(ctx, n)
    }
}
