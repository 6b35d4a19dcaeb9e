use tracing::debug;

use super::{
    GridLayout, GridPointIndexIterator, GridProjection, ScanningMode, earth::EarthShapeDefinition,
    lcc::LambertConformal,
};
use crate::{
    error::GribError,
    helpers::{ensure_len, read_as},
    regulation::{GribInt, scaled_degrees},
};

const TEMPLATE_LEN: usize = 67;

/// Grid definition template 3.30: Lambert conformal.
///
/// Angles are kept in units of 10^-6 degree and grid lengths in units of
/// 10^-3 metre, as they are stored in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambertGridDefinition {
    pub earth_shape: EarthShapeDefinition,
    pub ni: u32,
    pub nj: u32,
    pub first_point_lat: i32,
    pub first_point_lon: i32,
    pub resolution_and_component_flags: u8,
    pub lad: i32,
    pub lov: i32,
    pub dx: u32,
    pub dy: u32,
    pub projection_centre: u8,
    pub scanning_mode: ScanningMode,
    pub latin1: i32,
    pub latin2: i32,
    pub south_pole_lat: i32,
    pub south_pole_lon: i32,
}

impl LambertGridDefinition {
    /// Returns the shape of the grid, i.e. a tuple of the number of grids in
    /// the i and j directions.
    ///
    /// Examples
    ///
    /// ```
    /// fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let mut template = [0u8; 67];
    ///     template[16..20].copy_from_slice(&2u32.to_be_bytes());
    ///     template[20..24].copy_from_slice(&3u32.to_be_bytes());
    ///
    ///     let def = gribpoint::LambertGridDefinition::from_buf(&template)?;
    ///     assert_eq!(def.grid_shape(), (2, 3));
    ///     Ok(())
    /// }
    /// ```
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.ni as usize, self.nj as usize)
    }

    /// Returns the grid type.
    pub fn short_name(&self) -> &'static str {
        "lambert"
    }

    pub fn layout(&self) -> GridLayout {
        let (ni, nj) = self.grid_shape();
        GridLayout::new(ni, nj, self.scanning_mode)
    }

    /// Returns an iterator over `(i, j)` of grid points.
    ///
    /// Note that this is a low-level API and it is not checked that the number
    /// of iterator iterations is consistent with the number of grid points
    /// defined in the data.
    ///
    /// Examples
    ///
    /// ```
    /// fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let mut template = [0u8; 67];
    ///     template[16..20].copy_from_slice(&2u32.to_be_bytes());
    ///     template[20..24].copy_from_slice(&3u32.to_be_bytes());
    ///     template[50] = 0b01000000;
    ///
    ///     let def = gribpoint::LambertGridDefinition::from_buf(&template)?;
    ///     let mut ij = def.ij()?;
    ///     assert_eq!(ij.next(), Some((0, 0)));
    ///     assert_eq!(ij.next(), Some((1, 0)));
    ///     assert_eq!(ij.next(), Some((0, 1)));
    ///     Ok(())
    /// }
    /// ```
    pub fn ij(&self) -> Result<GridPointIndexIterator, GribError> {
        self.scanning_mode.ensure_supported()?;
        Ok(self.layout().ij())
    }

    /// Returns an iterator over latitudes and longitudes of grid points in
    /// storage order.
    ///
    /// Note that this is a low-level API and it is not checked that the number
    /// of iterator iterations is consistent with the number of grid points
    /// defined in the data.
    pub fn latlons(&self) -> Result<std::vec::IntoIter<(f32, f32)>, GribError> {
        let grid = LambertGrid::new(self.clone())?;
        let latlons = (0..grid.layout.len())
            .filter_map(|n| grid.grid_point(n))
            .collect::<Vec<_>>();
        Ok(latlons.into_iter())
    }

    /// Same as [`latlons`](Self::latlons), but computed with PROJ.
    #[cfg(feature = "gridpoints-proj")]
    pub fn latlons_with_proj(&self) -> Result<std::vec::IntoIter<(f32, f32)>, GribError> {
        let lad = scaled_degrees(self.lad);
        let lov = scaled_degrees(self.lov);
        let latin1 = scaled_degrees(self.latin1);
        let latin2 = scaled_degrees(self.latin2);
        let (a, b) = self.radii()?;
        let proj_def = format!(
            "+a={a} +b={b} +proj=lcc +lat_0={lad} +lon_0={lov} +lat_1={latin1} +lat_2={latin2}"
        );

        let proj_error = |e: proj::ProjError| GribError::InvalidValue(format!("PROJ: {e}"));
        let projection = proj::Proj::new(&proj_def)
            .map_err(|e| GribError::InvalidValue(format!("PROJ definition {proj_def}: {e}")))?;
        let first_point = (
            scaled_degrees(self.first_point_lon).to_radians(),
            scaled_degrees(self.first_point_lat).to_radians(),
        );
        let (x0, y0) = projection
            .project(first_point, false)
            .map_err(proj_error)?;

        let (dx, dy) = self.signed_spacing();
        let mut xy = self
            .ij()?
            .map(|(i, j)| (x0 + dx * i as f64, y0 + dy * j as f64))
            .collect::<Vec<_>>();
        let lonlats = projection
            .project_array(&mut xy, true)
            .map_err(proj_error)?;
        let latlons = lonlats
            .iter()
            .map(|&(lon, lat)| (lat.to_degrees() as f32, lon.to_degrees() as f32))
            .collect::<Vec<_>>();
        Ok(latlons.into_iter())
    }

    /// Reads the 67 octets of the template, starting from the shape of the
    /// Earth.
    pub fn from_buf(buf: &[u8]) -> Result<Self, GribError> {
        ensure_len(buf, TEMPLATE_LEN, "grid definition template 3.30")?;
        let earth_shape = EarthShapeDefinition::from_buf(buf);
        let ni = read_as!(u32, buf, 16);
        let nj = read_as!(u32, buf, 20);
        let first_point_lat = read_as!(u32, buf, 24).as_grib_int();
        let first_point_lon = read_as!(u32, buf, 28).as_grib_int();
        let resolution_and_component_flags = read_as!(u8, buf, 32);
        let lad = read_as!(u32, buf, 33).as_grib_int();
        let lov = read_as!(u32, buf, 37).as_grib_int();
        let dx = read_as!(u32, buf, 41);
        let dy = read_as!(u32, buf, 45);
        let projection_centre = read_as!(u8, buf, 49);
        let scanning_mode = read_as!(u8, buf, 50);
        let latin1 = read_as!(u32, buf, 51).as_grib_int();
        let latin2 = read_as!(u32, buf, 55).as_grib_int();
        let south_pole_lat = read_as!(u32, buf, 59).as_grib_int();
        let south_pole_lon = read_as!(u32, buf, 63).as_grib_int();
        Ok(Self {
            earth_shape,
            ni,
            nj,
            first_point_lat,
            first_point_lon,
            resolution_and_component_flags,
            lad,
            lov,
            dx,
            dy,
            projection_centre,
            scanning_mode: ScanningMode(scanning_mode),
            latin1,
            latin2,
            south_pole_lat,
            south_pole_lon,
        })
    }

    fn radii(&self) -> Result<(f64, f64), GribError> {
        self.earth_shape.radii().ok_or_else(|| {
            GribError::NotSupported(format!(
                "unknown value of Code Table 3.2 (shape of the Earth): {}",
                self.earth_shape.shape_of_the_earth
            ))
        })
    }

    // Grid lengths in metres, negated for axes scanning in the negative
    // direction.
    fn signed_spacing(&self) -> (f64, f64) {
        let dx = f64::from(self.dx) * 1e-3;
        let dy = f64::from(self.dy) * 1e-3;
        let dx = if self.scanning_mode.scans_positively_for_i() {
            dx
        } else {
            -dx
        };
        let dy = if self.scanning_mode.scans_positively_for_j() {
            dy
        } else {
            -dy
        };
        (dx, dy)
    }
}

/// A Lambert conformal grid ready for index and coordinate lookups.
///
/// All unit conversions and the projection setup happen once in
/// [`LambertGrid::new`].
///
/// # Examples
///
/// ```
/// use gribpoint::{GridProjection, LambertGrid, LambertGridDefinition};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut template = vec![0u8; 67];
///     template[0] = 6; // sphere with radius 6 371 229 m
///     template[16..20].copy_from_slice(&759u32.to_be_bytes());
///     template[20..24].copy_from_slice(&599u32.to_be_bytes());
///     template[24..28].copy_from_slice(&7300u32.to_be_bytes());
///     template[28..32].copy_from_slice(&78307u32.to_be_bytes());
///     template[33..37].copy_from_slice(&30000u32.to_be_bytes());
///     template[37..41].copy_from_slice(&105000u32.to_be_bytes());
///     template[41..45].copy_from_slice(&9000u32.to_be_bytes());
///     template[45..49].copy_from_slice(&9000u32.to_be_bytes());
///     template[50] = 0b01000000;
///     template[51..55].copy_from_slice(&30000u32.to_be_bytes());
///     template[55..59].copy_from_slice(&60000u32.to_be_bytes());
///
///     let grid = LambertGrid::new(LambertGridDefinition::from_buf(&template)?)?;
///     assert_eq!(grid.grid_shape(), (759, 599));
///     assert_eq!(grid.grid_index(0.0073, 0.078307), 0);
///
///     let (lat, lon) = grid.grid_point(0).unwrap();
///     assert!((lat - 0.0073).abs() < 1e-6 && (lon - 0.078307).abs() < 1e-6);
///     assert_eq!(grid.grid_point(759 * 599), None);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LambertGrid {
    def: LambertGridDefinition,
    projection: LambertConformal,
    layout: GridLayout,
    first_point: (f64, f64),
    spacing: (f64, f64),
}

impl LambertGrid {
    pub fn new(def: LambertGridDefinition) -> Result<Self, GribError> {
        def.scanning_mode.ensure_supported()?;
        if def.ni == 0 || def.nj == 0 {
            return Err(GribError::InvalidValue(format!(
                "grid of {} x {} points",
                def.ni, def.nj
            )));
        }
        if def.projection_centre & 0b01000000 != 0 {
            return Err(GribError::NotSupported(
                "bi-polar and symmetric Lambert projection".to_owned(),
            ));
        }

        let projection = LambertConformal::new(
            def.radii()?,
            scaled_degrees(def.latin1),
            scaled_degrees(def.latin2),
            scaled_degrees(def.lad),
            scaled_degrees(def.lov),
        )?;
        let first_point = projection.project(
            scaled_degrees(def.first_point_lat),
            scaled_degrees(def.first_point_lon),
        );
        let spacing = def.signed_spacing();
        if spacing.0 == 0. || spacing.1 == 0. {
            return Err(GribError::InvalidValue(format!(
                "grid lengths {} and {}",
                def.dx, def.dy
            )));
        }
        let layout = def.layout();

        debug!(
            ni = def.ni,
            nj = def.nj,
            cone_constant = projection.cone_constant(),
            eccentricity = projection.eccentricity(),
            "Lambert conformal grid built"
        );
        Ok(Self {
            def,
            projection,
            layout,
            first_point,
            spacing,
        })
    }

    pub fn definition(&self) -> &LambertGridDefinition {
        &self.def
    }

    pub fn projection(&self) -> &LambertConformal {
        &self.projection
    }

    /// Returns the position of `(lat, lon)` in grid units from the first grid
    /// point, along the scanning directions.
    fn fractional_ij(&self, lat: f64, lon: f64) -> (f64, f64) {
        let (x, y) = self.projection.project(lat, lon);
        let (x1, y1) = self.first_point;
        let (dx, dy) = self.spacing;
        ((x - x1) / dx, (y - y1) / dy)
    }
}

impl GridProjection for LambertGrid {
    fn grid_shape(&self) -> (usize, usize) {
        (self.layout.ni(), self.layout.nj())
    }

    fn layout(&self) -> &GridLayout {
        &self.layout
    }

    fn grid_index(&self, lat: f32, lon: f32) -> usize {
        let (fi, fj) = self.fractional_ij(f64::from(lat), f64::from(lon));
        let clamp = |v: f64, len: usize| v.round().clamp(0., (len - 1) as f64) as usize;
        let i = clamp(fi, self.layout.ni());
        let j = clamp(fj, self.layout.nj());
        self.layout.linearize(i, j)
    }

    fn grid_point(&self, n: usize) -> Option<(f32, f32)> {
        let (i, j) = self.layout.ij_of(n)?;
        let (x1, y1) = self.first_point;
        let (dx, dy) = self.spacing;
        let (lat, lon) = self
            .projection
            .unproject(x1 + dx * i as f64, y1 + dy * j as f64);
        Some((lat as f32, lon as f32))
    }
}
