pub use self::{
    earth::EarthShapeDefinition,
    lambert::{LambertGrid, LambertGridDefinition},
    lcc::LambertConformal,
};
use crate::error::GribError;

mod earth;
mod lambert;
mod lcc;

/// Conversion between linear grid indices and geographic coordinates.
///
/// Implementations are built once from a grid definition and are immutable,
/// so a single instance can serve lookups from several threads.
pub trait GridProjection: Send + Sync {
    /// Returns the shape of the grid, i.e. a tuple of the number of grids in
    /// the i and j directions.
    fn grid_shape(&self) -> (usize, usize);

    /// Returns the storage order of the grid points.
    fn layout(&self) -> &GridLayout;

    /// Returns the index of the grid point nearest to `(lat, lon)` in degrees.
    ///
    /// The coordinate is projected into grid space and rounded to the
    /// nearest row and column. A coordinate outside the grid is mapped to the
    /// nearest point on its edge, so the result is always a valid index.
    fn grid_index(&self, lat: f32, lon: f32) -> usize;

    /// Returns the latitude and longitude in degrees of the `n`-th grid
    /// point, or `None` if `n` is outside the grid.
    fn grid_point(&self, n: usize) -> Option<(f32, f32)>;
}

impl<G: GridProjection + ?Sized> GridProjection for &G {
    fn grid_shape(&self) -> (usize, usize) {
        (**self).grid_shape()
    }

    fn layout(&self) -> &GridLayout {
        (**self).layout()
    }

    fn grid_index(&self, lat: f32, lon: f32) -> usize {
        (**self).grid_index(lat, lon)
    }

    fn grid_point(&self, n: usize) -> Option<(f32, f32)> {
        (**self).grid_point(n)
    }
}

impl<G: GridProjection + ?Sized> GridProjection for std::sync::Arc<G> {
    fn grid_shape(&self) -> (usize, usize) {
        (**self).grid_shape()
    }

    fn layout(&self) -> &GridLayout {
        (**self).layout()
    }

    fn grid_index(&self, lat: f32, lon: f32) -> usize {
        (**self).grid_index(lat, lon)
    }

    fn grid_point(&self, n: usize) -> Option<(f32, f32)> {
        (**self).grid_point(n)
    }
}

/// Flag table 3.4: Scanning mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanningMode(pub u8);

impl ScanningMode {
    /// Returns `true` if points of the first row or column scan in the `+i`
    /// (`+x`) direction.
    ///
    /// # Examples
    ///
    /// ```
    /// assert!(gribpoint::ScanningMode(0b00000000).scans_positively_for_i());
    /// assert!(!gribpoint::ScanningMode(0b10000000).scans_positively_for_i());
    /// ```
    pub fn scans_positively_for_i(&self) -> bool {
        self.0 & 0b10000000 == 0
    }

    /// Returns `true` if points of the first row or column scan in the `+j`
    /// (`+y`) direction.
    ///
    /// # Examples
    ///
    /// ```
    /// assert!(!gribpoint::ScanningMode(0b00000000).scans_positively_for_j());
    /// assert!(gribpoint::ScanningMode(0b01000000).scans_positively_for_j());
    /// ```
    pub fn scans_positively_for_j(&self) -> bool {
        self.0 & 0b01000000 != 0
    }

    /// Returns `true` if adjacent points in `i` (`x`) direction are
    /// consecutive.
    ///
    /// # Examples
    ///
    /// ```
    /// assert!(gribpoint::ScanningMode(0b00000000).is_consecutive_for_i());
    /// assert!(!gribpoint::ScanningMode(0b00100000).is_consecutive_for_i());
    /// ```
    pub fn is_consecutive_for_i(&self) -> bool {
        self.0 & 0b00100000 == 0
    }

    /// Returns `true` if adjacent rows scan in the opposite direction.
    ///
    /// # Examples
    ///
    /// ```
    /// assert!(!gribpoint::ScanningMode(0b00000000).scans_alternating_rows());
    /// assert!(gribpoint::ScanningMode(0b00010000).scans_alternating_rows());
    /// ```
    pub fn scans_alternating_rows(&self) -> bool {
        self.0 & 0b00010000 != 0
    }

    pub fn has_unsupported_flags(&self) -> bool {
        self.0 & 0b00001111 != 0
    }

    pub(crate) fn ensure_supported(&self) -> Result<(), GribError> {
        if self.has_unsupported_flags() {
            let Self(mode) = self;
            return Err(GribError::NotSupported(format!("scanning mode {mode:#010b}")));
        }
        Ok(())
    }
}

/// The order in which the `ni * nj` points of a grid are stored.
///
/// `(i, j)` count points from the first grid point along the scanning
/// directions, so `(0, 0)` is always stored first.
///
/// # Examples
///
/// ```
/// use gribpoint::{GridLayout, ScanningMode};
///
/// // Rows of 3 points with alternating direction.
/// let layout = GridLayout::new(3, 2, ScanningMode(0b01010000));
/// assert_eq!(layout.index_of(0, 1), Some(5));
/// assert_eq!(layout.ij_of(3), Some((2, 1)));
/// assert_eq!(layout.index_of(3, 0), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    ni: usize,
    nj: usize,
    scanning_mode: ScanningMode,
}

impl GridLayout {
    pub fn new(ni: usize, nj: usize, scanning_mode: ScanningMode) -> Self {
        Self {
            ni,
            nj,
            scanning_mode,
        }
    }

    pub fn ni(&self) -> usize {
        self.ni
    }

    pub fn nj(&self) -> usize {
        self.nj
    }

    pub fn scanning_mode(&self) -> ScanningMode {
        self.scanning_mode
    }

    pub fn len(&self) -> usize {
        self.ni * self.nj
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the position in storage order of grid point `(i, j)`.
    pub fn index_of(&self, i: usize, j: usize) -> Option<usize> {
        (i < self.ni && j < self.nj).then(|| self.linearize(i, j))
    }

    /// Returns the grid point stored at position `n`.
    pub fn ij_of(&self, n: usize) -> Option<(usize, usize)> {
        if n >= self.len() {
            return None;
        }
        let (major_len, minor_len) = self.major_minor_len();
        let major = n / minor_len;
        let minor = self.oriented_minor(major, n % minor_len, minor_len);
        let ij = if self.scanning_mode.is_consecutive_for_i() {
            (minor, major)
        } else {
            (major, minor)
        };
        debug_assert!(major < major_len);
        Some(ij)
    }

    /// Returns an iterator over `(i, j)` of grid points in storage order.
    pub fn ij(&self) -> GridPointIndexIterator {
        GridPointIndexIterator::new(*self)
    }

    // `i` and `j` must be inside the grid.
    pub(crate) fn linearize(&self, i: usize, j: usize) -> usize {
        let (major, minor) = if self.scanning_mode.is_consecutive_for_i() {
            (j, i)
        } else {
            (i, j)
        };
        let (_, minor_len) = self.major_minor_len();
        major * minor_len + self.oriented_minor(major, minor, minor_len)
    }

    fn major_minor_len(&self) -> (usize, usize) {
        if self.scanning_mode.is_consecutive_for_i() {
            (self.nj, self.ni)
        } else {
            (self.ni, self.nj)
        }
    }

    fn oriented_minor(&self, major: usize, minor: usize, minor_len: usize) -> usize {
        if self.scanning_mode.scans_alternating_rows() && major % 2 == 1 {
            minor_len - minor - 1
        } else {
            minor
        }
    }
}

/// An iterator over `(i, j)` of grid points in storage order.
#[derive(Debug, Clone)]
pub struct GridPointIndexIterator {
    layout: GridLayout,
    pos: usize,
}

impl GridPointIndexIterator {
    pub(crate) fn new(layout: GridLayout) -> Self {
        Self { layout, pos: 0 }
    }
}

impl Iterator for GridPointIndexIterator {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let ij = self.layout.ij_of(self.pos)?;
        self.pos += 1;
        Some(ij)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.layout.len() - self.pos;
        (len, Some(len))
    }
}

impl ExactSizeIterator for GridPointIndexIterator {}
