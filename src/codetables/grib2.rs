use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Code table 3.2: Shape of the reference system.
#[derive(Debug, Clone, Copy, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Table3_2 {
    /// Spherical with radius 6 367 470.0 m.
    Sphere6367470 = 0,
    /// Spherical with radius specified by data producer.
    SphereSpecified,
    /// Oblate spheroid as defined by IAU in 1965.
    Iau1965,
    /// Oblate spheroid with axes specified in km by data producer.
    OblateSpecifiedKm,
    /// Oblate spheroid as defined in IAG-GRS80 model.
    Grs80,
    /// WGS84.
    Wgs84,
    /// Spherical with radius 6 371 229.0 m.
    Sphere6371229,
    /// Oblate spheroid with axes specified in m by data producer.
    OblateSpecifiedM,
    /// Spherical with radius 6 371 200 m, horizontal datum WGS84.
    Sphere6371200,
    /// OSGB 1936 Datum, using the Airy 1830 spheroid.
    Osgb1936,
    /// WGS84 with corrected geomagnetic coordinates.
    Wgs84Geomagnetic,
    /// Sun.
    Sun,
    Missing = 255,
}

/// Code table 5.0: Data representation template number.
#[derive(Debug, Clone, Copy, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum Table5_0 {
    SimplePacking = 0,
    MatrixValuesSimplePacking,
    ComplexPacking,
    ComplexPackingAndSpatialDifferencing,
    IeeeFloatingPoint,
    Jpeg2000 = 40,
    Png,
    Ccsds,
    SpectralSimplePacking = 50,
    SpectralComplexPacking,
    RunLengthPacking = 200,
    Missing = 65535,
}

impl Table5_0 {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::SimplePacking => "simple packing",
            Self::MatrixValuesSimplePacking => "matrix values with simple packing",
            Self::ComplexPacking => "complex packing",
            Self::ComplexPackingAndSpatialDifferencing => {
                "complex packing and spatial differencing"
            }
            Self::IeeeFloatingPoint => "IEEE floating point",
            Self::Jpeg2000 => "JPEG 2000 code stream",
            Self::Png => "PNG",
            Self::Ccsds => "CCSDS recommended lossless compression",
            Self::SpectralSimplePacking => "spectral data, simple packing",
            Self::SpectralComplexPacking => "spectral data, complex packing",
            Self::RunLengthPacking => "run length packing with level values",
            Self::Missing => "missing",
        }
    }
}

/// Code table 5.1: Type of original field values.
#[derive(Debug, Clone, Copy, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Table5_1 {
    FloatingPoint = 0,
    Integer,
    Missing = 255,
}
