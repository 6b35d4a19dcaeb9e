use crate::{
    codetables::{Code, Table3_2},
    helpers::read_as,
    regulation::{GribInt, is_missing_value},
};

/// The shape of the Earth as given in octets 15-30 of grid definition
/// templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarthShapeDefinition {
    pub shape_of_the_earth: u8,
    pub scale_factor_of_radius_of_spherical_earth: u8,
    pub scaled_value_of_radius_of_spherical_earth: u32,
    pub scale_factor_of_earth_major_axis: u8,
    pub scaled_value_of_earth_major_axis: u32,
    pub scale_factor_of_earth_minor_axis: u8,
    pub scaled_value_of_earth_minor_axis: u32,
}

impl EarthShapeDefinition {
    pub fn shape(&self) -> Code<Table3_2, u8> {
        Table3_2::try_from(self.shape_of_the_earth).into()
    }

    /// Returns the major and minor semi-axes of the Earth in metres.
    ///
    /// Radii specified by the data producer are decoded as
    /// `scaled_value * 10^-scale_factor`. `None` is returned for shapes this
    /// crate does not know and for producer-specified shapes whose values are
    /// missing.
    ///
    /// # Examples
    ///
    /// ```
    /// let earth = gribpoint::EarthShapeDefinition {
    ///     shape_of_the_earth: 1,
    ///     scale_factor_of_radius_of_spherical_earth: 1,
    ///     scaled_value_of_radius_of_spherical_earth: 63712290,
    ///     scale_factor_of_earth_major_axis: 0xff,
    ///     scaled_value_of_earth_major_axis: 0xffffffff,
    ///     scale_factor_of_earth_minor_axis: 0xff,
    ///     scaled_value_of_earth_minor_axis: 0xffffffff,
    /// };
    /// assert_eq!(earth.radii(), Some((6_371_229., 6_371_229.)));
    /// ```
    pub fn radii(&self) -> Option<(f64, f64)> {
        let Code::Name(shape) = self.shape() else {
            return None;
        };
        let radii = match shape {
            Table3_2::Sphere6367470 => (6367470.0, 6367470.0),
            Table3_2::SphereSpecified => {
                let radius = scaled(
                    self.scale_factor_of_radius_of_spherical_earth,
                    self.scaled_value_of_radius_of_spherical_earth,
                )?;
                (radius, radius)
            }
            Table3_2::Iau1965 => (6378160.0, 6356775.0),
            Table3_2::OblateSpecifiedKm => {
                let (major, minor) = self.radii_defined()?;
                (major * 1000., minor * 1000.)
            }
            Table3_2::Grs80 => (6378137.0, 6356752.314),
            Table3_2::Wgs84 | Table3_2::Wgs84Geomagnetic => (6378137.0, 6356752.3142),
            Table3_2::Sphere6371229 => (6371229.0, 6371229.0),
            Table3_2::OblateSpecifiedM => self.radii_defined()?,
            Table3_2::Sphere6371200 => (6371200.0, 6371200.0),
            Table3_2::Osgb1936 => (6377563.396, 6356256.909),
            Table3_2::Sun | Table3_2::Missing => return None,
        };
        Some(radii)
    }

    fn radii_defined(&self) -> Option<(f64, f64)> {
        let major = scaled(
            self.scale_factor_of_earth_major_axis,
            self.scaled_value_of_earth_major_axis,
        )?;
        let minor = scaled(
            self.scale_factor_of_earth_minor_axis,
            self.scaled_value_of_earth_minor_axis,
        )?;
        Some((major, minor))
    }

    pub(crate) fn from_buf(buf: &[u8]) -> Self {
        let shape_of_the_earth = read_as!(u8, buf, 0);
        let scale_factor_of_radius_of_spherical_earth = read_as!(u8, buf, 1);
        let scaled_value_of_radius_of_spherical_earth = read_as!(u32, buf, 2);
        let scale_factor_of_earth_major_axis = read_as!(u8, buf, 6);
        let scaled_value_of_earth_major_axis = read_as!(u32, buf, 7);
        let scale_factor_of_earth_minor_axis = read_as!(u8, buf, 11);
        let scaled_value_of_earth_minor_axis = read_as!(u32, buf, 12);
        Self {
            shape_of_the_earth,
            scale_factor_of_radius_of_spherical_earth,
            scaled_value_of_radius_of_spherical_earth,
            scale_factor_of_earth_major_axis,
            scaled_value_of_earth_major_axis,
            scale_factor_of_earth_minor_axis,
            scaled_value_of_earth_minor_axis,
        }
    }
}

// Scale factors are signed.
fn scaled(factor: u8, value: u32) -> Option<f64> {
    if is_missing_value(factor.into(), 8) || is_missing_value(value.into(), 32) {
        return None;
    }
    let factor: i8 = factor.as_grib_int();
    let value = f64::from(value);
    let scaled = if factor >= 0 {
        value / 10_f64.powi(factor.into())
    } else {
        value * 10_f64.powi(-i32::from(factor))
    };
    Some(scaled)
}
