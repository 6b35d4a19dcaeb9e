use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::error::GribError;

const TANGENT_CONE_EPSILON: f64 = 1e-10;
const LATITUDE_ITERATIONS: usize = 15;

/// Lambert conformal conic projection on a sphere or an ellipsoid of
/// revolution, with one or two standard parallels.
///
/// Projected coordinates are in metres with the origin at the intersection of
/// the central meridian and the latitude of origin.
///
/// # Examples
///
/// ```
/// use gribpoint::LambertConformal;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let proj = LambertConformal::new((6371229., 6371229.), 30., 60., 30., 105.)?;
///     let (x, y) = proj.project(30., 105.);
///     assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
///
///     let (lat, lon) = proj.unproject(100_000., 200_000.);
///     let (x, y) = proj.project(lat, lon);
///     assert!((x - 100_000.).abs() < 1e-6 && (y - 200_000.).abs() < 1e-6);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertConformal {
    e: f64,
    n: f64,
    af: f64,
    rho0: f64,
    lon0: f64,
}

impl LambertConformal {
    /// Builds the projection from the semi-axes `(a, b)` in metres and the
    /// standard parallels, latitude of origin and central meridian in
    /// degrees.
    pub fn new(
        (a, b): (f64, f64),
        latin1: f64,
        latin2: f64,
        lat0: f64,
        lon0: f64,
    ) -> Result<Self, GribError> {
        if !(a.is_finite() && b.is_finite() && a > 0. && b > 0. && b <= a) {
            return Err(GribError::InvalidValue(format!(
                "semi-axes of the Earth ({a}, {b})"
            )));
        }
        for lat in [latin1, latin2, lat0] {
            if !(lat.is_finite() && lat.abs() <= 90.) {
                return Err(GribError::InvalidValue(format!("latitude {lat}")));
            }
        }

        let e = (1. - (b * b) / (a * a)).sqrt();
        let phi1 = latin1.to_radians();
        let phi2 = latin2.to_radians();
        let m1 = m(e, phi1);
        let t1 = t(e, phi1);
        let n = if (phi1 - phi2).abs() < TANGENT_CONE_EPSILON {
            phi1.sin()
        } else {
            (m1.ln() - m(e, phi2).ln()) / (t1.ln() - t(e, phi2).ln())
        };
        if !n.is_finite() || n.abs() < TANGENT_CONE_EPSILON {
            return Err(GribError::InvalidValue(format!(
                "standard parallels {latin1} and {latin2} do not define a cone"
            )));
        }

        let f = m1 / (n * t1.powf(n));
        let af = a * f;
        if !af.is_finite() {
            return Err(GribError::InvalidValue(format!(
                "standard parallels {latin1} and {latin2} do not define a cone"
            )));
        }
        let rho0 = af * t(e, lat0.to_radians()).powf(n);

        Ok(Self {
            e,
            n,
            af,
            rho0,
            lon0: lon0.to_radians(),
        })
    }

    /// Returns the cone constant `n`.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    pub fn eccentricity(&self) -> f64 {
        self.e
    }

    /// Projects a geographic coordinate in degrees into `(x, y)` in metres.
    pub fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let rho = self.af * t(self.e, lat.to_radians()).powf(self.n);
        let theta = self.n * normalize_radians(lon.to_radians() - self.lon0);
        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }

    /// Returns the geographic coordinate in degrees of `(x, y)` in metres.
    ///
    /// The longitude is normalised to `[-180, 180)`.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let sign = self.n.signum();
        let dy = self.rho0 - y;
        let rho = sign * x.hypot(dy);
        if rho == 0. {
            return (sign * 90., normalize_degrees(self.lon0.to_degrees()));
        }
        let theta = (sign * x).atan2(sign * dy);

        let t = (rho / self.af).powf(1. / self.n);
        let half_e = self.e / 2.;
        let mut phi = FRAC_PI_2 - 2. * t.atan();
        for _ in 0..LATITUDE_ITERATIONS {
            let e_sin = self.e * phi.sin();
            phi = FRAC_PI_2 - 2. * (t * ((1. - e_sin) / (1. + e_sin)).powf(half_e)).atan();
        }

        let lon = theta / self.n + self.lon0;
        (phi.to_degrees(), normalize_degrees(lon.to_degrees()))
    }
}

fn m(e: f64, phi: f64) -> f64 {
    let e_sin = e * phi.sin();
    phi.cos() / (1. - e_sin * e_sin).sqrt()
}

fn t(e: f64, phi: f64) -> f64 {
    let e_sin = e * phi.sin();
    (FRAC_PI_4 - phi / 2.).tan() / ((1. - e_sin) / (1. + e_sin)).powf(e / 2.)
}

fn normalize_radians(angle: f64) -> f64 {
    let angle = (angle + PI).rem_euclid(2. * PI) - PI;
    if angle == -PI { PI } else { angle }
}

fn normalize_degrees(deg: f64) -> f64 {
    (deg + 180.).rem_euclid(360.) - 180.
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPHERE: (f64, f64) = (6371229., 6371229.);
    const WGS84: (f64, f64) = (6378137., 6356752.314245);

    #[test]
    fn origin_projects_to_zero() -> Result<(), Box<dyn std::error::Error>> {
        let proj = LambertConformal::new(WGS84, 38.5, 38.5, 38.5, 262.5)?;
        let (x, y) = proj.project(38.5, -97.5);
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn tangent_cone_constant_is_sine_of_standard_parallel() -> Result<(), Box<dyn std::error::Error>> {
        let proj = LambertConformal::new(SPHERE, 25., 25., 25., 265.)?;
        assert!((proj.cone_constant() - 25_f64.to_radians().sin()).abs() < 1e-15);
        assert_eq!(proj.eccentricity(), 0.);
        Ok(())
    }

    #[test]
    fn secant_cone_constant_on_sphere() -> Result<(), Box<dyn std::error::Error>> {
        let proj = LambertConformal::new(SPHERE, 30., 60., 30., 105.)?;
        let (phi1, phi2) = (30_f64.to_radians(), 60_f64.to_radians());
        let expected = (phi1.cos() / phi2.cos()).ln()
            / ((FRAC_PI_4 + phi2 / 2.).tan() / (FRAC_PI_4 + phi1 / 2.).tan()).ln();
        assert!((proj.cone_constant() - expected).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn sphere_matches_closed_form() -> Result<(), Box<dyn std::error::Error>> {
        let radius = SPHERE.0;
        for (latin1, latin2, lat0, lon0) in [(38.5, 38.5, 38.5, 262.5), (30., 60., 30., 105.)] {
            let proj = LambertConformal::new(SPHERE, latin1, latin2, lat0, lon0)?;
            let n = proj.cone_constant();
            let phi1 = f64::to_radians(latin1);
            let f = phi1.cos() * (FRAC_PI_4 + phi1 / 2.).tan().powf(n) / n;
            let rho_of = |lat: f64| radius * f / (FRAC_PI_4 + lat.to_radians() / 2.).tan().powf(n);

            for (lat, lon) in [(21.138123_f64, -122.719528_f64), (47.842195, -60.917193), (0., 105.)] {
                let rho = rho_of(lat);
                let theta = n * normalize_radians((lon - lon0).to_radians());
                let expected = (rho * theta.sin(), rho_of(lat0) - rho * theta.cos());
                let (x, y) = proj.project(lat, lon);
                assert!((x - expected.0).abs() < 1e-6, "x at ({lat}, {lon})");
                assert!((y - expected.1).abs() < 1e-6, "y at ({lat}, {lon})");
            }
        }
        Ok(())
    }

    macro_rules! test_round_trip {
        ($(($name:ident, $radii:expr, $latin1:expr, $latin2:expr, $lat0:expr, $lon0:expr),)*) => ($(
            #[test]
            fn $name() -> Result<(), Box<dyn std::error::Error>> {
                let proj = LambertConformal::new($radii, $latin1, $latin2, $lat0, $lon0)?;
                for lat in [-60., -20., 0., 15.5, 45., 70.] {
                    for lon in [-170., -97.5, 0., 0.078307, 105., 179.] {
                        let (x, y) = proj.project(lat, lon);
                        let (lat2, lon2) = proj.unproject(x, y);
                        assert!((lat - lat2).abs() < 1e-9, "lat {lat} -> {lat2}");
                        assert!((lon - lon2).abs() < 1e-9, "lon {lon} -> {lon2}");
                    }
                }
                Ok(())
            }
        )*);
    }

    test_round_trip! {
        (round_trip_on_sphere_with_secant_cone, SPHERE, 30., 60., 30., 105.),
        (round_trip_on_sphere_with_tangent_cone, SPHERE, 25., 25., 25., 265.),
        (round_trip_on_ellipsoid, WGS84, 33., 45., 40., 262.5),
        (round_trip_on_southern_cone, WGS84, -30., -60., -45., 140.),
    }

    #[test]
    fn longitudes_are_normalized() -> Result<(), Box<dyn std::error::Error>> {
        let proj = LambertConformal::new(SPHERE, 25., 25., 25., 265.)?;
        let (x, y) = proj.project(20.19, 238.449996);
        let (_, lon) = proj.unproject(x, y);
        assert!((lon - -121.550004).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn pole_of_northern_cone() -> Result<(), Box<dyn std::error::Error>> {
        let proj = LambertConformal::new(SPHERE, 30., 60., 30., 105.)?;
        let (x, y) = proj.project(90., 0.);
        let (lat, lon) = proj.unproject(x, y);
        assert_eq!(lat, 90.);
        assert!((lon - 105.).abs() < 1e-12);
        Ok(())
    }

    macro_rules! test_invalid_projection {
        ($(($name:ident, $radii:expr, $latin1:expr, $latin2:expr),)*) => ($(
            #[test]
            fn $name() {
                let result = LambertConformal::new($radii, $latin1, $latin2, 0., 0.);
                assert!(matches!(result, Err(GribError::InvalidValue(_))));
            }
        )*);
    }

    test_invalid_projection! {
        (equator_is_not_a_cone, SPHERE, 0., 0.),
        (symmetric_parallels_are_not_a_cone, SPHERE, 30., -30.),
        (pole_is_not_a_cone, SPHERE, 90., 90.),
        (zero_radius_is_invalid, (0., 0.), 30., 60.),
        (minor_axis_longer_than_major_is_invalid, (6356752., 6378137.), 30., 60.),
        (latitude_out_of_range_is_invalid, SPHERE, 30., 91.),
    }
}
