use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::Projection;
use crate::cartesian::ProjectedCoord;
use crate::geo::{Ellipsoid, GeoCoord, ProjectionParams};

/// Latitudes are clamped to this value before projecting, the poles are at infinity.
const MAX_LATITUDE: f64 = 89.9;

const MAX_ITERATIONS: usize = 15;
const CONVERGENCE: f64 = 1e-12;

/// Ellipsoidal Mercator projection.
#[derive(Debug, Clone, Copy)]
pub struct Mercator {
    ellipsoid: Ellipsoid,
    params: ProjectionParams,
}

impl Mercator {
    /// Creates a new projection on the given ellipsoid.
    pub fn new(ellipsoid: Ellipsoid, params: ProjectionParams) -> Self {
        Self { ellipsoid, params }
    }

    fn radius(&self) -> f64 {
        self.ellipsoid.semimajor() * self.params.scale_factor
    }
}

impl Default for Mercator {
    fn default() -> Self {
        Self::new(Ellipsoid::WGS84, ProjectionParams::default())
    }
}

impl Projection for Mercator {
    type InPoint = GeoCoord;
    type OutPoint = ProjectedCoord;

    fn project(&self, input: &GeoCoord) -> Option<ProjectedCoord> {
        let e = self.ellipsoid.eccentricity();
        let phi = input.lat().clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let es = e * phi.sin();

        let x = self.radius() * (input.lon_rad() - self.params.central_meridian.to_radians());
        let y = self.radius()
            * ((FRAC_PI_4 + phi / 2.0).tan() * ((1.0 - es) / (1.0 + es)).powf(e / 2.0)).ln();

        let easting = x + self.params.false_easting;
        let northing = y + self.params.false_northing;
        if easting.is_finite() && northing.is_finite() {
            Some(ProjectedCoord::new(northing, easting))
        } else {
            None
        }
    }

    fn unproject(&self, input: &ProjectedCoord) -> Option<GeoCoord> {
        let e = self.ellipsoid.eccentricity();
        let t = (-(input.northing() - self.params.false_northing) / self.radius()).exp();

        let mut phi = FRAC_PI_2 - 2.0 * t.atan();
        for _ in 0..MAX_ITERATIONS {
            let es = e * phi.sin();
            let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(e / 2.0)).atan();
            let delta = (next - phi).abs();
            phi = next;
            if delta < CONVERGENCE {
                break;
            }
        }

        let lon = (input.easting() - self.params.false_easting) / self.radius()
            + self.params.central_meridian.to_radians();

        let result = GeoCoord::latlon(phi.to_degrees(), lon.to_degrees());
        result.is_finite().then_some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latlon;
    use approx::assert_abs_diff_eq;

    #[test]
    fn project_one_degree() {
        let projection = Mercator::default();
        let projected = projection.project(&latlon!(1.0, 1.0)).expect("finite");
        assert_abs_diff_eq!(projected.easting(), 111_319.49, epsilon = 0.01);
        assert_abs_diff_eq!(projected.northing(), 110_579.97, epsilon = 0.01);
    }

    #[test]
    fn round_trip() {
        let projections = [
            Mercator::default(),
            Mercator::new(
                Ellipsoid::INTERNATIONAL_1924,
                ProjectionParams::default().with_central_meridian(10.0),
            ),
        ];
        for projection in projections {
            for lat in [-60.0, -10.0, 0.0, 0.5, 30.0, 60.2, 70.0] {
                for lon in [-3.0, 0.0, 2.0, 12.5] {
                    let point = latlon!(lat, lon);
                    let back = projection
                        .unproject(&projection.project(&point).expect("finite"))
                        .expect("finite");
                    assert_abs_diff_eq!(back.lat(), lat, epsilon = 1e-8);
                    assert_abs_diff_eq!(back.lon(), lon, epsilon = 1e-8);
                }
            }
        }
    }

    #[test]
    fn pole_is_clamped() {
        let projection = Mercator::default();
        let pole = projection.project(&latlon!(90.0, 0.0)).expect("finite");
        let clamped = projection.project(&latlon!(MAX_LATITUDE, 0.0)).expect("finite");
        assert_eq!(pole, clamped);
    }

    #[test]
    fn false_origin() {
        let params = ProjectionParams::default()
            .with_false_easting(1000.0)
            .with_false_northing(-500.0);
        let projection = Mercator::new(Ellipsoid::WGS84, params);
        let origin = projection.project(&latlon!(0.0, 0.0)).expect("finite");
        assert_abs_diff_eq!(origin.easting(), 1000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(origin.northing(), -500.0, epsilon = 1e-9);
    }
}
