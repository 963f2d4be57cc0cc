use super::Projection;
use crate::cartesian::ProjectedCoord;
use crate::geo::{Ellipsoid, GeoCoord, ProjectionParams};

/// Transverse Mercator projection (series expansion after Snyder).
///
/// Accurate to millimeters within a few degrees of the central meridian, which covers the zone
/// widths of national grids and UTM.
#[derive(Debug, Clone, Copy)]
pub struct TransverseMercator {
    params: ProjectionParams,
    a: f64,
    e2: f64,
    ep2: f64,
    m0: f64,
}

impl TransverseMercator {
    /// Creates a new projection on the given ellipsoid.
    pub fn new(ellipsoid: Ellipsoid, params: ProjectionParams) -> Self {
        let e2 = ellipsoid.eccentricity_sq();
        let mut projection = Self {
            params,
            a: ellipsoid.semimajor(),
            e2,
            ep2: e2 / (1.0 - e2),
            m0: 0.0,
        };
        projection.m0 = projection.meridian_arc(params.latitude_of_origin.to_radians());
        projection
    }

    /// Distance along the meridian from the equator to the latitude `phi`.
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }
}

impl Projection for TransverseMercator {
    type InPoint = GeoCoord;
    type OutPoint = ProjectedCoord;

    fn project(&self, input: &GeoCoord) -> Option<ProjectedCoord> {
        let k0 = self.params.scale_factor;
        let ep2 = self.ep2;
        let phi = input.lat_rad();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = self.a / (1.0 - self.e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = (input.lon_rad() - self.params.central_meridian.to_radians()) * cos_phi;
        let m = self.meridian_arc(phi);

        let x = k0
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);
        let y = k0
            * (m - self.m0
                + n * tan_phi
                    * (a * a / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6)
                            / 720.0));

        let easting = x + self.params.false_easting;
        let northing = y + self.params.false_northing;
        if easting.is_finite() && northing.is_finite() {
            Some(ProjectedCoord::new(northing, easting))
        } else {
            None
        }
    }

    fn unproject(&self, input: &ProjectedCoord) -> Option<GeoCoord> {
        let k0 = self.params.scale_factor;
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = self.ep2;
        let x = input.easting() - self.params.false_easting;
        let y = input.northing() - self.params.false_northing;

        let m = self.m0 + y / k0;
        let mu = m / (self.a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = phi1.tan();
        let c1 = ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let w = 1.0 - e2 * sin_phi1 * sin_phi1;
        let n1 = self.a / w.sqrt();
        let r1 = self.a * (1.0 - e2) / w.powf(1.5);
        let d = x / (n1 * k0);

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let lam = self.params.central_meridian.to_radians()
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos_phi1;

        let result = GeoCoord::latlon(phi.to_degrees(), lam.to_degrees());
        result.is_finite().then_some(result)
    }
}
