use nalgebra::Vector3;

use crate::geo::{Ellipsoid, GeoCoord};

/// Moves a coordinate from the `source` ellipsoid to the `target` one by translating its
/// earth-centered position by `offset` meters.
///
/// Heights are ignored: the point is placed on the source ellipsoid surface and the result is
/// read back as geodetic latitude and longitude on the target ellipsoid.
pub(super) fn translate(
    coord: GeoCoord,
    source: &Ellipsoid,
    target: &Ellipsoid,
    offset: [f64; 3],
) -> GeoCoord {
    let position = geocentric_position(coord, source) - Vector3::from(offset);

    let equatorial = position.x.hypot(position.y);
    let psi = position.z.atan2(equatorial);
    let lat = (psi.tan() / (1.0 - target.eccentricity_sq())).atan();
    let lon = position.y.atan2(position.x);

    GeoCoord::latlon(lat.to_degrees(), lon.to_degrees())
}

fn geocentric_position(coord: GeoCoord, ellipsoid: &Ellipsoid) -> Vector3<f64> {
    let a = ellipsoid.semimajor();
    let b = ellipsoid.semiminor();
    let lat = coord.lat();
    let lon = coord.lon();

    // Geocentric latitude. Exact on the equator and at the poles, where tan() misbehaves.
    let psi = if lat == 0.0 || lat.abs() == 90.0 {
        coord.lat_rad()
    } else {
        ((1.0 - ellipsoid.eccentricity_sq()) * coord.lat_rad().tan()).atan()
    };
    let tan_psi = psi.tan();
    let radial = b * b + a * a * tan_psi * tan_psi;

    let (mut x, mut y) = if lon.abs() == 90.0 {
        (0.0, (a * b / radial.sqrt()).abs())
    } else {
        let tan_lam = coord.lon_rad().tan();
        let x = (a * b / ((1.0 + tan_lam * tan_lam) * radial).sqrt()).abs();
        (x, (x * tan_lam).abs())
    };
    if lon.abs() > 90.0 {
        x = -x;
    }
    if lon < 0.0 {
        y = -y;
    }

    let z = if lat == 90.0 {
        b
    } else if lat == -90.0 {
        -b
    } else {
        tan_psi * (a * a * b * b / radial).sqrt()
    };

    Vector3::new(x, y, z)
}
