use crate::geo::GeoCoord;

// Coefficients in arc seconds for the terms 1, lat, lon, lat², lat·lon, lon².
const WGS84_TO_KKJ_LAT: [f64; 6] = [
    -1.247_66,
    0.269_941,
    -0.191_342,
    -0.003_560_86,
    0.001_223_53,
    0.000_335_456,
];
const WGS84_TO_KKJ_LON: [f64; 6] = [
    28.6008,
    -1.141_39,
    0.581_329,
    0.015_237_6,
    -0.011_816_6,
    -0.000_826_201,
];
const KKJ_TO_WGS84_LAT: [f64; 6] = [
    1.248_67,
    -0.269_982,
    0.191_330,
    0.003_561_19,
    -0.001_223_12,
    -0.000_335_514,
];
const KKJ_TO_WGS84_LON: [f64; 6] = [
    -28.6111,
    1.141_83,
    -0.581_428,
    -0.015_242_1,
    0.011_817_7,
    0.000_826_646,
];

pub(super) fn wgs84_to_kkj(coord: GeoCoord) -> GeoCoord {
    apply(coord, &WGS84_TO_KKJ_LAT, &WGS84_TO_KKJ_LON)
}

pub(super) fn kkj_to_wgs84(coord: GeoCoord) -> GeoCoord {
    apply(coord, &KKJ_TO_WGS84_LAT, &KKJ_TO_WGS84_LON)
}

fn apply(coord: GeoCoord, lat_coefs: &[f64; 6], lon_coefs: &[f64; 6]) -> GeoCoord {
    let lat = coord.lat();
    let lon = coord.lon();
    let terms = [1.0, lat, lon, lat * lat, lat * lon, lon * lon];
    let correction = |coefs: &[f64; 6]| -> f64 {
        coefs.iter().zip(terms).map(|(c, t)| c * t).sum::<f64>() / 3600.0
    };

    GeoCoord::latlon(lat + correction(lat_coefs), lon + correction(lon_coefs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latlon;
    use approx::assert_abs_diff_eq;

    #[test]
    fn helsinki_offset() {
        let kkj = wgs84_to_kkj(latlon!(60.2, 24.9));
        assert_abs_diff_eq!(kkj.lat(), 60.199_826_585, epsilon = 1e-8);
        assert_abs_diff_eq!(kkj.lon(), 24.903_155_774, epsilon = 1e-8);
    }
}
