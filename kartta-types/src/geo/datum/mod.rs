use crate::geo::{Ellipsoid, GeoCoord};

mod geocentric;
mod polynomial;

/// Method used to convert coordinates between a datum and WGS84.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftMethod {
    /// The datum is WGS84 itself.
    Identity,
    /// Three parameter geocentric translation (Molodensky style).
    Geocentric,
    /// Locally fitted polynomial correction for the Finnish KKJ datum.
    KkjPolynomial,
}

/// Geodetic datum: an ellipsoid plus the offset of its center relative to WGS84.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datum {
    name: &'static str,
    ellipsoid: Ellipsoid,
    shift: [f64; 3],
    method: ShiftMethod,
}

impl Datum {
    /// WGS 84.
    pub const WGS84: Self = Self {
        name: "WGS 84",
        ellipsoid: Ellipsoid::WGS84,
        shift: [0.0, 0.0, 0.0],
        method: ShiftMethod::Identity,
    };

    /// Finnish KKJ datum (Kartastokoordinaattijärjestelmä) on the Hayford ellipsoid.
    pub const FINLAND_HAYFORD: Self = Self {
        name: "Finland Hayford",
        ellipsoid: Ellipsoid::INTERNATIONAL_1924,
        shift: [-78.0, -231.0, -97.0],
        method: ShiftMethod::KkjPolynomial,
    };

    /// European 1950.
    pub const EUROPEAN_1950: Self =
        Self::geocentric("European 1950", Ellipsoid::INTERNATIONAL_1924, [-87.0, -98.0, -121.0]);
    /// European 1979.
    pub const EUROPEAN_1979: Self =
        Self::geocentric("European 1979", Ellipsoid::INTERNATIONAL_1924, [-86.0, -98.0, -119.0]);
    /// North American 1983.
    pub const NAD83: Self = Self::geocentric("NAD83", Ellipsoid::GRS80, [0.0, 0.0, 0.0]);

    /// Creates a datum converted to and from WGS84 with a geocentric translation.
    ///
    /// `shift` is `[dx, dy, dz]` in meters: the position of the datum's ellipsoid center
    /// relative to the WGS84 center.
    pub const fn geocentric(name: &'static str, ellipsoid: Ellipsoid, shift: [f64; 3]) -> Self {
        Self {
            name,
            ellipsoid,
            shift,
            method: ShiftMethod::Geocentric,
        }
    }

    /// Name of the datum.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ellipsoid of the datum.
    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    /// Offset `[dx, dy, dz]` relative to WGS84 in meters.
    pub fn shift(&self) -> [f64; 3] {
        self.shift
    }

    /// Conversion method used for this datum.
    pub fn method(&self) -> ShiftMethod {
        self.method
    }

    /// Returns true if this is the WGS84 datum.
    pub fn is_wgs84(&self) -> bool {
        self.method == ShiftMethod::Identity
    }

    /// Converts a coordinate given in this datum into WGS84.
    pub fn to_wgs84(&self, coord: GeoCoord) -> GeoCoord {
        match self.method {
            ShiftMethod::Identity => coord,
            ShiftMethod::KkjPolynomial => polynomial::kkj_to_wgs84(coord),
            ShiftMethod::Geocentric => geocentric::translate(
                coord,
                &self.ellipsoid,
                &Ellipsoid::WGS84,
                self.shift.map(|v| -v),
            ),
        }
    }

    /// Converts a WGS84 coordinate into this datum.
    pub fn from_wgs84(&self, coord: GeoCoord) -> GeoCoord {
        match self.method {
            ShiftMethod::Identity => coord,
            ShiftMethod::KkjPolynomial => polynomial::wgs84_to_kkj(coord),
            ShiftMethod::Geocentric => {
                geocentric::translate(coord, &Ellipsoid::WGS84, &self.ellipsoid, self.shift)
            }
        }
    }
}

impl Default for Datum {
    fn default() -> Self {
        Self::WGS84
    }
}

/// Converts a geographic coordinate from one datum into another, going through WGS84.
pub fn datum_shift(coord: GeoCoord, from: &Datum, to: &Datum) -> GeoCoord {
    if from == to {
        return coord;
    }

    to.from_wgs84(from.to_wgs84(coord))
}

/// Lookup table of known datums.
///
/// The table is plain data: build it once, hand it to whatever needs to resolve datum names.
#[derive(Debug, Clone, PartialEq)]
pub struct DatumTable {
    datums: Vec<Datum>,
}

impl DatumTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self { datums: Vec::new() }
    }

    /// Table with WGS84 and the commonly used historical datums.
    pub fn standard() -> Self {
        let nad27 = |name, shift| Datum::geocentric(name, Ellipsoid::CLARKE_1866, shift);
        Self {
            datums: vec![
                Datum::WGS84,
                Datum::FINLAND_HAYFORD,
                Datum::EUROPEAN_1950,
                Datum::EUROPEAN_1979,
                nad27("NAD27 Alaska", [-5.0, 135.0, 172.0]),
                nad27("NAD27 Bahamas", [-4.0, 154.0, 178.0]),
                nad27("NAD27 Canada", [-10.0, 158.0, 187.0]),
                nad27("NAD27 Canal Zone", [0.0, 125.0, 201.0]),
                nad27("NAD27 Caribbean", [-7.0, 152.0, 178.0]),
                nad27("NAD27 Central", [0.0, 125.0, 194.0]),
                nad27("NAD27 CONUS", [-8.0, 160.0, 176.0]),
                nad27("NAD27 Cuba", [-9.0, 152.0, 178.0]),
                nad27("NAD27 Greenland", [11.0, 114.0, 195.0]),
                nad27("NAD27 Mexico", [-12.0, 130.0, 190.0]),
                nad27("NAD27 San Salvador", [1.0, 140.0, 165.0]),
                Datum::NAD83,
            ],
        }
    }

    /// Adds a datum to the table.
    pub fn with_datum(mut self, datum: Datum) -> Self {
        self.datums.push(datum);
        self
    }

    /// Finds a datum by name, ignoring ASCII case.
    pub fn find(&self, name: &str) -> Option<&Datum> {
        self.datums
            .iter()
            .find(|datum| datum.name.eq_ignore_ascii_case(name))
    }

    /// Iterates over all datums in the table.
    pub fn iter(&self) -> impl Iterator<Item = &Datum> + '_ {
        self.datums.iter()
    }

    /// Number of datums.
    pub fn len(&self) -> usize {
        self.datums.len()
    }

    /// Returns true if the table has no datums.
    pub fn is_empty(&self) -> bool {
        self.datums.is_empty()
    }
}

impl Default for DatumTable {
    fn default() -> Self {
        Self::standard()
    }
}
