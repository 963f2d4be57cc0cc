/// Reference ellipsoid given by its semimajor axis and inverse flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    name: &'static str,
    semimajor: f64,
    inv_flattening: f64,
}

impl Ellipsoid {
    /// Clarke 1866, used by NAD27.
    pub const CLARKE_1866: Self = Self::new("Clarke 1866", 6_378_206.4, 294.978_698_2);
    /// GRS 80, used by NAD83.
    pub const GRS80: Self = Self::new("GRS 80", 6_378_137.0, 298.257_222_101);
    /// WGS 84.
    pub const WGS84: Self = Self::new("WGS 84", 6_378_137.0, 298.257_223_563);
    /// International 1924 (Hayford).
    pub const INTERNATIONAL_1924: Self = Self::new("International 1924", 6_378_388.0, 297.0);

    /// Creates a new ellipsoid.
    pub const fn new(name: &'static str, semimajor: f64, inv_flattening: f64) -> Self {
        Self {
            name,
            semimajor,
            inv_flattening,
        }
    }

    /// Name of the ellipsoid.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Semimajor axis in meters.
    pub fn semimajor(&self) -> f64 {
        self.semimajor
    }

    /// Inverse flattening.
    pub fn inv_flattening(&self) -> f64 {
        self.inv_flattening
    }

    /// Flattening.
    pub fn flattening(&self) -> f64 {
        1.0 / self.inv_flattening
    }

    /// Semiminor axis in meters.
    pub fn semiminor(&self) -> f64 {
        self.semimajor * (1.0 - self.flattening())
    }

    /// First eccentricity squared.
    pub fn eccentricity_sq(&self) -> f64 {
        let f = self.flattening();
        f * (2.0 - f)
    }

    /// First eccentricity.
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity_sq().sqrt()
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wgs84_axes() {
        let e = Ellipsoid::WGS84;
        assert_relative_eq!(e.semiminor(), 6_356_752.314_245, epsilon = 1e-3);
        assert_relative_eq!(e.eccentricity_sq(), 0.006_694_379_990_14, epsilon = 1e-12);
    }
}
