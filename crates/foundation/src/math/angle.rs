//! Angle conventions for the celestial sphere.
//!
//! Conventions:
//! - Right ascension and declination are stored in degrees.
//! - RA is periodic: canonical values live in `[0, 360)`.
//! - Angular deltas along RA are wrapped to `(-180, 180]` so that the 0/360
//!   seam never produces a discontinuity.

use serde::{Deserialize, Serialize};

/// Degrees of right ascension per hour.
pub const DEGREES_PER_HOUR: f64 = 15.0;

/// A position on the celestial sphere in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyCoord {
    pub ra: f64,
    pub dec: f64,
}

impl SkyCoord {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// Same position with RA folded into `[0, 360)` and Dec clamped to `[-90, 90]`.
    pub fn normalized(self) -> Self {
        Self {
            ra: normalize_ra(self.ra),
            dec: self.dec.clamp(-90.0, 90.0),
        }
    }

    /// Great-circle distance to `other`, in degrees.
    pub fn separation(self, other: SkyCoord) -> f64 {
        angular_separation(self.ra, self.dec, other.ra, other.dec)
    }
}

#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

#[inline]
pub fn hours_to_deg(hours: f64) -> f64 {
    hours * DEGREES_PER_HOUR
}

#[inline]
pub fn deg_to_hours(deg: f64) -> f64 {
    deg / DEGREES_PER_HOUR
}

/// Fold an RA value into `[0, 360)`.
///
/// `rem_euclid` can round tiny negative inputs up to exactly `360.0`; that
/// case is mapped back to `0.0`.
pub fn normalize_ra(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    if r >= 360.0 { 0.0 } else { r }
}

/// Shortest signed angular delta, in `(-180, 180]`.
///
/// `wrap_delta(a - b)` is how far `a` lies east of `b` along RA.
pub fn wrap_delta(delta_deg: f64) -> f64 {
    let w = (delta_deg + 180.0).rem_euclid(360.0) - 180.0;
    if w <= -180.0 { 180.0 } else { w }
}

/// Great-circle separation between two sky positions, in degrees.
///
/// Uses the haversine form, which stays accurate for the small separations
/// that dominate star-map work.
pub fn angular_separation(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let (ra1, dec1, ra2, dec2) = (
        ra1.to_radians(),
        dec1.to_radians(),
        ra2.to_radians(),
        dec2.to_radians(),
    );
    let s_dec = ((dec2 - dec1) * 0.5).sin();
    let s_ra = ((ra2 - ra1) * 0.5).sin();
    let h = s_dec * s_dec + dec1.cos() * dec2.cos() * s_ra * s_ra;
    (2.0 * h.sqrt().min(1.0).asin()).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::{
        SkyCoord, angular_separation, deg_to_hours, hours_to_deg, normalize_ra, wrap_delta,
    };

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn wrap_of_self_difference_is_zero() {
        let mut ra = 0.0;
        while ra < 360.0 {
            assert_eq!(wrap_delta(ra - ra), 0.0);
            ra += 0.37;
        }
    }

    #[test]
    fn wrap_takes_the_short_way_across_the_seam() {
        assert_close(wrap_delta(5.0 - 355.0), 10.0, 1e-12);
        assert_close(wrap_delta(355.0 - 5.0), -10.0, 1e-12);
        assert_eq!(wrap_delta(180.0), 180.0);
        assert_eq!(wrap_delta(-180.0), 180.0);
        assert_close(wrap_delta(540.0 + 30.0), -150.0, 1e-12);
    }

    #[test]
    fn normalize_ra_stays_in_range() {
        for v in [-720.5, -360.0, -1.0, -1e-20, 0.0, 359.999, 360.0, 725.0] {
            let r = normalize_ra(v);
            assert!((0.0..360.0).contains(&r), "{v} -> {r}");
        }
        assert_close(normalize_ra(-90.0), 270.0, 1e-12);
        assert_close(normalize_ra(725.0), 5.0, 1e-12);
    }

    #[test]
    fn hours_and_degrees() {
        assert_eq!(hours_to_deg(24.0), 360.0);
        assert_eq!(deg_to_hours(90.0), 6.0);
    }

    #[test]
    fn separation_known_values() {
        assert_close(angular_separation(0.0, 0.0, 90.0, 0.0), 90.0, 1e-9);
        assert_close(angular_separation(10.0, 90.0, 200.0, 90.0), 0.0, 1e-9);
        assert_close(angular_separation(355.0, 0.0, 5.0, 0.0), 10.0, 1e-9);
        let a = SkyCoord::new(0.0, -45.0);
        let b = SkyCoord::new(180.0, 45.0);
        assert_close(a.separation(b), 180.0, 1e-9);
    }

    #[test]
    fn normalized_coord() {
        let c = SkyCoord::new(-10.0, 95.0).normalized();
        assert_close(c.ra, 350.0, 1e-12);
        assert_eq!(c.dec, 90.0);
    }
}
