//! Gnomonic (tangent-plane) projection.
//!
//! All angles are radians. Output coordinates are on the unit tangent plane
//! touching the sphere at the projection center; callers scale them by a
//! pixels-per-radian factor.

use super::Vec2;

/// Result of projecting one point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Projection {
    Visible { x: f64, y: f64 },
    /// The point lies on the far hemisphere (`cos c <= 0`).
    NotVisible,
}

impl Projection {
    pub fn is_visible(self) -> bool {
        matches!(self, Projection::Visible { .. })
    }

    pub fn visible(self) -> Option<Vec2> {
        match self {
            Projection::Visible { x, y } => Some(Vec2::new(x, y)),
            Projection::NotVisible => None,
        }
    }
}

/// Project `(ra, dec)` about the center `(ra0, dec0)`.
pub fn project(ra: f64, dec: f64, ra0: f64, dec0: f64) -> Projection {
    let (sin_dec, cos_dec) = dec.sin_cos();
    let (sin_dec0, cos_dec0) = dec0.sin_cos();
    let (sin_dra, cos_dra) = (ra - ra0).sin_cos();

    let cos_c = sin_dec0 * sin_dec + cos_dec0 * cos_dec * cos_dra;
    if cos_c <= 0.0 {
        return Projection::NotVisible;
    }

    Projection::Visible {
        x: cos_dec * sin_dra / cos_c,
        y: (cos_dec0 * sin_dec - sin_dec0 * cos_dec * cos_dra) / cos_c,
    }
}

/// Degree-valued wrapper around [`project`]; the output is still unit-plane.
pub fn project_deg(ra: f64, dec: f64, ra0: f64, dec0: f64) -> Projection {
    project(
        ra.to_radians(),
        dec.to_radians(),
        ra0.to_radians(),
        dec0.to_radians(),
    )
}

/// Inverse projection: unit-plane `(x, y)` back to `(ra, dec)` radians.
///
/// RA is returned in `[0, 2pi)`.
pub fn deproject(x: f64, y: f64, ra0: f64, dec0: f64) -> (f64, f64) {
    let (sin_dec0, cos_dec0) = dec0.sin_cos();
    let rho = (x * x + y * y).sqrt();
    if rho == 0.0 {
        return (ra0.rem_euclid(std::f64::consts::TAU), dec0);
    }

    let c = rho.atan();
    let (sin_c, cos_c) = c.sin_cos();
    let dec = (cos_c * sin_dec0 + y * sin_c * cos_dec0 / rho).asin();
    let ra = ra0 + (x * sin_c).atan2(rho * cos_dec0 * cos_c - y * sin_dec0 * sin_c);
    (ra.rem_euclid(std::f64::consts::TAU), dec)
}

#[cfg(test)]
mod tests {
    use super::{Projection, deproject, project, project_deg};
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn center_projects_to_origin() {
        for (ra0, dec0) in [(0.0, 0.0), (1.2, -0.4), (5.9, 1.3)] {
            match project(ra0, dec0, ra0, dec0) {
                Projection::Visible { x, y } => {
                    assert_close(x, 0.0, 1e-12);
                    assert_close(y, 0.0, 1e-12);
                }
                Projection::NotVisible => panic!("center must be visible"),
            }
        }
    }

    #[test]
    fn far_hemisphere_is_not_visible() {
        assert_eq!(project(PI, 0.0, 0.0, 0.0), Projection::NotVisible);
        assert!(!project_deg(100.0, 0.0, 0.0, 0.0).is_visible());
        assert_eq!(project_deg(0.0, -50.0, 0.0, 45.0), Projection::NotVisible);
    }

    #[test]
    fn visible_points_are_finite() {
        let ra0 = 0.3;
        let dec0 = -0.2;
        let mut ra = 0.0;
        while ra < 2.0 * PI {
            let mut dec = -FRAC_PI_2;
            while dec <= FRAC_PI_2 {
                if let Projection::Visible { x, y } = project(ra, dec, ra0, dec0) {
                    assert!(x.is_finite() && y.is_finite());
                }
                dec += 0.05;
            }
            ra += 0.05;
        }
    }

    #[test]
    fn known_offset_on_equator() {
        let p = project(FRAC_PI_4, 0.0, 0.0, 0.0).visible().expect("visible");
        assert_close(p.x, 1.0, 1e-12);
        assert_close(p.y, 0.0, 1e-12);
    }

    #[test]
    fn deproject_inverts_project() {
        let (ra0, dec0) = (4.0, 0.7);
        for (ra, dec) in [(4.1, 0.65), (3.8, 0.9), (4.0, 0.7), (0.2 + 2.0 * PI - 2.1, 0.5)] {
            let Some(p) = project(ra, dec, ra0, dec0).visible() else {
                continue;
            };
            let (ra_rt, dec_rt) = deproject(p.x, p.y, ra0, dec0);
            assert_close(ra_rt, ra.rem_euclid(2.0 * PI), 1e-9);
            assert_close(dec_rt, dec, 1e-9);
        }
    }
}
