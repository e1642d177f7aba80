use foundation::bounds::Aabb2;
use foundation::math::{SkyCoord, Vec2, normalize_ra, wrap_delta};

/// A path is broken wherever consecutive screen points jump horizontally by
/// more than this fraction of the surface width.
pub const SEGMENT_BREAK_FRACTION: f64 = 0.8;

/// Sky <-> screen mapping for one viewport state.
///
/// Screen convention: origin top-left, `+x` right, `+y` down. RA increases
/// to the right and Dec upward; RA offsets are taken seam-aware, so a star at
/// RA 1 with the view centered at RA 359 lands 2 degrees right of center.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenMapper {
    center: SkyCoord,
    scale: f64,
    width: f64,
    height: f64,
}

impl ScreenMapper {
    pub fn new(center: SkyCoord, scale: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            scale,
            width,
            height,
        }
    }

    pub fn center(&self) -> SkyCoord {
        self.center
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn surface_bounds(&self) -> Aabb2 {
        Aabb2::from_size(self.width, self.height)
    }

    pub fn to_screen(&self, ra: f64, dec: f64) -> Vec2 {
        Vec2::new(
            self.width * 0.5 + wrap_delta(ra - self.center.ra) / self.scale,
            self.height * 0.5 - (dec - self.center.dec) / self.scale,
        )
    }

    pub fn coord_to_screen(&self, c: SkyCoord) -> Vec2 {
        self.to_screen(c.ra, c.dec)
    }

    /// Inverse of [`ScreenMapper::to_screen`]; RA comes back in `[0, 360)`.
    ///
    /// Exact only for pixels within 180 degrees of RA of the center
    /// (`|x - W/2| * scale <= 180`). When the surface spans more than 360
    /// degrees, as at full-sky zoom, pixels near the left and right edges
    /// map to an RA that `to_screen` places elsewhere.
    pub fn from_screen(&self, x: f64, y: f64) -> SkyCoord {
        SkyCoord::new(
            normalize_ra(self.center.ra + (x - self.width * 0.5) * self.scale),
            self.center.dec - (y - self.height * 0.5) * self.scale,
        )
    }

    pub fn is_on_surface(&self, p: Vec2) -> bool {
        self.surface_bounds().contains([p.x, p.y])
    }

    /// Pixels per radian at the current scale.
    pub fn pixels_per_radian(&self) -> f64 {
        1.0 / self.scale.to_radians()
    }

    /// Place a unit tangent-plane point (from a gnomonic projection about the
    /// view center) on screen.
    pub fn tangent_to_screen(&self, tangent: Vec2) -> Vec2 {
        let ppr = self.pixels_per_radian();
        Vec2::new(
            self.width * 0.5 + tangent.x * ppr,
            self.height * 0.5 - tangent.y * ppr,
        )
    }

    /// Map a path and split it at seam jumps.
    ///
    /// Sub-paths with fewer than two points are dropped, as are sub-paths whose
    /// bounding box misses the surface entirely.
    pub fn map_path(&self, vertices: &[SkyCoord]) -> Vec<Vec<Vec2>> {
        let points: Vec<Vec2> = vertices.iter().map(|&c| self.coord_to_screen(c)).collect();
        let surface = self.surface_bounds();
        split_on_jumps(&points, self.width * SEGMENT_BREAK_FRACTION)
            .into_iter()
            .filter(|seg| seg.len() >= 2)
            .filter(|seg| {
                Aabb2::from_points(seg.iter().map(|p| [p.x, p.y]))
                    .is_some_and(|b| b.intersects(&surface))
            })
            .collect()
    }
}

/// Split a polyline wherever `|dx|` between consecutive points exceeds
/// `max_dx`. Every input point lands in exactly one output run.
pub fn split_on_jumps(points: &[Vec2], max_dx: f64) -> Vec<Vec<Vec2>> {
    let mut runs: Vec<Vec<Vec2>> = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();
    for &p in points {
        if let Some(prev) = current.last() {
            if (p.x - prev.x).abs() > max_dx {
                runs.push(std::mem::take(&mut current));
            }
        }
        current.push(p);
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}
