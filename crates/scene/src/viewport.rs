use std::sync::atomic::{AtomicU64, Ordering};

use catalog::{Catalog, DecRange};
use foundation::math::{SkyCoord, normalize_ra, sort_f64};

use crate::config::{ViewConfig, sanitize_extent};
use crate::screen::ScreenMapper;

/// Padding applied to the catalog extent when fitting it to the surface.
pub const FIT_MARGIN: f64 = 1.05;

/// Ratio between the coarsest and finest scale (maximum zoom-in factor).
pub const MAX_ZOOM_FACTOR: f64 = 50.0;

/// Closest the view center may get to a celestial pole, in degrees.
pub const POLE_MARGIN_DEG: f64 = 0.01;

/// Field used when the catalog has no angular extent (one star, or none).
pub const MIN_FIELD_DEG: f64 = 1.0;

/// RA coverage of a catalog.
///
/// When the catalog straddles the 0/360 seam (`wrapped`), `min` is the first
/// RA after the largest empty gap and `max` the last RA before it, so
/// `min > max` numerically.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RaExtent {
    pub min: f64,
    pub max: f64,
    pub span: f64,
    pub center: f64,
    pub wrapped: bool,
}

impl RaExtent {
    pub fn full_sky() -> Self {
        Self {
            min: 0.0,
            max: 360.0,
            span: 360.0,
            center: 180.0,
            wrapped: false,
        }
    }

    /// Largest-gap analysis over RA values already normalized and sorted.
    pub fn from_sorted(sorted: &[f64]) -> Self {
        let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
            return Self::full_sky();
        };

        let mut max_gap = 0.0;
        let mut gap_hi = first;
        let mut gap_lo = first;
        for w in sorted.windows(2) {
            let gap = w[1] - w[0];
            if gap > max_gap {
                max_gap = gap;
                gap_lo = w[0];
                gap_hi = w[1];
            }
        }

        if max_gap > 180.0 {
            // Shift everything below the gap's upper edge by a full turn so the
            // occupied arc is contiguous, then average.
            let sum: f64 = sorted
                .iter()
                .map(|&ra| if ra >= gap_hi { ra } else { ra + 360.0 })
                .sum();
            let mean = sum / sorted.len() as f64;
            Self {
                min: gap_hi,
                max: gap_lo,
                span: 360.0 - max_gap,
                center: normalize_ra(mean),
                wrapped: true,
            }
        } else {
            Self {
                min: first,
                max: last,
                span: last - first,
                center: normalize_ra((first + last) * 0.5),
                wrapped: false,
            }
        }
    }
}

/// Catalog-derived view parameters: initial center and legal scale range.
///
/// Scale is degrees per pixel, so `min_scale` is the *largest* value (fully
/// zoomed out) and `max_scale` the smallest (fully zoomed in).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewParams {
    pub ra: RaExtent,
    pub dec: DecRange,
    pub center: SkyCoord,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl ViewParams {
    pub fn from_extents(ra: RaExtent, dec: DecRange, surface_width: f64, surface_height: f64) -> Self {
        let (min_scale, max_scale) = scale_limits(ra.span, dec.span(), surface_width, surface_height);
        Self {
            ra,
            dec,
            center: SkyCoord::new(ra.center, dec.midpoint()),
            min_scale,
            max_scale,
        }
    }

    pub fn full_sky(surface_width: f64, surface_height: f64) -> Self {
        Self::from_extents(RaExtent::full_sky(), DecRange::full(), surface_width, surface_height)
    }
}

/// `(min_scale, max_scale)` fitting the given angular spans to the surface.
pub fn scale_limits(ra_span: f64, dec_span: f64, surface_width: f64, surface_height: f64) -> (f64, f64) {
    let w = sanitize_extent(surface_width);
    let h = sanitize_extent(surface_height);
    let mut min_scale = (ra_span / w).max(dec_span / h) * FIT_MARGIN;
    if !(min_scale > 0.0) || !min_scale.is_finite() {
        min_scale = MIN_FIELD_DEG / w.min(h) * FIT_MARGIN;
    }
    (min_scale, min_scale / MAX_ZOOM_FACTOR)
}

/// Derive the initial view from a catalog.
///
/// Empty catalogs get full-sky extents.
pub fn calculate_view_params(catalog: &Catalog, surface_width: f64, surface_height: f64) -> ViewParams {
    let mut ras: Vec<f64> = catalog.ra_values().map(normalize_ra).collect();
    sort_f64(&mut ras);
    let ra = RaExtent::from_sorted(&ras);
    let dec = catalog.dec_range().unwrap_or_else(DecRange::full);
    ViewParams::from_extents(ra, dec, surface_width, surface_height)
}

static NEXT_VIEWPORT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewportId(u64);

impl ViewportId {
    fn next() -> Self {
        ViewportId(NEXT_VIEWPORT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Cache key for everything derived from a viewport.
///
/// Two stamps are equal iff they come from the same viewport and no
/// effective mutation happened in between.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ViewStamp {
    pub viewport: ViewportId,
    pub generation: u64,
}

/// The mutable view: center, scale and surface size.
///
/// Invariants (hold after every public call):
/// - `center_ra` is in `[0, 360)`
/// - `max_scale <= scale <= min_scale`
/// - `center_dec` keeps the visible window inside the catalog's declination
///   extent (pinned to its midpoint when the window is taller than the
///   extent) and at least `POLE_MARGIN_DEG` away from either pole
///
/// Mutators never fail. Out-of-range input is clamped; non-finite input is
/// ignored. Each mutator returns whether the view changed, and only a change
/// advances the generation.
#[derive(Debug)]
pub struct ViewportState {
    id: ViewportId,
    generation: u64,
    center_ra: f64,
    center_dec: f64,
    scale: f64,
    surface_width: f64,
    surface_height: f64,
    drag_sensitivity: f64,
    zoom_step: f64,
    params: ViewParams,
}

impl Clone for ViewportState {
    /// A clone is a separate viewport with its own id.
    fn clone(&self) -> Self {
        Self {
            id: ViewportId::next(),
            ..*self
        }
    }
}

impl ViewportState {
    /// Fit the whole catalog: centered on it, fully zoomed out.
    pub fn new(catalog: &Catalog, config: &ViewConfig) -> Self {
        let (w, h) = config.surface();
        Self::from_params(calculate_view_params(catalog, w, h), config)
    }

    pub fn from_params(params: ViewParams, config: &ViewConfig) -> Self {
        let (w, h) = config.surface();
        let mut v = Self {
            id: ViewportId::next(),
            generation: 0,
            center_ra: 0.0,
            center_dec: 0.0,
            scale: params.min_scale,
            surface_width: w,
            surface_height: h,
            drag_sensitivity: config.drag_sensitivity,
            zoom_step: config.zoom_step,
            params,
        };
        v.center_ra = normalize_ra(params.center.ra);
        v.center_dec = v.clamp_dec(params.center.dec, v.scale);
        v
    }

    pub fn id(&self) -> ViewportId {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stamp(&self) -> ViewStamp {
        ViewStamp {
            viewport: self.id,
            generation: self.generation,
        }
    }

    pub fn center_ra(&self) -> f64 {
        self.center_ra
    }

    pub fn center_dec(&self) -> f64 {
        self.center_dec
    }

    pub fn center(&self) -> SkyCoord {
        SkyCoord::new(self.center_ra, self.center_dec)
    }

    /// Degrees per pixel.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn min_scale(&self) -> f64 {
        self.params.min_scale
    }

    pub fn max_scale(&self) -> f64 {
        self.params.max_scale
    }

    pub fn params(&self) -> &ViewParams {
        &self.params
    }

    pub fn surface_width(&self) -> f64 {
        self.surface_width
    }

    pub fn surface_height(&self) -> f64 {
        self.surface_height
    }

    pub fn visible_width_deg(&self) -> f64 {
        self.surface_width * self.scale
    }

    pub fn visible_height_deg(&self) -> f64 {
        self.surface_height * self.scale
    }

    /// Zoom relative to the fully zoomed-out view (1.0 ..= `MAX_ZOOM_FACTOR`).
    pub fn zoom_level(&self) -> f64 {
        self.params.min_scale / self.scale
    }

    pub fn mapper(&self) -> ScreenMapper {
        ScreenMapper::new(
            self.center(),
            self.scale,
            self.surface_width,
            self.surface_height,
        )
    }

    /// Pan to `(ra, dec)`; RA wraps, Dec clamps.
    pub fn set_center(&mut self, ra: f64, dec: f64) -> bool {
        if !ra.is_finite() || !dec.is_finite() {
            return false;
        }
        let ra = normalize_ra(ra);
        let dec = self.clamp_dec(dec, self.scale);
        self.commit(ra, dec, self.scale, self.surface_width, self.surface_height)
    }

    /// Zoom to `value` degrees per pixel, clamped to the legal range.
    ///
    /// Zero and negative values clamp to `max_scale`.
    pub fn set_scale(&mut self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        let scale = value.clamp(self.params.max_scale, self.params.min_scale);
        let dec = self.clamp_dec(self.center_dec, scale);
        self.commit(self.center_ra, dec, scale, self.surface_width, self.surface_height)
    }

    /// Drag by a pointer delta in pixels; the sky follows the pointer.
    pub fn pan_by_pixels(&mut self, dx: f64, dy: f64) -> bool {
        let k = self.scale * self.drag_sensitivity;
        self.set_center(self.center_ra - dx * k, self.center_dec + dy * k)
    }

    /// Multiplicative zoom; `factor > 1` zooms in.
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        if !(factor > 0.0) || !factor.is_finite() {
            return false;
        }
        self.set_scale(self.scale / factor)
    }

    /// Zoom by `ticks` wheel clicks of the configured zoom step.
    pub fn wheel(&mut self, ticks: i32) -> bool {
        self.zoom_by(self.zoom_step.powi(ticks))
    }

    /// Wheel zoom anchored at pixel `(px, py)`.
    pub fn wheel_at(&mut self, px: f64, py: f64, ticks: i32) -> bool {
        self.zoom_at(px, py, self.zoom_step.powi(ticks))
    }

    /// Zoom keeping the sky position under pixel `(px, py)` in place, as far
    /// as the center clamp allows.
    pub fn zoom_at(&mut self, px: f64, py: f64, factor: f64) -> bool {
        if !(factor > 0.0) || !factor.is_finite() || !px.is_finite() || !py.is_finite() {
            return false;
        }
        let anchor = self.mapper().from_screen(px, py);
        let scale = (self.scale / factor).clamp(self.params.max_scale, self.params.min_scale);

        let off_x = px - self.surface_width * 0.5;
        let off_y = py - self.surface_height * 0.5;
        let ra = normalize_ra(anchor.ra - off_x * scale);
        let dec = self.clamp_dec(anchor.dec + off_y * scale, scale);
        self.commit(ra, dec, scale, self.surface_width, self.surface_height)
    }

    /// Change the surface size; the scale limits are refitted to the catalog
    /// extent and the current view is re-clamped.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        let w = sanitize_extent(width);
        let h = sanitize_extent(height);
        let (min_scale, max_scale) = scale_limits(self.params.ra.span, self.params.dec.span(), w, h);
        self.params.min_scale = min_scale;
        self.params.max_scale = max_scale;

        let scale = self.scale.clamp(max_scale, min_scale);
        let dec = clamp_dec_within(self.params.dec, h, self.center_dec, scale);
        self.commit(self.center_ra, dec, scale, w, h)
    }

    fn clamp_dec(&self, dec: f64, scale: f64) -> f64 {
        clamp_dec_within(self.params.dec, self.surface_height, dec, scale)
    }

    fn commit(&mut self, ra: f64, dec: f64, scale: f64, width: f64, height: f64) -> bool {
        let unchanged = ra == self.center_ra
            && dec == self.center_dec
            && scale == self.scale
            && width == self.surface_width
            && height == self.surface_height;
        if unchanged {
            return false;
        }

        self.center_ra = ra;
        self.center_dec = dec;
        self.scale = scale;
        self.surface_width = width;
        self.surface_height = height;
        self.generation += 1;
        tracing::trace!(
            viewport = self.id.get(),
            generation = self.generation,
            ra,
            dec,
            scale,
            "viewport changed"
        );
        true
    }
}

fn clamp_dec_within(range: DecRange, surface_height: f64, dec: f64, scale: f64) -> f64 {
    let half = surface_height * scale * 0.5;
    let lo = range.min + half;
    let hi = range.max - half;
    let dec = if lo <= hi { dec.clamp(lo, hi) } else { range.midpoint() };
    dec.clamp(-90.0 + POLE_MARGIN_DEG, 90.0 - POLE_MARGIN_DEG)
}

#[cfg(test)]
mod tests {
    use super::{
        MAX_ZOOM_FACTOR, POLE_MARGIN_DEG, RaExtent, ViewParams, ViewportState,
        calculate_view_params,
    };
    use crate::config::ViewConfig;
    use catalog::{Catalog, CelestialPoint, DecRange};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn catalog_of(points: &[(f64, f64)]) -> Catalog {
        Catalog::new(
            points
                .iter()
                .map(|&(ra, dec)| CelestialPoint::new(ra, dec, 2.0))
                .collect(),
            Vec::new(),
        )
    }

    fn full_sky_viewport() -> ViewportState {
        ViewportState::from_params(ViewParams::full_sky(800.0, 600.0), &ViewConfig::default())
    }

    #[test]
    fn seam_wrapped_catalog_centers_near_zero() {
        let cat = catalog_of(&[(355.0, 0.0), (5.0, 0.0)]);
        let params = calculate_view_params(&cat, 800.0, 600.0);
        assert!(params.ra.wrapped);
        assert_close(params.ra.span, 10.0, 1e-9);
        let off = foundation::math::wrap_delta(params.center.ra - 0.0);
        assert_close(off, 0.0, 1e-9);
        assert_close(params.center.dec, 0.0, 1e-12);
    }

    #[test]
    fn contiguous_catalog_uses_midpoint() {
        let cat = catalog_of(&[(10.0, -5.0), (40.0, 5.0), (100.0, 25.0)]);
        let params = calculate_view_params(&cat, 800.0, 600.0);
        assert!(!params.ra.wrapped);
        assert_close(params.center.ra, 55.0, 1e-12);
        assert_close(params.center.dec, 10.0, 1e-12);
        assert_close(params.ra.span, 90.0, 1e-12);
        // RA dominates: 90/800 > 30/600.
        assert_close(params.min_scale, 90.0 / 800.0 * 1.05, 1e-12);
    }

    #[test]
    fn full_sky_scale_limits() {
        let params = ViewParams::full_sky(800.0, 600.0);
        assert_close(params.min_scale, 0.4725, 1e-12);
        assert_close(params.max_scale, 0.00945, 1e-12);

        // The same limits fall out of a catalog that covers the sky.
        let cat = catalog_of(&[(0.0, -90.0), (90.0, 0.0), (180.0, 10.0), (270.0, 0.0), (359.999, 90.0)]);
        let derived = calculate_view_params(&cat, 800.0, 600.0);
        assert_close(derived.min_scale, 0.4725, 1e-5);
        assert_close(derived.min_scale / derived.max_scale, MAX_ZOOM_FACTOR, 1e-9);
    }

    #[test]
    fn degenerate_catalogs_still_have_a_positive_scale() {
        let single = calculate_view_params(&catalog_of(&[(42.0, 12.0)]), 800.0, 600.0);
        assert!(single.min_scale > 0.0);
        assert!(single.max_scale > 0.0);
        assert_close(single.center.ra, 42.0, 1e-12);

        let empty = calculate_view_params(&Catalog::default(), 800.0, 600.0);
        assert_eq!(empty.ra, RaExtent::full_sky());
        assert_eq!(empty.dec, DecRange::full());
    }

    #[test]
    fn set_scale_always_clamps() {
        let mut v = full_sky_viewport();
        for value in [1e9, 0.5, 0.1, 0.0, -3.0, f64::INFINITY, f64::NEG_INFINITY, 1e-12] {
            v.set_scale(value);
            assert!(v.scale() >= v.max_scale() && v.scale() <= v.min_scale(), "{value}");
        }
        v.set_scale(0.0);
        assert_eq!(v.scale(), v.max_scale());
        v.set_scale(-5.0);
        assert_eq!(v.scale(), v.max_scale());
        v.set_scale(1e9);
        assert_eq!(v.scale(), v.min_scale());
    }

    #[test]
    fn set_center_normalizes_ra() {
        let mut v = full_sky_viewport();
        for ra in [-720.0, -1.0, -1e-20, 0.0, 359.5, 360.0, 1234.5] {
            v.set_center(ra, 0.0);
            assert!((0.0..360.0).contains(&v.center_ra()), "{ra} -> {}", v.center_ra());
        }
        v.set_center(-10.0, 0.0);
        assert_close(v.center_ra(), 350.0, 1e-12);
    }

    #[test]
    fn dec_is_clamped_to_keep_window_in_catalog() {
        let cat = catalog_of(&[(0.0, -30.0), (60.0, 30.0)]);
        let mut v = ViewportState::new(&cat, &ViewConfig::default());
        v.set_scale(v.max_scale());
        let half = v.visible_height_deg() * 0.5;

        v.set_center(30.0, 89.0);
        assert_close(v.center_dec(), 30.0 - half, 1e-12);
        v.set_center(30.0, -89.0);
        assert_close(v.center_dec(), -30.0 + half, 1e-12);
    }

    #[test]
    fn window_taller_than_catalog_pins_dec_to_midpoint() {
        let mut v = full_sky_viewport();
        v.set_center(10.0, 60.0);
        assert_eq!(v.center_dec(), 0.0);
    }

    #[test]
    fn center_stays_off_the_poles() {
        let cat = catalog_of(&[(0.0, 80.0), (120.0, 90.0), (240.0, 85.0)]);
        let mut v = ViewportState::new(&cat, &ViewConfig::default());
        v.set_scale(0.0);
        v.set_center(0.0, 90.0);
        assert!(v.center_dec() <= 90.0 - POLE_MARGIN_DEG);
    }

    #[test]
    fn repeated_mutations_do_not_advance_generation() {
        let mut v = full_sky_viewport();
        assert!(v.set_scale(0.1));
        let g = v.generation();
        assert!(!v.set_scale(0.1));
        assert!(v.set_center(123.0, 0.0));
        let stamp = v.stamp();
        assert!(!v.set_center(v.center_ra(), v.center_dec()));
        assert!(!v.set_scale(v.scale()));
        assert_eq!(v.stamp(), stamp);
        assert_eq!(v.generation(), g + 1);
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut v = full_sky_viewport();
        let stamp = v.stamp();
        assert!(!v.set_center(f64::NAN, 0.0));
        assert!(!v.set_scale(f64::NAN));
        assert!(!v.zoom_by(f64::NAN));
        assert!(!v.zoom_by(0.0));
        assert_eq!(v.stamp(), stamp);
    }

    #[test]
    fn distinct_viewports_have_distinct_stamps() {
        let a = full_sky_viewport();
        let b = full_sky_viewport();
        assert_ne!(a.stamp(), b.stamp());
    }

    #[test]
    fn drag_moves_the_sky_with_the_pointer() {
        let cfg = ViewConfig {
            drag_sensitivity: 1.0,
            ..ViewConfig::default()
        };
        let mut v = ViewportState::from_params(ViewParams::full_sky(800.0, 600.0), &cfg);
        v.set_scale(0.01);
        v.set_center(100.0, 0.0);

        v.pan_by_pixels(50.0, 0.0);
        assert_close(v.center_ra(), 99.5, 1e-9);
        v.pan_by_pixels(0.0, 100.0);
        assert_close(v.center_dec(), 1.0, 1e-9);
    }

    #[test]
    fn zoom_by_divides_scale() {
        let mut v = full_sky_viewport();
        let before = v.scale();
        v.zoom_by(2.0);
        assert_close(v.scale(), before / 2.0, 1e-12);
        v.zoom_by(0.25);
        assert_eq!(v.scale(), v.min_scale());
    }

    #[test]
    fn wheel_uses_configured_zoom_step() {
        let cfg = ViewConfig {
            zoom_step: 2.0,
            ..ViewConfig::default()
        };
        let mut v = ViewportState::from_params(ViewParams::full_sky(800.0, 600.0), &cfg);
        v.set_scale(0.2);
        assert!(v.wheel(1));
        assert_close(v.scale(), 0.1, 1e-12);
        assert!(v.wheel(-2));
        assert_close(v.scale(), 0.4, 1e-12);
        assert!(!v.wheel(0));

        v.set_center(200.0, 0.0);
        let anchor = v.mapper().from_screen(600.0, 200.0);
        assert!(v.wheel_at(600.0, 200.0, 1));
        assert_close(v.scale(), 0.2, 1e-12);
        let after = v.mapper().to_screen(anchor.ra, anchor.dec);
        assert_close(after.x, 600.0, 1e-6);
        assert_close(after.y, 200.0, 1e-6);
    }

    #[test]
    fn zoom_at_keeps_anchor_under_cursor() {
        let mut v = full_sky_viewport();
        v.set_scale(0.05);
        v.set_center(200.0, 0.0);

        let (px, py) = (600.0, 200.0);
        let anchor = v.mapper().from_screen(px, py);
        v.zoom_at(px, py, 1.5);
        let after = v.mapper().to_screen(anchor.ra, anchor.dec);
        assert_close(after.x, px, 1e-6);
        assert_close(after.y, py, 1e-6);
    }

    #[test]
    fn resize_refits_scale_limits() {
        let mut v = full_sky_viewport();
        assert!(v.resize(1600.0, 1200.0));
        assert_close(v.min_scale(), 0.4725 / 2.0, 1e-12);
        assert!(v.scale() <= v.min_scale());
        assert_eq!(v.surface_width(), 1600.0);
        assert!(!v.resize(1600.0, 1200.0));
    }

    #[test]
    fn clones_get_their_own_identity() {
        let a = full_sky_viewport();
        let mut b = a.clone();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.generation(), b.generation());
        b.set_scale(0.1);
        assert_eq!(b.center_ra(), a.center_ra());
        assert_ne!(a.stamp(), b.stamp());
    }
}
