use catalog::{Catalog, CelestialPoint};
use foundation::math::wrap_delta;

use crate::viewport::{ViewStamp, ViewportState};

/// Relative slack added to the half-window extents so that points sitting
/// exactly on the surface edge are never lost to rounding.
pub const WINDOW_PAD: f64 = 1e-9;

/// Coarse angular-window test against the viewport.
///
/// Inclusive on the boundary. Every star whose mapped screen position lies on
/// the surface (edges included) passes; a few just outside may pass too.
pub fn is_in_view_window(viewport: &ViewportState, ra: f64, dec: f64) -> bool {
    let half_w = viewport.visible_width_deg() * 0.5 * (1.0 + WINDOW_PAD);
    let half_h = viewport.visible_height_deg() * 0.5 * (1.0 + WINDOW_PAD);
    wrap_delta(ra - viewport.center_ra()).abs() <= half_w
        && (dec - viewport.center_dec()).abs() <= half_h
}

/// Indices of the stars passing [`is_in_view_window`].
///
/// Ordering contract:
/// - indices are ascending (catalog order)
pub fn compute_visible(catalog: &Catalog, viewport: &ViewportState) -> Vec<usize> {
    catalog
        .stars()
        .iter()
        .enumerate()
        .filter(|(_, s)| is_in_view_window(viewport, s.ra, s.dec))
        .map(|(i, _)| i)
        .collect()
}

/// Memoized visible-star set keyed on the viewport stamp.
///
/// The cache assumes it is only ever queried with one catalog; pair one cache
/// with one catalog for its whole life, or call [`VisibleSetCache::invalidate`]
/// after swapping catalogs.
#[derive(Debug, Default, Clone)]
pub struct VisibleSetCache {
    stamp: Option<ViewStamp>,
    indices: Vec<usize>,
    recomputes: u64,
}

impl VisibleSetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible star indices for the viewport's current state.
    ///
    /// Recomputes only when the viewport stamp differs from the cached one.
    pub fn visible(&mut self, catalog: &Catalog, viewport: &ViewportState) -> &[usize] {
        let stamp = viewport.stamp();
        if self.stamp != Some(stamp) {
            self.indices = compute_visible(catalog, viewport);
            self.stamp = Some(stamp);
            self.recomputes += 1;
            tracing::trace!(
                viewport = stamp.viewport.get(),
                generation = stamp.generation,
                visible = self.indices.len(),
                "visible set recomputed"
            );
        }
        &self.indices
    }

    /// Like [`VisibleSetCache::visible`] but resolved to `(index, star)` pairs.
    pub fn visible_points<'c>(
        &mut self,
        catalog: &'c Catalog,
        viewport: &ViewportState,
    ) -> Vec<(usize, &'c CelestialPoint)> {
        self.visible(catalog, viewport)
            .iter()
            .filter_map(|&i| catalog.star(i).map(|s| (i, s)))
            .collect()
    }

    pub fn invalidate(&mut self) {
        self.stamp = None;
    }

    pub fn cached_stamp(&self) -> Option<ViewStamp> {
        self.stamp
    }

    /// Number of full recomputations so far.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }
}
