use catalog::Catalog;
use runtime::{InputEvent, InputQueue};

use crate::config::ViewConfig;
use crate::controls::apply_input;
use crate::frame::{FrameGeometry, FrameOptions, build_frame};
use crate::paths::PathCache;
use crate::picking::{PickHit, PickOptions, PickTarget, pick};
use crate::viewport::ViewportState;
use crate::visibility::VisibleSetCache;

/// One interactive view over a catalog: the viewport plus its caches.
///
/// Holding the catalog reference here enforces the one-catalog-per-cache
/// pairing the caches rely on.
#[derive(Debug)]
pub struct ViewSession<'c> {
    catalog: &'c Catalog,
    config: ViewConfig,
    viewport: ViewportState,
    visible: VisibleSetCache,
    paths: PathCache,
    highlight: Option<usize>,
}

impl<'c> ViewSession<'c> {
    pub fn new(catalog: &'c Catalog, config: ViewConfig) -> Self {
        let viewport = ViewportState::new(catalog, &config);
        tracing::debug!(
            stars = catalog.len(),
            paths = catalog.paths().len(),
            center_ra = viewport.center_ra(),
            center_dec = viewport.center_dec(),
            min_scale = viewport.min_scale(),
            max_scale = viewport.max_scale(),
            "view session started"
        );
        Self {
            catalog,
            config,
            viewport,
            visible: VisibleSetCache::new(),
            paths: PathCache::new(),
            highlight: None,
        }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Direct access for callers that drive the viewport themselves; the
    /// caches notice changes through the viewport stamp.
    pub fn viewport_mut(&mut self) -> &mut ViewportState {
        &mut self.viewport
    }

    pub fn apply(&mut self, event: &InputEvent) -> bool {
        apply_input(&mut self.viewport, event)
    }

    /// Drain and apply everything queued; returns whether the view changed.
    pub fn apply_queue(&mut self, queue: &InputQueue) -> bool {
        let mut changed = false;
        for event in queue.drain() {
            changed |= self.apply(&event);
        }
        changed
    }

    pub fn visible_stars(&mut self) -> &[usize] {
        self.visible.visible(self.catalog, &self.viewport)
    }

    pub fn frame(&mut self) -> FrameGeometry {
        let mapper = self.viewport.mapper();
        let visible = self.visible.visible(self.catalog, &self.viewport);
        let paths = self.paths.segments(self.catalog, &self.viewport);
        let opts = FrameOptions {
            graticule: self.config.show_graticule,
            highlight: self.highlight,
        };
        build_frame(self.catalog, &mapper, visible, paths, opts)
    }

    /// Path currently drawn emphasized.
    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    /// Select a path by index, or clear with `None`. Unknown indices are
    /// rejected and leave the selection as it was.
    pub fn set_highlight(&mut self, path_index: Option<usize>) -> bool {
        if path_index.is_some_and(|i| i >= self.catalog.paths().len()) {
            tracing::debug!(?path_index, "highlight index out of range");
            return false;
        }
        let changed = self.highlight != path_index;
        self.highlight = path_index;
        changed
    }

    /// Select the first path called `name`; returns whether one exists.
    pub fn highlight_path(&mut self, name: &str) -> bool {
        match self.catalog.path_index(name) {
            Some(i) => {
                self.highlight = Some(i);
                true
            }
            None => false,
        }
    }

    /// Pick at `(px, py)` and update the selection: a path vertex selects its
    /// path, anything else clears it.
    pub fn select_at(&mut self, px: f64, py: f64) -> Option<PickHit> {
        let hit = self.pick(px, py);
        self.highlight = match hit.map(|h| h.target) {
            Some(PickTarget::PathVertex { path_index, .. }) => Some(path_index),
            _ => None,
        };
        hit
    }

    /// Nearest visible star or path vertex to pixel `(px, py)`.
    pub fn pick(&mut self, px: f64, py: f64) -> Option<PickHit> {
        let mapper = self.viewport.mapper();
        let opts = PickOptions::with_tolerance(self.config.pick_tolerance_px);
        let visible = self.visible.visible(self.catalog, &self.viewport);
        pick(self.catalog, &mapper, visible, px, py, opts)
    }

    pub fn visible_recompute_count(&self) -> u64 {
        self.visible.recompute_count()
    }

    pub fn path_recompute_count(&self) -> u64 {
        self.paths.recompute_count()
    }
}
