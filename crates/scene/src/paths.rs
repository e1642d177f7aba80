use catalog::{Catalog, PathKind};
use foundation::math::Vec2;

use crate::viewport::{ViewStamp, ViewportState};

/// One drawable run of a line path in screen pixels (always two or more
/// points).
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    /// Index into `Catalog::paths`.
    pub path_index: usize,
    pub kind: PathKind,
    pub points: Vec<Vec2>,
}

/// Map and split every catalog path for the viewport's current state.
///
/// Ordering contract:
/// - segments follow catalog path order, then vertex order within a path
pub fn segment_paths(catalog: &Catalog, viewport: &ViewportState) -> Vec<PathSegment> {
    let mapper = viewport.mapper();
    let mut out = Vec::new();
    for (path_index, path) in catalog.paths().iter().enumerate() {
        for points in mapper.map_path(&path.vertices) {
            out.push(PathSegment {
                path_index,
                kind: path.kind,
                points,
            });
        }
    }
    out
}

/// Memoized [`segment_paths`] output keyed on the viewport stamp.
///
/// Same pairing rule as [`crate::visibility::VisibleSetCache`]: one cache per
/// catalog.
#[derive(Debug, Default, Clone)]
pub struct PathCache {
    stamp: Option<ViewStamp>,
    segments: Vec<PathSegment>,
    recomputes: u64,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&mut self, catalog: &Catalog, viewport: &ViewportState) -> &[PathSegment] {
        let stamp = viewport.stamp();
        if self.stamp != Some(stamp) {
            self.segments = segment_paths(catalog, viewport);
            self.stamp = Some(stamp);
            self.recomputes += 1;
            tracing::trace!(
                viewport = stamp.viewport.get(),
                generation = stamp.generation,
                segments = self.segments.len(),
                "path segments recomputed"
            );
        }
        &self.segments
    }

    pub fn invalidate(&mut self) {
        self.stamp = None;
    }

    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }
}
