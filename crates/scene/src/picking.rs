use catalog::Catalog;
use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{SkyCoord, Vec2};

use crate::screen::ScreenMapper;

pub const DEFAULT_PICK_TOLERANCE_PX: f64 = 10.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    /// Hits must be strictly closer than this, in pixels.
    pub tolerance_px: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            tolerance_px: DEFAULT_PICK_TOLERANCE_PX,
        }
    }
}

impl PickOptions {
    pub fn with_tolerance(tolerance_px: f64) -> Self {
        Self { tolerance_px }
    }
}

/// What a pick landed on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PickTarget {
    /// Index into `Catalog::stars`.
    Star { index: usize },
    /// Vertex of `Catalog::paths[path_index]`.
    PathVertex {
        path_index: usize,
        vertex_index: usize,
    },
}

impl PickTarget {
    /// Display name: the star's proper name or the path's name.
    pub fn name<'c>(&self, catalog: &'c Catalog) -> Option<&'c str> {
        match *self {
            PickTarget::Star { index } => catalog.star(index)?.name.as_deref(),
            PickTarget::PathVertex { path_index, .. } => {
                catalog.paths().get(path_index).map(|p| p.name.as_str())
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub target: PickTarget,
    pub coord: SkyCoord,
    /// Screen position of the target.
    pub position: Vec2,
    pub distance_px: f64,
}

/// Nearest candidate to pixel `(px, py)`.
///
/// Ordering contract:
/// - the smallest Euclidean pixel distance wins
/// - on equal distances the earliest candidate wins
/// - a candidate at or beyond `opts.tolerance_px` never matches
pub fn find_nearest<I>(
    mapper: &ScreenMapper,
    px: f64,
    py: f64,
    candidates: I,
    opts: PickOptions,
) -> Option<PickHit>
where
    I: IntoIterator<Item = (PickTarget, SkyCoord)>,
{
    let cursor = Vec2::new(px, py);
    let mut best: Option<PickHit> = None;

    for (target, coord) in candidates {
        let position = mapper.coord_to_screen(coord);
        let d = position.distance(cursor);
        if !(d < opts.tolerance_px) {
            continue;
        }
        let closer = match &best {
            None => true,
            Some(b) => stable_total_cmp_f64(d, b.distance_px).is_lt(),
        };
        if closer {
            best = Some(PickHit {
                target,
                coord,
                position,
                distance_px: d,
            });
        }
    }

    best
}

/// Pick among the given star indices (typically the cached visible set).
pub fn pick_star(
    catalog: &Catalog,
    mapper: &ScreenMapper,
    visible: &[usize],
    px: f64,
    py: f64,
    opts: PickOptions,
) -> Option<PickHit> {
    find_nearest(mapper, px, py, star_candidates(catalog, visible), opts)
}

/// Pick among the vertices of every catalog path.
pub fn pick_path_vertex(
    catalog: &Catalog,
    mapper: &ScreenMapper,
    px: f64,
    py: f64,
    opts: PickOptions,
) -> Option<PickHit> {
    find_nearest(mapper, px, py, vertex_candidates(catalog), opts)
}

/// Pick among visible stars and path vertices; stars win ties.
pub fn pick(
    catalog: &Catalog,
    mapper: &ScreenMapper,
    visible: &[usize],
    px: f64,
    py: f64,
    opts: PickOptions,
) -> Option<PickHit> {
    let candidates = star_candidates(catalog, visible).chain(vertex_candidates(catalog));
    find_nearest(mapper, px, py, candidates, opts)
}

fn star_candidates<'a>(
    catalog: &'a Catalog,
    visible: &'a [usize],
) -> impl Iterator<Item = (PickTarget, SkyCoord)> + 'a {
    visible.iter().filter_map(move |&index| {
        catalog
            .star(index)
            .map(|s| (PickTarget::Star { index }, s.coord()))
    })
}

fn vertex_candidates(catalog: &Catalog) -> impl Iterator<Item = (PickTarget, SkyCoord)> + '_ {
    catalog
        .paths()
        .iter()
        .enumerate()
        .flat_map(|(path_index, path)| {
            path.vertices
                .iter()
                .enumerate()
                .map(move |(vertex_index, &v)| {
                    (
                        PickTarget::PathVertex {
                            path_index,
                            vertex_index,
                        },
                        v,
                    )
                })
        })
}
