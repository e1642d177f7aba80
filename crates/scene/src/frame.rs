use catalog::Catalog;
use foundation::math::Vec2;

use crate::graticule::{Graticule, build_graticule};
use crate::paths::PathSegment;
use crate::screen::ScreenMapper;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StarStyle {
    pub radius_px: u32,
    /// Gray level, `100..=255`.
    pub brightness: u8,
}

/// Brighter stars (lower magnitude) draw larger and lighter.
pub fn star_style(magnitude: f64) -> StarStyle {
    let radius = (6.0 - magnitude).trunc().max(1.0);
    // `max` first so a NaN magnitude lands on the dim end.
    let brightness = (255.0 - (20.0 * magnitude).trunc()).max(100.0).min(255.0);
    StarStyle {
        radius_px: radius.min(u32::MAX as f64) as u32,
        brightness: brightness as u8,
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StarSprite {
    /// Index into `Catalog::stars`.
    pub index: usize,
    pub position: Vec2,
    pub style: StarStyle,
}

/// Name of a line path placed on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct PathLabel {
    /// Index into `Catalog::paths`.
    pub path_index: usize,
    pub text: String,
    pub position: Vec2,
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct FrameOptions {
    pub graticule: bool,
    /// Path drawn emphasized, with its label.
    pub highlight: Option<usize>,
}

/// Everything a renderer needs for one frame, already in screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameGeometry {
    pub width: f64,
    pub height: f64,
    pub stars: Vec<StarSprite>,
    pub paths: Vec<PathSegment>,
    pub graticule: Option<Graticule>,
    pub highlight: Option<usize>,
    pub labels: Vec<PathLabel>,
}

impl FrameGeometry {
    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
            && self.paths.is_empty()
            && self.graticule.is_none()
            && self.labels.is_empty()
    }

    /// Segments of the highlighted path, if any are on screen.
    pub fn highlighted_segments(&self) -> impl Iterator<Item = &PathSegment> + '_ {
        self.paths
            .iter()
            .filter(move |seg| Some(seg.path_index) == self.highlight)
    }
}

/// Assemble a frame from a visible set and pre-segmented paths.
///
/// Stars from `visible` whose mapped position falls off the surface are
/// dropped here, so the pre-filter may be generous. The highlighted path's
/// label is emitted only when it has a label position on the surface.
pub fn build_frame(
    catalog: &Catalog,
    mapper: &ScreenMapper,
    visible: &[usize],
    paths: &[PathSegment],
    opts: FrameOptions,
) -> FrameGeometry {
    let stars = visible
        .iter()
        .filter_map(|&index| {
            let star = catalog.star(index)?;
            let position = mapper.to_screen(star.ra, star.dec);
            mapper.is_on_surface(position).then(|| StarSprite {
                index,
                position,
                style: star_style(star.magnitude),
            })
        })
        .collect();

    let highlight = opts.highlight.filter(|&i| i < catalog.paths().len());
    let labels = highlight
        .and_then(|path_index| {
            let path = catalog.paths().get(path_index)?;
            let position = mapper.coord_to_screen(path.label?);
            mapper.is_on_surface(position).then(|| PathLabel {
                path_index,
                text: path.name.clone(),
                position,
            })
        })
        .into_iter()
        .collect();

    FrameGeometry {
        width: mapper.width(),
        height: mapper.height(),
        stars,
        paths: paths.to_vec(),
        graticule: opts.graticule.then(|| build_graticule(mapper)),
        highlight,
        labels,
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameOptions, PathLabel, StarStyle, build_frame, star_style};
    use crate::paths::PathSegment;
    use crate::screen::ScreenMapper;
    use catalog::{Catalog, CelestialPoint, LinePath, PathKind};
    use foundation::math::{SkyCoord, Vec2};
    use pretty_assertions::assert_eq;

    #[test]
    fn style_follows_magnitude() {
        assert_eq!(
            star_style(-1.46),
            StarStyle {
                radius_px: 7,
                brightness: 255
            }
        );
        assert_eq!(
            star_style(2.5),
            StarStyle {
                radius_px: 3,
                brightness: 205
            }
        );
        assert_eq!(
            star_style(6.0),
            StarStyle {
                radius_px: 1,
                brightness: 135
            }
        );
        assert_eq!(star_style(12.0).brightness, 100);
        assert_eq!(star_style(12.0).radius_px, 1);
    }

    #[test]
    fn frame_keeps_only_on_surface_stars() {
        let cat = Catalog::new(
            vec![
                CelestialPoint::new(10.0, 0.0, 1.0),
                CelestialPoint::new(60.0, 0.0, 1.0),
                CelestialPoint::new(11.0, 1.0, 3.0),
            ],
            Vec::new(),
        );
        let m = ScreenMapper::new(SkyCoord::new(10.0, 0.0), 0.1, 800.0, 600.0);
        let frame = build_frame(&cat, &m, &[0, 1, 2], &[], FrameOptions::default());

        let indices: Vec<usize> = frame.stars.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(frame.stars[0].position, Vec2::new(400.0, 300.0));
        assert!(frame.graticule.is_none());
        assert_eq!((frame.width, frame.height), (800.0, 600.0));
    }

    #[test]
    fn surface_edges_are_inclusive() {
        // 0.125 deg/px: 50 degrees east of center is exactly x = 800.
        let cat = Catalog::new(
            vec![
                CelestialPoint::new(60.0, 0.0, 1.0),
                CelestialPoint::new(60.125, 0.0, 1.0),
                CelestialPoint::new(10.0, -37.5, 1.0),
                CelestialPoint::new(320.0, 37.5, 1.0),
            ],
            Vec::new(),
        );
        let m = ScreenMapper::new(SkyCoord::new(10.0, 0.0), 0.125, 800.0, 600.0);
        let frame = build_frame(&cat, &m, &[0, 1, 2, 3], &[], FrameOptions::default());

        let indices: Vec<usize> = frame.stars.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
        assert_eq!(frame.stars[0].position, Vec2::new(800.0, 300.0));
        assert_eq!(frame.stars[1].position, Vec2::new(400.0, 600.0));
        assert_eq!(frame.stars[2].position, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn graticule_only_on_request() {
        let m = ScreenMapper::new(SkyCoord::new(0.0, 0.0), 0.1, 800.0, 600.0);
        let opts = FrameOptions {
            graticule: true,
            ..FrameOptions::default()
        };
        let frame = build_frame(&Catalog::default(), &m, &[], &[], opts);
        assert!(frame.graticule.is_some());
        assert!(!frame.is_empty());
    }

    #[test]
    fn highlighted_path_carries_its_label() {
        let cat = Catalog::new(
            Vec::new(),
            vec![
                LinePath::new(
                    "Orion",
                    PathKind::Constellation,
                    vec![SkyCoord::new(8.0, 0.0), SkyCoord::new(12.0, 2.0)],
                )
                .with_label(SkyCoord::new(10.0, 5.0)),
                LinePath::new(
                    "Far",
                    PathKind::Constellation,
                    vec![SkyCoord::new(9.0, 1.0), SkyCoord::new(11.0, 1.0)],
                )
                .with_label(SkyCoord::new(90.0, 0.0)),
                LinePath::new(
                    "Unlabelled",
                    PathKind::Asterism,
                    vec![SkyCoord::new(9.0, -1.0), SkyCoord::new(11.0, -1.0)],
                ),
            ],
        );
        let m = ScreenMapper::new(SkyCoord::new(10.0, 0.0), 0.125, 800.0, 600.0);
        let segments: Vec<PathSegment> = (0..3)
            .map(|path_index| PathSegment {
                path_index,
                kind: cat.paths()[path_index].kind,
                points: m.map_path(&cat.paths()[path_index].vertices).remove(0),
            })
            .collect();
        let frame_for = |highlight| {
            let opts = FrameOptions {
                highlight,
                ..FrameOptions::default()
            };
            build_frame(&cat, &m, &[], &segments, opts)
        };

        let frame = frame_for(Some(0));
        assert_eq!(
            frame.labels,
            vec![PathLabel {
                path_index: 0,
                text: "Orion".to_string(),
                position: Vec2::new(400.0, 260.0),
            }]
        );
        let highlighted: Vec<usize> = frame.highlighted_segments().map(|s| s.path_index).collect();
        assert_eq!(highlighted, vec![0]);

        // Label off the surface, no label position at all, nothing selected.
        assert!(frame_for(Some(1)).labels.is_empty());
        assert_eq!(frame_for(Some(1)).highlighted_segments().count(), 1);
        assert!(frame_for(Some(2)).labels.is_empty());
        let none = frame_for(None);
        assert!(none.labels.is_empty());
        assert_eq!(none.highlighted_segments().count(), 0);
        // Out-of-range selections are dropped.
        assert_eq!(frame_for(Some(7)).highlight, None);
    }
}
