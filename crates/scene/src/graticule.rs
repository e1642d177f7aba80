//! RA/Dec coordinate grid.
//!
//! Grid lines are drawn in true gnomonic projection about the view center
//! rather than through the linear [`ScreenMapper`] offsets used for stars, so
//! parallels bend the way they do on the sky. Lines are clipped to a circle of
//! radius `min(W, H) / 2` around the surface center.

use foundation::math::{Vec2, project_deg};

use crate::screen::ScreenMapper;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridSpacing {
    pub ra_step_deg: f64,
    pub dec_step_deg: f64,
    /// Distance between samples along a line.
    pub sample_step_deg: f64,
}

/// Grid density for a zoom level, coarser when zoomed out.
pub fn grid_spacing(pixels_per_radian: f64) -> GridSpacing {
    let (ra, dec, sample) = if pixels_per_radian < 150.0 {
        (30.0, 30.0, 5.0)
    } else if pixels_per_radian < 300.0 {
        (20.0, 20.0, 2.0)
    } else if pixels_per_radian < 600.0 {
        (10.0, 10.0, 1.0)
    } else {
        (5.0, 5.0, 1.0)
    };
    GridSpacing {
        ra_step_deg: ra,
        dec_step_deg: dec,
        sample_step_deg: sample,
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GridLineKind {
    /// Line of constant RA (meridian).
    Meridian { ra: f64 },
    /// Line of constant Dec.
    Parallel { dec: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub kind: GridLineKind,
    /// Screen-space runs, each with two or more points.
    pub segments: Vec<Vec<Vec2>>,
    /// Where to put the line's label: middle vertex of its longest run.
    pub label_anchor: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Graticule {
    pub spacing: GridSpacing,
    pub lines: Vec<GridLine>,
}

/// Build the grid for the mapper's view.
///
/// Ordering contract:
/// - parallels first, south to north, then meridians in increasing RA
/// - lines with nothing inside the clip circle are omitted
pub fn build_graticule(mapper: &ScreenMapper) -> Graticule {
    let ppr = mapper.pixels_per_radian();
    let spacing = grid_spacing(ppr);
    let clip_radius = mapper.width().min(mapper.height()) / (2.0 * ppr);
    let center = mapper.center();

    let mut lines = Vec::new();

    let dec_steps = (90.0 / spacing.dec_step_deg).floor() as i64;
    for k in -dec_steps..=dec_steps {
        let dec = k as f64 * spacing.dec_step_deg;
        if dec.abs() >= 90.0 {
            continue;
        }
        let samples = steps(-180.0, 180.0, spacing.sample_step_deg)
            .map(|off| (center.ra + off, dec));
        push_line(&mut lines, GridLineKind::Parallel { dec }, mapper, clip_radius, samples);
    }

    let ra_steps = (360.0 / spacing.ra_step_deg).ceil() as i64;
    for k in 0..ra_steps {
        let ra = k as f64 * spacing.ra_step_deg;
        let samples = steps(-90.0, 90.0, spacing.sample_step_deg).map(|dec| (ra, dec));
        push_line(&mut lines, GridLineKind::Meridian { ra }, mapper, clip_radius, samples);
    }

    Graticule { spacing, lines }
}

fn push_line<I>(
    lines: &mut Vec<GridLine>,
    kind: GridLineKind,
    mapper: &ScreenMapper,
    clip_radius: f64,
    samples: I,
) where
    I: Iterator<Item = (f64, f64)>,
{
    let center = mapper.center();
    let mut segments: Vec<Vec<Vec2>> = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();

    for (ra, dec) in samples {
        let inside = project_deg(ra, dec, center.ra, center.dec)
            .visible()
            .filter(|t| t.length() <= clip_radius);
        match inside {
            Some(t) => current.push(mapper.tangent_to_screen(t)),
            None => {
                if current.len() >= 2 {
                    segments.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
    }
    if current.len() >= 2 {
        segments.push(current);
    }

    let Some(longest) = segments.iter().max_by_key(|s| s.len()) else {
        return;
    };
    let label_anchor = longest[longest.len() / 2];
    lines.push(GridLine {
        kind,
        segments,
        label_anchor,
    });
}

/// `from, from + step, ...` up to and including `to`.
fn steps(from: f64, to: f64, step: f64) -> impl Iterator<Item = f64> {
    let n = ((to - from) / step).round() as i64;
    (0..=n).map(move |i| from + i as f64 * step)
}
