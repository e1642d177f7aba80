use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use catalog::Catalog;
use scene::{FrameGeometry, PickHit, PickTarget, ViewConfig, ViewParams, ViewportState};
use serde::Serialize;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

/// Read a JSON view config; missing keys keep their defaults.
pub fn load_view_config(path: &Path) -> Result<ViewConfig, ConfigError> {
    let payload = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&payload).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Serialize)]
pub struct ParamsReport {
    pub stars: usize,
    pub paths: usize,
    pub center_ra: f64,
    pub center_dec: f64,
    pub ra_span: f64,
    pub ra_wrapped: bool,
    pub dec_min: f64,
    pub dec_max: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl ParamsReport {
    pub fn new(catalog: &Catalog, params: &ViewParams) -> Self {
        Self {
            stars: catalog.len(),
            paths: catalog.paths().len(),
            center_ra: params.center.ra,
            center_dec: params.center.dec,
            ra_span: params.ra.span,
            ra_wrapped: params.ra.wrapped,
            dec_min: params.dec.min,
            dec_max: params.dec.max,
            min_scale: params.min_scale,
            max_scale: params.max_scale,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ViewportReport {
    pub center_ra: f64,
    pub center_dec: f64,
    pub scale: f64,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
    pub generation: u64,
}

impl ViewportReport {
    pub fn new(v: &ViewportState) -> Self {
        Self {
            center_ra: v.center_ra(),
            center_dec: v.center_dec(),
            scale: v.scale(),
            zoom: v.zoom_level(),
            width: v.surface_width(),
            height: v.surface_height(),
            generation: v.generation(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StarReport {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub magnitude: f64,
    pub radius_px: u32,
}

#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub viewport: ViewportReport,
    pub visible_stars: usize,
    pub path_segments: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_lines: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<HighlightReport>,
    /// Brightest stars first.
    pub stars: Vec<StarReport>,
}

impl FrameReport {
    /// Summarize a frame, listing at most `limit` stars.
    pub fn new(catalog: &Catalog, viewport: &ViewportState, frame: &FrameGeometry, limit: usize) -> Self {
        let mut stars: Vec<StarReport> = frame
            .stars
            .iter()
            .filter_map(|s| {
                let star = catalog.star(s.index)?;
                Some(StarReport {
                    index: s.index,
                    name: star.name.clone(),
                    x: s.position.x,
                    y: s.position.y,
                    magnitude: star.magnitude,
                    radius_px: s.style.radius_px,
                })
            })
            .collect();
        stars.sort_by(|a, b| a.magnitude.total_cmp(&b.magnitude).then(a.index.cmp(&b.index)));
        stars.truncate(limit);

        Self {
            viewport: ViewportReport::new(viewport),
            visible_stars: frame.stars.len(),
            path_segments: frame.paths.len(),
            grid_lines: frame.graticule.as_ref().map(|g| g.lines.len()),
            highlight: HighlightReport::new(catalog, frame),
            stars,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HighlightReport {
    pub path: String,
    pub segments: usize,
    /// Screen position of the label, when it is drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<[f64; 2]>,
}

impl HighlightReport {
    pub fn new(catalog: &Catalog, frame: &FrameGeometry) -> Option<Self> {
        let path = catalog.paths().get(frame.highlight?)?;
        Some(Self {
            path: path.name.clone(),
            segments: frame.highlighted_segments().count(),
            label: frame.labels.first().map(|l| [l.position.x, l.position.y]),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PickReport {
    Star {
        index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        ra: f64,
        dec: f64,
        distance_px: f64,
    },
    PathVertex {
        path: String,
        vertex_index: usize,
        ra: f64,
        dec: f64,
        distance_px: f64,
    },
    NotFound,
}

impl PickReport {
    pub fn new(catalog: &Catalog, hit: Option<&PickHit>) -> Self {
        let Some(hit) = hit else {
            return PickReport::NotFound;
        };
        match hit.target {
            PickTarget::Star { index } => PickReport::Star {
                index,
                name: hit.target.name(catalog).map(str::to_string),
                ra: hit.coord.ra,
                dec: hit.coord.dec,
                distance_px: hit.distance_px,
            },
            PickTarget::PathVertex { vertex_index, .. } => PickReport::PathVertex {
                path: hit.target.name(catalog).unwrap_or_default().to_string(),
                vertex_index,
                ra: hit.coord.ra,
                dec: hit.coord.dec,
                distance_px: hit.distance_px,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, FrameReport, PickReport, load_view_config};
    use catalog::{Catalog, CelestialPoint, LinePath, PathKind};
    use foundation::math::SkyCoord;
    use scene::{ViewConfig, ViewSession};
    use std::fs;

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                CelestialPoint::new(10.0, 0.0, 3.0),
                CelestialPoint::new(12.0, 2.0, 0.5).with_name("Bright"),
                CelestialPoint::new(11.0, -1.0, 5.0),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("view.json");
        fs::write(&path, r#"{"surface_width": 1280, "pick_tolerance_px": 4}"#).expect("write");
        let cfg = load_view_config(&path).expect("load");
        assert_eq!(cfg.surface_width, 1280.0);
        assert_eq!(cfg.pick_tolerance_px, 4.0);
        assert_eq!(cfg.surface_height, ViewConfig::default().surface_height);

        fs::write(&path, "{").expect("write");
        assert!(matches!(load_view_config(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            load_view_config(&dir.path().join("missing.json")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn frame_report_lists_brightest_first() {
        let cat = catalog();
        let mut session = ViewSession::new(&cat, ViewConfig::default());
        let frame = session.frame();
        let report = FrameReport::new(&cat, session.viewport(), &frame, 2);
        assert_eq!(report.visible_stars, 3);
        assert_eq!(report.stars.len(), 2);
        assert_eq!(report.stars[0].name.as_deref(), Some("Bright"));
        assert_eq!(report.stars[1].index, 0);
    }

    #[test]
    fn frame_report_names_the_highlighted_path() {
        let stars = catalog().stars().to_vec();
        let line = LinePath::new(
            "Line",
            PathKind::Constellation,
            vec![SkyCoord::new(10.0, 0.0), SkyCoord::new(12.0, 2.0)],
        )
        .with_label(SkyCoord::new(11.0, 0.5));
        let cat = Catalog::new(stars, vec![line]);
        let mut session = ViewSession::new(&cat, ViewConfig::default());

        let frame = session.frame();
        let json = serde_json::to_value(FrameReport::new(&cat, session.viewport(), &frame, 1)).expect("json");
        assert!(json.get("highlight").is_none());

        assert!(session.highlight_path("Line"));
        let frame = session.frame();
        let json = serde_json::to_value(FrameReport::new(&cat, session.viewport(), &frame, 1)).expect("json");
        assert_eq!(json["highlight"]["path"], "Line");
        assert_eq!(json["highlight"]["segments"], 1);
        assert_eq!(json["highlight"]["label"][0], 400.0);
        assert_eq!(json["highlight"]["label"][1], 300.0);
    }

    #[test]
    fn pick_report_serializes_with_kind_tag() {
        let cat = catalog();
        let json = serde_json::to_value(PickReport::new(&cat, None)).expect("json");
        assert_eq!(json["kind"], "not_found");

        let mut session = ViewSession::new(&cat, ViewConfig::default());
        let p = session.viewport().mapper().to_screen(12.0, 2.0);
        let hit = session.pick(p.x, p.y);
        let json = serde_json::to_value(PickReport::new(&cat, hit.as_ref())).expect("json");
        assert_eq!(json["kind"], "star");
        assert_eq!(json["name"], "Bright");
    }
}
