use std::io::Read;
use std::path::Path;

use catalog::CelestialPoint;
use foundation::math::hours_to_deg;
use serde::Deserialize;

use crate::angle::{parse_dec_dms, parse_ra_hms};
use crate::error::CatalogLoadError;
use crate::source::open_source;

/// Row counts from one table.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LoadStats {
    pub loaded: usize,
    pub skipped: usize,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HygOptions {
    /// Keep only rows with a Hipparcos number (needed for constellation
    /// line files, which refer to stars by HIP id).
    pub require_hip: bool,
    /// Drop stars fainter than this.
    pub magnitude_limit: Option<f64>,
}

impl Default for HygOptions {
    fn default() -> Self {
        Self {
            require_hip: true,
            magnitude_limit: None,
        }
    }
}

struct HygColumns {
    ra: usize,
    dec: usize,
    mag: usize,
    hip: Option<usize>,
    proper: Option<usize>,
    ci: Option<usize>,
}

impl HygColumns {
    fn resolve(headers: &csv::StringRecord, origin: &Path) -> Result<Self, CatalogLoadError> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let required = |name: &'static str| {
            find(name).ok_or_else(|| CatalogLoadError::MissingColumn {
                path: origin.to_path_buf(),
                column: name,
            })
        };
        Ok(Self {
            ra: required("ra")?,
            dec: required("dec")?,
            mag: required("mag")?,
            hip: find("hip"),
            proper: find("proper"),
            ci: find("ci"),
        })
    }
}

/// Read an HYG-style star table: `ra` in hours, `dec` and `mag` in degrees
/// and magnitudes, optional `hip`, `proper` and `ci`.
///
/// Rows that do not parse are skipped and counted.
pub fn read_hyg_stars<R: Read>(
    reader: R,
    origin: &Path,
    opts: HygOptions,
) -> Result<(Vec<CelestialPoint>, LoadStats), CatalogLoadError> {
    let csv_err = |source| CatalogLoadError::Csv {
        path: origin.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let cols = HygColumns::resolve(rdr.headers().map_err(csv_err)?, origin)?;

    let mut stars = Vec::new();
    let mut stats = LoadStats::default();
    for (line, record) in rdr.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(csv_err(e)),
            Err(e) => {
                tracing::debug!(file = %origin.display(), line, error = %e, "skipping unreadable row");
                stats.skipped += 1;
                continue;
            }
        };

        let Some(star) = hyg_row(&record, &cols, opts) else {
            tracing::debug!(file = %origin.display(), line, "skipping star row");
            stats.skipped += 1;
            continue;
        };
        stars.push(star);
        stats.loaded += 1;
    }

    Ok((stars, stats))
}

fn hyg_row(record: &csv::StringRecord, cols: &HygColumns, opts: HygOptions) -> Option<CelestialPoint> {
    let field = |i: usize| record.get(i).filter(|s| !s.is_empty());
    let float = |i: usize| field(i)?.parse::<f64>().ok().filter(|v| v.is_finite());

    let ra_hours = float(cols.ra)?;
    let dec = float(cols.dec)?;
    let mag = float(cols.mag)?;
    if !(-90.0..=90.0).contains(&dec) {
        return None;
    }
    if opts.magnitude_limit.is_some_and(|limit| mag > limit) {
        return None;
    }

    let hip = cols.hip.and_then(field).and_then(|s| s.parse::<u32>().ok()).filter(|&h| h > 0);
    if opts.require_hip && hip.is_none() {
        return None;
    }

    let mut star = CelestialPoint::new(hours_to_deg(ra_hours), dec, mag);
    star.id = hip;
    star.name = cols.proper.and_then(field).map(str::to_string);
    star.color_index = cols.ci.and_then(float);
    Some(star)
}

pub fn load_hyg_stars(
    path: &Path,
    opts: HygOptions,
) -> Result<(Vec<CelestialPoint>, LoadStats), CatalogLoadError> {
    let (stars, stats) = read_hyg_stars(open_source(path)?, path, opts)?;
    tracing::info!(
        file = %path.display(),
        loaded = stats.loaded,
        skipped = stats.skipped,
        "loaded HYG stars"
    );
    Ok((stars, stats))
}

#[derive(Debug, Deserialize)]
struct NamedStarRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Right Ascension")]
    ra: String,
    #[serde(rename = "Declination")]
    dec: String,
    #[serde(rename = "Apparent Magnitude")]
    magnitude: f64,
}

/// Read a named-star table (`Name`, `Right Ascension` as `"5h 55m 10.3s"`,
/// `Declination` as `"7° 24′ 25″"`, `Apparent Magnitude`).
pub fn read_named_stars<R: Read>(
    reader: R,
    origin: &Path,
) -> Result<(Vec<CelestialPoint>, LoadStats), CatalogLoadError> {
    let csv_err = |source| CatalogLoadError::Csv {
        path: origin.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?;
    for column in ["Name", "Right Ascension", "Declination", "Apparent Magnitude"] {
        if !headers.iter().any(|h| h == column) {
            return Err(CatalogLoadError::MissingColumn {
                path: origin.to_path_buf(),
                column,
            });
        }
    }

    let mut stars = Vec::new();
    let mut stats = LoadStats::default();
    for (line, row) in rdr.deserialize::<NamedStarRow>().enumerate() {
        let row = match row {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(csv_err(e)),
            Err(e) => {
                tracing::debug!(file = %origin.display(), line, error = %e, "skipping star row");
                stats.skipped += 1;
                continue;
            }
        };

        let coords = parse_ra_hms(&row.ra).and_then(|ra| Ok((ra, parse_dec_dms(&row.dec)?)));
        match coords {
            Ok((ra, dec)) if row.magnitude.is_finite() => {
                stars.push(CelestialPoint::new(ra, dec, row.magnitude).with_name(row.name));
                stats.loaded += 1;
            }
            Ok(_) => {
                tracing::debug!(file = %origin.display(), line, "skipping star with bad magnitude");
                stats.skipped += 1;
            }
            Err(e) => {
                tracing::debug!(file = %origin.display(), line, error = %e, "skipping star row");
                stats.skipped += 1;
            }
        }
    }

    Ok((stars, stats))
}

pub fn load_named_stars(path: &Path) -> Result<(Vec<CelestialPoint>, LoadStats), CatalogLoadError> {
    let (stars, stats) = read_named_stars(open_source(path)?, path)?;
    tracing::info!(
        file = %path.display(),
        loaded = stats.loaded,
        skipped = stats.skipped,
        "loaded named stars"
    );
    Ok((stars, stats))
}
