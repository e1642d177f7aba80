use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use catalog::{CelestialPoint, LinePath, PathKind};
use foundation::math::{SkyCoord, hours_to_deg};
use serde::Deserialize;

use crate::error::CatalogLoadError;
use crate::source::open_source;
use crate::stars::LoadStats;

/// Read a constellation line file: one `HIP HIP` pair per line, each pair
/// drawn as a two-vertex path.
///
/// Pairs naming a star missing from `stars` are skipped, as are lines that
/// are not exactly two integers. Blank lines and `#` comments are ignored.
pub fn read_constellation_pairs<R: Read>(
    reader: R,
    origin: &Path,
    stars: &[CelestialPoint],
) -> Result<(Vec<LinePath>, LoadStats), CatalogLoadError> {
    let by_hip: HashMap<u32, SkyCoord> = stars
        .iter()
        .filter_map(|s| Some((s.id?, s.coord())))
        .collect();

    let mut paths = Vec::new();
    let mut stats = LoadStats::default();
    for (line_no, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.map_err(|source| CatalogLoadError::Io {
            path: origin.to_path_buf(),
            source,
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let ids: Vec<u32> = line.split_whitespace().filter_map(|t| t.parse().ok()).collect();
        let endpoints = match ids.as_slice() {
            [a, b] if line.split_whitespace().count() == 2 => {
                by_hip.get(a).zip(by_hip.get(b)).map(|(&p, &q)| (*a, *b, p, q))
            }
            _ => None,
        };
        let Some((a, b, p, q)) = endpoints else {
            tracing::debug!(file = %origin.display(), line = line_no + 1, "skipping constellation pair");
            stats.skipped += 1;
            continue;
        };

        paths.push(LinePath::new(
            format!("HIP {a}-{b}"),
            PathKind::Constellation,
            vec![p, q],
        ));
        stats.loaded += 1;
    }

    Ok((paths, stats))
}

pub fn load_constellation_pairs(
    path: &Path,
    stars: &[CelestialPoint],
) -> Result<(Vec<LinePath>, LoadStats), CatalogLoadError> {
    let (paths, stats) = read_constellation_pairs(open_source(path)?, path, stars)?;
    tracing::info!(
        file = %path.display(),
        loaded = stats.loaded,
        skipped = stats.skipped,
        "loaded constellation lines"
    );
    Ok((paths, stats))
}

#[derive(Debug, Deserialize)]
struct PathRow {
    name: String,
    ra: String,
    dec: String,
}

/// Read a figure table with columns `name`, `ra`, `dec`, where `ra` and
/// `dec` are bracketed lists (`"[5.91, 5.24]"`) and RA is in hours.
///
/// Rows whose lists do not parse or differ in length are skipped.
pub fn read_path_table<R: Read>(
    reader: R,
    origin: &Path,
    kind: PathKind,
) -> Result<(Vec<LinePath>, LoadStats), CatalogLoadError> {
    let csv_err = |source| CatalogLoadError::Csv {
        path: origin.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut paths = Vec::new();
    let mut stats = LoadStats::default();
    for (line, row) in rdr.deserialize::<PathRow>().enumerate() {
        let row = match row {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(csv_err(e)),
            Err(e) => {
                tracing::debug!(file = %origin.display(), line, error = %e, "skipping path row");
                stats.skipped += 1;
                continue;
            }
        };

        let vertices = parse_list(&row.ra).zip(parse_list(&row.dec)).and_then(|(ras, decs)| {
            (ras.len() == decs.len() && ras.len() >= 2).then(|| {
                ras.iter()
                    .zip(&decs)
                    .map(|(&h, &d)| SkyCoord::new(hours_to_deg(h), d))
                    .collect::<Vec<_>>()
            })
        });
        let Some(vertices) = vertices else {
            tracing::debug!(file = %origin.display(), line, name = %row.name, "skipping path row");
            stats.skipped += 1;
            continue;
        };

        paths.push(LinePath::new(row.name, kind, vertices));
        stats.loaded += 1;
    }

    Ok((paths, stats))
}

pub fn load_path_table(
    path: &Path,
    kind: PathKind,
) -> Result<(Vec<LinePath>, LoadStats), CatalogLoadError> {
    let (paths, stats) = read_path_table(open_source(path)?, path, kind)?;
    tracing::info!(
        file = %path.display(),
        ?kind,
        loaded = stats.loaded,
        skipped = stats.skipped,
        "loaded path table"
    );
    Ok((paths, stats))
}

#[derive(Debug, Deserialize)]
struct LabelRow {
    name: String,
    ra: f64,
    dec: f64,
}

/// Read a label table with columns `name`, `ra` (hours), `dec` (degrees):
/// where each named figure's title is drawn.
///
/// Rows with missing or non-finite coordinates are skipped.
pub fn read_path_labels<R: Read>(
    reader: R,
    origin: &Path,
) -> Result<(Vec<(String, SkyCoord)>, LoadStats), CatalogLoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut labels = Vec::new();
    let mut stats = LoadStats::default();
    for (line, row) in rdr.deserialize::<LabelRow>().enumerate() {
        let row = match row {
            Ok(r) if r.ra.is_finite() && r.dec.is_finite() => r,
            Ok(r) => {
                tracing::debug!(file = %origin.display(), line, name = %r.name, "skipping label row");
                stats.skipped += 1;
                continue;
            }
            Err(e) if e.is_io_error() => {
                return Err(CatalogLoadError::Csv {
                    path: origin.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                tracing::debug!(file = %origin.display(), line, error = %e, "skipping label row");
                stats.skipped += 1;
                continue;
            }
        };
        labels.push((row.name, SkyCoord::new(hours_to_deg(row.ra), row.dec)));
        stats.loaded += 1;
    }

    Ok((labels, stats))
}

pub fn load_path_labels(path: &Path) -> Result<(Vec<(String, SkyCoord)>, LoadStats), CatalogLoadError> {
    let (labels, stats) = read_path_labels(open_source(path)?, path)?;
    tracing::info!(
        file = %path.display(),
        loaded = stats.loaded,
        skipped = stats.skipped,
        "loaded path labels"
    );
    Ok((labels, stats))
}

/// Attach labels to every path with a matching name; returns how many
/// paths were labelled.
pub fn apply_labels(paths: &mut [LinePath], labels: &[(String, SkyCoord)]) -> usize {
    let by_name: HashMap<&str, SkyCoord> = labels
        .iter()
        .map(|(name, coord)| (name.as_str(), *coord))
        .collect();
    let mut applied = 0;
    for path in paths.iter_mut() {
        if let Some(&coord) = by_name.get(path.name.as_str()) {
            path.label = Some(coord);
            applied += 1;
        }
    }
    applied
}

/// `"[1.5, 2, -3]"` -> `[1.5, 2.0, -3.0]`; brackets are optional.
fn parse_list(s: &str) -> Option<Vec<f64>> {
    let inner = s.trim().trim_start_matches('[').trim_end_matches(']');
    inner
        .split(',')
        .map(|t| t.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}
