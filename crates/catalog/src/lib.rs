use std::collections::HashMap;

use foundation::math::{SkyCoord, normalize_ra};
use serde::{Deserialize, Serialize};

/// One catalog star. Positions are degrees; RA is kept in `[0, 360)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialPoint {
    /// Catalog identifier (Hipparcos number for HYG data).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub ra: f64,
    pub dec: f64,
    pub magnitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_index: Option<f64>,
}

impl CelestialPoint {
    pub fn new(ra: f64, dec: f64, magnitude: f64) -> Self {
        Self {
            id: None,
            name: None,
            ra,
            dec,
            magnitude,
            color_index: None,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_color_index(mut self, ci: f64) -> Self {
        self.color_index = Some(ci);
        self
    }

    pub fn coord(&self) -> SkyCoord {
        SkyCoord::new(self.ra, self.dec)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Constellation,
    Asterism,
}

/// Ordered polyline on the sky: a constellation figure or asterism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePath {
    pub name: String,
    pub kind: PathKind,
    pub vertices: Vec<SkyCoord>,
    /// Where the path's name is drawn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<SkyCoord>,
}

impl LinePath {
    pub fn new(name: impl Into<String>, kind: PathKind, vertices: Vec<SkyCoord>) -> Self {
        Self {
            name: name.into(),
            kind,
            vertices,
            label: None,
        }
    }

    pub fn with_label(mut self, label: SkyCoord) -> Self {
        self.label = Some(label);
        self
    }
}

/// Serialized form of a catalog.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub stars: Vec<CelestialPoint>,
    #[serde(default)]
    pub paths: Vec<LinePath>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Corrupt(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Corrupt(msg) => write!(f, "catalog data corrupt: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Angular extent of a set of sky positions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DecRange {
    pub min: f64,
    pub max: f64,
}

impl DecRange {
    pub fn full() -> Self {
        Self {
            min: -90.0,
            max: 90.0,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) * 0.5
    }
}

/// Read-only star catalog plus line paths.
///
/// Invariants (established at construction):
/// - every star and path vertex has RA in `[0, 360)` and Dec in `[-90, 90]`
/// - the star order is the load order and never changes; the viewport engine
///   refers to stars by index
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Catalog {
    stars: Vec<CelestialPoint>,
    paths: Vec<LinePath>,
    by_id: HashMap<u32, usize>,
}

impl Catalog {
    pub fn new(mut stars: Vec<CelestialPoint>, mut paths: Vec<LinePath>) -> Self {
        for s in &mut stars {
            s.ra = normalize_ra(s.ra);
            s.dec = s.dec.clamp(-90.0, 90.0);
        }
        for p in &mut paths {
            for v in &mut p.vertices {
                *v = v.normalized();
            }
            p.label = p.label.map(SkyCoord::normalized);
        }

        let mut by_id = HashMap::new();
        for (i, s) in stars.iter().enumerate() {
            if let Some(id) = s.id {
                // First occurrence wins for duplicated ids.
                by_id.entry(id).or_insert(i);
            }
        }

        Self {
            stars,
            paths,
            by_id,
        }
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self::new(snapshot.stars, snapshot.paths)
    }

    pub fn to_snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            stars: self.stars.clone(),
            paths: self.paths.clone(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, CatalogError> {
        let snapshot: CatalogSnapshot =
            serde_json::from_str(s).map_err(|e| CatalogError::Corrupt(e.to_string()))?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn to_json_string(&self) -> Result<String, CatalogError> {
        serde_json::to_string_pretty(&self.to_snapshot())
            .map_err(|e| CatalogError::Corrupt(e.to_string()))
    }

    pub fn stars(&self) -> &[CelestialPoint] {
        &self.stars
    }

    pub fn paths(&self) -> &[LinePath] {
        &self.paths
    }

    pub fn star(&self, index: usize) -> Option<&CelestialPoint> {
        self.stars.get(index)
    }

    pub fn star_by_id(&self, id: u32) -> Option<&CelestialPoint> {
        self.by_id.get(&id).map(|&i| &self.stars[i])
    }

    pub fn path(&self, name: &str) -> Option<&LinePath> {
        self.paths.iter().find(|p| p.name == name)
    }

    /// Index of the first path called `name`.
    pub fn path_index(&self, name: &str) -> Option<usize> {
        self.paths.iter().position(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// RA of every star, in catalog order.
    pub fn ra_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.stars.iter().map(|s| s.ra)
    }

    /// Declination extent of the stars; `None` for an empty catalog.
    pub fn dec_range(&self) -> Option<DecRange> {
        let mut it = self.stars.iter().map(|s| s.dec);
        let first = it.next()?;
        let (min, max) = it.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(DecRange { min, max })
    }
}
