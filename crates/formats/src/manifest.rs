use serde::{Deserialize, Serialize};

pub const MANIFEST_VERSION: &str = "1.0";

/// Lists the files a catalog is assembled from. Paths are relative to the
/// manifest's directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogManifest {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub sources: Vec<SourceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceEntry {
    pub kind: SourceKind,
    pub path: String,
    /// HYG only: drop stars fainter than this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude_limit: Option<f64>,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// HYG-style star table (`.csv` or `.csv.gz`).
    HygStars,
    /// Table of named stars with sexagesimal coordinates.
    NamedStars,
    /// `HIP HIP` pairs; resolved against stars loaded earlier in the list.
    ConstellationLines,
    /// Bracketed-list figure table drawn as constellations.
    ConstellationFigures,
    /// Bracketed-list figure table drawn as asterisms.
    Asterisms,
    /// `name, ra, dec` label positions for paths loaded earlier in the list.
    PathLabels,
    /// A serialized catalog snapshot, merged in as-is.
    CatalogJson,
}

impl CatalogManifest {
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            name: None,
            sources: Vec::new(),
        }
    }

    pub fn with_source(mut self, kind: SourceKind, path: impl Into<String>) -> Self {
        self.sources.push(SourceEntry {
            kind,
            path: path.into(),
            magnitude_limit: None,
        });
        self
    }
}

impl Default for CatalogManifest {
    fn default() -> Self {
        Self::new()
    }
}
