use std::fmt;
use std::path::PathBuf;

use catalog::CatalogError;

#[derive(Debug)]
pub enum CatalogLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
    MissingColumn {
        path: PathBuf,
        column: &'static str,
    },
    Manifest(serde_json::Error),
    UnsupportedVersion {
        found: String,
    },
    Catalog(CatalogError),
}

impl fmt::Display for CatalogLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogLoadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            CatalogLoadError::Csv { path, source } => {
                write!(f, "malformed csv in {}: {source}", path.display())
            }
            CatalogLoadError::MissingColumn { path, column } => {
                write!(f, "{} has no '{column}' column", path.display())
            }
            CatalogLoadError::Manifest(err) => write!(f, "catalog manifest parse error: {err}"),
            CatalogLoadError::UnsupportedVersion { found } => {
                write!(f, "unsupported catalog manifest version: {found}")
            }
            CatalogLoadError::Catalog(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CatalogLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogLoadError::Io { source, .. } => Some(source),
            CatalogLoadError::Csv { source, .. } => Some(source),
            CatalogLoadError::Manifest(err) => Some(err),
            CatalogLoadError::Catalog(err) => Some(err),
            CatalogLoadError::MissingColumn { .. } | CatalogLoadError::UnsupportedVersion { .. } => {
                None
            }
        }
    }
}

impl From<CatalogError> for CatalogLoadError {
    fn from(err: CatalogError) -> Self {
        CatalogLoadError::Catalog(err)
    }
}
