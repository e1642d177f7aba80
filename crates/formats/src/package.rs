use std::fs;
use std::path::{Path, PathBuf};

use catalog::{Catalog, CelestialPoint, LinePath, PathKind};

use crate::error::CatalogLoadError;
use crate::lines::{apply_labels, load_constellation_pairs, load_path_labels, load_path_table};
use crate::manifest::{CatalogManifest, MANIFEST_VERSION, SourceEntry, SourceKind};
use crate::stars::{HygOptions, load_hyg_stars, load_named_stars};

pub const MANIFEST_FILE_NAME: &str = "catalog.manifest.json";

/// A directory holding a catalog manifest and the files it lists.
#[derive(Debug, Clone)]
pub struct CatalogPackage {
    root: PathBuf,
    manifest: CatalogManifest,
}

impl CatalogPackage {
    /// Load `catalog.manifest.json` from `root`.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let root = root.as_ref().to_path_buf();
        let manifest_path = root.join(MANIFEST_FILE_NAME);
        let payload = fs::read_to_string(&manifest_path).map_err(|source| CatalogLoadError::Io {
            path: manifest_path.clone(),
            source,
        })?;
        let manifest: CatalogManifest =
            serde_json::from_str(&payload).map_err(CatalogLoadError::Manifest)?;
        Self::from_manifest(root, manifest)
    }

    pub fn from_manifest(
        root: impl Into<PathBuf>,
        manifest: CatalogManifest,
    ) -> Result<Self, CatalogLoadError> {
        if manifest.version != MANIFEST_VERSION {
            return Err(CatalogLoadError::UnsupportedVersion {
                found: manifest.version,
            });
        }
        Ok(Self {
            root: root.into(),
            manifest,
        })
    }

    pub fn manifest(&self) -> &CatalogManifest {
        &self.manifest
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read every source in manifest order and assemble the catalog.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogLoadError> {
        let mut stars: Vec<CelestialPoint> = Vec::new();
        let mut paths: Vec<LinePath> = Vec::new();

        for entry in &self.manifest.sources {
            self.load_source(entry, &mut stars, &mut paths)?;
        }

        let catalog = Catalog::new(stars, paths);
        tracing::info!(
            root = %self.root.display(),
            stars = catalog.len(),
            paths = catalog.paths().len(),
            "catalog assembled"
        );
        Ok(catalog)
    }

    fn load_source(
        &self,
        entry: &SourceEntry,
        stars: &mut Vec<CelestialPoint>,
        paths: &mut Vec<LinePath>,
    ) -> Result<(), CatalogLoadError> {
        let path = self.root.join(&entry.path);
        match entry.kind {
            SourceKind::HygStars => {
                let opts = HygOptions {
                    magnitude_limit: entry.magnitude_limit,
                    ..HygOptions::default()
                };
                stars.extend(load_hyg_stars(&path, opts)?.0);
            }
            SourceKind::NamedStars => stars.extend(load_named_stars(&path)?.0),
            SourceKind::ConstellationLines => {
                paths.extend(load_constellation_pairs(&path, stars)?.0);
            }
            SourceKind::ConstellationFigures => {
                paths.extend(load_path_table(&path, PathKind::Constellation)?.0);
            }
            SourceKind::Asterisms => paths.extend(load_path_table(&path, PathKind::Asterism)?.0),
            SourceKind::PathLabels => {
                let (labels, _) = load_path_labels(&path)?;
                let applied = apply_labels(paths, &labels);
                tracing::debug!(file = %path.display(), applied, "path labels applied");
            }
            SourceKind::CatalogJson => {
                let snapshot = load_catalog_json(&path)?.to_snapshot();
                stars.extend(snapshot.stars);
                paths.extend(snapshot.paths);
            }
        }
        Ok(())
    }
}

pub fn load_catalog_json(path: &Path) -> Result<Catalog, CatalogLoadError> {
    let payload = fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Catalog::from_json_str(&payload)?)
}

pub fn save_catalog_json(catalog: &Catalog, path: &Path) -> Result<(), CatalogLoadError> {
    let payload = catalog.to_json_string()?;
    fs::write(path, payload).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a catalog from a JSON snapshot file, a package directory, or a
/// single star table (chosen by extension).
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogLoadError> {
    if path.is_dir() {
        return CatalogPackage::load(path)?.load_catalog();
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if name.ends_with(".json") {
        load_catalog_json(path)
    } else {
        let (stars, _) = load_hyg_stars(path, HygOptions::default())?;
        Ok(Catalog::new(stars, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogPackage, MANIFEST_FILE_NAME, load_catalog, save_catalog_json};
    use crate::error::CatalogLoadError;
    use crate::manifest::{CatalogManifest, SourceKind};
    use catalog::{Catalog, CelestialPoint, PathKind};
    use std::fs;

    const HYG: &str = "\
id,hip,proper,ra,dec,mag,ci
1,27989,Betelgeuse,5.919529,7.407063,0.45,1.5
2,24436,Rigel,5.242298,-8.201640,0.18,-0.03
3,25336,Bellatrix,5.418851,6.349702,1.64,-0.22
";

    #[test]
    fn package_assembles_stars_then_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("hyg.csv"), HYG).expect("hyg");
        fs::write(dir.path().join("lines.txt"), "24436 25336\n25336 27989\n").expect("lines");
        fs::write(
            dir.path().join("asterisms.csv"),
            "name,ra,dec\nShoulders,\"[5.92, 5.42]\",\"[7.41, 6.35]\"\n",
        )
        .expect("asterisms");
        fs::write(dir.path().join("names.csv"), "name,ra,dec\nShoulders,5.6,7\n").expect("names");

        let manifest = CatalogManifest::new()
            .with_source(SourceKind::HygStars, "hyg.csv")
            .with_source(SourceKind::ConstellationLines, "lines.txt")
            .with_source(SourceKind::Asterisms, "asterisms.csv")
            .with_source(SourceKind::PathLabels, "names.csv");
        fs::write(
            dir.path().join(MANIFEST_FILE_NAME),
            serde_json::to_string(&manifest).expect("json"),
        )
        .expect("manifest");

        let catalog = load_catalog(dir.path()).expect("load");
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.paths().len(), 3);
        assert_eq!(catalog.paths()[2].kind, PathKind::Asterism);
        let label = catalog.paths()[2].label.expect("label");
        assert!((label.ra - 84.0).abs() < 1e-9);
        assert_eq!(catalog.paths()[0].label, None);
        assert_eq!(
            catalog.star_by_id(24436).and_then(|s| s.name.as_deref()),
            Some("Rigel")
        );
    }

    #[test]
    fn unsupported_manifest_version() {
        let mut manifest = CatalogManifest::new();
        manifest.version = "9.9".to_string();
        let err = CatalogPackage::from_manifest("/tmp", manifest).expect_err("must fail");
        assert!(matches!(err, CatalogLoadError::UnsupportedVersion { .. }));
    }

    #[test]
    fn json_snapshot_round_trip_through_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        let catalog = Catalog::new(
            vec![CelestialPoint::new(10.0, 20.0, 3.0).with_name("Test")],
            Vec::new(),
        );
        save_catalog_json(&catalog, &path).expect("save");
        let back = load_catalog(&path).expect("load");
        assert_eq!(back, catalog);
    }

    #[test]
    fn corrupt_json_is_a_catalog_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"stars\": 5}").expect("write");
        let err = load_catalog(&path).expect_err("must fail");
        assert!(matches!(err, CatalogLoadError::Catalog(_)));
    }
}
