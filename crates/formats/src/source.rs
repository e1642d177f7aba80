use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::CatalogLoadError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Open a data file, decompressing it on the fly when it has a `.gz`
/// extension or starts with the gzip magic bytes.
pub fn open_source(path: &Path) -> Result<Box<dyn Read>, CatalogLoadError> {
    let io_err = |source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);
    let gzipped = is_gzipped(path) || reader.fill_buf().map_err(io_err)?.starts_with(&GZIP_MAGIC);
    let reader: Box<dyn Read> = if gzipped {
        Box::new(GzDecoder::new(reader))
    } else {
        Box::new(reader)
    };
    Ok(reader)
}
