pub mod angle;
pub mod error;
pub mod lines;
pub mod manifest;
pub mod package;
pub mod source;
pub mod stars;

pub use angle::{AngleParseError, parse_dec_dms, parse_ra_hms};
pub use error::CatalogLoadError;
pub use lines::{
    apply_labels, load_constellation_pairs, load_path_labels, load_path_table,
    read_constellation_pairs, read_path_labels, read_path_table,
};
pub use manifest::*;
pub use package::*;
pub use source::open_source;
pub use stars::{
    HygOptions, LoadStats, load_hyg_stars, load_named_stars, read_hyg_stars, read_named_stars,
};
