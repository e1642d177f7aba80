pub mod angle;
pub mod gnomonic;
pub mod precision;
pub mod vec;

pub use angle::*;
pub use gnomonic::*;
pub use precision::*;
pub use vec::*;
