pub mod gesture;
pub mod input;

pub use gesture::*;
pub use input::*;
