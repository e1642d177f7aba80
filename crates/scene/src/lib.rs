pub mod config;
pub mod controls;
pub mod frame;
pub mod graticule;
pub mod paths;
pub mod picking;
pub mod screen;
pub mod session;
pub mod viewport;
pub mod visibility;

pub use config::ViewConfig;
pub use controls::{apply_all, apply_input};
pub use frame::{
    FrameGeometry, FrameOptions, PathLabel, StarSprite, StarStyle, build_frame, star_style,
};
pub use graticule::{GridLine, GridLineKind, GridSpacing, Graticule, build_graticule, grid_spacing};
pub use paths::{PathCache, PathSegment, segment_paths};
pub use picking::{
    DEFAULT_PICK_TOLERANCE_PX, PickHit, PickOptions, PickTarget, find_nearest, pick,
    pick_path_vertex, pick_star,
};
pub use screen::{SEGMENT_BREAK_FRACTION, ScreenMapper, split_on_jumps};
pub use session::ViewSession;
pub use viewport::{
    RaExtent, ViewParams, ViewStamp, ViewportId, ViewportState, calculate_view_params,
};
pub use visibility::{VisibleSetCache, compute_visible, is_in_view_window};
