//! Camera module: shared camera definitions, per-frame view snapshots
//! and the view-dependent data registry.

mod camera;
mod camera_view;
mod view_dependent_cache;

pub use camera::{Camera, Projection};
pub use camera_view::CameraView;
pub use view_dependent_cache::ViewDependentCache;
