//! Scene queries.
//!
//! A query takes a reference node (the light of a shadow pass, the camera
//! of a view) and the enabled candidate nodes gathered by `Scene`, and
//! keeps its result in a reusable container. `Scene::query` caches one
//! container per (query type, reference node) and frame.

mod scene_query;
mod lod;
mod shadow_caster_query;
mod camera_frustum_query;

pub use scene_query::SceneQuery;
pub use lod::{lod_distance, is_distance_culled};
pub use shadow_caster_query::ShadowCasterQuery;
pub use camera_frustum_query::CameraFrustumQuery;

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
