//! Render module - per-frame state shared by scene queries and the
//! post-processing pipeline.

mod render_context;

pub use render_context::{RenderContext, ContextKey, GBuffer, TargetState};
