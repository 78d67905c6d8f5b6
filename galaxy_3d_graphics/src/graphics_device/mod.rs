/// Graphics device module - the GPU backend contract consumed by the
/// post-processing pipeline, plus the render-target pool built on top of it.

pub mod graphics_device;
pub mod texture;
pub mod buffer;
pub mod effect;
pub mod render_target_pool;
pub mod graphics_service;

pub use graphics_device::*;
pub use texture::*;
pub use buffer::*;
pub use effect::*;
pub use render_target_pool::*;
pub use graphics_service::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
