/// GraphicsDevice trait - the fixed-function GPU backend contract.
///
/// The post-processing pipeline only needs a small surface: create
/// textures/buffers, load effects, bind a render target and a viewport,
/// set effect parameters, apply a pass and draw a fullscreen quad.

use std::sync::Arc;
use crate::error::Result;
use super::{Texture, TextureDesc, TextureFormat, Buffer, BufferDesc, Effect, EffectParameter, EffectPass, ParamValue};

// ===== VIEWPORT =====

/// Viewport for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full viewport of a `width` x `height` target
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Width over height (1.0 for an empty viewport)
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 { self.width / self.height } else { 1.0 }
    }
}

// ===== SAMPLER =====

/// Sampler configuration for a texture slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerType {
    /// Nearest filtering, clamp to edge
    PointClamp,
    /// Bilinear filtering, clamp to edge
    LinearClamp,
    /// Nearest filtering, repeat
    PointRepeat,
    /// Bilinear filtering, repeat
    LinearRepeat,
}

impl SamplerType {
    /// Whether the sampler interpolates between texels
    pub fn is_linear(&self) -> bool {
        matches!(self, SamplerType::LinearClamp | SamplerType::LinearRepeat)
    }
}

// ===== CAPABILITIES =====

/// Static device capabilities
#[derive(Debug, Clone, Default)]
pub struct DeviceCapabilities {
    /// Formats that support bilinear filtering when sampled
    pub filterable_formats: Vec<TextureFormat>,
}

impl DeviceCapabilities {
    /// Whether the hardware can bilinearly filter `format`
    pub fn supports_filtering(&self, format: TextureFormat) -> bool {
        self.filterable_formats.contains(&format)
    }
}

// ===== GRAPHICS DEVICE TRAIT =====

/// GPU backend consumed by the post-processing pipeline.
///
/// Shared as `Arc<Mutex<dyn GraphicsDevice>>`. Callers keep each lock
/// scope short and never call into the render-target pool or another
/// filter while holding it.
pub trait GraphicsDevice: Send {
    /// Create a texture
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a buffer
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Load a compiled effect by name
    fn load_effect(&mut self, name: &str) -> Result<Arc<dyn Effect>>;

    /// Bind a render target (`None` = back buffer)
    fn set_render_target(&mut self, target: Option<&Arc<dyn Texture>>) -> Result<()>;

    /// Set the viewport for the following draws
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Configure the sampler of a texture slot
    fn set_sampler_state(&mut self, slot: u32, sampler: SamplerType) -> Result<()>;

    /// Set an effect parameter value
    fn set_parameter(&mut self, parameter: &EffectParameter, value: ParamValue) -> Result<()>;

    /// Make a pass current for the following draws
    fn apply_pass(&mut self, pass: &EffectPass) -> Result<()>;

    /// Draw a quad covering the current viewport
    fn draw_fullscreen_quad(&mut self) -> Result<()>;

    /// Copy `source` into the current render target (stretching to the viewport)
    fn blit(&mut self, source: &Arc<dyn Texture>) -> Result<()>;

    /// Size of the back buffer in pixels
    fn back_buffer_size(&self) -> (u32, u32);

    /// Device capabilities
    fn capabilities(&self) -> DeviceCapabilities;
}
