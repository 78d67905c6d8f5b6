/// Texture trait, texture descriptor, and texture info

use std::fmt;
use std::sync::Arc;

/// Texture format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    // 8-bit color formats
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    R8_UNORM,

    // Packed / high-precision color formats
    R10G10B10A2_UNORM,
    R16_SFLOAT,
    R16G16_SFLOAT,
    R16G16B16A16_SFLOAT,
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32A32_SFLOAT,

    // Depth formats
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
}

impl TextureFormat {
    /// Depth or depth/stencil format
    pub fn is_depth(&self) -> bool {
        matches!(self,
            TextureFormat::D16_UNORM | TextureFormat::D32_FLOAT | TextureFormat::D24_UNORM_S8_UINT)
    }

    /// Floating point color format
    pub fn is_float(&self) -> bool {
        matches!(self,
            TextureFormat::R16_SFLOAT
            | TextureFormat::R16G16_SFLOAT
            | TextureFormat::R16G16B16A16_SFLOAT
            | TextureFormat::R32_SFLOAT
            | TextureFormat::R32G32_SFLOAT
            | TextureFormat::R32G32B32A32_SFLOAT)
    }

    /// 8 bits per channel, normalized unsigned integer storage
    ///
    /// Required by the shared-exponent encodings (RGBE, LogLuv).
    pub fn is_8bit_unorm(&self) -> bool {
        matches!(self,
            TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::B8G8R8A8_UNORM
            | TextureFormat::R8_UNORM)
    }
}

/// Texture usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureUsage {
    /// Texture can be sampled in shaders
    Sampled,
    /// Texture can be used as render target
    RenderTarget,
    /// Texture can be used for both
    SampledAndRenderTarget,
    /// Texture can be used as depth/stencil attachment
    DepthStencil,
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
    /// Allocate a full mip chain
    pub mipmaps: bool,
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
    /// Number of mip levels (1 = no mipmaps)
    pub mip_levels: u32,
}

impl TextureInfo {
    /// Whether the texture can be bound as a render target
    pub fn is_render_target(&self) -> bool {
        matches!(self.usage, TextureUsage::RenderTarget | TextureUsage::SampledAndRenderTarget)
    }
}

// ===== TEXTURE TRAIT =====

/// Texture resource trait
///
/// Implemented by backend-specific texture types. The texture is
/// destroyed when the last `Arc` is dropped.
pub trait Texture: Send + Sync + fmt::Debug {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}

/// Identity comparison of two texture handles (same GPU object)
pub fn same_texture(a: &Arc<dyn Texture>, b: &Arc<dyn Texture>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Stable identifier of a texture handle for the lifetime of the object
pub fn texture_id(texture: &Arc<dyn Texture>) -> usize {
    Arc::as_ptr(texture) as *const () as usize
}
