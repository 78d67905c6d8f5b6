/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Records every command, hands out mock textures/buffers/effects and
/// flags read/write hazards: a texture bound as an effect parameter (or
/// blitted) while it is the current render target.

use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    GraphicsDevice, Texture, TextureDesc, TextureInfo, TextureFormat, TextureUsage,
    Buffer, BufferDesc, Effect, EffectParameter, EffectPass, ParamValue,
    Viewport, SamplerType, DeviceCapabilities, texture_id,
};

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
    pub name: String,
}

impl MockTexture {
    pub fn new(width: u32, height: u32, format: TextureFormat, name: &str) -> Self {
        Self {
            info: TextureInfo {
                width,
                height,
                format,
                usage: if format.is_depth() {
                    TextureUsage::DepthStencil
                } else {
                    TextureUsage::SampledAndRenderTarget
                },
                mip_levels: 1,
            },
            name: name.to_string(),
        }
    }

    /// Shared handle, as filters see textures
    pub fn shared(width: u32, height: u32, format: TextureFormat, name: &str) -> Arc<dyn Texture> {
        Arc::new(Self::new(width, height, format, name))
    }
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

// ============================================================================
// Mock Buffer
// ============================================================================

pub struct MockBuffer {
    pub size: u64,
    pub data: Mutex<Vec<u8>>,
}

impl MockBuffer {
    pub fn new(size: u64) -> Self {
        Self { size, data: Mutex::new(vec![0; size as usize]) }
    }
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset as usize + data.len();
        if end > self.size as usize {
            engine_bail!(InvalidResource, "galaxy3d::mock",
                "Buffer update out of range ({} > {})", end, self.size);
        }
        let mut storage = self.data.lock().unwrap();
        storage[offset as usize..end].copy_from_slice(data);
        Ok(())
    }
}

// ============================================================================
// Mock Effect
// ============================================================================

/// Effect exposing every parameter and pass except the ones listed as missing
#[derive(Debug)]
pub struct MockEffect {
    pub name: String,
    pub missing: Vec<String>,
}

impl Effect for MockEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameter(&self, name: &str) -> Option<EffectParameter> {
        if self.missing.iter().any(|m| m == name) {
            return None;
        }
        Some(EffectParameter { effect: self.name.clone(), name: name.to_string(), slot: 0 })
    }

    fn pass(&self, name: &str) -> Option<EffectPass> {
        if self.missing.iter().any(|m| m == name) {
            return None;
        }
        Some(EffectPass { effect: self.name.clone(), name: name.to_string(), index: 0 })
    }
}

// ============================================================================
// Recorded commands
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CreateTexture { width: u32, height: u32, format: TextureFormat },
    /// Render target id (`None` = back buffer)
    SetRenderTarget(Option<usize>),
    SetViewport(Viewport),
    SetSampler { slot: u32, sampler: SamplerType },
    /// Texture parameters record the texture id, other values their Debug text
    SetParameter { effect: String, name: String, texture: Option<usize>, value: String },
    ApplyPass { effect: String, pass: String },
    DrawFullscreenQuad,
    Blit { source: usize },
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

pub struct MockGraphicsDevice {
    pub commands: Vec<DeviceCommand>,
    /// Descriptions of read/write hazards detected at draw time
    pub hazards: Vec<String>,
    pub capabilities: DeviceCapabilities,
    pub back_buffer: (u32, u32),
    /// Parameter names reported as missing by every loaded effect
    pub missing_parameters: Vec<String>,
    current_target: Option<usize>,
    bound_textures: Vec<(String, usize)>,
    textures_created: usize,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            hazards: Vec::new(),
            capabilities: DeviceCapabilities {
                filterable_formats: vec![
                    TextureFormat::R8G8B8A8_UNORM,
                    TextureFormat::R8G8B8A8_SRGB,
                    TextureFormat::B8G8R8A8_UNORM,
                    TextureFormat::B8G8R8A8_SRGB,
                    TextureFormat::R8_UNORM,
                    TextureFormat::R10G10B10A2_UNORM,
                    TextureFormat::R16_SFLOAT,
                    TextureFormat::R16G16_SFLOAT,
                    TextureFormat::R16G16B16A16_SFLOAT,
                ],
            },
            back_buffer: (800, 600),
            missing_parameters: Vec::new(),
            current_target: None,
            bound_textures: Vec::new(),
            textures_created: 0,
        }
    }

    /// Shared handle as expected by `GraphicsService`
    pub fn shared() -> Arc<Mutex<MockGraphicsDevice>> {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn textures_created(&self) -> usize {
        self.textures_created
    }

    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DeviceCommand::DrawFullscreenQuad)).count()
    }

    /// Names of the passes applied, in order
    pub fn applied_passes(&self) -> Vec<String> {
        self.commands.iter().filter_map(|c| match c {
            DeviceCommand::ApplyPass { pass, .. } => Some(pass.clone()),
            _ => None,
        }).collect()
    }

    /// Render targets bound, in order
    pub fn render_targets(&self) -> Vec<Option<usize>> {
        self.commands.iter().filter_map(|c| match c {
            DeviceCommand::SetRenderTarget(target) => Some(*target),
            _ => None,
        }).collect()
    }

    /// Last recorded value of a non-texture parameter
    pub fn last_parameter_value(&self, name: &str) -> Option<String> {
        self.commands.iter().rev().find_map(|c| match c {
            DeviceCommand::SetParameter { name: n, value, .. } if n == name => Some(value.clone()),
            _ => None,
        })
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    fn check_hazards(&mut self, what: &str) {
        if let Some(target) = self.current_target {
            for (name, id) in &self.bound_textures {
                if *id == target {
                    self.hazards.push(format!("{}: '{}' is also the render target", what, name));
                }
            }
        }
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!(InvalidResource, "galaxy3d::mock",
                "create_texture: zero size {}x{}", desc.width, desc.height);
        }
        self.textures_created += 1;
        self.commands.push(DeviceCommand::CreateTexture {
            width: desc.width,
            height: desc.height,
            format: desc.format,
        });
        let name = format!("texture_{}", self.textures_created);
        let mut texture = MockTexture::new(desc.width, desc.height, desc.format, &name);
        texture.info.usage = desc.usage;
        if desc.mipmaps {
            texture.info.mip_levels = 32 - desc.width.max(desc.height).leading_zeros();
        }
        Ok(Arc::new(texture))
    }

    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        Ok(Arc::new(MockBuffer::new(desc.size)))
    }

    fn load_effect(&mut self, name: &str) -> Result<Arc<dyn Effect>> {
        Ok(Arc::new(MockEffect { name: name.to_string(), missing: self.missing_parameters.clone() }))
    }

    fn set_render_target(&mut self, target: Option<&Arc<dyn Texture>>) -> Result<()> {
        let id = target.map(texture_id);
        self.current_target = id;
        self.commands.push(DeviceCommand::SetRenderTarget(id));
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.commands.push(DeviceCommand::SetViewport(viewport));
        Ok(())
    }

    fn set_sampler_state(&mut self, slot: u32, sampler: SamplerType) -> Result<()> {
        self.commands.push(DeviceCommand::SetSampler { slot, sampler });
        Ok(())
    }

    fn set_parameter(&mut self, parameter: &EffectParameter, value: ParamValue) -> Result<()> {
        let (texture, text) = match &value {
            ParamValue::Texture(texture) => {
                let id = texture_id(texture);
                self.bound_textures.retain(|(name, _)| name != &parameter.name);
                self.bound_textures.push((parameter.name.clone(), id));
                (Some(id), String::new())
            }
            other => (None, format!("{:?}", other)),
        };
        self.commands.push(DeviceCommand::SetParameter {
            effect: parameter.effect.clone(),
            name: parameter.name.clone(),
            texture,
            value: text,
        });
        Ok(())
    }

    fn apply_pass(&mut self, pass: &EffectPass) -> Result<()> {
        self.commands.push(DeviceCommand::ApplyPass {
            effect: pass.effect.clone(),
            pass: pass.name.clone(),
        });
        Ok(())
    }

    fn draw_fullscreen_quad(&mut self) -> Result<()> {
        self.check_hazards("draw");
        // Bindings are consumed by the draw
        self.bound_textures.clear();
        self.commands.push(DeviceCommand::DrawFullscreenQuad);
        Ok(())
    }

    fn blit(&mut self, source: &Arc<dyn Texture>) -> Result<()> {
        let id = texture_id(source);
        if self.current_target == Some(id) {
            self.hazards.push("blit: source is also the render target".to_string());
        }
        self.commands.push(DeviceCommand::Blit { source: id });
        Ok(())
    }

    fn back_buffer_size(&self) -> (u32, u32) {
        self.back_buffer
    }

    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities.clone()
    }
}
