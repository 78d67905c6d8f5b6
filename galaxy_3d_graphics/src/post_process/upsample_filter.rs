/// Resolution increase, optionally depth-aware.
///
/// The depth-aware modes compare the full-resolution G-buffer depth with
/// the low-resolution depth published under `ContextKey::DepthBufferHalf`
/// to avoid bleeding low-resolution results across silhouettes.
///
/// When `rebuild_z_buffer` is set and a `DepthRebuilder` is published under
/// `ContextKey::RebuildZBufferRenderer`, it runs after the upsample.

use std::sync::Arc;
use glam::Vec2;
use crate::error::Result;
use crate::{engine_bail, engine_debug};
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, ParamValue, SamplerType,
};
use crate::render::{ContextKey, RenderContext};
use super::post_processor::{post_processor_common, require_source, FullscreenDraw, PostProcessor};

const EFFECT: &str = "Upsample";

/// Re-renders the depth buffer once an upsample changed the color target
pub trait DepthRebuilder: Send + Sync {
    fn rebuild_depth(&self, context: &RenderContext) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsampleMode {
    /// Nearest texel
    Point,
    /// Bilinear
    Linear,
    /// Bilinear weighted by depth similarity
    Bilateral,
    /// Texel whose low-resolution depth is closest to the full-resolution one
    NearestDepth,
}

impl UpsampleMode {
    fn is_depth_aware(self) -> bool {
        matches!(self, UpsampleMode::Bilateral | UpsampleMode::NearestDepth)
    }
}

struct UpsampleEffect {
    point_pass: EffectPass,
    linear_pass: EffectPass,
    bilateral_pass: EffectPass,
    nearest_depth_pass: EffectPass,
    source: EffectParameter,
    depth: EffectParameter,
    depth_low: EffectParameter,
    texel_size: EffectParameter,
    depth_threshold: EffectParameter,
}

pub struct UpsampleFilter {
    enabled: bool,
    effect: UpsampleEffect,
    mode: UpsampleMode,
    depth_threshold: f32,
    rebuild_z_buffer: bool,
}

impl UpsampleFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = UpsampleEffect {
            point_pass: require_pass(effect.as_ref(), "UpsamplePoint")?,
            linear_pass: require_pass(effect.as_ref(), "UpsampleLinear")?,
            bilateral_pass: require_pass(effect.as_ref(), "UpsampleBilateral")?,
            nearest_depth_pass: require_pass(effect.as_ref(), "UpsampleNearestDepth")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            depth: require_parameter(effect.as_ref(), "DepthTexture")?,
            depth_low: require_parameter(effect.as_ref(), "DepthTextureLow")?,
            texel_size: require_parameter(effect.as_ref(), "TexelSize")?,
            depth_threshold: require_parameter(effect.as_ref(), "DepthThreshold")?,
        };
        Ok(Self {
            enabled: true,
            effect,
            mode: UpsampleMode::Linear,
            depth_threshold: 0.01,
            rebuild_z_buffer: false,
        })
    }

    pub fn mode(&self) -> UpsampleMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: UpsampleMode) {
        self.mode = mode;
    }

    pub fn depth_threshold(&self) -> f32 {
        self.depth_threshold
    }

    /// Relative depth difference above which texels are treated as
    /// belonging to different surfaces
    ///
    /// # Errors
    ///
    /// `Error::Configuration` unless finite and positive.
    pub fn set_depth_threshold(&mut self, threshold: f32) -> Result<()> {
        if !(threshold > 0.0 && threshold.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::UpsampleFilter",
                "Depth threshold must be positive (got {})", threshold);
        }
        self.depth_threshold = threshold;
        Ok(())
    }

    pub fn rebuild_z_buffer(&self) -> bool {
        self.rebuild_z_buffer
    }

    pub fn set_rebuild_z_buffer(&mut self, rebuild: bool) {
        self.rebuild_z_buffer = rebuild;
    }
}

impl PostProcessor for UpsampleFilter {
    post_processor_common!("galaxy3d::UpsampleFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let info = source.info();
        let texel = Vec2::new(1.0 / info.width as f32, 1.0 / info.height as f32);

        let (pass, sampler) = match self.mode {
            UpsampleMode::Point => (&self.effect.point_pass, SamplerType::PointClamp),
            UpsampleMode::Linear => (&self.effect.linear_pass, SamplerType::LinearClamp),
            UpsampleMode::Bilateral => (&self.effect.bilateral_pass, SamplerType::LinearClamp),
            UpsampleMode::NearestDepth => (&self.effect.nearest_depth_pass, SamplerType::PointClamp),
        };

        let mut draw = FullscreenDraw::new(pass)
            .sampler(0, sampler)
            .texture(&self.effect.source, &source)
            .param(&self.effect.texel_size, ParamValue::Vec2(texel));
        if self.mode.is_depth_aware() {
            let depth = context.require_depth_buffer(self.name())?;
            let depth_low = context.require_texture(&ContextKey::DepthBufferHalf, self.name())?;
            draw = draw
                .sampler(1, SamplerType::PointClamp)
                .texture(&self.effect.depth, &depth)
                .texture(&self.effect.depth_low, &depth_low)
                .float(&self.effect.depth_threshold, self.depth_threshold);
        }
        draw.draw(context)?;

        if self.rebuild_z_buffer {
            match context.data::<Arc<dyn DepthRebuilder>>(&ContextKey::RebuildZBufferRenderer).cloned() {
                Some(rebuilder) => rebuilder.rebuild_depth(context)?,
                None => engine_debug!("galaxy3d::UpsampleFilter", "No depth rebuilder in the render context"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "upsample_filter_tests.rs"]
mod tests;
