/// Unsharp-mask sharpening over the 4-neighborhood of each pixel.

use glam::Vec2;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, ParamValue, SamplerType,
};
use crate::render::RenderContext;
use super::post_processor::{post_processor_common, require_source, FullscreenDraw, PostProcessor};

const EFFECT: &str = "Sharpening";

struct SharpeningEffect {
    pass: EffectPass,
    source: EffectParameter,
    texel_size: EffectParameter,
    strength: EffectParameter,
    clamp: EffectParameter,
}

pub struct SharpeningFilter {
    enabled: bool,
    effect: SharpeningEffect,
    strength: f32,
    clamp: f32,
}

impl SharpeningFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = SharpeningEffect {
            pass: require_pass(effect.as_ref(), "Sharpen")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            texel_size: require_parameter(effect.as_ref(), "TexelSize")?,
            strength: require_parameter(effect.as_ref(), "Strength")?,
            clamp: require_parameter(effect.as_ref(), "Clamp")?,
        };
        Ok(Self { enabled: true, effect, strength: 0.5, clamp: 0.05 })
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Weight of the high-pass term, in [0, 4]
    pub fn set_strength(&mut self, strength: f32) -> Result<()> {
        if !(0.0..=4.0).contains(&strength) {
            engine_bail!(Configuration, "galaxy3d::SharpeningFilter",
                "Strength must be in [0, 4] (got {})", strength);
        }
        self.strength = strength;
        Ok(())
    }

    pub fn clamp(&self) -> f32 {
        self.clamp
    }

    /// Largest change applied to a pixel, in (0, 1]
    pub fn set_clamp(&mut self, clamp: f32) -> Result<()> {
        if !(clamp > 0.0 && clamp <= 1.0) {
            engine_bail!(Configuration, "galaxy3d::SharpeningFilter",
                "Clamp must be in (0, 1] (got {})", clamp);
        }
        self.clamp = clamp;
        Ok(())
    }
}

impl PostProcessor for SharpeningFilter {
    post_processor_common!("galaxy3d::SharpeningFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let info = source.info();
        let texel_size = Vec2::new(1.0 / info.width.max(1) as f32, 1.0 / info.height.max(1) as f32);
        FullscreenDraw::new(&self.effect.pass)
            .sampler(0, SamplerType::PointClamp)
            .texture(&self.effect.source, &source)
            .param(&self.effect.texel_size, ParamValue::Vec2(texel_size))
            .float(&self.effect.strength, self.strength)
            .float(&self.effect.clamp, self.clamp)
            .draw(context)
    }
}

#[cfg(test)]
#[path = "sharpening_filter_tests.rs"]
mod tests;
