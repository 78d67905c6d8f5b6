/// Sepia toning.

use glam::Vec3;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, ParamValue, SamplerType,
};
use crate::render::RenderContext;
use super::post_processor::{post_processor_common, require_source, FullscreenDraw, PostProcessor};

const EFFECT: &str = "Sepia";

struct SepiaEffect {
    pass: EffectPass,
    source: EffectParameter,
    amount: EffectParameter,
    tone: EffectParameter,
}

pub struct SepiaFilter {
    enabled: bool,
    effect: SepiaEffect,
    amount: f32,
    tone: Vec3,
}

impl SepiaFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = SepiaEffect {
            pass: require_pass(effect.as_ref(), "Sepia")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            amount: require_parameter(effect.as_ref(), "Amount")?,
            tone: require_parameter(effect.as_ref(), "Tone")?,
        };
        Ok(Self { enabled: true, effect, amount: 1.0, tone: Vec3::new(1.07, 0.74, 0.43) })
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    /// Blend between the source (0) and the full sepia tone (1)
    pub fn set_amount(&mut self, amount: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&amount) {
            engine_bail!(Configuration, "galaxy3d::SepiaFilter", "Amount must be in [0, 1] (got {})", amount);
        }
        self.amount = amount;
        Ok(())
    }

    pub fn tone(&self) -> Vec3 {
        self.tone
    }

    /// Color multiplied with the luminance
    pub fn set_tone(&mut self, tone: Vec3) -> Result<()> {
        if !(tone.is_finite() && tone.min_element() >= 0.0) {
            engine_bail!(Configuration, "galaxy3d::SepiaFilter", "Tone must be non-negative (got {})", tone);
        }
        self.tone = tone;
        Ok(())
    }
}

impl PostProcessor for SepiaFilter {
    post_processor_common!("galaxy3d::SepiaFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        FullscreenDraw::new(&self.effect.pass)
            .sampler(0, SamplerType::PointClamp)
            .texture(&self.effect.source, &source)
            .float(&self.effect.amount, self.amount)
            .param(&self.effect.tone, ParamValue::Vec3(self.tone))
            .draw(context)
    }
}

#[cfg(test)]
#[path = "sepia_filter_tests.rs"]
mod tests;
