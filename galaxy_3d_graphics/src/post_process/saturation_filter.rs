/// Saturation adjustment: 0 is grayscale, 1 leaves the source unchanged.

use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, SamplerType,
};
use crate::render::RenderContext;
use super::post_processor::{post_processor_common, require_source, FullscreenDraw, PostProcessor};

const EFFECT: &str = "Saturation";

struct SaturationEffect {
    pass: EffectPass,
    source: EffectParameter,
    saturation: EffectParameter,
}

pub struct SaturationFilter {
    enabled: bool,
    effect: SaturationEffect,
    saturation: f32,
}

impl SaturationFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = SaturationEffect {
            pass: require_pass(effect.as_ref(), "Saturation")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            saturation: require_parameter(effect.as_ref(), "Saturation")?,
        };
        Ok(Self { enabled: true, effect, saturation: 1.0 })
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    /// Saturation factor, in [0, 4]
    pub fn set_saturation(&mut self, saturation: f32) -> Result<()> {
        if !(0.0..=4.0).contains(&saturation) {
            engine_bail!(Configuration, "galaxy3d::SaturationFilter",
                "Saturation must be in [0, 4] (got {})", saturation);
        }
        self.saturation = saturation;
        Ok(())
    }
}

impl PostProcessor for SaturationFilter {
    post_processor_common!("galaxy3d::SaturationFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        FullscreenDraw::new(&self.effect.pass)
            .sampler(0, SamplerType::PointClamp)
            .texture(&self.effect.source, &source)
            .float(&self.effect.saturation, self.saturation)
            .draw(context)
    }
}

#[cfg(test)]
#[path = "saturation_filter_tests.rs"]
mod tests;
