/// Film grain noise.
///
/// The noise pattern is seeded from the frame number so it animates; a
/// static pattern can be requested with `set_animated(false)`.

use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, SamplerType,
};
use crate::render::RenderContext;
use super::post_processor::{post_processor_common, require_source, FullscreenDraw, PostProcessor};

const EFFECT: &str = "Grain";

struct GrainEffect {
    pass: EffectPass,
    source: EffectParameter,
    intensity: EffectParameter,
    grain_size: EffectParameter,
    seed: EffectParameter,
}

pub struct GrainFilter {
    enabled: bool,
    effect: GrainEffect,
    intensity: f32,
    grain_size: f32,
    animated: bool,
}

impl GrainFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = GrainEffect {
            pass: require_pass(effect.as_ref(), "Grain")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            intensity: require_parameter(effect.as_ref(), "Intensity")?,
            grain_size: require_parameter(effect.as_ref(), "GrainSize")?,
            seed: require_parameter(effect.as_ref(), "Seed")?,
        };
        Ok(Self { enabled: true, effect, intensity: 0.05, grain_size: 1.5, animated: true })
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Noise amplitude, in [0, 1]
    pub fn set_intensity(&mut self, intensity: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&intensity) {
            engine_bail!(Configuration, "galaxy3d::GrainFilter",
                "Intensity must be in [0, 1] (got {})", intensity);
        }
        self.intensity = intensity;
        Ok(())
    }

    pub fn grain_size(&self) -> f32 {
        self.grain_size
    }

    /// Grain size in pixels, in [1, 4]
    pub fn set_grain_size(&mut self, size: f32) -> Result<()> {
        if !(1.0..=4.0).contains(&size) {
            engine_bail!(Configuration, "galaxy3d::GrainFilter",
                "Grain size must be in [1, 4] (got {})", size);
        }
        self.grain_size = size;
        Ok(())
    }

    pub fn is_animated(&self) -> bool {
        self.animated
    }

    pub fn set_animated(&mut self, animated: bool) {
        self.animated = animated;
    }

    /// Noise seed in [0, 1) for `frame`
    pub fn seed(&self, frame: u64) -> f32 {
        if !self.animated {
            return 0.0;
        }
        // Golden ratio steps spread consecutive seeds evenly
        ((frame % (1 << 20)) as f64 * 0.618_033_988_749_895).fract() as f32
    }
}

impl PostProcessor for GrainFilter {
    post_processor_common!("galaxy3d::GrainFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        FullscreenDraw::new(&self.effect.pass)
            .sampler(0, SamplerType::PointClamp)
            .texture(&self.effect.source, &source)
            .float(&self.effect.intensity, self.intensity)
            .float(&self.effect.grain_size, self.grain_size)
            .float(&self.effect.seed, self.seed(context.frame))
            .draw(context)
    }
}

#[cfg(test)]
#[path = "grain_filter_tests.rs"]
mod tests;
