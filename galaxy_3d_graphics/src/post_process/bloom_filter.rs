/// Bloom: bright pass at reduced resolution, blur, additive composite.

use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, SamplerType,
};
use crate::render::RenderContext;
use super::blur_filter::BlurFilter;
use super::post_processor::{
    output_format, post_processor_common, redirect, require_source, FullscreenDraw, PostProcessor,
};

const EFFECT: &str = "Bloom";

struct BloomEffect {
    bright_pass: EffectPass,
    composite_pass: EffectPass,
    source: EffectParameter,
    bloom: EffectParameter,
    threshold: EffectParameter,
    soft_knee: EffectParameter,
    intensity: EffectParameter,
}

pub struct BloomFilter {
    enabled: bool,
    effect: BloomEffect,
    blur: BlurFilter,
    threshold: f32,
    soft_knee: f32,
    intensity: f32,
    downsample_factor: u32,
}

impl BloomFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = BloomEffect {
            bright_pass: require_pass(effect.as_ref(), "BrightPass")?,
            composite_pass: require_pass(effect.as_ref(), "Composite")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            bloom: require_parameter(effect.as_ref(), "BloomTexture")?,
            threshold: require_parameter(effect.as_ref(), "Threshold")?,
            soft_knee: require_parameter(effect.as_ref(), "SoftKnee")?,
            intensity: require_parameter(effect.as_ref(), "Intensity")?,
        };
        Ok(Self {
            enabled: true,
            effect,
            blur: BlurFilter::new(graphics)?,
            threshold: 0.8,
            soft_knee: 0.5,
            intensity: 0.5,
            downsample_factor: 2,
        })
    }

    /// Blur applied to the bright pass
    pub fn blur(&self) -> &BlurFilter {
        &self.blur
    }

    pub fn blur_mut(&mut self) -> &mut BlurFilter {
        &mut self.blur
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Luminance above which pixels bloom
    pub fn set_threshold(&mut self, threshold: f32) -> Result<()> {
        if !(threshold >= 0.0 && threshold.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::BloomFilter",
                "Threshold must be non-negative (got {})", threshold);
        }
        self.threshold = threshold;
        Ok(())
    }

    pub fn soft_knee(&self) -> f32 {
        self.soft_knee
    }

    /// Width of the threshold transition, in [0, 1]
    pub fn set_soft_knee(&mut self, soft_knee: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&soft_knee) {
            engine_bail!(Configuration, "galaxy3d::BloomFilter",
                "Soft knee must be in [0, 1] (got {})", soft_knee);
        }
        self.soft_knee = soft_knee;
        Ok(())
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f32) -> Result<()> {
        if !(intensity >= 0.0 && intensity.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::BloomFilter",
                "Intensity must be non-negative (got {})", intensity);
        }
        self.intensity = intensity;
        Ok(())
    }

    pub fn downsample_factor(&self) -> u32 {
        self.downsample_factor
    }

    /// Resolution divisor of the bright pass and blur, in [1, 8]
    pub fn set_downsample_factor(&mut self, factor: u32) -> Result<()> {
        if !(1..=8).contains(&factor) {
            engine_bail!(Configuration, "galaxy3d::BloomFilter",
                "Downsample factor must be in [1, 8] (got {})", factor);
        }
        self.downsample_factor = factor;
        Ok(())
    }
}

impl PostProcessor for BloomFilter {
    post_processor_common!("galaxy3d::BloomFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let graphics = context.graphics()?.clone();
        let final_target = context.render_target.clone();
        let final_viewport = context.viewport;

        let working = output_format(context, source.info().format)?.scaled_down(self.downsample_factor);
        let bright = graphics.obtain_render_target(working)?;
        let blurred = graphics.obtain_render_target(working)?;

        redirect(context, &source, bright.texture());
        FullscreenDraw::new(&self.effect.bright_pass)
            .sampler(0, SamplerType::LinearClamp)
            .texture(&self.effect.source, &source)
            .float(&self.effect.threshold, self.threshold)
            .float(&self.effect.soft_knee, self.soft_knee)
            .draw(context)?;

        redirect(context, bright.texture(), blurred.texture());
        self.blur.process(context)?;

        context.source_texture = Some(source.clone());
        context.render_target = final_target;
        context.viewport = final_viewport;
        FullscreenDraw::new(&self.effect.composite_pass)
            .sampler(0, SamplerType::LinearClamp)
            .texture(&self.effect.source, &source)
            .texture(&self.effect.bloom, blurred.texture())
            .float(&self.effect.intensity, self.intensity)
            .draw(context)
    }
}

#[cfg(test)]
#[path = "bloom_filter_tests.rs"]
mod tests;
