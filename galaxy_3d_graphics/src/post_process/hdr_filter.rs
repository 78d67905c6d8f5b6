/// HDR tone mapping with eye adaptation.
///
/// Each frame the average luminance of the source is measured, the adapted
/// luminance moves toward it at `adaptation_rate`, and the source is tone
/// mapped with an exposure derived from the adapted value.
///
/// The adapted luminance must survive from frame to frame, so it lives in
/// two 1x1 targets owned by the filter (ping-ponged) rather than in the
/// pool.

use std::sync::Arc;
use crate::error::Result;
use crate::{engine_bail, engine_debug};
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, RenderTargetFormat,
    SamplerType, Texture, TextureDesc, TextureFormat, TextureUsage,
};
use crate::render::RenderContext;
use super::luminance_filter::LuminanceFilter;
use super::post_processor::{post_processor_common, redirect, require_source, FullscreenDraw, PostProcessor};

const EFFECT: &str = "Hdr";

struct HdrEffect {
    adapt_pass: EffectPass,
    tone_map_pass: EffectPass,
    source: EffectParameter,
    luminance: EffectParameter,
    previous_luminance: EffectParameter,
    adaptation: EffectParameter,
    middle_gray: EffectParameter,
    min_exposure: EffectParameter,
    max_exposure: EffectParameter,
    white_point: EffectParameter,
}

pub struct HdrFilter {
    enabled: bool,
    effect: HdrEffect,
    luminance: LuminanceFilter,
    adapted: Option<[Arc<dyn Texture>; 2]>,
    current: usize,
    needs_reset: bool,
    middle_gray: f32,
    min_exposure: f32,
    max_exposure: f32,
    white_point: f32,
    adaptation_rate: f32,
}

impl HdrFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = HdrEffect {
            adapt_pass: require_pass(effect.as_ref(), "Adapt")?,
            tone_map_pass: require_pass(effect.as_ref(), "ToneMap")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            luminance: require_parameter(effect.as_ref(), "LuminanceTexture")?,
            previous_luminance: require_parameter(effect.as_ref(), "PreviousLuminanceTexture")?,
            adaptation: require_parameter(effect.as_ref(), "Adaptation")?,
            middle_gray: require_parameter(effect.as_ref(), "MiddleGray")?,
            min_exposure: require_parameter(effect.as_ref(), "MinExposure")?,
            max_exposure: require_parameter(effect.as_ref(), "MaxExposure")?,
            white_point: require_parameter(effect.as_ref(), "WhitePoint")?,
        };
        Ok(Self {
            enabled: true,
            effect,
            luminance: LuminanceFilter::new(graphics)?,
            adapted: None,
            current: 0,
            needs_reset: true,
            middle_gray: 0.18,
            min_exposure: 0.1,
            max_exposure: 16.0,
            white_point: 4.0,
            adaptation_rate: 1.0,
        })
    }

    pub fn middle_gray(&self) -> f32 {
        self.middle_gray
    }

    /// Target luminance of an average scene
    pub fn set_middle_gray(&mut self, middle_gray: f32) -> Result<()> {
        if !(middle_gray > 0.0 && middle_gray.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::HdrFilter",
                "Middle gray must be positive (got {})", middle_gray);
        }
        self.middle_gray = middle_gray;
        Ok(())
    }

    pub fn exposure_range(&self) -> (f32, f32) {
        (self.min_exposure, self.max_exposure)
    }

    /// Clamp range of the computed exposure
    pub fn set_exposure_range(&mut self, min: f32, max: f32) -> Result<()> {
        if !(min > 0.0 && max.is_finite() && min <= max) {
            engine_bail!(Configuration, "galaxy3d::HdrFilter",
                "Invalid exposure range [{}, {}]", min, max);
        }
        self.min_exposure = min;
        self.max_exposure = max;
        Ok(())
    }

    pub fn white_point(&self) -> f32 {
        self.white_point
    }

    /// Smallest luminance mapped to pure white
    pub fn set_white_point(&mut self, white_point: f32) -> Result<()> {
        if !(white_point > 0.0 && white_point.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::HdrFilter",
                "White point must be positive (got {})", white_point);
        }
        self.white_point = white_point;
        Ok(())
    }

    pub fn adaptation_rate(&self) -> f32 {
        self.adaptation_rate
    }

    /// Speed of eye adaptation per second (0 freezes the adapted value)
    pub fn set_adaptation_rate(&mut self, rate: f32) -> Result<()> {
        if !(rate >= 0.0 && rate.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::HdrFilter",
                "Adaptation rate must be non-negative (got {})", rate);
        }
        self.adaptation_rate = rate;
        Ok(())
    }

    /// Jump straight to the measured luminance on the next frame
    /// (after a camera cut)
    pub fn reset_adaptation(&mut self) {
        self.needs_reset = true;
    }

    /// Adapted luminance written by the last frame
    pub fn adapted_luminance(&self) -> Option<&Arc<dyn Texture>> {
        self.adapted.as_ref().map(|adapted| &adapted[self.current])
    }

    /// Fraction of the gap to the measured luminance closed this frame
    fn adaptation(&self, delta_time: f32) -> f32 {
        if self.needs_reset {
            1.0
        } else {
            1.0 - (-delta_time.max(0.0) * self.adaptation_rate).exp()
        }
    }

    fn ensure_adapted_targets(&mut self, graphics: &GraphicsService) -> Result<[Arc<dyn Texture>; 2]> {
        if let Some(adapted) = &self.adapted {
            return Ok(adapted.clone());
        }
        let desc = TextureDesc {
            width: 1,
            height: 1,
            format: TextureFormat::R32_SFLOAT,
            usage: TextureUsage::SampledAndRenderTarget,
            mipmaps: false,
        };
        let adapted = graphics.with_device(|device| {
            Ok([device.create_texture(desc.clone())?, device.create_texture(desc)?])
        })?;
        engine_debug!("galaxy3d::HdrFilter", "Created adapted luminance targets");
        self.adapted = Some(adapted.clone());
        self.needs_reset = true;
        Ok(adapted)
    }
}

impl PostProcessor for HdrFilter {
    post_processor_common!("galaxy3d::HdrFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let graphics = context.graphics()?.clone();
        let final_target = context.render_target.clone();
        let final_viewport = context.viewport;
        let adapted = self.ensure_adapted_targets(&graphics)?;

        let measured = graphics.obtain_render_target(RenderTargetFormat::new(1, 1, TextureFormat::R32_SFLOAT))?;
        redirect(context, &source, measured.texture());
        self.luminance.process(context)?;

        let previous = &adapted[self.current];
        let next = &adapted[1 - self.current];
        redirect(context, measured.texture(), next);
        FullscreenDraw::new(&self.effect.adapt_pass)
            .sampler(0, SamplerType::PointClamp)
            .texture(&self.effect.luminance, measured.texture())
            .texture(&self.effect.previous_luminance, previous)
            .float(&self.effect.adaptation, self.adaptation(context.delta_time))
            .draw(context)?;
        self.current = 1 - self.current;
        self.needs_reset = false;

        context.source_texture = Some(source.clone());
        context.render_target = final_target;
        context.viewport = final_viewport;
        FullscreenDraw::new(&self.effect.tone_map_pass)
            .sampler(0, SamplerType::LinearClamp)
            .texture(&self.effect.source, &source)
            .texture(&self.effect.luminance, next)
            .float(&self.effect.middle_gray, self.middle_gray)
            .float(&self.effect.min_exposure, self.min_exposure)
            .float(&self.effect.max_exposure, self.max_exposure)
            .float(&self.effect.white_point, self.white_point)
            .draw(context)
    }
}

#[cfg(test)]
#[path = "hdr_filter_tests.rs"]
mod tests;
