/// Scalable ambient obscurance.
///
/// Depth-only ambient occlusion: normals are reconstructed from depth and
/// samples are taken on a spiral around each pixel. The half-resolution
/// depth published under `ContextKey::DepthBufferHalf` is preferred when
/// present.

use glam::Vec4;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, ParamValue,
    SamplerType, TextureFormat,
};
use crate::render::{ContextKey, RenderContext};
use super::blur_filter::BlurFilter;
use super::post_processor::{
    output_format, post_processor_common, redirect, require_source, FullscreenDraw, PostProcessor,
};
use super::ssao_filter::MAX_OCCLUSION_SAMPLES;

const EFFECT: &str = "Sao";

struct SaoEffect {
    obscurance_pass: EffectPass,
    combine_pass: EffectPass,
    source: EffectParameter,
    occlusion: EffectParameter,
    depth: EffectParameter,
    projection_info: EffectParameter,
    projection_scale: EffectParameter,
    radius: EffectParameter,
    bias: EffectParameter,
    intensity: EffectParameter,
    sample_count: EffectParameter,
    spiral_turns: EffectParameter,
}

pub struct SaoFilter {
    enabled: bool,
    effect: SaoEffect,
    blur: BlurFilter,
    radius: f32,
    bias: f32,
    intensity: f32,
    sample_count: u32,
    spiral_turns: f32,
}

impl SaoFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = SaoEffect {
            obscurance_pass: require_pass(effect.as_ref(), "Obscurance")?,
            combine_pass: require_pass(effect.as_ref(), "Combine")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            occlusion: require_parameter(effect.as_ref(), "OcclusionTexture")?,
            depth: require_parameter(effect.as_ref(), "DepthTexture")?,
            projection_info: require_parameter(effect.as_ref(), "ProjectionInfo")?,
            projection_scale: require_parameter(effect.as_ref(), "ProjectionScale")?,
            radius: require_parameter(effect.as_ref(), "Radius")?,
            bias: require_parameter(effect.as_ref(), "Bias")?,
            intensity: require_parameter(effect.as_ref(), "Intensity")?,
            sample_count: require_parameter(effect.as_ref(), "SampleCount")?,
            spiral_turns: require_parameter(effect.as_ref(), "SpiralTurns")?,
        };
        let mut blur = BlurFilter::new(graphics)?;
        blur.set_edge_aware(true);
        Ok(Self {
            enabled: true,
            effect,
            blur,
            radius: 1.0,
            bias: 0.01,
            intensity: 1.0,
            sample_count: 11,
            spiral_turns: 7.0,
        })
    }

    pub fn blur_mut(&mut self) -> &mut BlurFilter {
        &mut self.blur
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) -> Result<()> {
        if !(radius > 0.0 && radius.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::SaoFilter", "Radius must be positive (got {})", radius);
        }
        self.radius = radius;
        Ok(())
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f32) -> Result<()> {
        if !(bias >= 0.0 && bias.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::SaoFilter", "Bias must be non-negative (got {})", bias);
        }
        self.bias = bias;
        Ok(())
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f32) -> Result<()> {
        if !(intensity >= 0.0 && intensity.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::SaoFilter",
                "Intensity must be non-negative (got {})", intensity);
        }
        self.intensity = intensity;
        Ok(())
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn set_sample_count(&mut self, count: u32) -> Result<()> {
        if count == 0 || count as usize > MAX_OCCLUSION_SAMPLES {
            engine_bail!(Configuration, "galaxy3d::SaoFilter",
                "Sample count must be in [1, {}] (got {})", MAX_OCCLUSION_SAMPLES, count);
        }
        self.sample_count = count;
        Ok(())
    }

    pub fn spiral_turns(&self) -> f32 {
        self.spiral_turns
    }

    /// Turns of the sampling spiral; prime-ish values avoid banding
    pub fn set_spiral_turns(&mut self, turns: f32) -> Result<()> {
        if !(turns > 0.0 && turns.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::SaoFilter",
                "Spiral turns must be positive (got {})", turns);
        }
        self.spiral_turns = turns;
        Ok(())
    }
}

impl PostProcessor for SaoFilter {
    post_processor_common!("galaxy3d::SaoFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let camera = context.require_camera(self.name())?.clone();
        let full_depth = context.require_depth_buffer(self.name())?;
        let depth = context.texture(&ContextKey::DepthBufferHalf).unwrap_or(full_depth);
        let graphics = context.graphics()?.clone();
        let final_target = context.render_target.clone();
        let final_viewport = context.viewport;

        let working = output_format(context, source.info().format)?.with_format(TextureFormat::R8_UNORM);
        let occlusion = graphics.obtain_render_target(working)?;
        let blurred = graphics.obtain_render_target(working)?;

        // View-space position reconstruction from (uv, linear depth)
        let projection = camera.projection;
        let projection_info = Vec4::new(
            -2.0 / (working.width as f32 * projection.x_axis.x),
            -2.0 / (working.height as f32 * projection.y_axis.y),
            (1.0 - projection.z_axis.x) / projection.x_axis.x,
            (1.0 + projection.z_axis.y) / projection.y_axis.y,
        );
        // Pixels covered by one world unit at distance 1
        let projection_scale = working.height as f32 * projection.y_axis.y * 0.5;

        redirect(context, &source, occlusion.texture());
        FullscreenDraw::new(&self.effect.obscurance_pass)
            .sampler(0, SamplerType::PointClamp)
            .texture(&self.effect.depth, &depth)
            .param(&self.effect.projection_info, ParamValue::Vec4(projection_info))
            .float(&self.effect.projection_scale, projection_scale)
            .float(&self.effect.radius, self.radius)
            .float(&self.effect.bias, self.bias)
            .float(&self.effect.intensity, self.intensity)
            .param(&self.effect.sample_count, ParamValue::Int(self.sample_count as i32))
            .float(&self.effect.spiral_turns, self.spiral_turns)
            .draw(context)?;

        redirect(context, occlusion.texture(), blurred.texture());
        self.blur.process(context)?;

        context.source_texture = Some(source.clone());
        context.render_target = final_target;
        context.viewport = final_viewport;
        FullscreenDraw::new(&self.effect.combine_pass)
            .sampler(0, SamplerType::LinearClamp)
            .texture(&self.effect.source, &source)
            .texture(&self.effect.occlusion, blurred.texture())
            .draw(context)
    }
}

#[cfg(test)]
#[path = "sao_filter_tests.rs"]
mod tests;
