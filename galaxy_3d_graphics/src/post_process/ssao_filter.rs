/// Screen-space ambient occlusion.
///
/// Occlusion is estimated from the G-buffer depth and normals with a
/// hemisphere sample kernel, blurred with an edge-aware blur, then
/// multiplied onto the source.

use glam::{Vec3, Vec4};
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, ParamValue,
    SamplerType, TextureFormat,
};
use crate::render::RenderContext;
use super::blur_filter::BlurFilter;
use super::post_processor::{
    output_format, post_processor_common, redirect, require_source, FullscreenDraw, PostProcessor,
};

const EFFECT: &str = "Ssao";

pub(crate) const MAX_OCCLUSION_SAMPLES: usize = 64;

struct SsaoEffect {
    occlusion_pass: EffectPass,
    combine_pass: EffectPass,
    source: EffectParameter,
    occlusion: EffectParameter,
    depth: EffectParameter,
    normal: EffectParameter,
    projection: EffectParameter,
    inverse_projection: EffectParameter,
    samples: EffectParameter,
    radius: EffectParameter,
    intensity: EffectParameter,
    bias: EffectParameter,
}

pub struct SsaoFilter {
    enabled: bool,
    effect: SsaoEffect,
    blur: BlurFilter,
    radius: f32,
    intensity: f32,
    bias: f32,
    resolution_divisor: u32,
    samples: Vec<Vec4>,
}

impl SsaoFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = SsaoEffect {
            occlusion_pass: require_pass(effect.as_ref(), "Occlusion")?,
            combine_pass: require_pass(effect.as_ref(), "Combine")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            occlusion: require_parameter(effect.as_ref(), "OcclusionTexture")?,
            depth: require_parameter(effect.as_ref(), "DepthTexture")?,
            normal: require_parameter(effect.as_ref(), "NormalTexture")?,
            projection: require_parameter(effect.as_ref(), "Projection")?,
            inverse_projection: require_parameter(effect.as_ref(), "InverseProjection")?,
            samples: require_parameter(effect.as_ref(), "Samples")?,
            radius: require_parameter(effect.as_ref(), "Radius")?,
            intensity: require_parameter(effect.as_ref(), "Intensity")?,
            bias: require_parameter(effect.as_ref(), "Bias")?,
        };
        let mut blur = BlurFilter::new(graphics)?;
        blur.set_edge_aware(true);
        Ok(Self {
            enabled: true,
            effect,
            blur,
            radius: 0.5,
            intensity: 1.0,
            bias: 0.025,
            resolution_divisor: 1,
            samples: hemisphere_samples(16),
        })
    }

    pub fn blur_mut(&mut self) -> &mut BlurFilter {
        &mut self.blur
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// World-space sampling radius
    pub fn set_radius(&mut self, radius: f32) -> Result<()> {
        if !(radius > 0.0 && radius.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::SsaoFilter", "Radius must be positive (got {})", radius);
        }
        self.radius = radius;
        Ok(())
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f32) -> Result<()> {
        if !(intensity >= 0.0 && intensity.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::SsaoFilter",
                "Intensity must be non-negative (got {})", intensity);
        }
        self.intensity = intensity;
        Ok(())
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Depth offset suppressing self-occlusion
    pub fn set_bias(&mut self, bias: f32) -> Result<()> {
        if !(bias >= 0.0 && bias.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::SsaoFilter", "Bias must be non-negative (got {})", bias);
        }
        self.bias = bias;
        Ok(())
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn set_sample_count(&mut self, count: usize) -> Result<()> {
        if count == 0 || count > MAX_OCCLUSION_SAMPLES {
            engine_bail!(Configuration, "galaxy3d::SsaoFilter",
                "Sample count must be in [1, {}] (got {})", MAX_OCCLUSION_SAMPLES, count);
        }
        self.samples = hemisphere_samples(count);
        Ok(())
    }

    pub fn resolution_divisor(&self) -> u32 {
        self.resolution_divisor
    }

    /// 1 for full resolution occlusion, 2 for half resolution
    pub fn set_resolution_divisor(&mut self, divisor: u32) -> Result<()> {
        if !(1..=2).contains(&divisor) {
            engine_bail!(Configuration, "galaxy3d::SsaoFilter",
                "Resolution divisor must be 1 or 2 (got {})", divisor);
        }
        self.resolution_divisor = divisor;
        Ok(())
    }

    /// Sample kernel in tangent space (z along the normal)
    pub fn samples(&self) -> &[Vec4] {
        &self.samples
    }
}

/// Points in the unit hemisphere around +Z, denser near the origin.
///
/// Directions follow a golden-angle spiral so the kernel is deterministic.
pub(crate) fn hemisphere_samples(count: usize) -> Vec<Vec4> {
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0f32.sqrt());
    (0..count)
        .map(|i| {
            let t = (i as f32 + 0.5) / count as f32;
            let z = 1.0 - t;
            let ring = (1.0 - z * z).max(0.0).sqrt();
            let angle = golden_angle * i as f32;
            let direction = Vec3::new(ring * angle.cos(), ring * angle.sin(), z.max(0.05)).normalize();
            let scale = 0.1 + 0.9 * t * t;
            (direction * scale).extend(0.0)
        })
        .collect()
}

impl PostProcessor for SsaoFilter {
    post_processor_common!("galaxy3d::SsaoFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let camera = context.require_camera(self.name())?.clone();
        let depth = context.require_depth_buffer(self.name())?;
        let normal = context.require_normal_buffer(self.name())?;
        let graphics = context.graphics()?.clone();
        let final_target = context.render_target.clone();
        let final_viewport = context.viewport;

        let working = output_format(context, source.info().format)?
            .with_format(TextureFormat::R8_UNORM)
            .scaled_down(self.resolution_divisor);
        let occlusion = graphics.obtain_render_target(working)?;
        let blurred = graphics.obtain_render_target(working)?;

        redirect(context, &source, occlusion.texture());
        FullscreenDraw::new(&self.effect.occlusion_pass)
            .sampler(0, SamplerType::PointClamp)
            .texture(&self.effect.depth, &depth)
            .texture(&self.effect.normal, &normal)
            .param(&self.effect.projection, ParamValue::Mat4(camera.projection))
            .param(&self.effect.inverse_projection, ParamValue::Mat4(camera.projection.inverse()))
            .param(&self.effect.samples, ParamValue::Vec4Array(self.samples.clone()))
            .float(&self.effect.radius, self.radius)
            .float(&self.effect.intensity, self.intensity)
            .float(&self.effect.bias, self.bias)
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
#[path = "ssao_filter_tests.rs"]
mod tests;
