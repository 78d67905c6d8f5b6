/// Motion blur.
///
/// With a velocity buffer published under `ContextKey::VelocityBuffer` the
/// blur follows per-pixel velocities (optionally averaged with
/// `ContextKey::LastVelocityBuffer`). Otherwise velocities are derived from
/// camera motion: each pixel is reprojected from the depth buffer with the
/// previous view-projection matrix.

use std::sync::Arc;
use glam::Mat4;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, ParamValue,
    PooledRenderTarget, SamplerType, Texture,
};
use crate::render::{ContextKey, RenderContext};
use super::post_processor::{
    output_format, post_processor_common, redirect, require_source, FullscreenDraw, PostProcessor,
};

const EFFECT: &str = "MotionBlur";

struct MotionBlurEffect {
    velocity_pass: EffectPass,
    camera_pass: EffectPass,
    source: EffectParameter,
    velocity: EffectParameter,
    last_velocity: EffectParameter,
    depth: EffectParameter,
    inverse_view_projection: EffectParameter,
    last_view_projection: EffectParameter,
    intensity: EffectParameter,
    max_velocity: EffectParameter,
    sample_count: EffectParameter,
}

/// Where pixel velocities come from this frame
enum VelocitySource {
    Buffer { velocity: Arc<dyn Texture>, last_velocity: Arc<dyn Texture> },
    Camera { depth: Arc<dyn Texture>, inverse_view_projection: Mat4, last_view_projection: Mat4 },
}

pub struct MotionBlurFilter {
    enabled: bool,
    effect: MotionBlurEffect,
    intensity: f32,
    max_velocity: f32,
    sample_count: u32,
    number_of_passes: u32,
}

impl MotionBlurFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = MotionBlurEffect {
            velocity_pass: require_pass(effect.as_ref(), "VelocityBlur")?,
            camera_pass: require_pass(effect.as_ref(), "CameraBlur")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            velocity: require_parameter(effect.as_ref(), "VelocityTexture")?,
            last_velocity: require_parameter(effect.as_ref(), "LastVelocityTexture")?,
            depth: require_parameter(effect.as_ref(), "DepthTexture")?,
            inverse_view_projection: require_parameter(effect.as_ref(), "InverseViewProjection")?,
            last_view_projection: require_parameter(effect.as_ref(), "LastViewProjection")?,
            intensity: require_parameter(effect.as_ref(), "Intensity")?,
            max_velocity: require_parameter(effect.as_ref(), "MaxVelocity")?,
            sample_count: require_parameter(effect.as_ref(), "SampleCount")?,
        };
        Ok(Self {
            enabled: true,
            effect,
            intensity: 1.0,
            max_velocity: 0.05,
            sample_count: 8,
            number_of_passes: 1,
        })
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Velocity multiplier (shutter time relative to the frame time)
    pub fn set_intensity(&mut self, intensity: f32) -> Result<()> {
        if !(intensity >= 0.0 && intensity.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::MotionBlurFilter",
                "Intensity must be non-negative (got {})", intensity);
        }
        self.intensity = intensity;
        Ok(())
    }

    pub fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    /// Clamp of the blur vector length, in texture coordinates
    pub fn set_max_velocity(&mut self, max_velocity: f32) -> Result<()> {
        if !(max_velocity > 0.0 && max_velocity <= 1.0) {
            engine_bail!(Configuration, "galaxy3d::MotionBlurFilter",
                "Max velocity must be in (0, 1] (got {})", max_velocity);
        }
        self.max_velocity = max_velocity;
        Ok(())
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn set_sample_count(&mut self, count: u32) -> Result<()> {
        if !(2..=32).contains(&count) {
            engine_bail!(Configuration, "galaxy3d::MotionBlurFilter",
                "Sample count must be in [2, 32] (got {})", count);
        }
        self.sample_count = count;
        Ok(())
    }

    pub fn number_of_passes(&self) -> u32 {
        self.number_of_passes
    }

    pub fn set_number_of_passes(&mut self, passes: u32) -> Result<()> {
        if !(1..=4).contains(&passes) {
            engine_bail!(Configuration, "galaxy3d::MotionBlurFilter",
                "Number of passes must be in [1, 4] (got {})", passes);
        }
        self.number_of_passes = passes;
        Ok(())
    }

    fn velocity_source(&self, context: &RenderContext) -> Result<VelocitySource> {
        if let Some(velocity) = context.texture(&ContextKey::VelocityBuffer) {
            let last_velocity = context.texture(&ContextKey::LastVelocityBuffer).unwrap_or_else(|| velocity.clone());
            return Ok(VelocitySource::Buffer { velocity, last_velocity });
        }
        let camera = context.require_camera(self.name())?;
        let depth = context.require_depth_buffer(self.name())?;
        Ok(VelocitySource::Camera {
            depth,
            inverse_view_projection: camera.view_projection().inverse(),
            last_view_projection: camera.last_view_projection(),
        })
    }

    fn draw(&self, context: &RenderContext, velocities: &VelocitySource, input: &Arc<dyn Texture>) -> Result<()> {
        let draw = match velocities {
            VelocitySource::Buffer { velocity, last_velocity } => FullscreenDraw::new(&self.effect.velocity_pass)
                .texture(&self.effect.velocity, velocity)
                .texture(&self.effect.last_velocity, last_velocity),
            VelocitySource::Camera { depth, inverse_view_projection, last_view_projection } => {
                FullscreenDraw::new(&self.effect.camera_pass)
                    .texture(&self.effect.depth, depth)
                    .param(&self.effect.inverse_view_projection, ParamValue::Mat4(*inverse_view_projection))
                    .param(&self.effect.last_view_projection, ParamValue::Mat4(*last_view_projection))
            }
        };
        draw.sampler(0, SamplerType::LinearClamp)
            .texture(&self.effect.source, input)
            .float(&self.effect.intensity, self.intensity / self.number_of_passes as f32)
            .float(&self.effect.max_velocity, self.max_velocity)
            .param(&self.effect.sample_count, ParamValue::Int(self.sample_count as i32))
            .draw(context)
    }
}

impl PostProcessor for MotionBlurFilter {
    post_processor_common!("galaxy3d::MotionBlurFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let velocities = self.velocity_source(context)?;
        if self.number_of_passes == 1 {
            return self.draw(context, &velocities, &source);
        }

        let graphics = context.graphics()?.clone();
        let final_target = context.render_target.clone();
        let final_viewport = context.viewport;
        let working = output_format(context, source.info().format)?;

        let mut temps: Vec<PooledRenderTarget> = Vec::with_capacity(2);
        temps.push(graphics.obtain_render_target(working)?);
        if self.number_of_passes > 2 {
            temps.push(graphics.obtain_render_target(working)?);
        }

        let mut input = source;
        for pass in 0..self.number_of_passes as usize {
            if pass + 1 == self.number_of_passes as usize {
                context.source_texture = Some(input.clone());
                context.render_target = final_target.clone();
                context.viewport = final_viewport;
                self.draw(context, &velocities, &input)?;
            } else {
                let output = temps[pass % temps.len()].texture().clone();
                redirect(context, &input, &output);
                self.draw(context, &velocities, &input)?;
                input = output;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "motion_blur_filter_tests.rs"]
mod tests;
