/// Volumetric light scattering ("god rays").
///
/// The bright parts of the source are masked at reduced resolution, blurred
/// radially toward the projected light position, then added to the source.
/// A light behind the camera produces no rays and the source is copied.

use glam::{Vec2, Vec3};
use crate::error::Result;
use crate::{engine_bail, engine_trace};
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, ParamValue,
    SamplerType,
};
use crate::camera::CameraView;
use crate::render::RenderContext;
use super::post_processor::{
    blit, output_format, post_processor_common, redirect, require_source, FullscreenDraw, PostProcessor,
};

const EFFECT: &str = "GodRay";

struct GodRayEffect {
    mask_pass: EffectPass,
    radial_blur_pass: EffectPass,
    composite_pass: EffectPass,
    source: EffectParameter,
    rays: EffectParameter,
    threshold: EffectParameter,
    light_position: EffectParameter,
    sample_count: EffectParameter,
    density: EffectParameter,
    decay: EffectParameter,
    weight: EffectParameter,
    exposure: EffectParameter,
}

pub struct GodRayFilter {
    enabled: bool,
    effect: GodRayEffect,
    light_direction: Vec3,
    threshold: f32,
    sample_count: u32,
    density: f32,
    decay: f32,
    weight: f32,
    exposure: f32,
    downsample_factor: u32,
}

impl GodRayFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = GodRayEffect {
            mask_pass: require_pass(effect.as_ref(), "Mask")?,
            radial_blur_pass: require_pass(effect.as_ref(), "RadialBlur")?,
            composite_pass: require_pass(effect.as_ref(), "Composite")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            rays: require_parameter(effect.as_ref(), "RaysTexture")?,
            threshold: require_parameter(effect.as_ref(), "Threshold")?,
            light_position: require_parameter(effect.as_ref(), "LightPosition")?,
            sample_count: require_parameter(effect.as_ref(), "SampleCount")?,
            density: require_parameter(effect.as_ref(), "Density")?,
            decay: require_parameter(effect.as_ref(), "Decay")?,
            weight: require_parameter(effect.as_ref(), "Weight")?,
            exposure: require_parameter(effect.as_ref(), "Exposure")?,
        };
        Ok(Self {
            enabled: true,
            effect,
            light_direction: Vec3::Y,
            threshold: 0.9,
            sample_count: 64,
            density: 0.9,
            decay: 0.95,
            weight: 0.5,
            exposure: 0.3,
            downsample_factor: 2,
        })
    }

    /// Normalized world-space direction toward the light
    pub fn light_direction(&self) -> Vec3 {
        self.light_direction
    }

    /// # Errors
    ///
    /// `Error::DegenerateInput` if `direction` has zero length.
    pub fn set_light_direction(&mut self, direction: Vec3) -> Result<()> {
        match direction.try_normalize() {
            Some(direction) => {
                self.light_direction = direction;
                Ok(())
            }
            None => engine_bail!(DegenerateInput, "galaxy3d::GodRayFilter",
                "Light direction has zero length"),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Luminance above which the source emits rays
    pub fn set_threshold(&mut self, threshold: f32) -> Result<()> {
        if !(threshold >= 0.0 && threshold.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::GodRayFilter",
                "Threshold must be non-negative (got {})", threshold);
        }
        self.threshold = threshold;
        Ok(())
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn set_sample_count(&mut self, count: u32) -> Result<()> {
        if !(1..=256).contains(&count) {
            engine_bail!(Configuration, "galaxy3d::GodRayFilter",
                "Sample count must be in [1, 256] (got {})", count);
        }
        self.sample_count = count;
        Ok(())
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Fraction of the pixel-to-light distance covered by the samples
    pub fn set_density(&mut self, density: f32) -> Result<()> {
        Self::check_unit("Density", density)?;
        self.density = density;
        Ok(())
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Per-sample attenuation
    pub fn set_decay(&mut self, decay: f32) -> Result<()> {
        Self::check_unit("Decay", decay)?;
        self.decay = decay;
        Ok(())
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) -> Result<()> {
        if !(weight >= 0.0 && weight.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::GodRayFilter", "Weight must be non-negative (got {})", weight);
        }
        self.weight = weight;
        Ok(())
    }

    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    pub fn set_exposure(&mut self, exposure: f32) -> Result<()> {
        if !(exposure >= 0.0 && exposure.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::GodRayFilter",
                "Exposure must be non-negative (got {})", exposure);
        }
        self.exposure = exposure;
        Ok(())
    }

    pub fn downsample_factor(&self) -> u32 {
        self.downsample_factor
    }

    pub fn set_downsample_factor(&mut self, factor: u32) -> Result<()> {
        if !(1..=4).contains(&factor) {
            engine_bail!(Configuration, "galaxy3d::GodRayFilter",
                "Downsample factor must be in [1, 4] (got {})", factor);
        }
        self.downsample_factor = factor;
        Ok(())
    }

    fn check_unit(name: &str, value: f32) -> Result<()> {
        if !(value > 0.0 && value <= 1.0) {
            engine_bail!(Configuration, "galaxy3d::GodRayFilter", "{} must be in (0, 1] (got {})", name, value);
        }
        Ok(())
    }

    /// Texture coordinates of the light seen from `camera`, or `None` if
    /// the light is behind it
    pub fn light_screen_position(&self, camera: &CameraView) -> Option<Vec2> {
        let clip = camera.view_projection() * self.light_direction.extend(0.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = Vec2::new(clip.x, clip.y) / clip.w;
        Some(Vec2::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5))
    }
}

impl PostProcessor for GodRayFilter {
    post_processor_common!("galaxy3d::GodRayFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let camera = context.require_camera(self.name())?.clone();
        let Some(light_position) = self.light_screen_position(&camera) else {
            engine_trace!("galaxy3d::GodRayFilter", "Light behind the camera, copying source");
            return blit(context, &source);
        };

        let graphics = context.graphics()?.clone();
        let final_target = context.render_target.clone();
        let final_viewport = context.viewport;

        let working = output_format(context, source.info().format)?.scaled_down(self.downsample_factor);
        let mask = graphics.obtain_render_target(working)?;
        let rays = graphics.obtain_render_target(working)?;

        redirect(context, &source, mask.texture());
        FullscreenDraw::new(&self.effect.mask_pass)
            .sampler(0, SamplerType::LinearClamp)
            .texture(&self.effect.source, &source)
            .float(&self.effect.threshold, self.threshold)
            .draw(context)?;

        redirect(context, mask.texture(), rays.texture());
        FullscreenDraw::new(&self.effect.radial_blur_pass)
            .sampler(0, SamplerType::LinearClamp)
            .texture(&self.effect.source, mask.texture())
            .param(&self.effect.light_position, ParamValue::Vec2(light_position))
            .param(&self.effect.sample_count, ParamValue::Int(self.sample_count as i32))
            .float(&self.effect.density, self.density)
            .float(&self.effect.decay, self.decay)
            .float(&self.effect.weight, self.weight)
            .float(&self.effect.exposure, self.exposure)
            .draw(context)?;

        context.source_texture = Some(source.clone());
        context.render_target = final_target;
        context.viewport = final_viewport;
        FullscreenDraw::new(&self.effect.composite_pass)
            .sampler(0, SamplerType::LinearClamp)
            .texture(&self.effect.source, &source)
            .texture(&self.effect.rays, rays.texture())
            .draw(context)
    }
}

#[cfg(test)]
#[path = "god_ray_filter_tests.rs"]
mod tests;
