/// Depth of field.
///
/// A circle-of-confusion pass turns the depth buffer into a blur amount per
/// pixel, a reduced-resolution blurred copy of the source is produced, and
/// the composite pass blends sharp and blurred images by the CoC.

use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, SamplerType,
    TextureFormat,
};
use crate::render::RenderContext;
use super::blur_filter::BlurFilter;
use super::post_processor::{
    output_format, post_processor_common, redirect, require_source, FullscreenDraw, PostProcessor,
};

const EFFECT: &str = "DepthOfField";

struct DepthOfFieldEffect {
    coc_pass: EffectPass,
    composite_pass: EffectPass,
    source: EffectParameter,
    blurred: EffectParameter,
    coc: EffectParameter,
    depth: EffectParameter,
    near: EffectParameter,
    far: EffectParameter,
    focus_distance: EffectParameter,
    focus_range: EffectParameter,
    max_coc: EffectParameter,
}

pub struct DepthOfFieldFilter {
    enabled: bool,
    effect: DepthOfFieldEffect,
    blur: BlurFilter,
    focus_distance: f32,
    focus_range: f32,
    max_coc: f32,
    downsample_factor: u32,
}

impl DepthOfFieldFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = DepthOfFieldEffect {
            coc_pass: require_pass(effect.as_ref(), "CircleOfConfusion")?,
            composite_pass: require_pass(effect.as_ref(), "Composite")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            blurred: require_parameter(effect.as_ref(), "BlurredTexture")?,
            coc: require_parameter(effect.as_ref(), "CocTexture")?,
            depth: require_parameter(effect.as_ref(), "DepthTexture")?,
            near: require_parameter(effect.as_ref(), "Near")?,
            far: require_parameter(effect.as_ref(), "Far")?,
            focus_distance: require_parameter(effect.as_ref(), "FocusDistance")?,
            focus_range: require_parameter(effect.as_ref(), "FocusRange")?,
            max_coc: require_parameter(effect.as_ref(), "MaxCoc")?,
        };
        Ok(Self {
            enabled: true,
            effect,
            blur: BlurFilter::new(graphics)?,
            focus_distance: 10.0,
            focus_range: 5.0,
            max_coc: 1.0,
            downsample_factor: 2,
        })
    }

    pub fn blur_mut(&mut self) -> &mut BlurFilter {
        &mut self.blur
    }

    pub fn focus_distance(&self) -> f32 {
        self.focus_distance
    }

    /// View-space distance of the sharp plane
    pub fn set_focus_distance(&mut self, distance: f32) -> Result<()> {
        if !(distance >= 0.0 && distance.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::DepthOfFieldFilter",
                "Focus distance must be non-negative (got {})", distance);
        }
        self.focus_distance = distance;
        Ok(())
    }

    pub fn focus_range(&self) -> f32 {
        self.focus_range
    }

    /// Distance from the sharp plane at which blur is full
    pub fn set_focus_range(&mut self, range: f32) -> Result<()> {
        if !(range > 0.0 && range.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::DepthOfFieldFilter",
                "Focus range must be positive (got {})", range);
        }
        self.focus_range = range;
        Ok(())
    }

    pub fn max_coc(&self) -> f32 {
        self.max_coc
    }

    /// Upper clamp of the circle of confusion, in [0, 1]
    pub fn set_max_coc(&mut self, max_coc: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&max_coc) {
            engine_bail!(Configuration, "galaxy3d::DepthOfFieldFilter",
                "Max CoC must be in [0, 1] (got {})", max_coc);
        }
        self.max_coc = max_coc;
        Ok(())
    }

    pub fn downsample_factor(&self) -> u32 {
        self.downsample_factor
    }

    pub fn set_downsample_factor(&mut self, factor: u32) -> Result<()> {
        if !(1..=4).contains(&factor) {
            engine_bail!(Configuration, "galaxy3d::DepthOfFieldFilter",
                "Downsample factor must be in [1, 4] (got {})", factor);
        }
        self.downsample_factor = factor;
        Ok(())
    }
}

impl PostProcessor for DepthOfFieldFilter {
    post_processor_common!("galaxy3d::DepthOfFieldFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let camera = context.require_camera(self.name())?.clone();
        let depth = context.require_depth_buffer(self.name())?;
        let graphics = context.graphics()?.clone();
        let final_target = context.render_target.clone();
        let final_viewport = context.viewport;

        let full = output_format(context, source.info().format)?;
        let coc = graphics.obtain_render_target(full.with_format(TextureFormat::R16_SFLOAT))?;
        let blurred = graphics.obtain_render_target(full.scaled_down(self.downsample_factor))?;

        redirect(context, &source, coc.texture());
        FullscreenDraw::new(&self.effect.coc_pass)
            .sampler(0, SamplerType::PointClamp)
            .texture(&self.effect.depth, &depth)
            .float(&self.effect.near, camera.near)
            .float(&self.effect.far, camera.far)
            .float(&self.effect.focus_distance, self.focus_distance)
            .float(&self.effect.focus_range, self.focus_range)
            .float(&self.effect.max_coc, self.max_coc)
            .draw(context)?;

        // The blur samples the full-size source into the smaller target
        redirect(context, &source, blurred.texture());
        self.blur.process(context)?;

        context.source_texture = Some(source.clone());
        context.render_target = final_target;
        context.viewport = final_viewport;
        FullscreenDraw::new(&self.effect.composite_pass)
            .sampler(0, SamplerType::LinearClamp)
            .texture(&self.effect.source, &source)
            .texture(&self.effect.blurred, blurred.texture())
            .texture(&self.effect.coc, coc.texture())
            .draw(context)
    }
}

#[cfg(test)]
#[path = "depth_of_field_filter_tests.rs"]
mod tests;
