/// Resolution reduction in steps.
///
/// The source is reduced by at most `max_step` per axis and per draw until
/// the output viewport size is reached. Intermediate steps go to pooled
/// targets of the exact step size; at most two are alive at a time.
///
/// Depth sources (a depth format, or the G-buffer depth itself) use point
/// sampling and a depth combine function instead of averaging, which would
/// invent depths that exist nowhere in the scene.

use glam::Vec2;
use crate::error::Result;
use crate::{engine_bail, engine_trace};
use crate::graphics_device::{
    require_parameter, require_pass, same_texture, EffectParameter, EffectPass, GraphicsService,
    ParamValue, PooledRenderTarget, RenderTargetFormat, SamplerType,
};
use crate::render::RenderContext;
use super::post_processor::{
    post_processor_common, redirect, require_source, working_format, FullscreenDraw, PostProcessor,
};

const EFFECT: &str = "Downsample";

/// How texels of a depth source are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthCombine {
    /// Keep the depth closest to the camera
    Nearest,
    /// Keep the depth farthest from the camera
    Farthest,
}

impl DepthCombine {
    fn as_int(self) -> i32 {
        match self {
            DepthCombine::Nearest => 0,
            DepthCombine::Farthest => 1,
        }
    }
}

struct DownsampleEffect {
    color_pass: EffectPass,
    depth_pass: EffectPass,
    source: EffectParameter,
    texel_size: EffectParameter,
    factor: EffectParameter,
    depth_combine: EffectParameter,
}

pub struct DownsampleFilter {
    enabled: bool,
    effect: DownsampleEffect,
    max_step: u32,
    depth_combine: DepthCombine,
}

impl DownsampleFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = DownsampleEffect {
            color_pass: require_pass(effect.as_ref(), "Downsample")?,
            depth_pass: require_pass(effect.as_ref(), "DownsampleDepth")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            texel_size: require_parameter(effect.as_ref(), "TexelSize")?,
            factor: require_parameter(effect.as_ref(), "Factor")?,
            depth_combine: require_parameter(effect.as_ref(), "DepthCombine")?,
        };
        Ok(Self {
            enabled: true,
            effect,
            max_step: 4,
            depth_combine: DepthCombine::Nearest,
        })
    }

    pub fn max_step(&self) -> u32 {
        self.max_step
    }

    /// Largest reduction per draw when hardware filtering is available
    /// (otherwise 2)
    ///
    /// # Errors
    ///
    /// `Error::Configuration` unless `2 <= step <= 4`.
    pub fn set_max_step(&mut self, step: u32) -> Result<()> {
        if !(2..=4).contains(&step) {
            engine_bail!(Configuration, "galaxy3d::DownsampleFilter",
                "Step must be between 2 and 4 (got {})", step);
        }
        self.max_step = step;
        Ok(())
    }

    pub fn depth_combine(&self) -> DepthCombine {
        self.depth_combine
    }

    pub fn set_depth_combine(&mut self, combine: DepthCombine) {
        self.depth_combine = combine;
    }
}

/// Sizes written by each draw, the last one being `target`
pub(crate) fn step_sizes(source: (u32, u32), target: (u32, u32), step: u32) -> Vec<(u32, u32)> {
    let step = step.max(2);
    let mut sizes = Vec::new();
    let mut current = source;
    loop {
        let next = (
            current.0.div_ceil(step).max(target.0),
            current.1.div_ceil(step).max(target.1),
        );
        if next == target || next == current {
            sizes.push(target);
            return sizes;
        }
        sizes.push(next);
        current = next;
    }
}

impl PostProcessor for DownsampleFilter {
    post_processor_common!("galaxy3d::DownsampleFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let info = source.info().clone();
        let is_depth = info.format.is_depth()
            || context.gbuffer.depth.as_ref().is_some_and(|depth| same_texture(depth, &source));

        let graphics = context.graphics()?.clone();
        let linear = !is_depth && graphics.supports_filtering(info.format)?;
        let step = if linear { self.max_step } else { 2 };
        let (pass, sampler) = if is_depth {
            (&self.effect.depth_pass, SamplerType::PointClamp)
        } else if linear {
            (&self.effect.color_pass, SamplerType::LinearClamp)
        } else {
            (&self.effect.color_pass, SamplerType::PointClamp)
        };

        let viewport = context.effective_viewport()?;
        let target = ((viewport.width as u32).max(1), (viewport.height as u32).max(1));
        let sizes = step_sizes((info.width, info.height), target, step);
        engine_trace!("galaxy3d::DownsampleFilter",
            "{}x{} -> {}x{} in {} draws", info.width, info.height, target.0, target.1, sizes.len());

        let final_target = context.render_target.clone();
        let final_viewport = context.viewport;
        let format = working_format(info.format);

        let mut input = source;
        let mut input_size = (info.width, info.height);
        let mut previous: Option<PooledRenderTarget> = None;
        for (index, size) in sizes.iter().enumerate() {
            let last = index + 1 == sizes.len();
            let current = if last {
                context.source_texture = Some(input.clone());
                context.render_target = final_target.clone();
                context.viewport = final_viewport;
                None
            } else {
                let temp = graphics.obtain_render_target(RenderTargetFormat::new(size.0, size.1, format))?;
                redirect(context, &input, temp.texture());
                Some(temp)
            };

            let factor = Vec2::new(input_size.0 as f32 / size.0 as f32, input_size.1 as f32 / size.1 as f32);
            let texel = Vec2::new(1.0 / input_size.0 as f32, 1.0 / input_size.1 as f32);
            let mut draw = FullscreenDraw::new(pass)
                .sampler(0, sampler)
                .texture(&self.effect.source, &input)
                .param(&self.effect.texel_size, ParamValue::Vec2(texel))
                .param(&self.effect.factor, ParamValue::Vec2(factor));
            if is_depth {
                draw = draw.param(&self.effect.depth_combine, ParamValue::Int(self.depth_combine.as_int()));
            }
            draw.draw(context)?;

            if let Some(temp) = current {
                input = temp.texture().clone();
                input_size = *size;
                // The texture read by this draw can go back to the pool
                previous = Some(temp);
            }
        }
        drop(previous);
        Ok(())
    }
}

#[cfg(test)]
#[path = "downsample_filter_tests.rs"]
mod tests;
