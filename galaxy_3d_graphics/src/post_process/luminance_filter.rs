/// Average scene luminance.
///
/// Writes the log-average luminance of the source into the render target
/// (usually 1x1): a log-luminance pass into a small float target, then 4:1
/// averaging steps, the last one converting back from log space.

use glam::Vec2;
use crate::error::Result;
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, ParamValue,
    PooledRenderTarget, RenderTargetFormat, SamplerType, TextureFormat,
};
use crate::render::RenderContext;
use super::downsample_filter::step_sizes;
use super::post_processor::{post_processor_common, redirect, require_source, FullscreenDraw, PostProcessor};

const EFFECT: &str = "Luminance";

/// Side of the first log-luminance target
const START_SIZE: u32 = 64;

struct LuminanceEffect {
    log_pass: EffectPass,
    average_pass: EffectPass,
    average_exp_pass: EffectPass,
    source: EffectParameter,
    texel_size: EffectParameter,
}

pub struct LuminanceFilter {
    enabled: bool,
    effect: LuminanceEffect,
}

impl LuminanceFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = LuminanceEffect {
            log_pass: require_pass(effect.as_ref(), "LogLuminance")?,
            average_pass: require_pass(effect.as_ref(), "Average")?,
            average_exp_pass: require_pass(effect.as_ref(), "AverageExp")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            texel_size: require_parameter(effect.as_ref(), "TexelSize")?,
        };
        Ok(Self { enabled: true, effect })
    }

    fn draw(&self, context: &RenderContext, pass: &EffectPass, size: (u32, u32)) -> Result<()> {
        let source = require_source(context, self.name())?;
        FullscreenDraw::new(pass)
            .sampler(0, SamplerType::LinearClamp)
            .texture(&self.effect.source, &source)
            .param(&self.effect.texel_size, ParamValue::Vec2(Vec2::new(1.0 / size.0 as f32, 1.0 / size.1 as f32)))
            .draw(context)
    }
}

impl PostProcessor for LuminanceFilter {
    post_processor_common!("galaxy3d::LuminanceFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let graphics = context.graphics()?.clone();
        let final_target = context.render_target.clone();
        let final_viewport = context.viewport;

        let viewport = context.effective_viewport()?;
        let target = ((viewport.width as u32).max(1), (viewport.height as u32).max(1));
        let info = source.info();
        let start = (
            info.width.min(START_SIZE).max(target.0),
            info.height.min(START_SIZE).max(target.1),
        );

        let log = graphics.obtain_render_target(RenderTargetFormat::new(start.0, start.1, TextureFormat::R32_SFLOAT))?;
        redirect(context, &source, log.texture());
        self.draw(context, &self.effect.log_pass, (info.width, info.height))?;

        let sizes = step_sizes(start, target, 4);
        let mut input = log.texture().clone();
        let mut input_size = start;
        let mut previous: PooledRenderTarget = log;
        for (index, size) in sizes.iter().enumerate() {
            if index + 1 == sizes.len() {
                context.source_texture = Some(input.clone());
                context.render_target = final_target.clone();
                context.viewport = final_viewport;
                self.draw(context, &self.effect.average_exp_pass, input_size)?;
            } else {
                let temp = graphics.obtain_render_target(RenderTargetFormat::new(size.0, size.1, TextureFormat::R32_SFLOAT))?;
                redirect(context, &input, temp.texture());
                self.draw(context, &self.effect.average_pass, input_size)?;
                input = temp.texture().clone();
                input_size = *size;
                previous = temp;
            }
        }
        drop(previous);
        Ok(())
    }
}

#[cfg(test)]
#[path = "luminance_filter_tests.rs"]
mod tests;
