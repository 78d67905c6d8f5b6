/// PostProcessor trait and the drawing helpers shared by all filters.
///
/// A post-processor reads `context.source_texture` and writes
/// `context.render_target` inside `context.viewport`. Filters may re-point
/// those fields for their sub-passes; `process` restores them on every
/// exit path so filters compose in any order.

use std::sync::Arc;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    EffectParameter, EffectPass, ParamValue, RenderTargetFormat, SamplerType, Texture, TextureFormat,
};
use crate::render::RenderContext;

/// Single-input, single-output image filter
pub trait PostProcessor: Send {
    /// Log source of the filter (`galaxy3d::BlurFilter`, ...)
    fn name(&self) -> &'static str;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Filter the source into the render target.
    ///
    /// Called by `process` with a validated source; may leave the context
    /// targets modified.
    fn render(&mut self, context: &mut RenderContext) -> Result<()>;

    /// Run the filter, or copy the source when disabled.
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if the context has no source texture or no
    /// graphics service, plus any error of the filter itself. The context
    /// targets are restored in every case.
    fn process(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let saved = context.save_targets();
        let result = if self.is_enabled() {
            self.render(context)
        } else {
            blit(context, &source)
        };
        context.restore_targets(saved);
        result
    }
}

/// Implements `name`, `is_enabled` and `set_enabled` over an `enabled`
/// field.
macro_rules! post_processor_common {
    ($name:literal) => {
        fn name(&self) -> &'static str {
            $name
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }
    };
}
pub(crate) use post_processor_common;

// ===== CONTEXT HELPERS =====

/// # Errors
///
/// `Error::Configuration` if the context has no source texture.
pub(crate) fn require_source(context: &RenderContext, source: &str) -> Result<Arc<dyn Texture>> {
    match &context.source_texture {
        Some(texture) => Ok(texture.clone()),
        None => engine_bail!(Configuration, "galaxy3d::PostProcessor",
            "{} requires a source texture", source),
    }
}

/// Format of intermediate targets holding a copy of `format`
///
/// Depth formats cannot be rendered to, their values go to a float target.
pub(crate) fn working_format(format: TextureFormat) -> TextureFormat {
    if format.is_depth() { TextureFormat::R32_SFLOAT } else { format }
}

/// Intermediate target format matching the output viewport of the context
pub(crate) fn output_format(context: &RenderContext, format: TextureFormat) -> Result<RenderTargetFormat> {
    let viewport = context.effective_viewport()?;
    let width = (viewport.width.round() as u32).max(1);
    let height = (viewport.height.round() as u32).max(1);
    Ok(RenderTargetFormat::new(width, height, working_format(format)))
}

/// Point the context at `target` (whole texture) for the next draw
pub(crate) fn redirect(context: &mut RenderContext, source: &Arc<dyn Texture>, target: &Arc<dyn Texture>) {
    context.source_texture = Some(source.clone());
    context.render_target = Some(target.clone());
    context.viewport = None;
}

/// Copy `source` into the context's render target
pub(crate) fn blit(context: &RenderContext, source: &Arc<dyn Texture>) -> Result<()> {
    let viewport = context.effective_viewport()?;
    let target = context.render_target.clone();
    context.graphics()?.with_device(|device| {
        device.set_render_target(target.as_ref())?;
        device.set_viewport(viewport)?;
        device.blit(source)
    })
}

/// Full-screen draw into the context's render target and viewport
pub(crate) struct FullscreenDraw<'a> {
    pass: &'a EffectPass,
    parameters: Vec<(&'a EffectParameter, ParamValue)>,
    samplers: Vec<(u32, SamplerType)>,
}

impl<'a> FullscreenDraw<'a> {
    pub(crate) fn new(pass: &'a EffectPass) -> Self {
        Self { pass, parameters: Vec::new(), samplers: Vec::new() }
    }

    pub(crate) fn param(mut self, parameter: &'a EffectParameter, value: ParamValue) -> Self {
        self.parameters.push((parameter, value));
        self
    }

    pub(crate) fn texture(self, parameter: &'a EffectParameter, texture: &Arc<dyn Texture>) -> Self {
        self.param(parameter, ParamValue::Texture(texture.clone()))
    }

    pub(crate) fn float(self, parameter: &'a EffectParameter, value: f32) -> Self {
        self.param(parameter, ParamValue::Float(value))
    }

    pub(crate) fn sampler(mut self, slot: u32, sampler: SamplerType) -> Self {
        self.samplers.push((slot, sampler));
        self
    }

    pub(crate) fn draw(self, context: &RenderContext) -> Result<()> {
        let viewport = context.effective_viewport()?;
        let target = context.render_target.clone();
        context.graphics()?.with_device(|device| {
            device.set_render_target(target.as_ref())?;
            device.set_viewport(viewport)?;
            for (slot, sampler) in self.samplers {
                device.set_sampler_state(slot, sampler)?;
            }
            for (parameter, value) in self.parameters {
                device.set_parameter(parameter, value)?;
            }
            device.apply_pass(self.pass)?;
            device.draw_fullscreen_quad()
        })
    }
}

#[cfg(test)]
#[path = "post_processor_tests.rs"]
mod tests;
