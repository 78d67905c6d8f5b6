/// Separable blur.
///
/// Each pass blurs horizontally into a pooled temporary, then vertically
/// into the next temporary (or the render target on the last pass). With
/// several passes two temporaries ping-pong so no texture is read and
/// written by the same draw.
///
/// The edge-aware variant weights samples by depth similarity and needs the
/// G-buffer depth.

use std::sync::Arc;
use glam::Vec2;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, ParamValue,
    PooledRenderTarget, SamplerType, Texture,
};
use crate::render::RenderContext;
use super::kernel::{validate_sample_count, Kernel, KernelType};
use super::post_processor::{
    output_format, post_processor_common, redirect, require_source, FullscreenDraw, PostProcessor,
};

const EFFECT: &str = "Blur";

/// Kernel shape selectable on a `BlurFilter`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlurKernel {
    Box,
    Gaussian,
}

struct BlurEffect {
    pass: EffectPass,
    edge_aware_pass: EffectPass,
    source: EffectParameter,
    depth: EffectParameter,
    offsets: EffectParameter,
    weights: EffectParameter,
    depth_sensitivity: EffectParameter,
}

pub struct BlurFilter {
    enabled: bool,
    effect: BlurEffect,
    kernel_type: BlurKernel,
    number_of_samples: usize,
    number_of_passes: u32,
    scale: f32,
    edge_aware: bool,
    depth_sensitivity: f32,
    kernel: Option<Kernel>,
}

impl BlurFilter {
    /// # Errors
    ///
    /// `Error::InvalidResource` if the blur effect lacks a pass or parameter.
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = BlurEffect {
            pass: require_pass(effect.as_ref(), "Blur")?,
            edge_aware_pass: require_pass(effect.as_ref(), "BlurEdgeAware")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            depth: require_parameter(effect.as_ref(), "DepthTexture")?,
            offsets: require_parameter(effect.as_ref(), "Offsets")?,
            weights: require_parameter(effect.as_ref(), "Weights")?,
            depth_sensitivity: require_parameter(effect.as_ref(), "DepthSensitivity")?,
        };
        Ok(Self {
            enabled: true,
            effect,
            kernel_type: BlurKernel::Gaussian,
            number_of_samples: 9,
            number_of_passes: 1,
            scale: 1.0,
            edge_aware: false,
            depth_sensitivity: 10.0,
            kernel: None,
        })
    }

    pub fn kernel_type(&self) -> BlurKernel {
        self.kernel_type
    }

    pub fn set_kernel_type(&mut self, kernel_type: BlurKernel) {
        if self.kernel_type != kernel_type {
            self.kernel_type = kernel_type;
            self.kernel = None;
        }
    }

    pub fn number_of_samples(&self) -> usize {
        self.number_of_samples
    }

    /// # Errors
    ///
    /// `Error::Configuration` for an even or zero count. The upper bound
    /// (`GraphicsConfig::max_blur_samples`) is checked when the kernel is
    /// built.
    pub fn set_number_of_samples(&mut self, samples: usize) -> Result<()> {
        validate_sample_count(samples, usize::MAX)?;
        if self.number_of_samples != samples {
            self.number_of_samples = samples;
            self.kernel = None;
        }
        Ok(())
    }

    pub fn number_of_passes(&self) -> u32 {
        self.number_of_passes
    }

    /// # Errors
    ///
    /// `Error::Configuration` for zero passes.
    pub fn set_number_of_passes(&mut self, passes: u32) -> Result<()> {
        if passes == 0 {
            engine_bail!(Configuration, "galaxy3d::BlurFilter", "Number of passes must be at least 1");
        }
        self.number_of_passes = passes;
        Ok(())
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Spread of the kernel in texels per offset unit
    ///
    /// # Errors
    ///
    /// `Error::Configuration` unless the scale is finite and positive.
    pub fn set_scale(&mut self, scale: f32) -> Result<()> {
        if !(scale > 0.0 && scale.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::BlurFilter", "Scale must be positive (got {})", scale);
        }
        self.scale = scale;
        Ok(())
    }

    pub fn is_edge_aware(&self) -> bool {
        self.edge_aware
    }

    pub fn set_edge_aware(&mut self, edge_aware: bool) {
        self.edge_aware = edge_aware;
    }

    pub fn depth_sensitivity(&self) -> f32 {
        self.depth_sensitivity
    }

    /// # Errors
    ///
    /// `Error::Configuration` for negative or non-finite values.
    pub fn set_depth_sensitivity(&mut self, sensitivity: f32) -> Result<()> {
        if !(sensitivity >= 0.0 && sensitivity.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::BlurFilter",
                "Depth sensitivity must be non-negative (got {})", sensitivity);
        }
        self.depth_sensitivity = sensitivity;
        Ok(())
    }

    /// Kernel of the last run, if any
    pub fn kernel(&self) -> Option<&Kernel> {
        self.kernel.as_ref()
    }

    fn update_kernel(&mut self, hardware_filtering: bool, max_samples: usize) -> Result<()> {
        let stale = match &self.kernel {
            Some(kernel) => kernel.hardware_filtering() != hardware_filtering,
            None => true,
        };
        if stale {
            let kernel_type = match self.kernel_type {
                BlurKernel::Box => KernelType::Box,
                BlurKernel::Gaussian => KernelType::Gaussian { standard_deviation: None },
            };
            self.kernel = Some(Kernel::new(kernel_type, self.number_of_samples, hardware_filtering, max_samples)?);
        }
        Ok(())
    }

    /// One direction of one pass, from the context source into the context
    /// target
    fn draw_axis(
        &self,
        context: &RenderContext,
        axis: Vec2,
        depth: Option<&Arc<dyn Texture>>,
        sampler: SamplerType,
    ) -> Result<()> {
        let kernel = match &self.kernel {
            Some(kernel) => kernel,
            None => engine_bail!(InvariantViolation, "galaxy3d::BlurFilter", "Kernel not generated"),
        };
        let source = require_source(context, self.name())?;
        let info = source.info();
        let texel = Vec2::new(1.0 / info.width as f32, 1.0 / info.height as f32);
        let offsets: Vec<Vec2> = kernel.offsets().iter().map(|o| axis * texel * (*o * self.scale)).collect();

        let pass = if depth.is_some() { &self.effect.edge_aware_pass } else { &self.effect.pass };
        let mut draw = FullscreenDraw::new(pass)
            .sampler(0, sampler)
            .texture(&self.effect.source, &source)
            .param(&self.effect.offsets, ParamValue::Vec2Array(offsets))
            .param(&self.effect.weights, ParamValue::FloatArray(kernel.weights()));
        if let Some(depth) = depth {
            draw = draw
                .texture(&self.effect.depth, depth)
                .float(&self.effect.depth_sensitivity, self.depth_sensitivity);
        }
        draw.draw(context)
    }
}

impl PostProcessor for BlurFilter {
    post_processor_common!("galaxy3d::BlurFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let depth = if self.edge_aware { Some(context.require_depth_buffer(self.name())?) } else { None };

        let graphics = context.graphics()?.clone();
        let format = source.info().format;
        let hardware_filtering = graphics.supports_filtering(format)?;
        self.update_kernel(hardware_filtering, graphics.config().max_blur_samples)?;
        let sampler = if hardware_filtering { SamplerType::LinearClamp } else { SamplerType::PointClamp };

        let final_target = context.render_target.clone();
        let final_viewport = context.viewport;
        let working = output_format(context, format)?;

        let horizontal = graphics.obtain_render_target(working)?;
        let spare: Option<PooledRenderTarget> = if self.number_of_passes > 1 {
            Some(graphics.obtain_render_target(working)?)
        } else {
            None
        };

        let mut input = source;
        for pass in 0..self.number_of_passes {
            redirect(context, &input, horizontal.texture());
            self.draw_axis(context, Vec2::X, depth.as_ref(), sampler)?;

            context.source_texture = Some(horizontal.texture().clone());
            if pass + 1 == self.number_of_passes {
                context.render_target = final_target.clone();
                context.viewport = final_viewport;
                self.draw_axis(context, Vec2::Y, depth.as_ref(), sampler)?;
            } else if let Some(spare) = &spare {
                context.render_target = Some(spare.texture().clone());
                self.draw_axis(context, Vec2::Y, depth.as_ref(), sampler)?;
                input = spare.texture().clone();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "blur_filter_tests.rs"]
mod tests;
