/// Brightness / contrast / gamma adjustment with an optional color LUT.
///
/// The LUT is a 2D strip of `size` slices of `size x size` texels
/// (`size * size` wide, `size` high).

use std::sync::Arc;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    require_parameter, require_pass, EffectParameter, EffectPass, GraphicsService, SamplerType, Texture,
};
use crate::render::RenderContext;
use super::post_processor::{post_processor_common, require_source, FullscreenDraw, PostProcessor};

const EFFECT: &str = "ColorCorrection";

struct ColorCorrectionEffect {
    pass: EffectPass,
    lut_pass: EffectPass,
    source: EffectParameter,
    lut: EffectParameter,
    lut_size: EffectParameter,
    brightness: EffectParameter,
    contrast: EffectParameter,
    gamma: EffectParameter,
}

pub struct ColorCorrectionFilter {
    enabled: bool,
    effect: ColorCorrectionEffect,
    lut: Option<Arc<dyn Texture>>,
    brightness: f32,
    contrast: f32,
    gamma: f32,
}

impl ColorCorrectionFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = ColorCorrectionEffect {
            pass: require_pass(effect.as_ref(), "ColorCorrection")?,
            lut_pass: require_pass(effect.as_ref(), "ColorCorrectionLut")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            lut: require_parameter(effect.as_ref(), "LutTexture")?,
            lut_size: require_parameter(effect.as_ref(), "LutSize")?,
            brightness: require_parameter(effect.as_ref(), "Brightness")?,
            contrast: require_parameter(effect.as_ref(), "Contrast")?,
            gamma: require_parameter(effect.as_ref(), "Gamma")?,
        };
        Ok(Self {
            enabled: true,
            effect,
            lut: None,
            brightness: 0.0,
            contrast: 1.0,
            gamma: 1.0,
        })
    }

    pub fn lut(&self) -> Option<&Arc<dyn Texture>> {
        self.lut.as_ref()
    }

    /// # Errors
    ///
    /// `Error::Configuration` if the texture is not a `size * size` by
    /// `size` strip.
    pub fn set_lut(&mut self, lut: Option<Arc<dyn Texture>>) -> Result<()> {
        if let Some(texture) = &lut {
            let info = texture.info();
            if info.height < 2 || info.width != info.height * info.height {
                engine_bail!(Configuration, "galaxy3d::ColorCorrectionFilter",
                    "LUT must be a size*size x size strip (got {}x{})", info.width, info.height);
            }
        }
        self.lut = lut;
        Ok(())
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Offset added to every channel, in [-1, 1]
    pub fn set_brightness(&mut self, brightness: f32) -> Result<()> {
        if !(-1.0..=1.0).contains(&brightness) {
            engine_bail!(Configuration, "galaxy3d::ColorCorrectionFilter",
                "Brightness must be in [-1, 1] (got {})", brightness);
        }
        self.brightness = brightness;
        Ok(())
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn set_contrast(&mut self, contrast: f32) -> Result<()> {
        if !(contrast >= 0.0 && contrast.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::ColorCorrectionFilter",
                "Contrast must be non-negative (got {})", contrast);
        }
        self.contrast = contrast;
        Ok(())
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn set_gamma(&mut self, gamma: f32) -> Result<()> {
        if !(gamma > 0.0 && gamma.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::ColorCorrectionFilter",
                "Gamma must be positive (got {})", gamma);
        }
        self.gamma = gamma;
        Ok(())
    }
}

impl PostProcessor for ColorCorrectionFilter {
    post_processor_common!("galaxy3d::ColorCorrectionFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let draw = match &self.lut {
            Some(lut) => FullscreenDraw::new(&self.effect.lut_pass)
                .sampler(1, SamplerType::LinearClamp)
                .texture(&self.effect.lut, lut)
                .float(&self.effect.lut_size, lut.info().height as f32),
            None => FullscreenDraw::new(&self.effect.pass),
        };
        draw.sampler(0, SamplerType::PointClamp)
            .texture(&self.effect.source, &source)
            .float(&self.effect.brightness, self.brightness)
            .float(&self.effect.contrast, self.contrast)
            .float(&self.effect.gamma, self.gamma)
            .draw(context)
    }
}

#[cfg(test)]
#[path = "color_correction_filter_tests.rs"]
mod tests;
