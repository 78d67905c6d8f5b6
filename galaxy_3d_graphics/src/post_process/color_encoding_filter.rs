/// Color space encoding and decoding.
///
/// Packs HDR colors into 8-bit targets (RGBM, RGBE, LogLuv) or converts
/// between linear and sRGB, and the reverse.

use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    require_parameter, require_pass, Effect, EffectParameter, EffectPass, GraphicsService, SamplerType,
};
use crate::render::RenderContext;
use super::post_processor::{post_processor_common, require_source, FullscreenDraw, PostProcessor};

const EFFECT: &str = "ColorEncoding";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorEncoding {
    /// Linear RGB (plain copy)
    Rgb,
    Srgb,
    /// RGB times a shared multiplier in alpha, scaled by `range`
    Rgbm { range: f32 },
    /// Shared exponent in alpha
    Rgbe,
    LogLuv,
}

impl ColorEncoding {
    /// Position in `PASS_SUFFIXES`
    fn index(&self) -> usize {
        match self {
            ColorEncoding::Rgb => 0,
            ColorEncoding::Srgb => 1,
            ColorEncoding::Rgbm { .. } => 2,
            ColorEncoding::Rgbe => 3,
            ColorEncoding::LogLuv => 4,
        }
    }

    /// Whether encoded values only make sense in an 8-bit unorm target
    pub fn requires_8bit_target(&self) -> bool {
        matches!(self, ColorEncoding::Rgbe | ColorEncoding::LogLuv)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingDirection {
    /// Linear source to encoded target
    Encode,
    /// Encoded source to linear target
    Decode,
}

const PASS_SUFFIXES: [&str; 5] = ["Rgb", "Srgb", "Rgbm", "Rgbe", "LogLuv"];

struct ColorEncodingEffect {
    /// Encode passes, in `PASS_SUFFIXES` order
    encode_passes: Vec<EffectPass>,
    decode_passes: Vec<EffectPass>,
    source: EffectParameter,
    rgbm_range: EffectParameter,
}

pub struct ColorEncodingFilter {
    enabled: bool,
    effect: ColorEncodingEffect,
    encoding: ColorEncoding,
    direction: EncodingDirection,
}

fn load_passes(effect: &dyn Effect, prefix: &str) -> Result<Vec<EffectPass>> {
    PASS_SUFFIXES
        .iter()
        .map(|suffix| require_pass(effect, &format!("{}{}", prefix, suffix)))
        .collect()
}

impl ColorEncodingFilter {
    pub fn new(graphics: &GraphicsService) -> Result<Self> {
        let effect = graphics.load_effect(EFFECT)?;
        let effect = ColorEncodingEffect {
            encode_passes: load_passes(effect.as_ref(), "Encode")?,
            decode_passes: load_passes(effect.as_ref(), "Decode")?,
            source: require_parameter(effect.as_ref(), "SourceTexture")?,
            rgbm_range: require_parameter(effect.as_ref(), "RgbmRange")?,
        };
        Ok(Self {
            enabled: true,
            effect,
            encoding: ColorEncoding::Srgb,
            direction: EncodingDirection::Encode,
        })
    }

    pub fn encoding(&self) -> ColorEncoding {
        self.encoding
    }

    /// # Errors
    ///
    /// `Error::Configuration` if an RGBM range is not positive.
    pub fn set_encoding(&mut self, encoding: ColorEncoding) -> Result<()> {
        if let ColorEncoding::Rgbm { range } = encoding {
            if !(range > 0.0 && range.is_finite()) {
                engine_bail!(Configuration, "galaxy3d::ColorEncodingFilter",
                    "RGBM range must be positive (got {})", range);
            }
        }
        self.encoding = encoding;
        Ok(())
    }

    pub fn direction(&self) -> EncodingDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: EncodingDirection) {
        self.direction = direction;
    }

    fn pass(&self) -> &EffectPass {
        let index = self.encoding.index();
        match self.direction {
            EncodingDirection::Encode => &self.effect.encode_passes[index],
            EncodingDirection::Decode => &self.effect.decode_passes[index],
        }
    }
}

impl PostProcessor for ColorEncodingFilter {
    post_processor_common!("galaxy3d::ColorEncodingFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;

        // The back buffer is an 8-bit unorm surface
        if self.direction == EncodingDirection::Encode && self.encoding.requires_8bit_target() {
            if let Some(target) = &context.render_target {
                let format = target.info().format;
                if !format.is_8bit_unorm() {
                    engine_bail!(Configuration, "galaxy3d::ColorEncodingFilter",
                        "{:?} encoding needs an 8-bit unorm target (got {:?})", self.encoding, format);
                }
            }
        }

        let range = match self.encoding {
            ColorEncoding::Rgbm { range } => range,
            _ => 1.0,
        };
        FullscreenDraw::new(self.pass())
            .sampler(0, SamplerType::PointClamp)
            .texture(&self.effect.source, &source)
            .float(&self.effect.rgbm_range, range)
            .draw(context)
    }
}

#[cfg(test)]
#[path = "color_encoding_filter_tests.rs"]
mod tests;
