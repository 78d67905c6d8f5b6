//! Post-process module - image filters chained through a shared
//! `RenderContext`.
//!
//! - `PostProcessor`: single-input, single-output filter contract; the
//!   provided `process` restores the context targets on every exit path
//! - `PostProcessorChain`: a list of filters ping-ponging pooled
//!   intermediates
//! - `Kernel`: box and Gaussian blur weights, merged for bilinear sampling
//! - Concrete filters, each loading its effect at construction

mod post_processor;
mod post_processor_chain;
mod kernel;
mod copy_filter;
mod blur_filter;
mod downsample_filter;
mod upsample_filter;
mod bloom_filter;
mod luminance_filter;
mod hdr_filter;
mod ssao_filter;
mod sao_filter;
mod depth_of_field_filter;
mod god_ray_filter;
mod motion_blur_filter;
mod color_correction_filter;
mod color_encoding_filter;
mod grain_filter;
mod sharpening_filter;
mod sepia_filter;
mod saturation_filter;

#[cfg(test)]
pub(crate) mod test_utils;

pub use post_processor::PostProcessor;
pub use post_processor_chain::PostProcessorChain;
pub use kernel::{Kernel, KernelType, KernelSample, validate_sample_count};
pub use copy_filter::CopyFilter;
pub use blur_filter::{BlurFilter, BlurKernel};
pub use downsample_filter::{DownsampleFilter, DepthCombine};
pub use upsample_filter::{UpsampleFilter, UpsampleMode, DepthRebuilder};
pub use bloom_filter::BloomFilter;
pub use luminance_filter::LuminanceFilter;
pub use hdr_filter::HdrFilter;
pub use ssao_filter::SsaoFilter;
pub use sao_filter::SaoFilter;
pub use depth_of_field_filter::DepthOfFieldFilter;
pub use god_ray_filter::GodRayFilter;
pub use motion_blur_filter::MotionBlurFilter;
pub use color_correction_filter::ColorCorrectionFilter;
pub use color_encoding_filter::{ColorEncodingFilter, ColorEncoding, EncodingDirection};
pub use grain_filter::GrainFilter;
pub use sharpening_filter::SharpeningFilter;
pub use sepia_filter::SepiaFilter;
pub use saturation_filter::SaturationFilter;
