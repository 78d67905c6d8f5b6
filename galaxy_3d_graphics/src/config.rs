/// Graphics configuration shared by the scene queries and the
/// post-processing pipeline.

use crate::error::Result;
use crate::engine_bail;

/// Policy for hardware (bilinear) filtering of render targets.
///
/// Drives blur kernel merging and linear vs. point downsampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareFiltering {
    /// Ask the device whether the texture format supports linear filtering
    Auto,
    /// Always assume linear filtering is available
    Always,
    /// Never rely on linear filtering
    Never,
}

/// Graphics configuration
#[derive(Debug, Clone)]
pub struct GraphicsConfig {
    /// Pooled render targets unused for this many frames are released
    pub render_target_pool_frame_limit: u32,
    /// Global LOD bias copied into new render contexts
    pub lod_bias: f32,
    /// Hardware filtering policy
    pub hardware_filtering: HardwareFiltering,
    /// Upper bound on generated blur kernel samples
    pub max_blur_samples: usize,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            render_target_pool_frame_limit: 10,
            lod_bias: 1.0,
            hardware_filtering: HardwareFiltering::Auto,
            max_blur_samples: 23,
        }
    }
}

impl GraphicsConfig {
    /// Set the pool eviction window (in frames)
    pub fn with_render_target_pool_frame_limit(mut self, frames: u32) -> Self {
        self.render_target_pool_frame_limit = frames;
        self
    }

    /// Set the global LOD bias
    pub fn with_lod_bias(mut self, lod_bias: f32) -> Self {
        self.lod_bias = lod_bias;
        self
    }

    /// Set the hardware filtering policy
    pub fn with_hardware_filtering(mut self, policy: HardwareFiltering) -> Self {
        self.hardware_filtering = policy;
        self
    }

    /// Set the maximum number of blur kernel samples
    pub fn with_max_blur_samples(mut self, samples: usize) -> Self {
        self.max_blur_samples = samples;
        self
    }

    /// Check all values are in range
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` for a zero eviction window, a
    /// non-positive or non-finite LOD bias, or a zero sample limit.
    pub fn validate(&self) -> Result<()> {
        if self.render_target_pool_frame_limit == 0 {
            engine_bail!(Configuration, "galaxy3d::GraphicsConfig",
                "render_target_pool_frame_limit must be at least 1");
        }
        if !(self.lod_bias.is_finite() && self.lod_bias > 0.0) {
            engine_bail!(Configuration, "galaxy3d::GraphicsConfig",
                "lod_bias must be positive and finite (got {})", self.lod_bias);
        }
        if self.max_blur_samples == 0 {
            engine_bail!(Configuration, "galaxy3d::GraphicsConfig",
                "max_blur_samples must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_config_is_valid() {
        let config = GraphicsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_blur_samples, 23);
        assert_eq!(config.hardware_filtering, HardwareFiltering::Auto);
    }

    #[test]
    fn test_builder_setters() {
        let config = GraphicsConfig::default()
            .with_lod_bias(2.0)
            .with_render_target_pool_frame_limit(3)
            .with_hardware_filtering(HardwareFiltering::Never)
            .with_max_blur_samples(15);
        assert_eq!(config.lod_bias, 2.0);
        assert_eq!(config.render_target_pool_frame_limit, 3);
        assert_eq!(config.hardware_filtering, HardwareFiltering::Never);
        assert_eq!(config.max_blur_samples, 15);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad = GraphicsConfig::default().with_render_target_pool_frame_limit(0);
        assert!(matches!(bad.validate(), Err(Error::Configuration(_))));

        let bad = GraphicsConfig::default().with_lod_bias(0.0);
        assert!(matches!(bad.validate(), Err(Error::Configuration(_))));

        let bad = GraphicsConfig::default().with_lod_bias(f32::NAN);
        assert!(bad.validate().is_err());

        let bad = GraphicsConfig::default().with_max_blur_samples(0);
        assert!(bad.validate().is_err());
    }
}
