/// GraphicsService - device, render-target pool and configuration bundled
/// together and handed to every filter and render context.

use std::sync::{Arc, Mutex};
use crate::config::{GraphicsConfig, HardwareFiltering};
use crate::error::Result;
use crate::engine_bail;
use super::{GraphicsDevice, Effect, TextureFormat, RenderTargetFormat, RenderTargetPool, PooledRenderTarget};

#[derive(Clone)]
pub struct GraphicsService {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    pool: RenderTargetPool,
    config: GraphicsConfig,
}

impl GraphicsService {
    /// Build a service around a device
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if `config` fails validation.
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>, config: GraphicsConfig) -> Result<Self> {
        config.validate()?;
        let pool = RenderTargetPool::new(config.render_target_pool_frame_limit);
        Ok(Self { device, pool, config })
    }

    pub fn device(&self) -> &Arc<Mutex<dyn GraphicsDevice>> {
        &self.device
    }

    pub fn pool(&self) -> &RenderTargetPool {
        &self.pool
    }

    pub fn config(&self) -> &GraphicsConfig {
        &self.config
    }

    /// Run `f` with the device locked.
    ///
    /// The lock is released when `f` returns; `f` must not obtain pooled
    /// targets or run other filters.
    pub fn with_device<R>(&self, f: impl FnOnce(&mut dyn GraphicsDevice) -> Result<R>) -> Result<R> {
        let mut device = match self.device.lock() {
            Ok(guard) => guard,
            Err(_) => engine_bail!("galaxy3d::GraphicsService", "Device lock poisoned"),
        };
        f(&mut *device)
    }

    /// Obtain a pooled render target
    pub fn obtain_render_target(&self, format: RenderTargetFormat) -> Result<PooledRenderTarget> {
        self.pool.obtain(&self.device, format)
    }

    /// Load an effect by name
    pub fn load_effect(&self, name: &str) -> Result<Arc<dyn Effect>> {
        self.with_device(|device| device.load_effect(name))
    }

    /// Whether bilinear filtering may be relied on for `format`,
    /// honoring the configured policy
    pub fn supports_filtering(&self, format: TextureFormat) -> Result<bool> {
        match self.config.hardware_filtering {
            HardwareFiltering::Always => Ok(true),
            HardwareFiltering::Never => Ok(false),
            HardwareFiltering::Auto => {
                self.with_device(|device| Ok(device.capabilities().supports_filtering(format)))
            }
        }
    }

    /// Size of the back buffer
    pub fn back_buffer_size(&self) -> Result<(u32, u32)> {
        self.with_device(|device| Ok(device.back_buffer_size()))
    }

    /// Per-frame housekeeping (pool eviction)
    pub fn begin_frame(&self, frame: u64) -> Result<()> {
        self.pool.update(frame).map(|_| ())
    }
}

#[cfg(test)]
#[path = "graphics_service_tests.rs"]
mod tests;
