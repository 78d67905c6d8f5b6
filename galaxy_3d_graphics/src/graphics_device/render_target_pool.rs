/// Render-target pool - transient GPU targets shared by all filters.
///
/// `obtain` hands out a `PooledRenderTarget` guard; dropping the guard
/// recycles the texture into the free list for its format. Free targets
/// unused for `frame_limit` frames are released by `update`.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::{engine_bail, engine_debug, engine_warn};
use super::{GraphicsDevice, Texture, TextureDesc, TextureFormat, TextureInfo, TextureUsage};

// ===== RENDER TARGET FORMAT =====

/// Key of the pool: size, pixel format and mip chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetFormat {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub mipmaps: bool,
}

impl RenderTargetFormat {
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self { width, height, format, mipmaps: false }
    }

    /// Same size and format as an existing texture
    pub fn from_info(info: &TextureInfo) -> Self {
        Self {
            width: info.width,
            height: info.height,
            format: info.format,
            mipmaps: info.mip_levels > 1,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_mipmaps(mut self, mipmaps: bool) -> Self {
        self.mipmaps = mipmaps;
        self
    }

    /// Divide both dimensions by `factor` (at least 1 pixel)
    pub fn scaled_down(self, factor: u32) -> Self {
        let factor = factor.max(1);
        self.with_size((self.width / factor).max(1), (self.height / factor).max(1))
    }
}

// ===== POOL STATE =====

struct FreeTarget {
    texture: Arc<dyn Texture>,
    last_used_frame: u64,
}

/// Pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderTargetPoolStats {
    /// Targets currently held by a guard
    pub in_use: usize,
    /// Targets waiting in the free lists
    pub free: usize,
    /// Targets created since the pool was built
    pub created: usize,
    /// Targets released by `update` or `clear`
    pub evicted: usize,
}

struct PoolState {
    free: FxHashMap<RenderTargetFormat, Vec<FreeTarget>>,
    frame: u64,
    frame_limit: u32,
    stats: RenderTargetPoolStats,
}

impl PoolState {
    fn recycle(&mut self, format: RenderTargetFormat, texture: Arc<dyn Texture>) {
        self.stats.in_use = self.stats.in_use.saturating_sub(1);
        self.stats.free += 1;
        let frame = self.frame;
        self.free.entry(format).or_default().push(FreeTarget { texture, last_used_frame: frame });
    }
}

// ===== POOLED RENDER TARGET =====

/// Scoped ownership of a pooled render target.
///
/// The texture goes back to the pool when the guard is dropped, on every
/// exit path of the caller.
pub struct PooledRenderTarget {
    texture: Arc<dyn Texture>,
    format: RenderTargetFormat,
    pool: Arc<Mutex<PoolState>>,
}

impl PooledRenderTarget {
    pub fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    pub fn format(&self) -> RenderTargetFormat {
        self.format
    }
}

impl std::fmt::Debug for PooledRenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledRenderTarget").field("format", &self.format).finish()
    }
}

impl Drop for PooledRenderTarget {
    fn drop(&mut self) {
        match self.pool.lock() {
            Ok(mut state) => state.recycle(self.format, self.texture.clone()),
            Err(_) => engine_warn!("galaxy3d::RenderTargetPool",
                "Pool lock poisoned, dropping {}x{} target", self.format.width, self.format.height),
        }
    }
}

// ===== RENDER TARGET POOL =====

/// Cloneable handle to a shared render-target pool
#[derive(Clone)]
pub struct RenderTargetPool {
    state: Arc<Mutex<PoolState>>,
}

impl RenderTargetPool {
    /// Create an empty pool evicting targets unused for `frame_limit` frames
    pub fn new(frame_limit: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(PoolState {
                free: FxHashMap::default(),
                frame: 0,
                frame_limit,
                stats: RenderTargetPoolStats::default(),
            })),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, PoolState>> {
        match self.state.lock() {
            Ok(guard) => Ok(guard),
            Err(_) => engine_bail!("galaxy3d::RenderTargetPool", "Pool lock poisoned"),
        }
    }

    /// Obtain a render target of the given format.
    ///
    /// Reuses a free target when one matches, otherwise creates one on
    /// `device`. The pool lock is released before the device is locked.
    pub fn obtain(
        &self,
        device: &Arc<Mutex<dyn GraphicsDevice>>,
        format: RenderTargetFormat,
    ) -> Result<PooledRenderTarget> {
        if format.width == 0 || format.height == 0 {
            engine_bail!(Configuration, "galaxy3d::RenderTargetPool",
                "Cannot obtain a {}x{} render target", format.width, format.height);
        }

        let reused = {
            let mut state = self.lock()?;
            let texture = state.free.get_mut(&format).and_then(|list| list.pop()).map(|f| f.texture);
            if texture.is_some() {
                state.stats.free -= 1;
                state.stats.in_use += 1;
            }
            texture
        };

        let texture = match reused {
            Some(texture) => texture,
            None => {
                let texture = {
                    let mut device = match device.lock() {
                        Ok(guard) => guard,
                        Err(_) => engine_bail!("galaxy3d::RenderTargetPool", "Device lock poisoned"),
                    };
                    device.create_texture(TextureDesc {
                        width: format.width,
                        height: format.height,
                        format: format.format,
                        usage: TextureUsage::SampledAndRenderTarget,
                        mipmaps: format.mipmaps,
                    })?
                };
                let mut state = self.lock()?;
                state.stats.created += 1;
                state.stats.in_use += 1;
                engine_debug!("galaxy3d::RenderTargetPool",
                    "Created {}x{} {:?} target ({} in use)",
                    format.width, format.height, format.format, state.stats.in_use);
                texture
            }
        };

        Ok(PooledRenderTarget { texture, format, pool: self.state.clone() })
    }

    /// Advance to `frame` and release free targets unused for too long
    pub fn update(&self, frame: u64) -> Result<usize> {
        let mut state = self.lock()?;
        state.frame = frame;
        let limit = state.frame_limit as u64;

        let mut evicted = 0;
        for list in state.free.values_mut() {
            let before = list.len();
            list.retain(|t| frame.saturating_sub(t.last_used_frame) < limit);
            evicted += before - list.len();
        }
        state.free.retain(|_, list| !list.is_empty());
        state.stats.free -= evicted;
        state.stats.evicted += evicted;

        if evicted > 0 {
            engine_debug!("galaxy3d::RenderTargetPool", "Evicted {} render targets at frame {}", evicted, frame);
        }
        Ok(evicted)
    }

    /// Release every free target
    pub fn clear(&self) -> Result<()> {
        let mut state = self.lock()?;
        let count = state.stats.free;
        state.free.clear();
        state.stats.free = 0;
        state.stats.evicted += count;
        Ok(())
    }

    pub fn stats(&self) -> RenderTargetPoolStats {
        self.state.lock().map(|s| s.stats).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "render_target_pool_tests.rs"]
mod tests;
