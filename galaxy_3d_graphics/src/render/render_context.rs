/// RenderContext: frame state handed from filter to filter.
///
/// Holds the current source texture, render target and viewport that a
/// post-processor reads and writes, the cameras used for rendering and for
/// LOD selection, the G-buffer, and an open-ended side channel for
/// auxiliary buffers exchanged between filters (half-resolution depth,
/// velocity buffers, ...).
///
/// A context may exist without a graphics service; scene queries only
/// need the camera state. Filters call `graphics()` and get a
/// configuration error when no service is attached.

use std::any::Any;
use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::camera::CameraView;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{GraphicsService, Texture, Viewport};
use crate::scene::{NodeKey, SceneGraph};

/// Well-known side-channel keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContextKey {
    /// Half-resolution depth buffer (`Arc<dyn Texture>`)
    DepthBufferHalf,
    /// Per-pixel velocity of the current frame (`Arc<dyn Texture>`)
    VelocityBuffer,
    /// Per-pixel velocity of the previous frame (`Arc<dyn Texture>`)
    LastVelocityBuffer,
    /// Renderer that re-renders the depth buffer after an upsample
    /// (`Arc<dyn DepthRebuilder>`)
    RebuildZBufferRenderer,
    /// Application-defined entry
    Named(String),
}

/// Geometry buffers produced by the scene pass
#[derive(Debug, Clone, Default)]
pub struct GBuffer {
    /// Linear or hardware depth
    pub depth: Option<Arc<dyn Texture>>,
    /// View-space normals
    pub normal: Option<Arc<dyn Texture>>,
}

/// Snapshot of the fields a post-processor must leave untouched
#[derive(Debug, Clone)]
pub struct TargetState {
    pub source_texture: Option<Arc<dyn Texture>>,
    pub render_target: Option<Arc<dyn Texture>>,
    pub viewport: Option<Viewport>,
}

pub struct RenderContext {
    graphics: Option<GraphicsService>,
    /// Input of the next post-processor
    pub source_texture: Option<Arc<dyn Texture>>,
    /// Output of the next post-processor (`None` = back buffer)
    pub render_target: Option<Arc<dyn Texture>>,
    /// Output viewport (`None` = whole render target)
    pub viewport: Option<Viewport>,
    pub gbuffer: GBuffer,
    /// Global LOD bias, multiplied into view-normalized distances
    pub lod_bias: f32,
    /// Node on whose behalf the current pass renders (e.g. the light of a
    /// shadow pass)
    pub reference_node: Option<NodeKey>,
    /// Frame counter
    pub frame: u64,
    /// Seconds since the previous frame
    pub delta_time: f32,
    camera_node: Option<NodeKey>,
    camera: Option<CameraView>,
    lod_camera_node: Option<NodeKey>,
    lod_camera: Option<CameraView>,
    data: FxHashMap<ContextKey, Box<dyn Any + Send>>,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    /// Context without a graphics service (scene queries only)
    pub fn new() -> Self {
        Self {
            graphics: None,
            source_texture: None,
            render_target: None,
            viewport: None,
            gbuffer: GBuffer::default(),
            lod_bias: 1.0,
            reference_node: None,
            frame: 0,
            delta_time: 0.0,
            camera_node: None,
            camera: None,
            lod_camera_node: None,
            lod_camera: None,
            data: FxHashMap::default(),
        }
    }

    /// Context rendering through `graphics`; takes the LOD bias from its
    /// configuration
    pub fn with_graphics(graphics: GraphicsService) -> Self {
        let mut context = Self::new();
        context.lod_bias = graphics.config().lod_bias;
        context.graphics = Some(graphics);
        context
    }

    /// Graphics service of the context
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if the context has none.
    pub fn graphics(&self) -> Result<&GraphicsService> {
        match &self.graphics {
            Some(graphics) => Ok(graphics),
            None => engine_bail!(Configuration, "galaxy3d::RenderContext",
                "Render context has no graphics service"),
        }
    }

    pub fn has_graphics(&self) -> bool {
        self.graphics.is_some()
    }

    // ===== CAMERAS =====

    /// Use a camera node for rendering, snapshotting its view
    pub fn set_camera(&mut self, graph: &SceneGraph, camera: NodeKey) -> Result<()> {
        self.camera = Some(graph.camera_view(camera)?);
        self.camera_node = Some(camera);
        Ok(())
    }

    pub fn clear_camera(&mut self) {
        self.camera = None;
        self.camera_node = None;
    }

    pub fn camera_node(&self) -> Option<NodeKey> {
        self.camera_node
    }

    pub fn camera(&self) -> Option<&CameraView> {
        self.camera.as_ref()
    }

    /// Camera view needed by a filter
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if no camera is set.
    pub fn require_camera(&self, source: &str) -> Result<&CameraView> {
        match &self.camera {
            Some(camera) => Ok(camera),
            None => engine_bail!(Configuration, "galaxy3d::RenderContext",
                "{} requires a camera in the render context", source),
        }
    }

    /// Use a camera node for LOD selection and distance culling
    pub fn set_lod_camera(&mut self, graph: &SceneGraph, camera: NodeKey) -> Result<()> {
        self.lod_camera = Some(graph.camera_view(camera)?);
        self.lod_camera_node = Some(camera);
        Ok(())
    }

    pub fn clear_lod_camera(&mut self) {
        self.lod_camera = None;
        self.lod_camera_node = None;
    }

    pub fn lod_camera_node(&self) -> Option<NodeKey> {
        self.lod_camera_node
    }

    pub fn lod_camera(&self) -> Option<&CameraView> {
        self.lod_camera.as_ref()
    }

    // ===== G-BUFFER =====

    /// # Errors
    ///
    /// `Error::Configuration` if the G-buffer has no depth buffer.
    pub fn require_depth_buffer(&self, source: &str) -> Result<Arc<dyn Texture>> {
        match &self.gbuffer.depth {
            Some(depth) => Ok(depth.clone()),
            None => engine_bail!(Configuration, "galaxy3d::RenderContext",
                "{} requires a depth buffer in the render context", source),
        }
    }

    /// # Errors
    ///
    /// `Error::Configuration` if the G-buffer has no normal buffer.
    pub fn require_normal_buffer(&self, source: &str) -> Result<Arc<dyn Texture>> {
        match &self.gbuffer.normal {
            Some(normal) => Ok(normal.clone()),
            None => engine_bail!(Configuration, "galaxy3d::RenderContext",
                "{} requires a normal buffer in the render context", source),
        }
    }

    // ===== SIDE CHANNEL =====

    /// Store a value, replacing any previous value under `key`
    pub fn set_data<T: Any + Send>(&mut self, key: ContextKey, value: T) {
        self.data.insert(key, Box::new(value));
    }

    /// Value under `key`, if present and of type `T`
    pub fn data<T: Any + Send>(&self, key: &ContextKey) -> Option<&T> {
        self.data.get(key)?.downcast_ref::<T>()
    }

    pub fn remove_data(&mut self, key: &ContextKey) -> bool {
        self.data.remove(key).is_some()
    }

    pub fn contains_data(&self, key: &ContextKey) -> bool {
        self.data.contains_key(key)
    }

    /// Texture stored under `key`, if any
    pub fn texture(&self, key: &ContextKey) -> Option<Arc<dyn Texture>> {
        self.data::<Arc<dyn Texture>>(key).cloned()
    }

    /// Texture a filter cannot work without
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if no texture is stored under `key`.
    pub fn require_texture(&self, key: &ContextKey, source: &str) -> Result<Arc<dyn Texture>> {
        match self.texture(key) {
            Some(texture) => Ok(texture),
            None => engine_bail!(Configuration, "galaxy3d::RenderContext",
                "{} requires {:?} in the render context", source, key),
        }
    }

    // ===== TARGET STATE =====

    pub fn save_targets(&self) -> TargetState {
        TargetState {
            source_texture: self.source_texture.clone(),
            render_target: self.render_target.clone(),
            viewport: self.viewport,
        }
    }

    pub fn restore_targets(&mut self, state: TargetState) {
        self.source_texture = state.source_texture;
        self.render_target = state.render_target;
        self.viewport = state.viewport;
    }

    /// Size of the current render target (the back buffer when unset)
    pub fn render_target_size(&self) -> Result<(u32, u32)> {
        match &self.render_target {
            Some(target) => Ok((target.info().width, target.info().height)),
            None => self.graphics()?.back_buffer_size(),
        }
    }

    /// Viewport to draw into: the explicit one, or the whole target
    pub fn effective_viewport(&self) -> Result<Viewport> {
        match self.viewport {
            Some(viewport) => Ok(viewport),
            None => {
                let (width, height) = self.render_target_size()?;
                Ok(Viewport::from_size(width, height))
            }
        }
    }
}

#[cfg(test)]
#[path = "render_context_tests.rs"]
mod tests;
