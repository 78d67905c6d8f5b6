/// Shared fixtures for the post-processing tests

use std::f32::consts::FRAC_PI_2;
use std::sync::{Arc, Mutex};
use glam::Vec3;
use crate::camera::{Camera, Projection};
use crate::config::GraphicsConfig;
use crate::graphics_device::mock_graphics_device::{MockGraphicsDevice, MockTexture};
use crate::graphics_device::{same_texture, GraphicsService, Texture, TextureFormat, Viewport};
use crate::render::{RenderContext, TargetState};
use crate::scene::{CameraNode, NodeKey, SceneGraph};

pub(crate) struct Harness {
    pub device: Arc<Mutex<MockGraphicsDevice>>,
    pub graphics: GraphicsService,
    pub context: RenderContext,
    pub source: Arc<dyn Texture>,
    pub target: Arc<dyn Texture>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(GraphicsConfig::default())
    }

    pub fn with_config(config: GraphicsConfig) -> Self {
        Self::with_format(config, TextureFormat::R8G8B8A8_UNORM)
    }

    /// Source and target of `format`, 256x128
    pub fn with_format(config: GraphicsConfig, format: TextureFormat) -> Self {
        let device = MockGraphicsDevice::shared();
        let graphics = GraphicsService::new(device.clone(), config).unwrap();
        let source = MockTexture::shared(256, 128, format, "source");
        let target = MockTexture::shared(256, 128, format, "target");
        let mut context = RenderContext::with_graphics(graphics.clone());
        context.source_texture = Some(source.clone());
        context.render_target = Some(target.clone());
        context.viewport = Some(Viewport::from_size(256, 128));
        Self { device, graphics, context, source, target }
    }

    pub fn add_gbuffer(&mut self) {
        self.context.gbuffer.depth = Some(MockTexture::shared(256, 128, TextureFormat::D32_FLOAT, "depth"));
        self.context.gbuffer.normal = Some(MockTexture::shared(256, 128, TextureFormat::R16G16B16A16_SFLOAT, "normal"));
    }

    /// Camera at `position` looking down -Z, set as the rendering camera
    pub fn add_camera(&mut self, graph: &mut SceneGraph, position: Vec3) -> NodeKey {
        let projection = Projection::perspective(FRAC_PI_2, 2.0, 0.1, 100.0).unwrap();
        let camera = graph.create_node("camera", CameraNode::new(Arc::new(Camera::new("main", projection).unwrap())));
        graph.set_position_local(camera, position).unwrap();
        self.context.set_camera(graph, camera).unwrap();
        camera
    }

    pub fn mock(&self) -> std::sync::MutexGuard<'_, MockGraphicsDevice> {
        self.device.lock().unwrap()
    }

    /// Ids of the textures bound to `parameter`, in order
    pub fn bound(&self, parameter: &str) -> Vec<usize> {
        use crate::graphics_device::mock_graphics_device::DeviceCommand;
        self.mock().commands.iter().filter_map(|c| match c {
            DeviceCommand::SetParameter { name, texture: Some(id), .. } if name == parameter => Some(*id),
            _ => None,
        }).collect()
    }

    pub fn assert_no_hazards(&self) {
        let hazards = self.mock().hazards.clone();
        assert!(hazards.is_empty(), "hazards: {:?}", hazards);
    }

    /// Every pooled target went back to the pool
    pub fn assert_pool_released(&self) {
        assert_eq!(self.graphics.pool().stats().in_use, 0);
    }

    /// The last draw or blit wrote the harness target
    pub fn assert_wrote_target(&self) {
        let targets = self.mock().render_targets();
        assert_eq!(targets.last().copied().flatten(), Some(crate::graphics_device::texture_id(&self.target)));
    }
}

pub(crate) fn assert_restored(context: &RenderContext, before: &TargetState) {
    let same = |a: &Option<Arc<dyn Texture>>, b: &Option<Arc<dyn Texture>>| match (a, b) {
        (Some(a), Some(b)) => same_texture(a, b),
        (None, None) => true,
        _ => false,
    };
    assert!(same(&context.source_texture, &before.source_texture), "source texture changed");
    assert!(same(&context.render_target, &before.render_target), "render target changed");
    assert_eq!(context.viewport, before.viewport);
}
