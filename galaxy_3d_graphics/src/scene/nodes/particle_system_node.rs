/// ParticleSystemNode: places a shared particle system definition.

use std::sync::Arc;
use crate::error::Result;
use crate::engine_bail;
use crate::math::Shape;
use crate::resource::ParticleSystem;
use crate::scene::{CloneContext, NodeData};
use crate::scene::node_data::{downcast_source, node_data_common};

pub struct ParticleSystemNode {
    system: Option<Arc<ParticleSystem>>,
    time_scale: f32,
}

impl Default for ParticleSystemNode {
    fn default() -> Self {
        Self { system: None, time_scale: 1.0 }
    }
}

impl ParticleSystemNode {
    pub fn new(system: Arc<ParticleSystem>) -> Self {
        Self { system: Some(system), ..Self::default() }
    }

    pub fn system(&self) -> Option<&Arc<ParticleSystem>> {
        self.system.as_ref()
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// # Errors
    ///
    /// `Error::Configuration` for a negative or non-finite scale.
    pub fn set_time_scale(&mut self, time_scale: f32) -> Result<()> {
        if !(time_scale >= 0.0 && time_scale.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::ParticleSystemNode",
                "time_scale must be >= 0 (got {})", time_scale);
        }
        self.time_scale = time_scale;
        Ok(())
    }
}

impl NodeData for ParticleSystemNode {
    node_data_common!(ParticleSystemNode);

    fn copy_from(&mut self, source: &dyn NodeData, _context: &mut CloneContext) -> Result<()> {
        let source = downcast_source::<ParticleSystemNode>(source, "ParticleSystemNode")?;
        self.system = source.system.clone();
        self.time_scale = source.time_scale;
        Ok(())
    }

    fn bounding_shape(&self) -> Option<Shape> {
        self.system.as_ref().map(|s| s.bounds())
    }
}
