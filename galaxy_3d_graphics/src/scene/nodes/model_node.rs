/// ModelNode: root of an imported model.
///
/// Mesh, light and camera nodes of the model hang below it. The node only
/// remembers which asset it was built from.

use crate::error::Result;
use crate::scene::{CloneContext, NodeData};
use crate::scene::node_data::{downcast_source, node_data_common};

#[derive(Debug, Clone, Default)]
pub struct ModelNode {
    source: String,
}

impl ModelNode {
    pub fn new(source: &str) -> Self {
        Self { source: source.to_string() }
    }

    /// Asset the model was built from
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl NodeData for ModelNode {
    node_data_common!(ModelNode);

    fn copy_from(&mut self, source: &dyn NodeData, _context: &mut CloneContext) -> Result<()> {
        let source = downcast_source::<ModelNode>(source, "ModelNode")?;
        self.source = source.source.clone();
        Ok(())
    }
}
