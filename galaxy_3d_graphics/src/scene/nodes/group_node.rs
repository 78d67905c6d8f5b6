/// GroupNode: a node without data of its own, used to organize the
/// hierarchy (scene roots, pivots, attachment points).

use crate::error::Result;
use crate::scene::{CloneContext, NodeData};
use crate::scene::node_data::{downcast_source, node_data_common};

#[derive(Debug, Clone, Default)]
pub struct GroupNode;

impl NodeData for GroupNode {
    node_data_common!(GroupNode);

    fn copy_from(&mut self, source: &dyn NodeData, _context: &mut CloneContext) -> Result<()> {
        downcast_source::<GroupNode>(source, "GroupNode")?;
        Ok(())
    }
}
