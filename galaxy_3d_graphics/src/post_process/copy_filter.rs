/// Copy of the source into the render target (stretched to the viewport)

use crate::error::Result;
use crate::render::RenderContext;
use super::post_processor::{blit, post_processor_common, require_source, PostProcessor};

pub struct CopyFilter {
    enabled: bool,
}

impl Default for CopyFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl CopyFilter {
    pub fn new() -> Self {
        Self { enabled: true }
    }
}

impl PostProcessor for CopyFilter {
    post_processor_common!("galaxy3d::CopyFilter");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        blit(context, &source)
    }
}
