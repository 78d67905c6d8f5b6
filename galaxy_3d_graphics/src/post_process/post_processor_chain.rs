/// PostProcessorChain: runs a list of filters as a single filter.
///
/// Enabled processors are chained through at most two pooled intermediates
/// sized to the output viewport; the last one writes the chain's render
/// target. Disabled processors are skipped rather than copied through.

use crate::error::Result;
use crate::engine_trace;
use crate::graphics_device::PooledRenderTarget;
use crate::render::RenderContext;
use super::post_processor::{
    blit, output_format, post_processor_common, redirect, require_source, PostProcessor,
};

pub struct PostProcessorChain {
    enabled: bool,
    processors: Vec<Box<dyn PostProcessor>>,
}

impl Default for PostProcessorChain {
    fn default() -> Self {
        Self::new()
    }
}

impl PostProcessorChain {
    pub fn new() -> Self {
        Self { enabled: true, processors: Vec::new() }
    }

    /// Append a processor at the end of the chain
    pub fn push(&mut self, processor: Box<dyn PostProcessor>) {
        self.processors.push(processor);
    }

    /// Insert a processor at `index` (clamped to the chain length)
    pub fn insert(&mut self, index: usize, processor: Box<dyn PostProcessor>) {
        let index = index.min(self.processors.len());
        self.processors.insert(index, processor);
    }

    pub fn remove(&mut self, index: usize) -> Option<Box<dyn PostProcessor>> {
        if index < self.processors.len() {
            Some(self.processors.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.processors.clear();
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn PostProcessor> {
        self.processors.get(index).map(|p| p.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn PostProcessor + 'static)> {
        self.processors.get_mut(index).map(|p| p.as_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn PostProcessor> {
        self.processors.iter().map(|p| p.as_ref())
    }

    /// Number of processors that will run
    pub fn enabled_count(&self) -> usize {
        self.processors.iter().filter(|p| p.is_enabled()).count()
    }
}

impl PostProcessor for PostProcessorChain {
    post_processor_common!("galaxy3d::PostProcessorChain");

    fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        let source = require_source(context, self.name())?;
        let active: Vec<usize> = (0..self.processors.len())
            .filter(|&i| self.processors[i].is_enabled())
            .collect();

        match active.len() {
            0 => return blit(context, &source),
            1 => return self.processors[active[0]].process(context),
            _ => {}
        }

        let graphics = context.graphics()?.clone();
        let final_target = context.render_target.clone();
        let final_viewport = context.viewport;
        let working = output_format(context, source.info().format)?;

        // Two processors need a single intermediate
        let mut temps: Vec<PooledRenderTarget> = Vec::with_capacity(2);
        temps.push(graphics.obtain_render_target(working)?);
        if active.len() > 2 {
            temps.push(graphics.obtain_render_target(working)?);
        }

        let mut input = source;
        for (step, &index) in active.iter().enumerate() {
            let processor = &mut self.processors[index];
            engine_trace!("galaxy3d::PostProcessorChain", "Step {}: {}", step, processor.name());
            if step + 1 == active.len() {
                context.source_texture = Some(input.clone());
                context.render_target = final_target.clone();
                context.viewport = final_viewport;
                processor.process(context)?;
            } else {
                let output = temps[step % temps.len()].texture().clone();
                redirect(context, &input, &output);
                processor.process(context)?;
                input = output;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "post_processor_chain_tests.rs"]
mod tests;
