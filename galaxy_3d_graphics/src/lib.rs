/*!
# Galaxy 3D Graphics

Scene graph and post-processing layer of the Galaxy 3D engine.

The crate is backend-agnostic: GPU work goes through the `GraphicsDevice`
trait, implemented by a backend (or by the recording mock in tests).

## Architecture

- **SceneGraph**: arena of nodes with lazy world-pose/scale propagation,
  cached bounding boxes, subtree cloning and scene-changed events
- **Scene / SceneManager**: graph plus root node, per-frame query cache and
  view-dependent data, stored by name
- **Queries**: shadow casters and camera-frustum visibility with distance
  culling and LOD resolution
- **RenderContext**: per-frame state shared by queries and filters
- **PostProcessor**: image filters chained through pooled render targets
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod math;
pub mod graphics_device;
pub mod resource;
pub mod camera;
pub mod scene;
pub mod render;
pub mod post_process;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging entry point
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    pub use crate::config::{GraphicsConfig, HardwareFiltering};

    pub mod math {
        pub use crate::math::*;
    }

    pub mod graphics_device {
        pub use crate::graphics_device::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod render {
        pub use crate::render::*;
    }

    pub mod post_process {
        pub use crate::post_process::*;
    }
}

// Re-export math library at crate root
pub use glam;
