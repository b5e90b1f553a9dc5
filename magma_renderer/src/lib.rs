/*!
# Magma Renderer

Rendering core of the Magma engine: frame, pass and command recording,
draw-call batching, and the editor and runtime scene renderers built on
top of them.

## Architecture

- **GraphicsDevice**: backend facade creating buffers, textures and pipelines
  and executing submitted commands
- **RendererContext**: frame lifecycle, pass and command stack, flush
- **Renderer2D / Renderer3D**: batched submission helpers over shared draw buffers
- **SceneRenderer**: per-frame pass orchestration (`EditorSceneRenderer`,
  `RuntimeSceneRenderer`)

Backends implement `GraphicsDevice`; the crate itself never touches a
native graphics API.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod graphics_device;
pub mod renderer;
pub mod resource;
pub mod camera;
pub mod scene;
pub mod utils;

// Main magma namespace module
pub mod magma {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging host
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::{
        BloomSettings, Config, LightSettings, ParticleSettings, RendererLimits, INSTANCES_PER_CALL,
    };

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // GPU facade
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Render sub-module with all rendering types
    pub mod render {
        pub use crate::renderer::*;
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    pub use crate::utils::TimeStep;
}

// Re-export math library at crate root
pub use glam;
