/// Renderer module - frame, pass and command recording plus the 2D/3D helpers

pub mod buffer_layout;
pub mod draw_buffer;
pub mod uniform;
pub mod command;
pub mod render_pass;
pub mod frame;
pub mod context;
pub mod renderer_2d;
pub mod renderer_3d;

pub use buffer_layout::*;
pub use draw_buffer::*;
pub use uniform::*;
pub use command::*;
pub use render_pass::*;
pub use frame::{FrameCounters, FrameDebugInfo};
pub use context::RendererContext;
pub use renderer_2d::Renderer2D;
pub use renderer_3d::{Renderer3D, SubMeshKey};
