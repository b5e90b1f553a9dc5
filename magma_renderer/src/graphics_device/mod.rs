/// Graphics device module - the GPU resource facade the renderer talks to

pub mod graphics_device;
pub mod buffer;
pub mod texture;
pub mod pipeline;
pub mod frame_buffer;

pub use graphics_device::*;
pub use buffer::*;
pub use texture::*;
pub use pipeline::*;
pub use frame_buffer::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
