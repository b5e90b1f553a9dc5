/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Buffers keep a CPU copy of their contents so tests can read back what
/// the renderer wrote. Every submission is cloned and recorded.

use std::sync::{Arc, Mutex};
use bytemuck::Pod;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    Buffer, BufferDesc, BufferUsage, GraphicsDevice, Pipeline, PipelineDesc, PipelineKind,
    Submission, Texture, TextureDesc, TextureFormat, TextureInfo, TextureKind, TextureUsage,
};
use crate::config::{Config, RendererLimits};
use crate::renderer::{Command, RendererContext};

// ============================================================================
// Mock Buffer
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub name: String,
    pub usage: BufferUsage,
    contents: Mutex<Vec<u8>>,
}

impl MockBuffer {
    pub fn new(name: &str, size: u64, usage: BufferUsage) -> Self {
        Self {
            name: name.to_string(),
            usage,
            contents: Mutex::new(vec![0; size as usize]),
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        self.contents.lock().unwrap().clone()
    }

    /// Read a `T` at byte offset
    pub fn read<T: Pod>(&self, offset: usize) -> T {
        let contents = self.contents.lock().unwrap();
        bytemuck::pod_read_unaligned(&contents[offset..offset + std::mem::size_of::<T>()])
    }
}

impl Buffer for MockBuffer {
    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let mut contents = self.contents.lock().unwrap();
        let start = offset as usize;
        let end = start + data.len();
        if end > contents.len() {
            engine_bail!("magma::MockBuffer",
                "Write [{}, {}) past end of '{}' ({} bytes)", start, end, self.name, contents.len());
        }
        contents[start..end].copy_from_slice(data);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.contents.lock().unwrap().len() as u64
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub name: String,
    pub info: TextureInfo,
}

impl MockTexture {
    pub fn new(name: &str, width: u32, height: u32, kind: TextureKind) -> Self {
        Self {
            name: name.to_string(),
            info: TextureInfo {
                width,
                height,
                format: TextureFormat::R8G8B8A8_UNORM,
                kind,
                usage: TextureUsage::SAMPLED,
            },
        }
    }
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

/// Sampled 2D texture standing in for a loaded asset
pub fn mock_texture(name: &str) -> Arc<dyn Texture> {
    Arc::new(MockTexture::new(name, 64, 64, TextureKind::Texture2D))
}

// ============================================================================
// Mock Pipeline
// ============================================================================

#[derive(Debug)]
pub struct MockPipeline {
    pub name: String,
    pub kind: PipelineKind,
}

impl Pipeline for MockPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PipelineKind {
        self.kind
    }
}

// ============================================================================
// Mock Graphics Device
// ============================================================================

#[derive(Default)]
pub struct MockGraphicsDevice {
    pub buffers: Vec<Arc<MockBuffer>>,
    pub textures: Vec<TextureDesc>,
    pub pipelines: Vec<String>,
    /// One entry per `submit` call
    pub submissions: Vec<Vec<Command>>,
    pub wait_idle_calls: usize,
    /// Makes the next `create_buffer` fail with OutOfMemory
    pub fail_next_buffer: bool,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle as the renderer expects it, plus a typed handle for assertions
    pub fn shared() -> (Arc<Mutex<MockGraphicsDevice>>, Arc<Mutex<dyn GraphicsDevice>>) {
        let device = Arc::new(Mutex::new(MockGraphicsDevice::new()));
        let as_dyn: Arc<Mutex<dyn GraphicsDevice>> = device.clone();
        (device, as_dyn)
    }

    /// Most recently created buffer with that name
    pub fn buffer(&self, name: &str) -> Option<Arc<MockBuffer>> {
        self.buffers.iter().rev().find(|buffer| buffer.name == name).cloned()
    }

    /// Commands of the most recent submission
    pub fn last_submission(&self) -> &[Command] {
        self.submissions.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        if self.fail_next_buffer {
            self.fail_next_buffer = false;
            return Err(crate::error::Error::OutOfMemory);
        }
        let buffer = Arc::new(MockBuffer::new(&desc.name, desc.size, desc.usage));
        if let Some(data) = &desc.data {
            buffer.update(0, data)?;
        }
        self.buffers.push(buffer.clone());
        Ok(buffer)
    }

    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        let texture = Arc::new(MockTexture {
            name: desc.name.clone(),
            info: TextureInfo::from(&desc),
        });
        self.textures.push(desc);
        Ok(texture)
    }

    fn create_pipeline(&mut self, desc: PipelineDesc) -> Result<Arc<dyn Pipeline>> {
        self.pipelines.push(desc.name.clone());
        Ok(Arc::new(MockPipeline { name: desc.name, kind: desc.kind }))
    }

    fn submit(&mut self, submission: &Submission<'_>) -> Result<()> {
        self.submissions.push(submission.commands.to_vec());
        Ok(())
    }

    fn wait_idle(&mut self) -> Result<()> {
        self.wait_idle_calls += 1;
        Ok(())
    }
}

// ============================================================================
// Context helpers
// ============================================================================

/// Small capacities so every test context stays a few megabytes
pub fn test_config() -> Config {
    Config {
        limits: RendererLimits {
            line_max_indices: 4_000,
            line_max_vertices: 4_000,
            ..RendererLimits::from_max_triangles(10_000)
        },
        viewport_width: 320,
        viewport_height: 180,
        ..Config::default()
    }
}

/// Initialized context over a fresh mock device
pub fn test_context() -> (Arc<Mutex<MockGraphicsDevice>>, RendererContext) {
    test_context_with(test_config())
}

pub fn test_context_with(config: Config) -> (Arc<Mutex<MockGraphicsDevice>>, RendererContext) {
    let (device, shared) = MockGraphicsDevice::shared();
    let mut ctx = RendererContext::new(shared, config);
    ctx.init().unwrap();
    (device, ctx)
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
