/// DrawBuffer - fixed-capacity GPU store for vertices, indices and instances
///
/// Counts track the high-water mark of written elements per region and
/// never exceed the capacity fixed at creation: a write past capacity is a
/// fatal contract violation, not a recoverable error.

use std::sync::Arc;
use crate::error::Result;
use crate::engine_fatal;
use crate::graphics_device::{Buffer, BufferDesc, BufferUsage, GraphicsDevice};
use crate::renderer::buffer_layout::BufferLayout;

slotmap::new_key_type! {
    /// Stable handle to a draw buffer registered in a `RendererContext`
    pub struct DrawBufferKey;
}

/// Region of a draw buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawBufferIndex {
    Vertices,
    Indices,
    Instances,
}

/// Byte size of one index
pub const INDEX_SIZE: u32 = std::mem::size_of::<u32>() as u32;

/// Creation parameters
#[derive(Debug, Clone)]
pub struct DrawBufferSpecification {
    pub name: String,
    pub vertex_layout: BufferLayout,
    pub instance_layout: Option<BufferLayout>,
    pub max_vertices: u32,
    pub max_indices: u32,
    pub max_instances: u32,
    /// Initial vertex contents for static buffers (counted as written)
    pub vertices: Option<Vec<u8>>,
}

#[derive(Debug)]
struct Region {
    buffer: Arc<dyn Buffer>,
    stride: u32,
    count: u32,
    max: u32,
}

/// GPU-resident draw buffer
#[derive(Debug)]
pub struct DrawBuffer {
    name: String,
    vertex_layout: BufferLayout,
    instance_layout: Option<BufferLayout>,
    vertices: Region,
    indices: Option<Region>,
    instances: Option<Region>,
}

impl DrawBuffer {
    pub fn create(device: &mut dyn GraphicsDevice, spec: DrawBufferSpecification) -> Result<Self> {
        let stride = spec.vertex_layout.stride();
        let initial_count = match &spec.vertices {
            Some(data) => {
                let count = data.len() as u32 / stride.max(1);
                if count > spec.max_vertices {
                    engine_fatal!("magma::DrawBuffer",
                        "'{}': initial data holds {} vertices, capacity is {}",
                        spec.name, count, spec.max_vertices);
                }
                count
            }
            None => 0,
        };

        let vertices = Region {
            buffer: device.create_buffer(BufferDesc {
                name: format!("{}.Vertices", spec.name),
                size: stride as u64 * spec.max_vertices as u64,
                usage: BufferUsage::Vertex,
                data: spec.vertices,
            })?,
            stride,
            count: initial_count,
            max: spec.max_vertices,
        };

        let indices = if spec.max_indices > 0 {
            Some(Region {
                buffer: device.create_buffer(BufferDesc {
                    name: format!("{}.Indices", spec.name),
                    size: INDEX_SIZE as u64 * spec.max_indices as u64,
                    usage: BufferUsage::Index,
                    data: None,
                })?,
                stride: INDEX_SIZE,
                count: 0,
                max: spec.max_indices,
            })
        } else {
            None
        };

        let instances = match &spec.instance_layout {
            Some(layout) if spec.max_instances > 0 => Some(Region {
                buffer: device.create_buffer(BufferDesc {
                    name: format!("{}.Instances", spec.name),
                    size: layout.stride() as u64 * spec.max_instances as u64,
                    usage: BufferUsage::Vertex,
                    data: None,
                })?,
                stride: layout.stride(),
                count: 0,
                max: spec.max_instances,
            }),
            _ => None,
        };

        Ok(Self {
            name: spec.name,
            vertex_layout: spec.vertex_layout,
            instance_layout: spec.instance_layout,
            vertices,
            indices,
            instances,
        })
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_layout(&self) -> &BufferLayout {
        &self.vertex_layout
    }

    pub fn instance_layout(&self) -> Option<&BufferLayout> {
        self.instance_layout.as_ref()
    }

    pub fn has_region(&self, index: DrawBufferIndex) -> bool {
        self.region(index).is_some()
    }

    /// Elements written so far (0 for a missing region)
    pub fn count(&self, index: DrawBufferIndex) -> u32 {
        self.region(index).map_or(0, |region| region.count)
    }

    /// Capacity (0 for a missing region)
    pub fn capacity(&self, index: DrawBufferIndex) -> u32 {
        self.region(index).map_or(0, |region| region.max)
    }

    pub fn gpu_buffer(&self, index: DrawBufferIndex) -> Option<&Arc<dyn Buffer>> {
        self.region(index).map(|region| &region.buffer)
    }

    // ===== WRITES =====

    /// Write `count` elements at element `offset`
    ///
    /// The region count becomes `max(count, offset + count)`.
    pub fn set_data(&mut self, index: DrawBufferIndex, data: &[u8], count: u32, offset: u32) -> Result<()> {
        let name = &self.name;
        let region = match Self::region_of(&mut self.vertices, &mut self.indices, &mut self.instances, index) {
            Some(region) => region,
            None => engine_fatal!("magma::DrawBuffer", "'{}' has no {:?} region", name, index),
        };

        let end = offset as u64 + count as u64;
        if end > region.max as u64 {
            engine_fatal!("magma::DrawBuffer",
                "'{}' {:?} overflow: writing [{}, {}) with capacity {}",
                name, index, offset, end, region.max);
        }
        let expected = count as usize * region.stride as usize;
        if data.len() != expected {
            engine_fatal!("magma::DrawBuffer",
                "'{}' {:?}: {} bytes supplied for {} elements of {} bytes",
                name, index, data.len(), count, region.stride);
        }

        region.buffer.update(offset as u64 * region.stride as u64, data)?;
        region.count = region.count.max(end as u32);
        Ok(())
    }

    /// Append `count` elements after the current count, returning their start offset
    pub fn append(&mut self, index: DrawBufferIndex, data: &[u8], count: u32) -> Result<u32> {
        let offset = self.count(index);
        self.set_data(index, data, count, offset)?;
        Ok(offset)
    }

    /// Reset a region count to zero (contents are left as is)
    pub fn clear(&mut self, index: DrawBufferIndex) {
        if let Some(region) = Self::region_of(&mut self.vertices, &mut self.indices, &mut self.instances, index) {
            region.count = 0;
        }
    }

    /// Reset every region
    pub fn clear_all(&mut self) {
        self.clear(DrawBufferIndex::Vertices);
        self.clear(DrawBufferIndex::Indices);
        self.clear(DrawBufferIndex::Instances);
    }

    fn region(&self, index: DrawBufferIndex) -> Option<&Region> {
        match index {
            DrawBufferIndex::Vertices => Some(&self.vertices),
            DrawBufferIndex::Indices => self.indices.as_ref(),
            DrawBufferIndex::Instances => self.instances.as_ref(),
        }
    }

    fn region_of<'a>(
        vertices: &'a mut Region,
        indices: &'a mut Option<Region>,
        instances: &'a mut Option<Region>,
        index: DrawBufferIndex,
    ) -> Option<&'a mut Region> {
        match index {
            DrawBufferIndex::Vertices => Some(vertices),
            DrawBufferIndex::Indices => indices.as_mut(),
            DrawBufferIndex::Instances => instances.as_mut(),
        }
    }
}

#[cfg(test)]
#[path = "draw_buffer_tests.rs"]
mod tests;
