/// Structured GPU buffer (UBO or SSBO).
///
/// Wraps a device buffer with the field layout of one element, so scene
/// renderers can write whole records (lights, particles, free-list slots)
/// by index without computing offsets by hand.
///
/// - BufferKind: Uniform (std140) or Storage (std430)
/// - Fields: ordered named typed fields
/// - Count: number of elements (array of structures)

use std::sync::Arc;
use bytemuck::Pod;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::error::Result;
use crate::graphics_device::{self, Buffer as DeviceBuffer, GraphicsDevice};
use crate::{engine_bail, engine_err};

// ===== BUFFER KIND =====

/// Uniform (UBO) or Storage (SSBO)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Uniform,
    Storage,
}

// ===== FIELD TYPE =====

/// Data type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Float,
    Vec2,
    Vec4,
    Mat4,
    Int,
    UInt,
}

impl FieldType {
    pub fn size_bytes(&self) -> u64 {
        match self {
            FieldType::Float => 4,
            FieldType::Vec2 => 8,
            FieldType::Vec4 => 16,
            FieldType::Mat4 => 64,
            FieldType::Int => 4,
            FieldType::UInt => 4,
        }
    }

    pub fn alignment(&self) -> u64 {
        match self {
            FieldType::Float => 4,
            FieldType::Vec2 => 8,
            FieldType::Vec4 => 16,
            FieldType::Mat4 => 16,
            FieldType::Int => 4,
            FieldType::UInt => 4,
        }
    }
}

// ===== FIELD DESC =====

#[derive(Debug, Clone)]
pub struct FieldDesc {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDesc {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self { name: name.to_string(), field_type }
    }
}

// ===== BUFFER DESC =====

#[derive(Debug, Clone)]
pub struct BufferDesc {
    pub name: String,
    pub kind: BufferKind,
    pub fields: Vec<FieldDesc>,
    pub count: u32,
}

// ===== BUFFER =====

#[derive(Debug)]
pub struct Buffer {
    device_buffer: Arc<dyn DeviceBuffer>,
    kind: BufferKind,
    fields: Vec<FieldDesc>,
    field_names: FxHashMap<String, usize>,
    field_offsets: Vec<u64>,
    stride: u64,
    count: u32,
    size: u64,
}

impl Buffer {
    pub fn create(device: &mut dyn GraphicsDevice, desc: BufferDesc) -> Result<Self> {
        // ========== VALIDATION ==========
        if desc.fields.is_empty() {
            engine_bail!("magma::Buffer", "Buffer '{}' must have at least one field", desc.name);
        }
        if desc.count == 0 {
            engine_bail!("magma::Buffer", "Buffer '{}' must have at least one element", desc.name);
        }

        let mut seen = FxHashSet::default();
        for field in &desc.fields {
            if !seen.insert(field.name.as_str()) {
                engine_bail!("magma::Buffer", "Duplicate field name '{}'", field.name);
            }
        }

        // ========== COMPUTE LAYOUT ==========
        let mut field_offsets = Vec::with_capacity(desc.fields.len());
        let mut field_names = FxHashMap::default();
        let mut current_offset: u64 = 0;

        for (index, field) in desc.fields.iter().enumerate() {
            let align = field.field_type.alignment();
            current_offset = (current_offset + align - 1) & !(align - 1);
            field_offsets.push(current_offset);
            field_names.insert(field.name.clone(), index);
            current_offset += field.field_type.size_bytes();
        }

        // std140 rounds struct alignment up to 16, std430 keeps the natural one
        let max_field_align = desc.fields.iter()
            .map(|field| field.field_type.alignment())
            .max()
            .unwrap_or(4);
        let struct_align = match desc.kind {
            BufferKind::Uniform => max_field_align.max(16),
            BufferKind::Storage => max_field_align,
        };

        let stride = (current_offset + struct_align - 1) & !(struct_align - 1);
        let size = stride * desc.count as u64;

        // ========== CREATE GPU BUFFER ==========
        let usage = match desc.kind {
            BufferKind::Uniform => graphics_device::BufferUsage::Uniform,
            BufferKind::Storage => graphics_device::BufferUsage::Storage,
        };
        let device_buffer = device.create_buffer(graphics_device::BufferDesc {
            name: desc.name,
            size,
            usage,
            data: None,
        })?;

        Ok(Self {
            device_buffer,
            kind: desc.kind,
            fields: desc.fields,
            field_names,
            field_offsets,
            stride,
            count: desc.count,
            size,
        })
    }

    // ===== ACCESSORS =====

    pub fn kind(&self) -> BufferKind { self.kind }

    /// Size of one element in bytes (aligned)
    pub fn stride(&self) -> u64 { self.stride }

    pub fn count(&self) -> u32 { self.count }

    pub fn size(&self) -> u64 { self.size }

    pub fn fields(&self) -> &[FieldDesc] { &self.fields }

    /// Device buffer to bind on a command
    pub fn device_buffer(&self) -> &Arc<dyn DeviceBuffer> { &self.device_buffer }

    pub fn field_id(&self, name: &str) -> Option<usize> {
        self.field_names.get(name).copied()
    }

    pub fn field_offset(&self, field_index: usize) -> Option<u64> {
        self.field_offsets.get(field_index).copied()
    }

    // ===== UPDATES =====

    /// Write a whole element at `index`
    pub fn update_element(&self, index: u32, data: &[u8]) -> Result<()> {
        if index >= self.count {
            engine_bail!("magma::Buffer",
                "Element index {} out of bounds (count: {})", index, self.count);
        }
        if data.len() as u64 > self.stride {
            engine_bail!("magma::Buffer",
                "Data size {} exceeds stride {}", data.len(), self.stride);
        }
        self.device_buffer.update(self.stride * index as u64, data)
    }

    /// Write one field of the element at `index`
    pub fn update_field(&self, index: u32, field_index: usize, data: &[u8]) -> Result<()> {
        if index >= self.count {
            engine_bail!("magma::Buffer",
                "Element index {} out of bounds (count: {})", index, self.count);
        }
        let field_offset = self.field_offsets.get(field_index)
            .ok_or_else(|| engine_err!("magma::Buffer", "Field index {} out of bounds", field_index))?;
        let field_size = self.fields[field_index].field_type.size_bytes();
        if data.len() as u64 != field_size {
            engine_bail!("magma::Buffer",
                "Data size {} doesn't match field size {}", data.len(), field_size);
        }
        self.device_buffer.update(self.stride * index as u64 + field_offset, data)
    }

    /// Write raw bytes at an arbitrary offset
    pub fn update_raw(&self, offset: u64, data: &[u8]) -> Result<()> {
        if offset + data.len() as u64 > self.size {
            engine_bail!("magma::Buffer",
                "Write at offset {} with size {} exceeds buffer size {}",
                offset, data.len(), self.size);
        }
        self.device_buffer.update(offset, data)
    }

    /// Write a typed record at `index`; `T` must match the element layout
    pub fn write<T: Pod>(&self, index: u32, value: &T) -> Result<()> {
        self.update_element(index, bytemuck::bytes_of(value))
    }

    /// Write consecutive records starting at `first`
    pub fn write_slice<T: Pod>(&self, first: u32, values: &[T]) -> Result<()> {
        if std::mem::size_of::<T>() as u64 != self.stride {
            engine_bail!("magma::Buffer",
                "Record size {} doesn't match stride {}", std::mem::size_of::<T>(), self.stride);
        }
        if first as u64 + values.len() as u64 > self.count as u64 {
            engine_bail!("magma::Buffer",
                "Writing {} records at {} exceeds count {}", values.len(), first, self.count);
        }
        self.device_buffer.update(self.stride * first as u64, bytemuck::cast_slice(values))
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
