/// Buffer trait and buffer descriptor

use std::fmt;
use crate::error::Result;

/// Buffer usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Vertex or per-instance attribute storage
    Vertex,
    /// Index storage (u32 indices)
    Index,
    /// Uniform buffer (std140)
    Uniform,
    /// Storage buffer (std430)
    Storage,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Debug name shown by backends and tools
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub usage: BufferUsage,
    /// Optional initial contents (static geometry)
    pub data: Option<Vec<u8>>,
}

/// Buffer resource trait
///
/// Implemented by the backend. The buffer is destroyed when the last
/// reference is dropped.
pub trait Buffer: Send + Sync + fmt::Debug {
    /// Write `data` at byte `offset`
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Size in bytes
    fn size(&self) -> u64;
}
