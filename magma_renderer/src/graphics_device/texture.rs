/// Texture trait, texture descriptor, and texture info

use std::fmt;
use bitflags::bitflags;

/// Pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    R16G16B16A16_SFLOAT,
    R11G11B10_UFLOAT,
    D24_UNORM_S8_UINT,
}

impl TextureFormat {
    /// True for depth/stencil formats
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::D24_UNORM_S8_UINT)
    }
}

/// Texture dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Texture2D,
    /// Six square faces
    Cubemap,
}

bitflags! {
    /// Texture usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Can be sampled in shaders
        const SAMPLED = 1 << 0;
        /// Can be a color attachment
        const RENDER_TARGET = 1 << 1;
        /// Can be a depth/stencil attachment
        const DEPTH_STENCIL = 1 << 2;
    }
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub kind: TextureKind,
    pub usage: TextureUsage,
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub kind: TextureKind,
    pub usage: TextureUsage,
}

impl From<&TextureDesc> for TextureInfo {
    fn from(desc: &TextureDesc) -> Self {
        Self {
            width: desc.width,
            height: desc.height,
            format: desc.format,
            kind: desc.kind,
            usage: desc.usage,
        }
    }
}

// ===== TEXTURE TRAIT =====

/// Texture resource trait
///
/// Implemented by the backend. Scene assets (diffuse maps, cubemaps, editor
/// icons) arrive already loaded as `Arc<dyn Texture>`.
pub trait Texture: Send + Sync + fmt::Debug {
    fn info(&self) -> &TextureInfo;
}
