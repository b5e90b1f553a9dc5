/// Framebuffer - groups the render target textures a pass writes into
///
/// Created once and reused every frame. A pass with no framebuffer renders
/// to the default (screen) target.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{GraphicsDevice, Texture, TextureDesc, TextureFormat, TextureKind, TextureUsage};

/// Attachment slot of a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentTarget {
    /// Color attachments (a framebuffer may hold several, e.g. a bloom mip chain)
    Color,
    Depth,
}

/// One attachment to allocate
#[derive(Debug, Clone)]
pub struct AttachmentDesc {
    pub target: AttachmentTarget,
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
}

/// Descriptor for creating a framebuffer
#[derive(Debug, Clone)]
pub struct FramebufferDesc {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub attachments: Vec<AttachmentDesc>,
}

impl FramebufferDesc {
    /// Color (RGBA16F) + depth attachments at the framebuffer size
    pub fn color_depth(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            attachments: vec![
                AttachmentDesc {
                    target: AttachmentTarget::Color,
                    format: TextureFormat::R16G16B16A16_SFLOAT,
                    width,
                    height,
                },
                AttachmentDesc {
                    target: AttachmentTarget::Depth,
                    format: TextureFormat::D24_UNORM_S8_UINT,
                    width,
                    height,
                },
            ],
        }
    }
}

/// Framebuffer: attachments grouped by target, in creation order
#[derive(Debug)]
pub struct Framebuffer {
    name: String,
    width: u32,
    height: u32,
    attachments: FxHashMap<AttachmentTarget, Vec<Arc<dyn Texture>>>,
}

impl Framebuffer {
    /// Allocate every attachment through the device
    pub fn create(device: &mut dyn GraphicsDevice, desc: &FramebufferDesc) -> Result<Self> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!("magma::Framebuffer",
                "Framebuffer '{}' has zero size {}x{}", desc.name, desc.width, desc.height);
        }

        let mut attachments: FxHashMap<AttachmentTarget, Vec<Arc<dyn Texture>>> = FxHashMap::default();
        for (index, attachment) in desc.attachments.iter().enumerate() {
            let usage = match attachment.target {
                AttachmentTarget::Color => TextureUsage::SAMPLED | TextureUsage::RENDER_TARGET,
                AttachmentTarget::Depth => TextureUsage::SAMPLED | TextureUsage::DEPTH_STENCIL,
            };
            let texture = device.create_texture(TextureDesc {
                name: format!("{}[{}]", desc.name, index),
                width: attachment.width.max(1),
                height: attachment.height.max(1),
                format: attachment.format,
                kind: TextureKind::Texture2D,
                usage,
            })?;
            attachments.entry(attachment.target).or_default().push(texture);
        }

        Ok(Self {
            name: desc.name.clone(),
            width: desc.width,
            height: desc.height,
            attachments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn has_attachment(&self, target: AttachmentTarget) -> bool {
        self.attachments.get(&target).is_some_and(|list| !list.is_empty())
    }

    /// Number of attachments bound to `target`
    pub fn attachment_count(&self, target: AttachmentTarget) -> usize {
        self.attachments.get(&target).map_or(0, Vec::len)
    }

    pub fn attachment(&self, target: AttachmentTarget, index: usize) -> Option<&Arc<dyn Texture>> {
        self.attachments.get(&target).and_then(|list| list.get(index))
    }
}
