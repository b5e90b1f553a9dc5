/// Physically based bloom: downsample chain, additive upsample, composite.
///
/// Every stage draws the screen quad. Mip `i` of the chain is stored as
/// color attachment `i` of one framebuffer; commands select their target
/// through `DrawCommand::outputs`.

use std::sync::Arc;
use glam::{UVec2, Vec2};
use crate::config::BloomSettings;
use crate::error::Result;
use crate::graphics_device::{AttachmentDesc, AttachmentTarget, Framebuffer, FramebufferDesc, Texture, TextureFormat};
use crate::renderer::{
    AttachmentOutput, BlendingMode, CommandId, CullingMode, DepthTestingMode, DrawCall, DrawCommand,
    PrimitiveType, RenderPassKey, RenderPassSpecification, RendererContext, Viewport,
};
use crate::renderer::renderer_2d::{Renderer2D, SCREEN_VERTEX_COUNT};
use crate::{engine_bail, engine_debug, engine_warn};

const SOURCE: &str = "magma::Bloom";

/// One level of the chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomMip {
    pub size: Vec2,
    pub int_size: UVec2,
}

/// Successive halvings of `width` x `height`
///
/// Integer sizes halve the previous integer size (truncating), so level `n`
/// is `width >> (n + 1)`. Float sizes halve exactly.
pub fn mip_chain(width: u32, height: u32, length: u32) -> Vec<BloomMip> {
    let mut size = Vec2::new(width as f32, height as f32);
    let mut int_size = UVec2::new(width, height);

    (0..length)
        .map(|_| {
            size *= 0.5;
            int_size /= 2;
            BloomMip { size, int_size }
        })
        .collect()
}

fn viewport(size: UVec2) -> Viewport {
    Viewport { width: size.x.max(1), height: size.y.max(1) }
}

#[derive(Debug)]
pub struct Bloom {
    settings: BloomSettings,
    mips: Vec<BloomMip>,
    framebuffer: Arc<Framebuffer>,
    downsample_pass: RenderPassKey,
    upsample_pass: RenderPassKey,
    composite_pass: RenderPassKey,
}

impl Bloom {
    /// Allocate the mip framebuffer and the three passes; the composite
    /// writes into `output`
    pub fn create(ctx: &mut RendererContext, output: Arc<Framebuffer>, settings: BloomSettings) -> Result<Self> {
        if settings.mip_chain_length == 0 {
            engine_bail!(SOURCE, "Bloom needs at least one mip level");
        }

        let (width, height) = (ctx.config().viewport_width, ctx.config().viewport_height);
        let mips = mip_chain(width, height, settings.mip_chain_length);
        let desc = FramebufferDesc {
            name: "BloomMips".to_string(),
            width,
            height,
            attachments: mips.iter()
                .map(|mip| AttachmentDesc {
                    target: AttachmentTarget::Color,
                    format: TextureFormat::R11G11B10_UFLOAT,
                    width: mip.int_size.x,
                    height: mip.int_size.y,
                })
                .collect(),
        };
        let framebuffer = Arc::new(ctx.with_device(|device| Framebuffer::create(device, &desc))?);

        let screen = Renderer2D::screen_buffer(ctx);
        let downsample_pass = ctx.create_pass(
            RenderPassSpecification::graphics("Bloom-Downsample", Some(framebuffer.clone()), screen))?;
        let upsample_pass = ctx.create_pass(
            RenderPassSpecification::graphics("Bloom-Upsample", Some(framebuffer.clone()), screen))?;
        let composite_pass = ctx.create_pass(
            RenderPassSpecification::graphics("Bloom", Some(output), screen))?;

        engine_debug!(SOURCE, "Bloom chain of {} mips from {}x{}", mips.len(), width, height);

        Ok(Self {
            settings,
            mips,
            framebuffer,
            downsample_pass,
            upsample_pass,
            composite_pass,
        })
    }

    pub fn destroy(self, ctx: &mut RendererContext) {
        ctx.destroy_pass(self.downsample_pass);
        ctx.destroy_pass(self.upsample_pass);
        ctx.destroy_pass(self.composite_pass);
    }

    pub fn mips(&self) -> &[BloomMip] {
        &self.mips
    }

    pub fn framebuffer(&self) -> &Arc<Framebuffer> {
        &self.framebuffer
    }

    pub fn settings(&self) -> &BloomSettings {
        &self.settings
    }

    pub fn passes(&self) -> [RenderPassKey; 3] {
        [self.downsample_pass, self.upsample_pass, self.composite_pass]
    }

    /// Queue the three stages reading color 0 of `base_layer`
    pub fn record(&self, ctx: &mut RendererContext, base_layer: &Framebuffer) {
        let Some(base) = base_layer.attachment(AttachmentTarget::Color, 0).cloned() else {
            engine_warn!(SOURCE, "Framebuffer '{}' has no color attachment to bloom", base_layer.name());
            return;
        };

        // Downsample: base -> mip 0 -> mip 1 -> ... -> mip n-1
        ctx.start_pass(self.downsample_pass, false);
        for (index, mip) in self.mips.iter().enumerate() {
            let (source, resolution) = match index {
                0 => (Some(base.clone()), Vec2::new(base_layer.width() as f32, base_layer.height() as f32)),
                _ => (self.mip_texture(index - 1), self.mips[index - 1].size),
            };
            let id = ctx.push_command();
            let command = self.screen_command(ctx, id, mip.int_size, index);
            command.clear = index == 0;
            command.blending = BlendingMode::Off;
            command.uniforms.set("u_SrcResolution", resolution);
            if let Some(texture) = source {
                command.uniforms.set_texture("u_SrcTexture", 0, texture);
            }
        }
        ctx.end_pass();

        // Upsample: mip n-1 added into mip n-2, ..., mip 1 added into mip 0
        ctx.start_pass(self.upsample_pass, false);
        for index in (1..self.mips.len()).rev() {
            let target = &self.mips[index - 1];
            let source = self.mip_texture(index);
            let id = ctx.push_command();
            let command = self.screen_command(ctx, id, target.int_size, index - 1);
            command.blending = BlendingMode::Additive;
            command.uniforms.set("u_SrcResolution", self.mips[index].size);
            command.uniforms.set("u_FilterRadius", self.settings.filter_radius);
            if let Some(texture) = source {
                command.uniforms.set_texture("u_SrcTexture", 0, texture);
            }
        }
        ctx.end_pass();

        // Composite: scene + mip 0 into the output
        ctx.start_pass(self.composite_pass, false);
        let id = ctx.push_command();
        let full = UVec2::new(ctx.config().viewport_width, ctx.config().viewport_height);
        let bloom_texture = self.mip_texture(0);
        let command = ctx.draw_command_mut(id);
        command.clear = true;
        command.viewport = Some(viewport(full));
        command.depth_test = DepthTestingMode::Off;
        command.culling = CullingMode::Off;
        command.blending = BlendingMode::Greatest;
        command.uniforms.set("u_Exposure", self.settings.exposure);
        command.uniforms.set("u_BloomStrength", self.settings.strength);
        if let Some(texture) = bloom_texture {
            command.uniforms.set_texture("u_BloomTexture", 0, texture);
        }
        command.uniforms.set_texture("u_SceneTexture", 1, base);
        command.calls.push(DrawCall::single(PrimitiveType::Triangle, SCREEN_VERTEX_COUNT));
        ctx.end_pass();
    }

    fn mip_texture(&self, index: usize) -> Option<Arc<dyn Texture>> {
        self.framebuffer.attachment(AttachmentTarget::Color, index).cloned()
    }

    /// Shared state of a chain step writing into mip `output`
    fn screen_command<'a>(
        &self,
        ctx: &'a mut RendererContext,
        id: CommandId,
        size: UVec2,
        output: usize,
    ) -> &'a mut DrawCommand {
        let command = ctx.draw_command_mut(id);
        command.viewport = Some(viewport(size));
        command.depth_test = DepthTestingMode::Off;
        command.culling = CullingMode::Off;
        command.outputs = vec![AttachmentOutput { target: AttachmentTarget::Color, index: output }];
        command.calls.push(DrawCall::single(PrimitiveType::Triangle, SCREEN_VERTEX_COUNT));
        command
    }
}

#[cfg(test)]
#[path = "bloom_tests.rs"]
mod tests;
