/// Frame statistics exposed to diagnostics overlays

use std::time::Instant;
use crate::renderer::command::Command;

/// Per-frame snapshot, valid after `EndFrame`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameDebugInfo {
    pub fps: f32,
    pub draw_calls: u64,
    pub indices: u64,
    pub vertices: u64,
    pub instances: u64,
}

/// Running totals for the frame in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameCounters {
    pub draw_calls: u64,
    pub indices: u64,
    pub vertices: u64,
    pub instances: u64,
}

impl FrameCounters {
    /// Add every draw call of a submitted command list
    ///
    /// Vertex and index counts are per call, not multiplied by instances.
    pub fn record(&mut self, commands: &[Command]) {
        for command in commands.iter().filter_map(Command::as_draw) {
            for call in &command.calls {
                self.draw_calls += 1;
                self.indices += call.index_count as u64;
                self.vertices += call.vertex_count as u64;
                self.instances += call.drawn_instances() as u64;
            }
        }
    }
}

/// Frame timing plus the last snapshot
#[derive(Debug, Default)]
pub struct FrameData {
    pub(crate) last_begin: Option<Instant>,
    pub(crate) fps: f32,
    pub(crate) debug: FrameDebugInfo,
}

impl FrameData {
    /// Update FPS from the time elapsed since the previous frame began
    pub(crate) fn tick(&mut self, now: Instant) {
        if let Some(previous) = self.last_begin {
            let seconds = now.duration_since(previous).as_secs_f32();
            if seconds > 0.0 {
                self.fps = 1.0 / seconds;
            }
        }
        self.last_begin = Some(now);
    }

    pub(crate) fn capture(&mut self, counters: &FrameCounters) {
        self.debug = FrameDebugInfo {
            fps: self.fps,
            draw_calls: counters.draw_calls,
            indices: counters.indices,
            vertices: counters.vertices,
            instances: counters.instances,
        };
    }

    pub fn debug_info(&self) -> &FrameDebugInfo {
        &self.debug
    }
}
