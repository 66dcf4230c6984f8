use crate::error::ChartResult;
use crate::render::{CompositeFrame, Renderer};

/// No-op renderer used by tests and headless engine usage.
///
/// It still validates every picture so tests catch invalid geometry before a
/// real backend sees it.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub last_command_count: usize,
    pub last_line_count: usize,
    pub last_text_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &CompositeFrame) -> ChartResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_command_count = frame.command_count();
        self.last_line_count = frame.layers().map(|(_, p)| p.line_count()).sum();
        self.last_text_count = frame.layers().map(|(_, p)| p.text_count()).sum();
        Ok(())
    }
}
