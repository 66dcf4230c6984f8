use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::{CirclePrimitive, LinePrimitive, PathPrimitive, RectPrimitive, TextPrimitive};

/// The three independently rebuilt layers, in composite order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PictureLayer {
    Base,
    Indicator,
    Crosshair,
}

impl PictureLayer {
    pub const COMPOSITE_ORDER: [PictureLayer; 3] =
        [PictureLayer::Base, PictureLayer::Indicator, PictureLayer::Crosshair];
}

/// Axis-aligned clip applied to every following command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ClipRect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|value| value.is_finite());
        if !finite || self.width < 0.0 || self.height < 0.0 {
            return Err(ChartError::InvalidData(
                "clip rect must be finite with non-negative size".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clip(ClipRect),
    Line(LinePrimitive),
    Rect(RectPrimitive),
    Circle(CirclePrimitive),
    Path(PathPrimitive),
    Text(TextPrimitive),
}

impl DrawCommand {
    pub fn validate(&self) -> ChartResult<()> {
        match self {
            Self::Clip(clip) => clip.validate(),
            Self::Line(line) => line.validate(),
            Self::Rect(rect) => rect.validate(),
            Self::Circle(circle) => circle.validate(),
            Self::Path(path) => path.validate(),
            Self::Text(text) => text.validate(),
        }
    }
}

/// Immutable, already-recorded command list for one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl Picture {
    /// A picture that draws nothing.
    #[must_use]
    pub fn blank(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.count(|command| matches!(command, DrawCommand::Line(_)))
    }

    #[must_use]
    pub fn rect_count(&self) -> usize {
        self.count(|command| matches!(command, DrawCommand::Rect(_)))
    }

    #[must_use]
    pub fn circle_count(&self) -> usize {
        self.count(|command| matches!(command, DrawCommand::Circle(_)))
    }

    #[must_use]
    pub fn path_count(&self) -> usize {
        self.count(|command| matches!(command, DrawCommand::Path(_)))
    }

    #[must_use]
    pub fn text_count(&self) -> usize {
        self.count(|command| matches!(command, DrawCommand::Text(_)))
    }

    /// Text of every label in recording order.
    pub fn texts(&self) -> impl Iterator<Item = &TextPrimitive> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text(text) => Some(text),
            _ => None,
        })
    }

    fn count(&self, predicate: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|command| predicate(command)).count()
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.width.is_finite() || !self.height.is_finite() || self.width <= 0.0 || self.height <= 0.0 {
            return Err(ChartError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        for command in &self.commands {
            command.validate()?;
        }
        Ok(())
    }
}

/// Append-only recorder producing one [`Picture`].
#[derive(Debug)]
pub struct PictureRecorder {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl PictureRecorder {
    #[must_use]
    pub fn begin(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn clip_rect(&mut self, clip: ClipRect) {
        self.commands.push(DrawCommand::Clip(clip));
    }

    pub fn line(&mut self, line: LinePrimitive) {
        self.commands.push(DrawCommand::Line(line));
    }

    pub fn rect(&mut self, rect: RectPrimitive) {
        self.commands.push(DrawCommand::Rect(rect));
    }

    pub fn circle(&mut self, circle: CirclePrimitive) {
        self.commands.push(DrawCommand::Circle(circle));
    }

    /// Paths with fewer than two points are dropped.
    pub fn path(&mut self, path: PathPrimitive) {
        if path.points.len() >= 2 {
            self.commands.push(DrawCommand::Path(path));
        }
    }

    /// Empty labels are dropped.
    pub fn text(&mut self, text: TextPrimitive) {
        if !text.text.is_empty() {
            self.commands.push(DrawCommand::Text(text));
        }
    }

    #[must_use]
    pub fn finish(self) -> Picture {
        Picture {
            width: self.width,
            height: self.height,
            commands: self.commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Color, TextHAlign};

    #[test]
    fn recorder_keeps_command_order() {
        let mut recorder = PictureRecorder::begin(100.0, 50.0);
        recorder.clip_rect(ClipRect::new(0.0, 0.0, 100.0, 50.0));
        recorder.line(LinePrimitive::new(0.0, 0.0, 10.0, 10.0, 1.0, Color::WHITE));
        recorder.text(TextPrimitive::new("1", 0.0, 0.0, 11.0, Color::WHITE, TextHAlign::Left));
        let picture = recorder.finish();

        assert!(matches!(picture.commands()[0], DrawCommand::Clip(_)));
        assert_eq!(picture.line_count(), 1);
        assert_eq!(picture.text_count(), 1);
        assert!(picture.validate().is_ok());
    }

    #[test]
    fn degenerate_paths_and_labels_are_dropped() {
        let mut recorder = PictureRecorder::begin(10.0, 10.0);
        recorder.path(PathPrimitive::new(vec![(0.0, 0.0)], 1.0, Color::WHITE));
        recorder.text(TextPrimitive::new("", 0.0, 0.0, 11.0, Color::WHITE, TextHAlign::Left));
        assert!(recorder.finish().is_empty());
    }

    #[test]
    fn blank_picture_validates() {
        assert!(Picture::blank(10.0, 10.0).validate().is_ok());
        assert!(Picture::blank(0.0, 10.0).validate().is_err());
    }
}
