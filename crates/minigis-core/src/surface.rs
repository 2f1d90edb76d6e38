//! Drawing surface abstraction.
//!
//! Geometries draw through [`Surface`], a small stateful 2D API with
//! save/restore of paint state, in the spirit of an HTML canvas context.
//! [`DisplayList`] records the command stream; the render loop uses it as the
//! off-screen buffer and replays it onto the visible surface.

use crate::style::Rgba;
use kurbo::{BezPath, Point};
use peniko::Fill;

/// A 2D drawing target.
pub trait Surface {
    /// Push a copy of the current paint state.
    fn save(&mut self);

    /// Pop the most recently saved paint state. No-op when nothing is saved.
    fn restore(&mut self);

    /// Set stroke color and line width (screen pixels).
    fn set_stroke(&mut self, color: Rgba, width: f64);

    /// Set fill color.
    fn set_fill(&mut self, color: Rgba);

    /// Set the dash array (screen pixels). Empty means solid.
    fn set_dash(&mut self, pattern: &[f64]);

    /// Set font family and size (pixels).
    fn set_font(&mut self, family: &str, size: f64);

    /// Stroke a screen-space path with the current stroke state.
    fn stroke_path(&mut self, path: &BezPath);

    /// Fill a screen-space path with the current fill color.
    fn fill_path(&mut self, path: &BezPath, rule: Fill);

    /// Draw text centered on `anchor` with the current font and fill color.
    fn fill_text(&mut self, text: &str, anchor: Point);

    /// Erase everything drawn so far.
    fn clear(&mut self);
}

/// Paint state affected by the `set_*` calls.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintState {
    pub stroke_color: Rgba,
    pub line_width: f64,
    pub fill_color: Rgba,
    pub dash: Vec<f64>,
    pub font_family: String,
    pub font_size: f64,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            stroke_color: Rgba::black(),
            line_width: 1.0,
            fill_color: Rgba::black(),
            dash: Vec::new(),
            font_family: "sans-serif".to_string(),
            font_size: 10.0,
        }
    }
}

/// Current paint state plus the save stack.
#[derive(Debug, Clone, Default)]
pub struct PaintStack {
    current: PaintState,
    saved: Vec<PaintState>,
}

impl PaintStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &PaintState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut PaintState {
        &mut self.current
    }

    /// Number of unmatched saves.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }

    /// Drop all saved states and return to defaults.
    pub fn reset(&mut self) {
        self.current = PaintState::default();
        self.saved.clear();
    }
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    SetStroke { color: Rgba, width: f64 },
    SetFill(Rgba),
    SetDash(Vec<f64>),
    SetFont { family: String, size: f64 },
    Stroke(BezPath),
    Fill(BezPath, Fill),
    Text { text: String, anchor: Point },
}

/// A surface that records every call for later replay.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
    paint: PaintStack,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands in call order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Paint state as it stands after the recorded commands.
    pub fn paint_state(&self) -> &PaintState {
        self.paint.current()
    }

    /// Number of saves not yet matched by a restore.
    pub fn save_depth(&self) -> usize {
        self.paint.depth()
    }

    /// Number of recorded draw operations (strokes, fills and text).
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke(_) | DrawCommand::Fill(..) | DrawCommand::Text { .. }))
            .count()
    }

    /// Replay the recorded commands onto another surface.
    pub fn replay(&self, target: &mut dyn Surface) {
        for command in &self.commands {
            match command {
                DrawCommand::Save => target.save(),
                DrawCommand::Restore => target.restore(),
                DrawCommand::SetStroke { color, width } => target.set_stroke(*color, *width),
                DrawCommand::SetFill(color) => target.set_fill(*color),
                DrawCommand::SetDash(pattern) => target.set_dash(pattern),
                DrawCommand::SetFont { family, size } => target.set_font(family, *size),
                DrawCommand::Stroke(path) => target.stroke_path(path),
                DrawCommand::Fill(path, rule) => target.fill_path(path, *rule),
                DrawCommand::Text { text, anchor } => target.fill_text(text, *anchor),
            }
        }
    }
}

impl Surface for DisplayList {
    fn save(&mut self) {
        self.paint.save();
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.paint.restore();
        self.commands.push(DrawCommand::Restore);
    }

    fn set_stroke(&mut self, color: Rgba, width: f64) {
        let state = self.paint.current_mut();
        state.stroke_color = color;
        state.line_width = width;
        self.commands.push(DrawCommand::SetStroke { color, width });
    }

    fn set_fill(&mut self, color: Rgba) {
        self.paint.current_mut().fill_color = color;
        self.commands.push(DrawCommand::SetFill(color));
    }

    fn set_dash(&mut self, pattern: &[f64]) {
        self.paint.current_mut().dash = pattern.to_vec();
        self.commands.push(DrawCommand::SetDash(pattern.to_vec()));
    }

    fn set_font(&mut self, family: &str, size: f64) {
        let state = self.paint.current_mut();
        state.font_family = family.to_string();
        state.font_size = size;
        self.commands.push(DrawCommand::SetFont {
            family: family.to_string(),
            size,
        });
    }

    fn stroke_path(&mut self, path: &BezPath) {
        self.commands.push(DrawCommand::Stroke(path.clone()));
    }

    fn fill_path(&mut self, path: &BezPath, rule: Fill) {
        self.commands.push(DrawCommand::Fill(path.clone(), rule));
    }

    fn fill_text(&mut self, text: &str, anchor: Point) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            anchor,
        });
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.paint.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_restore_paint_state() {
        let mut list = DisplayList::new();
        list.set_stroke(Rgba::black(), 1.0);
        list.save();
        list.set_stroke(Rgba::white(), 4.0);
        list.set_dash(&[2.0, 2.0]);
        assert!((list.paint_state().line_width - 4.0).abs() < f64::EPSILON);
        list.restore();
        assert!((list.paint_state().line_width - 1.0).abs() < f64::EPSILON);
        assert!(list.paint_state().dash.is_empty());
        assert_eq!(list.save_depth(), 0);
    }

    #[test]
    fn test_restore_without_save_is_noop() {
        let mut list = DisplayList::new();
        list.set_fill(Rgba::white());
        list.restore();
        assert_eq!(list.paint_state().fill_color, Rgba::white());
    }

    #[test]
    fn test_replay_reproduces_commands() {
        let mut source = DisplayList::new();
        source.save();
        source.set_fill(Rgba::white());
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        source.fill_path(&path, Fill::NonZero);
        source.fill_text("label", Point::new(5.0, 5.0));
        source.restore();

        let mut target = DisplayList::new();
        source.replay(&mut target);
        assert_eq!(target.commands(), source.commands());
        assert_eq!(target.draw_count(), 2);
    }

    #[test]
    fn test_clear_drops_commands() {
        let mut list = DisplayList::new();
        list.save();
        list.fill_text("x", Point::ZERO);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.save_depth(), 0);
    }
}
