//! Pointer input types and per-view pointer state.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Buttons a pointer can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    Scroll {
        position: Point,
        delta: Vec2,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Scroll { position, .. } => *position,
        }
    }
}

/// Tracks pointer position, modifiers and drag state across events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last seen pointer position, in pixels.
    pub pointer_position: Point,
    pub modifiers: Modifiers,
    /// Set between a button press and its release.
    pub is_dragging: bool,
    /// Last pointer position seen while dragging.
    pub drag_anchor: Option<Point>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the tracked state from one event.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down { position, .. } => {
                self.pointer_position = position;
                if !self.is_dragging {
                    self.is_dragging = true;
                    self.drag_anchor = Some(position);
                }
            }
            PointerEvent::Up { position, .. } => {
                self.pointer_position = position;
                self.is_dragging = false;
                self.drag_anchor = None;
            }
            PointerEvent::Move { position } | PointerEvent::Scroll { position, .. } => {
                self.pointer_position = position;
            }
        }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Screen delta from the drag anchor to `position`, moving the anchor there.
    pub fn take_drag_delta(&mut self, position: Point) -> Option<Vec2> {
        let anchor = self.drag_anchor.as_mut()?;
        let delta = position - *anchor;
        *anchor = position;
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release_toggle_drag() {
        let mut state = InputState::new();
        state.handle_pointer_event(&PointerEvent::Down {
            position: Point::new(40.0, 30.0),
            button: MouseButton::Left,
        });
        assert!(state.is_dragging);

        state.handle_pointer_event(&PointerEvent::Up {
            position: Point::new(40.0, 30.0),
            button: MouseButton::Left,
        });
        assert!(!state.is_dragging);
        assert!(state.drag_anchor.is_none());
    }

    #[test]
    fn test_drag_delta_advances_anchor() {
        let mut state = InputState::new();
        state.handle_pointer_event(&PointerEvent::Down {
            position: Point::new(40.0, 30.0),
            button: MouseButton::Left,
        });

        let delta = state.take_drag_delta(Point::new(90.0, 50.0)).unwrap();
        assert!((delta.x - 50.0).abs() < f64::EPSILON);
        assert!((delta.y - 20.0).abs() < f64::EPSILON);

        let delta = state.take_drag_delta(Point::new(90.0, 55.0)).unwrap();
        assert!(delta.x.abs() < f64::EPSILON);
        assert!((delta.y - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_drag_delta_when_idle() {
        let mut state = InputState::new();
        assert!(state.take_drag_delta(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_command_modifier() {
        assert!(Modifiers { ctrl: true, ..Modifiers::default() }.command());
        assert!(Modifiers { meta: true, ..Modifiers::default() }.command());
        assert!(!Modifiers { shift: true, ..Modifiers::default() }.command());
    }

    #[test]
    fn test_event_position() {
        let event = PointerEvent::Scroll {
            position: Point::new(3.0, 4.0),
            delta: Vec2::new(0.0, -1.0),
        };
        assert_eq!(event.position(), Point::new(3.0, 4.0));
    }
}
