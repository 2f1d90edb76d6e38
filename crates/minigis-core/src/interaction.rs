//! Pointer-driven pan, zoom and selection for one map view.

use crate::clock::{Clock, Throttle};
use crate::config::ViewerConfig;
use crate::error::MapResult;
use crate::geometry::Coordinate;
use crate::input::{InputState, Modifiers, PointerEvent};
use crate::map::Map;
use crate::selection::{Selection, SelectionPolicy};

/// Turns pointer events into map operations.
pub struct MapInteraction {
    input: InputState,
    selection: Selection,
    policy: SelectionPolicy,
    move_throttle: Throttle,
    zoom_in_factor: f64,
    zoom_out_factor: f64,
    pan_clamp: f64,
    clock: Box<dyn Clock>,
}

impl MapInteraction {
    pub fn new(config: &ViewerConfig, clock: impl Clock + 'static) -> Self {
        Self {
            input: InputState::new(),
            selection: Selection::new(),
            policy: config.selection_policy(),
            move_throttle: Throttle::new(config.pointer_move_interval()),
            zoom_in_factor: config.zoom_in_factor,
            zoom_out_factor: config.zoom_out_factor,
            pan_clamp: config.pan_clamp,
            clock: Box::new(clock),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_dragging(&self) -> bool {
        self.input.is_dragging
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.set_modifiers(modifiers);
    }

    /// Apply one pointer event to the map.
    pub fn handle_pointer_event(&mut self, map: &mut Map, event: PointerEvent) -> MapResult<()> {
        match event {
            PointerEvent::Down { position, .. } => {
                self.input.handle_pointer_event(&event);
                self.selection
                    .pointer_down(map, position, self.input.modifiers, self.policy);
            }
            PointerEvent::Move { position } => {
                if !self.move_throttle.try_fire(self.clock.now()) {
                    return Ok(());
                }
                if let Some(delta) = self.input.take_drag_delta(position) {
                    let scale = map.scale();
                    let dx = (-delta.x / scale).clamp(-self.pan_clamp, self.pan_clamp);
                    let dy = (delta.y / scale).clamp(-self.pan_clamp, self.pan_clamp);
                    map.move_by(dx, dy);
                }
                self.input.handle_pointer_event(&event);
            }
            PointerEvent::Up { .. } => {
                self.input.handle_pointer_event(&event);
            }
            PointerEvent::Scroll { delta, .. } => {
                self.input.handle_pointer_event(&event);
                let factor = if delta.y < 0.0 {
                    self.zoom_in_factor
                } else {
                    self.zoom_out_factor
                };
                map.zoom(factor)?;
            }
        }
        Ok(())
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self, map: &mut Map) {
        self.selection.clear(map);
    }

    /// World position under the last known cursor position.
    pub fn cursor_world(&self, map: &Map) -> Coordinate {
        map.screen_to_world(self.input.pointer_position)
    }

    /// Status readout of cursor position and scale.
    pub fn status_line(&self, map: &Map) -> String {
        let world = self.cursor_world(map);
        format!("X: {:.4}\t\t Y: {:.4}\t\t Scale: {:.4}", world.x, world.y, map.scale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::geometry::Point;
    use crate::input::MouseButton;
    use crate::layer::Layer;
    use crate::style::{LayerStyle, PointStyle};
    use kurbo::Vec2;
    use std::time::Duration;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn setup() -> (Map, MapInteraction, ManualClock) {
        let clock = ManualClock::new();
        let interaction = MapInteraction::new(&ViewerConfig::default(), clock.clone());
        (Map::new(100.0, 100.0), interaction, clock)
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: c(x, y),
            button: MouseButton::Left,
        }
    }

    fn moved(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move { position: c(x, y) }
    }

    #[test]
    fn test_drag_pans_opposite_to_pointer() {
        let (mut map, mut interaction, clock) = setup();
        map.zoom(2.0).unwrap();
        interaction.handle_pointer_event(&mut map, down(50.0, 50.0)).unwrap();
        interaction.handle_pointer_event(&mut map, moved(54.0, 46.0)).unwrap();

        // 4 px right, 4 px up at 2 px/unit: center moves 2 left, 2 down.
        assert_eq!(map.center(), c(-2.0, -2.0));

        clock.advance(Duration::from_millis(16));
        interaction
            .handle_pointer_event(&mut map, PointerEvent::Up {
                position: c(54.0, 46.0),
                button: MouseButton::Left,
            })
            .unwrap();
        interaction.handle_pointer_event(&mut map, moved(80.0, 80.0)).unwrap();
        assert_eq!(map.center(), c(-2.0, -2.0));
        assert!(!interaction.is_dragging());
    }

    #[test]
    fn test_pan_is_clamped() {
        let (mut map, mut interaction, _) = setup();
        interaction.handle_pointer_event(&mut map, down(0.0, 0.0)).unwrap();
        interaction.handle_pointer_event(&mut map, moved(100.0, -100.0)).unwrap();
        assert_eq!(map.center(), c(-10.0, -10.0));
    }

    #[test]
    fn test_moves_are_throttled() {
        let (mut map, mut interaction, clock) = setup();
        interaction.handle_pointer_event(&mut map, down(50.0, 50.0)).unwrap();
        interaction.handle_pointer_event(&mut map, moved(51.0, 50.0)).unwrap();
        assert_eq!(map.center(), c(-1.0, 0.0));

        clock.advance(Duration::from_millis(5));
        interaction.handle_pointer_event(&mut map, moved(53.0, 50.0)).unwrap();
        assert_eq!(map.center(), c(-1.0, 0.0));

        // The skipped motion is picked up by the next handled move.
        clock.advance(Duration::from_millis(11));
        interaction.handle_pointer_event(&mut map, moved(54.0, 50.0)).unwrap();
        assert_eq!(map.center(), c(-4.0, 0.0));
    }

    #[test]
    fn test_scroll_zooms() {
        let (mut map, mut interaction, _) = setup();
        let scroll = |dy| PointerEvent::Scroll {
            position: c(0.0, 0.0),
            delta: Vec2::new(0.0, dy),
        };
        interaction.handle_pointer_event(&mut map, scroll(-1.0)).unwrap();
        assert!((map.scale() - 1.1).abs() < 1e-12);
        interaction.handle_pointer_event(&mut map, scroll(1.0)).unwrap();
        assert!((map.scale() - 0.99).abs() < 1e-12);
        interaction.handle_pointer_event(&mut map, scroll(0.0)).unwrap();
        assert!((map.scale() - 0.891).abs() < 1e-12);
    }

    #[test]
    fn test_ctrl_click_selects() {
        let (mut map, mut interaction, _) = setup();
        let mut layer = Layer::with_style(
            "points",
            LayerStyle {
                point: PointStyle {
                    size: 3.0,
                    ..PointStyle::default()
                },
                ..LayerStyle::default()
            },
        );
        layer.add_geometry(Point::new(c(0.0, 0.0)));
        map.add_layer(layer);

        interaction.handle_pointer_event(&mut map, down(50.0, 50.0)).unwrap();
        assert!(interaction.selection().is_empty());

        interaction.set_modifiers(Modifiers {
            ctrl: true,
            ..Modifiers::default()
        });
        interaction.handle_pointer_event(&mut map, down(50.0, 50.0)).unwrap();
        assert_eq!(interaction.selection().len(), 1);

        interaction.clear_selection(&mut map);
        assert!(map.selected().is_empty());
    }

    #[test]
    fn test_removed_geometry_leaves_selection() {
        let (mut map, mut interaction, _) = setup();
        let mut layer = Layer::new("points");
        layer.add_geometry(Point::new(c(0.0, 0.0)));
        layer.add_geometry(Point::new(c(0.0, 0.0)));
        let layer_id = map.add_layer(layer);

        interaction.set_modifiers(Modifiers {
            ctrl: true,
            shift: true,
            ..Modifiers::default()
        });
        interaction.handle_pointer_event(&mut map, down(50.0, 50.0)).unwrap();
        assert_eq!(interaction.selection().len(), 1);

        map.remove_geometry(layer_id, 1).unwrap();
        interaction.handle_pointer_event(&mut map, down(50.0, 50.0)).unwrap();
        assert_eq!(interaction.selection().len(), 1);
        assert_eq!(map.selected().len(), 1);
        assert_eq!(interaction.selection().items(), map.selected().as_slice());
    }

    #[test]
    fn test_status_line() {
        let (mut map, mut interaction, _) = setup();
        interaction.handle_pointer_event(&mut map, moved(60.0, 40.0)).unwrap();
        assert_eq!(
            interaction.status_line(&map),
            "X: 10.0000\t\t Y: 10.0000\t\t Scale: 1.0000"
        );
    }
}
