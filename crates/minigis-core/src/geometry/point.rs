//! Point geometry.

use super::{Coordinate, GeometryId, GeometryKind, GeometryTrait, layer_value};
use crate::layer::LayerId;
use crate::style::PointStyle;
use crate::surface::Surface;
use crate::viewport::ViewTransform;
use kurbo::{Circle, Rect, Shape as _};
use peniko::Fill;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// A single location drawn as a filled marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub(crate) id: GeometryId,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub style: Option<PointStyle>,
    #[serde(default)]
    pub(crate) layer: Option<LayerId>,
    #[serde(default)]
    pub(crate) selected: bool,
}

impl Point {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            id: Uuid::new_v4(),
            coordinate,
            style: None,
            layer: None,
            selected: false,
        }
    }

    pub fn with_style(coordinate: Coordinate, style: PointStyle) -> Self {
        Self {
            style: Some(style),
            ..Self::new(coordinate)
        }
    }
}

impl GeometryTrait for Point {
    type Style = PointStyle;

    fn id(&self) -> GeometryId {
        self.id
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::Point
    }

    fn area(&self) -> f64 {
        0.0
    }

    fn length(&self) -> f64 {
        0.0
    }

    fn centroid(&self) -> Option<Coordinate> {
        Some(self.coordinate)
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.coordinate, self.coordinate)
    }

    fn contains_point(&self, point: Coordinate, style: &PointStyle, view: Option<&ViewTransform>) -> bool {
        let radius = match view {
            Some(view) => view.screen_to_world_distance(style.size),
            None => style.size,
        };
        self.coordinate.distance(point) <= radius
    }

    fn draw(&self, surface: &mut dyn Surface, view: &ViewTransform, style: &PointStyle) {
        let center = view.world_to_screen(self.coordinate);
        let marker = Circle::new(center, style.size).to_path(0.1);

        surface.save();
        surface.set_fill(style.color);
        surface.fill_path(&marker, Fill::NonZero);
        surface.restore();
    }

    fn style(&self) -> Option<&PointStyle> {
        self.style.as_ref()
    }

    fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    fn set_layer(&mut self, layer: Option<LayerId>) {
        self.layer = layer;
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn detached(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            coordinate: self.coordinate,
            style: self.style.clone(),
            layer: None,
            selected: false,
        }
    }

    fn to_plain_object(&self) -> serde_json::Value {
        json!({
            "type": GeometryKind::Point.name(),
            "coordinate": { "x": self.coordinate.x, "y": self.coordinate.y },
            "layer": layer_value(self.layer),
        })
    }
}
