//! Text label geometry.

use super::{Coordinate, GeometryId, GeometryKind, GeometryTrait, layer_value};
use crate::layer::LayerId;
use crate::style::FontStyle;
use crate::surface::Surface;
use crate::viewport::ViewTransform;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// A label anchored at a world position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: GeometryId,
    pub position: Coordinate,
    pub content: String,
    #[serde(default)]
    pub style: Option<FontStyle>,
    #[serde(default)]
    pub(crate) layer: Option<LayerId>,
    #[serde(default)]
    pub(crate) selected: bool,
}

impl Text {
    pub fn new(position: Coordinate, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content: content.into(),
            style: None,
            layer: None,
            selected: false,
        }
    }

    pub fn with_style(position: Coordinate, content: impl Into<String>, style: FontStyle) -> Self {
        Self {
            style: Some(style),
            ..Self::new(position, content)
        }
    }
}

impl GeometryTrait for Text {
    type Style = FontStyle;

    fn id(&self) -> GeometryId {
        self.id
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::Text
    }

    fn area(&self) -> f64 {
        0.0
    }

    fn length(&self) -> f64 {
        0.0
    }

    fn centroid(&self) -> Option<Coordinate> {
        Some(self.position)
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.position, self.position)
    }

    fn draw(&self, surface: &mut dyn Surface, view: &ViewTransform, style: &FontStyle) {
        surface.save();
        surface.set_fill(style.color);
        surface.set_font(&style.font_family, style.size);
        surface.fill_text(&self.content, view.world_to_screen(self.position));
        surface.restore();
    }

    fn style(&self) -> Option<&FontStyle> {
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
            position: self.position,
            content: self.content.clone(),
            style: self.style.clone(),
            layer: None,
            selected: false,
        }
    }

    fn to_plain_object(&self) -> serde_json::Value {
        json!({
            "type": GeometryKind::Text.name(),
            "position": { "x": self.position.x, "y": self.position.y },
            "content": self.content,
            "layer": layer_value(self.layer),
        })
    }
}
