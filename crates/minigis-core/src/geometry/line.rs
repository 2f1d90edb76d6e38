//! Line (polyline) geometry.

use super::{
    Coordinate, GeometryId, GeometryKind, GeometryTrait, bounds_of, layer_value, point_to_polyline_dist,
    polyline_length, screen_path,
};
use crate::error::{MapError, MapResult};
use crate::layer::LayerId;
use crate::style::LineStyle;
use crate::surface::Surface;
use crate::viewport::ViewTransform;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// An open polyline with at least two vertices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LineRecord")]
pub struct Line {
    pub(crate) id: GeometryId,
    coordinates: Vec<Coordinate>,
    #[serde(default)]
    pub style: Option<LineStyle>,
    #[serde(default)]
    pub(crate) layer: Option<LayerId>,
    #[serde(default)]
    pub(crate) selected: bool,
}

#[derive(Deserialize)]
struct LineRecord {
    id: GeometryId,
    coordinates: Vec<Coordinate>,
    #[serde(default)]
    style: Option<LineStyle>,
    #[serde(default)]
    layer: Option<LayerId>,
    #[serde(default)]
    selected: bool,
}

impl TryFrom<LineRecord> for Line {
    type Error = MapError;

    fn try_from(record: LineRecord) -> MapResult<Self> {
        let mut line = Self::new(record.coordinates)?;
        line.id = record.id;
        line.style = record.style;
        line.layer = record.layer;
        line.selected = record.selected;
        Ok(line)
    }
}

impl Line {
    /// Create a line. Fails with fewer than two coordinates.
    pub fn new(coordinates: Vec<Coordinate>) -> MapResult<Self> {
        if coordinates.len() < 2 {
            return Err(MapError::InvalidGeometry(format!(
                "line needs at least 2 coordinates, got {}",
                coordinates.len()
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            coordinates,
            style: None,
            layer: None,
            selected: false,
        })
    }

    pub fn with_style(coordinates: Vec<Coordinate>, style: LineStyle) -> MapResult<Self> {
        let mut line = Self::new(coordinates)?;
        line.style = Some(style);
        Ok(line)
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Stroke this line's path with the current surface state.
    pub(crate) fn stroke(&self, surface: &mut dyn Surface, view: &ViewTransform) {
        surface.stroke_path(&screen_path(&self.coordinates, view, false));
    }
}

impl GeometryTrait for Line {
    type Style = LineStyle;

    fn id(&self) -> GeometryId {
        self.id
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::Line
    }

    fn area(&self) -> f64 {
        0.0
    }

    fn length(&self) -> f64 {
        polyline_length(&self.coordinates)
    }

    /// Unweighted mean of the vertices.
    fn centroid(&self) -> Option<Coordinate> {
        let n = self.coordinates.len() as f64;
        let (sum_x, sum_y) = self
            .coordinates
            .iter()
            .fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
        Some(Coordinate::new(sum_x / n, sum_y / n))
    }

    fn bounds(&self) -> Rect {
        bounds_of(&self.coordinates)
    }

    fn contains_point(&self, point: Coordinate, style: &LineStyle, view: Option<&ViewTransform>) -> bool {
        let half_width = match view {
            Some(view) => view.screen_to_world_distance(style.width / 2.0),
            None => style.width / 2.0,
        };
        point_to_polyline_dist(point, &self.coordinates) <= half_width
    }

    fn draw(&self, surface: &mut dyn Surface, view: &ViewTransform, style: &LineStyle) {
        surface.save();
        surface.set_stroke(style.color, style.width);
        surface.set_dash(style.dash.pattern());
        self.stroke(surface, view);
        surface.restore();
    }

    fn style(&self) -> Option<&LineStyle> {
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
            coordinates: self.coordinates.to_vec(),
            style: self.style.clone(),
            layer: None,
            selected: false,
        }
    }

    fn to_plain_object(&self) -> serde_json::Value {
        json!({
            "type": GeometryKind::Line.name(),
            "coordinates": self.coordinates.iter().map(|c| json!({ "x": c.x, "y": c.y })).collect::<Vec<_>>(),
            "layer": layer_value(self.layer),
        })
    }
}
