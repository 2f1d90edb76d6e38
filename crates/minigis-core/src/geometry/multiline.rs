//! Multiline geometry: several polylines drawn with one line style.

use super::{Coordinate, GeometryId, GeometryKind, GeometryTrait, Line, layer_value};
use crate::error::{MapError, MapResult};
use crate::layer::LayerId;
use crate::style::LineStyle;
use crate::surface::Surface;
use crate::viewport::ViewTransform;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "MultilineRecord")]
pub struct Multiline {
    pub(crate) id: GeometryId,
    lines: Vec<Line>,
    #[serde(default)]
    pub style: Option<LineStyle>,
    #[serde(default)]
    pub(crate) layer: Option<LayerId>,
    #[serde(default)]
    pub(crate) selected: bool,
}

#[derive(Deserialize)]
struct MultilineRecord {
    id: GeometryId,
    lines: Vec<Line>,
    #[serde(default)]
    style: Option<LineStyle>,
    #[serde(default)]
    layer: Option<LayerId>,
    #[serde(default)]
    selected: bool,
}

impl TryFrom<MultilineRecord> for Multiline {
    type Error = MapError;

    fn try_from(record: MultilineRecord) -> MapResult<Self> {
        let mut multiline = Self::new(record.lines)?;
        multiline.id = record.id;
        multiline.style = record.style;
        multiline.layer = record.layer;
        multiline.selected = record.selected;
        Ok(multiline)
    }
}

impl Multiline {
    /// Create a multiline from at least one line.
    pub fn new(lines: Vec<Line>) -> MapResult<Self> {
        if lines.is_empty() {
            return Err(MapError::InvalidGeometry("multiline needs at least 1 line".to_string()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            lines,
            style: None,
            layer: None,
            selected: false,
        })
    }

    pub fn with_style(lines: Vec<Line>, style: LineStyle) -> MapResult<Self> {
        let mut multiline = Self::new(lines)?;
        multiline.style = Some(style);
        Ok(multiline)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }
}

impl GeometryTrait for Multiline {
    type Style = LineStyle;

    fn id(&self) -> GeometryId {
        self.id
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::Multiline
    }

    fn area(&self) -> f64 {
        0.0
    }

    fn length(&self) -> f64 {
        self.lines.iter().map(GeometryTrait::length).sum()
    }

    /// Length-weighted mean of the constituent line centroids.
    fn centroid(&self) -> Option<Coordinate> {
        let total = self.length();
        if total <= 0.0 {
            return None;
        }
        let (sum_x, sum_y) = self.lines.iter().fold((0.0, 0.0), |(sx, sy), line| {
            match line.centroid() {
                Some(c) => {
                    let weight = line.length();
                    (sx + c.x * weight, sy + c.y * weight)
                }
                None => (sx, sy),
            }
        });
        Some(Coordinate::new(sum_x / total, sum_y / total))
    }

    fn bounds(&self) -> Rect {
        self.lines
            .iter()
            .map(GeometryTrait::bounds)
            .reduce(|acc, r| acc.union(r))
            .unwrap_or(Rect::ZERO)
    }

    fn draw(&self, surface: &mut dyn Surface, view: &ViewTransform, style: &LineStyle) {
        surface.save();
        surface.set_stroke(style.color, style.width);
        surface.set_dash(style.dash.pattern());
        for line in &self.lines {
            line.stroke(surface, view);
        }
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
        for line in &mut self.lines {
            line.set_layer(layer);
        }
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
            lines: self.lines.iter().map(GeometryTrait::detached).collect(),
            style: self.style.clone(),
            layer: None,
            selected: false,
        }
    }

    fn to_plain_object(&self) -> serde_json::Value {
        json!({
            "type": GeometryKind::Multiline.name(),
            "lines": self.lines.iter().map(GeometryTrait::to_plain_object).collect::<Vec<_>>(),
            "layer": layer_value(self.layer),
        })
    }
}
