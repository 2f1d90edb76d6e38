//! Geometry primitives held by map layers.

mod line;
mod multiline;
mod point;
mod polygon;
mod text;

pub use line::Line;
pub use multiline::Multiline;
pub use point::Point;
pub use polygon::Polygon;
pub use text::Text;

use crate::layer::LayerId;
use crate::style::{self, EffectiveStyle, LayerStyle};
use crate::surface::Surface;
use crate::viewport::ViewTransform;
use kurbo::{BezPath, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A position in world space.
pub type Coordinate = kurbo::Point;

/// Unique identifier for geometries.
pub type GeometryId = Uuid;

/// The concrete kind of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    Line,
    Multiline,
    Polygon,
    Text,
}

impl GeometryKind {
    /// Display name, as used in plain-object exports.
    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::Line => "Line",
            GeometryKind::Multiline => "Multiline",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::Text => "Text",
        }
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Coordinate::new(a.x + t * seg.x, a.y + t * seg.y);
    point.distance(proj)
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Coordinate, points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Sum of consecutive-vertex distances.
pub fn polyline_length(points: &[Coordinate]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Axis-aligned bounds of a set of coordinates.
pub fn bounds_of(points: &[Coordinate]) -> Rect {
    let (min_x, max_x) = points.iter().fold((f64::MAX, f64::MIN), |(mn, mx), p| {
        (mn.min(p.x), mx.max(p.x))
    });
    let (min_y, max_y) = points.iter().fold((f64::MAX, f64::MIN), |(mn, mx), p| {
        (mn.min(p.y), mx.max(p.y))
    });
    Rect::new(min_x, min_y, max_x, max_y)
}

/// Screen-space path through world coordinates.
pub(crate) fn screen_path(points: &[Coordinate], view: &ViewTransform, close: bool) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter().map(|p| view.world_to_screen(*p));
    if let Some(first) = iter.next() {
        path.move_to(first);
        for p in iter {
            path.line_to(p);
        }
        if close {
            path.close_path();
        }
    }
    path
}

/// Operations shared by every geometry kind.
pub trait GeometryTrait {
    /// Style type used to draw this kind.
    type Style;

    /// Get the unique identifier.
    fn id(&self) -> GeometryId;

    fn kind(&self) -> GeometryKind;

    /// Enclosed area (zero for non-area kinds).
    fn area(&self) -> f64;

    /// Total edge length (zero for zero-dimensional kinds).
    fn length(&self) -> f64;

    /// Centroid, or `None` when it is undefined for degenerate input.
    fn centroid(&self) -> Option<Coordinate>;

    /// Axis-aligned bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a world point hits this geometry.
    ///
    /// With a view transform, screen-sized tolerances (point radius, line
    /// width) are converted to world units so hit areas stay visually constant.
    fn contains_point(&self, _point: Coordinate, _style: &Self::Style, _view: Option<&ViewTransform>) -> bool {
        false
    }

    /// Draw in screen space. Paint state is restored before returning.
    fn draw(&self, surface: &mut dyn Surface, view: &ViewTransform, style: &Self::Style);

    /// Per-object style override.
    fn style(&self) -> Option<&Self::Style>;

    /// Handle of the containing layer.
    fn layer(&self) -> Option<LayerId>;

    fn set_layer(&mut self, layer: Option<LayerId>);

    fn is_selected(&self) -> bool;

    fn set_selected(&mut self, selected: bool);

    /// Copy with fresh storage and id, detached from any layer and unselected.
    /// The style override is carried forward.
    fn detached(&self) -> Self
    where
        Self: Sized;

    /// Plain JSON representation.
    fn to_plain_object(&self) -> serde_json::Value;
}

/// A geometry of any kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Geometry {
    Point(Point),
    Line(Line),
    Multiline(Multiline),
    Polygon(Polygon),
    Text(Text),
}

impl Geometry {
    pub fn id(&self) -> GeometryId {
        match self {
            Geometry::Point(g) => g.id(),
            Geometry::Line(g) => g.id(),
            Geometry::Multiline(g) => g.id(),
            Geometry::Polygon(g) => g.id(),
            Geometry::Text(g) => g.id(),
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(g) => g.kind(),
            Geometry::Line(g) => g.kind(),
            Geometry::Multiline(g) => g.kind(),
            Geometry::Polygon(g) => g.kind(),
            Geometry::Text(g) => g.kind(),
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Geometry::Point(g) => g.area(),
            Geometry::Line(g) => g.area(),
            Geometry::Multiline(g) => g.area(),
            Geometry::Polygon(g) => g.area(),
            Geometry::Text(g) => g.area(),
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            Geometry::Point(g) => g.length(),
            Geometry::Line(g) => g.length(),
            Geometry::Multiline(g) => g.length(),
            Geometry::Polygon(g) => g.length(),
            Geometry::Text(g) => g.length(),
        }
    }

    pub fn centroid(&self) -> Option<Coordinate> {
        match self {
            Geometry::Point(g) => g.centroid(),
            Geometry::Line(g) => g.centroid(),
            Geometry::Multiline(g) => g.centroid(),
            Geometry::Polygon(g) => g.centroid(),
            Geometry::Text(g) => g.centroid(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Geometry::Point(g) => g.bounds(),
            Geometry::Line(g) => g.bounds(),
            Geometry::Multiline(g) => g.bounds(),
            Geometry::Polygon(g) => g.bounds(),
            Geometry::Text(g) => g.bounds(),
        }
    }

    pub fn layer(&self) -> Option<LayerId> {
        match self {
            Geometry::Point(g) => g.layer(),
            Geometry::Line(g) => g.layer(),
            Geometry::Multiline(g) => g.layer(),
            Geometry::Polygon(g) => g.layer(),
            Geometry::Text(g) => g.layer(),
        }
    }

    pub fn set_layer(&mut self, layer: Option<LayerId>) {
        match self {
            Geometry::Point(g) => g.set_layer(layer),
            Geometry::Line(g) => g.set_layer(layer),
            Geometry::Multiline(g) => g.set_layer(layer),
            Geometry::Polygon(g) => g.set_layer(layer),
            Geometry::Text(g) => g.set_layer(layer),
        }
    }

    pub fn is_selected(&self) -> bool {
        match self {
            Geometry::Point(g) => g.is_selected(),
            Geometry::Line(g) => g.is_selected(),
            Geometry::Multiline(g) => g.is_selected(),
            Geometry::Polygon(g) => g.is_selected(),
            Geometry::Text(g) => g.is_selected(),
        }
    }

    pub fn set_selected(&mut self, selected: bool) {
        match self {
            Geometry::Point(g) => g.set_selected(selected),
            Geometry::Line(g) => g.set_selected(selected),
            Geometry::Multiline(g) => g.set_selected(selected),
            Geometry::Polygon(g) => g.set_selected(selected),
            Geometry::Text(g) => g.set_selected(selected),
        }
    }

    /// The geometry's own style override, if any.
    pub fn style_override(&self) -> Option<EffectiveStyle> {
        match self {
            Geometry::Point(g) => g.style().cloned().map(EffectiveStyle::Point),
            Geometry::Line(g) => g.style().cloned().map(EffectiveStyle::Line),
            Geometry::Multiline(g) => g.style().cloned().map(EffectiveStyle::Line),
            Geometry::Polygon(g) => g.style().cloned().map(EffectiveStyle::Polygon),
            Geometry::Text(g) => g.style().cloned().map(EffectiveStyle::Font),
        }
    }

    /// Whether this kind takes part in pointer hit-testing.
    pub fn is_hit_testable(&self) -> bool {
        matches!(self, Geometry::Point(_) | Geometry::Line(_) | Geometry::Polygon(_))
    }

    /// Hit-test a world point using the resolved (unhighlighted) style.
    pub fn contains_point(
        &self,
        point: Coordinate,
        layer_style: Option<&LayerStyle>,
        view: Option<&ViewTransform>,
    ) -> bool {
        let resolved = style::resolve(self, layer_style);
        match (self, &resolved) {
            (Geometry::Point(g), EffectiveStyle::Point(s)) => g.contains_point(point, s, view),
            (Geometry::Line(g), EffectiveStyle::Line(s)) => g.contains_point(point, s, view),
            (Geometry::Multiline(g), EffectiveStyle::Line(s)) => g.contains_point(point, s, view),
            (Geometry::Polygon(g), EffectiveStyle::Polygon(s)) => g.contains_point(point, s, view),
            (Geometry::Text(g), EffectiveStyle::Font(s)) => g.contains_point(point, s, view),
            _ => false,
        }
    }

    /// Draw with the effective style, including the selection highlight.
    pub fn draw(&self, surface: &mut dyn Surface, view: &ViewTransform, layer_style: Option<&LayerStyle>) {
        let resolved = style::resolve_with_selection(self, layer_style);
        match (self, &resolved) {
            (Geometry::Point(g), EffectiveStyle::Point(s)) => g.draw(surface, view, s),
            (Geometry::Line(g), EffectiveStyle::Line(s)) => g.draw(surface, view, s),
            (Geometry::Multiline(g), EffectiveStyle::Line(s)) => g.draw(surface, view, s),
            (Geometry::Polygon(g), EffectiveStyle::Polygon(s)) => g.draw(surface, view, s),
            (Geometry::Text(g), EffectiveStyle::Font(s)) => g.draw(surface, view, s),
            _ => log::warn!("style kind does not match geometry {}", self.id()),
        }
    }

    /// Copy detached from any layer, with a fresh id.
    pub fn detached(&self) -> Self {
        match self {
            Geometry::Point(g) => Geometry::Point(g.detached()),
            Geometry::Line(g) => Geometry::Line(g.detached()),
            Geometry::Multiline(g) => Geometry::Multiline(g.detached()),
            Geometry::Polygon(g) => Geometry::Polygon(g.detached()),
            Geometry::Text(g) => Geometry::Text(g.detached()),
        }
    }

    pub fn to_plain_object(&self) -> serde_json::Value {
        match self {
            Geometry::Point(g) => g.to_plain_object(),
            Geometry::Line(g) => g.to_plain_object(),
            Geometry::Multiline(g) => g.to_plain_object(),
            Geometry::Polygon(g) => g.to_plain_object(),
            Geometry::Text(g) => g.to_plain_object(),
        }
    }

    /// Get the polygon if this geometry is a polygon.
    pub fn as_polygon(&self) -> Option<&Polygon> {
        match self {
            Geometry::Polygon(p) => Some(p),
            _ => None,
        }
    }

    /// Get the line if this geometry is a line.
    pub fn as_line(&self) -> Option<&Line> {
        match self {
            Geometry::Line(l) => Some(l),
            _ => None,
        }
    }

    /// Get the point if this geometry is a point.
    pub fn as_point(&self) -> Option<&Point> {
        match self {
            Geometry::Point(p) => Some(p),
            _ => None,
        }
    }
}

impl From<Point> for Geometry {
    fn from(g: Point) -> Self {
        Geometry::Point(g)
    }
}

impl From<Line> for Geometry {
    fn from(g: Line) -> Self {
        Geometry::Line(g)
    }
}

impl From<Multiline> for Geometry {
    fn from(g: Multiline) -> Self {
        Geometry::Multiline(g)
    }
}

impl From<Polygon> for Geometry {
    fn from(g: Polygon) -> Self {
        Geometry::Polygon(g)
    }
}

impl From<Text> for Geometry {
    fn from(g: Text) -> Self {
        Geometry::Text(g)
    }
}

/// Plain-object form of a layer handle.
pub(crate) fn layer_value(layer: Option<LayerId>) -> serde_json::Value {
    layer
        .map(|id| serde_json::Value::String(id.to_string()))
        .unwrap_or(serde_json::Value::Null)
}
