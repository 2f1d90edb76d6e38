//! Polygon geometry with optional holes.

use super::{Coordinate, GeometryId, GeometryKind, GeometryTrait, bounds_of, layer_value, polyline_length, screen_path};
use crate::error::{MapError, MapResult};
use crate::layer::LayerId;
use crate::style::PolygonStyle;
use crate::surface::Surface;
use crate::viewport::ViewTransform;
use kurbo::{BezPath, Rect};
use peniko::Fill;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

/// A filled area bounded by a closed exterior ring.
///
/// The exterior always repeats its first coordinate as its last. Holes are
/// stored as given.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PolygonRecord")]
pub struct Polygon {
    pub(crate) id: GeometryId,
    exterior: Vec<Coordinate>,
    #[serde(default)]
    holes: Vec<Vec<Coordinate>>,
    #[serde(default)]
    pub style: Option<PolygonStyle>,
    #[serde(default)]
    pub(crate) layer: Option<LayerId>,
    #[serde(default)]
    pub(crate) selected: bool,
}

/// Serialized polygon, checked by [`Polygon::new`] before use.
#[derive(Deserialize)]
struct PolygonRecord {
    id: GeometryId,
    exterior: Vec<Coordinate>,
    #[serde(default)]
    holes: Vec<Vec<Coordinate>>,
    #[serde(default)]
    style: Option<PolygonStyle>,
    #[serde(default)]
    layer: Option<LayerId>,
    #[serde(default)]
    selected: bool,
}

impl TryFrom<PolygonRecord> for Polygon {
    type Error = MapError;

    fn try_from(record: PolygonRecord) -> MapResult<Self> {
        let mut polygon = Self::new(record.exterior)?.with_holes(record.holes);
        polygon.id = record.id;
        polygon.style = record.style;
        polygon.layer = record.layer;
        polygon.selected = record.selected;
        Ok(polygon)
    }
}

impl Polygon {
    /// Create a polygon from its exterior ring, closing it if open.
    pub fn new(mut exterior: Vec<Coordinate>) -> MapResult<Self> {
        if exterior.len() < 3 {
            return Err(MapError::InvalidGeometry(format!(
                "polygon needs at least 3 coordinates, got {}",
                exterior.len()
            )));
        }
        if exterior.first() != exterior.last() {
            exterior.push(exterior[0]);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            exterior,
            holes: Vec::new(),
            style: None,
            layer: None,
            selected: false,
        })
    }

    pub fn with_style(exterior: Vec<Coordinate>, style: PolygonStyle) -> MapResult<Self> {
        let mut polygon = Self::new(exterior)?;
        polygon.style = Some(style);
        Ok(polygon)
    }

    /// Replace the hole rings.
    pub fn with_holes(mut self, holes: Vec<Vec<Coordinate>>) -> Self {
        self.holes = holes;
        self
    }

    pub fn exterior(&self) -> &[Coordinate] {
        &self.exterior
    }

    pub fn holes(&self) -> &[Vec<Coordinate>] {
        &self.holes
    }

    /// Insert a vertex just before the closing coordinate.
    pub fn add_point(&mut self, point: Coordinate) {
        let at = self.exterior.len() - 1;
        self.exterior.insert(at, point);
    }

    /// Rebuild a polygon from its plain-object form.
    pub fn from_plain_object(value: &Value) -> MapResult<Self> {
        let exterior = value
            .get("exterior")
            .ok_or_else(|| MapError::InvalidGeometry("plain polygon has no exterior".to_string()))
            .and_then(plain_ring)?;
        let holes = match value.get("holes") {
            Some(Value::Array(rings)) => rings.iter().map(plain_ring).collect::<MapResult<Vec<_>>>()?,
            _ => Vec::new(),
        };
        Ok(Self::new(exterior)?.with_holes(holes))
    }

    /// Twice the signed area of the exterior (positive when counter-clockwise).
    fn signed_double_area(&self) -> f64 {
        let n = self.exterior.len();
        (0..n)
            .map(|i| {
                let a = self.exterior[i];
                let b = self.exterior[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum()
    }

    fn outline(&self, view: &ViewTransform) -> BezPath {
        let mut path = screen_path(&self.exterior, view, true);
        for hole in &self.holes {
            path.extend(screen_path(hole, view, true).elements().iter().copied());
        }
        path
    }
}

fn plain_ring(value: &Value) -> MapResult<Vec<Coordinate>> {
    let points = value
        .as_array()
        .ok_or_else(|| MapError::InvalidGeometry("ring is not an array".to_string()))?;
    points
        .iter()
        .map(|p| match (p.get("x").and_then(Value::as_f64), p.get("y").and_then(Value::as_f64)) {
            (Some(x), Some(y)) => Ok(Coordinate::new(x, y)),
            _ => Err(MapError::InvalidGeometry(format!("bad coordinate {p}"))),
        })
        .collect()
}

fn plain_ring_value(ring: &[Coordinate]) -> Value {
    Value::Array(ring.iter().map(|c| json!({ "x": c.x, "y": c.y })).collect())
}

/// Even-odd ray casting.
fn ring_contains(ring: &[Coordinate], point: Coordinate) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (ring[i], ring[j]);
        if (pi.y > point.y) != (pj.y > point.y) && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

impl GeometryTrait for Polygon {
    type Style = PolygonStyle;

    fn id(&self) -> GeometryId {
        self.id
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::Polygon
    }

    fn area(&self) -> f64 {
        self.signed_double_area().abs() / 2.0
    }

    fn length(&self) -> f64 {
        polyline_length(&self.exterior)
    }

    fn centroid(&self) -> Option<Coordinate> {
        let double_area = self.signed_double_area();
        if double_area.abs() < f64::EPSILON {
            return None;
        }
        let n = self.exterior.len();
        let (cx, cy) = (0..n).fold((0.0, 0.0), |(cx, cy), i| {
            let a = self.exterior[i];
            let b = self.exterior[(i + 1) % n];
            let cross = a.x * b.y - b.x * a.y;
            (cx + (a.x + b.x) * cross, cy + (a.y + b.y) * cross)
        });
        let factor = 3.0 * double_area;
        Some(Coordinate::new(cx / factor, cy / factor))
    }

    fn bounds(&self) -> Rect {
        bounds_of(&self.exterior)
    }

    fn contains_point(&self, point: Coordinate, _style: &PolygonStyle, _view: Option<&ViewTransform>) -> bool {
        ring_contains(&self.exterior, point) && !self.holes.iter().any(|hole| ring_contains(hole, point))
    }

    fn draw(&self, surface: &mut dyn Surface, view: &ViewTransform, style: &PolygonStyle) {
        let path = self.outline(view);
        surface.save();
        surface.set_fill(style.fill_color);
        surface.fill_path(&path, Fill::EvenOdd);
        surface.set_stroke(style.stroke_color, style.stroke_width);
        surface.stroke_path(&path);
        surface.restore();
    }

    fn style(&self) -> Option<&PolygonStyle> {
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
            exterior: self.exterior.to_vec(),
            holes: self.holes.to_vec(),
            style: self.style.clone(),
            layer: None,
            selected: false,
        }
    }

    fn to_plain_object(&self) -> Value {
        let holes = if self.holes.is_empty() {
            Value::Null
        } else {
            Value::Array(self.holes.iter().map(|h| plain_ring_value(h)).collect())
        };
        json!({
            "type": GeometryKind::Polygon.name(),
            "exterior": plain_ring_value(&self.exterior),
            "holes": holes,
            "layer": layer_value(self.layer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DisplayList, DrawCommand};
    use kurbo::Size;

    fn ring(points: &[(f64, f64)]) -> Vec<Coordinate> {
        points.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()
    }

    fn rectangle() -> Polygon {
        Polygon::new(ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0), (0.0, 0.0)])).unwrap()
    }

    #[test]
    fn test_needs_three_coordinates() {
        assert!(Polygon::new(ring(&[(0.0, 0.0), (1.0, 0.0)])).is_err());
    }

    #[test]
    fn test_open_ring_is_closed() {
        let polygon = Polygon::new(ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])).unwrap();
        assert_eq!(polygon.exterior().len(), 4);
        assert_eq!(polygon.exterior().first(), polygon.exterior().last());
    }

    #[test]
    fn test_rectangle_area_and_centroid() {
        let polygon = rectangle();
        assert!((polygon.area() - 12.0).abs() < 1e-12);
        let centroid = polygon.centroid().unwrap();
        assert!((centroid.x - 2.0).abs() < 1e-12);
        assert!((centroid.y - 1.5).abs() < 1e-12);
        assert!((polygon.length() - 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_clockwise_ring_has_same_centroid() {
        let polygon = Polygon::new(ring(&[(0.0, 0.0), (0.0, 3.0), (4.0, 3.0), (4.0, 0.0)])).unwrap();
        assert!((polygon.area() - 12.0).abs() < 1e-12);
        let centroid = polygon.centroid().unwrap();
        assert!((centroid.x - 2.0).abs() < 1e-12);
        assert!((centroid.y - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_has_no_centroid() {
        let polygon = Polygon::new(ring(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)])).unwrap();
        assert!(polygon.area().abs() < f64::EPSILON);
        assert!(polygon.centroid().is_none());
    }

    #[test]
    fn test_contains_point_excludes_holes() {
        let polygon = Polygon::new(ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]))
            .unwrap()
            .with_holes(vec![ring(&[(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0), (4.0, 4.0)])]);
        let style = PolygonStyle::default();
        assert!(polygon.contains_point(Coordinate::new(2.0, 2.0), &style, None));
        assert!(!polygon.contains_point(Coordinate::new(5.0, 5.0), &style, None));
        assert!(!polygon.contains_point(Coordinate::new(11.0, 5.0), &style, None));
    }

    #[test]
    fn test_add_point_keeps_ring_closed() {
        let mut polygon = Polygon::new(ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0)])).unwrap();
        polygon.add_point(Coordinate::new(0.0, 3.0));
        assert_eq!(polygon.exterior().len(), 5);
        assert_eq!(polygon.exterior()[3], Coordinate::new(0.0, 3.0));
        assert_eq!(polygon.exterior()[4], Coordinate::new(0.0, 0.0));
        assert!((polygon.area() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_plain_object_rehydrates() {
        let polygon = rectangle().with_holes(vec![ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 1.0)])]);
        let value = polygon.to_plain_object();
        assert_eq!(value["type"], "Polygon");

        let back = Polygon::from_plain_object(&value).unwrap();
        assert_eq!(back.exterior(), polygon.exterior());
        assert_eq!(back.holes(), polygon.holes());
    }

    #[test]
    fn test_plain_object_without_holes() {
        let value = rectangle().to_plain_object();
        assert!(value["holes"].is_null());
        assert!(Polygon::from_plain_object(&value).unwrap().holes().is_empty());
        assert!(Polygon::from_plain_object(&json!({ "holes": null })).is_err());
    }

    #[test]
    fn test_deserialize_checks_exterior() {
        let mut value = serde_json::to_value(rectangle()).unwrap();
        let back: Polygon = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(back.exterior(), rectangle().exterior());

        value["exterior"] = json!([{ "x": 0.0, "y": 0.0 }, { "x": 2.0, "y": 0.0 }, { "x": 2.0, "y": 2.0 }]);
        let mut reopened: Polygon = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(reopened.exterior().len(), 4);
        assert_eq!(reopened.exterior().first(), reopened.exterior().last());
        reopened.add_point(Coordinate::new(0.0, 2.0));
        assert_eq!(reopened.exterior().len(), 5);

        value["exterior"] = json!([]);
        assert!(serde_json::from_value::<Polygon>(value).is_err());
    }

    #[test]
    fn test_draw_fills_then_strokes() {
        let view = ViewTransform::new(Coordinate::ZERO, Size::new(100.0, 100.0), 1.0);
        let mut list = DisplayList::new();
        rectangle().draw(&mut list, &view, &PolygonStyle::default());

        let kinds: Vec<_> = list
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill(..) | DrawCommand::Stroke(_)))
            .collect();
        assert!(matches!(kinds[0], DrawCommand::Fill(_, Fill::EvenOdd)));
        assert!(matches!(kinds[1], DrawCommand::Stroke(_)));
        assert_eq!(list.save_depth(), 0);
    }
}
