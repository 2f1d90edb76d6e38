//! Layers: named, ordered collections of geometries with a shared style.

use crate::geometry::{Coordinate, Geometry, GeometryId, GeometryKind};
use crate::map::MapId;
use crate::style::LayerStyle;
use crate::surface::Surface;
use crate::viewport::ViewTransform;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Unique identifier for layers.
pub type LayerId = Uuid;

/// An ordered set of geometries drawn together.
///
/// Every geometry held by a layer carries the layer's id as its layer handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    id: LayerId,
    pub name: String,
    geometries: Vec<Geometry>,
    visible: bool,
    style: Option<LayerStyle>,
    #[serde(skip)]
    map: Option<MapId>,
}

impl Layer {
    /// Create an empty, visible layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            geometries: Vec::new(),
            visible: true,
            style: None,
            map: None,
        }
    }

    pub fn with_style(name: impl Into<String>, style: LayerStyle) -> Self {
        Self {
            style: Some(style),
            ..Self::new(name)
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn style(&self) -> Option<&LayerStyle> {
        self.style.as_ref()
    }

    pub fn set_style(&mut self, style: Option<LayerStyle>) {
        self.style = style;
    }

    /// Handle of the owning map.
    pub fn map(&self) -> Option<MapId> {
        self.map
    }

    pub(crate) fn set_map(&mut self, map: Option<MapId>) {
        self.map = map;
    }

    /// Geometries in insertion order.
    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Append a geometry, taking ownership of it.
    pub fn add_geometry(&mut self, geometry: impl Into<Geometry>) -> GeometryId {
        let mut geometry = geometry.into();
        geometry.set_layer(Some(self.id));
        let id = geometry.id();
        self.geometries.push(geometry);
        id
    }

    /// Remove the geometry at `index`. The returned geometry has no layer handle
    /// and is deselected.
    pub fn remove_geometry(&mut self, index: usize) -> Option<Geometry> {
        if index >= self.geometries.len() {
            return None;
        }
        let mut geometry = self.geometries.remove(index);
        geometry.set_layer(None);
        geometry.set_selected(false);
        Some(geometry)
    }

    pub fn geometry(&self, index: usize) -> Option<&Geometry> {
        self.geometries.get(index)
    }

    pub fn geometry_mut(&mut self, index: usize) -> Option<&mut Geometry> {
        self.geometries.get_mut(index)
    }

    /// Find a geometry by id.
    pub fn find(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.iter().find(|g| g.id() == id)
    }

    pub fn find_mut(&mut self, id: GeometryId) -> Option<&mut Geometry> {
        self.geometries.iter_mut().find(|g| g.id() == id)
    }

    pub fn total_area(&self) -> f64 {
        self.geometries.iter().map(Geometry::area).sum()
    }

    pub fn total_length(&self) -> f64 {
        self.geometries.iter().map(Geometry::length).sum()
    }

    /// Centroids of the geometries that have one.
    pub fn centroids(&self) -> Vec<Coordinate> {
        self.geometries.iter().filter_map(Geometry::centroid).collect()
    }

    /// Mean of the member centroids, or `None` when there are none.
    pub fn center(&self) -> Option<Coordinate> {
        let centroids = self.centroids();
        if centroids.is_empty() {
            return None;
        }
        let n = centroids.len() as f64;
        let (sx, sy) = centroids.iter().fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
        Some(Coordinate::new(sx / n, sy / n))
    }

    /// Union of all geometry bounds.
    pub fn bounds(&self) -> Option<Rect> {
        self.geometries.iter().map(Geometry::bounds).reduce(|acc, r| acc.union(r))
    }

    /// Scale that fits the layer's bounds into a `width` x `height` surface.
    ///
    /// Axes with zero extent are ignored. Returns 1 for an empty layer or a
    /// bounding box that is a single point.
    pub fn scale_to_fit(&self, width: f64, height: f64) -> f64 {
        let Some(bounds) = self.bounds() else {
            return 1.0;
        };
        let fits = [(width, bounds.width()), (height, bounds.height())]
            .into_iter()
            .filter(|&(_, extent)| extent > 0.0)
            .map(|(available, extent)| available / extent)
            .fold(f64::INFINITY, f64::min);
        if fits.is_finite() && fits > 0.0 { fits } else { 1.0 }
    }

    /// Toggle visibility.
    pub fn change_visibility(&mut self) {
        self.visible = !self.visible;
    }

    /// Draw every geometry, grouped by kind.
    ///
    /// Kinds are drawn in order of first appearance, each group inside one
    /// save/restore, geometries in insertion order within a group. Hidden
    /// layers draw nothing.
    pub fn draw(&self, surface: &mut dyn Surface, view: &ViewTransform) {
        if !self.visible {
            return;
        }

        let mut kinds: Vec<GeometryKind> = Vec::new();
        for geometry in &self.geometries {
            if !kinds.contains(&geometry.kind()) {
                kinds.push(geometry.kind());
            }
        }

        for kind in kinds {
            surface.save();
            for geometry in self.geometries.iter().filter(|g| g.kind() == kind) {
                geometry.draw(surface, view, self.style.as_ref());
            }
            surface.restore();
        }
    }

    pub fn to_plain_object(&self) -> serde_json::Value {
        json!({
            "name": self.name,
            "isVisible": self.visible,
            "style": self.style,
            "geometries": self.geometries.iter().map(Geometry::to_plain_object).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Line, Point, Polygon, Text};
    use crate::surface::{DisplayList, DrawCommand};
    use kurbo::Size;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn square(x: f64, y: f64, side: f64) -> Polygon {
        Polygon::new(vec![c(x, y), c(x + side, y), c(x + side, y + side), c(x, y + side)]).unwrap()
    }

    #[test]
    fn test_add_sets_layer_handle() {
        let mut layer = Layer::new("roads");
        let id = layer.add_geometry(Point::new(c(1.0, 1.0)));
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.geometry(0).unwrap().id(), id);
        assert_eq!(layer.geometry(0).unwrap().layer(), Some(layer.id()));
    }

    #[test]
    fn test_remove_clears_layer_handle() {
        let mut layer = Layer::new("roads");
        layer.add_geometry(Point::new(c(1.0, 1.0)));
        layer.geometry_mut(0).unwrap().set_selected(true);
        let removed = layer.remove_geometry(0).unwrap();
        assert!(removed.layer().is_none());
        assert!(!removed.is_selected());
        assert!(layer.is_empty());
        assert!(layer.remove_geometry(0).is_none());
    }

    #[test]
    fn test_aggregates() {
        let mut layer = Layer::new("mixed");
        layer.add_geometry(square(0.0, 0.0, 2.0));
        layer.add_geometry(Line::new(vec![c(0.0, 0.0), c(3.0, 4.0)]).unwrap());
        assert!((layer.total_area() - 4.0).abs() < 1e-12);
        assert!((layer.total_length() - 13.0).abs() < 1e-12);
        assert_eq!(layer.centroids().len(), 2);
    }

    #[test]
    fn test_center_is_mean_of_centroids() {
        let mut layer = Layer::new("points");
        layer.add_geometry(Point::new(c(0.0, 0.0)));
        layer.add_geometry(Point::new(c(4.0, 2.0)));
        assert_eq!(layer.center(), Some(c(2.0, 1.0)));
        assert!(Layer::new("empty").center().is_none());
    }

    #[test]
    fn test_scale_to_fit() {
        let mut layer = Layer::new("area");
        layer.add_geometry(square(0.0, 0.0, 10.0));
        assert!((layer.scale_to_fit(200.0, 100.0) - 10.0).abs() < 1e-12);

        assert!((Layer::new("empty").scale_to_fit(200.0, 100.0) - 1.0).abs() < f64::EPSILON);

        let mut single = Layer::new("single");
        single.add_geometry(Point::new(c(10.0, 10.0)));
        assert!((single.scale_to_fit(200.0, 100.0) - 1.0).abs() < f64::EPSILON);

        // A horizontal line only constrains the x axis.
        let mut flat = Layer::new("flat");
        flat.add_geometry(Line::new(vec![c(0.0, 5.0), c(50.0, 5.0)]).unwrap());
        assert!((flat.scale_to_fit(200.0, 100.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_hidden_layer_draws_nothing() {
        let mut layer = Layer::new("hidden");
        layer.add_geometry(Point::new(c(0.0, 0.0)));
        layer.change_visibility();
        assert!(!layer.is_visible());

        let view = ViewTransform::new(c(0.0, 0.0), Size::new(100.0, 100.0), 1.0);
        let mut list = DisplayList::new();
        layer.draw(&mut list, &view);
        assert!(list.is_empty());
    }

    #[test]
    fn test_draw_groups_by_kind() {
        let mut layer = Layer::new("mixed");
        layer.add_geometry(Point::new(c(0.0, 0.0)));
        layer.add_geometry(square(0.0, 0.0, 1.0));
        layer.add_geometry(Point::new(c(1.0, 1.0)));

        let view = ViewTransform::new(c(0.0, 0.0), Size::new(100.0, 100.0), 1.0);
        let mut list = DisplayList::new();
        layer.draw(&mut list, &view);

        // Both points are drawn before the polygon.
        let draws: Vec<&DrawCommand> = list
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill(..) | DrawCommand::Stroke(_)))
            .collect();
        assert_eq!(draws.len(), 4);
        assert!(matches!(draws[0], DrawCommand::Fill(_, peniko::Fill::NonZero)));
        assert!(matches!(draws[1], DrawCommand::Fill(_, peniko::Fill::NonZero)));
        assert!(matches!(draws[2], DrawCommand::Fill(_, peniko::Fill::EvenOdd)));
        assert_eq!(list.save_depth(), 0);
    }

    #[test]
    fn test_plain_object() {
        let mut layer = Layer::new("labels");
        layer.add_geometry(Text::new(c(0.0, 0.0), "here"));
        let value = layer.to_plain_object();
        assert_eq!(value["name"], "labels");
        assert_eq!(value["isVisible"], true);
        assert!(value["style"].is_null());
        assert_eq!(value["geometries"][0]["type"], "Text");
        assert_eq!(value["geometries"][0]["layer"], layer.id().to_string());
    }
}
