//! Map: the view transform, the layer stack and change notifications.

use crate::error::{MapError, MapResult};
use crate::geometry::{Coordinate, Geometry, GeometryId};
use crate::layer::{Layer, LayerId};
use crate::style::LayerStyle;
use crate::surface::Surface;
use crate::viewport::ViewTransform;
use kurbo::{Size, Vec2};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for maps.
pub type MapId = Uuid;

/// Handle returned by [`Map::add_observer`].
pub type SubscriptionId = u64;

/// Names one geometry inside a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryRef {
    pub layer: LayerId,
    pub geometry: GeometryId,
}

impl GeometryRef {
    pub fn new(layer: LayerId, geometry: GeometryId) -> Self {
        Self { layer, geometry }
    }
}

/// Change notifications emitted by a map.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The scale changed; carries the new scale.
    Scale(f64),
    /// Layers were added, removed, reordered or edited.
    ChangeLayers,
    /// The view center moved.
    Moved { center: Coordinate },
    /// The selection changed; carries the number of selected geometries.
    Selection { count: usize },
}

type Observer = Box<dyn FnMut(&MapEvent)>;

/// Observer registry. Delivery is synchronous and in registration order.
#[derive(Default)]
struct Observers {
    next_id: SubscriptionId,
    entries: Vec<(SubscriptionId, Observer)>,
}

impl Observers {
    fn add(&mut self, observer: Observer) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    fn emit(&mut self, event: &MapEvent) {
        for (_, observer) in &mut self.entries {
            observer(event);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers").field("count", &self.entries.len()).finish()
    }
}

/// A map view over an ordered stack of layers.
///
/// Index 0 is the topmost layer: it is hit-tested first and painted last.
#[derive(Debug)]
pub struct Map {
    id: MapId,
    view: ViewTransform,
    layers: Vec<Layer>,
    observers: Observers,
}

impl Map {
    /// Create an empty map for a `width` x `height` surface, centered on the origin at scale 1.
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_view(ViewTransform::new(Coordinate::ZERO, Size::new(width, height), 1.0))
    }

    pub fn with_view(view: ViewTransform) -> Self {
        Self {
            id: Uuid::new_v4(),
            view,
            layers: Vec::new(),
            observers: Observers::default(),
        }
    }

    pub fn id(&self) -> MapId {
        self.id
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn scale(&self) -> f64 {
        self.view.scale
    }

    pub fn center(&self) -> Coordinate {
        self.view.center
    }

    pub fn world_to_screen(&self, world: Coordinate) -> Coordinate {
        self.view.world_to_screen(world)
    }

    pub fn screen_to_world(&self, screen: Coordinate) -> Coordinate {
        self.view.screen_to_world(screen)
    }

    // --- Layer stack ---

    /// Insert a layer on top of the stack.
    ///
    /// When the layer has a center, the view is re-centered on it and rescaled
    /// to fit the layer.
    pub fn add_layer(&mut self, mut layer: Layer) -> LayerId {
        layer.set_map(Some(self.id));
        if let Some(center) = layer.center() {
            self.view.center = center;
            self.view.scale = layer.scale_to_fit(self.view.size.width, self.view.size.height);
        }
        let id = layer.id();
        log::debug!("adding layer '{}' ({} geometries)", layer.name, layer.len());
        self.layers.insert(0, layer);
        self.emit(MapEvent::ChangeLayers);
        id
    }

    /// Remove a layer by id.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.layer_index(id)?;
        let mut layer = self.layers.remove(index);
        layer.set_map(None);
        self.emit(MapEvent::ChangeLayers);
        Some(layer)
    }

    /// Move the layer at `old_index` to `new_index`.
    pub fn move_layer(&mut self, old_index: usize, new_index: usize) -> MapResult<()> {
        let len = self.layers.len();
        for index in [old_index, new_index] {
            if index >= len {
                log::warn!("move_layer rejected: index {index} out of range for {len} layers");
                return Err(MapError::OutOfRange { index, len });
            }
        }
        let layer = self.layers.remove(old_index);
        self.layers.insert(new_index, layer);
        log::debug!("moved layer {old_index} -> {new_index}");
        self.emit(MapEvent::ChangeLayers);
        Ok(())
    }

    /// Move the `active` layer to the position currently held by `over`.
    pub fn move_layer_to(&mut self, active: LayerId, over: LayerId) -> MapResult<()> {
        if active == over {
            return Ok(());
        }
        let from = self.layer_index(active).ok_or(MapError::LayerNotFound(active))?;
        let to = self.layer_index(over).ok_or(MapError::LayerNotFound(over))?;
        self.move_layer(from, to)
    }

    // --- View ---

    /// Translate the view center by a world-space delta.
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.view.pan(Vec2::new(dx, dy));
        self.emit(MapEvent::Moved {
            center: self.view.center,
        });
    }

    /// Multiply the scale by `factor`.
    pub fn zoom(&mut self, factor: f64) -> MapResult<()> {
        let scale = self.view.scale * factor;
        if !factor.is_finite() || factor <= 0.0 || !scale.is_finite() || scale <= 0.0 {
            log::warn!("zoom rejected: factor {factor}");
            return Err(MapError::InvalidScale(factor));
        }
        self.view.scale = scale;
        self.emit(MapEvent::Scale(scale));
        Ok(())
    }

    /// Change the surface size. The center stays put.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.view.size = Size::new(width, height);
        self.emit(MapEvent::Moved {
            center: self.view.center,
        });
    }

    // --- Layer edits that notify ---

    pub fn add_geometry(&mut self, layer: LayerId, geometry: impl Into<Geometry>) -> MapResult<GeometryId> {
        let id = self.layer_mut(layer)?.add_geometry(geometry);
        self.emit(MapEvent::ChangeLayers);
        Ok(id)
    }

    pub fn remove_geometry(&mut self, layer: LayerId, index: usize) -> MapResult<Option<Geometry>> {
        let was_selected = self
            .layer(layer)
            .and_then(|l| l.geometry(index))
            .is_some_and(Geometry::is_selected);
        let removed = self.layer_mut(layer)?.remove_geometry(index);
        if removed.is_some() {
            self.emit(MapEvent::ChangeLayers);
            if was_selected {
                self.notify_selection();
            }
        }
        Ok(removed)
    }

    pub fn set_layer_style(&mut self, layer: LayerId, style: Option<LayerStyle>) -> MapResult<()> {
        self.layer_mut(layer)?.set_style(style);
        self.emit(MapEvent::ChangeLayers);
        Ok(())
    }

    /// Toggle a layer's visibility and return the new state.
    pub fn toggle_layer_visibility(&mut self, layer: LayerId) -> MapResult<bool> {
        let target = self.layer_mut(layer)?;
        target.change_visibility();
        let visible = target.is_visible();
        self.emit(MapEvent::ChangeLayers);
        Ok(visible)
    }

    // --- Selection flags ---

    /// Set the selection flag of one geometry. Returns false when it does not exist.
    ///
    /// Does not notify; call [`Map::notify_selection`] once a batch of changes is done.
    pub fn set_selected(&mut self, target: GeometryRef, selected: bool) -> bool {
        match self.geometry_mut(target) {
            Some(geometry) => {
                geometry.set_selected(selected);
                true
            }
            None => false,
        }
    }

    /// All currently selected geometries, top layer first.
    pub fn selected(&self) -> Vec<GeometryRef> {
        self.layers
            .iter()
            .flat_map(|layer| {
                layer
                    .geometries()
                    .iter()
                    .filter(|g| g.is_selected())
                    .map(move |g| GeometryRef::new(layer.id(), g.id()))
            })
            .collect()
    }

    /// Emit a [`MapEvent::Selection`] with the current selection count.
    pub fn notify_selection(&mut self) {
        let count = self.selected().len();
        self.emit(MapEvent::Selection { count });
    }

    // --- Lookup ---

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn layer_at(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    pub fn geometry(&self, target: GeometryRef) -> Option<&Geometry> {
        self.layer(target.layer)?.find(target.geometry)
    }

    fn geometry_mut(&mut self, target: GeometryRef) -> Option<&mut Geometry> {
        self.layers
            .iter_mut()
            .find(|l| l.id() == target.layer)?
            .find_mut(target.geometry)
    }

    fn layer_mut(&mut self, id: LayerId) -> MapResult<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| l.id() == id)
            .ok_or(MapError::LayerNotFound(id))
    }

    // --- Drawing ---

    /// Draw all visible layers, bottom (last index) first.
    pub fn draw(&self, surface: &mut dyn Surface) {
        for layer in self.layers.iter().rev() {
            layer.draw(surface, &self.view);
        }
    }

    // --- Observers ---

    /// Register a callback for map events.
    pub fn add_observer(&mut self, observer: impl FnMut(&MapEvent) + 'static) -> SubscriptionId {
        self.observers.add(Box::new(observer))
    }

    /// Unregister a callback. Returns false when the id is unknown.
    pub fn remove_observer(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    fn emit(&mut self, event: MapEvent) {
        self.observers.emit(&event);
    }
}
