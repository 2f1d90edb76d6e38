//! Hit-testing and the geometry selection set.

use crate::geometry::Coordinate;
use crate::input::Modifiers;
use crate::map::{GeometryRef, Map};
use std::collections::HashSet;

/// How a pointer press changes the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectMode {
    Add,
    Replace,
}

/// Selection behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Treat an unmodified click like a Ctrl/Cmd click.
    pub plain_click_selects: bool,
}

/// Find the geometry under a screen point.
///
/// Layers are scanned from the top (index 0) down and, within a layer, from the
/// most recently added geometry back. Hidden layers are skipped and only
/// points, lines and polygons take part. The first hit wins.
pub fn hit_test(map: &Map, screen: Coordinate) -> Option<GeometryRef> {
    let world = map.screen_to_world(screen);
    map.layers()
        .iter()
        .filter(|layer| layer.is_visible())
        .find_map(|layer| {
            layer
                .geometries()
                .iter()
                .rev()
                .filter(|g| g.is_hit_testable())
                .find(|g| g.contains_point(world, layer.style(), Some(map.view())))
                .map(|g| GeometryRef::new(layer.id(), g.id()))
        })
}

/// The set of selected geometries, mirrored into each geometry's flag.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: Vec<GeometryRef>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected geometries in selection order.
    pub fn items(&self) -> &[GeometryRef] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, target: GeometryRef) -> bool {
        self.selected.contains(&target)
    }

    /// Update the selection for a pointer press at `screen`.
    ///
    /// Ctrl/Cmd+Shift adds the hit geometry, Ctrl/Cmd replaces the selection
    /// with it. A miss changes nothing, and so does an unmodified click unless
    /// the policy says otherwise. Returns whether the selection changed.
    pub fn pointer_down(
        &mut self,
        map: &mut Map,
        screen: Coordinate,
        modifiers: Modifiers,
        policy: SelectionPolicy,
    ) -> bool {
        self.prune(map);
        let mode = if modifiers.command() && modifiers.shift {
            SelectMode::Add
        } else if modifiers.command() || policy.plain_click_selects {
            SelectMode::Replace
        } else {
            return false;
        };

        let Some(hit) = hit_test(map, screen) else {
            return false;
        };

        let next = match mode {
            SelectMode::Add if self.contains(hit) => return false,
            SelectMode::Add => {
                let mut next = self.selected.clone();
                next.push(hit);
                next
            }
            SelectMode::Replace => vec![hit],
        };
        self.apply(map, next);
        true
    }

    /// Deselect everything.
    pub fn clear(&mut self, map: &mut Map) {
        self.prune(map);
        self.apply(map, Vec::new());
    }

    /// Drop entries whose geometry no longer exists in the map.
    pub fn prune(&mut self, map: &Map) {
        self.selected.retain(|r| map.geometry(*r).is_some());
    }

    /// Switch to `next`, touching only the flags that change, then notify.
    fn apply(&mut self, map: &mut Map, next: Vec<GeometryRef>) {
        let old: HashSet<GeometryRef> = self.selected.iter().copied().collect();
        let new: HashSet<GeometryRef> = next.iter().copied().collect();

        for target in old.difference(&new) {
            map.set_selected(*target, false);
        }
        for target in new.difference(&old) {
            map.set_selected(*target, true);
        }

        self.selected = next;
        map.notify_selection();
    }
}
