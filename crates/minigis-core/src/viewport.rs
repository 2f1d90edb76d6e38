//! World/screen transform for pan and zoom.

use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// The uniform world-to-screen mapping of one map view.
///
/// World space is Y-up; screen space is Y-down with the origin at the top-left
/// corner of a surface of `size` pixels. `center` is the world point shown at
/// the middle of the surface and `scale` is screen pixels per world unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// World point at the middle of the surface.
    pub center: Point,
    /// Screen pixels per world unit. Always positive.
    pub scale: f64,
    /// Surface size in pixels.
    pub size: Size,
}

impl ViewTransform {
    pub fn new(center: Point, size: Size, scale: f64) -> Self {
        Self { center, scale, size }
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            (world.x - self.center.x) * self.scale + self.size.width / 2.0,
            self.size.height / 2.0 - (world.y - self.center.y) * self.scale,
        )
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.size.width / 2.0) / self.scale + self.center.x,
            self.center.y - (screen.y - self.size.height / 2.0) / self.scale,
        )
    }

    /// Convert a screen-space length to world units.
    pub fn screen_to_world_distance(&self, pixels: f64) -> f64 {
        pixels / self.scale
    }

    /// Translate the center by a world-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.center += delta;
    }
}
