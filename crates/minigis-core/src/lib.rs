//! miniGIS Core Library
//!
//! Platform-agnostic geometry, styling, layer and viewport logic for the
//! miniGIS map viewer.

pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ingest;
pub mod input;
pub mod interaction;
pub mod layer;
pub mod map;
pub mod selection;
pub mod style;
pub mod surface;
pub mod viewport;

pub use clock::{Clock, ManualClock, SystemClock, Throttle};
pub use config::ViewerConfig;
pub use error::{MapError, MapResult};
pub use geometry::{Coordinate, Geometry, GeometryId, GeometryKind, GeometryTrait, Line, Multiline, Point, Polygon, Text};
pub use input::{InputState, Modifiers, MouseButton, PointerEvent};
pub use interaction::MapInteraction;
pub use layer::{Layer, LayerId};
pub use map::{GeometryRef, Map, MapEvent, MapId, SubscriptionId};
pub use selection::{Selection, SelectionPolicy, hit_test};
pub use style::{EffectiveStyle, FontStyle, LayerStyle, LineDash, LineStyle, PointStyle, PolygonStyle, Rgba};
pub use surface::{DisplayList, DrawCommand, PaintStack, PaintState, Surface};
pub use viewport::ViewTransform;
