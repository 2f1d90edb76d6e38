//! miniGIS Render Library
//!
//! The throttled render loop and drawing surface implementations.
//! The default surface renders into a Vello scene.

mod error;
pub mod frame;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use error::{RenderError, RenderResult};
pub use frame::{DEFAULT_FRAME_INTERVAL, FrameLoop, FrameScheduler, ManualScheduler};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloSurface;
