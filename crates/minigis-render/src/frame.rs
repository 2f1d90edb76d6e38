//! Throttled, dirty-flag driven render loop.
//!
//! The loop keeps an off-screen [`DisplayList`] and only recomposes it when a
//! map event has marked it dirty and the throttle window has passed. Every
//! tick blits the buffer onto the visible surface, whether or not it was
//! recomposed.

use minigis_core::clock::{Clock, Throttle};
use minigis_core::config::ViewerConfig;
use minigis_core::map::{Map, SubscriptionId};
use minigis_core::surface::{DisplayList, Surface};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Minimum time between two recomposes unless configured otherwise.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Source of display frames, in the manner of `requestAnimationFrame`.
pub trait FrameScheduler {
    /// Arm the first frame.
    fn start(&mut self);

    /// Consume the pending frame, if any, and re-arm the next one while running.
    fn on_frame(&mut self) -> bool;

    /// Stop and withdraw the pending frame.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// A scheduler driven by the caller. Every call to `on_frame` is a display frame.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    running: bool,
    pending: bool,
    frames: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames delivered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }
}

impl FrameScheduler for ManualScheduler {
    fn start(&mut self) {
        self.running = true;
        self.pending = true;
    }

    fn on_frame(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.frames += 1;
        self.pending = self.running;
        true
    }

    fn stop(&mut self) {
        self.running = false;
        self.pending = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Render loop state for one map view.
pub struct FrameLoop {
    dirty: Rc<Cell<bool>>,
    buffer: DisplayList,
    throttle: Throttle,
    clock: Box<dyn Clock>,
    subscription: Option<SubscriptionId>,
    recomposes: u64,
}

impl FrameLoop {
    pub fn new(interval: Duration, clock: impl Clock + 'static) -> Self {
        Self {
            dirty: Rc::new(Cell::new(true)),
            buffer: DisplayList::new(),
            throttle: Throttle::new(interval),
            clock: Box::new(clock),
            subscription: None,
            recomposes: 0,
        }
    }

    pub fn from_config(config: &ViewerConfig, clock: impl Clock + 'static) -> Self {
        Self::new(config.throttle_interval(), clock)
    }

    /// Subscribe to `map` so every map event requests a redraw.
    pub fn attach(&mut self, map: &mut Map) {
        self.detach(map);
        let dirty = Rc::clone(&self.dirty);
        self.subscription = Some(map.add_observer(move |event| {
            log::trace!("redraw requested by {event:?}");
            dirty.set(true);
        }));
        self.dirty.set(true);
    }

    /// Drop the subscription made by [`FrameLoop::attach`].
    pub fn detach(&mut self, map: &mut Map) {
        if let Some(id) = self.subscription.take() {
            map.remove_observer(id);
        }
    }

    pub fn request_redraw(&self) {
        self.dirty.set(true);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// The off-screen buffer as last composed.
    pub fn buffer(&self) -> &DisplayList {
        &self.buffer
    }

    /// Number of times the buffer has been recomposed.
    pub fn recomposes(&self) -> u64 {
        self.recomposes
    }

    /// Run one frame. Returns whether the buffer was recomposed.
    ///
    /// A redraw requested inside the throttle window stays pending until a
    /// later tick.
    pub fn tick(&mut self, map: &Map, surface: &mut dyn Surface) -> bool {
        let recomposed = self.dirty.get() && self.throttle.try_fire(self.clock.now());
        if recomposed {
            self.buffer.clear();
            map.draw(&mut self.buffer);
            self.dirty.set(false);
            self.recomposes += 1;
            log::debug!(
                "recomposed {} layers into {} commands",
                map.layers().len(),
                self.buffer.len()
            );
        }

        surface.clear();
        self.buffer.replay(surface);
        recomposed
    }

    /// Run a frame if the scheduler has one due.
    pub fn frame(&mut self, scheduler: &mut dyn FrameScheduler, map: &Map, surface: &mut dyn Surface) -> bool {
        if !scheduler.on_frame() {
            return false;
        }
        self.tick(map, surface);
        true
    }
}
