use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

/// Default multiplicative zoom per wheel tick.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

/// A discrete view-control request.
///
/// Pixel deltas follow screen conventions (`+x` right, `+y` down). Zoom
/// factors are multiplicative: `> 1` zooms in, `< 1` zooms out. Wheel ticks
/// are left unresolved; the consumer turns them into a factor with its own
/// zoom step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    Pan { dx: f64, dy: f64 },
    Zoom { factor: f64 },
    /// Zoom keeping the sky position under `(x, y)` fixed.
    ZoomAt { x: f64, y: f64, factor: f64 },
    /// Wheel clicks; positive ticks zoom in.
    Wheel { ticks: i32 },
    /// Wheel clicks anchored at the cursor.
    WheelAt { x: f64, y: f64, ticks: i32 },
    Resize { width: f64, height: f64 },
}

impl InputEvent {
    pub fn wheel(ticks: i32) -> Self {
        InputEvent::Wheel { ticks }
    }

    pub fn wheel_at(x: f64, y: f64, ticks: i32) -> Self {
        InputEvent::WheelAt { x, y, ticks }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InputEvent::Pan { .. } => "pan",
            InputEvent::Zoom { .. } => "zoom",
            InputEvent::ZoomAt { .. } => "zoom_at",
            InputEvent::Wheel { .. } => "wheel",
            InputEvent::WheelAt { .. } => "wheel_at",
            InputEvent::Resize { .. } => "resize",
        }
    }
}

/// FIFO of input events shared between producers and the main loop.
///
/// Cloning yields another handle to the same queue, so a gesture-tracking
/// thread can push while the main loop drains. The viewport itself is never
/// shared: the main loop is the only mutator.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    events: Arc<Mutex<VecDeque<InputEvent>>>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: InputEvent) {
        tracing::trace!(kind = event.kind(), "input event queued");
        self.events.lock().push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Take every queued event in arrival order.
    pub fn drain(&self) -> Vec<InputEvent> {
        self.events.lock().drain(..).collect()
    }
}
