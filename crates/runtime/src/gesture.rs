//! Hand-gesture interpretation.
//!
//! Landmark detection happens elsewhere; this module only turns fingertip
//! positions (camera-frame pixels) into [`InputEvent`]s:
//! - a "grip" is a hand whose thumb and index tips are pinched together
//! - one grip drags the map
//! - two grips zoom by moving apart or together

use foundation::math::Vec2;

use crate::input::InputEvent;

/// Fingertip positions of one tracked hand, in camera-frame pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HandLandmarks {
    pub thumb_tip: Vec2,
    pub index_tip: Vec2,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GestureConfig {
    /// Thumb/index distance below which a hand counts as gripping.
    pub grip_threshold_px: f64,
    /// Fraction of grip motion forwarded as pan.
    pub drag_smoothing: f64,
    /// Grip-distance change ignored between updates.
    pub zoom_deadband_px: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            grip_threshold_px: 40.0,
            drag_smoothing: 0.5,
            zoom_deadband_px: 5.0,
        }
    }
}

/// Grip point of a hand: the thumb/index midpoint when pinched.
pub fn grip_point(hand: &HandLandmarks, threshold_px: f64) -> Option<Vec2> {
    if hand.thumb_tip.distance(hand.index_tip) < threshold_px {
        Some(hand.thumb_tip.midpoint(hand.index_tip))
    } else {
        None
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
enum GestureState {
    #[default]
    Idle,
    Dragging {
        last: Vec2,
    },
    Pinching {
        distance: f64,
    },
}

/// Stateful gesture interpreter; feed it once per camera frame.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    config: GestureConfig,
    state: GestureState,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::Idle,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    /// Interpret the hands seen in one camera frame.
    pub fn update_hands(&mut self, hands: &[HandLandmarks]) -> Option<InputEvent> {
        let grips: Vec<Vec2> = hands
            .iter()
            .filter_map(|h| grip_point(h, self.config.grip_threshold_px))
            .collect();
        self.update(&grips)
    }

    /// Interpret the grip points seen in one camera frame.
    pub fn update(&mut self, grips: &[Vec2]) -> Option<InputEvent> {
        match grips {
            [current] => self.drag(*current),
            [a, b] => self.pinch(a.distance(*b)),
            _ => {
                self.state = GestureState::Idle;
                None
            }
        }
    }

    fn drag(&mut self, current: Vec2) -> Option<InputEvent> {
        let prev = match self.state {
            GestureState::Dragging { last } => Some(last),
            _ => None,
        };
        self.state = GestureState::Dragging { last: current };

        let prev = prev?;
        // Whole pixels only: sub-pixel jitter from the tracker is dropped.
        let dx = ((current.x - prev.x) * self.config.drag_smoothing).trunc();
        let dy = ((current.y - prev.y) * self.config.drag_smoothing).trunc();
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some(InputEvent::Pan { dx, dy })
    }

    /// One wheel tick per update: spreading the grips zooms out, closing
    /// them zooms in.
    fn pinch(&mut self, distance: f64) -> Option<InputEvent> {
        let prev = match self.state {
            GestureState::Pinching { distance } => Some(distance),
            _ => None,
        };
        self.state = GestureState::Pinching { distance };

        let delta = distance - prev?;
        if delta > self.config.zoom_deadband_px {
            Some(InputEvent::wheel(-1))
        } else if delta < -self.config.zoom_deadband_px {
            Some(InputEvent::wheel(1))
        } else {
            None
        }
    }
}
