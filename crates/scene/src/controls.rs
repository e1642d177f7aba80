use runtime::InputEvent;

use crate::viewport::ViewportState;

/// Apply one input event; returns whether the view changed.
pub fn apply_input(viewport: &mut ViewportState, event: &InputEvent) -> bool {
    match *event {
        InputEvent::Pan { dx, dy } => viewport.pan_by_pixels(dx, dy),
        InputEvent::Zoom { factor } => viewport.zoom_by(factor),
        InputEvent::ZoomAt { x, y, factor } => viewport.zoom_at(x, y, factor),
        InputEvent::Wheel { ticks } => viewport.wheel(ticks),
        InputEvent::WheelAt { x, y, ticks } => viewport.wheel_at(x, y, ticks),
        InputEvent::Resize { width, height } => viewport.resize(width, height),
    }
}

/// Apply events in order; returns how many changed the view.
pub fn apply_all<'a, I>(viewport: &mut ViewportState, events: I) -> usize
where
    I: IntoIterator<Item = &'a InputEvent>,
{
    events
        .into_iter()
        .filter(|e| apply_input(viewport, e))
        .count()
}
