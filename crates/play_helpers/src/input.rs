use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// A press or release of the left mouse button or of a finger, in window
/// coordinates (origin top-left, `y` pointing down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed { position: Vec2, kind: PointerKind },
    Released { position: Vec2, kind: PointerKind },
}

/// Collects this frame's pointer presses and releases.
///
/// Mouse events need the cursor inside `window`; touch events carry their own
/// position. Only the first finger of a multi-touch is reported.
pub fn pointer_events(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    window: Option<&Window>,
) -> Vec<PointerEvent> {
    let mut events = Vec::new();
    let cursor = window.and_then(Window::cursor_position);

    if let Some(position) = cursor {
        if button_input.just_pressed(MouseButton::Left) {
            events.push(PointerEvent::Pressed {
                position,
                kind: PointerKind::Mouse,
            });
        }
        if button_input.just_released(MouseButton::Left) {
            events.push(PointerEvent::Released {
                position,
                kind: PointerKind::Mouse,
            });
        }
    }

    if let Some(touch) = touch_input.iter_just_pressed().next() {
        events.push(PointerEvent::Pressed {
            position: touch.position(),
            kind: PointerKind::Touch,
        });
    }
    if let Some(touch) = touch_input.iter_just_released().next() {
        events.push(PointerEvent::Released {
            position: touch.position(),
            kind: PointerKind::Touch,
        });
    }

    events
}
