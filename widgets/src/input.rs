use ivory_keyboard::{PointerEvent, PointerId, PointerPhase};
use sdl2::{event::Event, mouse::MouseButton};

/// The `which` field of mouse events that SDL synthesized from touches
const TOUCH_MOUSE_ID: u32 = u32::MAX;

/// The mouse counts as a single pointer that can't collide with any finger
pub const MOUSE_POINTER: PointerId = PointerId(1 << 63);

fn finger_pointer(finger_id: i64) -> PointerId {
    PointerId(finger_id as u64 & !MOUSE_POINTER.0)
}

fn scale(drawable_px: u32, window_px: u32) -> f64 {
    if window_px == 0 {
        1.0
    } else {
        drawable_px as f64 / window_px as f64
    }
}

/// Translates an SDL event into a pointer event for the keyboard, in drawable pixels. Mouse
/// positions are in window coordinates, which differ from drawable pixels on high DPI displays.
/// Finger positions are normalized by SDL. Returns `None` for events which don't concern
/// pointers.
pub fn pointer_event(
    event: &Event,
    (width_px, height_px): (u32, u32),
    (window_width, window_height): (u32, u32),
) -> Option<PointerEvent> {
    let scale_x = scale(width_px, window_width);
    let scale_y = scale(height_px, window_height);
    let mouse = |phase, x: i32, y: i32| {
        PointerEvent::new(
            MOUSE_POINTER,
            phase,
            x as f64 * scale_x,
            y as f64 * scale_y,
        )
    };
    let finger = |phase, finger_id, x: f32, y: f32| {
        PointerEvent::new(
            finger_pointer(finger_id),
            phase,
            x as f64 * width_px as f64,
            y as f64 * height_px as f64,
        )
    };
    let pointer_event = match *event {
        Event::MouseButtonDown {
            which,
            mouse_btn: MouseButton::Left,
            x,
            y,
            ..
        } if which != TOUCH_MOUSE_ID => mouse(PointerPhase::Down, x, y),
        Event::MouseMotion { which, x, y, .. } if which != TOUCH_MOUSE_ID => {
            mouse(PointerPhase::Move, x, y)
        }
        Event::MouseButtonUp {
            which,
            mouse_btn: MouseButton::Left,
            x,
            y,
            ..
        } if which != TOUCH_MOUSE_ID => mouse(PointerPhase::Up, x, y),
        Event::FingerDown {
            finger_id, x, y, ..
        } => finger(PointerPhase::Down, finger_id, x, y),
        Event::FingerMotion {
            finger_id, x, y, ..
        } => finger(PointerPhase::Move, finger_id, x, y),
        Event::FingerUp {
            finger_id, x, y, ..
        } => finger(PointerPhase::Up, finger_id, x, y),
        _ => return None,
    };
    Some(pointer_event)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn left_mouse_button_is_a_pointer() {
        let event = Event::MouseButtonDown {
            timestamp: 0,
            window_id: 0,
            which: 0,
            mouse_btn: MouseButton::Left,
            clicks: 1,
            x: 10,
            y: 20,
        };
        assert_eq!(
            pointer_event(&event, (640, 480), (640, 480)),
            Some(PointerEvent::new(
                MOUSE_POINTER,
                PointerPhase::Down,
                10.0,
                20.0
            ))
        );
        let right = Event::MouseButtonDown {
            timestamp: 0,
            window_id: 0,
            which: 0,
            mouse_btn: MouseButton::Right,
            clicks: 1,
            x: 10,
            y: 20,
        };
        assert_eq!(pointer_event(&right, (640, 480), (640, 480)), None);
    }

    #[test]
    fn mouse_events_from_touches_are_ignored() {
        let event = Event::MouseButtonUp {
            timestamp: 0,
            window_id: 0,
            which: TOUCH_MOUSE_ID,
            mouse_btn: MouseButton::Left,
            clicks: 1,
            x: 10,
            y: 20,
        };
        assert_eq!(pointer_event(&event, (640, 480), (640, 480)), None);
    }

    #[test]
    fn mouse_is_scaled_to_drawable_pixels() {
        let event = Event::MouseMotion {
            timestamp: 0,
            window_id: 0,
            which: 0,
            mousestate: sdl2::mouse::MouseState::from_sdl_state(0),
            x: 10,
            y: 20,
            xrel: 0,
            yrel: 0,
        };
        let pointer_event =
            pointer_event(&event, (1280, 960), (640, 480)).unwrap();
        assert_eq!(pointer_event.phase, PointerPhase::Move);
        assert_eq!(pointer_event.position.x, 20.0);
        assert_eq!(pointer_event.position.y, 40.0);
    }

    #[test]
    fn fingers_are_scaled_to_the_view() {
        let event = Event::FingerDown {
            timestamp: 0,
            touch_id: 1,
            finger_id: 7,
            x: 0.5,
            y: 0.25,
            dx: 0.0,
            dy: 0.0,
            pressure: 1.0,
        };
        let pointer_event =
            pointer_event(&event, (1280, 960), (640, 480)).unwrap();
        assert_eq!(pointer_event.pointer, PointerId(7));
        assert_ne!(pointer_event.pointer, MOUSE_POINTER);
        assert_eq!(pointer_event.position.x, 640.0);
        assert_eq!(pointer_event.position.y, 240.0);
    }
}
