//! Window-input reduction: key and mouse events folded into the
//! [`TransformState`] that drives the scene matrices.

use std::collections::HashSet;

use crate::transform::TransformState;

/// Rotation applied by one left/right arrow release, in turn fractions.
pub const KEY_ROTATION_STEP: f32 = 0.1;
/// Rotation applied by one horizontal drag event with the primary button.
pub const DRAG_ROTATION_STEP: f32 = 0.01;
/// Tilt applied by one vertical drag event with the secondary button.
pub const DRAG_TILT_STEP: f32 = 0.01;
/// Zoom applied by one vertical drag event with the middle button.
pub const DRAG_ZOOM_STEP: f32 = 0.05;

/// Keys the scene reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
}

/// Mouse buttons that can tag a motion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// One platform-neutral input event, as polled from the window layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The window asked to close.
    Quit,
    /// A key was released.
    KeyReleased(Key),
    /// The cursor moved by `(dx, dy)` pixels while `held` was the only
    /// button down (`None` when zero or several buttons are held).
    MouseMotion {
        held: Option<MouseButton>,
        dx: f32,
        dy: f32,
    },
}

/// Outcome of feeding one event to [`reduce`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reduction {
    /// Keep running with this state.
    Continue(TransformState),
    /// The loop should end.
    Quit,
}

impl Reduction {
    /// The state to carry on with, or `None` on quit.
    pub fn state(self) -> Option<TransformState> {
        match self {
            Reduction::Continue(state) => Some(state),
            Reduction::Quit => None,
        }
    }
}

/// Applies one event to `state`.
///
/// Each event updates at most one field.  Drag steps depend only on the
/// sign of the delta; a zero delta leaves the state untouched.
pub fn reduce(state: TransformState, event: &InputEvent) -> Reduction {
    match event {
        InputEvent::Quit => Reduction::Quit,
        other => Reduction::Continue(apply(state, other)),
    }
}

/// The state half of [`reduce`]; `Quit` leaves the state as it is.
pub fn apply(state: TransformState, event: &InputEvent) -> TransformState {
    match *event {
        InputEvent::Quit => state,
        InputEvent::KeyReleased(Key::Left) => state.rotated(-KEY_ROTATION_STEP),
        InputEvent::KeyReleased(Key::Right) => state.rotated(KEY_ROTATION_STEP),
        InputEvent::MouseMotion { held: None, .. } => state,
        InputEvent::MouseMotion { held: Some(button), dx, dy } => match button {
            // dolly: drag down widens the field of view
            MouseButton::Middle => match direction(dy) {
                Some(sign) => state.zoomed(sign * DRAG_ZOOM_STEP),
                None => state,
            },
            MouseButton::Left => match direction(dx) {
                Some(sign) => state.rotated(sign * DRAG_ROTATION_STEP),
                None => state,
            },
            // viewing angle: drag down tilts away from the viewer
            MouseButton::Right => match direction(dy) {
                Some(sign) => state.tilted(-sign * DRAG_TILT_STEP),
                None => state,
            },
        },
    }
}

fn direction(delta: f32) -> Option<f32> {
    if delta > 0.0 {
        Some(1.0)
    } else if delta < 0.0 {
        Some(-1.0)
    } else {
        None
    }
}

/// Held-button and cursor tracking that turns absolute window events into
/// [`InputEvent::MouseMotion`] deltas.
///
/// The window layer feeds button and cursor events in; the tracker answers
/// with the motion event (if any) to hand to [`reduce`].
#[derive(Debug, Default)]
pub struct InputState {
    buttons_down: HashSet<MouseButton>,
    cursor: Option<(f64, f64)>,
}

impl InputState {
    /// Creates a fresh, empty input state.
    pub fn new() -> Self {
        Default::default()
    }

    /// Called when a mouse button event arrives.
    pub fn update_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons_down.insert(button);
        } else {
            self.buttons_down.remove(&button);
        }
    }

    /// Returns true if the given mouse button is currently held.
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// The held button when exactly one is down.
    pub fn sole_button(&self) -> Option<MouseButton> {
        let mut held = self.buttons_down.iter();
        match (held.next(), held.next()) {
            (Some(&button), None) => Some(button),
            _ => None,
        }
    }

    /// Records a new cursor position and returns the motion since the last one.
    ///
    /// The first position after startup (or after the cursor left the
    /// window) only seeds the tracker.
    pub fn cursor_moved(&mut self, x: f64, y: f64) -> Option<InputEvent> {
        let previous = self.cursor.replace((x, y))?;
        let (dx, dy) = ((x - previous.0) as f32, (y - previous.1) as f32);
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some(InputEvent::MouseMotion { held: self.sole_button(), dx, dy })
    }

    /// Forgets the cursor position so the next move does not produce a jump.
    pub fn cursor_left(&mut self) {
        self.cursor = None;
    }
}
