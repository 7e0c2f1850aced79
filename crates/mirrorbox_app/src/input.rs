//! Translation of winit window events into scene [`InputEvent`]s.

use mirrorbox_core::{InputEvent, InputState, Key, MouseButton};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks held buttons and the cursor between events.
#[derive(Debug, Default)]
pub struct InputBridge {
    state: InputState,
}

impl InputBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the scene event for `event`, if it carries one.
    ///
    /// Button presses only update the held set; motion is tagged with the
    /// held button when exactly one is down.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CloseRequested => Some(InputEvent::Quit),
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(code) => key_release(code, event.state),
                PhysicalKey::Unidentified(_) => None,
            },
            WindowEvent::MouseInput { state, button, .. } => {
                self.button(*button, *state);
                None
            }
            WindowEvent::CursorMoved { position, .. } => self.state.cursor_moved(position.x, position.y),
            WindowEvent::CursorLeft { .. } => {
                self.state.cursor_left();
                None
            }
            _ => None,
        }
    }

    pub fn button(&mut self, button: winit::event::MouseButton, state: ElementState) {
        if let Some(button) = map_button(button) {
            self.state.update_mouse_button(button, state.is_pressed());
        }
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) -> Option<InputEvent> {
        self.state.cursor_moved(x, y)
    }
}

/// Only releases of the arrow keys reach the reducer.
pub fn key_release(code: KeyCode, state: ElementState) -> Option<InputEvent> {
    if state.is_pressed() {
        return None;
    }
    match code {
        KeyCode::ArrowLeft => Some(InputEvent::KeyReleased(Key::Left)),
        KeyCode::ArrowRight => Some(InputEvent::KeyReleased(Key::Right)),
        _ => None,
    }
}

pub fn map_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        _ => None,
    }
}
