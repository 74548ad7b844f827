//! Window input reduced to the gestures the tour reacts to.

use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::context::{MouseButtonState, MouseState};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Positive `delta_y` moves forward along the path, like scrolling a page down.
    Scroll { delta_y: f64 },
    DragStart { x: f64, y: f64 },
    DragMove { x: f64, y: f64 },
    DragEnd,
    Resize { width: u32, height: u32 },
}

/// Turns winit window events into [`InputEvent`]s.
#[derive(Debug, Default)]
pub struct InputTranslator {
    mouse: MouseState,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mouse(&self) -> &MouseState {
        &self.mouse
    }

    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports wheel-away-from-user as positive
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -(*y as f64),
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => -*y,
                };
                (delta_y != 0.0).then_some(InputEvent::Scroll { delta_y })
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.coords = *position;
                match self.mouse.pressed {
                    MouseButtonState::Left => Some(InputEvent::DragMove {
                        x: position.x,
                        y: position.y,
                    }),
                    _ => None,
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match (state, self.mouse.pressed) {
                (ElementState::Pressed, MouseButtonState::Left) => None,
                (ElementState::Pressed, _) => {
                    self.mouse.pressed = MouseButtonState::Left;
                    Some(InputEvent::DragStart {
                        x: self.mouse.coords.x,
                        y: self.mouse.coords.y,
                    })
                }
                (ElementState::Released, MouseButtonState::Left) => self.release(),
                (ElementState::Released, _) => None,
            },
            WindowEvent::CursorLeft { .. } => match self.mouse.pressed {
                MouseButtonState::Left => self.release(),
                _ => None,
            },
            WindowEvent::Resized(size) => Some(InputEvent::Resize {
                width: size.width,
                height: size.height,
            }),
            _ => None,
        }
    }

    fn release(&mut self) -> Option<InputEvent> {
        self.mouse.pressed = MouseButtonState::None;
        Some(InputEvent::DragEnd)
    }
}
