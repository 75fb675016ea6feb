//! Pointer and keyboard routing.
//!
//! Window events are first translated into platform-neutral [`InputEvent`]s
//! by [`WindowEventTranslator`], then fed to an [`InputRouter`] which updates
//! the held-key/drag [`InputState`], steers the [`CameraController`] and tells
//! the caller when a release qualifies as a click.

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::camera_controller::CameraController;

/// The movement a held key requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementRole {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
}

impl MovementRole {
    pub const ALL: [MovementRole; 4] = [
        MovementRole::Forward,
        MovementRole::Back,
        MovementRole::StrafeLeft,
        MovementRole::StrafeRight,
    ];

    /// WASD and the arrow keys both drive movement.
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => Some(MovementRole::Forward),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(MovementRole::Back),
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(MovementRole::StrafeLeft),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(MovementRole::StrafeRight),
            _ => None,
        }
    }
}

/// A platform-neutral input event in surface pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerPressed { button: MouseButton, position: Vec2 },
    PointerMoved { position: Vec2 },
    PointerReleased { button: MouseButton, position: Vec2 },
    /// The pointer left the interactive surface.
    PointerLeft,
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    Resized { width: u32, height: u32 },
    /// The surface lost keyboard focus; held keys will never see their key-up.
    FocusLost,
}

/// Held movement keys and the drag gesture in progress.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    held: HashSet<KeyCode>,
    dragging: bool,
    press_origin: Option<Vec2>,
    last_pointer: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` held. Returns false for keys with no movement role.
    pub fn press_key(&mut self, key: KeyCode) -> bool {
        if MovementRole::from_key(key).is_some() {
            self.held.insert(key);
            true
        } else {
            false
        }
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }

    /// True if any key mapped to `role` is held.
    pub fn is_held(&self, role: MovementRole) -> bool {
        self.held
            .iter()
            .any(|&key| MovementRole::from_key(key) == Some(role))
    }

    pub fn held_roles(&self) -> impl Iterator<Item = MovementRole> + '_ {
        MovementRole::ALL.into_iter().filter(|&role| self.is_held(role))
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn last_pointer(&self) -> Vec2 {
        self.last_pointer
    }

    /// No keys held, not dragging.
    pub fn reset(&mut self) {
        self.held.clear();
        self.dragging = false;
        self.press_origin = None;
    }
}

/// What the caller has to act on after an event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputOutcome {
    /// A click landed here; run a pick query at these coordinates.
    pub pick: Option<Vec2>,
    /// The surface changed size; resize render targets.
    pub resize: Option<(u32, u32)>,
}

/// Classifies pointer gestures and applies them to the camera.
#[derive(Clone, Debug)]
pub struct InputRouter {
    state: InputState,
    click_threshold: f32,
}

impl InputRouter {
    pub fn new(click_threshold: f32) -> Self {
        Self {
            state: InputState::default(),
            click_threshold,
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Apply one event. Only the primary (left) button takes part in look and click.
    pub fn handle(&mut self, event: InputEvent, camera: &mut CameraController) -> InputOutcome {
        let mut outcome = InputOutcome::default();

        match event {
            InputEvent::PointerPressed {
                button: MouseButton::Left,
                position,
            } => {
                if !self.state.dragging {
                    self.state.dragging = true;
                    self.state.press_origin = Some(position);
                    self.state.last_pointer = position;
                }
            }
            InputEvent::PointerMoved { position } => {
                if self.state.dragging {
                    if camera.is_free() {
                        let delta = position - self.state.last_pointer;
                        camera.look_by(delta.x, delta.y);
                    }
                    self.state.last_pointer = position;
                }
            }
            InputEvent::PointerReleased {
                button: MouseButton::Left,
                position,
            } => {
                if let Some(origin) = self.state.press_origin.take() {
                    let offset = (position - origin).abs();
                    let still = offset.x < self.click_threshold && offset.y < self.click_threshold;
                    if still && camera.is_free() {
                        outcome.pick = Some(position);
                    }
                }
                self.state.dragging = false;
            }
            InputEvent::PointerLeft | InputEvent::FocusLost => self.state.reset(),
            InputEvent::KeyDown(key) => {
                self.state.press_key(key);
            }
            InputEvent::KeyUp(key) => self.state.release_key(key),
            InputEvent::Resized { width, height } => {
                if width > 0 && height > 0 {
                    camera.set_aspect(width as f32 / height as f32);
                }
                outcome.resize = Some((width, height));
            }
            InputEvent::PointerPressed { .. } | InputEvent::PointerReleased { .. } => {}
        }

        outcome
    }
}

/// Turns winit window events into [`InputEvent`]s.
///
/// Mouse button events carry no position in winit, so the translator remembers
/// the last cursor position it saw.
#[derive(Clone, Debug, Default)]
pub struct WindowEventTranslator {
    cursor: Vec2,
}

impl WindowEventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                Some(InputEvent::PointerMoved {
                    position: self.cursor,
                })
            }
            WindowEvent::MouseInput { state, button, .. } => Some(match state {
                ElementState::Pressed => InputEvent::PointerPressed {
                    button: *button,
                    position: self.cursor,
                },
                ElementState::Released => InputEvent::PointerReleased {
                    button: *button,
                    position: self.cursor,
                },
            }),
            WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(key) => Some(match event.state {
                    ElementState::Pressed => InputEvent::KeyDown(key),
                    ElementState::Released => InputEvent::KeyUp(key),
                }),
                PhysicalKey::Unidentified(_) => None,
            },
            WindowEvent::Resized(size) => Some(InputEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::Focused(false) => Some(InputEvent::FocusLost),
            _ => None,
        }
    }
}
