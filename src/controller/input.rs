/// Platform-agnostic input handling system
use std::collections::{HashSet, VecDeque};

use crate::model::{Direction, SceneId};

/// Keys the application reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    E,
    Q,
    Space,
    Digit1,
    Digit2,
    Digit3,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyPressed(Key),
    KeyReleased(Key),
    MouseButtonPressed(MouseButton),
    MouseButtonReleased(MouseButton),
    /// Raw pointer motion in pixels, y grows downwards
    MouseMoved { dx: f32, dy: f32 },
    FocusLost,
}

/// Cursor behaviour requested from the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Hidden and grabbed, mouse motion drives the camera
    Captured,
    /// Visible and free, mouse drives the UI
    Free,
}

/// Events collected by the window layer, drained once per frame
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

pub struct InputState {
    pub pressed_keys: HashSet<Key>,
    pub pressed_buttons: HashSet<MouseButton>,
    pub look_delta: (f32, f32),
    /// While set, the menu toggle cannot fire. Cleared by a release of the toggle button.
    pub menu_lock: bool,
    /// `true` = free cursor, `false` = captured cursor
    pub menu_mode_on: bool,
    pub close_requested: bool,
    menu_button: MouseButton,
    quit_key: Key,
}

impl InputState {
    pub fn new(bindings: &KeyBindings) -> Self {
        Self {
            pressed_keys: HashSet::new(),
            pressed_buttons: HashSet::new(),
            look_delta: (0.0, 0.0),
            menu_lock: true,
            menu_mode_on: false,
            close_requested: false,
            menu_button: bindings.menu_toggle,
            quit_key: bindings.quit,
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyPressed(key) => {
                if *key == self.quit_key {
                    self.close_requested = true;
                }
                self.pressed_keys.insert(*key);
            }
            InputEvent::KeyReleased(key) => {
                self.pressed_keys.remove(key);
            }
            InputEvent::MouseButtonPressed(button) => {
                self.pressed_buttons.insert(*button);
            }
            InputEvent::MouseButtonReleased(button) => {
                self.pressed_buttons.remove(button);
                if *button == self.menu_button {
                    self.menu_lock = false;
                }
            }
            InputEvent::MouseMoved { dx, dy } => {
                // Look input is dropped while the cursor is free
                if !self.menu_mode_on {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::FocusLost => {
                self.clear_keys();
            }
        }
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
        self.pressed_buttons.clear();
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }

    /// Fire the menu toggle if a release armed it, then re-lock.
    /// Returns the cursor mode to switch to.
    pub fn take_menu_toggle(&mut self) -> Option<CursorMode> {
        if self.menu_lock {
            return None;
        }
        self.menu_lock = true;
        self.menu_mode_on = !self.menu_mode_on;
        Some(self.cursor_mode())
    }

    pub fn cursor_mode(&self) -> CursorMode {
        if self.menu_mode_on {
            CursorMode::Free
        } else {
            CursorMode::Captured
        }
    }
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: Key,
    pub backward: Key,
    pub left: Key,
    pub right: Key,
    pub up: Key,
    pub down: Key,
    pub bounce: Key,
    pub scene_1: Key,
    pub scene_2: Key,
    pub scene_3: Key,
    pub quit: Key,
    pub menu_toggle: MouseButton,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: Key::W,
            backward: Key::S,
            left: Key::A,
            right: Key::D,
            up: Key::E,
            down: Key::Q,
            bounce: Key::Space,
            scene_1: Key::Digit1,
            scene_2: Key::Digit2,
            scene_3: Key::Digit3,
            quit: Key::Escape,
            menu_toggle: MouseButton::Right,
        }
    }
}

/// High-level input processor
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    /// Every direction whose key is held. Directions are independent, so
    /// opposite keys may both be reported.
    pub fn held_directions(&self, input: &InputState) -> Vec<Direction> {
        let b = &self.bindings;
        [
            (b.forward, Direction::Forward),
            (b.backward, Direction::Backward),
            (b.left, Direction::Left),
            (b.right, Direction::Right),
            (b.up, Direction::Up),
            (b.down, Direction::Down),
        ]
        .into_iter()
        .filter(|(key, _)| input.is_key_pressed(*key))
        .map(|(_, dir)| dir)
        .collect()
    }

    pub fn is_bouncing(&self, input: &InputState) -> bool {
        input.is_key_pressed(self.bindings.bounce)
    }

    /// Scene for the held digit keys. Scene 1 is checked on its own; scenes 2
    /// and 3 are checked afterwards with 2 first, so either overrides 1 and 2
    /// wins over 3.
    pub fn select_scene(&self, input: &InputState, current: SceneId) -> SceneId {
        let mut scene = current;
        if input.is_key_pressed(self.bindings.scene_1) {
            scene = SceneId::BouncyBalls;
        }
        if input.is_key_pressed(self.bindings.scene_2) {
            scene = SceneId::Fractal;
        } else if input.is_key_pressed(self.bindings.scene_3) {
            scene = SceneId::Test;
        }
        scene
    }
}

pub mod native {
    use super::*;
    use winit::event::{ElementState, MouseButton as WinitButton};
    use winit::keyboard::{KeyCode, PhysicalKey};

    pub fn key_from_physical(key: PhysicalKey) -> Option<Key> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        let key = match code {
            KeyCode::KeyW => Key::W,
            KeyCode::KeyA => Key::A,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyD => Key::D,
            KeyCode::KeyE => Key::E,
            KeyCode::KeyQ => Key::Q,
            KeyCode::Space => Key::Space,
            KeyCode::Digit1 | KeyCode::Numpad1 => Key::Digit1,
            KeyCode::Digit2 | KeyCode::Numpad2 => Key::Digit2,
            KeyCode::Digit3 | KeyCode::Numpad3 => Key::Digit3,
            KeyCode::Escape => Key::Escape,
            _ => return None,
        };
        Some(key)
    }

    pub fn keyboard_to_input(key: PhysicalKey, state: ElementState) -> Option<InputEvent> {
        let key = key_from_physical(key)?;
        Some(match state {
            ElementState::Pressed => InputEvent::KeyPressed(key),
            ElementState::Released => InputEvent::KeyReleased(key),
        })
    }

    pub fn mouse_button_to_input(button: WinitButton, state: ElementState) -> Option<InputEvent> {
        let button = match button {
            WinitButton::Left => MouseButton::Left,
            WinitButton::Right => MouseButton::Right,
            WinitButton::Middle => MouseButton::Middle,
            _ => return None,
        };
        Some(match state {
            ElementState::Pressed => InputEvent::MouseButtonPressed(button),
            ElementState::Released => InputEvent::MouseButtonReleased(button),
        })
    }

    pub fn mouse_motion_to_input(delta: (f64, f64)) -> InputEvent {
        InputEvent::MouseMoved {
            dx: delta.0 as f32,
            dy: delta.1 as f32,
        }
    }
}
