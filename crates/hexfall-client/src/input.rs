use std::collections::HashSet;

use hexfall_game::movement::{Joystick, MovementInput};

/// Movement actions a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Back,
    Left,
    Right,
    Jump,
}

/// Key codes (`KeyboardEvent.code`) for each action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    bindings: Vec<(Action, &'static str)>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            bindings: vec![
                (Action::Forward, "ArrowUp"),
                (Action::Forward, "KeyW"),
                (Action::Back, "ArrowDown"),
                (Action::Back, "KeyS"),
                (Action::Left, "ArrowLeft"),
                (Action::Left, "KeyA"),
                (Action::Right, "ArrowRight"),
                (Action::Right, "KeyD"),
                (Action::Jump, "Space"),
            ],
        }
    }
}

impl KeyBindings {
    /// Action bound to a key code, if any.
    pub fn action_for(&self, code: &str) -> Option<Action> {
        self.bindings
            .iter()
            .find(|(_, key)| *key == code)
            .map(|(action, _)| *action)
    }

    pub fn keys_for(&self, action: Action) -> impl Iterator<Item = &'static str> + '_ {
        self.bindings
            .iter()
            .filter(move |(a, _)| *a == action)
            .map(|(_, key)| *key)
    }
}

/// Keyboard and joystick state, updated from browser events.
pub struct InputState {
    /// Keys currently held down.
    pub keys_down: HashSet<String>,
    /// Keys pressed this frame (cleared each frame).
    pub keys_just_pressed: HashSet<String>,
    /// Latest on-screen joystick snapshot.
    pub joystick: Joystick,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            joystick: Joystick::default(),
        }
    }

    pub fn on_key_down(&mut self, code: String) {
        if self.keys_down.insert(code.clone()) {
            self.keys_just_pressed.insert(code);
        }
    }

    pub fn on_key_up(&mut self, code: String) {
        self.keys_down.remove(&code);
    }

    pub fn on_joystick(&mut self, joystick: Joystick) {
        self.joystick = joystick;
    }

    pub fn is_key_down(&self, code: &str) -> bool {
        self.keys_down.contains(code)
    }

    pub fn is_key_just_pressed(&self, code: &str) -> bool {
        self.keys_just_pressed.contains(code)
    }

    /// Whether any key bound to `action` is held.
    pub fn is_action_down(&self, bindings: &KeyBindings, action: Action) -> bool {
        bindings.keys_for(action).any(|key| self.is_key_down(key))
    }

    /// Collapse keys and joystick into this frame's movement request.
    pub fn movement_input(&self, bindings: &KeyBindings) -> MovementInput {
        MovementInput {
            forward: self.is_action_down(bindings, Action::Forward),
            back: self.is_action_down(bindings, Action::Back),
            left: self.is_action_down(bindings, Action::Left),
            right: self.is_action_down(bindings, Action::Right),
            jump: self.is_action_down(bindings, Action::Jump),
            joystick: self.joystick,
        }
    }

    /// Clear per-frame state. Call at the end of each frame.
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
