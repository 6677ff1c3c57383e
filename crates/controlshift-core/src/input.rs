use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Logical key identifiers the game understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    W,
    A,
    S,
    D,
    Q,
    E,
    F,
    H,
    T,
    Space,
    Return,
    Escape,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
}

impl Key {
    /// Every key, in declaration order.
    pub const ALL: [Key; 23] = [
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::Q,
        Key::E,
        Key::F,
        Key::H,
        Key::T,
        Key::Space,
        Key::Return,
        Key::Escape,
        Key::Digit1,
        Key::Digit2,
        Key::Digit3,
        Key::Digit4,
        Key::Digit5,
        Key::Digit6,
        Key::Digit7,
    ];

    /// Parse a key name. Accepts short names (`"Left"`, `"a"`, `"3"`) as well as
    /// DOM-style codes (`"ArrowLeft"`, `"KeyA"`, `"Digit3"`). Case-insensitive.
    pub fn from_name(name: &str) -> Option<Key> {
        let lower = name.trim().to_ascii_lowercase();
        let stripped = lower
            .strip_prefix("arrow")
            .or_else(|| lower.strip_prefix("key"))
            .or_else(|| lower.strip_prefix("digit"))
            .unwrap_or(&lower);
        let key = match stripped {
            "left" => Key::Left,
            "right" => Key::Right,
            "up" => Key::Up,
            "down" => Key::Down,
            "w" => Key::W,
            "a" => Key::A,
            "s" => Key::S,
            "d" => Key::D,
            "q" => Key::Q,
            "e" => Key::E,
            "f" => Key::F,
            "h" => Key::H,
            "t" => Key::T,
            "space" => Key::Space,
            "return" | "enter" => Key::Return,
            "escape" | "esc" => Key::Escape,
            "1" => Key::Digit1,
            "2" => Key::Digit2,
            "3" => Key::Digit3,
            "4" => Key::Digit4,
            "5" => Key::Digit5,
            "6" => Key::Digit6,
            "7" => Key::Digit7,
            _ => return None,
        };
        Some(key)
    }

    /// Short display label, used by the HUD when showing remapped controls.
    pub fn label(self) -> &'static str {
        match self {
            Key::Left => "LEFT",
            Key::Right => "RIGHT",
            Key::Up => "UP",
            Key::Down => "DOWN",
            Key::W => "W",
            Key::A => "A",
            Key::S => "S",
            Key::D => "D",
            Key::Q => "Q",
            Key::E => "E",
            Key::F => "F",
            Key::H => "H",
            Key::T => "T",
            Key::Space => "SPACE",
            Key::Return => "RETURN",
            Key::Escape => "ESC",
            Key::Digit1 => "1",
            Key::Digit2 => "2",
            Key::Digit3 => "3",
            Key::Digit4 => "4",
            Key::Digit5 => "5",
            Key::Digit6 => "6",
            Key::Digit7 => "7",
        }
    }

    /// Zero-based level index for the digit keys 1 through 7.
    pub fn digit_index(self) -> Option<usize> {
        match self {
            Key::Digit1 => Some(0),
            Key::Digit2 => Some(1),
            Key::Digit3 => Some(2),
            Key::Digit4 => Some(3),
            Key::Digit5 => Some(4),
            Key::Digit6 => Some(5),
            Key::Digit7 => Some(6),
            _ => None,
        }
    }
}

/// Raw event delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Window close or equivalent.
    Quit,
}

/// Snapshot of raw input for a single tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFrame {
    /// Keys currently held.
    pub held: HashSet<Key>,
    /// Keys that went down since the previous tick.
    pub pressed: HashSet<Key>,
}

impl InputFrame {
    /// Frame with the given keys held (and none freshly pressed).
    pub fn holding(keys: &[Key]) -> Self {
        Self {
            held: keys.iter().copied().collect(),
            pressed: HashSet::new(),
        }
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn just_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn any_pressed(&self) -> bool {
        !self.pressed.is_empty()
    }

    pub fn any_down(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.held.contains(k))
    }
}

/// Folds host events into held/pressed sets; snapshotted once per tick.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
    keys_just_pressed: HashSet<Key>,
    quit_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown(key) => {
                if self.keys_down.insert(key) {
                    self.keys_just_pressed.insert(key);
                }
            },
            InputEvent::KeyUp(key) => {
                self.keys_down.remove(&key);
            },
            InputEvent::Quit => self.quit_requested = true,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn frame(&self) -> InputFrame {
        InputFrame {
            held: self.keys_down.clone(),
            pressed: self.keys_just_pressed.clone(),
        }
    }

    /// Clear per-tick edge state. Called after each update.
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
    }
}

/// Abstract actions a control scheme binds keys to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Jump,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Left, Action::Right, Action::Jump];
}

/// Mapping from actions to the physical keys that trigger them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlScheme {
    pub left: Vec<Key>,
    pub right: Vec<Key>,
    pub jump: Vec<Key>,
}

impl ControlScheme {
    /// Arrows plus WASD, jump on Up/W/Space.
    pub fn standard() -> Self {
        Self {
            left: vec![Key::Left, Key::A],
            right: vec![Key::Right, Key::D],
            jump: vec![Key::Up, Key::W, Key::Space],
        }
    }

    /// One key per action.
    pub fn custom(left: Key, right: Key, jump: Key) -> Self {
        Self {
            left: vec![left],
            right: vec![right],
            jump: vec![jump],
        }
    }

    /// Left and right keys exchanged; jump keeps its keys.
    pub fn with_sides_exchanged(&self) -> Self {
        Self {
            left: self.right.clone(),
            right: self.left.clone(),
            jump: self.jump.clone(),
        }
    }

    pub fn keys(&self, action: Action) -> &[Key] {
        match action {
            Action::Left => &self.left,
            Action::Right => &self.right,
            Action::Jump => &self.jump,
        }
    }

    /// OR-reduce each action's keys against the frame.
    pub fn resolve(&self, frame: &InputFrame) -> EffectiveInput {
        EffectiveInput {
            left: frame.any_down(self.keys(Action::Left)),
            right: frame.any_down(self.keys(Action::Right)),
            jump: frame.any_down(self.keys(Action::Jump)),
            vel_x: None,
        }
    }
}

impl Default for ControlScheme {
    fn default() -> Self {
        Self::standard()
    }
}

/// Resolved per-tick intent after a room's transform has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectiveInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Direct horizontal velocity; bypasses `left`/`right` when set.
    pub vel_x: Option<f32>,
}

impl EffectiveInput {
    /// No movement, no jump.
    pub const IDLE: EffectiveInput = EffectiveInput {
        left: false,
        right: false,
        jump: false,
        vel_x: None,
    };

    pub fn is_idle(&self) -> bool {
        !self.left && !self.right && !self.jump && self.vel_x.is_none()
    }
}
