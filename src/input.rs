/// Input normalisation.
///
/// Hosts record raw keyboard and touch-button state here; the simulation
/// only ever sees the derived [`Intents`]. Nothing in this module touches
/// the game session.
use std::collections::HashSet;

/// Host-independent key identities the game cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    A,
    D,
    Space,
    Shift,
    Ctrl,
}

impl Key {
    pub const ALL: [Key; 7] = [
        Key::Left,
        Key::Right,
        Key::A,
        Key::D,
        Key::Space,
        Key::Shift,
        Key::Ctrl,
    ];

    fn is_special(self) -> bool {
        matches!(self, Key::Shift | Key::Ctrl)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Intents {
    pub move_left: bool,
    pub move_right: bool,
    pub fire: bool,
    /// One-shot: true for at most one frame per press.
    pub activate_special: bool,
}

impl Intents {
    /// Net horizontal direction in `{-1, 0, 1}`; opposing intents cancel.
    pub fn direction(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    touch_direction: i8,
    touch_firing: bool,
    special_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        if key.is_special() && !self.held.contains(&key) {
            self.special_requested = true;
        }
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Level-triggered update for hosts that poll key state each frame.
    pub fn set_held(&mut self, key: Key, held: bool) {
        if held {
            self.press(key);
        } else {
            self.release(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Touch direction pad; values outside `{-1, 0, 1}` are clamped.
    pub fn set_touch_direction(&mut self, direction: i8) {
        self.touch_direction = direction.clamp(-1, 1);
    }

    pub fn set_touch_firing(&mut self, firing: bool) {
        self.touch_firing = firing;
    }

    pub fn press_touch_special(&mut self) {
        self.special_requested = true;
    }

    /// Drop every held key and touch flag, e.g. when a new session starts.
    pub fn clear(&mut self) {
        self.held.clear();
        self.touch_direction = 0;
        self.touch_firing = false;
        self.special_requested = false;
    }

    pub fn intents(&self) -> Intents {
        let held = |keys: &[Key]| keys.iter().any(|k| self.held.contains(k));
        Intents {
            move_left: held(&[Key::Left, Key::A]) || self.touch_direction < 0,
            move_right: held(&[Key::Right, Key::D]) || self.touch_direction > 0,
            fire: held(&[Key::Space]) || self.touch_firing,
            activate_special: self.special_requested,
        }
    }

    /// Consume the pending special request, if any.
    pub fn take_special(&mut self) -> bool {
        std::mem::take(&mut self.special_requested)
    }
}
