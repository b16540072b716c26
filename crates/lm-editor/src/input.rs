//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and pen events into a unified `InputEvent`
//! consumed by the interaction state machine. Coordinates are device pixels
//! relative to the canvas container's top-left corner.

/// Stable id of one pointer for the duration of its contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    /// ctrl on Windows/Linux, ⌘ on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A normalized input event from any pointing device or the keyboard.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Pointer pressed. `primary` is false for secondary mouse buttons.
    PointerDown {
        pointer: PointerId,
        kind: PointerKind,
        x: f32,
        y: f32,
        primary: bool,
    },

    PointerMove { pointer: PointerId, x: f32, y: f32 },

    PointerUp { pointer: PointerId, x: f32, y: f32 },

    /// Contact lost without a release (touch cancelled, window blur).
    PointerCancel { pointer: PointerId },

    /// Mouse wheel / trackpad scroll. Negative `delta_y` zooms in.
    Wheel { x: f32, y: f32, delta_y: f32 },

    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn mouse_down(x: f32, y: f32) -> Self {
        Self::PointerDown {
            pointer: PointerId(0),
            kind: PointerKind::Mouse,
            x,
            y,
            primary: true,
        }
    }

    pub fn mouse_move(x: f32, y: f32) -> Self {
        Self::PointerMove {
            pointer: PointerId(0),
            x,
            y,
        }
    }

    pub fn mouse_up(x: f32, y: f32) -> Self {
        Self::PointerUp {
            pointer: PointerId(0),
            x,
            y,
        }
    }

    pub fn touch_down(id: u32, x: f32, y: f32) -> Self {
        Self::PointerDown {
            pointer: PointerId(id),
            kind: PointerKind::Touch,
            x,
            y,
            primary: true,
        }
    }

    pub fn key(key: &str, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers,
        }
    }
}
