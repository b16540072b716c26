//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tools ──
    ToolLine,
    ToolFreehand,

    // ── Edit ──
    Undo,
    Redo,
    Duplicate,
    Delete,
    /// Disarm the armed tool, or deselect when nothing is armed.
    Escape,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` plays the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let cmd = modifiers.command();

        if cmd && modifiers.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                _ => None,
            };
        }

        if modifiers.alt {
            return None;
        }

        // `+` needs shift on most layouts, so shift is tolerated for view keys.
        match key {
            "+" | "=" => return Some(ShortcutAction::ZoomIn),
            "-" | "_" => return Some(ShortcutAction::ZoomOut),
            _ => {}
        }

        if modifiers.shift {
            return None;
        }

        match key {
            "l" | "L" => Some(ShortcutAction::ToolLine),
            "f" | "F" => Some(ShortcutAction::ToolFreehand),
            "0" => Some(ShortcutAction::ZoomReset),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Escape),
            _ => None,
        }
    }
}
