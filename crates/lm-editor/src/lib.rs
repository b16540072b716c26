//! Scene editing: viewport, pointer interaction, shortcuts and undo/redo.

pub mod config;
pub mod history;
pub mod input;
pub mod interaction;
pub mod session;
pub mod shortcuts;
pub mod viewport;

pub use config::EditorConfig;
pub use history::History;
pub use input::{InputEvent, Modifiers, PointerId, PointerKind};
pub use interaction::{ArmedTool, DrawPreview, EditorEffect, Interaction, InteractionState};
pub use session::{EditorSession, SceneMutation};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use viewport::{ScreenRect, Viewport};
