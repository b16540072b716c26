//! Editor session: the scene plus everything that edits it.
//!
//! The session is the single writer of the scene. Pointer input flows
//! through the [`Interaction`] state machine, whose effects are applied
//! here in order; keyboard input resolves through [`ShortcutMap`].
//! Attribute setters edit the live scene without touching history;
//! structural edits (add, remove, duplicate, drag start) snapshot first.

use crate::config::EditorConfig;
use crate::history::History;
use crate::input::InputEvent;
use crate::interaction::{ArmedTool, DrawPreview, EditorEffect, Interaction, InteractionContext};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::viewport::Viewport;
use lm_core::ElementId;
use lm_core::model::{
    ElementKind, Handle, ImageData, InstallSide, Pose, Scene, SceneElement, ScenePoint,
};

/// A single change to the scene. Applying one never touches history.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneMutation {
    AddElement(Box<SceneElement>),
    RemoveElement {
        id: ElementId,
    },
    MoveHandle {
        id: ElementId,
        handle: Handle,
        to: ScenePoint,
    },
    SetLabel {
        id: ElementId,
        label: String,
    },
    SetKelvin {
        id: ElementId,
        kelvin: u32,
    },
    SetPose {
        id: ElementId,
        pose: Pose,
    },
    SetInstallSide {
        id: ElementId,
        side: InstallSide,
    },
    SetReferenceImage {
        id: ElementId,
        image: Option<ImageData>,
    },
    Clear,
}

pub struct EditorSession {
    scene: Scene,
    history: History,
    viewport: Viewport,
    interaction: Interaction,
    selection: Option<ElementId>,
    armed: Option<ArmedTool>,
    config: EditorConfig,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            scene: Scene::new(),
            history: History::new(config.history_depth),
            viewport: Viewport::new(config.min_zoom, config.max_zoom),
            interaction: Interaction::new(),
            selection: None,
            armed: None,
            config,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    pub fn selected(&self) -> Option<&SceneElement> {
        self.selection.and_then(|id| self.scene.get(id))
    }

    pub fn armed(&self) -> Option<ArmedTool> {
        self.armed
    }

    /// Transient line or trail of a draw in progress.
    pub fn preview(&self) -> Option<DrawPreview<'_>> {
        self.interaction.preview()
    }

    // ─── Layout ──────────────────────────────────────────────────────────

    pub fn set_container(&mut self, width: f32, height: f32) {
        self.viewport.set_container(width, height);
    }

    /// A new source image was loaded: everything drawn on the old one goes.
    pub fn replace_image(&mut self, width: u32, height: u32) {
        self.reset_editing();
        self.viewport.set_natural_size(width, height);
        self.viewport.reset();
        log::debug!("session: image replaced ({width}x{height})");
    }

    /// Drop the image and the scene.
    pub fn clear(&mut self) {
        self.reset_editing();
        self.viewport.clear_image();
        log::debug!("session: cleared");
    }

    fn reset_editing(&mut self) {
        self.scene.clear();
        self.history.clear();
        self.interaction.reset();
        self.selection = None;
        self.armed = None;
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Route one input event. Returns `true` if the scene changed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if let InputEvent::Key { key, modifiers } = event {
            return match ShortcutMap::resolve(key, *modifiers) {
                Some(action) => self.run_shortcut(action),
                None => false,
            };
        }

        let effects = {
            let mut cx = InteractionContext {
                scene: &self.scene,
                viewport: &mut self.viewport,
                armed: self.armed,
                config: &self.config,
            };
            self.interaction.handle(event, &mut cx)
        };

        let mut changed = false;
        for effect in effects {
            changed |= self.apply_effect(effect);
        }
        changed
    }

    fn apply_effect(&mut self, effect: EditorEffect) -> bool {
        match effect {
            EditorEffect::Snapshot => {
                self.history.snapshot(&self.scene);
                false
            }
            EditorEffect::Apply(mutation) => self.apply_mutation(mutation),
            EditorEffect::Select(id) => {
                self.selection = id;
                false
            }
            EditorEffect::DisarmTool => {
                self.armed = None;
                false
            }
        }
    }

    /// Run a shortcut. Ignored while a pointer gesture is in progress.
    pub fn run_shortcut(&mut self, action: ShortcutAction) -> bool {
        if !self.interaction.is_idle() {
            log::trace!("session: {action:?} ignored mid-gesture");
            return false;
        }
        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Duplicate => match self.selection {
                Some(id) => self.duplicate(id).is_some(),
                None => false,
            },
            ShortcutAction::Delete => match self.selection {
                Some(id) => self.remove(id),
                None => false,
            },
            ShortcutAction::Escape => {
                if self.armed.is_some() {
                    self.armed = None;
                } else {
                    self.selection = None;
                }
                false
            }
            ShortcutAction::ToolLine => {
                self.arm_tool(Some(ArmedTool::Line));
                false
            }
            ShortcutAction::ToolFreehand => {
                self.arm_tool(Some(ArmedTool::Freehand));
                false
            }
            ShortcutAction::ZoomIn => {
                self.viewport.zoom_by(self.config.wheel_zoom_step);
                false
            }
            ShortcutAction::ZoomOut => {
                self.viewport.zoom_by(1.0 / self.config.wheel_zoom_step);
                false
            }
            ShortcutAction::ZoomReset => {
                self.viewport.reset();
                false
            }
        }
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Apply a mutation to the live scene. Returns `false` if it was a no-op
    /// (unknown id, rejected drag, attribute not applicable to the kind).
    pub fn apply_mutation(&mut self, mutation: SceneMutation) -> bool {
        match mutation {
            SceneMutation::AddElement(element) => {
                self.scene.push(*element);
                true
            }
            SceneMutation::RemoveElement { id } => {
                let removed = self.scene.remove(id).is_some();
                if removed && self.selection == Some(id) {
                    self.selection = None;
                }
                removed
            }
            SceneMutation::MoveHandle { id, handle, to } => self
                .scene
                .get_mut(id)
                .is_some_and(|el| el.move_handle(handle, to)),
            SceneMutation::SetLabel { id, label } => match self.scene.get_mut(id) {
                Some(el) => {
                    el.label = label;
                    true
                }
                None => false,
            },
            SceneMutation::SetKelvin { id, kelvin: k } => {
                match self.scene.get_mut(id).map(|el| &mut el.kind) {
                    Some(ElementKind::Lighting { kelvin, .. }) => {
                        *kelvin = k;
                        true
                    }
                    _ => false,
                }
            }
            SceneMutation::SetPose { id, pose: p } => {
                match self.scene.get_mut(id).map(|el| &mut el.kind) {
                    Some(ElementKind::Person { pose }) => {
                        *pose = p;
                        true
                    }
                    _ => false,
                }
            }
            SceneMutation::SetInstallSide { id, side } => {
                match self.scene.get_mut(id).map(|el| &mut el.kind) {
                    Some(ElementKind::Lighting { install_side, .. }) => {
                        *install_side = side;
                        true
                    }
                    _ => false,
                }
            }
            SceneMutation::SetReferenceImage { id, image } => match self.scene.get_mut(id) {
                Some(el) => {
                    el.reference_image = image;
                    true
                }
                None => false,
            },
            SceneMutation::Clear => {
                let changed = !self.scene.is_empty();
                self.scene.clear();
                self.selection = None;
                changed
            }
        }
    }

    /// Snapshot, then apply a structural mutation.
    fn structural(&mut self, mutation: SceneMutation) -> bool {
        self.history.snapshot(&self.scene);
        self.apply_mutation(mutation)
    }

    // ─── Structural edits ────────────────────────────────────────────────

    /// Add an element and select it.
    pub fn add_element(&mut self, element: SceneElement) -> ElementId {
        let id = element.id;
        self.structural(SceneMutation::AddElement(Box::new(element)));
        self.selection = Some(id);
        id
    }

    pub fn remove(&mut self, id: ElementId) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        self.structural(SceneMutation::RemoveElement { id })
    }

    /// Copy an element with an offset; the copy becomes selected.
    pub fn duplicate(&mut self, id: ElementId) -> Option<ElementId> {
        let copy = self.scene.get(id)?.duplicated(self.config.duplicate_offset);
        Some(self.add_element(copy))
    }

    /// Remove every element (undoable, unlike [`clear`](Self::clear)).
    pub fn clear_elements(&mut self) -> bool {
        if self.scene.is_empty() {
            return false;
        }
        self.structural(SceneMutation::Clear)
    }

    // ─── Attribute edits (no history) ────────────────────────────────────

    pub fn set_label(&mut self, id: ElementId, label: impl Into<String>) -> bool {
        self.apply_mutation(SceneMutation::SetLabel {
            id,
            label: label.into(),
        })
    }

    pub fn set_kelvin(&mut self, id: ElementId, kelvin: u32) -> bool {
        self.apply_mutation(SceneMutation::SetKelvin { id, kelvin })
    }

    pub fn set_pose(&mut self, id: ElementId, pose: Pose) -> bool {
        self.apply_mutation(SceneMutation::SetPose { id, pose })
    }

    pub fn set_install_side(&mut self, id: ElementId, side: InstallSide) -> bool {
        self.apply_mutation(SceneMutation::SetInstallSide { id, side })
    }

    pub fn set_reference_image(&mut self, id: ElementId, image: ImageData) -> bool {
        self.apply_mutation(SceneMutation::SetReferenceImage {
            id,
            image: Some(image),
        })
    }

    pub fn clear_reference_image(&mut self, id: ElementId) -> bool {
        self.apply_mutation(SceneMutation::SetReferenceImage { id, image: None })
    }

    /// Reposition an element's anchor. Rejected for freehand paths.
    pub fn set_anchor(&mut self, id: ElementId, to: ScenePoint) -> bool {
        self.apply_mutation(SceneMutation::MoveHandle {
            id,
            handle: Handle::Start,
            to,
        })
    }

    // ─── Selection & tools ───────────────────────────────────────────────

    /// Select an element; unknown ids clear the selection.
    pub fn select(&mut self, id: Option<ElementId>) {
        self.selection = id.filter(|id| self.scene.contains(*id));
    }

    pub fn arm_tool(&mut self, tool: Option<ArmedTool>) {
        self.armed = tool;
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo(&mut self.scene);
        if changed {
            self.drop_dangling_selection();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo(&mut self.scene);
        if changed {
            self.drop_dangling_selection();
        }
        changed
    }

    fn drop_dangling_selection(&mut self) {
        if let Some(id) = self.selection
            && !self.scene.contains(id)
        {
            self.selection = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use lm_core::model::Shape;
    use pretty_assertions::assert_eq;

    fn session() -> EditorSession {
        let mut s = EditorSession::default();
        s.set_container(1000.0, 1000.0);
        s.replace_image(400, 400);
        s
    }

    fn lamp() -> SceneElement {
        SceneElement::new(
            ElementKind::lighting(),
            "lamp",
            Shape::point(ScenePoint::new(10.0, 10.0)),
        )
    }

    #[test]
    fn attribute_setters_do_not_snapshot() {
        let mut s = session();
        let id = s.add_element(lamp());
        assert_eq!(s.history().undo_depth(), 1);
        assert!(s.set_kelvin(id, 4000));
        assert!(s.set_label(id, "floor lamp"));
        assert!(s.set_install_side(id, InstallSide::Back));
        assert!(s.set_anchor(id, ScenePoint::new(20.0, 20.0)));
        assert_eq!(s.history().undo_depth(), 1);
        assert_eq!(s.scene().get(id).and_then(|e| e.kelvin()), Some(4000));
    }

    #[test]
    fn setters_ignore_inapplicable_kinds() {
        let mut s = session();
        let id = s.add_element(lamp());
        assert!(!s.set_pose(id, Pose::Sitting));
        let dog = s.add_element(SceneElement::new(
            ElementKind::Animal,
            "dog",
            Shape::point(ScenePoint::new(50.0, 80.0)),
        ));
        assert!(!s.set_kelvin(dog, 5000));
        assert!(!s.set_install_side(dog, InstallSide::Back));
    }

    #[test]
    fn removing_selected_clears_selection() {
        let mut s = session();
        let id = s.add_element(lamp());
        assert_eq!(s.selection(), Some(id));
        assert!(s.remove(id));
        assert_eq!(s.selection(), None);
        assert!(!s.remove(id));
    }

    #[test]
    fn duplicate_offsets_and_selects_copy() {
        let mut s = session();
        let id = s.add_element(lamp());
        let copy = s.duplicate(id).unwrap();
        assert_ne!(copy, id);
        assert_eq!(s.selection(), Some(copy));
        assert_eq!(
            s.scene().get(copy).unwrap().anchor(),
            ScenePoint::new(12.0, 12.0)
        );
        assert_eq!(s.history().undo_depth(), 2);
    }

    #[test]
    fn undo_drops_dangling_selection() {
        let mut s = session();
        let id = s.add_element(lamp());
        assert!(s.undo());
        assert!(s.scene().is_empty());
        assert_eq!(s.selection(), None);
        assert!(s.redo());
        assert!(s.scene().contains(id));
    }

    #[test]
    fn escape_disarms_then_deselects() {
        let mut s = session();
        let id = s.add_element(lamp());
        s.arm_tool(Some(ArmedTool::Line));
        s.handle_input(&InputEvent::key("Escape", Modifiers::NONE));
        assert_eq!(s.armed(), None);
        assert_eq!(s.selection(), Some(id));
        s.handle_input(&InputEvent::key("Escape", Modifiers::NONE));
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn replace_image_resets_everything() {
        let mut s = session();
        s.add_element(lamp());
        s.handle_input(&InputEvent::key("+", Modifiers::NONE));
        assert!(s.viewport().zoom() > 1.0);
        s.replace_image(1600, 900);
        assert!(s.scene().is_empty());
        assert!(!s.history().can_undo());
        assert_eq!(s.selection(), None);
        assert_eq!(s.viewport().zoom(), 1.0);
    }

    #[test]
    fn clear_elements_is_undoable() {
        let mut s = session();
        s.add_element(lamp());
        s.add_element(lamp());
        assert!(s.clear_elements());
        assert!(s.scene().is_empty());
        assert!(s.undo());
        assert_eq!(s.scene().len(), 2);
    }
}
