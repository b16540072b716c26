//! Pointer interaction state machine.
//!
//! Arbitrates pointer and touch input between panning, pinch-zoom, element
//! dragging, and shape drawing. Viewport changes are applied directly;
//! scene changes are returned as [`EditorEffect`]s for the session to apply,
//! always with a `Snapshot` ahead of the structural mutation it guards.
//!
//! ```text
//!            press (no tool, on pin)        press (tool armed)
//!   Idle ─────────────────────────► Dragging     Idle ──────────► Drawing
//!    │ ▲  press on background,             │                      │
//!    │ │  zoom > 1                          │ release              │ release → commit
//!    ▼ │                                    ▼                      ▼
//!   Panning ── 2nd touch ──► PinchZooming ──► Idle ◄──────────────┘
//! ```
//!
//! A press on empty background always clears the selection; it also starts
//! a pan, but only when zoomed in. Panning or zooming never interleaves with
//! a drag or draw inside one gesture.

use crate::config::EditorConfig;
use crate::input::{InputEvent, PointerId, PointerKind};
use crate::session::SceneMutation;
use crate::viewport::Viewport;
use lm_core::ElementId;
use lm_core::model::{ElementKind, Handle, Scene, SceneElement, ScenePoint, Shape};
use lm_render::hit_test;
use smallvec::SmallVec;

/// A tool waiting for the next press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmedTool {
    /// Drop a point element of this kind.
    Place(ElementKind),
    /// Straight light line.
    Line,
    /// Freehand light path.
    Freehand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Line,
    Freehand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    Panning {
        pointer: PointerId,
        last: (f32, f32),
    },
    PinchZooming {
        pointers: [PointerId; 2],
        last_distance: f32,
    },
    DraggingElement {
        pointer: PointerId,
        id: ElementId,
        handle: Handle,
        /// Set once the pre-drag snapshot has been emitted.
        snapshotted: bool,
    },
    Drawing {
        pointer: PointerId,
        mode: DrawMode,
        start: ScenePoint,
        current: ScenePoint,
        points: Vec<ScenePoint>,
    },
}

/// Something the session must do in response to input, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEffect {
    /// Take a history snapshot of the current scene.
    Snapshot,
    Apply(SceneMutation),
    Select(Option<ElementId>),
    DisarmTool,
}

/// Read/write access the state machine needs for one event.
pub struct InteractionContext<'a> {
    pub scene: &'a Scene,
    pub viewport: &'a mut Viewport,
    pub armed: Option<ArmedTool>,
    pub config: &'a EditorConfig,
}

/// In-progress draw, for rendering the rubber-band line or trail.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawPreview<'a> {
    Line { start: ScenePoint, end: ScenePoint },
    Freehand { points: &'a [ScenePoint] },
}

pub struct Interaction {
    state: InteractionState,
    /// Active touch contacts, used to detect pinches.
    touches: SmallVec<[(PointerId, (f32, f32)); 2]>,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction {
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
            touches: SmallVec::new(),
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    pub fn preview(&self) -> Option<DrawPreview<'_>> {
        match &self.state {
            InteractionState::Drawing {
                mode: DrawMode::Line,
                start,
                current,
                ..
            } => Some(DrawPreview::Line {
                start: *start,
                end: *current,
            }),
            InteractionState::Drawing {
                mode: DrawMode::Freehand,
                points,
                ..
            } => Some(DrawPreview::Freehand { points }),
            _ => None,
        }
    }

    /// Drop any gesture in progress without committing.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
        self.touches.clear();
    }

    pub fn handle(&mut self, event: &InputEvent, cx: &mut InteractionContext<'_>) -> Vec<EditorEffect> {
        match event {
            InputEvent::PointerDown {
                pointer,
                kind,
                x,
                y,
                primary,
            } => self.on_down(*pointer, *kind, *x, *y, *primary, cx),
            InputEvent::PointerMove { pointer, x, y } => self.on_move(*pointer, *x, *y, cx),
            InputEvent::PointerUp { pointer, x, y } => self.on_up(*pointer, *x, *y, cx),
            InputEvent::PointerCancel { pointer } => {
                self.forget_touch(*pointer);
                if !self.is_idle() {
                    log::debug!("interaction: gesture cancelled");
                }
                self.state = InteractionState::Idle;
                vec![]
            }
            InputEvent::Wheel { delta_y, .. } => {
                if self.is_idle() && *delta_y != 0.0 {
                    let step = cx.config.wheel_zoom_step;
                    cx.viewport
                        .zoom_by(if *delta_y < 0.0 { step } else { 1.0 / step });
                }
                vec![]
            }
            InputEvent::Key { .. } => vec![],
        }
    }

    // ─── Press ───────────────────────────────────────────────────────────

    fn on_down(
        &mut self,
        pointer: PointerId,
        kind: PointerKind,
        x: f32,
        y: f32,
        primary: bool,
        cx: &mut InteractionContext<'_>,
    ) -> Vec<EditorEffect> {
        if !primary {
            return vec![];
        }

        if kind == PointerKind::Touch {
            self.forget_touch(pointer);
            self.touches.push((pointer, (x, y)));
            if self.touches.len() == 2
                && matches!(
                    self.state,
                    InteractionState::Idle | InteractionState::Panning { .. }
                )
            {
                let (a, pa) = self.touches[0];
                let (b, pb) = self.touches[1];
                self.state = InteractionState::PinchZooming {
                    pointers: [a, b],
                    last_distance: distance(pa, pb),
                };
                log::debug!("interaction: pinch started");
                return vec![];
            }
        }

        if !self.is_idle() {
            return vec![];
        }
        let Some(p) = cx.viewport.device_to_scene(x, y) else {
            return vec![];
        };

        match cx.armed {
            Some(ArmedTool::Place(kind)) => {
                let element = SceneElement::new(kind, "", Shape::point(p));
                let id = element.id;
                log::debug!("interaction: placed {id} at ({:.1}, {:.1})", p.x, p.y);
                vec![
                    EditorEffect::Snapshot,
                    EditorEffect::Apply(SceneMutation::AddElement(Box::new(element))),
                    EditorEffect::Select(Some(id)),
                    EditorEffect::DisarmTool,
                ]
            }
            Some(ArmedTool::Line) => {
                self.state = InteractionState::Drawing {
                    pointer,
                    mode: DrawMode::Line,
                    start: p,
                    current: p,
                    points: vec![p],
                };
                vec![]
            }
            Some(ArmedTool::Freehand) => {
                self.state = InteractionState::Drawing {
                    pointer,
                    mode: DrawMode::Freehand,
                    start: p,
                    current: p,
                    points: vec![p],
                };
                vec![]
            }
            None => {
                let radius = cx.viewport.hit_radius(cx.config.pin_hit_radius_px);
                if let Some(hit) = hit_test(cx.scene, p, radius) {
                    self.state = InteractionState::DraggingElement {
                        pointer,
                        id: hit.id,
                        handle: hit.handle,
                        snapshotted: false,
                    };
                    vec![EditorEffect::Select(Some(hit.id))]
                } else {
                    if cx.viewport.zoom() > cx.config.min_zoom {
                        self.state = InteractionState::Panning {
                            pointer,
                            last: (x, y),
                        };
                    }
                    vec![EditorEffect::Select(None)]
                }
            }
        }
    }

    // ─── Move ────────────────────────────────────────────────────────────

    fn on_move(
        &mut self,
        pointer: PointerId,
        x: f32,
        y: f32,
        cx: &mut InteractionContext<'_>,
    ) -> Vec<EditorEffect> {
        if let Some(slot) = self.touches.iter_mut().find(|(id, _)| *id == pointer) {
            slot.1 = (x, y);
        }

        match &mut self.state {
            InteractionState::Idle => vec![],
            InteractionState::Panning { pointer: p0, last } => {
                if *p0 == pointer {
                    cx.viewport.pan_by(x - last.0, y - last.1);
                    *last = (x, y);
                }
                vec![]
            }
            InteractionState::PinchZooming {
                pointers,
                last_distance,
            } => {
                if !pointers.contains(&pointer) {
                    return vec![];
                }
                let pos = |id: PointerId| {
                    self.touches
                        .iter()
                        .find(|(t, _)| *t == id)
                        .map(|(_, pos)| *pos)
                };
                if let (Some(a), Some(b)) = (pos(pointers[0]), pos(pointers[1])) {
                    let d = distance(a, b);
                    if *last_distance > 0.0 && d > 0.0 {
                        cx.viewport.zoom_by(d / *last_distance);
                    }
                    *last_distance = d;
                }
                vec![]
            }
            InteractionState::DraggingElement {
                pointer: p0,
                id,
                handle,
                snapshotted,
            } => {
                if *p0 != pointer {
                    return vec![];
                }
                // Paths are immutable; so are elements removed mid-gesture.
                let movable = cx.scene.get(*id).is_some_and(|e| !e.shape.is_path());
                if !movable {
                    return vec![];
                }
                let Some(to) = cx.viewport.device_to_scene(x, y) else {
                    return vec![];
                };
                let mut effects = Vec::with_capacity(2);
                if !*snapshotted {
                    *snapshotted = true;
                    effects.push(EditorEffect::Snapshot);
                }
                effects.push(EditorEffect::Apply(SceneMutation::MoveHandle {
                    id: *id,
                    handle: *handle,
                    to,
                }));
                effects
            }
            InteractionState::Drawing {
                pointer: p0,
                mode,
                current,
                points,
                ..
            } => {
                if *p0 != pointer {
                    return vec![];
                }
                // Pointer is captured: positions outside the box clamp to its edge.
                let Some(p) = cx.viewport.device_to_scene(x, y) else {
                    return vec![];
                };
                *current = p;
                if *mode == DrawMode::Freehand {
                    let last = points.last().copied().unwrap_or(p);
                    if p.distance_sq(last) > cx.config.freehand_min_dist_sq {
                        points.push(p);
                    }
                }
                vec![]
            }
        }
    }

    // ─── Release ─────────────────────────────────────────────────────────

    fn on_up(
        &mut self,
        pointer: PointerId,
        x: f32,
        y: f32,
        cx: &mut InteractionContext<'_>,
    ) -> Vec<EditorEffect> {
        self.forget_touch(pointer);
        if !self.owned_by(pointer) {
            return vec![];
        }

        let state = std::mem::replace(&mut self.state, InteractionState::Idle);
        let InteractionState::Drawing {
            mode,
            start,
            current,
            mut points,
            ..
        } = state
        else {
            return vec![];
        };

        let end = cx.viewport.device_to_scene(x, y).unwrap_or(current);
        let shape = match mode {
            DrawMode::Line => (end != start).then(|| Shape::segment(start, end)),
            DrawMode::Freehand => {
                if points
                    .last()
                    .is_some_and(|last| end.distance_sq(*last) > cx.config.freehand_min_dist_sq)
                {
                    points.push(end);
                }
                Shape::path(points)
            }
        };
        let Some(shape) = shape else {
            log::debug!("interaction: {mode:?} draw too short, discarded");
            return vec![];
        };

        let element = SceneElement::new(
            ElementKind::lighting(),
            cx.config.default_light_label.clone(),
            shape,
        );
        let id = element.id;
        log::debug!("interaction: committed {mode:?} light {id}");
        vec![
            EditorEffect::Snapshot,
            EditorEffect::Apply(SceneMutation::AddElement(Box::new(element))),
            EditorEffect::Select(Some(id)),
            EditorEffect::DisarmTool,
        ]
    }

    /// Whether releasing `pointer` ends the current gesture.
    fn owned_by(&self, pointer: PointerId) -> bool {
        match &self.state {
            InteractionState::Idle => false,
            InteractionState::Panning { pointer: p, .. }
            | InteractionState::DraggingElement { pointer: p, .. }
            | InteractionState::Drawing { pointer: p, .. } => *p == pointer,
            InteractionState::PinchZooming { pointers, .. } => pointers.contains(&pointer),
        }
    }

    fn forget_touch(&mut self, pointer: PointerId) {
        self.touches.retain(|(id, _)| *id != pointer);
    }
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}
