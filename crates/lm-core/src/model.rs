//! Scene element data model.
//!
//! A scene is a flat, creation-ordered list of elements annotating a source
//! photograph. Every coordinate is a percentage of the image width/height in
//! `[0, 100]`, so the model is independent of the rendered size.
//!
//! Shapes are a tagged union: an element is a point, a straight segment, or
//! a freehand path, never more than one of those.

use crate::id::ElementId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ─── Coordinates ─────────────────────────────────────────────────────────

/// A point in percentage space. Always within `[0, 100]` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePoint {
    pub x: f32,
    pub y: f32,
}

impl ScenePoint {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 100.0;

    /// Build a point, clamping both coordinates into `[0, 100]`.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    /// Offset by `(dx, dy)` and clamp.
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Squared distance in percent units.
    pub fn distance_sq(self, other: ScenePoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn midpoint(self, other: ScenePoint) -> ScenePoint {
        ScenePoint::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Clamp a percentage value into `[0, 100]`. Non-finite values map to 0.
pub fn clamp_percent(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(ScenePoint::MIN, ScenePoint::MAX)
    } else {
        ScenePoint::MIN
    }
}

// ─── Shape ───────────────────────────────────────────────────────────────

/// Geometry of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", try_from = "ShapeRepr")]
pub enum Shape {
    Point { at: ScenePoint },
    Segment { start: ScenePoint, end: ScenePoint },
    /// Freehand path with at least two points. Immutable once created.
    Path { points: Vec<ScenePoint> },
}

impl Shape {
    pub fn point(at: ScenePoint) -> Self {
        Shape::Point { at }
    }

    pub fn segment(start: ScenePoint, end: ScenePoint) -> Self {
        Shape::Segment { start, end }
    }

    /// Build a freehand path. Returns `None` for fewer than two points.
    pub fn path(points: Vec<ScenePoint>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        Some(Shape::Path { points })
    }

    /// The anchor: the point itself, or the start of a line/path.
    pub fn anchor(&self) -> ScenePoint {
        match self {
            Shape::Point { at } => *at,
            Shape::Segment { start, .. } => *start,
            Shape::Path { points } => points[0],
        }
    }

    /// End point for linear shapes.
    pub fn end(&self) -> Option<ScenePoint> {
        match self {
            Shape::Point { .. } => None,
            Shape::Segment { end, .. } => Some(*end),
            Shape::Path { points } => points.last().copied(),
        }
    }

    pub fn is_linear(&self) -> bool {
        !matches!(self, Shape::Point { .. })
    }

    pub fn is_path(&self) -> bool {
        matches!(self, Shape::Path { .. })
    }

    /// Copy of the shape with every coordinate offset and clamped.
    pub fn offset(&self, dx: f32, dy: f32) -> Shape {
        match self {
            Shape::Point { at } => Shape::Point {
                at: at.offset(dx, dy),
            },
            Shape::Segment { start, end } => Shape::Segment {
                start: start.offset(dx, dy),
                end: end.offset(dx, dy),
            },
            Shape::Path { points } => Shape::Path {
                points: points.iter().map(|p| p.offset(dx, dy)).collect(),
            },
        }
    }
}

/// Unchecked wire form of [`Shape`]; validated and clamped on load.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ShapeRepr {
    Point { at: ScenePoint },
    Segment { start: ScenePoint, end: ScenePoint },
    Path { points: Vec<ScenePoint> },
}

impl TryFrom<ShapeRepr> for Shape {
    type Error = String;

    fn try_from(repr: ShapeRepr) -> Result<Self, Self::Error> {
        let clamp = |p: ScenePoint| ScenePoint::new(p.x, p.y);
        match repr {
            ShapeRepr::Point { at } => Ok(Shape::point(clamp(at))),
            ShapeRepr::Segment { start, end } => Ok(Shape::segment(clamp(start), clamp(end))),
            ShapeRepr::Path { points } => {
                let n = points.len();
                Shape::path(points.into_iter().map(clamp).collect())
                    .ok_or_else(|| format!("path needs at least 2 points, got {n}"))
            }
        }
    }
}

/// Which end of an element a drag moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    Start,
    End,
}

// ─── Kind-specific attributes ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pose {
    #[default]
    Auto,
    Standing,
    Sitting,
    Lying,
}

impl Pose {
    /// Word inserted before a person's label, `None` for `Auto`.
    pub fn word(self) -> Option<&'static str> {
        match self {
            Pose::Auto => None,
            Pose::Standing => Some("standing"),
            Pose::Sitting => Some("sitting"),
            Pose::Lying => Some("lying"),
        }
    }
}

/// Install side of a linear light: visible fixture or concealed cove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallSide {
    #[default]
    Front,
    Back,
}

pub const DEFAULT_KELVIN: u32 = 3000;

/// Element kind, carrying the attributes that only make sense for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    Person {
        #[serde(default)]
        pose: Pose,
    },
    Animal,
    Vehicle,
    Plant,
    Lighting {
        #[serde(default = "default_kelvin")]
        kelvin: u32,
        #[serde(default)]
        install_side: InstallSide,
    },
    Furniture,
}

fn default_kelvin() -> u32 {
    DEFAULT_KELVIN
}

impl ElementKind {
    pub fn person() -> Self {
        ElementKind::Person { pose: Pose::Auto }
    }

    pub fn lighting() -> Self {
        ElementKind::Lighting {
            kelvin: DEFAULT_KELVIN,
            install_side: InstallSide::Front,
        }
    }

    /// Short name used as id prefix.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Person { .. } => "person",
            ElementKind::Animal => "animal",
            ElementKind::Vehicle => "vehicle",
            ElementKind::Plant => "plant",
            ElementKind::Lighting { .. } => "lighting",
            ElementKind::Furniture => "furniture",
        }
    }

    /// Noun used when the element has no label.
    pub fn noun(&self) -> &'static str {
        match self {
            ElementKind::Lighting { .. } => "light",
            other => other.name(),
        }
    }

    pub fn is_lighting(&self) -> bool {
        matches!(self, ElementKind::Lighting { .. })
    }
}

// ─── Images ──────────────────────────────────────────────────────────────

/// An encoded image payload with its MIME type.
///
/// Bytes are reference-counted so history snapshots and job thumbnails
/// share one allocation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Arc<[u8]>,
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::sync::Arc;

    pub fn serialize<S: Serializer>(bytes: &Arc<[u8]>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Arc<[u8]>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD
            .decode(s.as_bytes())
            .map(Arc::from)
            .map_err(serde::de::Error::custom)
    }
}

// ─── Scene element ───────────────────────────────────────────────────────

/// One placed object or light path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneElement {
    pub id: ElementId,
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(default)]
    pub label: String,
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<ImageData>,
}

impl SceneElement {
    /// New element with a fresh id.
    pub fn new(kind: ElementKind, label: impl Into<String>, shape: Shape) -> Self {
        Self {
            id: ElementId::fresh(kind.name()),
            kind,
            label: label.into(),
            shape,
            reference_image: None,
        }
    }

    pub fn anchor(&self) -> ScenePoint {
        self.shape.anchor()
    }

    /// Lighting whose shape is a segment or path.
    pub fn is_linear_light(&self) -> bool {
        self.kind.is_lighting() && self.shape.is_linear()
    }

    /// Label, or the kind's noun when the label is blank.
    pub fn display_label(&self) -> &str {
        let trimmed = self.label.trim();
        if trimmed.is_empty() {
            self.kind.noun()
        } else {
            trimmed
        }
    }

    pub fn kelvin(&self) -> Option<u32> {
        match self.kind {
            ElementKind::Lighting { kelvin, .. } => Some(kelvin),
            _ => None,
        }
    }

    pub fn install_side(&self) -> Option<InstallSide> {
        match self.kind {
            ElementKind::Lighting { install_side, .. } => Some(install_side),
            _ => None,
        }
    }

    /// Move one handle. Paths are immutable and points have no end handle;
    /// returns `false` when the move was rejected.
    pub fn move_handle(&mut self, handle: Handle, to: ScenePoint) -> bool {
        let to = ScenePoint::new(to.x, to.y);
        match (&mut self.shape, handle) {
            (Shape::Path { .. }, _) => false,
            (Shape::Point { at }, Handle::Start) => {
                *at = to;
                true
            }
            (Shape::Point { .. }, Handle::End) => false,
            (Shape::Segment { start, .. }, Handle::Start) => {
                *start = to;
                true
            }
            (Shape::Segment { end, .. }, Handle::End) => {
                *end = to;
                true
            }
        }
    }

    /// Copy with a fresh id and every coordinate offset (clamped).
    pub fn duplicated(&self, offset: f32) -> SceneElement {
        SceneElement {
            id: ElementId::fresh(self.kind.name()),
            kind: self.kind,
            label: self.label.clone(),
            shape: self.shape.offset(offset, offset),
            reference_image: self.reference_image.clone(),
        }
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// The element list owned by an editing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub elements: Vec<SceneElement>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<SceneElement>) -> Self {
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&SceneElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut SceneElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn push(&mut self, element: SceneElement) {
        self.elements.push(element);
    }

    /// Remove an element, returning it if present.
    pub fn remove(&mut self, id: ElementId) -> Option<SceneElement> {
        let pos = self.elements.iter().position(|e| e.id == id)?;
        Some(self.elements.remove(pos))
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneElement> {
        self.elements.iter()
    }

    pub fn has_linear_lights(&self) -> bool {
        self.elements.iter().any(SceneElement::is_linear_light)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scene_point_clamps_out_of_range_and_nan() {
        assert_eq!(ScenePoint::new(-5.0, 140.0), ScenePoint { x: 0.0, y: 100.0 });
        assert_eq!(ScenePoint::new(f32::NAN, f32::INFINITY).x, 0.0);
        assert_eq!(ScenePoint::new(99.0, 99.0).offset(2.0, 2.0), ScenePoint::new(100.0, 100.0));
    }

    #[test]
    fn path_requires_two_points() {
        assert!(Shape::path(vec![ScenePoint::new(1.0, 1.0)]).is_none());
        let shape = Shape::path(vec![ScenePoint::new(1.0, 1.0), ScenePoint::new(5.0, 9.0)]).unwrap();
        assert_eq!(shape.anchor(), ScenePoint::new(1.0, 1.0));
        assert_eq!(shape.end(), Some(ScenePoint::new(5.0, 9.0)));
    }

    #[test]
    fn path_elements_reject_handle_moves() {
        let shape = Shape::path(vec![ScenePoint::new(1.0, 1.0), ScenePoint::new(5.0, 9.0)]).unwrap();
        let mut el = SceneElement::new(ElementKind::lighting(), "strip", shape.clone());
        assert!(!el.move_handle(Handle::Start, ScenePoint::new(50.0, 50.0)));
        assert_eq!(el.shape, shape);
    }

    #[test]
    fn segment_handles_move_independently() {
        let mut el = SceneElement::new(
            ElementKind::lighting(),
            "strip",
            Shape::segment(ScenePoint::new(10.0, 10.0), ScenePoint::new(20.0, 10.0)),
        );
        assert!(el.move_handle(Handle::End, ScenePoint::new(130.0, 40.0)));
        assert_eq!(el.anchor(), ScenePoint::new(10.0, 10.0));
        assert_eq!(el.shape.end(), Some(ScenePoint::new(100.0, 40.0)));
    }

    #[test]
    fn duplicate_near_boundary_stays_in_range() {
        let el = SceneElement::new(
            ElementKind::Plant,
            "fern",
            Shape::point(ScenePoint::new(99.5, 98.9)),
        );
        let copy = el.duplicated(2.0);
        assert_ne!(copy.id, el.id);
        assert_eq!(copy.anchor(), ScenePoint::new(100.0, 100.0));
    }

    #[test]
    fn display_label_falls_back_to_noun() {
        let el = SceneElement::new(ElementKind::lighting(), "  ", Shape::point(ScenePoint::new(0.0, 0.0)));
        assert_eq!(el.display_label(), "light");
    }

    #[test]
    fn element_json_shape() {
        let el = SceneElement {
            id: ElementId::intern("lamp_a"),
            kind: ElementKind::lighting(),
            label: "lamp".into(),
            shape: Shape::point(ScenePoint::new(20.0, 20.0)),
            reference_image: None,
        };
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["kind"], "lighting");
        assert_eq!(json["kelvin"], 3000);
        assert_eq!(json["shape"]["type"], "point");
        let back: SceneElement = serde_json::from_value(json).unwrap();
        assert_eq!(back, el);
    }

    #[test]
    fn deserialized_shapes_are_validated() {
        let bad = serde_json::json!({ "type": "path", "points": [{ "x": 1.0, "y": 1.0 }] });
        assert!(serde_json::from_value::<Shape>(bad).is_err());
        let wild = serde_json::json!({ "type": "point", "at": { "x": -3.0, "y": 250.0 } });
        let shape: Shape = serde_json::from_value(wild).unwrap();
        assert_eq!(shape.anchor(), ScenePoint::new(0.0, 100.0));
    }

    #[test]
    fn image_data_serializes_as_base64() {
        let img = ImageData::new("image/png", vec![1u8, 2, 3]);
        let json = serde_json::to_value(&img).unwrap();
        assert_eq!(json["bytes"], "AQID");
    }
}
