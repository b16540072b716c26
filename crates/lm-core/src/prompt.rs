//! Prompt synthesis: scene state → one natural-language generation prompt.
//!
//! Pure and deterministic. Clause order is fixed:
//!
//! 1. base description (default filler when blank)
//! 2. mood
//! 3. enhancements, in declaration order
//! 4. preservation flags, then the free-text "do not alter" clause
//! 5. `Include exactly: …` listing every element
//! 6. stray-light guard when any linear light exists
//! 7. closing clause for the output kind
//! 8. quality suffix
//!
//! Reference images are numbered by first occurrence among elements that
//! carry one. The same order is used for the outbound image list, so
//! `#N` in the text always names the N-th attached image.

use crate::id::ElementId;
use crate::model::{ImageData, InstallSide, Scene, SceneElement, Shape};
use crate::position::describe_point;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub const DEFAULT_BASE: &str = "A photorealistic rendering of this scene.";
pub const STRAY_LIGHT_GUARD: &str =
    "Render light only along the marked guide lines; do not add stray light elsewhere.";
pub const QUALITY_SUFFIX: &str = "High quality, realistic lighting, sharp focus.";

/// What the remote service is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Image,
    Video,
}

impl OutputKind {
    fn closing(self) -> &'static str {
        match self {
            OutputKind::Image => "Output a single photorealistic still image of the same scene.",
            OutputKind::Video => {
                "Animate the scene with subtle, natural camera motion while keeping every element consistent."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Unchanged,
    Daylight,
    Evening,
    Night,
}

impl Mood {
    fn clause(self) -> Option<&'static str> {
        match self {
            Mood::Unchanged => None,
            Mood::Daylight => Some("Set the mood to bright natural daylight."),
            Mood::Evening => {
                Some("Set the mood to a warm evening atmosphere with soft ambient light.")
            }
            Mood::Night => {
                Some("Set the mood to night time, with the scene lit mainly by artificial lights.")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enhancement {
    Details,
    Lighting,
    Colors,
    Declutter,
}

impl Enhancement {
    pub const ALL: [Enhancement; 4] = [
        Enhancement::Details,
        Enhancement::Lighting,
        Enhancement::Colors,
        Enhancement::Declutter,
    ];

    fn clause(self) -> &'static str {
        match self {
            Enhancement::Details => "Enhance fine details and material textures.",
            Enhancement::Lighting => "Improve the overall lighting balance and exposure.",
            Enhancement::Colors => "Make colors vivid but natural.",
            Enhancement::Declutter => "Remove clutter and visual noise.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preservation {
    Structure,
    Furniture,
    Materials,
    Camera,
}

impl Preservation {
    pub const ALL: [Preservation; 4] = [
        Preservation::Structure,
        Preservation::Furniture,
        Preservation::Materials,
        Preservation::Camera,
    ];

    fn clause(self) -> &'static str {
        match self {
            Preservation::Structure => {
                "Preserve the existing architecture, walls and windows exactly."
            }
            Preservation::Furniture => "Keep existing furniture unchanged.",
            Preservation::Materials => "Keep existing materials and finishes unchanged.",
            Preservation::Camera => "Keep the original camera angle and framing.",
        }
    }
}

/// Global prompt settings chosen by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    pub base_text: String,
    pub mood: Mood,
    pub enhancements: Vec<Enhancement>,
    pub preserve: Vec<Preservation>,
    pub custom_preservation: String,
}

/// One reference image bound to an element, numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceBinding {
    pub ordinal: usize,
    pub element: ElementId,
    pub image: ImageData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedPrompt {
    pub text: String,
    /// Reference images in the order they must be attached.
    pub references: SmallVec<[ReferenceBinding; 4]>,
}

impl SynthesizedPrompt {
    pub fn reference_images(&self) -> Vec<ImageData> {
        self.references.iter().map(|r| r.image.clone()).collect()
    }
}

/// Build the prompt text and reference bindings for a scene.
pub fn synthesize(settings: &PromptSettings, scene: &Scene, kind: OutputKind) -> SynthesizedPrompt {
    let mut clauses: Vec<String> = Vec::new();

    clauses.push(base_clause(&settings.base_text));

    if let Some(mood) = settings.mood.clause() {
        clauses.push(mood.to_string());
    }

    for enhancement in Enhancement::ALL {
        if settings.enhancements.contains(&enhancement) {
            clauses.push(enhancement.clause().to_string());
        }
    }

    for flag in Preservation::ALL {
        if settings.preserve.contains(&flag) {
            clauses.push(flag.clause().to_string());
        }
    }
    let custom = settings.custom_preservation.trim();
    if !custom.is_empty() {
        clauses.push(format!("Do not alter: {}.", custom.trim_end_matches('.')));
    }

    let mut references: SmallVec<[ReferenceBinding; 4]> = SmallVec::new();
    let mut descriptions = Vec::with_capacity(scene.len());
    for element in scene.iter() {
        let ordinal = element.reference_image.as_ref().map(|image| {
            let ordinal = references.len() + 1;
            references.push(ReferenceBinding {
                ordinal,
                element: element.id,
                image: image.clone(),
            });
            ordinal
        });
        descriptions.push(describe_element(element, ordinal));
    }
    if !descriptions.is_empty() {
        clauses.push(format!("Include exactly: {}.", descriptions.join(", ")));
    }

    if scene.has_linear_lights() {
        clauses.push(STRAY_LIGHT_GUARD.to_string());
    }

    clauses.push(kind.closing().to_string());
    clauses.push(QUALITY_SUFFIX.to_string());

    let text = clauses.join(" ");
    log::debug!(
        "synthesized {kind:?} prompt: {} chars, {} elements, {} references",
        text.len(),
        scene.len(),
        references.len()
    );
    SynthesizedPrompt { text, references }
}

fn base_clause(base: &str) -> String {
    let base = base.trim();
    if base.is_empty() {
        return DEFAULT_BASE.to_string();
    }
    if base.ends_with(['.', '!', '?']) {
        base.to_string()
    } else {
        format!("{base}.")
    }
}

/// Describe one element. `reference` is its 1-based reference ordinal.
pub fn describe_element(element: &SceneElement, reference: Option<usize>) -> String {
    let mut noun = String::new();
    if let crate::model::ElementKind::Person { pose } = element.kind
        && let Some(word) = pose.word()
    {
        noun.push_str(word);
        noun.push(' ');
    }
    noun.push_str(element.display_label());
    let mut out = format!("{} {noun}", indefinite_article(&noun));

    match &element.shape {
        Shape::Point { at } => {
            out.push_str(" placed ");
            out.push_str(&describe_point(*at));
        }
        Shape::Segment { start, end } => {
            out.push_str(&format!(
                " as {} from {} to {}",
                install_phrase(element.install_side()),
                describe_point(*start),
                describe_point(*end)
            ));
        }
        Shape::Path { points } => {
            let first = points[0];
            let last = points[points.len() - 1];
            out.push_str(&format!(
                " as {} following the marked path from {} to {}",
                install_phrase(element.install_side()),
                describe_point(first),
                describe_point(last)
            ));
        }
    }

    if let Some(kelvin) = element.kelvin() {
        out.push_str(&format!(" (Light Color Temperature strictly: {kelvin} Kelvin)"));
    }
    if let Some(n) = reference {
        out.push_str(&format!(" (use reference image #{n} for its appearance)"));
    }
    out
}

/// "a" or "an" for the phrase, by the sound of its first word.
/// Acronyms are read letter by letter ("an LED strip", "a TV").
fn indefinite_article(phrase: &str) -> &'static str {
    let word = phrase.split_whitespace().next().unwrap_or_default();
    let Some(first) = word.chars().next() else {
        return "a";
    };
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    let acronym = letters.len() > 1 && letters.iter().all(|c| c.is_uppercase());
    if acronym {
        return if "AEFHILMNORSX".contains(first) { "an" } else { "a" };
    }
    let lower = word.to_lowercase();
    const CONSONANT_SOUND: [&str; 5] = ["uni", "use", "usu", "eu", "one"];
    const SILENT_H: [&str; 3] = ["hour", "honest", "heir"];
    if CONSONANT_SOUND.iter().any(|p| lower.starts_with(p)) {
        "a"
    } else if SILENT_H.iter().any(|p| lower.starts_with(p)) {
        "an"
    } else if lower.starts_with(['a', 'e', 'i', 'o', 'u']) {
        "an"
    } else {
        "a"
    }
}

fn install_phrase(side: Option<InstallSide>) -> &'static str {
    match side.unwrap_or_default() {
        InstallSide::Front => "direct surface installation",
        InstallSide::Back => "backlighting/cove lighting concealed behind the surface",
    }
}
