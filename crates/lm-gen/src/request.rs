//! Assembling one outbound generation request from editor state.

use crate::error::{GenResult, GenerationError};
use lm_core::{AspectRatio, ElementId, ImageData, OutputKind, PromptSettings, Scene, synthesize};
use lm_render::{GuideStyle, compose_guide_image, image_dimensions};
use serde::{Deserialize, Serialize};

/// Everything the user chose that is not part of the scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    #[serde(flatten)]
    pub prompt: PromptSettings,
    pub aspect_ratio: AspectRatio,
}

/// A fully resolved request, ready for the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub kind: OutputKind,
    pub prompt: String,
    /// The source with the light guide burned in (or the source itself).
    pub image: ImageData,
    /// Never `Original`.
    pub aspect_ratio: AspectRatio,
    /// Reference images in prompt ordinal order. Empty for video.
    pub references: Vec<ImageData>,
    /// The element each reference belongs to, same order as `references`.
    pub reference_owners: Vec<ElementId>,
}

impl GenerationRequest {
    /// Synthesize the prompt, composite the guide and resolve the aspect
    /// ratio. Fails without side effects on missing or undecodable input.
    pub fn assemble(
        settings: &GenerationSettings,
        scene: &Scene,
        source: &ImageData,
        kind: OutputKind,
        style: &GuideStyle,
    ) -> GenResult<Self> {
        if source.is_empty() {
            return Err(GenerationError::Input("select an image first".into()));
        }
        let (width, height) = image_dimensions(&source.bytes)?;

        let prompt = synthesize(&settings.prompt, scene, kind);
        let image = compose_guide_image(source, scene, style)?;

        let aspect_ratio = match kind {
            OutputKind::Image => settings.aspect_ratio.resolve(width, height),
            OutputKind::Video => settings.aspect_ratio.for_video(width, height),
        };

        let (references, reference_owners) = match kind {
            OutputKind::Image => (
                prompt.reference_images(),
                prompt.references.iter().map(|r| r.element).collect(),
            ),
            OutputKind::Video => (Vec::new(), Vec::new()),
        };

        log::debug!(
            "assembled {kind:?} request: {aspect_ratio}, {} references, guide {} bytes",
            references.len(),
            image.len()
        );
        Ok(Self {
            kind,
            prompt: prompt.text,
            image,
            aspect_ratio,
            references,
            reference_owners,
        })
    }
}
