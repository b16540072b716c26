//! `Studio` ties the editor to the generation pipeline.
//!
//! It owns the source image and the user's generation settings, and turns
//! "generate" into: synthesize prompt → composite guide → resolve aspect
//! ratio → submit.

use crate::backend::RemoteBackend;
use crate::config::GenerationConfig;
use crate::error::{GenResult, GenerationError};
use crate::orchestrator::Orchestrator;
use crate::request::{GenerationRequest, GenerationSettings};
use lm_core::{ImageData, OutputKind};
use lm_editor::{EditorConfig, EditorSession};
use lm_render::{GuideStyle, image_dimensions};
use uuid::Uuid;

pub struct Studio<B: RemoteBackend> {
    editor: EditorSession,
    source: Option<ImageData>,
    settings: GenerationSettings,
    guide_style: GuideStyle,
    orchestrator: Orchestrator<B>,
}

impl<B: RemoteBackend> Studio<B> {
    pub fn new(backend: B, editor: EditorConfig, generation: GenerationConfig) -> Self {
        Self {
            editor: EditorSession::new(editor),
            source: None,
            settings: GenerationSettings::default(),
            guide_style: GuideStyle::default(),
            orchestrator: Orchestrator::new(backend, generation),
        }
    }

    pub fn editor(&self) -> &EditorSession {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorSession {
        &mut self.editor
    }

    pub fn source(&self) -> Option<&ImageData> {
        self.source.as_ref()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut GenerationSettings {
        &mut self.settings
    }

    pub fn set_guide_style(&mut self, style: GuideStyle) {
        self.guide_style = style;
    }

    pub fn orchestrator(&self) -> &Orchestrator<B> {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut Orchestrator<B> {
        &mut self.orchestrator
    }

    /// Load a new source image. The scene, history and view are reset.
    /// Undecodable bytes are rejected and the current image is kept.
    pub fn load_image(&mut self, image: ImageData) -> GenResult<()> {
        let (width, height) = image_dimensions(&image.bytes)?;
        self.editor.replace_image(width, height);
        log::info!("loaded {width}x{height} {} ({} bytes)", image.mime_type, image.len());
        self.source = Some(image);
        Ok(())
    }

    pub fn clear_image(&mut self) {
        self.source = None;
        self.editor.clear();
    }

    /// Build the request `generate` would submit, without submitting.
    pub fn prepare(&self, kind: OutputKind) -> GenResult<GenerationRequest> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| GenerationError::Input("select an image first".into()))?;
        GenerationRequest::assemble(
            &self.settings,
            self.editor.scene(),
            source,
            kind,
            &self.guide_style,
        )
    }

    /// Start a generation. Refused without creating a job when there is
    /// no image, a job is already running, or the credential was rejected.
    pub fn generate(&mut self, kind: OutputKind) -> GenResult<Uuid> {
        let Some(source) = self.source.clone() else {
            return Err(GenerationError::Input("select an image first".into()));
        };
        let context = self.orchestrator.context();
        if context.busy {
            return Err(GenerationError::Busy);
        }
        if !context.authenticated {
            return Err(GenerationError::Unauthorized(
                "re-authorize before generating".into(),
            ));
        }
        let request = self.prepare(kind)?;
        Ok(self.orchestrator.submit(request, source))
    }
}
