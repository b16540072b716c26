pub mod aspect;
pub mod id;
pub mod model;
pub mod position;
pub mod prompt;

pub use aspect::AspectRatio;
pub use id::ElementId;
pub use model::*;
pub use position::{describe_point, position_descriptor};
pub use prompt::{
    Enhancement, Mood, OutputKind, Preservation, PromptSettings, ReferenceBinding,
    SynthesizedPrompt, synthesize,
};
