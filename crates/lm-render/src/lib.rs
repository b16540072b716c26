pub mod error;
pub mod guide;
pub mod hit;

pub use error::{RenderError, RenderResult};
pub use guide::{GuideStyle, compose_guide, compose_guide_image, image_dimensions, sniff_mime_type};
pub use hit::{Hit, HitRadius, hit_test};
