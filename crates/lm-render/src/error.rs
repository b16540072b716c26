use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to decode source image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode guide image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("image has no pixels")]
    EmptyImage,
}
