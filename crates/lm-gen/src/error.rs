use lm_render::RenderError;
use thiserror::Error;

pub type GenResult<T> = Result<T, GenerationError>;

/// Everything that can stop a generation, local or remote.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Overload or rate limit; eligible for retry.
    #[error("service temporarily unavailable: {message}")]
    Transient {
        status: Option<u16>,
        message: String,
    },

    /// Missing or rejected credential. Never retried.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// The call succeeded but produced nothing usable (e.g. safety filtering).
    #[error("no result: {0}")]
    EmptyResult(String),

    /// Rejected before any job was created.
    #[error("{0}")]
    Input(String),

    #[error("remote error: {message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("a generation is already in progress")]
    Busy,
}

impl GenerationError {
    /// Sort a remote failure by HTTP status and message text.
    pub fn classify(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        if is_transient_signature(status, &message) {
            GenerationError::Transient { status, message }
        } else if is_auth_signature(status, &message) {
            GenerationError::Unauthorized(message)
        } else {
            GenerationError::Remote { status, message }
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, GenerationError::Transient { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GenerationError::Unauthorized(_))
    }
}

fn is_transient_signature(status: Option<u16>, message: &str) -> bool {
    matches!(status, Some(429 | 503))
        || message.to_ascii_lowercase().contains("overloaded")
        || message.contains("UNAVAILABLE")
}

fn is_auth_signature(status: Option<u16>, message: &str) -> bool {
    matches!(status, Some(401 | 403))
        || message.contains("PERMISSION_DENIED")
        || message.to_ascii_lowercase().contains("permission denied")
        || message.contains("API key not valid")
        || message.contains("Requested entity was not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_transient() {
        assert!(GenerationError::classify(Some(503), "backend error").is_transient());
        assert!(GenerationError::classify(Some(429), "slow down").is_transient());
        assert!(GenerationError::classify(None, "The model is Overloaded").is_transient());
        assert!(GenerationError::classify(None, "status: UNAVAILABLE").is_transient());
    }

    #[test]
    fn classify_unauthorized() {
        for (status, msg) in [
            (Some(401), "nope"),
            (Some(403), "nope"),
            (None, "PERMISSION_DENIED: caller lacks access"),
            (None, "Permission denied on resource"),
            (None, "API key not valid. Please pass a valid API key."),
            (None, "Requested entity was not found."),
        ] {
            assert!(
                GenerationError::classify(status, msg).is_unauthorized(),
                "{status:?} {msg}"
            );
        }
    }

    #[test]
    fn transient_wins_over_auth_text() {
        let err = GenerationError::classify(Some(503), "permission denied");
        assert!(err.is_transient());
    }

    #[test]
    fn everything_else_is_remote() {
        let err = GenerationError::classify(Some(400), "invalid argument");
        assert!(matches!(err, GenerationError::Remote { status: Some(400), .. }));
        assert_eq!(err.to_string(), "remote error: invalid argument");
    }
}
