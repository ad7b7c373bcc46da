use thiserror::Error;

pub type Result<T> = std::result::Result<T, MaintError>;

#[derive(Debug, Error)]
pub enum MaintError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("preset not found: {name}")]
    PresetNotFound { name: String },

    #[error("invalid preset {name} (line {line}): {message}")]
    InvalidPreset {
        name: String,
        line: usize,
        message: String,
    },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("{message}")]
    Exit { code: i32, message: String },
}

impl MaintError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exit { code, .. } => *code,
            _ => 1,
        }
    }

    #[must_use]
    pub fn exit(code: i32, message: impl Into<String>) -> Self {
        Self::Exit {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_preset(name: &str, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidPreset {
            name: name.to_string(),
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MaintError;

    #[test]
    fn exit_constructor_preserves_code_and_message() {
        let error = MaintError::exit(42, "boom");
        assert_eq!(error.exit_code(), 42);
        assert_eq!(error.to_string(), "boom");
    }

    #[test]
    fn non_exit_errors_map_to_code_one() {
        let error = MaintError::PresetNotFound {
            name: "neon".to_string(),
        };
        assert_eq!(error.exit_code(), 1);
        assert_eq!(error.to_string(), "preset not found: neon");
    }

    #[test]
    fn invalid_preset_reports_line_number() {
        let error = MaintError::invalid_preset("custom", 7, "missing `=>` separator");
        assert_eq!(
            error.to_string(),
            "invalid preset custom (line 7): missing `=>` separator"
        );
    }
}
