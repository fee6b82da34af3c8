use thiserror::Error;

/// Message used when neither configuration shape is satisfied
pub const INVALID_SHAPE_MESSAGE: &str = "define basePath and configFileName to load configuration from a config file\n\
or define compilerOptions and files to configure without a config file.";

/// Fatal problems raised while building a program
#[derive(Debug, Error)]
pub enum CompilationError {
    #[error("{}", INVALID_SHAPE_MESSAGE)]
    InvalidShape,

    #[error("failed to read config file.\n{message}")]
    ReadConfig { message: String },

    /// Aggregate of every blocking configuration diagnostic
    #[error("{}", .0.join("\n"))]
    Diagnostics(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompilationError {
    /// Individual causes carried by this error
    pub fn causes(&self) -> Vec<String> {
        match self {
            CompilationError::Diagnostics(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_shape_names_both_shapes() {
        let message = CompilationError::InvalidShape.to_string();
        assert!(message.contains("basePath and configFileName"));
        assert!(message.contains("compilerOptions and files"));
    }

    #[test]
    fn test_aggregate_lists_every_cause() {
        let error = CompilationError::Diagnostics(vec![
            "Unknown compiler option 'foo'.".to_string(),
            "Unknown compiler option 'bar'.".to_string(),
        ]);
        assert_eq!(
            error.to_string(),
            "Unknown compiler option 'foo'.\nUnknown compiler option 'bar'."
        );
        assert_eq!(error.causes().len(), 2);
    }

    #[test]
    fn test_read_config_wraps_message() {
        let error = CompilationError::ReadConfig {
            message: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "failed to read config file.\nexpected value at line 1 column 1"
        );
    }
}
