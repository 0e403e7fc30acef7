use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for picosky-feed operations
#[derive(Debug, Error, Diagnostic)]
pub enum FeedError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Fetch and stream payload errors
#[derive(Debug, Error, Diagnostic)]
pub enum WireError {
    #[error("failed to decode {what}")]
    #[diagnostic(code(wire::decode))]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {what}")]
    #[diagnostic(code(wire::encode))]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Outgoing post validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum DraftError {
    #[error("post is empty")]
    #[diagnostic(code(draft::empty))]
    Empty,

    #[error("post is {count} characters, limit is {limit}")]
    #[diagnostic(code(draft::too_long), help("posts are limited to {limit} characters"))]
    TooLong { count: usize, limit: usize },
}

/// Configuration errors
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("invalid configuration value for {field}: {message}")]
    #[diagnostic(
        code(config::invalid),
        help("Fix the {field} environment variable or remove it to use the default")
    )]
    Invalid { field: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_error_forwards_diagnostics() {
        let err = FeedError::from(DraftError::TooLong {
            count: 13,
            limit: 12,
        });
        assert_eq!(err.to_string(), "post is 13 characters, limit is 12");
        assert_eq!(
            err.code().map(|code| code.to_string()).as_deref(),
            Some("draft::too_long")
        );
    }
}
