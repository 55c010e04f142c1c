use thiserror::Error;

/// Coarse classification of a [`SummarizeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Credential,
    InvalidInput,
    Transport,
    ResponseParse,
}

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("Unrecognized {option} option: {value:?} (expected one of: {expected})")]
    UnknownOption {
        option: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Missing API key: {env_var} environment variable is not set for the {backend} backend")]
    MissingApiKey {
        backend: &'static str,
        env_var: &'static str,
    },

    #[error("Context batch is empty")]
    EmptyContext,

    #[error("Invalid context entry at index {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("API returned {status}: {body}")]
    ApiStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Invalid API response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Response does not match the summary shape: {0}")]
    SchemaMismatch(#[from] serde_json::Error),
}

impl SummarizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SummarizeError::UnknownOption { .. } => ErrorKind::Configuration,
            SummarizeError::MissingApiKey { .. } => ErrorKind::Credential,
            SummarizeError::EmptyContext | SummarizeError::InvalidEntry { .. } => {
                ErrorKind::InvalidInput
            }
            SummarizeError::Http(_)
            | SummarizeError::Runtime(_)
            | SummarizeError::ApiStatus { .. } => ErrorKind::Transport,
            SummarizeError::InvalidResponse { .. } | SummarizeError::SchemaMismatch(_) => {
                ErrorKind::ResponseParse
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SummarizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_names_env_var() {
        let err = SummarizeError::MissingApiKey {
            backend: "alternate",
            env_var: "TOGETHERAI_API_KEY",
        };
        assert_eq!(err.kind(), ErrorKind::Credential);
        assert!(err.to_string().contains("TOGETHERAI_API_KEY"));
    }

    #[test]
    fn schema_mismatch_is_response_parse() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SummarizeError = json_err.into();
        assert_eq!(err.kind(), ErrorKind::ResponseParse);
    }

    #[test]
    fn input_errors_are_labeled() {
        assert_eq!(SummarizeError::EmptyContext.kind(), ErrorKind::InvalidInput);
        let err = SummarizeError::InvalidEntry {
            index: 2,
            reason: "start_time 4 is after end_time 1".into(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("index 2"));
    }
}
