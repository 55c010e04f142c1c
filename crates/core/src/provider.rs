use std::{collections::HashMap, fmt, str::FromStr};

use crate::error::SummarizeError;

/// Hosted model a summary request is sent to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    OpenAi,
    Mixtral,
}

/// How the backend is asked to constrain its reply to the summary shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructuredOutput {
    /// Force a call to a single function whose parameters are the schema.
    ToolCall,
    /// `response_format` JSON mode with the schema attached.
    JsonObject,
}

pub struct BackendConfig {
    pub base_url: &'static str,
    pub model: &'static str,
    pub env_var: &'static str,
    pub structured_output: StructuredOutput,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::OpenAi, Backend::Mixtral];

    pub fn config(&self) -> BackendConfig {
        match self {
            Backend::OpenAi => BackendConfig {
                base_url: "https://api.openai.com/v1",
                model: "gpt-4-turbo-preview",
                env_var: "OPENAI_API_KEY",
                structured_output: StructuredOutput::ToolCall,
            },
            Backend::Mixtral => BackendConfig {
                base_url: "https://api.together.xyz/v1",
                model: "mistralai/Mixtral-8x7B-Instruct-v0.1",
                env_var: "TOGETHERAI_API_KEY",
                structured_output: StructuredOutput::JsonObject,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::OpenAi => "openai",
            Backend::Mixtral => "mixtral",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Backend::OpenAi => &["openai", "default"],
            Backend::Mixtral => &["mixtral", "alternate"],
        }
    }

    /// Look up the API key for this backend. Unset and empty values are both rejected.
    pub fn api_key(&self, credentials: &dyn CredentialSource) -> Result<String, SummarizeError> {
        let config = self.config();
        credentials
            .get(config.env_var)
            .filter(|key| !key.trim().is_empty())
            .ok_or(SummarizeError::MissingApiKey {
                backend: self.name(),
                env_var: config.env_var,
            })
    }

    /// Validate that the API key is set in the process environment
    pub fn validate_api_key(&self) -> Result<String, SummarizeError> {
        self.api_key(&EnvCredentials)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = SummarizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|b| b.aliases().contains(&s))
            .ok_or_else(|| SummarizeError::UnknownOption {
                option: "backend",
                value: s.to_string(),
                expected: "openai (default), mixtral (alternate)",
            })
    }
}

/// Where API keys are read from.
pub trait CredentialSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads credentials from the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl CredentialSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl CredentialSource for HashMap<&'static str, &'static str> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).map(|v| v.to_string())
    }
}
