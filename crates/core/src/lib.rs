//! Recap Core Library
//!
//! Turns timestamped visual descriptions and audio transcript fragments of a
//! video into a structured summary using a hosted chat-completion model.

pub mod conciseness;
pub mod error;
pub mod format;
pub mod prompt;
pub mod provider;
pub mod summarizer;
pub mod types;

// Re-export commonly used items at crate root
pub use conciseness::Conciseness;
pub use error::{ErrorKind, Result, SummarizeError};
pub use format::{format_context_timeline, format_timestamp};
pub use provider::{Backend, BackendConfig, CredentialSource, EnvCredentials, StructuredOutput};
pub use summarizer::{Summarizer, summarize};
pub use types::{ContextBatch, ContextEntry, SummaryResult};

pub mod blocking {
    //! Blocking entry point for callers without an async runtime.

    use crate::{Backend, Conciseness, ContextBatch, Result, Summarizer, SummaryResult};

    /// Blocking form of [`crate::summarize`]. Must not be called from inside an async runtime.
    pub fn summarize(
        batch: &ContextBatch,
        conciseness: Conciseness,
        backend: Backend,
        additional_instructions: Option<&str>,
    ) -> Result<SummaryResult> {
        Summarizer::new().summarize_blocking(batch, conciseness, backend, additional_instructions)
    }
}
