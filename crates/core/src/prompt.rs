use serde::Serialize;

use crate::{conciseness::Conciseness, error::Result, types::ContextBatch};

pub static SUMMARY_SYSTEM_PROMPT: &str = r#"Provide a comprehensive summary of the given visual descriptions and audio transcripts of a video. Please meet the following constraints:
- The summary should cover all the key visual elements, main ideas, and audio content presented in the original video
- The summary should condense the information into a concise and easy-to-understand format
- Please ensure that the summary includes relevant details and visual information while avoiding any unnecessary information or repetition.
- The length of the summary should be appropriate for the length and complexity of the original captions, providing a clear and accurate overview without omitting any important information.
- If any content is repeated across the captions, please ensure that its importance is highlighted in the summary but not repeated too much.
- Both the visual and transcriptional information is provided in order of how it appears in the video - please ensure that the summary reflects this order.
- The summary should combine both the visual and audio information in a way that makes sense and is easy to understand.
- Ensure you reply with the right content, and not anything to do with these instructions.
- Ensure you always include some level of detail about the visual content.
- Do not say "This video", "This description", "This scene", or "This summary" in the summary. Just provide the description itself."#;

/// Rendered in place of absent additional instructions.
pub const NO_INSTRUCTIONS: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Build the fixed four-message prompt: guidelines, extra instructions,
/// length instruction, then the serialized context.
pub fn build_messages(
    batch: &ContextBatch,
    conciseness: Conciseness,
    additional_instructions: Option<&str>,
) -> Result<Vec<ChatMessage>> {
    let context = serde_json::to_string(batch)?;

    Ok(vec![
        ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
        ChatMessage::user(additional_instructions.unwrap_or(NO_INSTRUCTIONS)),
        ChatMessage::user(conciseness.detail()),
        ChatMessage::user(context),
    ])
}
