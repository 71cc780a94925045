//! Wire payloads exchanged with the chat-completion summary endpoint.

use serde::{Deserialize, Serialize};

/// One chat message in the completion request.
#[derive(Debug, Serialize)]
pub(crate) struct MessageDto<'a> {
    /// Message role: `system` or `user`.
    pub role: &'a str,
    /// Message text.
    pub content: String,
}

/// Completion request body.
#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequestDto<'a> {
    /// Model identifier.
    pub model: &'a str,
    /// Conversation messages.
    pub messages: Vec<MessageDto<'a>>,
}

/// Completion response body; only the first choice is used.
#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponseDto {
    /// Returned choices.
    pub choices: Vec<ChoiceDto>,
}

/// One completion choice.
#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceDto {
    /// The generated message.
    pub message: ChoiceMessageDto,
}

/// Message inside a completion choice.
#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessageDto {
    /// Generated text.
    pub content: String,
}
