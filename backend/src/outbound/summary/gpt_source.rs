//! Reqwest-backed `SummarySource` adapter for a chat-completion endpoint.
//!
//! Owns transport details only: request serialisation, HTTP error mapping,
//! and decoding the first completion choice into plain summary text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::domain::ports::{SummarySource, SummarySourceError};

use super::dto::{CompletionRequestDto, CompletionResponseDto, MessageDto};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const SYSTEM_PROMPT: &str =
    "You are a news desk assistant. Summarise the article in three short sentences.";

/// Chat-completion summary source.
pub struct GptSummarySource {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl GptSummarySource {
    /// Build an adapter against one completion endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

/// Pull the summary text out of a decoded completion response.
pub(crate) fn extract_summary(
    response: CompletionResponseDto,
) -> Result<String, SummarySourceError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| SummarySourceError::malformed("response contained no choices"))?;
    let text = choice.message.content.trim().to_owned();
    if text.is_empty() {
        return Err(SummarySourceError::malformed("choice contained no text"));
    }
    Ok(text)
}

#[async_trait]
impl SummarySource for GptSummarySource {
    async fn summarize(&self, title: &str, content: &str) -> Result<String, SummarySourceError> {
        let request = CompletionRequestDto {
            model: &self.model,
            messages: vec![
                MessageDto {
                    role: "system",
                    content: SYSTEM_PROMPT.to_owned(),
                },
                MessageDto {
                    role: "user",
                    content: format!("{title}\n\n{content}"),
                },
            ],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| SummarySourceError::unreachable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(SummarySourceError::unreachable(format!(
                "summary endpoint returned {}",
                response.status()
            )));
        }

        let decoded: CompletionResponseDto = response
            .json()
            .await
            .map_err(|err| SummarySourceError::malformed(err.to_string()))?;
        extract_summary(decoded)
    }
}
