//! Outbound GPT summary adapter.

mod dto;
mod gpt_source;

pub use gpt_source::GptSummarySource;
