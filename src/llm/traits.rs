use crate::messages::Message;
use futures_util::{Stream, stream};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Text deltas as the model produces them.
pub type TextStream = Pin<Box<dyn Stream<Item = anyhow::Result<String>> + Send + 'static>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatMessage {
    /// Tool results are reported back to the model as user-side observations.
    fn from(message: &Message) -> Self {
        match message {
            Message::User { content } => Self::user(content.clone()),
            Message::Assistant { content } => Self::assistant(content.clone()),
            Message::System { content } => Self::system(content.clone()),
            Message::ToolResult { .. } => Self::user(message.render()),
        }
    }
}

/// Model name and sampling temperature for one kind of call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f64,
}

impl ModelSettings {
    pub fn new(model: impl Into<String>, temperature: f64) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }
}

pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "openai").
    fn name(&self) -> &str;

    fn chat<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        messages: &'a [ChatMessage],
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;

    /// Stream the reply as text deltas. Providers without streaming support
    /// yield the whole reply as one chunk.
    fn chat_stream<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        messages: &'a [ChatMessage],
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<TextStream>> + Send + 'a>> {
        Box::pin(async move {
            let text = self
                .chat(system_prompt, messages, model, temperature)
                .await?;
            Ok(Box::pin(stream::once(async move { Ok(text) })) as TextStream)
        })
    }
}
