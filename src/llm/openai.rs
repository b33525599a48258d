use super::sse::{SseBuffer, data_payloads};
use super::traits::{ChatMessage, Provider, TextStream};
use anyhow::Context;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const MAX_API_ERROR_CHARS: usize = 200;

/// Client for any endpoint speaking the OpenAI chat-completions protocol.
pub struct OpenAiCompatibleProvider {
    name: String,
    base_url: String,
    /// Pre-computed `"Bearer <key>"` header value.
    cached_auth_header: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatibleProvider {
    pub fn new(name: &str, base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cached_auth_header: api_key
                .filter(|k| !k.is_empty())
                .map(|k| format!("Bearer {k}")),
            client: Client::builder()
                .timeout(Duration::from_secs(300))
                .connect_timeout(Duration::from_secs(10))
                .pool_max_idle_per_host(10)
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request<'a>(
        system_prompt: Option<&'a str>,
        messages: &'a [ChatMessage],
        model: &'a str,
        temperature: f64,
        stream: bool,
    ) -> ChatRequest<'a> {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = system_prompt {
            wire.push(WireMessage {
                role: "system",
                content: system,
            });
        }
        wire.extend(messages.iter().map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));

        ChatRequest {
            model,
            messages: wire,
            temperature,
            stream,
        }
    }

    async fn send(&self, request: &ChatRequest<'_>) -> anyhow::Result<reqwest::Response> {
        let mut builder = self.client.post(self.chat_url()).json(request);
        if let Some(auth) = &self.cached_auth_header {
            builder = builder.header("Authorization", auth);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("{} request failed", self.name))?;

        if !response.status().is_success() {
            return Err(api_error(&self.name, response).await);
        }
        Ok(response)
    }
}

impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn chat<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        messages: &'a [ChatMessage],
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = Self::build_request(system_prompt, messages, model, temperature, false);
            let response = self.send(&request).await?;
            let body: ChatResponse = response
                .json()
                .await
                .with_context(|| format!("{} returned an unreadable response", self.name))?;

            body.choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| anyhow::anyhow!("No response from {}", self.name))
        })
    }

    fn chat_stream<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        messages: &'a [ChatMessage],
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<TextStream>> + Send + 'a>> {
        Box::pin(async move {
            let request = Self::build_request(system_prompt, messages, model, temperature, true);
            let response = self.send(&request).await?;
            Ok(sse_response_to_text_stream(response))
        })
    }
}

fn sse_response_to_text_stream(response: reqwest::Response) -> TextStream {
    let mut byte_stream = response.bytes_stream();

    let stream = async_stream::try_stream! {
        let mut sse_buffer = SseBuffer::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = chunk_result?;
            sse_buffer.push_chunk(&chunk);

            while let Some(event_block) = sse_buffer.next_event_block() {
                for text in chunk_deltas(&event_block) {
                    yield text;
                }
            }
        }

        if let Some(tail) = sse_buffer.take_remainder() {
            for text in chunk_deltas(&tail) {
                yield text;
            }
        }
    };

    Box::pin(stream)
}

/// Non-empty content deltas carried by one SSE event block.
fn chunk_deltas(event_block: &str) -> Vec<String> {
    data_payloads(event_block)
        .into_iter()
        .filter_map(|data| serde_json::from_str::<ChatCompletionChunk>(data).ok())
        .flat_map(|chunk| chunk.choices)
        .filter_map(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
        .collect()
}

/// Build a provider error from a failed HTTP response, keeping the body short.
async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
    let body = if body.chars().count() > MAX_API_ERROR_CHARS {
        let truncated: String = body.chars().take(MAX_API_ERROR_CHARS).collect();
        format!("{truncated}...")
    } else {
        body
    };
    anyhow::anyhow!("{provider} API error ({status}): {body}")
}
