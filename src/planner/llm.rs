use super::prompt::planner_prompt;
use super::traits::Planner;
use crate::llm::{ChatMessage, ModelSettings, Provider, TextStream};
use crate::messages::{Message, ends_with_feedback};
use crate::tools::ToolRegistry;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Plans by streaming a chat model's reply.
///
/// The replanning prompt is used when the history ends in feedback.
pub struct LlmPlanner {
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    settings: ModelSettings,
}

impl LlmPlanner {
    pub fn new(
        provider: Arc<dyn Provider>,
        registry: Arc<ToolRegistry>,
        settings: ModelSettings,
    ) -> Self {
        Self {
            provider,
            registry,
            settings,
        }
    }
}

impl Planner for LlmPlanner {
    fn plan<'a>(
        &'a self,
        history: &'a [Message],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<TextStream>> + Send + 'a>> {
        Box::pin(async move {
            let replan = ends_with_feedback(history);
            let system = planner_prompt(&self.registry.specs(), replan);
            let messages: Vec<ChatMessage> = history.iter().map(ChatMessage::from).collect();

            tracing::debug!(replan, messages = messages.len(), "Requesting plan");
            self.provider
                .chat_stream(
                    Some(&system),
                    &messages,
                    &self.settings.model,
                    self.settings.temperature,
                )
                .await
        })
    }
}
