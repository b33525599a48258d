use super::parse::parse_decision;
use super::traits::Decider;
use super::types::JoinDecision;
use crate::llm::{ChatMessage, ModelSettings, Provider};
use crate::messages::Message;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

const JOINER_PROMPT: &str = r#"Solve a question answering task. Here are some guidelines:
 - The conversation contains the results of a plan you have executed to answer the user's question.
 - The thought must reason about the question based on the Observations in 1-2 sentences.
 - Ignore irrelevant action results.
 - If the required information is present, give a concise but complete and helpful answer to the user's question.
 - If you are unable to give a satisfactory final answer, replan to get the required information.

Respond with one JSON object and nothing else, in one of these forms:
{"thought": "<reasoning>", "action": {"type": "finish", "response": "<the final answer for the user>"}}
{"thought": "<reasoning>", "action": {"type": "replan", "feedback": "<what went wrong and what the next plan should do>"}}"#;

const DECIDE_INSTRUCTION: &str = "Using the above previous actions, decide whether to replan or finish. \
If all the required information is present, you may finish. If you have made many attempts to find \
the information without success, admit so and respond with whatever information you have gathered \
so the user can work well with you.";

/// Decides by asking a chat model for a JSON verdict.
pub struct LlmDecider {
    provider: Arc<dyn Provider>,
    settings: ModelSettings,
}

impl LlmDecider {
    pub fn new(provider: Arc<dyn Provider>, settings: ModelSettings) -> Self {
        Self { provider, settings }
    }
}

impl Decider for LlmDecider {
    fn decide<'a>(
        &'a self,
        window: &'a [Message],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<JoinDecision>> + Send + 'a>> {
        Box::pin(async move {
            let mut messages: Vec<ChatMessage> = window.iter().map(ChatMessage::from).collect();
            messages.push(ChatMessage::system(DECIDE_INSTRUCTION));

            let reply = self
                .provider
                .chat(
                    Some(JOINER_PROMPT),
                    &messages,
                    &self.settings.model,
                    self.settings.temperature,
                )
                .await?;

            parse_decision(&reply).ok_or_else(|| {
                let preview: String = reply.chars().take(200).collect();
                anyhow::anyhow!("could not read a join decision from model output: {preview}")
            })
        })
    }
}
