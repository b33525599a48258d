use super::traits::Decider;
use super::types::{JoinAction, JoinOutcome};
use crate::messages::{Message, next_task_index, recent_window};
use std::sync::Arc;

/// Applies a decision to the history.
pub struct Joiner {
    decider: Arc<dyn Decider>,
}

impl Joiner {
    pub fn new(decider: Arc<dyn Decider>) -> Self {
        Self { decider }
    }

    /// Decide on the entries since the latest user message, then append the
    /// thought and either the final answer or replan feedback.
    pub async fn join(&self, history: &mut Vec<Message>) -> anyhow::Result<JoinOutcome> {
        let decision = self.decider.decide(recent_window(history)).await?;
        history.push(Message::assistant(format!("Thought: {}", decision.thought)));

        match decision.action {
            JoinAction::Finish { response } => {
                tracing::info!("Join finished with a final answer");
                history.push(Message::assistant(response.clone()));
                Ok(JoinOutcome::Finish(response))
            }
            JoinAction::Replan { feedback } => {
                let next = next_task_index(history);
                tracing::info!(next_idx = next, "Join requested a replan");
                history.push(Message::system(format!(
                    "Context from last attempt: {feedback} - Begin counting at : {next}"
                )));
                Ok(JoinOutcome::Replan)
            }
        }
    }
}
