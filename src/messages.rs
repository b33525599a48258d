//! The append-only message history shared by every stage of the loop.
//!
//! The history is the only state that survives between rounds: observations
//! from earlier rounds are recovered by scanning it, and the joiner decides
//! what the planner sees next by appending to it.

use crate::scheduler::Observation;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    ToolResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User {
        content: String,
    },
    Assistant {
        content: String,
    },
    System {
        content: String,
    },
    ToolResult {
        idx: u32,
        name: String,
        args: Map<String, Value>,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn tool_result(
        idx: u32,
        name: impl Into<String>,
        args: Map<String, Value>,
        observation: &Observation,
    ) -> Self {
        Self::ToolResult {
            idx,
            name: name.into(),
            args,
            content: observation.content().to_string(),
            is_error: observation.is_error(),
        }
    }

    pub fn role(&self) -> MessageRole {
        match self {
            Self::User { .. } => MessageRole::User,
            Self::Assistant { .. } => MessageRole::Assistant,
            Self::System { .. } => MessageRole::System,
            Self::ToolResult { .. } => MessageRole::ToolResult,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::User { content }
            | Self::Assistant { content }
            | Self::System { content }
            | Self::ToolResult { content, .. } => content,
        }
    }

    /// Index of a tool-result entry.
    pub fn tool_idx(&self) -> Option<u32> {
        match self {
            Self::ToolResult { idx, .. } => Some(*idx),
            _ => None,
        }
    }

    /// Render the entry as text for a chat model. Tool results are shown as
    /// the executed call followed by its observation.
    pub fn render(&self) -> String {
        match self {
            Self::ToolResult {
                idx,
                name,
                args,
                content,
                ..
            } => {
                let args = Value::Object(args.clone());
                format!("{idx}. {name}({args})\nObservation: {content}")
            }
            other => other.content().to_string(),
        }
    }
}

/// Observations already present in the history, keyed by task index.
pub fn observations(history: &[Message]) -> BTreeMap<u32, Observation> {
    let mut found = BTreeMap::new();
    for message in history.iter().rev() {
        if let Message::ToolResult {
            idx,
            content,
            is_error,
            ..
        } = message
        {
            let observation = if *is_error {
                Observation::Error(content.clone())
            } else {
                Observation::Output(content.clone())
            };
            found.entry(*idx).or_insert(observation);
        }
    }
    found
}

/// The index the next round's tasks must start counting from.
pub fn next_task_index(history: &[Message]) -> u32 {
    history
        .iter()
        .filter_map(Message::tool_idx)
        .max()
        .map_or(1, |highest| highest.saturating_add(1))
}

/// Every entry from the most recent user entry onward. Returns the whole
/// history when there is no user entry.
pub fn recent_window(history: &[Message]) -> &[Message] {
    let start = history
        .iter()
        .rposition(|message| message.role() == MessageRole::User)
        .unwrap_or(0);
    &history[start..]
}

/// Whether the last entry is replan feedback.
pub fn ends_with_feedback(history: &[Message]) -> bool {
    history
        .last()
        .is_some_and(|message| message.role() == MessageRole::System)
}
