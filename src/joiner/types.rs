use serde::{Deserialize, Serialize};

/// The decision step's verdict on a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinDecision {
    pub thought: String,
    pub action: JoinAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JoinAction {
    /// Answer the user and stop.
    Finish { response: String },
    /// Plan again; `feedback` says what the next attempt should fix.
    Replan { feedback: String },
}

impl JoinDecision {
    pub fn finish(thought: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            action: JoinAction::Finish {
                response: response.into(),
            },
        }
    }

    pub fn replan(thought: impl Into<String>, feedback: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            action: JoinAction::Replan {
                feedback: feedback.into(),
            },
        }
    }
}

/// What the orchestration loop does after a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Finish(String),
    Replan,
}
