//! The finish-or-replan step that closes every round.

mod controller;
mod llm;
mod parse;
mod traits;
mod types;

pub use controller::Joiner;
pub use llm::LlmDecider;
pub use parse::parse_decision;
pub use traits::Decider;
pub use types::{JoinAction, JoinDecision, JoinOutcome};
