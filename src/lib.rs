#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod agent;
pub mod config;
pub mod error;
pub mod joiner;
pub mod llm;
pub mod messages;
pub mod planner;
pub mod scheduler;
pub mod tools;

pub use agent::{CompilerAgent, Node, RoundEvent};
pub use config::Config;
pub use error::{CompilerError, ConfigError, PlanError};
pub use messages::Message;
