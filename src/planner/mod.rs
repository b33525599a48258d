//! Plan production and parsing.

mod literal;
mod llm;
mod parser;
mod prompt;
mod traits;
mod types;

pub use literal::{literal_or_raw, parse_literal};
pub use llm::LlmPlanner;
pub use parser::PlanParser;
pub use prompt::planner_prompt;
pub use traits::Planner;
pub use types::{JOIN, Task, TaskStream, TaskTool};
