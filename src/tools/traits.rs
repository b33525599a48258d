use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;

/// Result of a tool execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }
}

/// Description of a tool for the planner prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub args: Vec<String>,
}

/// A capability the planner may call by name.
pub trait Tool: Send + Sync {
    /// Tool name (as written in plan lines)
    fn name(&self) -> &str;

    /// Human-readable description, shown to the planner
    fn description(&self) -> &str;

    /// Declared argument names, in call order
    fn args(&self) -> &[&str];

    /// Execute the tool with resolved arguments
    fn execute<'a>(
        &'a self,
        args: Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolResult>> + Send + 'a>>;

    /// Get the full spec for prompt registration
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            args: self.args().iter().map(ToString::to_string).collect(),
        }
    }
}
