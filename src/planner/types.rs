use crate::tools::Tool;
use futures_util::Stream;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

/// Name of the sentinel task that closes every plan.
pub const JOIN: &str = "join";

/// Tasks in the order their plan lines complete.
pub type TaskStream = Pin<Box<dyn Stream<Item = anyhow::Result<Task>> + Send + 'static>>;

/// What a task invokes: a registered tool, or the join sentinel.
#[derive(Clone)]
pub enum TaskTool {
    Tool(Arc<dyn Tool>),
    Join,
}

impl TaskTool {
    pub fn name(&self) -> &str {
        match self {
            Self::Tool(tool) => tool.name(),
            Self::Join => JOIN,
        }
    }
}

impl fmt::Debug for TaskTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tool(tool) => f.debug_tuple("Tool").field(&tool.name()).finish(),
            Self::Join => f.write_str("Join"),
        }
    }
}

impl PartialEq for TaskTool {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

/// One planned tool invocation.
///
/// `dependencies` only ever holds indices below `idx`.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub idx: u32,
    pub tool: TaskTool,
    pub args: Map<String, Value>,
    pub dependencies: BTreeSet<u32>,
    pub thought: Option<String>,
}

impl Task {
    pub fn is_join(&self) -> bool {
        matches!(self.tool, TaskTool::Join)
    }

    pub fn name(&self) -> &str {
        self.tool.name()
    }
}
