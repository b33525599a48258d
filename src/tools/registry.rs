use super::traits::{Tool, ToolSpec};
use crate::error::PlanError;
use std::collections::HashMap;
use std::sync::Arc;

/// Central registry of the tools a plan may reference.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let tool: Arc<dyn Tool> = Arc::from(tool);
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    /// Look up a tool a plan references, failing fast when it is missing.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>, PlanError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| PlanError::UnknownTool {
                name: name.to_string(),
            })
    }

    /// Registered tool names, in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Specs for all registered tools, in registration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.spec())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
