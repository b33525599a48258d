use super::{MathTool, SearchTool, ToolRegistry};
use crate::config::Config;
use crate::llm::{ModelSettings, Provider};
use std::sync::Arc;

/// Build the registry of enabled tools.
///
/// Search is skipped with a warning when no API key is configured. Math
/// translates word problems with `provider` at temperature 0.
pub fn all_tools(config: &Config, provider: Option<Arc<dyn Provider>>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    let search = &config.tools.search;
    if search.enabled {
        match search.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => registry.register(Box::new(SearchTool::new(
                key.to_string(),
                search.endpoint.clone(),
                search.max_results,
            ))),
            None => tracing::warn!("search tool disabled: set TAVILY_API_KEY or tools.search.api_key"),
        }
    }

    if config.tools.math.enabled {
        registry.register(Box::new(MathTool::new(
            provider,
            ModelSettings::new(config.model.clone(), 0.0),
        )));
    }

    registry
}
