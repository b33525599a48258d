use super::openai::OpenAiCompatibleProvider;
use super::traits::Provider;
use crate::config::Config;
use crate::config::schema::DEFAULT_API_URL;
use std::sync::Arc;

/// Build the chat provider described by `config`.
///
/// The hosted OpenAI endpoint requires a key; self-hosted compatible
/// endpoints (Ollama, vLLM, ...) may run without one.
pub fn create_provider(config: &Config) -> anyhow::Result<Arc<dyn Provider>> {
    let api_key = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());
    let hosted = config.api_url.trim_end_matches('/') == DEFAULT_API_URL;

    if hosted && api_key.is_none() {
        anyhow::bail!(
            "OpenAI API key not set. Set LLM_COMPILER_API_KEY or OPENAI_API_KEY, or add api_key to config.toml."
        );
    }

    let name = if hosted { "openai" } else { "compatible" };
    Ok(Arc::new(OpenAiCompatibleProvider::new(
        name,
        &config.api_url,
        api_key,
    )))
}
