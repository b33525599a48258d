use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) =
            std::env::var("LLM_COMPILER_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY"))
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }

        if let Ok(url) = std::env::var("LLM_COMPILER_API_URL")
            && !url.is_empty()
        {
            self.api_url = url;
        }

        if let Ok(model) = std::env::var("LLM_COMPILER_MODEL")
            && !model.is_empty()
        {
            self.model = model;
        }

        if let Ok(temp_str) = std::env::var("LLM_COMPILER_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.temperature = temp;
        }

        if let Ok(key) = std::env::var("TAVILY_API_KEY")
            && !key.is_empty()
        {
            self.tools.search.api_key = Some(key);
        }
    }
}
