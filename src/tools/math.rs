use super::expr::{evaluate, format_number};
use super::traits::{Tool, ToolResult};
use crate::llm::{ChatMessage, ModelSettings, Provider};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

const MATH_DESCRIPTION: &str = r#"math(problem, context=None) - Solves the provided math problem.
 - `problem` can be a plain expression (e.g. "1 + 3") or a word problem (e.g. "how many apples are there if there are 3 apples and 2 apples").
 - One expression per call. `math("1 + 3, 2 + 4")` does not work; call `math("1 + 3")` and `math("2 + 4")` separately.
 - Keep the number of math actions small: prefer `math("what is 110% of $1")` over two separate calls.
 - `context` is an optional list of strings. math does not see earlier outputs unless you pass them as `context`, e.g. `math("age of Barack Obama divided by two", context=["$1"])`.
 - Never put a search result directly into `problem`; pass it as `context` and name the units you want ("What is x in millions?")."#;

const TRANSLATE_PROMPT: &str = "Translate the math problem into a single-line numeric expression. \
The expression may use numbers, + - * / % ^ **, parentheses, the constants pi and e, and the \
functions sqrt, sin, cos, tan, ln, log, log10, exp, abs, floor, ceil and round. Put the \
expression in a ```text fenced block and write nothing else.\n\n\
Question: What is 37593 * 67?\n```text\n37593 * 67\n```\n\n\
Question: 37593^(1/5)\n```text\n37593**(1/5)\n```";

const CONTEXT_PROMPT: &str = "The following additional context is provided from other functions. \
Use it to substitute into any variables or other words in the problem. Context variables are not \
defined in the expression: extract the relevant numbers and write them directly.\n\nContext:\n";

/// Evaluates numeric expressions, asking a model to translate word problems
/// first.
pub struct MathTool {
    provider: Option<Arc<dyn Provider>>,
    settings: ModelSettings,
}

impl MathTool {
    pub fn new(provider: Option<Arc<dyn Provider>>, settings: ModelSettings) -> Self {
        Self { provider, settings }
    }

    async fn translate(&self, problem: &str, context: &str) -> anyhow::Result<Option<String>> {
        let Some(provider) = &self.provider else {
            return Ok(None);
        };

        let mut messages = vec![ChatMessage::user(problem)];
        if !context.is_empty() {
            messages.push(ChatMessage::system(format!("{CONTEXT_PROMPT}{context}")));
        }

        let reply = provider
            .chat(
                Some(TRANSLATE_PROMPT),
                &messages,
                &self.settings.model,
                self.settings.temperature,
            )
            .await?;
        Ok(extract_expression(&reply))
    }
}

impl Tool for MathTool {
    fn name(&self) -> &str {
        "math"
    }

    fn description(&self) -> &str {
        MATH_DESCRIPTION
    }

    fn args(&self) -> &[&str] {
        &["problem", "context"]
    }

    fn execute<'a>(
        &'a self,
        args: Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolResult>> + Send + 'a>> {
        Box::pin(async move {
            let problem = match args.get("problem") {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => anyhow::bail!("Missing 'problem' parameter"),
            };

            if let Ok(value) = evaluate(&problem) {
                return Ok(ToolResult::ok(format_number(value)));
            }

            let context = context_text(args.get("context"));
            let Some(expression) = self.translate(&problem, &context).await? else {
                return Ok(ToolResult::failure(format!(
                    "\"{}\" is not a numeric expression and no model is available to translate it",
                    problem.trim()
                )));
            };

            tracing::debug!(problem = %problem, expression = %expression, "Translated math problem");
            match evaluate(&expression) {
                Ok(value) => Ok(ToolResult::ok(format_number(value))),
                Err(e) => Ok(ToolResult::failure(format!(
                    "{e}. Please try again with a valid numerical expression"
                ))),
            }
        })
    }
}

/// Context may arrive as one string or a list of strings.
fn context_text(context: Option<&Value>) -> String {
    let text = match context {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    text.trim().to_string()
}

/// The expression inside a ```text fence, else the last non-empty line.
fn extract_expression(reply: &str) -> Option<String> {
    if let Some(start) = reply.find("```") {
        let after = &reply[start + 3..];
        let body_start = after.find('\n').map_or(0, |i| i + 1);
        let body = &after[body_start..];
        let body = body.find("```").map_or(body, |end| &body[..end]);
        let expression = body.trim();
        if !expression.is_empty() {
            return Some(expression.to_string());
        }
    }

    reply
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty() && !line.starts_with("```"))
        .map(ToString::to_string)
}
