//! Incremental parser for the line-oriented plan grammar.
//!
//! ```text
//! Thought: <text>
//! <idx>. <tool>(<args>)[ #comment]
//! ```
//!
//! Lines matching neither form (including `<END_OF_PLAN>`) are dropped.

use super::literal::literal_or_raw;
use super::types::{JOIN, Task, TaskStream, TaskTool};
use crate::error::PlanError;
use crate::llm::TextStream;
use crate::scheduler::resolve::placeholder_indices;
use crate::tools::ToolRegistry;
use futures_util::StreamExt;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

static THOUGHT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Thought: ([^\n]*)").expect("thought pattern is valid"));

static ACTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\. (\w+)\((.*)\)(\s*#\w+)?").expect("action pattern is valid")
});

/// Turns streamed plan text into tasks, one complete line at a time.
///
/// Holds the unterminated tail of the text and the pending thought between
/// calls to [`PlanParser::feed`].
pub struct PlanParser {
    registry: Arc<ToolRegistry>,
    buffer: String,
    thought: Option<String>,
}

impl PlanParser {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            buffer: String::new(),
            thought: None,
        }
    }

    /// Append a fragment and return tasks for every line it completed.
    pub fn feed(&mut self, chunk: &str) -> Result<Vec<Task>, PlanError> {
        self.buffer.push_str(chunk);

        let mut tasks = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            if let Some(task) = self.parse_line(&line[..newline])? {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// Parse whatever is left once the input has ended.
    pub fn finish(&mut self) -> Result<Option<Task>, PlanError> {
        let rest = std::mem::take(&mut self.buffer);
        self.parse_line(&rest)
    }

    /// Parse a complete plan in one go.
    pub fn parse(&mut self, text: &str) -> Result<Vec<Task>, PlanError> {
        let mut tasks = self.feed(text)?;
        tasks.extend(self.finish()?);
        Ok(tasks)
    }

    /// Parse a text stream lazily; each task is yielded as soon as its line
    /// is complete.
    pub fn parse_stream(mut self, mut chunks: TextStream) -> TaskStream {
        let stream = async_stream::try_stream! {
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                for task in self.feed(&chunk)? {
                    yield task;
                }
            }
            if let Some(task) = self.finish()? {
                yield task;
            }
        };
        Box::pin(stream)
    }

    fn parse_line(&mut self, line: &str) -> Result<Option<Task>, PlanError> {
        let line = line.trim_start();

        if let Some(caps) = THOUGHT_LINE.captures(line) {
            self.thought = Some(caps[1].trim_end().to_string());
            return Ok(None);
        }

        let Some(caps) = ACTION_LINE.captures(line) else {
            if !line.trim().is_empty() {
                tracing::trace!(line, "Ignoring plan line");
            }
            return Ok(None);
        };
        let Ok(idx) = caps[1].parse::<u32>() else {
            tracing::debug!(line, "Ignoring plan line with out-of-range index");
            return Ok(None);
        };

        let thought = self.thought.take();
        build_task(&self.registry, idx, &caps[2], &caps[3], thought).map(Some)
    }
}

fn build_task(
    registry: &ToolRegistry,
    idx: u32,
    name: &str,
    raw_args: &str,
    thought: Option<String>,
) -> Result<Task, PlanError> {
    if name == JOIN {
        return Ok(Task {
            idx,
            tool: TaskTool::Join,
            args: Map::new(),
            dependencies: (1..idx).collect(),
            thought,
        });
    }

    let tool = registry.lookup(name)?;
    let args = parse_args(raw_args, tool.args());
    let dependencies: BTreeSet<u32> = placeholder_indices(&Value::Object(args.clone()).to_string())
        .into_iter()
        .filter(|dep| (1..idx).contains(dep))
        .collect();

    Ok(Task {
        idx,
        tool: TaskTool::Tool(tool),
        args,
        dependencies,
        thought,
    })
}

/// Split `raw` at each `<key>=` in declared order. Text before the first
/// key found is discarded.
///
/// Text without any key goes to the first declared argument, so positional
/// calls such as `search("$1")` keep their argument and its `$N` references
/// count as dependencies. A strict keyword-only reading would drop both.
fn parse_args(raw: &str, declared: &[&str]) -> Map<String, Value> {
    let mut args = Map::new();
    if raw.is_empty() {
        return args;
    }

    let mut rest = raw;
    let mut current: Option<&str> = None;
    for key in declared {
        let marker = format!("{key}=");
        let Some(pos) = rest.find(&marker) else {
            continue;
        };
        if let Some(previous) = current {
            let value = rest[..pos].trim().trim_end_matches(',');
            args.insert(previous.to_string(), literal_or_raw(value));
        }
        rest = &rest[pos + marker.len()..];
        current = Some(key);
    }

    let tail = rest
        .trim()
        .trim_end_matches(',')
        .trim_end_matches(')');
    match current {
        Some(key) => {
            args.insert(key.to_string(), literal_or_raw(tail));
        }
        None => {
            if let Some(first) = declared.first() {
                args.insert((*first).to_string(), literal_or_raw(tail));
            }
        }
    }
    args
}
