use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::stream;
use llm_compiler::agent::CompilerAgent;
use llm_compiler::config::SchedulerConfig;
use llm_compiler::joiner::{Decider, JoinDecision, Joiner};
use llm_compiler::llm::TextStream;
use llm_compiler::messages::Message;
use llm_compiler::planner::Planner;
use llm_compiler::scheduler::TaskScheduler;
use llm_compiler::tools::{Tool, ToolRegistry, ToolResult};
use serde_json::{Map, Value};

/// Replays canned plan texts, streamed a few characters at a time.
pub struct ScriptedPlanner {
    plans: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedPlanner {
    pub fn new(plans: &[&str]) -> Self {
        Self {
            plans: Mutex::new(plans.iter().map(ToString::to_string).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<Vec<Message>> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Planner for ScriptedPlanner {
    fn plan<'a>(
        &'a self,
        history: &'a [Message],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<TextStream>> + Send + 'a>> {
        Box::pin(async move {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(history.to_vec());
            let plan = self
                .plans
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| "1. join()\n".to_string());

            let chars: Vec<char> = plan.chars().collect();
            let chunks: Vec<anyhow::Result<String>> = chars
                .chunks(3)
                .map(|chunk| Ok(chunk.iter().collect()))
                .collect();
            Ok(Box::pin(stream::iter(chunks)) as TextStream)
        })
    }
}

/// Replays canned decisions; replans forever once the script runs out.
pub struct ScriptedDecider {
    decisions: Mutex<VecDeque<JoinDecision>>,
}

impl ScriptedDecider {
    pub fn new(decisions: Vec<JoinDecision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into()),
        }
    }
}

impl Decider for ScriptedDecider {
    fn decide<'a>(
        &'a self,
        _window: &'a [Message],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<JoinDecision>> + Send + 'a>> {
        Box::pin(async move {
            Ok(self
                .decisions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| JoinDecision::replan("still missing", "try again")))
        })
    }
}

type Handler = dyn Fn(&Map<String, Value>) -> anyhow::Result<String> + Send + Sync;

/// A tool whose behaviour is a closure over its resolved arguments.
pub struct FnTool {
    name: &'static str,
    args: &'static [&'static str],
    handler: Box<Handler>,
}

impl FnTool {
    pub fn new(
        name: &'static str,
        args: &'static [&'static str],
        handler: impl Fn(&Map<String, Value>) -> anyhow::Result<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            args,
            handler: Box::new(handler),
        }
    }
}

impl Tool for FnTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "test tool"
    }

    fn args(&self) -> &[&str] {
        self.args
    }

    fn execute<'a>(
        &'a self,
        args: Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolResult>> + Send + 'a>> {
        Box::pin(async move { (self.handler)(&args).map(ToolResult::ok) })
    }
}

/// Sleeps, then echoes `query`, tracking how many calls overlap.
pub struct ProbeTool {
    in_flight: AtomicUsize,
    peak: Arc<AtomicUsize>,
    delay: Duration,
}

impl ProbeTool {
    pub fn new(delay: Duration) -> (Self, Arc<AtomicUsize>) {
        let peak = Arc::new(AtomicUsize::new(0));
        (
            Self {
                in_flight: AtomicUsize::new(0),
                peak: Arc::clone(&peak),
                delay,
            },
            peak,
        )
    }
}

impl Tool for ProbeTool {
    fn name(&self) -> &str {
        "probe"
    }

    fn description(&self) -> &str {
        "probe(query) - slow echo"
    }

    fn args(&self) -> &[&str] {
        &["query"]
    }

    fn execute<'a>(
        &'a self,
        args: Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolResult>> + Send + 'a>> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(ToolResult::ok(
                args.get("query").and_then(Value::as_str).unwrap_or_default(),
            ))
        })
    }
}

pub fn registry(tools: Vec<Box<dyn Tool>>) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register(tool);
    }
    Arc::new(registry)
}

pub fn agent(
    planner: Arc<ScriptedPlanner>,
    registry: Arc<ToolRegistry>,
    decisions: Vec<JoinDecision>,
    recursion_limit: u32,
    max_concurrency: usize,
) -> CompilerAgent {
    CompilerAgent::new(
        planner,
        registry,
        TaskScheduler::new(&SchedulerConfig {
            max_concurrency,
            tool_timeout_secs: 10,
        }),
        Joiner::new(Arc::new(ScriptedDecider::new(decisions))),
        recursion_limit,
    )
}
