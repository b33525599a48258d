use super::board::{ObservationBoard, Readiness};
use super::resolve::resolve_args;
use super::Observation;
use crate::config::SchedulerConfig;
use crate::messages::{Message, observations};
use crate::planner::{JOIN, Task, TaskStream, TaskTool};
use crate::tools::Tool;
use futures_util::{FutureExt, StreamExt};
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs each round's tasks as soon as their dependencies are observed.
///
/// Every task gets its own lightweight worker that waits on the observation
/// board; only tool calls take a concurrency permit.
pub struct TaskScheduler {
    permits: Arc<Semaphore>,
    tool_timeout: Duration,
}

impl TaskScheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            tool_timeout: config.tool_timeout(),
        }
    }

    /// Execute every task in `tasks` exactly once and return the new
    /// tool-result entries in ascending idx order.
    ///
    /// Fails only when the task stream itself fails (e.g. an unknown tool);
    /// in-flight workers are aborted in that case.
    pub async fn schedule(
        &self,
        history: &[Message],
        mut tasks: TaskStream,
    ) -> anyhow::Result<Vec<Message>> {
        let known = observations(history);
        let board = Arc::new(ObservationBoard::new(known.clone()));
        let mut recorded: BTreeMap<u32, (String, Map<String, Value>)> = BTreeMap::new();
        let mut workers = JoinSet::new();
        let mut worker_idx = HashMap::new();

        while let Some(task) = tasks.next().await {
            let task = task?;
            if known.contains_key(&task.idx) || recorded.contains_key(&task.idx) {
                tracing::warn!(
                    idx = task.idx,
                    tool = task.name(),
                    "Dropping task whose index is already taken"
                );
                continue;
            }

            recorded.insert(task.idx, (task.name().to_string(), task.args.clone()));
            tracing::debug!(
                idx = task.idx,
                tool = task.name(),
                dependencies = ?task.dependencies,
                "Dispatching task"
            );

            let idx = task.idx;
            let board = Arc::clone(&board);
            let permits = Arc::clone(&self.permits);
            let tool_timeout = self.tool_timeout;
            let handle = workers.spawn(async move {
                let observation = run_task(&task, &board, &permits, tool_timeout).await;
                if !board.publish(task.idx, observation) {
                    tracing::warn!(idx = task.idx, "Observation already recorded; keeping the first");
                }
            });
            worker_idx.insert(handle.id(), idx);
        }

        board.seal(recorded.keys().copied().collect());

        while let Some(joined) = workers.join_next_with_id().await {
            if let Err(err) = joined {
                let Some(&idx) = worker_idx.get(&err.id()) else {
                    continue;
                };
                tracing::warn!(idx, error = %err, "Task worker failed");
                let (name, args) = &recorded[&idx];
                board.publish(
                    idx,
                    Observation::Error(format!(
                        "ERROR(Failed to call {name} with args {}. Error: worker failed: {err})",
                        args_text(args)
                    )),
                );
            }
        }

        Ok(board.read(|map| {
            recorded
                .into_iter()
                .filter_map(|(idx, (name, args))| {
                    map.get(&idx)
                        .map(|observation| Message::tool_result(idx, name, args, observation))
                })
                .collect()
        }))
    }
}

async fn run_task(
    task: &Task,
    board: &ObservationBoard,
    permits: &Semaphore,
    tool_timeout: Duration,
) -> Observation {
    let readiness = board.wait_for(&task.dependencies).await;

    let tool = match (&task.tool, readiness) {
        // Gaps in the index range never block the join.
        (TaskTool::Join, _) => return Observation::Output(JOIN.to_string()),
        (TaskTool::Tool(tool), Readiness::Ready) => tool,
        (TaskTool::Tool(tool), Readiness::Dangling(missing)) => {
            tracing::warn!(idx = task.idx, tool = tool.name(), ?missing, "Dependency never scheduled");
            return Observation::Error(format!(
                "ERROR(Failed to call {} with args {}.) Args could not be resolved. Error: no task produces {}",
                tool.name(),
                args_text(&task.args),
                missing_text(&missing)
            ));
        }
    };

    let resolved = board.read(|map| resolve_args(&task.args, map));
    tracing::debug!(idx = task.idx, tool = tool.name(), args = %args_text(&resolved), "Resolved arguments");

    match call_tool(tool.as_ref(), resolved.clone(), permits, tool_timeout).await {
        Ok(output) => Observation::Output(output),
        Err(error) => {
            tracing::warn!(idx = task.idx, tool = tool.name(), %error, "Tool call failed");
            Observation::Error(format!(
                "ERROR(Failed to call {} with args {}. Args resolved to {}. Error: {error})",
                tool.name(),
                args_text(&task.args),
                args_text(&resolved)
            ))
        }
    }
}

/// Invoke one tool under a concurrency permit and timeout. Tool errors,
/// unsuccessful results, panics and timeouts all come back as `Err` text.
async fn call_tool(
    tool: &dyn Tool,
    args: Map<String, Value>,
    permits: &Semaphore,
    tool_timeout: Duration,
) -> Result<String, String> {
    let _permit = permits
        .acquire()
        .await
        .map_err(|_| "scheduler is shutting down".to_string())?;

    let call = AssertUnwindSafe(tool.execute(args)).catch_unwind();
    match tokio::time::timeout(tool_timeout, call).await {
        Err(_) => Err(format!("timed out after {}s", tool_timeout.as_secs())),
        Ok(Err(panic)) => Err(format!("tool panicked: {}", panic_message(panic.as_ref()))),
        Ok(Ok(Err(error))) => Err(format!("{error:#}")),
        Ok(Ok(Ok(result))) if result.success => Ok(result.output),
        Ok(Ok(Ok(result))) => Err(result.error.unwrap_or(result.output)),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn args_text(args: &Map<String, Value>) -> String {
    Value::Object(args.clone()).to_string()
}

fn missing_text(missing: &[u32]) -> String {
    missing
        .iter()
        .map(|idx| format!("${idx}"))
        .collect::<Vec<_>>()
        .join(", ")
}
