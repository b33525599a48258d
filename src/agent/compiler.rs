use crate::config::Config;
use crate::error::CompilerError;
use crate::joiner::{JoinOutcome, Joiner, LlmDecider};
use crate::llm::{ModelSettings, create_provider};
use crate::messages::{Message, MessageRole};
use crate::planner::{LlmPlanner, PlanParser, Planner, Task};
use crate::scheduler::TaskScheduler;
use crate::tools::{ToolRegistry, all_tools};
use futures_util::{Stream, StreamExt, TryStreamExt};
use std::sync::Arc;

// ── Public types ─────────────────────────────────────────────────────────────

/// The two working states of the loop. `Done` is the end of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// Plan, parse and execute one round of tasks.
    Scheduling,
    /// Decide whether to finish or plan again.
    Joining,
}

/// One node execution and the history entries it appended.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundEvent {
    pub step: u32,
    pub node: Node,
    pub appended: Vec<Message>,
}

impl RoundEvent {
    /// The answer, when this step finished the loop.
    pub fn final_answer(&self) -> Option<&str> {
        if self.node != Node::Joining {
            return None;
        }
        self.appended
            .last()
            .filter(|message| message.role() == MessageRole::Assistant)
            .map(Message::content)
    }
}

/// Plan → execute → join, until the joiner answers or the step budget runs
/// out.
pub struct CompilerAgent {
    planner: Arc<dyn Planner>,
    registry: Arc<ToolRegistry>,
    scheduler: TaskScheduler,
    joiner: Joiner,
    recursion_limit: u32,
}

// ── Construction ─────────────────────────────────────────────────────────────

impl CompilerAgent {
    pub fn new(
        planner: Arc<dyn Planner>,
        registry: Arc<ToolRegistry>,
        scheduler: TaskScheduler,
        joiner: Joiner,
        recursion_limit: u32,
    ) -> Self {
        Self {
            planner,
            registry,
            scheduler,
            joiner,
            recursion_limit,
        }
    }

    /// Wire the model-backed planner, decider and tools described by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = create_provider(config)?;
        let settings = ModelSettings::new(config.model.clone(), config.temperature);
        let registry = Arc::new(all_tools(config, Some(Arc::clone(&provider))));

        tracing::info!(
            model = %config.model,
            tools = ?registry.tool_names(),
            "Compiler agent ready"
        );

        Ok(Self::new(
            Arc::new(LlmPlanner::new(
                Arc::clone(&provider),
                Arc::clone(&registry),
                settings.clone(),
            )),
            registry,
            TaskScheduler::new(&config.scheduler),
            Joiner::new(Arc::new(LlmDecider::new(provider, settings))),
            config.agent.recursion_limit,
        ))
    }

    #[must_use]
    pub fn with_recursion_limit(mut self, recursion_limit: u32) -> Self {
        self.recursion_limit = recursion_limit;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

// ── Execution ────────────────────────────────────────────────────────────────

impl CompilerAgent {
    /// Drive the loop for `query`, yielding one event per node execution.
    ///
    /// Attempting a step beyond the recursion limit ends the stream with
    /// [`CompilerError::RecursionLimit`].
    pub fn stream(
        &self,
        query: &str,
    ) -> impl Stream<Item = Result<RoundEvent, CompilerError>> + Send + '_ {
        let query = query.to_string();
        async_stream::try_stream! {
            let mut history = vec![Message::user(query)];
            let mut node = Node::Scheduling;
            let mut step = 0u32;

            loop {
                if step >= self.recursion_limit {
                    Err::<(), _>(CompilerError::RecursionLimit {
                        limit: self.recursion_limit,
                    })?;
                }
                step += 1;

                let before = history.len();
                let next = match node {
                    Node::Scheduling => {
                        self.schedule_round(&mut history)
                            .await
                            .map_err(CompilerError::from)?;
                        Some(Node::Joining)
                    }
                    Node::Joining => {
                        match self.joiner.join(&mut history).await.map_err(CompilerError::from)? {
                            JoinOutcome::Finish(_) => None,
                            JoinOutcome::Replan => Some(Node::Scheduling),
                        }
                    }
                };

                let appended = history[before..].to_vec();
                tracing::info!(step, node = ?node, appended = appended.len(), "Step complete");
                yield RoundEvent { step, node, appended };

                match next {
                    Some(following) => node = following,
                    None => break,
                }
            }
        }
    }

    /// Run the loop to completion and return the final answer.
    pub async fn run(&self, query: &str) -> Result<String, CompilerError> {
        let mut events = Box::pin(self.stream(query));
        let mut answer = None;
        while let Some(event) = events.next().await {
            let event = event?;
            if let Some(text) = event.final_answer() {
                answer = Some(text.to_string());
            }
        }
        answer.ok_or_else(|| CompilerError::Other(anyhow::anyhow!("loop ended without an answer")))
    }

    /// Plan one round for `query` and return the parsed tasks without
    /// running them.
    pub async fn preview_plan(&self, query: &str) -> Result<Vec<Task>, CompilerError> {
        let history = vec![Message::user(query)];
        let text = self.planner.plan(&history).await?;
        let tasks: Vec<Task> = PlanParser::new(Arc::clone(&self.registry))
            .parse_stream(text)
            .try_collect()
            .await?;
        Ok(tasks)
    }

    async fn schedule_round(&self, history: &mut Vec<Message>) -> anyhow::Result<()> {
        let text = self.planner.plan(history).await?;
        let tasks = PlanParser::new(Arc::clone(&self.registry)).parse_stream(text);
        let entries = self.scheduler.schedule(history, tasks).await?;
        tracing::debug!(observations = entries.len(), "Round executed");
        history.extend(entries);
        Ok(())
    }
}
