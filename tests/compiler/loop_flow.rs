use std::sync::Arc;

use futures_util::StreamExt;
use llm_compiler::joiner::JoinDecision;
use llm_compiler::llm::ModelSettings;
use llm_compiler::messages::{Message, MessageRole};
use llm_compiler::tools::{MathTool, Tool};
use llm_compiler::{CompilerError, Node, PlanError, RoundEvent};

use super::support::{FnTool, ScriptedPlanner, agent, registry};

fn search_returning(answer: &'static str) -> Box<dyn Tool> {
    Box::new(FnTool::new("search", &["query"], move |_| {
        Ok(answer.to_string())
    }))
}

fn offline_math() -> Box<dyn Tool> {
    Box::new(MathTool::new(None, ModelSettings::new("none", 0.0)))
}

async fn collect_events(
    agent: &llm_compiler::CompilerAgent,
    query: &str,
) -> (Vec<RoundEvent>, Option<CompilerError>) {
    let mut stream = Box::pin(agent.stream(query));
    let mut events = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(event) => events.push(event),
            Err(err) => return (events, Some(err)),
        }
    }
    (events, None)
}

#[tokio::test]
async fn single_round_search_then_finish() {
    let planner = Arc::new(ScriptedPlanner::new(&[
        "Thought: look it up\n1. search(query=\"GDP of New York\")\n2. join()\n<END_OF_PLAN>",
    ]));
    let agent = agent(
        Arc::clone(&planner),
        registry(vec![search_returning("[5 trillion]")]),
        vec![JoinDecision::finish("enough", "About 5 trillion")],
        10,
        4,
    );

    let (events, err) = collect_events(&agent, "What's the GDP of New York?").await;
    assert!(err.is_none());
    assert_eq!(events.len(), 2);

    let scheduling = &events[0];
    assert_eq!(scheduling.step, 1);
    assert_eq!(scheduling.node, Node::Scheduling);
    assert_eq!(scheduling.appended.len(), 2);
    assert!(matches!(
        &scheduling.appended[0],
        Message::ToolResult { idx: 1, name, content, is_error: false, .. }
            if name == "search" && content == "[5 trillion]"
    ));
    assert!(matches!(
        &scheduling.appended[1],
        Message::ToolResult { idx: 2, name, content, .. } if name == "join" && content == "join"
    ));

    let joining = &events[1];
    assert_eq!(joining.node, Node::Joining);
    assert_eq!(joining.appended[0].content(), "Thought: enough");
    assert_eq!(joining.final_answer(), Some("About 5 trillion"));
}

#[tokio::test]
async fn run_returns_final_answer() {
    let planner = Arc::new(ScriptedPlanner::new(&[
        "1. search(query=\"GDP of New York\")\n2. join()\n<END_OF_PLAN>",
    ]));
    let agent = agent(
        planner,
        registry(vec![search_returning("[5 trillion]")]),
        vec![JoinDecision::finish("done", "5 trillion dollars")],
        10,
        4,
    );

    let answer = agent.run("What's the GDP of New York?").await.unwrap();
    assert_eq!(answer, "5 trillion dollars");
}

#[tokio::test]
async fn replan_continues_numbering_and_reuses_earlier_observations() {
    let planner = Arc::new(ScriptedPlanner::new(&[
        "1. search(query=\"answer\")\n2. join()\n",
        "Thought: add two\n3. math(problem=\"$1 + 2\")\n4. join()\n<END_OF_PLAN>",
    ]));
    let agent = agent(
        Arc::clone(&planner),
        registry(vec![search_returning("40"), offline_math()]),
        vec![
            JoinDecision::replan("need arithmetic", "add two to the search result"),
            JoinDecision::finish("computed", "42"),
        ],
        10,
        4,
    );

    let (events, err) = collect_events(&agent, "What is the answer plus two?").await;
    assert!(err.is_none());
    let nodes: Vec<Node> = events.iter().map(|e| e.node).collect();
    assert_eq!(
        nodes,
        vec![Node::Scheduling, Node::Joining, Node::Scheduling, Node::Joining]
    );

    let feedback = events[1].appended.last().unwrap();
    assert_eq!(feedback.role(), MessageRole::System);
    assert!(feedback.content().contains("add two to the search result"));
    assert!(feedback.content().ends_with("Begin counting at : 3"));

    let second_round = &events[2].appended;
    assert!(matches!(
        &second_round[0],
        Message::ToolResult { idx: 3, content, is_error: false, .. } if content == "42"
    ));
    assert_eq!(second_round[1].tool_idx(), Some(4));

    let seen = planner.seen();
    assert_eq!(seen.len(), 2);
    let replan_input = &seen[1];
    assert_eq!(replan_input.last(), Some(feedback));
    assert_eq!(events[3].final_answer(), Some("42"));
}

#[tokio::test]
async fn recursion_limit_ends_the_stream() {
    let planner = Arc::new(ScriptedPlanner::new(&[]));
    let agent = agent(planner, registry(vec![]), vec![], 3, 4);

    let (events, err) = collect_events(&agent, "never satisfied").await;
    assert_eq!(events.len(), 3);
    assert_eq!(
        events.iter().map(|e| e.step).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(matches!(err, Some(CompilerError::RecursionLimit { limit: 3 })));
}

#[tokio::test]
async fn with_recursion_limit_overrides_budget() {
    let planner = Arc::new(ScriptedPlanner::new(&[]));
    let agent = agent(planner, registry(vec![]), vec![], 40, 4).with_recursion_limit(1);

    let err = agent.run("anything").await.unwrap_err();
    assert!(matches!(err, CompilerError::RecursionLimit { limit: 1 }));
}

#[tokio::test]
async fn unknown_tool_aborts_the_run() {
    let planner = Arc::new(ScriptedPlanner::new(&[
        "1. teleport(destination=\"Mars\")\n2. join()\n",
    ]));
    let agent = agent(
        planner,
        registry(vec![search_returning("unused")]),
        vec![JoinDecision::finish("n/a", "n/a")],
        10,
        4,
    );

    let err = agent.run("go to Mars").await.unwrap_err();
    assert!(matches!(
        err,
        CompilerError::Plan(PlanError::UnknownTool { ref name }) if name == "teleport"
    ));
    assert_eq!(err.to_string(), "plan: tool teleport not found");
}

#[tokio::test]
async fn failing_tool_becomes_error_observation() {
    let planner = Arc::new(ScriptedPlanner::new(&[
        "1. flaky(query=\"weather\")\n2. join()\n<END_OF_PLAN>",
    ]));
    let flaky: Box<dyn Tool> = Box::new(FnTool::new("flaky", &["query"], |_| {
        anyhow::bail!("service unavailable")
    }));
    let agent = agent(
        planner,
        registry(vec![flaky]),
        vec![JoinDecision::finish("gave up", "unknown")],
        10,
        4,
    );

    let (events, err) = collect_events(&agent, "weather?").await;
    assert!(err.is_none());
    let Message::ToolResult {
        content, is_error, ..
    } = &events[0].appended[0]
    else {
        panic!("expected a tool result");
    };
    assert!(*is_error);
    assert!(content.starts_with("ERROR(Failed to call flaky with args"));
    assert!(content.contains("weather"));
    assert!(content.contains("service unavailable"));
    assert_eq!(events[1].final_answer(), Some("unknown"));
}

#[tokio::test]
async fn dangling_dependency_errors_without_stalling() {
    let planner = Arc::new(ScriptedPlanner::new(&[
        "1. search(query=\"a\")\n3. math(problem=\"$1 * $2\")\n4. join()\n<END_OF_PLAN>",
    ]));
    let agent = agent(
        planner,
        registry(vec![search_returning("6"), offline_math()]),
        vec![JoinDecision::finish("partial", "6")],
        10,
        4,
    );

    let (events, err) = collect_events(&agent, "question").await;
    assert!(err.is_none());
    let results = &events[0].appended;
    assert_eq!(
        results.iter().filter_map(Message::tool_idx).collect::<Vec<_>>(),
        vec![1, 3, 4]
    );
    assert_eq!(results[0].content(), "6");
    assert!(matches!(&results[1], Message::ToolResult { is_error: true, .. }));
    assert!(results[1].content().contains("no task produces $2"));
    assert_eq!(results[2].content(), "join");
}

#[tokio::test]
async fn preview_plan_parses_without_executing() {
    let planner = Arc::new(ScriptedPlanner::new(&[
        "Thought: two lookups\n1. search(query=\"a\")\n2. search(query=\"$1\")\n3. join()\n",
    ]));
    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let search: Box<dyn Tool> = Box::new(FnTool::new("search", &["query"], move |_| {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok("x".into())
    }));
    let agent = agent(planner, registry(vec![search]), vec![], 10, 4);

    let tasks = agent.preview_plan("question").await.unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0].thought.as_deref(), Some("two lookups"));
    assert!(tasks[1].dependencies.contains(&1));
    assert!(tasks[2].is_join());
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}
