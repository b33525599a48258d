use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use futures_util::StreamExt;
use llm_compiler::joiner::JoinDecision;
use llm_compiler::messages::Message;
use llm_compiler::tools::Tool;

use super::support::{FnTool, ProbeTool, ScriptedPlanner, agent, registry};

const FAN_OUT_PLAN: &str = "1. probe(query=\"a\")\n2. probe(query=\"b\")\n3. probe(query=\"c\")\n4. join()\n<END_OF_PLAN>";

#[tokio::test]
async fn independent_tasks_overlap() {
    let (probe, peak) = ProbeTool::new(Duration::from_millis(50));
    let agent = agent(
        Arc::new(ScriptedPlanner::new(&[FAN_OUT_PLAN])),
        registry(vec![Box::new(probe) as Box<dyn Tool>]),
        vec![JoinDecision::finish("all in", "abc")],
        10,
        8,
    );

    let answer = agent.run("fan out").await.unwrap();
    assert_eq!(answer, "abc");
    assert_eq!(peak.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn concurrency_bound_is_respected() {
    let (probe, peak) = ProbeTool::new(Duration::from_millis(20));
    let agent = agent(
        Arc::new(ScriptedPlanner::new(&[FAN_OUT_PLAN])),
        registry(vec![Box::new(probe) as Box<dyn Tool>]),
        vec![JoinDecision::finish("all in", "abc")],
        10,
        1,
    );

    agent.run("fan out").await.unwrap();
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn results_are_reported_in_index_order() {
    let (probe, _) = ProbeTool::new(Duration::from_millis(30));
    let quick: Box<dyn Tool> = Box::new(FnTool::new("quick", &["query"], |args| {
        Ok(format!("quick {}", args["query"].as_str().unwrap_or_default()))
    }));
    let plan = "1. probe(query=\"slow\")\n2. quick(query=\"fast\")\n3. quick(query=\"$1\")\n4. join()\n";
    let agent = agent(
        Arc::new(ScriptedPlanner::new(&[plan])),
        registry(vec![Box::new(probe) as Box<dyn Tool>, quick]),
        vec![JoinDecision::finish("ok", "ok")],
        10,
        8,
    );

    let mut stream = Box::pin(agent.stream("order"));
    let first = stream.next().await.unwrap().unwrap();
    let indices: Vec<u32> = first.appended.iter().filter_map(Message::tool_idx).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
    assert_eq!(first.appended[1].content(), "quick fast");
    assert_eq!(first.appended[2].content(), "quick slow");
    assert_eq!(first.appended[3].content(), "join");
}

#[tokio::test]
async fn join_waits_for_every_earlier_task() {
    let (probe, _) = ProbeTool::new(Duration::from_millis(40));
    let plan = "1. probe(query=\"x\")\n2. join()\n";
    let agent = agent(
        Arc::new(ScriptedPlanner::new(&[plan])),
        registry(vec![Box::new(probe) as Box<dyn Tool>]),
        vec![JoinDecision::finish("ok", "x")],
        10,
        8,
    );

    let mut stream = Box::pin(agent.stream("wait"));
    let round = stream.next().await.unwrap().unwrap();
    assert_eq!(round.appended.len(), 2);
    assert_eq!(round.appended[0].content(), "x");
    assert_eq!(round.appended[1].content(), "join");
}
