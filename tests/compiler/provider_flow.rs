use futures_util::StreamExt;
use llm_compiler::config::Config;
use llm_compiler::{CompilerAgent, Node};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse_body(deltas: &[&str]) -> String {
    let mut body = String::new();
    for delta in deltas {
        let chunk = json!({"choices": [{"delta": {"content": delta}}]});
        body.push_str(&format!("data: {chunk}\n\n"));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api_url = server.uri();
    config.api_key = Some("sk-test".into());
    config.tools.search.api_key = None;
    config
}

async fn mount_planner(server: &MockServer, deltas: &[&str]) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(deltas)),
        )
        .with_priority(1)
        .mount(server)
        .await;
}

async fn mount_decider(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn answers_through_an_openai_compatible_endpoint() {
    let server = MockServer::start().await;
    mount_planner(
        &server,
        &[
            "Thought: compute it\n1. ma",
            "th(problem=\"2 ** 10\")\n",
            "2. join()\n<END_OF_PLAN>",
        ],
    )
    .await;
    let decision = json!({
        "thought": "the math tool answered",
        "action": {"type": "finish", "response": "1024"}
    });
    mount_decider(&server, &format!("```json\n{decision}\n```")).await;

    let agent = CompilerAgent::from_config(&test_config(&server)).unwrap();
    assert_eq!(agent.registry().tool_names(), vec!["math"]);

    let answer = agent.run("What is 2 to the 10th power?").await.unwrap();
    assert_eq!(answer, "1024");
}

#[tokio::test]
async fn preview_plan_reads_the_streamed_plan() {
    let server = MockServer::start().await;
    mount_planner(
        &server,
        &["1. math(problem=\"1 + 1\")\n2. math(problem=\"$1 * 3\")\n", "3. join()\n"],
    )
    .await;

    let agent = CompilerAgent::from_config(&test_config(&server)).unwrap();
    let tasks = agent.preview_plan("double then triple").await.unwrap();
    assert_eq!(tasks.iter().map(|t| t.idx).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(tasks[1].dependencies.contains(&1));
}

#[tokio::test]
async fn textual_decision_finishes_the_loop() {
    let server = MockServer::start().await;
    mount_planner(&server, &["1. math(problem=\"6 * 7\")\n2. join()\n"]).await;
    mount_decider(&server, "Thought: the result is known\nAction: Finish(42)").await;

    let agent = CompilerAgent::from_config(&test_config(&server)).unwrap();
    let mut nodes = Vec::new();
    let mut answer = None;
    let mut stream = Box::pin(agent.stream("six times seven"));
    while let Some(event) = stream.next().await {
        let event = event.unwrap();
        nodes.push(event.node);
        if let Some(text) = event.final_answer() {
            answer = Some(text.to_string());
        }
    }
    assert_eq!(nodes, vec![Node::Scheduling, Node::Joining]);
    assert_eq!(answer.as_deref(), Some("42"));
}
