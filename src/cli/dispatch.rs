use super::{Cli, Commands};
use anyhow::Result;
use futures_util::StreamExt;
use llm_compiler::agent::CompilerAgent;
use llm_compiler::config::Config;

pub async fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Commands::Ask {
            query,
            recursion_limit,
            model,
        } => {
            if let Some(model) = model {
                config.model = model;
            }
            if let Some(limit) = recursion_limit {
                config.agent.recursion_limit = limit;
            }
            let agent = CompilerAgent::from_config(&config)?;
            ask(&agent, &query).await
        }
        Commands::Plan { query, model } => {
            if let Some(model) = model {
                config.model = model;
            }
            let agent = CompilerAgent::from_config(&config)?;
            plan(&agent, &query).await
        }
    }
}

async fn ask(agent: &CompilerAgent, query: &str) -> Result<()> {
    let mut events = Box::pin(agent.stream(query));
    let mut answer = None;

    while let Some(event) = events.next().await {
        let event = event?;
        println!("── step {} · {:?} ──", event.step, event.node);
        for message in &event.appended {
            println!("{}", message.render());
        }
        if let Some(text) = event.final_answer() {
            answer = Some(text.to_string());
        }
    }

    if let Some(answer) = answer {
        println!();
        println!("{answer}");
    }
    Ok(())
}

async fn plan(agent: &CompilerAgent, query: &str) -> Result<()> {
    for task in agent.preview_plan(query).await? {
        if let Some(thought) = &task.thought {
            println!("Thought: {thought}");
        }
        let deps: Vec<String> = task.dependencies.iter().map(|d| format!("${d}")).collect();
        println!(
            "{}. {}({})  depends on [{}]",
            task.idx,
            task.name(),
            serde_json::Value::Object(task.args.clone()),
            deps.join(", ")
        );
    }
    Ok(())
}
