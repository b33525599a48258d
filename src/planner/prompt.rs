use crate::tools::ToolSpec;
use std::fmt::Write;

const PLAN_FORMAT: &str = r#"Each action is one line of the form `<idx>. <tool>(<args>)`. Rules:
 - Each action MUST use one of the tools listed above. Arguments are written as keyword arguments, e.g. `search(query="GDP of New York")`.
 - Each action gets a unique, strictly increasing index.
 - Refer to the output of an earlier action with `$<idx>`, e.g. `math(problem="$1 + 2")`. Never refer to an action that comes later.
 - Actions that do not depend on each other run in parallel, so only add a reference when the output is really needed.
 - You may put a `Thought: <reasoning>` line before an action.
 - The last action MUST be `join()`.
 - After `join()`, write <END_OF_PLAN> and stop."#;

const REPLAN_RULES: &str = r#" - The conversation above contains the previous plan, the Observation of each executed action, and a Thought about those results.
 - Start the new plan with a `Thought:` line that explains the strategy for this attempt.
 - NEVER repeat actions that were already executed; reuse their results with `$<idx>` instead.
 - Continue the task index from the number given in the latest feedback. Do not reuse indices."#;

/// System prompt for a planning round. `replan` switches on the rules for
/// continuing after feedback.
pub fn planner_prompt(tools: &[ToolSpec], replan: bool) -> String {
    let mut prompt = format!(
        "Given a user query, create a plan to solve it with the utmost parallelizability. \
         Each plan should comprise an action from the following {} types:\n",
        tools.len() + 1
    );

    for (i, tool) in tools.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", i + 1, tool.description);
    }
    let _ = writeln!(
        prompt,
        "{}. join(): Collects and combines results from prior actions. \
         An LLM agent is called upon invoking join() to either finalize the user query \
         or wait until the plans are executed.",
        tools.len() + 1
    );

    prompt.push('\n');
    prompt.push_str(PLAN_FORMAT);
    if replan {
        prompt.push_str("\n\nReplanning:\n");
        prompt.push_str(REPLAN_RULES);
    }
    prompt
}
