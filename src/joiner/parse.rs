use super::types::{JoinAction, JoinDecision};

/// Read a decision from model output.
///
/// Accepts a JSON object (fenced or bare) or the textual form
/// `Thought: ...` followed by `Action: Finish(...)` / `Action: Replan(...)`.
pub fn parse_decision(text: &str) -> Option<JoinDecision> {
    extract_json(text)
        .and_then(|json| serde_json::from_str(json).ok())
        .or_else(|| parse_textual(text))
}

fn extract_json(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let rest = &text[start + "```json".len()..];
        if let Some(end) = rest.find("```") {
            let candidate = rest[..end].trim();
            if !candidate.is_empty() {
                return Some(candidate);
            }
        }
    }

    let open = text.find('{')?;
    let close = text.rfind('}')?;
    (close > open).then(|| &text[open..=close])
}

fn parse_textual(text: &str) -> Option<JoinDecision> {
    let thought = text
        .lines()
        .find_map(|line| line.trim().strip_prefix("Thought:"))
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let action_start = text.find("Action:")?;
    let action = text[action_start + "Action:".len()..].trim();

    let (is_finish, rest) = if let Some(rest) = action.strip_prefix("Finish") {
        (true, rest)
    } else if let Some(rest) = action.strip_prefix("Replan") {
        (false, rest)
    } else {
        return None;
    };

    let body = rest.trim().trim_start_matches(':').trim_start();
    let body = body.strip_prefix('(').unwrap_or(body);
    let body = body.strip_suffix(')').unwrap_or(body).trim().to_string();

    let action = if is_finish {
        JoinAction::Finish { response: body }
    } else {
        JoinAction::Replan { feedback: body }
    };
    Some(JoinDecision { thought, action })
}
