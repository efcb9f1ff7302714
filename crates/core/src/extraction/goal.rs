use std::sync::LazyLock;

use regex::Regex;

use super::Rule;

pub const GOAL_PREFIX: &str = "To ";
pub const EXTERNAL_API_GOAL: &str = "To call external APIs and process data";
const EXTERNAL_API_MARKER: &str = "calls external apis";

static STATED_GOAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:goal|objective|purpose|aim)\s*(?:is\s+to\b|should\s+be\b|:)\s*([^.]+)")
        .expect("valid regex")
});
static MODAL_GOAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:should|will|must|needs?\s+to)\s+([^.]+)").expect("valid regex")
});
static PURPOSE_GOAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:to|for)\s+([^.]+?)\s+(?:by|using|with|and)\b").expect("valid regex")
});
static ASSISTANCE_GOAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:help|assist|enable|allow)s?\s+(?:(?:users|me|people)\s+)?(?:to\s+)?([^.]+)")
        .expect("valid regex")
});
static AGENT_THAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bI\s+need\s+an?\s+agent\s+that\s+([^.]+)").expect("valid regex")
});
static EXTERNAL_API_PURPOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcalls\s+external\s+apis?\s+to\s+([^.]+)").expect("valid regex")
});
static ACTION_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(automate|manage|monitor|track|analyze|process|handle|assist|help|support|create|generate|find|search|notify|alert|update|maintain)\s+(?:an?\s+agent\s+)?(?:that\s+)?([^.,]+)",
    )
    .expect("valid regex")
});

const RULES: &[Rule] = &[
    ("stated_goal", stated_goal),
    ("modal", modal),
    ("purpose", purpose),
    ("assistance", assistance),
    ("agent_that", agent_that),
    ("external_api", external_api),
    ("external_api_purpose", external_api_purpose),
    ("action_clause", action_clause),
];

/// Derives the agent's goal. The result always starts with `"To "`.
pub fn extract_goal(description: &str) -> String {
    for (rule, extract) in RULES {
        if let Some(goal) = extract(description) {
            tracing::debug!(event_name = "extraction.goal.matched", rule = *rule, "goal rule matched");
            return goal;
        }
    }

    tracing::debug!(event_name = "extraction.goal.matched", rule = "fallback", "goal rule matched");
    first_sentence_goal(description)
}

fn stated_goal(text: &str) -> Option<String> {
    let clause = clause(&STATED_GOAL, text)?;
    let clause = strip_leading_to(clause);
    (!clause.is_empty()).then(|| prefixed(clause))
}

fn modal(text: &str) -> Option<String> {
    clause(&MODAL_GOAL, text).map(prefixed)
}

fn purpose(text: &str) -> Option<String> {
    clause(&PURPOSE_GOAL, text).map(prefixed)
}

fn assistance(text: &str) -> Option<String> {
    clause(&ASSISTANCE_GOAL, text).map(prefixed)
}

fn agent_that(text: &str) -> Option<String> {
    clause(&AGENT_THAT, text).map(prefixed)
}

fn external_api(text: &str) -> Option<String> {
    mentions_external_apis(text).then(|| EXTERNAL_API_GOAL.to_string())
}

fn external_api_purpose(text: &str) -> Option<String> {
    clause(&EXTERNAL_API_PURPOSE, text).map(prefixed)
}

// Only the "create ... calls external apis" collision is guarded; other verb
// collisions fall through to the captured clause.
fn action_clause(text: &str) -> Option<String> {
    let captures = ACTION_CLAUSE.captures(text)?;
    let verb = captures.get(1)?.as_str().to_lowercase();
    let object = tidy(captures.get(2)?.as_str());
    if object.is_empty() {
        return None;
    }
    if verb == "create" && mentions_external_apis(text) {
        return Some(EXTERNAL_API_GOAL.to_string());
    }
    Some(format!("{GOAL_PREFIX}{verb} {object}"))
}

fn first_sentence_goal(text: &str) -> String {
    let trimmed = text.trim();
    let sentence = trimmed.split('.').next().map(str::trim).unwrap_or_default();
    let sentence = if sentence.is_empty() { trimmed } else { sentence };
    prefixed(sentence)
}

fn mentions_external_apis(text: &str) -> bool {
    text.to_lowercase().contains(EXTERNAL_API_MARKER)
}

fn clause<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    let captured = tidy(pattern.captures(text)?.get(1)?.as_str());
    (!captured.is_empty()).then_some(captured)
}

fn tidy(value: &str) -> &str {
    value.trim().trim_end_matches(|c: char| c.is_whitespace() || ",;:!?".contains(c))
}

fn strip_leading_to(value: &str) -> &str {
    if value.eq_ignore_ascii_case("to") {
        return "";
    }
    match value.get(..3) {
        Some(head) if head.eq_ignore_ascii_case("to ") => value[3..].trim_start(),
        _ => value,
    }
}

fn prefixed(clause: &str) -> String {
    format!("{GOAL_PREFIX}{}", clause.to_lowercase())
}
