use std::sync::LazyLock;

use regex::Regex;

use super::{capitalize, title_case, trim_label, Rule};

pub const FALLBACK_NAME: &str = "Smart Assistant Agent";

static QUOTED_NAMING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:called|named)\s+["“'‘]([^"”'’]+)["”'’]"#).expect("valid regex")
});
static BARE_NAMING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bagent\s+(?:called|named)\s+([A-Za-z0-9][\w\- ]*?)(?:\s+(?:that|which|who|to|for)\b|[,.;:!?]|$)",
    )
    .expect("valid regex")
});
static QUOTED_AGENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)["“'‘]([^"”'’]+)["”'’]\s+agent\b"#).expect("valid regex")
});
static AGENT_FOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bagent\s+for\s+([\w\- ]+?)\s+(?:that|which|who)\b").expect("valid regex")
});
static LEADING_PHRASE_AGENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([A-Za-z][\w\-]*(?:\s+[A-Za-z][\w\-]*){0,2}?)\s+agent\b")
        .expect("valid regex")
});
static CREATE_AGENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcreate\s+an?\s+([\w\- ]+?)\s+agent\b").expect("valid regex")
});
static ACTION_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:manage|monitor|track|analyze|process|handle|automate|assist|help|support)\w*",
    )
    .expect("valid regex")
});

// Words that make a sentence-initial "<phrase> agent" a request rather than a name.
const LEAD_IN_WORDS: &[&str] = &[
    "a", "an", "the", "my", "our", "your", "this", "that", "some", "any", "i", "we", "you",
    "create", "build", "make", "design", "need", "want", "please",
];

const RULES: &[Rule] = &[
    ("quoted_naming", quoted_naming),
    ("bare_naming", bare_naming),
    ("quoted_agent", quoted_agent),
    ("agent_for", agent_for),
    ("leading_phrase", leading_phrase),
    ("domain_shortcut", domain_shortcut),
    ("create_agent", create_agent),
    ("action_verb", action_verb),
];

pub fn extract_name(description: &str) -> String {
    for (rule, extract) in RULES {
        if let Some(name) = extract(description).filter(|name| !name.is_empty()) {
            tracing::debug!(event_name = "extraction.name.matched", rule = *rule, "name rule matched");
            return name;
        }
    }

    tracing::debug!(event_name = "extraction.name.matched", rule = "fallback", "name rule matched");
    FALLBACK_NAME.to_string()
}

fn quoted_naming(text: &str) -> Option<String> {
    capture(&QUOTED_NAMING, text).map(trim_label)
}

fn bare_naming(text: &str) -> Option<String> {
    capture(&BARE_NAMING, text).map(trim_label)
}

fn quoted_agent(text: &str) -> Option<String> {
    capture(&QUOTED_AGENT, text).map(trim_label)
}

fn agent_for(text: &str) -> Option<String> {
    capture(&AGENT_FOR, text).map(trim_label)
}

fn leading_phrase(text: &str) -> Option<String> {
    let phrase = capture(&LEADING_PHRASE_AGENT, text)?;
    let is_request = phrase
        .split_whitespace()
        .any(|word| LEAD_IN_WORDS.contains(&word.to_ascii_lowercase().as_str()));
    (!is_request).then(|| trim_label(phrase))
}

fn domain_shortcut(text: &str) -> Option<String> {
    let normalized = text.to_lowercase();
    let name = if normalized.contains("web")
        && (normalized.contains("scrap") || normalized.contains("crawl"))
    {
        "Web Scraping Agent"
    } else if normalized.contains("scheduling") {
        "Scheduling Agent"
    } else if normalized.contains("research") {
        "Research Agent"
    } else if normalized.contains("image") {
        "Image Analysis Agent"
    } else {
        return None;
    };
    Some(name.to_string())
}

fn create_agent(text: &str) -> Option<String> {
    let phrase = capture(&CREATE_AGENT, text)?;
    Some(format!("{} Agent", title_case(phrase)))
}

fn action_verb(text: &str) -> Option<String> {
    let verb = ACTION_VERB.find(text)?.as_str().to_lowercase();
    Some(format!("{} Agent", capitalize(&verb)))
}

fn capture<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern.captures(text)?.get(1).map(|group| group.as_str())
}
