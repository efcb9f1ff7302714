use std::collections::BTreeSet;

use super::tools::Tool;

pub const BASE_INSTRUCTIONS: [&str; 2] = [
    "You are a helpful AI agent designed to assist users efficiently and accurately.",
    "Always provide clear, actionable responses and ask for clarification when requirements are ambiguous.",
];

#[derive(Clone, Copy, Debug)]
enum Trigger {
    Tool(Tool),
    Mentions(&'static str),
}

impl Trigger {
    fn holds(self, normalized: &str, tools: &BTreeSet<Tool>) -> bool {
        match self {
            Trigger::Tool(tool) => tools.contains(&tool),
            Trigger::Mentions(fragment) => normalized.contains(fragment),
        }
    }
}

// Emission order is the order of this table, not the order tools were found.
const GUIDANCE: &[(Trigger, &str)] = &[
    (
        Trigger::Tool(Tool::WebScraper),
        "When scraping web content, respect robots.txt directives and rate limits to avoid overloading target servers.",
    ),
    (
        Trigger::Tool(Tool::EmailTool),
        "For email communications, keep messages professional and clear, and double-check recipients before sending.",
    ),
    (
        Trigger::Tool(Tool::DatabaseTool),
        "When working with databases, ensure data integrity and use appropriate queries to avoid unintended changes.",
    ),
    (
        Trigger::Tool(Tool::FileManager),
        "Handle files carefully and verify permissions before reading, writing, or deleting them.",
    ),
    (
        Trigger::Mentions("monitor"),
        "Continuously monitor the specified systems and alert users promptly about important changes or anomalies.",
    ),
    (
        Trigger::Mentions("automat"),
        "Focus on automating repetitive work reliably and report the outcome of every automated run.",
    ),
    (
        Trigger::Mentions("schedul"),
        "For scheduling tasks, always account for time zones and confirm timing before committing to a schedule.",
    ),
];

pub fn compose_instructions(description: &str, tools: &BTreeSet<Tool>) -> String {
    let normalized = description.to_lowercase();
    let guidance = GUIDANCE
        .iter()
        .filter(|(trigger, _)| trigger.holds(&normalized, tools))
        .map(|(_, sentence)| *sentence);
    let sentences = BASE_INSTRUCTIONS.into_iter().chain(guidance).collect::<Vec<_>>();

    tracing::debug!(
        event_name = "extraction.instructions.matched",
        sentence_count = sentences.len(),
        "instructions composed"
    );
    sentences.join(" ")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{compose_instructions, BASE_INSTRUCTIONS, GUIDANCE};
    use crate::extraction::tools::Tool;

    fn sentence_for(prefix: &str) -> &'static str {
        GUIDANCE
            .iter()
            .map(|(_, sentence)| *sentence)
            .find(|sentence| sentence.starts_with(prefix))
            .expect("guidance sentence present")
    }

    #[test]
    fn base_sentences_are_always_present() {
        let instructions = compose_instructions("zzz", &BTreeSet::new());
        assert_eq!(instructions, BASE_INSTRUCTIONS.join(" "));
    }

    #[test]
    fn tool_guidance_follows_fixed_order() {
        let tools = BTreeSet::from([Tool::EmailTool, Tool::WebScraper]);
        let instructions = compose_instructions("email the results of a crawl", &tools);

        let scraping = instructions
            .find(sentence_for("When scraping"))
            .expect("scraping guidance");
        let email = instructions.find(sentence_for("For email")).expect("email guidance");
        assert!(scraping < email);
    }

    #[test]
    fn description_mentions_add_guidance_case_insensitively() {
        let instructions =
            compose_instructions("AUTOMATION that Monitors and SCHEDULES jobs", &BTreeSet::new());

        assert!(instructions.contains(sentence_for("Continuously monitor")));
        assert!(instructions.contains(sentence_for("Focus on automating")));
        assert!(instructions.contains(sentence_for("For scheduling")));
    }

    #[test]
    fn tool_guidance_depends_on_tool_set_not_description() {
        let tools = BTreeSet::from([Tool::DatabaseTool, Tool::FileManager]);
        let instructions = compose_instructions("nothing relevant", &tools);

        assert!(instructions.contains(sentence_for("When working with databases")));
        assert!(instructions.contains(sentence_for("Handle files")));
        assert!(!instructions.contains(sentence_for("When scraping")));
    }

    #[test]
    fn sentences_are_joined_with_single_spaces() {
        let tools = BTreeSet::from([Tool::WebScraper]);
        let instructions = compose_instructions("monitor", &tools);

        assert!(!instructions.contains("  "));
        assert_eq!(instructions.matches(". ").count(), 3);
    }
}
