//! Deterministic conversion of a free-text agent description into a
//! structured specification suggestion.
//!
//! Each stage evaluates a static, ordered rule table and returns on the first
//! hit, with an unconditional fallback at the end. Stages share no state, so
//! the pipeline can be called from any number of threads at once.

pub mod goal;
pub mod instructions;
pub mod name;
pub mod tools;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::specification::NewAgentSpecification;
use crate::errors::DomainError;

pub use goal::extract_goal;
pub use instructions::compose_instructions;
pub use name::extract_name;
pub use tools::{suggest_tools, Tool};

/// A labelled extraction rule. `None` means the rule did not apply.
pub(crate) type Rule = (&'static str, fn(&str) -> Option<String>);

/// Validated description handed to the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionInput {
    description: String,
}

impl ExtractionInput {
    pub fn new(description: impl AsRef<str>) -> Result<Self, DomainError> {
        let description = description.as_ref().trim();
        if description.is_empty() {
            return Err(DomainError::required("description"));
        }
        Ok(Self { description: description.to_owned() })
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub name: String,
    pub description: String,
    pub goal: String,
    pub instructions: String,
    pub tools: BTreeSet<Tool>,
}

impl ExtractionResult {
    pub fn tool_identifiers(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.as_str().to_owned()).collect()
    }

    pub fn into_new_specification(self) -> NewAgentSpecification {
        let tools = self.tool_identifiers();
        NewAgentSpecification {
            name: self.name,
            description: self.description,
            goal: self.goal,
            instructions: self.instructions,
            tools,
        }
    }
}

pub fn process(input: &ExtractionInput) -> ExtractionResult {
    let description = input.description();
    let name = extract_name(description);
    let goal = extract_goal(description);
    let tools = suggest_tools(description);
    let instructions = compose_instructions(description, &tools);

    tracing::debug!(
        event_name = "extraction.completed",
        agent_name = %name,
        tool_count = tools.len(),
        "description extracted"
    );

    ExtractionResult { name, description: description.to_owned(), goal, instructions, tools }
}

/// Stateless handle for callers that prefer injecting the pipeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtractionPipeline;

impl ExtractionPipeline {
    pub fn extract(&self, description: &str) -> Result<ExtractionResult, DomainError> {
        ExtractionInput::new(description).map(|input| process(&input))
    }
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn title_case(phrase: &str) -> String {
    phrase.split_whitespace().map(capitalize).collect::<Vec<_>>().join(" ")
}

pub(crate) fn trim_label(label: &str) -> String {
    label
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’'))
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::{capitalize, process, title_case, trim_label, ExtractionInput, ExtractionPipeline, Tool};
    use crate::errors::DomainError;

    const CORPUS: &[&str] = &[
        r#"Create an agent called "Email Monitor" that tracks incoming emails"#,
        "Build an agent whose goal is to automate file backups daily",
        "Create a web scraping agent that fetches data from websites and stores it in a database",
        "Create an agent that calls external APIs to fetch weather data and process the responses",
        "Something that does various tasks",
        "Build a scheduling agent for managing appointments and calendar events",
        "Research assistant that searches Google for information and compiles findings",
        "x",
        "   leading and trailing   ",
    ];

    fn run(description: &str) -> super::ExtractionResult {
        process(&ExtractionInput::new(description).expect("valid input"))
    }

    #[test]
    fn blank_input_is_rejected() {
        for blank in ["", "   ", "\n\t"] {
            assert_eq!(
                ExtractionInput::new(blank),
                Err(DomainError::required("description"))
            );
        }
    }

    #[test]
    fn description_is_echoed_trimmed() {
        let result = run("  monitor the queue  ");
        assert_eq!(result.description, "monitor the queue");
    }

    #[test]
    fn pipeline_is_deterministic() {
        for description in CORPUS {
            let first = serde_json::to_string(&run(description)).expect("serialize");
            let second = serde_json::to_string(&run(description)).expect("serialize");
            assert_eq!(first, second);
        }
    }

    #[test]
    fn every_stage_produces_non_empty_text() {
        for description in CORPUS {
            let result = run(description);
            assert!(!result.name.is_empty(), "{description}");
            assert!(result.goal.starts_with("To "), "{description}");
            assert!(!result.instructions.is_empty(), "{description}");
            assert!(result.tools.iter().all(|tool| Tool::ALL.contains(tool)));
        }
    }

    #[test]
    fn named_email_monitor_scenario() {
        let result = run(r#"Create an agent called "Email Monitor" that tracks incoming emails"#);
        assert_eq!(result.name, "Email Monitor");
        assert!(result.tools.contains(&Tool::EmailTool));
    }

    #[test]
    fn stated_goal_scenario() {
        let result = run("Build an agent whose goal is to automate file backups daily");
        assert!(result.goal.to_lowercase().contains("to automate file backups daily"));
        assert!(result.tools.contains(&Tool::FileManager));
        assert!(result.tools.contains(&Tool::Scheduler));
    }

    #[test]
    fn web_scraping_scenario() {
        let result = run(
            "Create a web scraping agent that fetches data from websites and stores it in a database",
        );
        assert!(result.name.to_lowercase().contains("web scraping"));
        assert!(result.tools.contains(&Tool::WebScraper));
        assert!(result.tools.contains(&Tool::DatabaseTool));
    }

    #[test]
    fn external_api_scenario() {
        let result = run(
            "Create an agent that calls external APIs to fetch weather data and process the responses",
        );
        assert!(result.goal.to_lowercase().contains("fetch weather data"));
        assert!(result.tools.contains(&Tool::ApiClient));
    }

    #[test]
    fn unmatched_description_falls_back_to_generic_name() {
        assert_eq!(run("Something that does various tasks").name, "Smart Assistant Agent");
    }

    #[test]
    fn scraping_guidance_precedes_email_guidance() {
        let result = run("Email me a summary after you crawl the news website");
        let scraping = result.instructions.find("robots.txt").expect("scraping guidance");
        let email = result.instructions.find("professional").expect("email guidance");
        assert!(scraping < email);
    }

    #[test]
    fn result_converts_into_new_specification() {
        let spec = run("Send a daily email report").into_new_specification();
        assert_eq!(spec.tools, vec!["email_tool".to_owned(), "scheduler".to_owned()]);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn pipeline_handle_validates_input() {
        assert!(ExtractionPipeline.extract(" ").is_err());
        assert_eq!(ExtractionPipeline.extract("x").expect("extract").description, "x");
    }

    #[test]
    fn tools_serialize_in_vocabulary_order() {
        let result = run("chat about the calendar, then email the report");
        let payload = serde_json::to_value(&result).expect("serialize");
        assert_eq!(
            payload["tools"],
            serde_json::json!(["email_tool", "calendar_tool", "chat_tool"])
        );
    }

    #[test]
    fn text_helpers_normalize_labels() {
        assert_eq!(capitalize("monitors"), "Monitors");
        assert_eq!(title_case("customer   support"), "Customer Support");
        assert_eq!(trim_label(" “Scout” "), "Scout");
    }
}
