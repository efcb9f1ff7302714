use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Closed tool vocabulary. Declaration order is the keyword table order and
/// therefore the order in which suggested tools are reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    EmailTool,
    WebScraper,
    FileManager,
    DatabaseTool,
    ApiClient,
    Scheduler,
    SearchTool,
    Calculator,
    ImageProcessor,
    TextProcessor,
    CalendarTool,
    ChatTool,
}

impl Tool {
    pub const ALL: [Tool; 12] = [
        Tool::EmailTool,
        Tool::WebScraper,
        Tool::FileManager,
        Tool::DatabaseTool,
        Tool::ApiClient,
        Tool::Scheduler,
        Tool::SearchTool,
        Tool::Calculator,
        Tool::ImageProcessor,
        Tool::TextProcessor,
        Tool::CalendarTool,
        Tool::ChatTool,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::EmailTool => "email_tool",
            Tool::WebScraper => "web_scraper",
            Tool::FileManager => "file_manager",
            Tool::DatabaseTool => "database_tool",
            Tool::ApiClient => "api_client",
            Tool::Scheduler => "scheduler",
            Tool::SearchTool => "search_tool",
            Tool::Calculator => "calculator",
            Tool::ImageProcessor => "image_processor",
            Tool::TextProcessor => "text_processor",
            Tool::CalendarTool => "calendar_tool",
            Tool::ChatTool => "chat_tool",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Tool::ALL.into_iter().find(|tool| tool.as_str() == normalized).ok_or_else(|| {
            DomainError::InvalidInput {
                field: "tools",
                message: format!("unknown tool identifier `{}`", value.trim()),
            }
        })
    }
}

const KEYWORD_TABLE: &[(&[&str], Tool)] = &[
    (&["email", "send", "mail", "notify", "notification", "report"], Tool::EmailTool),
    (&["web", "scrape", "website", "browse", "crawl", "fetch"], Tool::WebScraper),
    (&["file", "document", "read", "write", "save", "upload", "backup"], Tool::FileManager),
    (&["database", "db", "store", "data", "query", "sql", "stores"], Tool::DatabaseTool),
    (&["api", "http", "request", "call", "endpoint", "service", "calls"], Tool::ApiClient),
    (
        &[
            "schedule",
            "timer",
            "cron",
            "periodic",
            "interval",
            "daily",
            "night",
            "appointment",
            "managing",
        ],
        Tool::Scheduler,
    ),
    (&["search", "find", "lookup", "google", "bing", "research"], Tool::SearchTool),
    (&["calculate", "math", "compute", "formula", "number", "calculation"], Tool::Calculator),
    (&["image", "photo", "picture", "visual", "generate"], Tool::ImageProcessor),
    (
        &["text", "translate", "language", "nlp", "process", "compiles", "findings"],
        Tool::TextProcessor,
    ),
    (&["calendar", "appointment", "meeting", "event"], Tool::CalendarTool),
    (&["chat", "message", "communicate", "slack", "discord"], Tool::ChatTool),
];

const AUDIENCE_KEYWORDS: &[&str] = &["user", "people"];

/// Every table row with at least one keyword present contributes its tool.
/// Mentions of an audience always add the text processor.
pub fn suggest_tools(description: &str) -> BTreeSet<Tool> {
    let normalized = description.to_lowercase();
    let mut tools = BTreeSet::new();

    for (keywords, tool) in KEYWORD_TABLE {
        if keywords.iter().any(|keyword| normalized.contains(keyword)) {
            tools.insert(*tool);
        }
    }

    if AUDIENCE_KEYWORDS.iter().any(|keyword| normalized.contains(keyword)) {
        tools.insert(Tool::TextProcessor);
    }

    tools
}
