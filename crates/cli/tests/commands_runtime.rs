use std::env;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use agentspec_cli::commands::{doctor, extract, list, migrate};
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("AGENTSPEC_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("AGENTSPEC_DATABASE_URL", "postgres://localhost/agentspec")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn extract_prints_suggestion_without_touching_the_database() {
    with_env(&[("AGENTSPEC_DATABASE_URL", "postgres://not-used")], || {
        let result = extract::run(
            "Create a web scraping agent that fetches data from websites and stores it in a database",
            false,
        );
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "extract");
        assert_eq!(payload["status"], "ok");

        let suggestion = parse_message(&payload);
        assert_eq!(suggestion["name"], "Web Scraping Agent");
        let tools = suggestion["tools"].as_array().expect("tools array");
        assert!(tools.contains(&Value::from("web_scraper")));
        assert!(tools.contains(&Value::from("database_tool")));
    });
}

#[test]
fn extract_rejects_blank_description() {
    with_env(&[], || {
        let result = extract::run("   ", false);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "invalid_input");
    });
}

#[test]
fn saved_extractions_are_listed_in_creation_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let database_url = sqlite_file_url(&dir.path().join("agentspec.db"));

    with_env(&[("AGENTSPEC_DATABASE_URL", database_url.as_str())], || {
        let first = extract::run(r#"Create an agent called "Email Monitor" that tracks emails"#, true);
        assert_eq!(first.exit_code, 0, "{}", first.output);
        let stored = parse_message(&parse_payload(&first.output));
        assert_eq!(stored["id"], 1);
        assert_eq!(stored["name"], "Email Monitor");

        let second = extract::run("Something that does various tasks", true);
        assert_eq!(second.exit_code, 0, "{}", second.output);

        let listed = list::run();
        assert_eq!(listed.exit_code, 0, "{}", listed.output);
        let specifications = parse_message(&parse_payload(&listed.output));
        let names = specifications
            .as_array()
            .expect("list array")
            .iter()
            .map(|spec| spec["name"].as_str().unwrap_or_default().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Email Monitor", "Smart Assistant Agent"]);
    });
}

#[test]
fn list_on_fresh_database_is_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let database_url = sqlite_file_url(&dir.path().join("fresh.db"));

    with_env(&[("AGENTSPEC_DATABASE_URL", database_url.as_str())], || {
        let result = list::run();
        assert_eq!(result.exit_code, 0, "{}", result.output);
        assert_eq!(parse_message(&parse_payload(&result.output)), Value::Array(Vec::new()));
    });
}

#[test]
fn doctor_json_reports_all_checks() {
    with_env(&[("AGENTSPEC_DATABASE_URL", "sqlite::memory:")], || {
        let report = parse_payload(&doctor::run(true));
        assert_eq!(report["overall_status"], "pass", "{report}");

        let names = report["checks"]
            .as_array()
            .expect("checks array")
            .iter()
            .map(|check| check["name"].as_str().unwrap_or_default().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["config_validation", "database_connectivity", "extraction_pipeline"]);
    });
}

#[test]
fn doctor_skips_database_when_config_is_invalid() {
    with_env(&[("AGENTSPEC_SERVER_PORT", "not-a-port")], || {
        let report = parse_payload(&doctor::run(true));
        assert_eq!(report["overall_status"], "fail");
        assert_eq!(report["checks"][0]["status"], "fail");
        assert_eq!(report["checks"][1]["status"], "skipped");
        assert_eq!(report["checks"][2]["status"], "pass");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn parse_message(payload: &Value) -> Value {
    let message = payload["message"].as_str().expect("message should be a string");
    serde_json::from_str(message).expect("message should carry JSON")
}

fn sqlite_file_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "AGENTSPEC_DATABASE_URL",
        "AGENTSPEC_DATABASE_MAX_CONNECTIONS",
        "AGENTSPEC_DATABASE_TIMEOUT_SECS",
        "AGENTSPEC_SERVER_BIND_ADDRESS",
        "AGENTSPEC_SERVER_PORT",
        "AGENTSPEC_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "AGENTSPEC_LOGGING_LEVEL",
        "AGENTSPEC_LOGGING_FORMAT",
        "AGENTSPEC_LOG_LEVEL",
        "AGENTSPEC_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
