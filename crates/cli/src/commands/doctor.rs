use agentspec_core::config::{AppConfig, LoadOptions};
use agentspec_core::extraction::{ExtractionPipeline, ExtractionResult, Tool};
use agentspec_db::{connect_with_config, migrations};
use serde::Serialize;

const SELF_CHECK_DESCRIPTION: &str =
    r#"Create an agent called "Inbox Sentinel" that should monitor my inbox and email a daily report"#;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into() }
    }

    fn fail(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into() }
    }

    fn skipped(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Skipped, details: details.into() }
    }
}

impl DoctorReport {
    fn from_checks(checks: Vec<DoctorCheck>) -> Self {
        let healthy = checks.iter().all(|check| check.status == CheckStatus::Pass);
        let (overall_status, summary) = if healthy {
            (CheckStatus::Pass, "doctor: all readiness checks passed")
        } else {
            (CheckStatus::Fail, "doctor: one or more readiness checks failed")
        };
        Self { overall_status, summary: summary.to_string(), checks }
    }
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            serde_json::json!({
                "overall_status": "fail",
                "summary": "doctor serialization failed",
                "error": error.to_string(),
            })
            .to_string()
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => vec![
            DoctorCheck::pass("config_validation", "configuration loaded and validated"),
            check_database(&config),
        ],
        Err(error) => vec![
            DoctorCheck::fail("config_validation", error.to_string()),
            DoctorCheck::skipped(
                "database_connectivity",
                "skipped because configuration did not load",
            ),
        ],
    };
    checks.push(check_extraction_pipeline());

    DoctorReport::from_checks(checks)
}

/// Connects without migrating and notes how far the schema lags behind.
fn check_database(config: &AppConfig) -> DoctorCheck {
    const NAME: &str = "database_connectivity";

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck::fail(NAME, format!("failed to initialize async runtime: {error}"))
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_config(&config.database).await {
            Ok(pool) => pool,
            Err(error) => {
                return DoctorCheck::fail(NAME, format!("failed to connect to database: {error}"))
            }
        };

        let schema = match migrations::pending_versions(&pool).await {
            Ok(pending) if pending.is_empty() => "schema up to date".to_string(),
            Ok(pending) => format!("{} pending migrations; run `agentspec migrate`", pending.len()),
            Err(_) => "no migrations applied yet; run `agentspec migrate`".to_string(),
        };
        pool.close().await;

        DoctorCheck::pass(NAME, format!("connected using `{}`; {schema}", config.database.url))
    })
}

fn check_extraction_pipeline() -> DoctorCheck {
    const NAME: &str = "extraction_pipeline";

    let first = ExtractionPipeline.extract(SELF_CHECK_DESCRIPTION);
    let second = ExtractionPipeline.extract(SELF_CHECK_DESCRIPTION);
    let outcome = match (first, second) {
        (Ok(first), Ok(second)) => verify_self_check(&first, &second),
        (Err(error), _) | (_, Err(error)) => Err(error.to_string()),
    };

    match outcome {
        Ok(details) => DoctorCheck::pass(NAME, details),
        Err(details) => DoctorCheck::fail(NAME, details),
    }
}

fn verify_self_check(first: &ExtractionResult, second: &ExtractionResult) -> Result<String, String> {
    if first != second {
        return Err("pipeline produced different results for identical input".to_string());
    }
    if first.name.is_empty() || first.instructions.is_empty() {
        return Err("pipeline produced an empty name or instructions".to_string());
    }
    if !first.goal.starts_with("To ") {
        return Err(format!("goal `{}` does not start with `To `", first.goal));
    }
    if !first.tools.iter().all(|tool| Tool::ALL.contains(tool)) {
        return Err("pipeline suggested a tool outside the vocabulary".to_string());
    }
    if first.name != "Inbox Sentinel" || !first.tools.contains(&Tool::EmailTool) {
        return Err(format!(
            "unexpected suggestion: name `{}`, tools [{}]",
            first.name,
            first.tool_identifiers().join(", ")
        ));
    }

    Ok(format!("deterministic suggestion `{}` with {} tools", first.name, first.tools.len()))
}

fn render_human(report: &DoctorReport) -> String {
    std::iter::once(report.summary.clone())
        .chain(report.checks.iter().map(|check| {
            let marker = match check.status {
                CheckStatus::Pass => "ok",
                CheckStatus::Fail => "fail",
                CheckStatus::Skipped => "skip",
            };
            format!("- [{marker}] {}: {}", check.name, check.details)
        }))
        .collect::<Vec<_>>()
        .join("\n")
}
