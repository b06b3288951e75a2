use std::fmt;

use log::{info, warn};

use crate::config::CheckConfig;
use crate::poll::{LogEventSource, PollOutcome, PollingEngine};

pub const CHECK_NAME: &str = "CloudWatch Logs";

/// Monitoring check status. The discriminant is the process exit code.
///
/// This check only ever reports `Ok` or `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok = 0,
    /// Part of the protocol, never reported by this check.
    #[allow(dead_code)]
    Warning = 1,
    /// Part of the protocol, never reported by this check.
    #[allow(dead_code)]
    Critical = 2,
    Unknown = 3,
}

impl CheckStatus {
    pub fn exit_code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckStatus::Ok => "OK",
            CheckStatus::Warning => "WARNING",
            CheckStatus::Critical => "CRITICAL",
            CheckStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checker {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
}

impl Checker {
    pub fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: CHECK_NAME.to_string(),
            status,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Unknown, message)
    }

    pub fn from_outcome(outcome: &PollOutcome) -> Self {
        match outcome {
            Ok(_) => Self::new(CheckStatus::Ok, "ok"),
            Err(err) => Self::unknown(err.to_string()),
        }
    }

    /// The single line written to stdout.
    pub fn status_line(&self) -> String {
        format!("{} {}: {}", self.name, self.status, self.message)
    }

    pub fn exit(&self) -> ! {
        println!("{}", self.status_line());
        std::process::exit(self.status.exit_code())
    }
}

/// Poll the configured log group through `source` and turn the result into a check.
pub async fn run<S>(source: &S, config: &CheckConfig) -> Checker
where
    S: LogEventSource + ?Sized,
{
    let engine = PollingEngine::default().with_max_pages(config.max_pages);
    let outcome = engine.poll(source, &config.log_group_name).await;

    match &outcome {
        Ok(summary) => info!(
            "{}: {} page(s), {} event(s)",
            config.log_group_name, summary.pages, summary.events
        ),
        Err(err) => warn!("{}: poll failed: {}", config.log_group_name, err),
    }

    Checker::from_outcome(&outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::MockLogSource;

    fn config_for(log_group_name: &str) -> CheckConfig {
        CheckConfig {
            log_group_name: log_group_name.to_string(),
            ..CheckConfig::default()
        }
    }

    #[test]
    fn status_exit_codes_follow_check_protocol() {
        assert_eq!(CheckStatus::Ok.exit_code(), 0);
        assert_eq!(CheckStatus::Warning.exit_code(), 1);
        assert_eq!(CheckStatus::Critical.exit_code(), 2);
        assert_eq!(CheckStatus::Unknown.exit_code(), 3);
    }

    #[test]
    fn status_line_includes_name_status_and_message() {
        let checker = Checker::new(CheckStatus::Critical, "boom");
        assert_eq!(checker.status_line(), "CloudWatch Logs CRITICAL: boom");
    }

    #[tokio::test]
    async fn empty_log_group_name_reports_unknown() {
        let source = MockLogSource::new().with_pages(1);

        let checker = run(&source, &config_for("")).await;

        assert_eq!(checker.status, CheckStatus::Unknown);
        assert_eq!(checker.message, "specify log group name");
        assert_eq!(checker.status.exit_code(), 3);
        assert_eq!(
            checker.status_line(),
            "CloudWatch Logs UNKNOWN: specify log group name"
        );
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn single_page_reports_ok() {
        let source = MockLogSource::new().with_pages(1);

        let checker = run(&source, &config_for("/aws/lambda/app")).await;

        assert_eq!(checker.status, CheckStatus::Ok);
        assert_eq!(checker.message, "ok");
        assert_eq!(checker.status.exit_code(), 0);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn network_error_reports_unknown_with_error_text() {
        let source = MockLogSource::new()
            .with_error("dispatch failure: io error: Connection refused (os error 111)");

        let checker = run(&source, &config_for("/aws/lambda/app")).await;

        assert_eq!(checker.status, CheckStatus::Unknown);
        assert!(checker.message.contains("Connection refused"));
        assert_eq!(checker.status.exit_code(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn page_limit_reports_unknown() {
        let source = MockLogSource::new()
            .with_page(0, Some("1"))
            .with_page(0, Some("2"));
        let config = CheckConfig {
            max_pages: Some(1),
            ..config_for("group")
        };

        let checker = run(&source, &config).await;

        assert_eq!(checker.status, CheckStatus::Unknown);
        assert!(checker.message.contains("more results remain"));
        assert_eq!(source.requests().len(), 1);
    }
}
