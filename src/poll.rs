use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use thiserror::Error;

/// How far back each page request looks.
pub const DEFAULT_LOOKBACK: Duration = Duration::from_secs(5 * 60);

/// Pause between consecutive page requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(200);

/// Lookback interval ending at the moment it was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn ending_at(end: DateTime<Utc>, lookback: Duration) -> Self {
        let lookback = chrono::Duration::from_std(lookback).unwrap_or(chrono::TimeDelta::MAX);
        let start = end.checked_sub_signed(lookback).unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end }
    }

    /// Start of the window in epoch milliseconds, truncated to whole seconds.
    pub fn start_millis(&self) -> i64 {
        self.start.timestamp() * 1000
    }
}

/// A single FilterLogEvents-style request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub log_group_name: String,
    pub start_time_millis: i64,
    pub next_token: Option<String>,
}

/// One page of results. Events are opaque, so only their number is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPage {
    pub event_count: usize,
    pub next_token: Option<String>,
}

/// Anything that can serve pages of log events for a log group.
#[async_trait]
pub trait LogEventSource: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> anyhow::Result<LogPage>;
}

/// Counters for a poll that walked every page without error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub pages: u32,
    pub events: usize,
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("specify log group name")]
    MissingLogGroupName,

    /// The remote call failed. Carries the underlying error untouched.
    #[error("{0:#}")]
    Request(anyhow::Error),

    #[error("stopped after {pages} page(s): more results remain")]
    PageLimit { pages: u32 },
}

pub type PollOutcome = Result<PollSummary, PollError>;

/// Walks every page of recent events for a log group.
///
/// Pass/fail depends only on whether each request succeeds. Event contents are
/// never looked at.
#[derive(Debug, Clone)]
pub struct PollingEngine {
    pub lookback: Duration,
    pub page_delay: Duration,
    /// `None` follows continuation tokens for as long as the service returns them.
    pub max_pages: Option<u32>,
    pub clock: fn() -> DateTime<Utc>,
}

impl Default for PollingEngine {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
            page_delay: DEFAULT_PAGE_DELAY,
            max_pages: None,
            clock: Utc::now,
        }
    }
}

impl PollingEngine {
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub async fn poll<S>(&self, source: &S, log_group_name: &str) -> PollOutcome
    where
        S: LogEventSource + ?Sized,
    {
        if log_group_name.is_empty() {
            return Err(PollError::MissingLogGroupName);
        }

        let mut summary = PollSummary::default();
        let mut next_token: Option<String> = None;

        loop {
            // Recomputed per page, so the window slides forward while paginating.
            let window = TimeWindow::ending_at((self.clock)(), self.lookback);
            let request = PageRequest {
                log_group_name: log_group_name.to_string(),
                start_time_millis: window.start_millis(),
                next_token: next_token.take(),
            };

            let page = source
                .fetch_page(&request)
                .await
                .map_err(PollError::Request)?;

            summary.pages += 1;
            summary.events += page.event_count;
            debug!(
                "{}: page {} returned {} event(s), more={}",
                log_group_name,
                summary.pages,
                page.event_count,
                page.next_token.is_some()
            );

            match page.next_token {
                None => return Ok(summary),
                Some(token) => {
                    if let Some(limit) = self.max_pages {
                        if summary.pages >= limit {
                            return Err(PollError::PageLimit {
                                pages: summary.pages,
                            });
                        }
                    }
                    next_token = Some(token);
                    tokio::time::sleep(self.page_delay).await;
                }
            }
        }
    }
}

/// Replays scripted responses in order and records every request it sees.
#[cfg(test)]
pub struct MockLogSource {
    responses: std::sync::Mutex<Vec<anyhow::Result<LogPage>>>,
    requests: std::sync::Mutex<Vec<PageRequest>>,
}

#[cfg(test)]
impl MockLogSource {
    pub fn new() -> Self {
        Self {
            responses: std::sync::Mutex::new(Vec::new()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_page(self, event_count: usize, next_token: Option<&str>) -> Self {
        self.responses.lock().unwrap().push(Ok(LogPage {
            event_count,
            next_token: next_token.map(str::to_string),
        }));
        self
    }

    pub fn with_error(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Err(anyhow::anyhow!(message.to_string())));
        self
    }

    /// Adds `count` empty pages where every page but the last carries a token.
    pub fn with_pages(mut self, count: usize) -> Self {
        for i in 0..count {
            let token = (i + 1 < count).then(|| format!("token-{}", i));
            self = self.with_page(0, token.as_deref());
        }
        self
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl LogEventSource for MockLogSource {
    async fn fetch_page(&self, request: &PageRequest) -> anyhow::Result<LogPage> {
        self.requests.lock().unwrap().push(request.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(LogPage::default())
        } else {
            responses.remove(0)
        }
    }
}
