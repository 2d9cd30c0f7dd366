use std::time::Duration;

/// Default options for all queries under a [`QueryClient`](crate::QueryClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultQueryOptions {
    /// Number of retries after a failed attempt.
    pub retry: u32,
    /// Time before a query is considered stale.
    pub stale_time: Option<Duration>,
}

impl Default for DefaultQueryOptions {
    fn default() -> Self {
        Self {
            retry: DEFAULT_RETRY,
            stale_time: Some(DEFAULT_STALE_TIME),
        }
    }
}

const DEFAULT_RETRY: u32 = 3;
const DEFAULT_STALE_TIME: Duration = Duration::ZERO;

/**
 * Options for a query [`use_query()`](crate::use_query())
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How many times a failed fetch is retried before the query fails.
    /// 0 means a single attempt.
    pub retry: u32,
    /// The duration that should pass before a query is considered stale.
    /// Stale queries are refetched when a [`use_query()`](crate::use_query()) instance mounts.
    /// If no stale_time, the query will never be considered stale.
    /// Default is zero: every mount refetches.
    pub stale_time: Option<Duration>,
}

impl QueryOptions {
    /// Set the retry count.
    pub fn set_retry(self, retry: u32) -> Self {
        QueryOptions { retry, ..self }
    }

    /// Set the stale_time.
    pub fn set_stale_time(self, stale_time: Option<Duration>) -> Self {
        QueryOptions { stale_time, ..self }
    }

    /// Total number of attempts a fetch may make.
    pub fn attempts(&self) -> u32 {
        self.retry.saturating_add(1)
    }
}

impl From<DefaultQueryOptions> for QueryOptions {
    fn from(defaults: DefaultQueryOptions) -> Self {
        Self {
            retry: defaults.retry,
            stale_time: defaults.stale_time,
        }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        // Use cache wide defaults if they exist.
        leptos::use_context::<crate::QueryClient>()
            .map(|c| c.default_options)
            .unwrap_or_default()
            .into()
    }
}
