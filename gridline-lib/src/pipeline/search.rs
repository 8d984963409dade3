//! Debounced multi-word search.

use std::borrow::Cow;
use std::time::Duration;

use tokio::time::Instant;

use crate::model::Row;

/// Quiet period before a typed query takes effect.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Raw query plus the debounced query the pipeline actually uses.
///
/// The debounced query catches up with the raw one once no change has been
/// seen for the debounce delay. Clearing the query (empty or whitespace only)
/// takes effect at once and cancels any pending update.
///
/// The state is driven by explicit instants, so it works from a poll loop as
/// well as from an async task:
///
/// ```
/// use std::time::Duration;
/// use tokio::time::Instant;
/// use gridline_lib::pipeline::SearchState;
///
/// let mut search = SearchState::new(Duration::from_millis(300));
/// let t0 = Instant::now();
///
/// search.set_query("ada", t0);
/// assert_eq!(search.debounced(), "");
///
/// assert!(!search.poll(t0 + Duration::from_millis(100)));
/// assert!(search.poll(t0 + Duration::from_millis(300)));
/// assert_eq!(search.debounced(), "ada");
///
/// search.set_query("", t0 + Duration::from_millis(400));
/// assert_eq!(search.debounced(), "");
/// ```
#[derive(Debug, Clone)]
pub struct SearchState {
    raw: String,
    debounced: String,
    deadline: Option<Instant>,
    delay: Duration,
}

impl SearchState {
    /// Creates an empty search with the given debounce delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            raw: String::new(),
            debounced: String::new(),
            deadline: None,
            delay,
        }
    }

    /// Records a raw query change observed at `now`.
    ///
    /// Returns `true` if the debounced query changed immediately, which only
    /// happens when the query was cleared.
    pub fn set_query(&mut self, raw: impl Into<String>, now: Instant) -> bool {
        self.raw = raw.into();
        if self.raw.trim().is_empty() {
            self.deadline = None;
            return self.commit();
        }
        self.deadline = Some(now + self.delay);
        false
    }

    /// Applies the raw query if its quiet period has elapsed by `now`.
    ///
    /// Returns `true` if the debounced query changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.commit()
            }
            _ => false,
        }
    }

    /// Applies the raw query now, skipping the quiet period.
    pub fn flush(&mut self) -> bool {
        self.deadline = None;
        self.commit()
    }

    /// Waits out the pending quiet period, if any, then applies the query.
    pub async fn settle(&mut self) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        tokio::time::sleep_until(deadline).await;
        self.poll(Instant::now())
    }

    fn commit(&mut self) -> bool {
        if self.debounced == self.raw {
            return false;
        }
        self.debounced = self.raw.clone();
        log::debug!("[search] debounced query is now {:?}", self.debounced);
        true
    }

    /// The query as last typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The query the pipeline filters with.
    pub fn debounced(&self) -> &str {
        &self.debounced
    }

    /// When the pending query will take effect, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` if a raw change has not been applied yet.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// The configured debounce delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// Splits a query into lowercase words.
pub fn search_words(query: &str) -> Vec<String> {
    query.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// Keeps the rows matching every word of `query`.
///
/// A word matches a row if it is a case-insensitive substring of at least one
/// searchable column. A blank query returns the input borrowed.
pub fn apply<'a>(rows: &'a [Row], query: &str, searchable: &[String]) -> Cow<'a, [Row]> {
    let words = search_words(query);
    if words.is_empty() {
        return Cow::Borrowed(rows);
    }

    let matched: Vec<Row> = rows
        .iter()
        .filter(|row| {
            let haystacks: Vec<String> = searchable
                .iter()
                .filter_map(|col| row.get(col))
                .filter(|v| !v.is_null())
                .map(|v| v.to_filter_string().to_lowercase())
                .collect();
            words
                .iter()
                .all(|word| haystacks.iter().any(|h| h.contains(word.as_str())))
        })
        .cloned()
        .collect();

    log::trace!("[search] {:?}: {} -> {} rows", query, rows.len(), matched.len());
    Cow::Owned(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Row> {
        vec![
            Row::new().set("name", "Ada Lovelace").set("city", "London"),
            Row::new().set("name", "Alan Turing").set("city", "London"),
            Row::new().set("name", "Grace Hopper").set("city", "New York"),
            Row::new().set("name", "Linus").set("city", crate::model::Value::Null),
        ]
    }

    fn searchable() -> Vec<String> {
        vec!["name".to_string(), "city".to_string()]
    }

    fn names(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.get_string("name").unwrap().unwrap()).collect()
    }

    #[test]
    fn test_blank_query_borrows_input() {
        let rows = rows();
        assert!(matches!(apply(&rows, "   ", &searchable()), Cow::Borrowed(_)));
    }

    #[test]
    fn test_words_across_columns() {
        let rows = rows();
        let out = apply(&rows, "alan LONDON", &searchable());
        assert_eq!(names(&out), vec!["Alan Turing"]);
    }

    #[test]
    fn test_more_words_never_widen() {
        let rows = rows();
        let one = apply(&rows, "l", &searchable()).len();
        let two = apply(&rows, "l on", &searchable()).len();
        let three = apply(&rows, "l on ada", &searchable()).len();
        assert!(two <= one);
        assert!(three <= two);
        assert_eq!(three, 1);
    }

    #[test]
    fn test_only_searchable_columns_are_consulted() {
        let rows = rows();
        let out = apply(&rows, "york", &["name".to_string()]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_debounce_restarts_on_each_change() {
        let mut search = SearchState::default();
        let t0 = Instant::now();

        search.set_query("a", t0);
        search.set_query("ad", t0 + Duration::from_millis(200));
        assert!(!search.poll(t0 + Duration::from_millis(300)));
        assert_eq!(search.debounced(), "");

        assert!(search.poll(t0 + Duration::from_millis(500)));
        assert_eq!(search.debounced(), "ad");
        assert!(!search.is_pending());
    }

    #[test]
    fn test_clear_is_immediate_and_cancels_pending() {
        let mut search = SearchState::default();
        let t0 = Instant::now();

        search.set_query("ada", t0);
        search.poll(t0 + DEFAULT_DEBOUNCE);
        search.set_query("grace", t0 + Duration::from_secs(1));
        assert!(search.set_query("  ", t0 + Duration::from_millis(1100)));
        assert_eq!(search.debounced(), "  ");
        assert!(!search.is_pending());
        assert!(!search.poll(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn test_flush_skips_quiet_period() {
        let mut search = SearchState::default();
        search.set_query("ada", Instant::now());
        assert!(search.flush());
        assert_eq!(search.debounced(), "ada");
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_waits_for_deadline() {
        let mut search = SearchState::default();
        let start = Instant::now();
        search.set_query("ada", start);

        assert!(search.settle().await);
        assert_eq!(search.debounced(), "ada");
        assert!(start.elapsed() >= DEFAULT_DEBOUNCE);
    }
}
