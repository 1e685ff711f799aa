//! Filtered action logging for stores
//!
//! [`ActionLogger`] is an enhancer. It wraps the reducer, so it sees every
//! action the store reduces (the init step included) and whether the state
//! `Arc` changed. Output goes to `tracing` at debug level. An optional
//! [`ActionLog`] keeps the most recent entries in memory for later reading.
//!
//! Which action types are logged is decided by [`ActionLoggerConfig`], a pair
//! of glob pattern lists.
//!
//! # Example
//!
//! ```ignore
//! use state_dispatch_core::debug::{ActionLogConfig, ActionLogger, ActionLoggerConfig};
//!
//! // Everything except the status pings, tracing only
//! let logger = ActionLogger::new(ActionLoggerConfig::new(None, Some("app/ping")));
//!
//! // Keep the last 50 cart actions in memory as well
//! let filter = ActionLoggerConfig::new(Some("cart/*"), None);
//! let logger = ActionLogger::with_log(ActionLogConfig::new(50, filter));
//! let log = logger.log().cloned();
//!
//! let store = create_store(reducer, None, logger)?;
//! store.dispatch(CartAction::AddItem { product_id: 1, quantity: 1 })?;
//!
//! for entry in log.map(|log| log.recent(10)).unwrap_or_default() {
//!     println!("#{} {}", entry.sequence, entry.summary);
//! }
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use crate::action::{Action, INIT_ACTION_TYPE};
use crate::enhancer::{StoreCreator, StoreEnhancer};
use crate::error::ReducerError;
use crate::reducer::{BoxReducer, Reducer};

/// Environment variable holding comma-separated include patterns
pub const LOG_INCLUDE_ENV: &str = "STATE_DISPATCH_LOG_INCLUDE";

/// Environment variable holding comma-separated exclude patterns
pub const LOG_EXCLUDE_ENV: &str = "STATE_DISPATCH_LOG_EXCLUDE";

/// Include and exclude glob patterns over action types.
///
/// An empty include list admits every type. Excludes win over includes.
/// See [`glob_match`] for the pattern syntax.
#[derive(Debug, Clone, Default)]
pub struct ActionLoggerConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

fn parse_pattern_list(raw: Option<&str>) -> Vec<String> {
    raw.into_iter()
        .flat_map(|list| list.split(','))
        .map(str::trim)
        .filter(|pattern| !pattern.is_empty())
        .map(String::from)
        .collect()
}

fn any_match(patterns: &[String], action_type: &str) -> bool {
    patterns.iter().any(|p| glob_match(p, action_type))
}

impl ActionLoggerConfig {
    /// Build from comma-separated pattern lists; `None` means "no patterns"
    ///
    /// ```
    /// use state_dispatch_core::debug::ActionLoggerConfig;
    ///
    /// let config = ActionLoggerConfig::new(Some("cart/*,inc"), Some("cart/clear"));
    /// assert!(config.should_log("cart/addItem"));
    /// assert!(config.should_log("inc"));
    /// assert!(!config.should_log("cart/clear"));
    /// assert!(!config.should_log("dec"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include: parse_pattern_list(include),
            exclude: parse_pattern_list(exclude),
        }
    }

    /// Read [`LOG_INCLUDE_ENV`] and [`LOG_EXCLUDE_ENV`]
    pub fn from_env() -> Self {
        let include = std::env::var(LOG_INCLUDE_ENV).ok();
        let exclude = std::env::var(LOG_EXCLUDE_ENV).ok();
        Self::new(include.as_deref(), exclude.as_deref())
    }

    pub fn should_log(&self, action_type: &str) -> bool {
        let included = self.include.is_empty() || any_match(&self.include, action_type);
        included && !any_match(&self.exclude, action_type)
    }
}

// ============================================================================
// In-memory log
// ============================================================================

/// One reduced action as seen by the logger
#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    pub action_type: String,
    /// `Action::summary()` at the time of dispatch
    pub summary: String,
    pub sequence: u64,
    pub logged_at: Instant,
    /// `None` while the reducer runs or when it failed
    pub state_changed: Option<bool>,
}

/// Capacity and filter of an [`ActionLog`]
#[derive(Debug, Clone)]
pub struct ActionLogConfig {
    pub capacity: usize,
    pub filter: ActionLoggerConfig,
}

impl Default for ActionLogConfig {
    fn default() -> Self {
        Self::with_capacity(100)
    }
}

impl ActionLogConfig {
    pub fn new(capacity: usize, filter: ActionLoggerConfig) -> Self {
        Self { capacity, filter }
    }

    /// Unfiltered log of the given size
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, ActionLoggerConfig::default())
    }
}

/// Bounded log of recent actions; the oldest entry goes first when full
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    capacity: usize,
    filter: ActionLoggerConfig,
    next_sequence: u64,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(ActionLogConfig::default())
    }
}

impl ActionLog {
    pub fn new(config: ActionLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            capacity: config.capacity,
            filter: config.filter,
            next_sequence: 0,
        }
    }

    /// Append `action` unless the filter rejects it
    pub fn log<A: Action>(&mut self, action: &A) -> Option<&ActionLogEntry> {
        self.record(action.action_type(), action.summary())
    }

    /// Append an entry by type and summary unless the filter rejects it
    pub fn record(&mut self, action_type: &str, summary: String) -> Option<&ActionLogEntry> {
        if self.capacity == 0 || !self.filter.should_log(action_type) {
            return None;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ActionLogEntry {
            action_type: action_type.to_string(),
            summary,
            sequence: self.next_sequence,
            logged_at: Instant::now(),
            state_changed: None,
        });
        self.next_sequence += 1;
        self.entries.back()
    }

    /// Fill in `state_changed` on the newest entry
    pub fn mark_last(&mut self, state_changed: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.state_changed = Some(state_changed);
        }
    }

    /// Oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// Up to `count` entries, newest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Shared handle to an [`ActionLog`] filled by an [`ActionLogger`]
///
/// The logger is consumed when the store is created; keep a clone of this
/// handle to read the log afterwards.
#[derive(Debug, Clone, Default)]
pub struct ActionLogHandle(Rc<RefCell<ActionLog>>);

impl ActionLogHandle {
    pub fn new(log: ActionLog) -> Self {
        Self(Rc::new(RefCell::new(log)))
    }

    /// Copy of all entries, oldest first
    pub fn entries(&self) -> Vec<ActionLogEntry> {
        self.0.borrow().entries().cloned().collect()
    }

    /// Copy of up to `count` entries, newest first
    pub fn recent(&self, count: usize) -> Vec<ActionLogEntry> {
        self.0.borrow().recent(count).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Run `f` with the log mutably borrowed
    pub fn with<R>(&self, f: impl FnOnce(&mut ActionLog) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}

// ============================================================================
// Enhancer
// ============================================================================

/// Enhancer that reports each reduced action through `tracing::debug!`.
///
/// `state_changed` is judged by identity: a reducer returning the `Arc` it
/// was given counts as unchanged. With [`with_log`](Self::with_log) the
/// entries are kept in an [`ActionLog`] as well.
///
/// ```ignore
/// let logger = ActionLogger::log_all().active(args.log);
/// let store = Store::builder(reducer).enhancer(logger).build()?;
/// ```
#[derive(Debug, Clone)]
pub struct ActionLogger {
    filter: ActionLoggerConfig,
    log: Option<ActionLogHandle>,
    active: bool,
}

impl ActionLogger {
    /// Tracing output only
    pub fn new(filter: ActionLoggerConfig) -> Self {
        Self {
            filter,
            log: None,
            active: true,
        }
    }

    /// Tracing output plus an in-memory log
    pub fn with_log(config: ActionLogConfig) -> Self {
        Self {
            filter: config.filter.clone(),
            log: Some(ActionLogHandle::new(ActionLog::new(config))),
            active: true,
        }
    }

    pub fn with_default_log() -> Self {
        Self::with_log(ActionLogConfig::default())
    }

    /// Unfiltered, tracing only
    pub fn log_all() -> Self {
        Self::new(ActionLoggerConfig::default())
    }

    /// Filter from the environment, tracing only
    pub fn from_env() -> Self {
        Self::new(ActionLoggerConfig::from_env())
    }

    /// An inactive logger leaves store creation untouched
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Handle to the in-memory log, when there is one
    pub fn log(&self) -> Option<&ActionLogHandle> {
        self.log.as_ref()
    }
}

impl<S: 'static, A: Action> StoreEnhancer<S, A> for ActionLogger {
    fn enhance(self, next: StoreCreator<S, A>) -> StoreCreator<S, A> {
        if !self.active {
            return next;
        }
        Box::new(move |reducer, preloaded| {
            let logged = LoggedReducer {
                inner: reducer,
                filter: self.filter,
                log: self.log,
            };
            next(Box::new(logged), preloaded)
        })
    }
}

struct LoggedReducer<S, A> {
    inner: BoxReducer<S, A>,
    filter: ActionLoggerConfig,
    log: Option<ActionLogHandle>,
}

impl<S, A> LoggedReducer<S, A> {
    /// Append to the log; true when an entry was written
    fn begin(&self, action_type: &str, summary: impl FnOnce() -> String) -> bool {
        self.log.as_ref().is_some_and(|log| {
            log.with(|log| log.record(action_type, summary()).is_some())
        })
    }

    fn finish(&self, written: bool, state_changed: Option<bool>) {
        if let (true, Some(changed), Some(log)) = (written, state_changed, &self.log) {
            log.with(|log| log.mark_last(changed));
        }
    }
}

impl<S, A: Action> Reducer<S, A> for LoggedReducer<S, A> {
    fn init(&self) -> Result<Arc<S>, ReducerError> {
        let written = self.begin(INIT_ACTION_TYPE, || INIT_ACTION_TYPE.to_string());
        let result = self.inner.init();
        if self.filter.should_log(INIT_ACTION_TYPE) {
            tracing::debug!(action = %INIT_ACTION_TYPE, ok = result.is_ok(), "action");
        }
        self.finish(written, result.as_ref().ok().map(|_| true));
        result
    }

    fn reduce(&self, state: &Arc<S>, action: &A) -> Result<Arc<S>, ReducerError> {
        let action_type = action.action_type();
        let written = self.begin(action_type, || action.summary());
        let result = self.inner.reduce(state, action);
        let state_changed = result.as_ref().ok().map(|next| !Arc::ptr_eq(state, next));

        if self.filter.should_log(action_type) {
            match &result {
                Ok(_) => tracing::debug!(
                    action = %action_type,
                    state_changed = state_changed.unwrap_or(false),
                    "action"
                ),
                Err(e) => tracing::debug!(action = %action_type, error = %e, "action failed"),
            }
        }

        self.finish(written, state_changed);
        result
    }
}

/// Glob match over whole strings: `*` is any run of characters (possibly
/// empty), `?` is exactly one character, everything else is literal.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob_from(&pattern, &text)
}

fn glob_from(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((&'*', rest)) => {
            // Runs of stars behave like one
            let rest_start = rest.iter().take_while(|c| **c == '*').count();
            let rest = &rest[rest_start..];
            (0..=text.len()).any(|skip| glob_from(rest, &text[skip..]))
        }
        Some((&expected, rest)) => match text.split_first() {
            Some((&actual, tail)) => {
                (expected == '?' || expected == actual) && glob_from(rest, tail)
            }
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::create_store;

    #[test]
    fn test_glob_literal() {
        assert!(glob_match("inc", "inc"));
        assert!(!glob_match("inc", "dec"));
        assert!(!glob_match("inc", "increment"));
        assert!(glob_match("", ""));
    }

    #[test]
    fn test_glob_star() {
        assert!(glob_match("cart/*", "cart/addItem"));
        assert!(glob_match("cart/*", "cart/"));
        assert!(!glob_match("cart/*", "wishlist/addItem"));
        assert!(glob_match("*Item", "cart/addItem"));
        assert!(glob_match("*/add*", "wishlist/addItem"));
        assert!(glob_match("**", ""));
        assert!(glob_match("@@*", INIT_ACTION_TYPE));
    }

    #[test]
    fn test_glob_question_mark() {
        assert!(glob_match("post/?ecrement", "post/decrement"));
        assert!(!glob_match("inc?", "inc"));
        assert!(!glob_match("inc?", "incss"));
        assert!(glob_match("post/*crease?y", "post/decreaseBy"));
    }

    #[test]
    fn test_config_include() {
        let config = ActionLoggerConfig::new(Some("cart/*, app/setStatus"), None);
        assert!(config.should_log("cart/addItem"));
        assert!(config.should_log("app/setStatus"));
        assert!(!config.should_log("post/increment"));
    }

    #[test]
    fn test_config_exclude_wins() {
        let config = ActionLoggerConfig::new(Some("post/*"), Some("post/*By,@@*"));
        assert!(config.should_log("post/increment"));
        assert!(!config.should_log("post/increaseBy"));
        assert!(!config.should_log(INIT_ACTION_TYPE));
        assert!(!config.should_log("cart/addItem"));
    }

    #[test]
    fn test_config_default_and_blank_lists_log_everything() {
        assert!(ActionLoggerConfig::default().should_log(INIT_ACTION_TYPE));

        let config = ActionLoggerConfig::new(Some(" , "), Some(""));
        assert!(config.include.is_empty());
        assert!(config.exclude.is_empty());
        assert!(config.should_log("anything"));
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Inc,
        Ping,
    }

    impl Action for TestAction {
        fn action_type(&self) -> &str {
            match self {
                TestAction::Inc => "inc",
                TestAction::Ping => "ping",
            }
        }
    }

    fn counter(state: &Arc<i32>, action: &TestAction) -> Arc<i32> {
        match action {
            TestAction::Inc => Arc::new(**state + 1),
            TestAction::Ping => Arc::clone(state),
        }
    }

    #[test]
    fn test_log_filters_and_numbers_entries() {
        let filter = ActionLoggerConfig::new(None, Some("ping"));
        let mut log = ActionLog::new(ActionLogConfig::new(10, filter));

        assert!(log.log(&TestAction::Ping).is_none());
        let entry = log.log(&TestAction::Inc).cloned().unwrap();

        assert_eq!(log.len(), 1);
        assert_eq!(entry.action_type, "inc");
        assert_eq!(entry.summary, "Inc");
        assert_eq!(entry.sequence, 0);
        assert_eq!(entry.state_changed, None);
    }

    #[test]
    fn test_log_evicts_oldest() {
        let mut log = ActionLog::new(ActionLogConfig::with_capacity(3));
        for _ in 0..5 {
            log.log(&TestAction::Inc);
        }

        let sequences: Vec<u64> = log.entries().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![2, 3, 4]);

        let newest: Vec<u64> = log.recent(2).map(|e| e.sequence).collect();
        assert_eq!(newest, vec![4, 3]);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut log = ActionLog::new(ActionLogConfig::with_capacity(0));
        assert!(log.log(&TestAction::Inc).is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn test_logger_records_init_and_changes() {
        let logger = ActionLogger::with_default_log();
        let log = logger.log().cloned().unwrap();

        let store = create_store(counter, None, logger).unwrap();
        store.dispatch(TestAction::Inc).unwrap();
        store.dispatch(TestAction::Ping).unwrap();

        let entries = log.entries();
        let types: Vec<_> = entries.iter().map(|e| e.action_type.as_str()).collect();
        assert_eq!(types, vec![INIT_ACTION_TYPE, "inc", "ping"]);
        assert_eq!(entries[1].state_changed, Some(true));
        assert_eq!(entries[2].state_changed, Some(false));

        let latest = log.recent(1);
        assert_eq!(latest[0].action_type, "ping");

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_filtered_action_does_not_update_previous_entry() {
        let config = ActionLogConfig::new(10, ActionLoggerConfig::new(None, Some("ping")));
        let logger = ActionLogger::with_log(config);
        let log = logger.log().cloned().unwrap();

        let store = create_store(counter, Some(0), logger).unwrap();
        store.dispatch(TestAction::Inc).unwrap();
        store.dispatch(TestAction::Ping).unwrap();

        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].state_changed, Some(true));
    }

    #[test]
    fn test_inactive_logger_records_nothing() {
        let logger = ActionLogger::with_default_log().active(false);
        let log = logger.log().cloned().unwrap();

        let store = create_store(counter, None, logger).unwrap();
        store.dispatch(TestAction::Inc).unwrap();

        assert!(log.is_empty());
        assert_eq!(*store.get_state(), 1);
    }
}
