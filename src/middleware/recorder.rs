//! Timestamped action history.
//!
//! [`RecordingMiddleware`] appends every action that reaches it to a shared
//! [`Recording`] before forwarding it. Installed last, it sees everything that
//! was dispatched; installed first, only what the other middleware let through.

use super::{Middleware, Next};
use crate::container::Container;
use crate::domain::action::Action;
use crate::domain::error::Result;
use crate::Config;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// One recorded action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    /// Action type.
    pub kind: String,
    /// Positional arguments. Empty for set actions.
    pub args: Vec<Value>,
    /// When the action reached the recorder.
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug)]
struct History {
    records: VecDeque<ActionRecord>,
    limit: Option<usize>,
}

/// Shared handle to a recorder's history.
///
/// Cloning the handle shares the same history.
#[derive(Debug, Clone)]
pub struct Recording {
    history: Rc<RefCell<History>>,
}

impl Recording {
    fn push(&self, record: ActionRecord) {
        let mut history = self.history.borrow_mut();
        if history.limit == Some(0) {
            return;
        }
        if let Some(limit) = history.limit {
            while history.records.len() >= limit {
                history.records.pop_front();
            }
        }
        history.records.push_back(record);
    }

    /// Recorded actions, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<ActionRecord> {
        self.history.borrow().records.iter().cloned().collect()
    }

    /// Recorded action types, oldest first.
    #[must_use]
    pub fn kinds(&self) -> Vec<String> {
        self.history
            .borrow()
            .records
            .iter()
            .map(|record| record.kind.clone())
            .collect()
    }

    /// Number of retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.borrow().records.len()
    }

    /// Returns `true` if nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.borrow().records.is_empty()
    }

    /// Discards all records.
    pub fn clear(&self) {
        self.history.borrow_mut().records.clear();
    }
}

/// Records actions into a [`Recording`], then forwards them.
#[derive(Debug, Clone)]
pub struct RecordingMiddleware {
    recording: Recording,
}

impl RecordingMiddleware {
    /// Creates a recorder keeping at most `limit` records (oldest dropped first).
    ///
    /// `None` keeps everything.
    #[must_use]
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            recording: Recording {
                history: Rc::new(RefCell::new(History {
                    records: VecDeque::new(),
                    limit,
                })),
            },
        }
    }

    /// Creates a recorder bounded by [`Config::history_limit`].
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.history_limit)
    }

    /// Handle to the history this recorder writes to.
    #[must_use]
    pub fn recording(&self) -> Recording {
        self.recording.clone()
    }
}

impl Default for RecordingMiddleware {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<S> Middleware<S> for RecordingMiddleware {
    fn handle(
        &self,
        _container: &Container<S>,
        action: Action<S>,
        next: &Next<'_, S>,
    ) -> Result<()> {
        self.recording.push(ActionRecord {
            kind: action.kind().to_string(),
            args: action.args().to_vec(),
            recorded_at: Utc::now(),
        });
        next.run(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str) -> ActionRecord {
        ActionRecord {
            kind: kind.to_string(),
            args: vec![],
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn limit_drops_oldest_records() {
        let recorder = RecordingMiddleware::new(Some(2));
        let recording = recorder.recording();
        recording.push(record("a"));
        recording.push(record("b"));
        recording.push(record("c"));
        assert_eq!(recording.kinds(), vec!["b", "c"]);
    }

    #[test]
    fn zero_limit_keeps_nothing() {
        let recording = RecordingMiddleware::new(Some(0)).recording();
        recording.push(record("a"));
        assert!(recording.is_empty());
    }

    #[test]
    fn from_config_uses_history_limit() {
        let config = Config {
            history_limit: Some(1),
            ..Config::default()
        };
        let recording = RecordingMiddleware::from_config(&config).recording();
        recording.push(record("a"));
        recording.push(record("b"));
        assert_eq!(recording.kinds(), vec!["b"]);
    }

    #[test]
    fn clear_empties_history() {
        let recording = RecordingMiddleware::default().recording();
        recording.push(record("a"));
        assert_eq!(recording.len(), 1);
        recording.clear();
        assert!(recording.is_empty());
    }
}
