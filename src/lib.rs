//! State containers: a reactive store for one immutable state value.
//!
//! A [`Container`] holds a single state, changes it only through pure
//! transitions, derives read-only views through pure selectors, runs pluggable
//! middleware around every dispatch, and publishes each new state to
//! subscribers and streams.

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Container (container/)                             │  ← get / set / dispatch
//! │  - Transition & selector registries                 │
//! │  - Replaceable reducer                              │
//! │  - Freeze guard                                     │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Middleware    │   │ Stream        │   │ Domain        │
//! │ (middleware/) │   │ (stream/)     │   │ (domain/)     │
//! │ - Chain       │   │ - Broadcast   │   │ - Actions     │
//! │ - Logging     │   │ - Stream view │   │ - Errors      │
//! │ - Recording   │   │               │   │               │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - tracing subscriber setup                         │
//! │  - OTLP JSON file export                            │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`container`]: The container, its builder, registries, reducer and freeze guards
//! - [`domain`]: Actions, action envelopes and error types
//! - [`middleware`]: Middleware trait, composition and built-in middleware
//! - [`stream`]: Broadcast cell and `futures` stream adapter
//! - [`observability`]: Tracing initialization
//!
//! # Configuration
//!
//! [`Config`] is read from a host key/value map, a TOML string or a TOML file:
//!
//! ```toml
//! mode = "development"
//! notify_unchanged = true
//! trace_level = "debug"
//! trace_file = "/tmp/state-containers-otlp.json"
//! history_limit = 100
//! ```
//!
//! # Example
//!
//! ```rust
//! use state_containers::{Container, PureSelectors, PureTransitions};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! let container = Container::builder(Counter { count: 0 })
//!     .transitions(PureTransitions::new().with("increment", |state: &Counter, (by,): (i64,)| {
//!         Counter { count: state.count + by }
//!     }))
//!     .selectors(PureSelectors::new().with("getCount", |state: &Counter, (): ()| state.count))
//!     .build()?;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let subscription = container.subscribe(move |state| sink.borrow_mut().push(state.count));
//!
//! container.transitions().call("increment", (5,))?;
//! assert_eq!(container.selectors().call::<i64, _>("getCount", ())?, 5);
//! assert_eq!(*seen.borrow(), vec![5]);
//!
//! subscription.unsubscribe();
//! # Ok::<(), state_containers::ContainerError>(())
//! ```
//!
//! # Key Design Decisions
//!
//! ## Shared immutable states
//!
//! States are held as `Arc<S>`. `get()` is a pointer copy, a no-op dispatch
//! returns the very same `Arc`, and callers cannot assign through it. The
//! development freeze guard covers what the type system cannot: interior
//! mutability inside `S`.
//!
//! ## Synchronous, single-threaded dispatch
//!
//! `dispatch` reduces and notifies every subscriber before it returns. Nested
//! dispatches from subscribers or middleware complete immediately, before the
//! outer notification loop resumes.
//!
//! ## Explicit modes
//!
//! Development and production behaviour is selected by [`Mode`] in the
//! configuration passed to the builder, never by environment variables.

pub mod container;
pub mod domain;
pub mod middleware;
pub mod observability;
pub mod stream;

pub use container::{
    reducer_fn, Container, ContainerBuilder, DeepFreeze, Freeze, FreezeFn, Identity,
    PureSelectors, PureTransitions, Reducer, Selectors, Transitions,
};
pub use domain::{
    to_args, Action, ActionEnvelope, BoxError, ContainerError, Result, SET_ACTION_TYPE,
};
pub use middleware::{
    ActionRecord, LoggingMiddleware, Middleware, Next, Recording, RecordingMiddleware,
};
pub use stream::{StateStream, Subscription};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Selects the default freeze guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Seal every accepted state and reject dispatches after outside mutation.
    Development,
    /// Accept states as they are.
    Production,
}

impl Default for Mode {
    /// `Development` in builds with debug assertions, `Production` otherwise.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ContainerError::Config(format!("unknown mode '{other}'"))),
        }
    }
}

/// Container and observability configuration.
///
/// # Example
///
/// ```toml
/// mode = "production"
/// notify_unchanged = false
/// trace_level = "info"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default freeze guard. Default: [`Mode::default`].
    pub mode: Mode,

    /// Notify subscribers when a dispatch leaves the state unchanged.
    ///
    /// Default: `true`, so every dispatch produces exactly one notification.
    pub notify_unchanged: bool,

    /// Tracing filter directive for [`observability::init_tracing`].
    ///
    /// `RUST_LOG` takes precedence. Default: `"info"`
    pub trace_level: Option<String>,

    /// When set, spans are exported as OTLP JSON lines to this file instead of
    /// being printed to stderr.
    pub trace_file: Option<PathBuf>,

    /// Maximum records kept by [`RecordingMiddleware::from_config`].
    ///
    /// `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            notify_unchanged: true,
            trace_level: None,
            trace_file: None,
            history_limit: None,
        }
    }
}

impl Config {
    /// Parses configuration from a host key/value map.
    ///
    /// Hosts that hand configuration over as strings (plugin systems, CLI
    /// `key=value` pairs) use this. Every key is optional; a value that fails
    /// to parse falls back to its default.
    ///
    /// # Parsing Rules
    ///
    /// - `mode`: `development`/`dev` or `production`/`prod`
    /// - `notify_unchanged`: `true`/`false`
    /// - `trace_level`: any string
    /// - `trace_file`: path
    /// - `history_limit`: non-negative integer
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use state_containers::{Config, Mode};
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("mode".to_string(), "prod".to_string());
    /// map.insert("history_limit".to_string(), "50".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.mode, Mode::Production);
    /// assert_eq!(config.history_limit, Some(50));
    /// assert!(config.notify_unchanged);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();

        let mode = map.get("mode").map_or(defaults.mode, |value| {
            value.parse().unwrap_or_else(|e| {
                tracing::debug!(value = %value, error = %e, "invalid mode, using default");
                defaults.mode
            })
        });

        let notify_unchanged = map
            .get("notify_unchanged")
            .and_then(|s| s.trim().parse::<bool>().ok())
            .unwrap_or(defaults.notify_unchanged);

        let history_limit = map
            .get("history_limit")
            .and_then(|s| s.trim().parse::<usize>().ok());

        Self {
            mode,
            notify_unchanged,
            trace_level: map.get("trace_level").cloned(),
            trace_file: map.get("trace_file").map(PathBuf::from),
            history_limit,
        }
    }

    /// Parses configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::ConfigParse`] on malformed TOML, unknown keys
    /// or values of the wrong type.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Io`] if the file cannot be read and
    /// [`ContainerError::ConfigParse`] if it is not valid configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), mode = ?config.mode, "configuration loaded");
        Ok(config)
    }
}
