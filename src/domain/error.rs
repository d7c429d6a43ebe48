//! Error types for state container operations.
//!
//! This module defines the centralized error type [`ContainerError`] and a type alias
//! [`Result`] used throughout the crate. All errors are implemented using the
//! `thiserror` crate for automatic `Error` trait implementation.
//!
//! An unrecognised action type is not an error: the reducer treats it as a
//! no-op.

use thiserror::Error;

/// Boxed error returned by fallible pure transitions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for state container operations.
///
/// Construction errors (`DuplicateName`, `ReservedName`) surface from
/// [`ContainerBuilder::build`](crate::ContainerBuilder::build). Dispatch and
/// selector errors propagate synchronously to the caller; when one is returned
/// the container state is unchanged and no subscriber was notified.
///
/// # Examples
///
/// ```
/// use state_containers::ContainerError;
///
/// fn lookup(name: &str) -> Result<(), ContainerError> {
///     Err(ContainerError::UnknownTransition(name.to_string()))
/// }
///
/// assert!(lookup("missing").is_err());
/// ```
#[derive(Debug, Error)]
pub enum ContainerError {
    /// A fallible pure transition returned an error.
    #[error("transition '{name}' failed: {source}")]
    Transition {
        /// Registered name of the transition.
        name: String,
        /// Error returned by the transition.
        #[source]
        source: BoxError,
    },

    /// Positional arguments did not decode into the registered argument tuple.
    ///
    /// Covers both arity and type mismatches.
    #[error("invalid arguments for '{name}': {source}")]
    InvalidArgs {
        /// Transition or selector name.
        name: String,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },

    /// Caller-supplied arguments could not be encoded as positional values.
    ///
    /// NaN and infinite floats are reported here.
    #[error("failed to encode arguments: {0}")]
    ArgsEncoding(#[source] serde_json::Error),

    /// No transition is registered under this name.
    #[error("unknown transition '{0}'")]
    UnknownTransition(String),

    /// No selector is registered under this name.
    #[error("unknown selector '{0}'")]
    UnknownSelector(String),

    /// A selector result was requested as a type it does not produce.
    #[error("selector '{name}' does not produce {expected}")]
    SelectorOutput {
        /// Selector name.
        name: String,
        /// Requested output type.
        expected: &'static str,
    },

    /// Two transitions or two selectors were registered under the same name.
    #[error("duplicate {kind} '{name}'")]
    DuplicateName {
        /// `"transition"` or `"selector"`.
        kind: &'static str,
        /// Offending name.
        name: String,
    },

    /// A transition was registered under the reserved set-action type.
    #[error("'{0}' is reserved for the set action")]
    ReservedName(String),

    /// The held state changed after it was frozen.
    ///
    /// Only reported by the development freeze guard, which can observe changes
    /// made through interior mutability.
    #[error("frozen state was mutated outside the container")]
    StateMutated,

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed outside argument handling.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for state container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;
