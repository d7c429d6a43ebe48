//! Actions and their positional arguments.
//!
//! An [`Action`] names the transition to apply and carries the positional
//! arguments forwarded to it. Arguments travel as `serde_json::Value`s so that
//! every transition, whatever its argument types, fits one action shape; they are
//! decoded into the transition's typed argument tuple by the reducer.
//!
//! The reserved [`Action::Set`] bypasses named transitions and installs a whole
//! state value.

use crate::domain::error::{ContainerError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Action type reported by [`Action::Set`].
pub const SET_ACTION_TYPE: &str = "@@SET";

/// A request to change the container state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<S> {
    /// Replaces the whole state. Generated by `Container::set`.
    Set(S),

    /// Applies the pure transition registered under `name`.
    Transition {
        /// Registered transition name.
        name: String,
        /// Positional arguments, in order.
        args: Vec<Value>,
    },
}

impl<S> Action<S> {
    /// Creates a named transition action from already-encoded arguments.
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self::Transition {
            name: name.into(),
            args,
        }
    }

    /// Creates a named transition action, encoding `args` positionally.
    ///
    /// See [`to_args`] for how values are spread.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::ArgsEncoding`] if `args` cannot be serialized.
    pub fn with_args<A: Serialize>(name: impl Into<String>, args: A) -> Result<Self> {
        Ok(Self::new(name, to_args(args)?))
    }

    /// Creates the reserved set action.
    pub const fn set(state: S) -> Self {
        Self::Set(state)
    }

    /// Returns the action type: the transition name, or [`SET_ACTION_TYPE`].
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Set(_) => SET_ACTION_TYPE,
            Self::Transition { name, .. } => name,
        }
    }

    /// Returns the positional arguments. Empty for the set action.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        match self {
            Self::Set(_) => &[],
            Self::Transition { args, .. } => args,
        }
    }

    /// Returns `true` for the reserved set action.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }
}

/// Serialized form of an action: `{"type": "...", "args": [...]}`.
///
/// Hosts that receive actions as JSON (message buses, devtools, the bundled
/// binary) decode them into this envelope and convert with
/// [`ActionEnvelope::into_action`].
///
/// # Example
///
/// ```
/// use state_containers::{Action, ActionEnvelope};
///
/// let envelope: ActionEnvelope = serde_json::from_str(r#"{"type":"increment","args":[5]}"#)?;
/// let action: Action<i64> = envelope.into_action()?;
/// assert_eq!(action.kind(), "increment");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    /// Action type.
    #[serde(rename = "type")]
    pub kind: String,

    /// Positional arguments. Missing means none.
    #[serde(default)]
    pub args: Vec<Value>,
}

impl ActionEnvelope {
    /// Converts the envelope into an action.
    ///
    /// An envelope typed [`SET_ACTION_TYPE`] decodes `args[0]` as the new state.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::InvalidArgs`] if a set envelope has no argument
    /// or its argument is not a valid `S`.
    pub fn into_action<S: DeserializeOwned>(self) -> Result<Action<S>> {
        if self.kind != SET_ACTION_TYPE {
            return Ok(Action::new(self.kind, self.args));
        }

        let state = self.args.into_iter().next().unwrap_or(Value::Null);
        serde_json::from_value(state)
            .map(Action::Set)
            .map_err(|source| ContainerError::InvalidArgs {
                name: SET_ACTION_TYPE.to_string(),
                source,
            })
    }
}

/// Encodes a value as positional arguments.
///
/// Tuples and sequences are spread (`(5, "a")` becomes `[5, "a"]`), `()` becomes
/// no arguments, and any other value becomes a single argument. To pass one
/// sequence as a single argument, wrap it in a 1-tuple: `(vec![1, 2],)`.
///
/// # Parameters
///
/// * `args` - Argument tuple, single value or `()`
///
/// # Returns
///
/// The positional arguments in order.
///
/// # Errors
///
/// Returns [`ContainerError::ArgsEncoding`] if `args` cannot be serialized,
/// including when it contains a NaN or infinite float, which JSON cannot
/// represent.
pub fn to_args<A: Serialize>(args: A) -> Result<Vec<Value>> {
    super::finite::check(&args).map_err(ContainerError::ArgsEncoding)?;
    match serde_json::to_value(args).map_err(ContainerError::ArgsEncoding)? {
        Value::Array(values) => Ok(values),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

/// Decodes positional arguments into a typed argument tuple.
///
/// The arguments are decoded as a sequence, so tuple arity is checked exactly.
/// An empty argument list also decodes into `()`.
pub(crate) fn decode_args<A: DeserializeOwned>(name: &str, args: &[Value]) -> Result<A> {
    serde_json::from_value(Value::Array(args.to_vec())).or_else(|source| {
        if args.is_empty() {
            serde_json::from_value(Value::Null).map_err(|_| ContainerError::InvalidArgs {
                name: name.to_string(),
                source,
            })
        } else {
            Err(ContainerError::InvalidArgs {
                name: name.to_string(),
                source,
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_action_reports_reserved_kind() {
        let action = Action::set(3_i64);
        assert_eq!(action.kind(), SET_ACTION_TYPE);
        assert!(action.is_set());
        assert!(action.args().is_empty());
    }

    #[test]
    fn to_args_spreads_tuples() {
        assert_eq!(to_args((5, "a")).unwrap(), vec![json!(5), json!("a")]);
        assert_eq!(to_args(()).unwrap(), Vec::<Value>::new());
        assert_eq!(to_args(7).unwrap(), vec![json!(7)]);
        assert_eq!(to_args((vec![1, 2],)).unwrap(), vec![json!([1, 2])]);
    }

    #[test]
    fn to_args_rejects_non_finite_floats() {
        let result = to_args((f64::INFINITY,));
        assert!(matches!(result, Err(ContainerError::ArgsEncoding(_))));
        assert_eq!(to_args((2.5_f64,)).unwrap(), vec![json!(2.5)]);
    }

    #[test]
    fn decode_args_checks_arity() {
        let ok: (i64,) = decode_args("inc", &[json!(5)]).unwrap();
        assert_eq!(ok, (5,));

        decode_args::<()>("reset", &[]).unwrap();

        let too_many = decode_args::<(i64,)>("inc", &[json!(1), json!(2)]);
        assert!(matches!(too_many, Err(ContainerError::InvalidArgs { .. })));

        let wrong_type = decode_args::<(i64,)>("inc", &[json!("x")]);
        assert!(matches!(wrong_type, Err(ContainerError::InvalidArgs { .. })));
    }

    #[test]
    fn envelope_decodes_set_state() {
        let envelope: ActionEnvelope =
            serde_json::from_value(json!({"type": "@@SET", "args": [42]})).unwrap();
        let action: Action<i64> = envelope.into_action().unwrap();
        assert_eq!(action, Action::Set(42));
    }

    #[test]
    fn envelope_without_args_is_named_action() {
        let envelope: ActionEnvelope = serde_json::from_value(json!({"type": "reset"})).unwrap();
        let action: Action<i64> = envelope.into_action().unwrap();
        assert_eq!(action, Action::new("reset", vec![]));
    }
}
