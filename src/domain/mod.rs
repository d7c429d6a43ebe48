//! Domain layer: actions and errors.
//!
//! These types are independent of how a container stores or publishes state.
//!
//! # Organization
//!
//! - [`action`]: Actions, action envelopes and positional argument encoding
//! - [`error`]: Error types and result aliases

pub mod action;
pub mod error;
mod finite;

pub use action::{to_args, Action, ActionEnvelope, SET_ACTION_TYPE};
pub use error::{BoxError, ContainerError, Result};
