//! The state container and its parts.
//!
//! # Modules
//!
//! - [`builder`]: Construction and the single finalize step
//! - [`freeze`]: Freeze guards applied to every accepted state
//! - [`reducer`]: Reducer trait and the default transition reducer
//! - [`registry`]: Named pure transitions and selectors
//! - [`store`]: The container: get, set, dispatch, subscribe
//!
//! # Example
//!
//! ```rust
//! use state_containers::{Container, PureTransitions};
//!
//! let container = Container::builder(0_i64)
//!     .transitions(PureTransitions::new().with("add", |n: &i64, (by,): (i64,)| n + by))
//!     .build()?;
//!
//! let subscription = container.subscribe(|state| println!("now {state}"));
//! container.transitions().call("add", (2,))?;
//! subscription.unsubscribe();
//! # Ok::<(), state_containers::ContainerError>(())
//! ```

pub mod builder;
pub mod freeze;
pub mod reducer;
pub mod registry;
pub mod store;

pub use builder::ContainerBuilder;
pub use freeze::{DeepFreeze, Freeze, FreezeFn, Identity};
pub use reducer::{reducer_fn, FnReducer, Reducer, TransitionReducer};
pub use registry::{PureSelectors, PureTransitions, Selectors, Transitions};
pub use store::Container;
