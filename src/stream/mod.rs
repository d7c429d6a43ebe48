//! Push-based state delivery.
//!
//! - [`broadcast`]: single-value cell with ordered listeners and removal handles
//! - [`state_stream`]: `futures` [`Stream`](futures_util::stream::Stream) view of a cell
//!
//! Neither replays the value current at subscribe time.

pub mod broadcast;
pub mod state_stream;

pub use broadcast::{Broadcast, Subscription};
pub use state_stream::{BroadcastStream, StateStream};
