//! Tracing setup.
//!
//! Containers emit `tracing` spans and events on every dispatch. This module
//! installs the subscriber that receives them:
//!
//! ```text
//! tracing macros → EnvFilter → fmt layer (stderr)
//!                            └→ tracing-opentelemetry → JsonLinesExporter → file
//! ```
//!
//! The file path comes from [`Config::trace_file`](crate::Config::trace_file);
//! without it, events are printed to stderr.
//!
//! # Level Resolution
//!
//! 1. `RUST_LOG` environment variable
//! 2. [`Config::trace_level`](crate::Config::trace_level)
//! 3. Default: `"info"`
//!
//! # Usage
//!
//! ```rust
//! use state_containers::observability::init_tracing;
//! use state_containers::Config;
//!
//! init_tracing(&Config::default());
//! tracing::debug!("container host started");
//! ```

mod exporter;
mod init;

pub use exporter::{create_tracer_provider, JsonLinesExporter};
pub use init::init_tracing;
