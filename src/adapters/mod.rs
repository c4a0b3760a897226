//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`SyntheticSource`] - Deterministic generator with artificial latency
//! - [`TracingPresentation`] - Presentation that logs instead of drawing
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockMessageSource`] - Recorded, holdable, failable fetches
//! - [`mock::RecordingPresentation`] - Captures render and scroll callbacks

pub mod mock;
pub mod synthetic;
pub mod tracing_presentation;

pub use mock::{MockMessageSource, RecordingPresentation};
pub use synthetic::SyntheticSource;
pub use tracing_presentation::TracingPresentation;
