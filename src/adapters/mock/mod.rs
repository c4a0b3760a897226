//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockMessageSource`] - Message source with recorded and scripted fetches
//! - [`RecordingPresentation`] - Presentation that records callbacks

pub mod presentation;
pub mod source;

pub use presentation::{PresentationCall, RecordingPresentation};
pub use source::{MockFetch, MockMessageSource, RecordedFetch};
