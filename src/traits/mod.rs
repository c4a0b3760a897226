//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`MessageSource`] - Produces message ranges (synthetic, real backend, mock)
//! - [`Presentation`] - Receives render and scroll notifications

pub mod presentation;
pub mod source;

pub use presentation::Presentation;
pub use source::MessageSource;
