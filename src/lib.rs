//! chat-pager - windowed message pagination for infinite-scroll chat lists
//!
//! The engine keeps a sparse window of loaded messages, fetches ranges on
//! demand with at most one fetch in flight, and resolves jump-to-message
//! requests against partially loaded data.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod models;
pub mod prelude;
pub mod traits;
