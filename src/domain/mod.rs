//! Domain objects for the pager.
//!
//! - [`MessageWindow`] - Sparse store of loaded messages and its bounds
//! - [`NavigationResolver`] - Jump-to-message planning and settlement

pub mod navigation;
pub mod window;

pub use navigation::{NavigationOutcome, NavigationPlan, NavigationResolver, ScrollInstruction};
pub use window::{MergeSummary, MessageWindow, WindowBounds, WindowSnapshot};
