//! Prelude module for convenient imports.
//!
//! ```ignore
//! use chat_pager::prelude::*;
//! ```

// Engine
pub use crate::app::{Pager, PagerEvent, SignalOutcome, ViewportSignal};
pub use crate::config::PagerConfig;
pub use crate::coordinator::{LoadCoordinator, LoadTicket};

// Data
pub use crate::domain::{MessageWindow, NavigationResolver, ScrollInstruction, WindowSnapshot};
pub use crate::models::{LoadPurpose, LoadRange, Message, PageBounds};

// Errors
pub use crate::error::{FetchError, PagerError, PagerResult};

// Seams
pub use crate::adapters::SyntheticSource;
pub use crate::traits::{MessageSource, Presentation};
