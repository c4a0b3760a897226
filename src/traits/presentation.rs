//! Presentation boundary.
//!
//! The pager never renders anything itself. It tells the host that the
//! window changed and where to scroll; the host does the drawing and the
//! animated positioning.

use crate::domain::{ScrollInstruction, WindowSnapshot};

/// Receiver for render and scroll notifications.
///
/// Both callbacks run on the coordinating context and must not block.
pub trait Presentation: Send {
    /// Called after every merge into the window.
    fn on_window_changed(&mut self, snapshot: &WindowSnapshot);

    /// Called when navigation resolved to a loaded message.
    fn on_scroll_instruction(&mut self, instruction: &ScrollInstruction);
}
