//! Presentation that reports through `tracing`.
//!
//! Used by the headless demo binary in place of a real list view.

use crate::domain::{ScrollInstruction, WindowBounds, WindowSnapshot};
use crate::traits::Presentation;

/// Logs every window change and scroll instruction.
#[derive(Debug, Default)]
pub struct TracingPresentation {
    renders: u64,
    scrolls: u64,
}

impl TracingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of redraws requested so far.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn scrolls(&self) -> u64 {
        self.scrolls
    }
}

impl Presentation for TracingPresentation {
    fn on_window_changed(&mut self, snapshot: &WindowSnapshot) {
        self.renders += 1;
        match snapshot.bounds {
            WindowBounds::Loaded { min, max } => tracing::info!(
                items = snapshot.item_count,
                min,
                max,
                revision = snapshot.revision,
                "Window changed, redraw"
            ),
            WindowBounds::Empty => {
                tracing::info!(revision = snapshot.revision, "Window empty, redraw")
            }
        }
    }

    fn on_scroll_instruction(&mut self, instruction: &ScrollInstruction) {
        self.scrolls += 1;
        tracing::info!(
            target_id = instruction.target_id,
            position = instruction.position,
            "Scroll to message"
        );
    }
}
