//! Recording presentation for testing.

use std::sync::{Arc, Mutex};

use crate::domain::{ScrollInstruction, WindowSnapshot};
use crate::traits::Presentation;

/// A presentation callback as it was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationCall {
    WindowChanged(WindowSnapshot),
    Scroll(ScrollInstruction),
}

/// Presentation that records every callback.
///
/// Clones share the recording, so a test can hand one clone to the pager
/// and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresentation {
    calls: Arc<Mutex<Vec<PresentationCall>>>,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// All callbacks in arrival order.
    pub fn calls(&self) -> Vec<PresentationCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Targets of every scroll instruction.
    pub fn scroll_targets(&self) -> Vec<i64> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                PresentationCall::Scroll(instruction) => Some(instruction.target_id),
                _ => None,
            })
            .collect()
    }

    /// Every window snapshot received.
    pub fn window_changes(&self) -> Vec<WindowSnapshot> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                PresentationCall::WindowChanged(snapshot) => Some(*snapshot),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Presentation for RecordingPresentation {
    fn on_window_changed(&mut self, snapshot: &WindowSnapshot) {
        self.calls
            .lock()
            .unwrap()
            .push(PresentationCall::WindowChanged(*snapshot));
    }

    fn on_scroll_instruction(&mut self, instruction: &ScrollInstruction) {
        self.calls
            .lock()
            .unwrap()
            .push(PresentationCall::Scroll(*instruction));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WindowBounds;

    #[test]
    fn test_clones_share_recording() {
        let recorder = RecordingPresentation::new();
        let mut handle = recorder.clone();

        handle.on_window_changed(&WindowSnapshot {
            item_count: 3,
            bounds: WindowBounds::Loaded { min: 1, max: 3 },
            revision: 1,
        });
        handle.on_scroll_instruction(&ScrollInstruction {
            target_id: 2,
            position: 1,
        });

        assert_eq!(recorder.calls().len(), 2);
        assert_eq!(recorder.scroll_targets(), vec![2]);
        assert_eq!(recorder.window_changes()[0].item_count, 3);

        recorder.clear();
        assert!(recorder.calls().is_empty());
    }
}
