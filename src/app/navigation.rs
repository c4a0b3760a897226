//! Jump-to-message navigation for the Pager.

use tracing::{debug, info, warn};

use super::{Pager, PagerEvent, SignalOutcome};
use crate::domain::{NavigationPlan, ScrollInstruction};
use crate::models::LoadPurpose;

impl Pager {
    /// Bring `target_id` into view, loading the surrounding range first when
    /// it is not in the window.
    pub fn jump_to(&mut self, target_id: i64) -> SignalOutcome {
        match self.resolver.plan(target_id, &self.window) {
            NavigationPlan::Direct(instruction) => {
                self.supersede_pending_jump(target_id);
                info!(target_id, position = instruction.position, "Jump target loaded, scrolling");
                self.scroll_to(instruction);
                SignalOutcome::Scrolled(instruction)
            }
            NavigationPlan::Load { target_id, range } => {
                info!(target_id, range = %range, "Jump target missing, loading");
                self.resolver.begin(target_id, range);
                self.submit(range, LoadPurpose::Jump { target_id })
            }
            NavigationPlan::Unreachable { target_id } => {
                self.supersede_pending_jump(target_id);
                warn!(target_id, floor = self.config.jump_floor, "Jump target below floor");
                self.emit(PagerEvent::NavigationMiss {
                    target_id,
                    range: None,
                });
                SignalOutcome::Unreachable { target_id }
            }
        }
    }

    /// The newest jump wins: an older target still waiting on its load must
    /// not scroll when that load lands.
    fn supersede_pending_jump(&mut self, target_id: i64) {
        if let Some(older) = self.resolver.clear_pending() {
            debug!(older, newer = target_id, "Pending jump replaced");
        }
    }

    pub(super) fn scroll_to(&mut self, instruction: ScrollInstruction) {
        self.presentation.on_scroll_instruction(&instruction);
        self.emit(PagerEvent::ScrollTo(instruction));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapters::mock::{MockMessageSource, RecordingPresentation};
    use crate::config::PagerConfig;
    use crate::coordinator::RequestStatus;
    use crate::models::LoadRange;

    fn pager(source: &MockMessageSource, presentation: &RecordingPresentation) -> Pager {
        Pager::new(
            PagerConfig::default().with_fetch_latency_ms(0),
            Arc::new(source.clone()),
            Box::new(presentation.clone()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_direct_scroll_without_fetch() {
        let source = MockMessageSource::new();
        let presentation = RecordingPresentation::new();
        let mut pager = pager(&source, &presentation);
        pager.start().unwrap();
        pager.drain().await;

        let outcome = pager.jump_to(5);
        assert_eq!(
            outcome,
            SignalOutcome::Scrolled(ScrollInstruction {
                target_id: 5,
                position: 4,
            })
        );
        assert_eq!(source.request_count(), 1);
        assert_eq!(presentation.scroll_targets(), vec![5]);
    }

    #[tokio::test]
    async fn test_newer_jump_wins() {
        let source = MockMessageSource::new();
        source.hold();
        let presentation = RecordingPresentation::new();
        let mut pager = pager(&source, &presentation);

        pager.jump_to(500);
        pager.jump_to(2000);
        assert_eq!(pager.resolver().pending_target(), Some(2000));

        source.open();
        pager.drain().await;

        assert_eq!(presentation.scroll_targets(), vec![2000]);
        assert!(pager.window().contains(500));
        assert!(pager.window().contains(2000));
    }

    #[tokio::test]
    async fn test_unreachable_target_emits_miss() {
        let source = MockMessageSource::new();
        let presentation = RecordingPresentation::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut pager = pager(&source, &presentation).with_event_sender(tx);

        assert_eq!(
            pager.jump_to(-50),
            SignalOutcome::Unreachable { target_id: -50 }
        );
        assert_eq!(source.request_count(), 0);
        assert!(matches!(
            rx.try_recv(),
            Ok(PagerEvent::NavigationMiss {
                target_id: -50,
                range: None
            })
        ));
    }

    #[tokio::test]
    async fn test_jump_while_loading_queues() {
        let source = MockMessageSource::new();
        source.hold();
        let presentation = RecordingPresentation::new();
        let mut pager = pager(&source, &presentation);

        pager.start().unwrap();
        let outcome = pager.jump_to(1000);
        assert_eq!(
            outcome,
            SignalOutcome::Requested {
                range: LoadRange::new(990, 1010).unwrap(),
                status: RequestStatus::Queued { displaced: None },
            }
        );
        pager.cancel_loads();
    }
}
