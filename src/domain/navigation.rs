//! Jump-to-message resolution.
//!
//! [`NavigationResolver`] decides how to reach a target id: scroll straight
//! to it when it is loaded, otherwise load a bounded range around it and
//! scroll once the data lands. A target that is still missing after the load
//! is reported as a miss instead of an error.

use serde::Serialize;

use super::window::MessageWindow;
use crate::config::PagerConfig;
use crate::models::{LoadRange, PageBounds};

/// Instruction for the presentation layer to bring a message into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrollInstruction {
    pub target_id: i64,
    /// Ordinal position of the target among loaded ids
    pub position: usize,
}

/// First step of a jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPlan {
    /// Target already loaded; scroll now.
    Direct(ScrollInstruction),
    /// Target missing; load `range` first.
    Load { target_id: i64, range: LoadRange },
    /// No valid range around the target exists (it lies below the floor).
    Unreachable { target_id: i64 },
}

/// Final step of a jump that needed a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    Scrolled(ScrollInstruction),
    /// Loaded `range` but the target was not in it.
    Miss { target_id: i64, range: LoadRange },
}

/// Resolves jump requests against the window.
#[derive(Debug, Clone)]
pub struct NavigationResolver {
    /// Ids loaded on each side of the target
    radius: i64,
    /// Lowest id a jump range may start at
    floor: i64,
    /// Page granularity for [`PageBounds`]
    page_size: i64,
    /// Jump waiting on a load, if any
    pending: Option<(i64, LoadRange)>,
}

impl NavigationResolver {
    pub fn new(radius: i64, floor: i64, page_size: i64) -> Self {
        Self {
            radius: radius.max(0),
            floor,
            page_size: page_size.max(1),
            pending: None,
        }
    }

    pub fn from_config(config: &PagerConfig) -> Self {
        Self::new(config.jump_radius, config.jump_floor, config.page_size)
    }

    /// Decide how to reach `target_id`.
    pub fn plan(&self, target_id: i64, window: &MessageWindow) -> NavigationPlan {
        if let Some(position) = window.position_of(target_id) {
            return NavigationPlan::Direct(ScrollInstruction {
                target_id,
                position,
            });
        }

        match LoadRange::around(target_id, self.radius, self.floor) {
            Ok(range) => NavigationPlan::Load { target_id, range },
            Err(_) => NavigationPlan::Unreachable { target_id },
        }
    }

    /// Remember that `target_id` is waiting on `range`.
    pub fn begin(&mut self, target_id: i64, range: LoadRange) {
        self.pending = Some((target_id, range));
    }

    /// Target currently waiting on a load.
    pub fn pending_target(&self) -> Option<i64> {
        self.pending.map(|(target, _)| target)
    }

    /// Forget whatever jump is waiting, so its load will not scroll when it
    /// lands. Used when a newer jump resolves without a load.
    pub fn clear_pending(&mut self) -> Option<i64> {
        self.pending.take().map(|(target, _)| target)
    }

    /// Forget a pending jump whose load will never land.
    pub fn abandon(&mut self, target_id: i64) {
        if self.pending_target() == Some(target_id) {
            self.pending = None;
        }
    }

    /// Finish a jump after `range` has been merged into `window`.
    ///
    /// Scrolls only if the target is now present.
    pub fn settle(
        &mut self,
        target_id: i64,
        range: LoadRange,
        window: &MessageWindow,
    ) -> NavigationOutcome {
        self.abandon(target_id);

        match window.position_of(target_id) {
            Some(position) => NavigationOutcome::Scrolled(ScrollInstruction {
                target_id,
                position,
            }),
            None => NavigationOutcome::Miss { target_id, range },
        }
    }

    /// Page bounds to record after a jump load of `range`.
    pub fn page_bounds_for(&self, range: LoadRange) -> PageBounds {
        PageBounds::from_range(range, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LoadDirection, Message};

    fn window_with(ids: impl IntoIterator<Item = i64>) -> MessageWindow {
        let mut window = MessageWindow::new();
        window.merge(
            ids.into_iter().map(|id| Message::new(id, "x")),
            LoadDirection::Append,
        );
        window
    }

    fn resolver() -> NavigationResolver {
        NavigationResolver::new(10, 1, 20)
    }

    #[test]
    fn test_direct_plan_when_loaded() {
        let window = window_with(30..=50);
        let plan = resolver().plan(42, &window);
        assert_eq!(
            plan,
            NavigationPlan::Direct(ScrollInstruction {
                target_id: 42,
                position: 12
            })
        );
    }

    #[test]
    fn test_load_plan_when_missing() {
        let window = MessageWindow::new();
        match resolver().plan(1000, &window) {
            NavigationPlan::Load { target_id, range } => {
                assert_eq!(target_id, 1000);
                assert_eq!((range.start(), range.end()), (990, 1010));
            }
            other => panic!("expected load plan, got {:?}", other),
        }
    }

    #[test]
    fn test_load_plan_clamps_to_floor() {
        let window = MessageWindow::new();
        match resolver().plan(5, &window) {
            NavigationPlan::Load { range, .. } => {
                assert_eq!((range.start(), range.end()), (1, 15));
            }
            other => panic!("expected load plan, got {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_below_floor() {
        let window = MessageWindow::new();
        assert_eq!(
            resolver().plan(-30, &window),
            NavigationPlan::Unreachable { target_id: -30 }
        );
    }

    #[test]
    fn test_settle_scrolls_when_present() {
        let mut resolver = resolver();
        let range = LoadRange::new(990, 1010).unwrap();
        resolver.begin(1000, range);
        assert_eq!(resolver.pending_target(), Some(1000));

        let window = window_with(990..=1010);
        let outcome = resolver.settle(1000, range, &window);
        assert_eq!(
            outcome,
            NavigationOutcome::Scrolled(ScrollInstruction {
                target_id: 1000,
                position: 10
            })
        );
        assert_eq!(resolver.pending_target(), None);
    }

    #[test]
    fn test_settle_misses_when_absent() {
        let mut resolver = resolver();
        let range = LoadRange::new(990, 1010).unwrap();
        resolver.begin(1000, range);

        let window = window_with(990..=995);
        assert_eq!(
            resolver.settle(1000, range, &window),
            NavigationOutcome::Miss {
                target_id: 1000,
                range
            }
        );
        assert_eq!(resolver.pending_target(), None);
    }

    #[test]
    fn test_abandon_only_matching_target() {
        let mut resolver = resolver();
        resolver.begin(7, LoadRange::new(1, 17).unwrap());
        resolver.abandon(8);
        assert_eq!(resolver.pending_target(), Some(7));
        resolver.abandon(7);
        assert_eq!(resolver.pending_target(), None);
    }

    #[test]
    fn test_clear_pending_forgets_any_target() {
        let mut resolver = resolver();
        assert_eq!(resolver.clear_pending(), None);
        resolver.begin(1000, LoadRange::new(990, 1010).unwrap());
        assert_eq!(resolver.clear_pending(), Some(1000));
        assert_eq!(resolver.pending_target(), None);
    }

    #[test]
    fn test_page_bounds_for_jump() {
        let bounds = resolver().page_bounds_for(LoadRange::new(990, 1010).unwrap());
        assert_eq!(bounds, PageBounds::new(49, 50));
    }
}
