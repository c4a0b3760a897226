//! Id ranges, load purposes and page bookkeeping.

use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{PagerError, PagerResult};

/// Inclusive range of message ids, `start <= end`.
///
/// Construction goes through [`LoadRange::new`] or [`LoadRange::from_count`],
/// so an inverted range can never reach the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LoadRange {
    start: i64,
    end: i64,
}

impl LoadRange {
    /// Create a range from inclusive bounds.
    pub fn new(start: i64, end: i64) -> PagerResult<Self> {
        if end < start {
            return Err(PagerError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create a range of `count` ids beginning at `start`.
    pub fn from_count(start: i64, count: i64) -> PagerResult<Self> {
        if count <= 0 {
            return Err(PagerError::InvalidCount { count });
        }
        let end = start
            .checked_add(count - 1)
            .ok_or(PagerError::InvalidRange {
                start,
                end: i64::MAX,
            })?;
        Self::new(start, end)
    }

    /// Range of `radius` ids on either side of `target`, with the lower
    /// bound clamped to `floor`.
    ///
    /// Fails with `InvalidRange` when the clamp pushes the start past the end,
    /// i.e. when no id around `target` can be at or above `floor`.
    pub fn around(target: i64, radius: i64, floor: i64) -> PagerResult<Self> {
        let start = target.saturating_sub(radius).max(floor);
        let end = target.saturating_add(radius);
        Self::new(start, end)
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    /// Number of ids covered, as the count argument of a fetch.
    pub fn count(&self) -> i64 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.start <= id && id <= self.end
    }

    pub fn overlaps(&self, other: &LoadRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Iterate the ids in the range.
    pub fn ids(&self) -> RangeInclusive<i64> {
        self.start..=self.end
    }
}

impl fmt::Display for LoadRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Side of the window a batch is merged into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadDirection {
    /// Older messages, above the current content
    Prepend,
    /// Newer messages, below the current content
    Append,
}

/// Why a range was requested. Carried through the loader so the completion
/// can be routed back to the right handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadPurpose {
    /// First page after startup
    Initial,
    /// Viewport approached the bottom edge
    Append,
    /// Viewport approached the top edge
    Prepend,
    /// Load around a jump target, then scroll to it
    Jump { target_id: i64 },
}

impl LoadPurpose {
    /// Merge direction for results of this purpose.
    pub fn direction(&self) -> LoadDirection {
        match self {
            LoadPurpose::Prepend => LoadDirection::Prepend,
            LoadPurpose::Initial | LoadPurpose::Append | LoadPurpose::Jump { .. } => {
                LoadDirection::Append
            }
        }
    }

    /// Jump target, if this load serves a navigation request.
    pub fn jump_target(&self) -> Option<i64> {
        match self {
            LoadPurpose::Jump { target_id } => Some(*target_id),
            _ => None,
        }
    }

    /// Short label for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadPurpose::Initial => "initial",
            LoadPurpose::Append => "append",
            LoadPurpose::Prepend => "prepend",
            LoadPurpose::Jump { .. } => "jump",
        }
    }
}

impl fmt::Display for LoadPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadPurpose::Jump { target_id } => write!(f, "jump({})", target_id),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Page-granularity record of the last settled range.
///
/// Advisory only: kept for display and debugging, never consulted when
/// deciding what to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageBounds {
    pub lower_page: i64,
    pub upper_page: i64,
}

impl PageBounds {
    pub fn new(lower_page: i64, upper_page: i64) -> Self {
        Self {
            lower_page,
            upper_page,
        }
    }

    /// Pages touched by `range`, floored at page zero.
    pub fn from_range(range: LoadRange, page_size: i64) -> Self {
        let page_size = page_size.max(1);
        Self {
            lower_page: (range.start() / page_size).max(0),
            upper_page: (range.end() / page_size).max(0),
        }
    }
}
