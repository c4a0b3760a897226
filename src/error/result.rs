//! Result type alias for pager operations.

use super::pager_error::PagerError;

/// Type alias for Results using PagerError.
///
/// # Example
///
/// ```
/// use chat_pager::error::PagerResult;
/// use chat_pager::models::LoadRange;
///
/// fn first_page() -> PagerResult<LoadRange> {
///     LoadRange::from_count(1, 20)
/// }
///
/// assert_eq!(first_page().unwrap().end(), 20);
/// ```
pub type PagerResult<T> = Result<T, PagerError>;
