//! Codepoint width accounting.
//!
//! Invariants:
//! - Width of a string is its codepoint count.
//! - [`truncate_with_ellipsis`] never returns more than `budget` codepoints and
//!   never splits a multi-byte character.
//! - When content is cut, the result ends with (a prefix of) [`ELLIPSIS`].

use std::borrow::Cow;

/// Marker appended to truncated content.
pub const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Number of terminal columns `text` occupies under codepoint counting.
#[inline]
pub fn codepoint_width(text: &str) -> usize {
    text.chars().count()
}

/// Fit `text` into `budget` columns.
///
/// Content that already fits is returned untouched. Longer content keeps its
/// first `budget - 3` codepoints followed by the ellipsis. Budgets narrower
/// than the ellipsis itself keep no content and show only as much of the
/// ellipsis as fits, so a zero budget yields an empty string.
pub fn truncate_with_ellipsis(text: &str, budget: usize) -> Cow<'_, str> {
    if codepoint_width(text) <= budget {
        return Cow::Borrowed(text);
    }
    let keep = budget.saturating_sub(ELLIPSIS_WIDTH);
    let mut out = String::with_capacity(text.len().min(budget * 4) + ELLIPSIS_WIDTH);
    out.extend(text.chars().take(keep));
    out.extend(ELLIPSIS.chars().take(budget - keep));
    Cow::Owned(out)
}

/// 1-based column at which content of `width` columns starts when centered in
/// a row of `total` columns. Content wider than the row starts at column 1.
#[inline]
pub fn center_column(total: usize, width: usize) -> usize {
    total.saturating_sub(width) / 2 + 1
}
