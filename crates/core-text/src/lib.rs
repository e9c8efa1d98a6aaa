//! Text measurement and line editing primitives.
//!
//! Everything in this crate measures text in Unicode scalar values
//! (codepoints), never bytes: a multi-byte character occupies exactly one
//! unit. Grapheme clustering and East Asian width are deliberately not
//! modelled; every layout computation in the renderer flows through
//! [`codepoint_width`] so the unit stays consistent end to end.

pub mod line;
pub mod width;

pub use line::LineBuffer;
pub use width::{ELLIPSIS, center_column, codepoint_width, truncate_with_ellipsis};
