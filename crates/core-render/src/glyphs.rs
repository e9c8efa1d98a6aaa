//! Progress glyphs and countdown text.

use core_state::Task;
use std::time::Duration;

/// Tokens used to draw task progress and the selection marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphSet {
    pub filled: String,
    pub unfilled: String,
    pub selection_marker: String,
}

impl Default for GlyphSet {
    fn default() -> Self {
        Self {
            filled: "⬢".to_string(),
            unfilled: "⬡".to_string(),
            selection_marker: "› ".to_string(),
        }
    }
}

impl GlyphSet {
    /// One `"<filled> "` token per completed unit, then one `"<unfilled> "`
    /// token per unit still planned. Over-completion yields no unfilled tokens.
    pub fn progress(&self, task: &Task) -> String {
        let filled = task.completed as usize;
        let unfilled = task.remaining() as usize;
        let mut out = String::with_capacity(
            filled * (self.filled.len() + 1) + unfilled * (self.unfilled.len() + 1),
        );
        for _ in 0..filled {
            out.push_str(&self.filled);
            out.push(' ');
        }
        for _ in 0..unfilled {
            out.push_str(&self.unfilled);
            out.push(' ');
        }
        out
    }
}

/// Compact countdown text: `1h2m3s`, `14m59s`, `59s`, `0s`.
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.as_secs();
    let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}
