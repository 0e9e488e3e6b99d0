//! Fenced code block tracking for line-oriented scanners.
//!
//! The heading extractor works on raw source text, so a `## comment` inside a
//! shell snippet looks like a heading. `FenceTracker` follows CommonMark's
//! fence rules closely enough to tell those lines apart.

/// Marker and width of the fence currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFence {
    /// Fence character (`` ` `` or `~`).
    pub marker: char,
    /// Number of marker characters in the opening run.
    pub length: usize,
}

/// Line-by-line fence state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FenceTracker {
    open: Option<OpenFence>,
}

impl FenceTracker {
    /// Creates a tracker positioned outside any fence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fence currently open, if any.
    pub fn open_fence(&self) -> Option<OpenFence> {
        self.open
    }

    /// Feeds one line and reports whether it is part of a code fence.
    ///
    /// Opening and closing marker lines count as fenced.
    pub fn observe(&mut self, line: &str) -> bool {
        let (columns, offset) = leading_whitespace(line);
        let rest = &line[offset..];

        match self.open {
            None => {
                // 4+ columns is an indented code block, never a fence opener.
                if columns <= 3
                    && let Some((marker, length)) = fence_run(rest)
                {
                    if marker == '`' && rest[length..].contains('`') {
                        return false;
                    }
                    self.open = Some(OpenFence { marker, length });
                    return true;
                }
                false
            }
            Some(open) => {
                if columns <= 3
                    && let Some((marker, length)) = fence_run(rest)
                    && marker == open.marker
                    && length >= open.length
                    && rest[length..].trim().is_empty()
                {
                    self.open = None;
                }
                true
            }
        }
    }
}

/// Returns `(visual_columns, byte_offset)` of the leading indentation.
/// Tabs advance to the next multiple of four.
fn leading_whitespace(line: &str) -> (usize, usize) {
    let mut columns = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => columns += 1,
            b'\t' => columns += 4 - (columns % 4),
            _ => break,
        }
        bytes += 1;
    }
    (columns, bytes)
}

fn fence_run(text: &str) -> Option<(char, usize)> {
    let first = text.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let length = text.chars().take_while(|c| *c == first).count();
    (length >= 3).then_some((first, length))
}
