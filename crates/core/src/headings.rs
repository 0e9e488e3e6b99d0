//! Table-of-contents heading extraction from raw source text.

use crate::code_fence::FenceTracker;
use crate::slug::Slugger;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DEFAULT_HEADING: Lazy<Regex> =
    Lazy::new(|| heading_pattern(2, 4).expect("valid heading regex"));

/// Multi-line ATX pattern for one level range. The separator is `\s+`, so a
/// bare `##` line takes the next line as its text.
fn heading_pattern(min_level: u8, max_level: u8) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?m)^(#{{{},{}}})\s+(.+)$", min_level, max_level))
}

/// A heading found in the source, ready for a table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRecord {
    /// Anchor id, unique within one extraction.
    pub id: String,
    /// Heading text with surrounding whitespace trimmed.
    pub text: String,
    /// Number of leading `#` characters.
    pub level: u8,
}

/// Which headings to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeadingOptions {
    /// Shallowest level collected (inclusive).
    pub min_level: u8,
    /// Deepest level collected (inclusive).
    pub max_level: u8,
    /// Ignore heading-like lines inside fenced code blocks.
    pub skip_code_fences: bool,
}

impl Default for HeadingOptions {
    fn default() -> Self {
        Self {
            min_level: 2,
            max_level: 4,
            skip_code_fences: false,
        }
    }
}

/// Extracts `##`, `###` and `####` headings from raw source, in order.
///
/// # Examples
///
/// ```
/// use docmark_core::headings::extract_headings;
///
/// let toc = extract_headings("## Setup\n## Setup\n### Notes");
/// let ids: Vec<_> = toc.iter().map(|h| h.id.as_str()).collect();
/// assert_eq!(ids, ["setup", "setup-1", "notes"]);
/// ```
pub fn extract_headings(source: &str) -> Vec<HeadingRecord> {
    extract_headings_with(source, &HeadingOptions::default())
}

/// Extracts headings using explicit options.
///
/// A `min_level` of zero or above `max_level` collects nothing.
pub fn extract_headings_with(source: &str, options: &HeadingOptions) -> Vec<HeadingRecord> {
    let custom;
    let pattern = match (options.min_level, options.max_level) {
        (2, 4) => &*DEFAULT_HEADING,
        (min, max) if min == 0 || min > max => {
            log::warn!("empty heading level range {}..={}", min, max);
            return Vec::new();
        }
        (min, max) => match heading_pattern(min, max) {
            Ok(regex) => {
                custom = regex;
                &custom
            }
            Err(err) => {
                log::warn!("heading level range {}..={} rejected: {}", min, max, err);
                return Vec::new();
            }
        },
    };

    let fenced = options.skip_code_fences.then(|| fenced_lines(source));
    let mut slugger = Slugger::new();
    let mut headings = Vec::new();
    let (mut line, mut scanned) = (0, 0);

    for captures in pattern.captures_iter(source) {
        let start = captures.get_match().start();
        line += source[scanned..start].matches('\n').count();
        scanned = start;
        if fenced
            .as_ref()
            .is_some_and(|fenced| fenced.get(line).copied().unwrap_or(false))
        {
            log::trace!("skipping fenced heading on line {}", line + 1);
            continue;
        }

        let level = captures[1].len() as u8;
        let text = captures[2].trim();
        headings.push(HeadingRecord {
            id: slugger.next_slug(text),
            text: text.to_string(),
            level,
        });
    }

    log::debug!("extracted {} headings", headings.len());
    headings
}

/// For each source line, whether it belongs to a fenced code block.
fn fenced_lines(source: &str) -> Vec<bool> {
    let mut fences = FenceTracker::new();
    source
        .split('\n')
        .map(|line| fences.observe(line.trim_end_matches('\r')))
        .collect()
}
