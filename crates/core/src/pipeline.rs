//! One-call document processing: parse, rewrite admonitions, build the ToC.

use crate::error::{DocmarkError, ParseDiagnostics};
use crate::headings::{HeadingOptions, HeadingRecord, extract_headings_with};
use crate::parse::{ParseOptions, parse_mdast};
use crate::tree::Document;
use serde::{Deserialize, Serialize};

/// Settings for [`process_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessOptions {
    /// Markdown parser settings.
    pub parse: ParseOptions,
    /// Which headings go into the table of contents.
    pub headings: HeadingOptions,
    /// Run the admonition rewriter on the parsed tree.
    pub rewrite_admonitions: bool,
    /// Extract headings from the raw source.
    pub extract_headings: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            headings: HeadingOptions::default(),
            rewrite_admonitions: true,
            extract_headings: true,
        }
    }
}

/// Everything produced for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDocument {
    /// Parsed (and possibly rewritten) tree.
    pub document: Document,
    /// Table-of-contents entries in source order.
    pub headings: Vec<HeadingRecord>,
    /// Number of callouts produced.
    pub callouts: usize,
    /// Non-fatal findings such as unterminated admonitions.
    pub diagnostics: ParseDiagnostics,
}

/// Parses `source`, rewrites its admonitions and extracts its headings.
///
/// The two steps are independent: headings come from the raw text, callouts
/// from the parsed tree.
pub fn process_document(
    source: &str,
    options: &ProcessOptions,
) -> Result<ProcessedDocument, DocmarkError> {
    let mut document = Document::from_mdast(parse_mdast(source, &options.parse)?);

    let mut diagnostics = ParseDiagnostics::new();
    let mut callouts = 0;
    if options.rewrite_admonitions {
        let report = document.rewrite_admonitions();
        callouts = report.callouts;
        diagnostics.extend(report.diagnostics);
    }

    let headings = if options.extract_headings {
        extract_headings_with(source, &options.headings)
    } else {
        Vec::new()
    };

    log::debug!(
        "processed document: {} blocks, {} callouts, {} headings, {} warnings",
        document.children.len(),
        callouts,
        headings.len(),
        diagnostics.count()
    );

    Ok(ProcessedDocument {
        document,
        headings,
        callouts,
        diagnostics,
    })
}
