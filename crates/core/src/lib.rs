#![deny(missing_docs)]
//! docmark core: admonition rewriting, heading extraction, and markdown parsing.

/// Admonition (`:::kind ... :::`) rewriting.
pub mod admonitions;
/// Fenced code block tracking.
pub mod code_fence;
/// Core error and diagnostic types.
pub mod error;
/// Table-of-contents heading extraction.
pub mod headings;
/// Markdown parsing utilities and AST transforms.
pub mod parse;
/// Single-document processing entry point.
pub mod pipeline;
/// Slug generation utilities.
pub mod slug;
/// Document tree model.
pub mod tree;

pub use admonitions::{
    AdmonitionKind, AdmonitionOpening, RewriteReport, parse_opening, rewrite_admonitions,
    strip_closing_marker,
};
pub use code_fence::{FenceTracker, OpenFence};
pub use error::{DocmarkError, ParseDiagnostics, ParseWarning, SourceLocation};
pub use headings::{HeadingOptions, HeadingRecord, extract_headings, extract_headings_with};
pub use parse::{
    AdmonitionTransform, AstTransform, ParseOptions, ParserPipeline, parse_mdast,
    parse_mdast_with_options,
};
pub use pipeline::{ProcessOptions, ProcessedDocument, process_document};
pub use slug::{Slugger, slugify};
pub use tree::{CALLOUT_COMPONENT, Callout, Container, Document, Inline, Node, Paragraph};
