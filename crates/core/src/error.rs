use crate::admonitions::AdmonitionKind;
use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional file path
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Attach a file path to this location
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Start of an mdast position, if the node carried one
    pub fn from_position(position: Option<&markdown::unist::Position>) -> Option<Self> {
        position.map(|p| Self::new(p.start.line, p.start.column))
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors that can occur while processing a document.
#[derive(Debug, Error)]
pub enum DocmarkError {
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    MarkdownAdapter {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// Serializing processed output failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DocmarkError {
    /// Create a parse error with location
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::MarkdownAdapter {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }
}

/// Non-fatal warnings that don't prevent processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// An admonition opener with no closing `:::` in its sibling sequence.
    /// The paragraph is left as plain text.
    UnterminatedAdmonition {
        /// Kind named by the opener (before `caution` normalization)
        kind: AdmonitionKind,
        /// Where the opening paragraph starts, when positions are known
        location: Option<SourceLocation>,
    },
}

impl ParseWarning {
    /// Get the location of this warning, if known
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            ParseWarning::UnterminatedAdmonition { location, .. } => location.as_ref(),
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnterminatedAdmonition {
                kind,
                location: Some(location),
            } => write!(f, "{}: unterminated :::{} block", location, kind.as_str()),
            ParseWarning::UnterminatedAdmonition {
                kind,
                location: None,
            } => write!(f, "unterminated :::{} block", kind.as_str()),
        }
    }
}

/// Collection of non-fatal diagnostics gathered while processing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<ParseWarning>,
}

impl ParseDiagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: ParseWarning) {
        self.warnings.push(warning);
    }

    /// Append every warning from another collection
    pub fn extend(&mut self, other: ParseDiagnostics) {
        self.warnings.extend(other.warnings);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get total count of all diagnostics
    pub fn count(&self) -> usize {
        self.warnings.len()
    }
}
