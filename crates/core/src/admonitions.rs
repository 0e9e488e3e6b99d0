//! Admonition rewriting.
//!
//! Converts paragraph runs like
//!
//! ```text
//! :::tip Quick Tip
//! Do the thing
//! :::
//! ```
//!
//! into a single [`Callout`] node. Detection runs over each sibling sequence
//! first and the recorded spans are spliced afterwards, last span first, so
//! earlier indices stay valid while later ones are replaced.

use crate::error::{ParseDiagnostics, ParseWarning, SourceLocation};
use crate::tree::{Callout, Document, Inline, Node, Paragraph};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static OPENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^:::(tip|warning|info|danger|note|caution)(?:\s+(.*))?")
        .expect("valid admonition opener regex")
});

const CLOSER: &str = ":::";

/// Admonition kinds recognized after `:::`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmonitionKind {
    /// `:::tip`
    Tip,
    /// `:::warning`
    Warning,
    /// `:::info`
    Info,
    /// `:::danger`
    Danger,
    /// `:::note`
    Note,
    /// `:::caution`, rendered as a warning.
    Caution,
}

impl AdmonitionKind {
    /// Every recognized kind, in matching order.
    pub const ALL: [AdmonitionKind; 6] = [
        AdmonitionKind::Tip,
        AdmonitionKind::Warning,
        AdmonitionKind::Info,
        AdmonitionKind::Danger,
        AdmonitionKind::Note,
        AdmonitionKind::Caution,
    ];

    /// Parses a kind name, ignoring ASCII case.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }

    /// Lowercase marker name.
    pub fn as_str(self) -> &'static str {
        match self {
            AdmonitionKind::Tip => "tip",
            AdmonitionKind::Warning => "warning",
            AdmonitionKind::Info => "info",
            AdmonitionKind::Danger => "danger",
            AdmonitionKind::Note => "note",
            AdmonitionKind::Caution => "caution",
        }
    }

    /// Kind used on the emitted callout.
    pub fn canonical(self) -> Self {
        match self {
            AdmonitionKind::Caution => AdmonitionKind::Warning,
            other => other,
        }
    }
}

impl std::fmt::Display for AdmonitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed opener line such as `:::warning Mind the gap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmonitionOpening {
    /// Kind as written (not yet normalized).
    pub kind: AdmonitionKind,
    /// Trimmed same-line title; `None` when absent or blank.
    pub title: Option<String>,
}

/// Parses a single opener line.
///
/// The marker must start the line. Anything may follow the kind name, but a
/// title is only taken from text separated from it by whitespace, so
/// `:::tip: Hi` and `:::note{.x}` open untitled blocks.
pub fn parse_opening(line: &str) -> Option<AdmonitionOpening> {
    let captures = OPENER.captures(line.trim_end_matches('\r'))?;
    let kind = AdmonitionKind::parse(&captures[1])?;
    let title = captures
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|title| !title.is_empty())
        .map(str::to_string);
    Some(AdmonitionOpening { kind, title })
}

/// Removes the closing `:::` from a text value.
///
/// Accepts a trailing `:::` (optionally on its own final line, optionally
/// followed by trailing whitespace) or a line consisting only of `:::`.
/// Returns `None` when the text holds no closer.
pub fn strip_closing_marker(text: &str) -> Option<String> {
    let body = text.trim_end();
    if let Some(rest) = body.strip_suffix(CLOSER) {
        let rest = rest
            .strip_suffix('\n')
            .map(|r| r.strip_suffix('\r').unwrap_or(r))
            .unwrap_or(rest);
        return Some(rest.to_string());
    }

    let mut lines: Vec<&str> = text.lines().collect();
    let closer = lines.iter().position(|line| line.trim() == CLOSER)?;
    lines.remove(closer);
    Some(lines.join("\n"))
}

/// Outcome of one rewrite pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Number of callouts produced.
    pub callouts: usize,
    /// Openers left as text because no closer followed.
    pub diagnostics: ParseDiagnostics,
}

/// A detected span inside one sibling sequence. `start..=end` covers the
/// opening paragraph through the closing one.
#[derive(Debug)]
struct AdmonitionMatch {
    start: usize,
    end: usize,
    kind: AdmonitionKind,
    title: Option<String>,
}

/// Rewrites every terminated admonition in `children` and in nested
/// containers. Unterminated openers stay as plain paragraphs.
pub fn rewrite_admonitions(children: &mut Vec<Node>) -> RewriteReport {
    let mut report = RewriteReport::default();
    rewrite_sequence(children, &mut report);
    log::debug!(
        "rewrote {} admonitions ({} unterminated)",
        report.callouts,
        report.diagnostics.count()
    );
    report
}

impl Document {
    /// Rewrites admonitions across the whole document.
    pub fn rewrite_admonitions(&mut self) -> RewriteReport {
        rewrite_admonitions(&mut self.children)
    }
}

fn rewrite_sequence(children: &mut Vec<Node>, report: &mut RewriteReport) {
    let matches = detect(children, &mut report.diagnostics);

    for child in children.iter_mut() {
        match child {
            Node::Container(container) => rewrite_sequence(&mut container.children, report),
            Node::Callout(callout) => rewrite_sequence(&mut callout.children, report),
            Node::Paragraph(_) | Node::Block(_) => {}
        }
    }

    for found in matches.into_iter().rev() {
        let span: Vec<Node> = children.drain(found.start..=found.end).collect();
        let callout = Callout {
            kind: found.kind.canonical(),
            title: found.title,
            children: callout_content(span),
        };
        children.insert(found.start, Node::Callout(callout));
        report.callouts += 1;
    }
}

fn detect(children: &[Node], diagnostics: &mut ParseDiagnostics) -> Vec<AdmonitionMatch> {
    let mut matches = Vec::new();
    let mut index = 0;

    while index < children.len() {
        let Some(paragraph) = children[index].as_paragraph() else {
            index += 1;
            continue;
        };
        let Some(opening) = paragraph
            .leading_text()
            .and_then(|text| parse_opening(first_line(text)))
        else {
            index += 1;
            continue;
        };

        let end = if contains_closer(paragraph) {
            Some(index)
        } else {
            children[index + 1..]
                .iter()
                .position(|node| node.as_paragraph().is_some_and(contains_closer))
                .map(|offset| index + 1 + offset)
        };

        match end {
            Some(end) => {
                log::trace!(
                    ":::{} spans siblings {}..={}",
                    opening.kind,
                    index,
                    end
                );
                matches.push(AdmonitionMatch {
                    start: index,
                    end,
                    kind: opening.kind,
                    title: opening.title,
                });
                // Paragraphs inside a matched span are content, not openers.
                index = end + 1;
            }
            None => {
                let location = SourceLocation::from_position(paragraph.position.as_ref());
                log::warn!(
                    "unterminated :::{} block left as text{}",
                    opening.kind,
                    location
                        .as_ref()
                        .map(|l| format!(" at {}", l))
                        .unwrap_or_default()
                );
                diagnostics.add_warning(ParseWarning::UnterminatedAdmonition {
                    kind: opening.kind,
                    location,
                });
                index += 1;
            }
        }
    }

    matches
}

fn first_line(text: &str) -> &str {
    text.split_once('\n').map_or(text, |(line, _)| line)
}

fn after_first_line(text: &str) -> &str {
    text.split_once('\n').map_or("", |(_, rest)| rest)
}

/// Whether any text child holds a closer, either as a line of its own or at
/// the very end of the text (`:::note Heads up :::` closes itself).
fn contains_closer(paragraph: &Paragraph) -> bool {
    paragraph
        .children
        .iter()
        .filter_map(Inline::as_text)
        .any(|text| strip_closing_marker(text).is_some())
}

fn callout_content(span: Vec<Node>) -> Vec<Node> {
    let last = span.len().saturating_sub(1);
    span.into_iter()
        .enumerate()
        .filter_map(|(i, node)| {
            let (opening, closing) = (i == 0, i == last);
            match node {
                Node::Paragraph(paragraph) if opening || closing => {
                    strip_markers(paragraph, opening, closing).map(Node::Paragraph)
                }
                other => Some(other),
            }
        })
        .collect()
}

/// Drops the opener line and/or the closer from a paragraph's text children.
/// Text children emptied by stripping are removed and edited ones drop their
/// source span; everything else is kept in order. Returns `None` when nothing
/// is left.
fn strip_markers(paragraph: Paragraph, opening: bool, closing: bool) -> Option<Paragraph> {
    let mut needs_close = closing;
    let children: Vec<Inline> = paragraph
        .children
        .into_iter()
        .enumerate()
        .filter_map(|(i, child)| {
            let (mut value, position) = match child {
                Inline::Text { value, position } => (value, position),
                other => return Some(other),
            };
            let mut touched = false;
            if opening && i == 0 {
                value = after_first_line(&value).to_string();
                touched = true;
            }
            if needs_close && let Some(stripped) = strip_closing_marker(&value) {
                value = stripped;
                needs_close = false;
                touched = true;
            }

            match (touched, value.trim().is_empty()) {
                (true, true) => None,
                (true, false) => Some(Inline::text(value)),
                (false, _) => Some(Inline::Text { value, position }),
            }
        })
        .collect();

    (!children.is_empty()).then(|| Paragraph {
        children,
        position: paragraph.position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Container;
    use markdown::mdast;
    use markdown::unist::Position;

    fn p(text: &str) -> Node {
        Node::paragraph(vec![Inline::text(text)])
    }

    fn strong(value: &str) -> Inline {
        Inline::Other(mdast::Node::Strong(mdast::Strong {
            children: vec![mdast::Node::Text(mdast::Text {
                value: value.to_string(),
                position: None,
            })],
            position: None,
        }))
    }

    fn code(value: &str) -> Node {
        Node::Block(mdast::Node::Code(mdast::Code {
            value: value.to_string(),
            position: None,
            lang: None,
            meta: None,
        }))
    }

    fn list(items: &[&str]) -> Node {
        Node::Container(Container {
            node: mdast::Node::List(mdast::List {
                children: Vec::new(),
                position: None,
                ordered: false,
                start: None,
                spread: false,
            }),
            children: items.iter().map(|item| p(item)).collect(),
        })
    }

    fn callout(kind: AdmonitionKind, title: Option<&str>, children: Vec<Node>) -> Node {
        Node::Callout(Callout {
            kind,
            title: title.map(str::to_string),
            children,
        })
    }

    fn rewrite(mut nodes: Vec<Node>) -> (Vec<Node>, RewriteReport) {
        let report = rewrite_admonitions(&mut nodes);
        (nodes, report)
    }

    #[test]
    fn parse_opening_with_title() {
        assert_eq!(
            parse_opening(":::tip Quick Tip"),
            Some(AdmonitionOpening {
                kind: AdmonitionKind::Tip,
                title: Some("Quick Tip".to_string()),
            })
        );
    }

    #[test]
    fn parse_opening_is_case_insensitive() {
        let opening = parse_opening(":::WARNING Careful").unwrap();
        assert_eq!(opening.kind, AdmonitionKind::Warning);
        assert_eq!(opening.title.as_deref(), Some("Careful"));
    }

    #[test]
    fn blank_title_is_none() {
        assert_eq!(parse_opening(":::note   ").unwrap().title, None);
        assert_eq!(parse_opening(":::note\r").unwrap().title, None);
    }

    #[test]
    fn rejects_unknown_kinds_and_misplaced_markers() {
        assert!(parse_opening(":::unknown").is_none());
        assert!(parse_opening("::tip").is_none());
        assert!(parse_opening(" :::tip").is_none());
        assert!(parse_opening("See :::tip").is_none());
    }

    #[test]
    fn suffix_after_kind_opens_an_untitled_block() {
        let untitled = |kind| AdmonitionOpening { kind, title: None };
        assert_eq!(parse_opening(":::tip: Hi"), Some(untitled(AdmonitionKind::Tip)));
        assert_eq!(parse_opening(":::tipster"), Some(untitled(AdmonitionKind::Tip)));
        assert_eq!(
            parse_opening(":::note{.x}"),
            Some(untitled(AdmonitionKind::Note))
        );
    }

    #[test]
    fn glued_suffix_opener_is_rewritten() {
        let (nodes, report) = rewrite(vec![p(":::tip: Hi\nbody\n:::")]);
        assert_eq!(
            nodes,
            vec![callout(AdmonitionKind::Tip, None, vec![p("body")])]
        );
        assert_eq!(report.callouts, 1);
    }

    #[test]
    fn closing_marker_variants() {
        assert_eq!(strip_closing_marker(":::").as_deref(), Some(""));
        assert_eq!(strip_closing_marker("Body\n:::").as_deref(), Some("Body"));
        assert_eq!(strip_closing_marker("Body\r\n:::\n").as_deref(), Some("Body"));
        assert_eq!(strip_closing_marker("Body:::").as_deref(), Some("Body"));
        assert_eq!(strip_closing_marker("A\n:::\nB").as_deref(), Some("A\nB"));
        assert_eq!(strip_closing_marker("a ::: b"), None);
        assert_eq!(strip_closing_marker("no marker"), None);
    }

    #[test]
    fn caution_maps_to_warning() {
        assert_eq!(AdmonitionKind::Caution.canonical(), AdmonitionKind::Warning);
        assert_eq!(AdmonitionKind::Note.canonical(), AdmonitionKind::Note);

        let (nodes, _) = rewrite(vec![p(":::caution\nHot surface\n:::")]);
        assert_eq!(
            nodes,
            vec![callout(AdmonitionKind::Warning, None, vec![p("Hot surface")])]
        );
    }

    #[test]
    fn self_contained_block() {
        let (nodes, report) = rewrite(vec![p(":::tip Quick Tip\nDo the thing\n:::")]);
        assert_eq!(
            nodes,
            vec![callout(
                AdmonitionKind::Tip,
                Some("Quick Tip"),
                vec![p("Do the thing")]
            )]
        );
        assert_eq!(report.callouts, 1);
        assert!(!report.diagnostics.has_warnings());
    }

    #[test]
    fn self_contained_keeps_inline_children_in_order() {
        let (nodes, _) = rewrite(vec![Node::paragraph(vec![
            Inline::text(":::info Heads up\nUse "),
            strong("this"),
            Inline::text(" wisely\n:::"),
        ])]);
        assert_eq!(
            nodes,
            vec![callout(
                AdmonitionKind::Info,
                Some("Heads up"),
                vec![Node::paragraph(vec![
                    Inline::text("Use "),
                    strong("this"),
                    Inline::text(" wisely"),
                ])]
            )]
        );
    }

    #[test]
    fn whitespace_between_inlines_survives() {
        let (nodes, _) = rewrite(vec![Node::paragraph(vec![
            Inline::text(":::note\n"),
            strong("a"),
            Inline::text(" "),
            strong("b"),
            Inline::text("\n:::"),
        ])]);
        assert_eq!(
            nodes,
            vec![callout(
                AdmonitionKind::Note,
                None,
                vec![Node::paragraph(vec![strong("a"), Inline::text(" "), strong("b")])]
            )]
        );
    }

    #[test]
    fn opener_that_closes_itself_leaves_siblings_alone() {
        let (nodes, report) = rewrite(vec![
            p(":::note Heads up :::"),
            p("Body"),
            p("tail\n:::"),
        ]);
        assert_eq!(
            nodes,
            vec![
                callout(AdmonitionKind::Note, Some("Heads up :::"), vec![]),
                p("Body"),
                p("tail\n:::"),
            ]
        );
        assert_eq!(report.callouts, 1);
        assert!(!report.diagnostics.has_warnings());
    }

    #[test]
    fn untouched_text_keeps_its_position() {
        let span = Position::new(2, 1, 9, 2, 6, 14);
        let (nodes, _) = rewrite(vec![Node::paragraph(vec![
            Inline::text(":::tip\nSee "),
            strong("this"),
            Inline::Text {
                value: " here".to_string(),
                position: Some(span.clone()),
            },
            Inline::text("\n:::"),
        ])]);
        let callout = nodes[0].as_callout().unwrap();
        let paragraph = callout.children[0].as_paragraph().unwrap();
        assert_eq!(
            paragraph.children,
            vec![
                Inline::text("See "),
                strong("this"),
                Inline::Text {
                    value: " here".to_string(),
                    position: Some(span),
                },
            ]
        );
    }

    #[test]
    fn empty_callout_is_valid() {
        let (nodes, report) = rewrite(vec![p(":::note\n:::")]);
        assert_eq!(nodes, vec![callout(AdmonitionKind::Note, None, vec![])]);
        assert_eq!(report.callouts, 1);
    }

    #[test]
    fn multi_paragraph_block_with_list() {
        let (nodes, _) = rewrite(vec![
            p(":::warning Careful\nRead this first"),
            list(&["one", "two"]),
            p(":::"),
        ]);
        assert_eq!(
            nodes,
            vec![callout(
                AdmonitionKind::Warning,
                Some("Careful"),
                vec![p("Read this first"), list(&["one", "two"])]
            )]
        );
    }

    #[test]
    fn multi_paragraph_keeps_closing_content() {
        let (nodes, _) = rewrite(vec![
            p(":::danger"),
            p("Middle"),
            code("rm -rf /"),
            p("Last words\n:::"),
        ]);
        assert_eq!(
            nodes,
            vec![callout(
                AdmonitionKind::Danger,
                None,
                vec![p("Middle"), code("rm -rf /"), p("Last words")]
            )]
        );
    }

    #[test]
    fn closing_paragraph_inline_children_pass_through() {
        let (nodes, _) = rewrite(vec![
            p(":::tip"),
            Node::paragraph(vec![strong("Done"), Inline::text("\n:::")]),
        ]);
        assert_eq!(
            nodes,
            vec![callout(
                AdmonitionKind::Tip,
                None,
                vec![Node::paragraph(vec![strong("Done")])]
            )]
        );
    }

    #[test]
    fn unterminated_block_is_left_alone() {
        let input = vec![p(":::info\nNo end in sight"), code("x"), p("Still open")];
        let (nodes, report) = rewrite(input.clone());
        assert_eq!(nodes, input);
        assert_eq!(report.callouts, 0);
        assert_eq!(
            report.diagnostics.warnings,
            vec![ParseWarning::UnterminatedAdmonition {
                kind: AdmonitionKind::Info,
                location: None,
            }]
        );
    }

    #[test]
    fn non_admonition_paragraphs_pass_through() {
        let input = vec![
            p("Regular text\n:::"),
            p("Use the ::: operator"),
            p(":::unknown\nbody\n:::"),
            p("Intro\n:::tip\nnot an opener\n:::"),
            Node::paragraph(vec![strong(":::tip"), Inline::text("\n:::")]),
        ];
        let (nodes, report) = rewrite(input.clone());
        assert_eq!(nodes, input);
        assert_eq!(report, RewriteReport::default());
    }

    #[test]
    fn empty_paragraph_is_skipped() {
        let input = vec![Node::paragraph(vec![]), p(":::")];
        let (nodes, _) = rewrite(input.clone());
        assert_eq!(nodes, input);
    }

    #[test]
    fn multiple_blocks_preserve_surrounding_order() {
        let (nodes, report) = rewrite(vec![
            p("intro"),
            p(":::tip\nA\n:::"),
            code("between"),
            p(":::note"),
            p("B"),
            p(":::"),
            p("outro"),
        ]);
        assert_eq!(
            nodes,
            vec![
                p("intro"),
                callout(AdmonitionKind::Tip, None, vec![p("A")]),
                code("between"),
                callout(AdmonitionKind::Note, None, vec![p("B")]),
                p("outro"),
            ]
        );
        assert_eq!(report.callouts, 2);
    }

    #[test]
    fn closer_is_searched_only_among_siblings() {
        let input = vec![
            p(":::tip"),
            Node::Container(Container {
                node: mdast::Node::Blockquote(mdast::Blockquote {
                    children: Vec::new(),
                    position: None,
                }),
                children: vec![p(":::")],
            }),
        ];
        let (nodes, report) = rewrite(input.clone());
        assert_eq!(nodes, input);
        assert_eq!(report.diagnostics.count(), 1);
    }

    #[test]
    fn nested_containers_are_rewritten() {
        let quote = |children| {
            Node::Container(Container {
                node: mdast::Node::Blockquote(mdast::Blockquote {
                    children: Vec::new(),
                    position: None,
                }),
                children,
            })
        };
        let (nodes, report) = rewrite(vec![quote(vec![p(":::note\nQuoted\n:::")])]);
        assert_eq!(
            nodes,
            vec![quote(vec![callout(
                AdmonitionKind::Note,
                None,
                vec![p("Quoted")]
            )])]
        );
        assert_eq!(report.callouts, 1);
    }

    #[test]
    fn openers_inside_a_span_are_content() {
        let (nodes, report) = rewrite(vec![p(":::note"), p(":::tip Inner"), p(":::")]);
        assert_eq!(
            nodes,
            vec![callout(AdmonitionKind::Note, None, vec![p(":::tip Inner")])]
        );
        assert_eq!(report.callouts, 1);
    }

    #[test]
    fn rewriting_twice_changes_nothing() {
        let (once, _) = rewrite(vec![p(":::tip T\nA\n:::"), p(":::note"), p("B\n:::")]);
        let (twice, report) = rewrite(once.clone());
        assert_eq!(once, twice);
        assert_eq!(report.callouts, 0);
    }

    #[test]
    fn document_entry_point() {
        let mut document = Document::new(vec![p(":::danger Stop\nNow\n:::")]);
        let report = document.rewrite_admonitions();
        assert_eq!(report.callouts, 1);
        let callout = document.children[0].as_callout().unwrap();
        assert_eq!(callout.kind, AdmonitionKind::Danger);
        assert_eq!(callout.title.as_deref(), Some("Stop"));
    }
}
