//! Document tree seen by the admonition rewriter.
//!
//! The rewriter only needs to know whether a block is a paragraph and whether
//! an inline child is text. Everything else stays an opaque mdast node and
//! passes through untouched. Blocks that hold flow content (blockquotes,
//! lists, list items, ...) are kept as containers so their children form
//! their own sibling sequence.

use crate::admonitions::AdmonitionKind;
use markdown::mdast::{self, AttributeContent, AttributeValue, MdxJsxAttribute};
use markdown::unist::Position;

/// Name of the JSX component a callout becomes when lowered back to mdast.
pub const CALLOUT_COMPONENT: &str = "InfoBox";

/// Inline child of a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Plain text, possibly spanning several source lines.
    Text {
        /// The text itself.
        value: String,
        /// Source span; cleared once the value has been edited.
        position: Option<Position>,
    },
    /// Emphasis, links, code spans, JSX, ...
    Other(mdast::Node),
}

impl Inline {
    /// Creates a text child without position information.
    pub fn text(value: impl Into<String>) -> Self {
        Inline::Text {
            value: value.into(),
            position: None,
        }
    }

    /// Returns the text value for text children.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Inline::Text { value, .. } => Some(value),
            Inline::Other(_) => None,
        }
    }
}

/// A paragraph and its inline children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    /// Inline children in source order.
    pub children: Vec<Inline>,
    /// Source span, when the paragraph came from a parser.
    pub position: Option<Position>,
}

impl Paragraph {
    /// Creates a paragraph without position information.
    pub fn new(children: Vec<Inline>) -> Self {
        Self {
            children,
            position: None,
        }
    }

    /// Returns the first child when it is text.
    pub fn leading_text(&self) -> Option<&str> {
        self.children.first().and_then(Inline::as_text)
    }
}

/// A structured callout produced from a `:::kind ... :::` span.
#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    /// Canonical kind (`caution` is already mapped to `warning`).
    pub kind: AdmonitionKind,
    /// Title from the opener line, never blank.
    pub title: Option<String>,
    /// Content between the markers.
    pub children: Vec<Node>,
}

/// A block whose children are flow content.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    /// The original node with its children moved out.
    pub node: mdast::Node,
    /// Children as a nested sibling sequence.
    pub children: Vec<Node>,
}

/// Block-level node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A paragraph, the only block the rewriter inspects.
    Paragraph(Paragraph),
    /// Output of the rewriter.
    Callout(Callout),
    /// Opaque block holding flow children.
    Container(Container),
    /// Opaque leaf block (code, heading, table, ...).
    Block(mdast::Node),
}

impl Node {
    /// Shorthand for a position-less paragraph.
    pub fn paragraph(children: Vec<Inline>) -> Self {
        Node::Paragraph(Paragraph::new(children))
    }

    /// Returns the paragraph when this node is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Node::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        }
    }

    /// Returns the callout when this node is one.
    pub fn as_callout(&self) -> Option<&Callout> {
        match self {
            Node::Callout(callout) => Some(callout),
            _ => None,
        }
    }

    /// Converts one mdast block into the tree model.
    pub fn from_mdast(node: mdast::Node) -> Self {
        match node {
            mdast::Node::Paragraph(paragraph) => Node::Paragraph(Paragraph {
                children: paragraph.children.into_iter().map(inline_from_mdast).collect(),
                position: paragraph.position,
            }),
            mut other => {
                let Some(children) = flow_children_mut(&mut other).map(std::mem::take) else {
                    return Node::Block(other);
                };
                Node::Container(Container {
                    node: other,
                    children: children.into_iter().map(Node::from_mdast).collect(),
                })
            }
        }
    }

    /// Lowers this node back to mdast. Callouts become `<InfoBox>` JSX flow
    /// elements with `type` and optional `title` attributes.
    pub fn into_mdast(self) -> mdast::Node {
        match self {
            Node::Paragraph(paragraph) => mdast::Node::Paragraph(mdast::Paragraph {
                children: paragraph.children.into_iter().map(inline_into_mdast).collect(),
                position: paragraph.position,
            }),
            Node::Callout(callout) => {
                let mut attributes = vec![jsx_attribute("type", callout.kind.as_str())];
                if let Some(title) = callout.title {
                    attributes.push(jsx_attribute("title", &title));
                }
                mdast::Node::MdxJsxFlowElement(mdast::MdxJsxFlowElement {
                    children: callout.children.into_iter().map(Node::into_mdast).collect(),
                    position: None,
                    name: Some(CALLOUT_COMPONENT.to_string()),
                    attributes,
                })
            }
            Node::Container(Container { mut node, children }) => {
                if let Some(slot) = flow_children_mut(&mut node) {
                    *slot = children.into_iter().map(Node::into_mdast).collect();
                }
                node
            }
            Node::Block(node) => node,
        }
    }
}

/// A parsed document: the root's block children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Top-level blocks in source order.
    pub children: Vec<Node>,
    /// Source span of the root, when parsed.
    pub position: Option<Position>,
}

impl Document {
    /// Creates a document from blocks.
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            children,
            position: None,
        }
    }

    /// Converts an mdast tree. A non-root node becomes the single child.
    pub fn from_mdast(root: mdast::Node) -> Self {
        match root {
            mdast::Node::Root(root) => Self {
                children: root.children.into_iter().map(Node::from_mdast).collect(),
                position: root.position,
            },
            other => Self::new(vec![Node::from_mdast(other)]),
        }
    }

    /// Converts back to an mdast `Root`.
    pub fn into_mdast(self) -> mdast::Node {
        mdast::Node::Root(mdast::Root {
            children: self.children.into_iter().map(Node::into_mdast).collect(),
            position: self.position,
        })
    }
}

fn inline_from_mdast(node: mdast::Node) -> Inline {
    match node {
        mdast::Node::Text(text) => Inline::Text {
            value: text.value,
            position: text.position,
        },
        other => Inline::Other(other),
    }
}

fn inline_into_mdast(inline: Inline) -> mdast::Node {
    match inline {
        Inline::Text { value, position } => mdast::Node::Text(mdast::Text { value, position }),
        Inline::Other(node) => node,
    }
}

fn jsx_attribute(name: &str, value: &str) -> AttributeContent {
    AttributeContent::Property(MdxJsxAttribute {
        name: name.to_string(),
        value: Some(AttributeValue::Literal(value.to_string())),
    })
}

/// Children of blocks whose content is flow (block-level) nodes.
fn flow_children_mut(node: &mut mdast::Node) -> Option<&mut Vec<mdast::Node>> {
    match node {
        mdast::Node::Root(n) => Some(&mut n.children),
        mdast::Node::Blockquote(n) => Some(&mut n.children),
        mdast::Node::List(n) => Some(&mut n.children),
        mdast::Node::ListItem(n) => Some(&mut n.children),
        mdast::Node::FootnoteDefinition(n) => Some(&mut n.children),
        mdast::Node::MdxJsxFlowElement(n) => Some(&mut n.children),
        _ => None,
    }
}
