//! Domain types for the parsed document tree and the slide plan built from it.

use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;

/// A node of the HTML-shaped document tree produced from Markdown.
///
/// Tag names follow HTML (`p`, `h2`, `ul`, `li`, `pre`, `table`, ...), so the
/// rest of the pipeline can reason about structure the same way it would over
/// rendered HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with a tag name and ordered children.
    Element { tag: String, children: Vec<Node> },
    /// A run of character data.
    Text(String),
}

impl Node {
    /// Create an element node.
    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element {
            tag: tag.into(),
            children,
        }
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Tag name for elements, `None` for text.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element { tag, .. } => Some(tag),
            Node::Text(_) => None,
        }
    }

    /// Whether this is an element with the given tag.
    pub fn is(&self, tag: &str) -> bool {
        self.tag() == Some(tag)
    }

    /// Direct children (empty for text).
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element { children, .. } => children,
            Node::Text(_) => &[],
        }
    }

    /// Whether this is a text node containing only whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.trim().is_empty())
    }

    /// Concatenated text of this node and all its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// First descendant (pre-order, excluding `self`) with the given tag.
    pub fn find(&self, tag: &str) -> Option<&Node> {
        for child in self.children() {
            if child.is(tag) {
                return Some(child);
            }
            if let Some(found) = child.find(tag) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants (pre-order, excluding `self`) with the given tag.
    pub fn find_all<'a>(&'a self, tag: &str, out: &mut Vec<&'a Node>) {
        for child in self.children() {
            if child.is(tag) {
                out.push(child);
            }
            child.find_all(tag, out);
        }
    }

    /// Whether any descendant (or `self`) has the given tag.
    pub fn contains(&self, tag: &str) -> bool {
        self.is(tag) || self.find(tag).is_some()
    }
}

/// How a document is cut into slides. Chosen once per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentMode {
    /// Explicit `---` separator lines delimit slides.
    Separators,
    /// Level-1 and level-2 headings start new slides.
    Headings,
}

/// What happens to content that appears before the first heading in
/// heading-driven mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreamblePolicy {
    /// Discard it.
    #[default]
    Drop,
    /// Render it into the body of the title slide.
    TitleSlide,
}

/// A heading that titles a slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level, 1 through 6.
    pub level: u8,

    /// Heading text.
    pub text: String,
}

/// Content destined for one output slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideGroup {
    /// Heading that titles the slide, if any.
    pub heading: Option<Heading>,

    /// Body nodes in document order.
    pub body: Vec<Node>,
}

impl SlideGroup {
    /// Create a group titled by the given heading.
    pub fn with_heading(level: u8, text: impl Into<String>) -> Self {
        Self {
            heading: Some(Heading {
                level,
                text: text.into(),
            }),
            body: Vec::new(),
        }
    }

    /// Slide title text; empty when the group has no heading.
    pub fn title(&self) -> &str {
        self.heading.as_ref().map(|h| h.text.as_str()).unwrap_or("")
    }

    /// Heading level, if the group has a heading.
    pub fn heading_level(&self) -> Option<u8> {
        self.heading.as_ref().map(|h| h.level)
    }

    /// Whether any body node is or contains a table.
    pub fn has_table(&self) -> bool {
        self.body.iter().any(|n| n.contains("table"))
    }
}

/// The opening slide of the deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleSlide {
    /// Deck title.
    pub title: String,

    /// Subtitle (an `h2` or the metadata byline).
    pub subtitle: Option<String>,

    /// Remaining content rendered into the title slide body.
    pub body: Vec<Node>,
}

/// Everything the slide builder needs to produce a deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckPlan {
    /// Segmentation mode the plan was built with.
    pub mode: SegmentMode,

    /// Document metadata.
    pub metadata: Metadata,

    /// The title slide.
    pub title_slide: TitleSlide,

    /// One group per following slide, in order.
    pub groups: Vec<SlideGroup>,
}

impl DeckPlan {
    /// Total number of slides the plan produces.
    pub fn slide_count(&self) -> usize {
        1 + self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::element(
            "div",
            vec![
                Node::element("h2", vec![Node::text("Intro")]),
                Node::element(
                    "p",
                    vec![
                        Node::text("Hello "),
                        Node::element("strong", vec![Node::text("world")]),
                    ],
                ),
                Node::element("table", vec![]),
            ],
        )
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let node = sample();
        assert_eq!(node.children()[1].text_content(), "Hello world");
        assert_eq!(node.text_content(), "IntroHello world");
    }

    #[test]
    fn test_find_is_preorder() {
        let node = sample();
        assert_eq!(node.find("strong").map(Node::text_content), Some("world".to_string()));
        assert!(node.find("h1").is_none());
        assert!(node.contains("table"));
    }

    #[test]
    fn test_blank_text() {
        assert!(Node::text(" \n\t").is_blank_text());
        assert!(!Node::text(" x ").is_blank_text());
        assert!(!Node::element("p", vec![]).is_blank_text());
    }

    #[test]
    fn test_group_title_and_table() {
        let mut group = SlideGroup::with_heading(2, "Results");
        assert_eq!(group.title(), "Results");
        assert!(!group.has_table());
        group.body.push(Node::element("table", vec![]));
        assert!(group.has_table());
        assert_eq!(SlideGroup::default().title(), "");
    }
}
