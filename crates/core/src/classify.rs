//! Structural classification of document nodes.

use std::collections::HashSet;
use std::ops::Range;

use crate::types::Node;

/// Semantic role of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// `h1`..`h6`, carrying the level.
    Heading(u8),
    Paragraph,
    UnorderedList,
    OrderedList,
    Table,
    Code,
    /// Whitespace, inline fragments, and anything unrecognized.
    Ignorable,
}

impl Role {
    /// Heading level, if this is a heading.
    pub fn heading_level(self) -> Option<u8> {
        match self {
            Role::Heading(level) => Some(level),
            _ => None,
        }
    }

    /// Whether this role is a list of either kind.
    pub fn is_list(self) -> bool {
        matches!(self, Role::UnorderedList | Role::OrderedList)
    }

    /// Whether elements of this role take part in slide segmentation.
    pub fn is_block(self) -> bool {
        self != Role::Ignorable
    }
}

/// Classify a node by its tag. Never fails; unknown kinds are ignorable.
pub fn classify(node: &Node) -> Role {
    let Some(tag) = node.tag() else {
        return Role::Ignorable;
    };
    match tag {
        "h1" => Role::Heading(1),
        "h2" => Role::Heading(2),
        "h3" => Role::Heading(3),
        "h4" => Role::Heading(4),
        "h5" => Role::Heading(5),
        "h6" => Role::Heading(6),
        "p" => Role::Paragraph,
        "ul" => Role::UnorderedList,
        "ol" => Role::OrderedList,
        "table" => Role::Table,
        "pre" | "code" => Role::Code,
        _ => Role::Ignorable,
    }
}

/// A classified node together with its position in a flattened tree.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    /// The underlying node.
    pub node: &'a Node,

    /// Its classified role.
    pub role: Role,

    /// Nesting depth; top-level nodes are at depth 0.
    pub depth: usize,

    /// One past the index of the last descendant in the flattened list.
    end: usize,
}

/// Pre-order flattening of a node forest into classified elements.
///
/// The list is immutable; consumption is tracked separately in
/// [`Consumed`] so that a node taken by one slide group is never rendered
/// again through one of its ancestors or descendants.
#[derive(Debug, Clone, Default)]
pub struct ElementList<'a> {
    elements: Vec<Element<'a>>,
}

impl<'a> ElementList<'a> {
    /// Flatten and classify every node of the forest.
    pub fn new(nodes: &'a [Node]) -> Self {
        let mut list = Self::default();
        for node in nodes {
            list.push(node, 0);
        }
        list
    }

    fn push(&mut self, node: &'a Node, depth: usize) {
        let index = self.elements.len();
        self.elements.push(Element {
            node,
            role: classify(node),
            depth,
            end: index + 1,
        });
        for child in node.children() {
            self.push(child, depth + 1);
        }
        self.elements[index].end = self.elements.len();
    }

    /// Number of flattened elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the forest was empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element at a flattened index.
    pub fn get(&self, index: usize) -> Option<&Element<'a>> {
        self.elements.get(index)
    }

    /// Iterate `(index, element)` in document order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Element<'a>)> {
        self.elements.iter().enumerate()
    }

    /// Flattened index range covering an element and its descendants.
    pub fn subtree(&self, index: usize) -> Range<usize> {
        match self.elements.get(index) {
            Some(element) => index..element.end,
            None => index..index,
        }
    }

    /// Index of the first element with the given role that is not consumed.
    pub fn first_unconsumed(&self, role: Role, consumed: &Consumed) -> Option<usize> {
        self.iter()
            .find(|(index, element)| element.role == role && !consumed.contains(*index))
            .map(|(index, _)| index)
    }

    /// Top-level nodes that have not been consumed, in order, with consumed
    /// descendants removed.
    pub fn remaining_top_level(&self, consumed: &Consumed) -> Vec<Node> {
        self.iter()
            .filter(|(index, element)| element.depth == 0 && !consumed.contains(*index))
            .map(|(index, _)| self.pruned(index, consumed))
            .collect()
    }

    fn pruned(&self, index: usize, consumed: &Consumed) -> Node {
        let element = &self.elements[index];
        let Node::Element { tag, .. } = element.node else {
            return element.node.clone();
        };
        let mut children = Vec::new();
        let mut child = index + 1;
        while child < element.end {
            if !consumed.contains(child) {
                children.push(self.pruned(child, consumed));
            }
            child = self.elements[child].end;
        }
        Node::element(tag.clone(), children)
    }
}

/// Set of flattened indices already assigned to a slide.
#[derive(Debug, Clone, Default)]
pub struct Consumed {
    indices: HashSet<usize>,
}

impl Consumed {
    /// Mark an element and its whole subtree as consumed.
    pub fn consume(&mut self, list: &ElementList<'_>, index: usize) {
        self.indices.extend(list.subtree(index));
    }

    /// Whether an index has been consumed.
    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: &str, children: Vec<Node>) -> Node {
        Node::element(tag, children)
    }

    #[test]
    fn test_classify_roles() {
        assert_eq!(classify(&el("h1", vec![])), Role::Heading(1));
        assert_eq!(classify(&el("h6", vec![])), Role::Heading(6));
        assert_eq!(classify(&el("p", vec![])), Role::Paragraph);
        assert_eq!(classify(&el("ul", vec![])), Role::UnorderedList);
        assert_eq!(classify(&el("ol", vec![])), Role::OrderedList);
        assert_eq!(classify(&el("table", vec![])), Role::Table);
        assert_eq!(classify(&el("pre", vec![])), Role::Code);
        assert_eq!(classify(&el("code", vec![])), Role::Code);
        assert_eq!(classify(&el("blockquote", vec![])), Role::Ignorable);
        assert_eq!(classify(&Node::text("  ")), Role::Ignorable);
        assert_eq!(classify(&Node::text("words")), Role::Ignorable);
    }

    #[test]
    fn test_flatten_preorder_with_depth() {
        let nodes = vec![
            el("ul", vec![el("li", vec![Node::text("a")])]),
            el("p", vec![]),
        ];
        let list = ElementList::new(&nodes);
        let roles: Vec<_> = list.iter().map(|(_, e)| (e.role, e.depth)).collect();
        assert_eq!(
            roles,
            vec![
                (Role::UnorderedList, 0),
                (Role::Ignorable, 1),
                (Role::Ignorable, 2),
                (Role::Paragraph, 0),
            ]
        );
        assert_eq!(list.subtree(0), 0..3);
        assert_eq!(list.subtree(3), 3..4);
    }

    #[test]
    fn test_consumed_covers_subtree() {
        let nodes = vec![
            el("pre", vec![el("code", vec![Node::text("x")])]),
            el("h1", vec![Node::text("T")]),
        ];
        let list = ElementList::new(&nodes);
        let mut consumed = Consumed::default();
        consumed.consume(&list, 0);
        assert!(consumed.contains(1));
        assert_eq!(list.first_unconsumed(Role::Code, &consumed), None);
        assert_eq!(list.first_unconsumed(Role::Heading(1), &consumed), Some(3));

        consumed.consume(&list, 3);
        assert!(list.remaining_top_level(&consumed).is_empty());
    }

    #[test]
    fn test_remaining_top_level_prunes_consumed_descendants() {
        let quote = Node::element(
            "blockquote",
            vec![
                Node::element("h1", vec![Node::text("Quoted")]),
                Node::element("p", vec![Node::text("kept")]),
            ],
        );
        let nodes = vec![quote];
        let list = ElementList::new(&nodes);
        let mut consumed = Consumed::default();
        consumed.consume(&list, 1);

        let remaining = list.remaining_top_level(&consumed);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].text_content(), "kept");
        assert_eq!(remaining[0].children().len(), 1);
        assert!(remaining[0].children()[0].is("p"));
    }
}
