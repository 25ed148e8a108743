//! Markdown parsing into the HTML-shaped [`Node`] tree.
//!
//! Pipeline: Markdown string → comrak AST → owned `Node` forest. The forest
//! mirrors what an HTML renderer would emit (tight list items carry their text
//! directly, tables split into `thead`/`tbody`, code blocks are `pre > code`),
//! with soft line breaks kept as line breaks.

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena, Options};

use crate::types::Node;

/// Parse Markdown into a forest of top-level nodes.
pub fn parse(markdown: &str) -> Vec<Node> {
    let arena = Arena::new();
    let options = default_options();
    let root = parse_document(&arena, markdown, &options);

    let mut nodes = Vec::new();
    for child in root.children() {
        lower_node(child, false, &mut nodes);
    }
    nodes
}

fn default_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.table = true;
    options.render.hardbreaks = true;
    options
}

/// Lower one comrak node, appending the result to `out`.
///
/// `tight` is set while lowering the children of a tight list item, where
/// paragraphs are unwrapped into the item.
fn lower_node<'a>(node: &'a AstNode<'a>, tight: bool, out: &mut Vec<Node>) {
    let value = node.data.borrow().value.clone();
    match value {
        NodeValue::Paragraph if tight => {
            for child in node.children() {
                lower_node(child, false, out);
            }
        }
        NodeValue::Paragraph => out.push(element("p", node, false)),
        NodeValue::Heading(heading) => {
            let tag = format!("h{}", heading.level.clamp(1, 6));
            out.push(element(&tag, node, false));
        }
        NodeValue::List(list) => {
            let tag = match list.list_type {
                ListType::Bullet => "ul",
                ListType::Ordered => "ol",
            };
            out.push(element(tag, node, list.tight));
        }
        NodeValue::Item(_) | NodeValue::TaskItem(_) => {
            // `tight` here comes from the enclosing list.
            out.push(element("li", node, tight));
        }
        NodeValue::CodeBlock(block) => {
            let code = Node::element("code", vec![Node::text(block.literal.to_string())]);
            out.push(Node::element("pre", vec![code]));
        }
        NodeValue::Table(..) => out.push(lower_table(node)),
        NodeValue::BlockQuote => out.push(element("blockquote", node, false)),
        NodeValue::ThematicBreak => out.push(Node::element("hr", Vec::new())),
        NodeValue::Text(text) => out.push(Node::text(text.to_string())),
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push(Node::text("\n")),
        NodeValue::Code(code) => {
            out.push(Node::element("code", vec![Node::text(code.literal.to_string())]))
        }
        NodeValue::Emph => out.push(element("em", node, false)),
        NodeValue::Strong => out.push(element("strong", node, false)),
        NodeValue::Strikethrough => out.push(element("del", node, false)),
        NodeValue::Link(..) => out.push(element("a", node, false)),
        NodeValue::Image(..) => out.push(Node::element("img", Vec::new())),
        NodeValue::HtmlBlock(..) | NodeValue::HtmlInline(..) | NodeValue::FrontMatter(..) => {}
        _ if node.data.borrow().value.block() => out.push(element("div", node, false)),
        _ => out.push(element("span", node, false)),
    }
}

fn element<'a>(tag: &str, node: &'a AstNode<'a>, tight: bool) -> Node {
    let mut children = Vec::new();
    for child in node.children() {
        lower_node(child, tight, &mut children);
    }
    Node::element(tag, children)
}

/// comrak tables are flat rows; the first row is flagged as the header.
fn lower_table<'a>(node: &'a AstNode<'a>) -> Node {
    let mut head = Vec::new();
    let mut body = Vec::new();

    for row in node.children() {
        let is_header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
        let cell_tag = if is_header { "th" } else { "td" };
        let cells = row
            .children()
            .map(|cell| element(cell_tag, cell, false))
            .collect();
        let tr = Node::element("tr", cells);
        if is_header {
            head.push(tr);
        } else {
            body.push(tr);
        }
    }

    let mut children = Vec::new();
    if !head.is_empty() {
        children.push(Node::element("thead", head));
    }
    if !body.is_empty() {
        children.push(Node::element("tbody", body));
    }
    Node::element("table", children)
}
