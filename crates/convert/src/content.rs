//! Renders slide body nodes into a text frame.

use mdpptx_core::{classify, Node, Result, Role};
use mdpptx_pptx::{Font, TextFrame};

use crate::bullet::{BulletFormatter, ListKind};
use crate::options::{ConvertOptions, NumberingStyle};

/// Typeface for code blocks.
pub const CODE_FONT: &str = "Courier New";

/// Point size for code blocks.
pub const CODE_SIZE: f64 = 10.0;

/// Point size of a sub-heading line. `h1`/`h2` inside a body use the `h3` size.
pub fn heading_size(level: u8) -> f64 {
    match level {
        4 => 16.0,
        5 => 14.0,
        6 => 12.0,
        _ => 18.0,
    }
}

/// Writes paragraphs, headings, code, lists, and tables into text frames.
#[derive(Debug, Clone, Default)]
pub struct ContentRenderer {
    numbering: NumberingStyle,
    bullets: BulletFormatter,
}

impl ContentRenderer {
    pub fn new(options: &ConvertOptions) -> Self {
        Self {
            numbering: options.numbering,
            bullets: BulletFormatter::new(options.numbering),
        }
    }

    /// Replace the frame's content with `body`.
    pub fn render(&self, frame: &mut TextFrame, body: &[Node]) -> Result<()> {
        frame.clear();
        frame.set_word_wrap(true);
        for node in body {
            self.render_node(frame, node)?;
        }
        Ok(())
    }

    fn render_node(&self, frame: &mut TextFrame, node: &Node) -> Result<()> {
        match classify(node) {
            Role::Paragraph => {
                add_line(frame, node.text_content().trim(), None)?;
            }
            Role::Heading(level) => {
                let font = Font {
                    size: Some(heading_size(level)),
                    bold: Some(true),
                    ..Font::default()
                };
                add_line(frame, node.text_content().trim(), Some(font))?;
            }
            Role::Code => {
                let font = Font {
                    name: Some(CODE_FONT.to_string()),
                    size: Some(CODE_SIZE),
                    ..Font::default()
                };
                add_line(frame, node.text_content().trim(), Some(font))?;
            }
            Role::UnorderedList | Role::OrderedList => self.render_list(frame, node, 0)?,
            Role::Table => render_table(frame, node)?,
            // Containers such as block quotes are transparent.
            Role::Ignorable => {
                for child in node.children() {
                    self.render_node(frame, child)?;
                }
            }
        }
        Ok(())
    }

    /// Items depth-first, one paragraph each, nested lists one level deeper.
    fn render_list(&self, frame: &mut TextFrame, list: &Node, level: usize) -> Result<()> {
        let kind = if list.is("ol") {
            ListKind::Ordered
        } else {
            ListKind::Unordered
        };

        for (i, item) in list.children().iter().filter(|c| c.is("li")).enumerate() {
            let number = i + 1;
            let mut text = item_text(item);
            if kind == ListKind::Ordered && self.numbering == NumberingStyle::Prefix {
                text = format!("{}. {}", number, text);
            }

            let paragraph = frame.add_paragraph();
            paragraph.set_text(&text)?;
            paragraph.set_level(level);
            self.bullets.apply(paragraph, kind, number);

            for child in item.children().iter().filter(|c| is_list(c)) {
                self.render_list(frame, child, level + 1)?;
            }
        }
        Ok(())
    }
}

fn is_list(node: &Node) -> bool {
    node.is("ul") || node.is("ol")
}

/// Text of an item's own content, excluding nested lists.
fn item_text(item: &Node) -> String {
    item.children()
        .iter()
        .filter(|c| !is_list(c))
        .map(|c| c.text_content().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Header row, a dash rule of the same width, then body rows.
fn render_table(frame: &mut TextFrame, table: &Node) -> Result<()> {
    let mut headers = Vec::new();
    table.find_all("th", &mut headers);
    if !headers.is_empty() {
        let line = join_cells(headers);
        add_line(frame, &line, None)?;
        add_line(frame, &"-".repeat(line.chars().count()), None)?;
    }

    for section in table.children() {
        if section.is("thead") {
            continue;
        }
        let mut rows = Vec::new();
        if section.is("tr") {
            rows.push(section);
        } else {
            section.find_all("tr", &mut rows);
        }

        for row in rows {
            let cells: Vec<&Node> = row
                .children()
                .iter()
                .filter(|c| c.is("td") || c.is("th"))
                .collect();
            if cells.is_empty() {
                continue;
            }
            add_line(frame, &join_cells(cells), None)?;
        }
    }
    Ok(())
}

fn join_cells(cells: Vec<&Node>) -> String {
    cells
        .iter()
        .map(|c| c.text_content().trim().to_string())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Append one paragraph unless `text` is empty.
fn add_line(frame: &mut TextFrame, text: &str, font: Option<Font>) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    let paragraph = frame.add_paragraph();
    paragraph.set_text(text)?;
    if let Some(font) = font {
        for run in paragraph.runs_mut() {
            run.font = font.clone();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpptx_core::markdown;
    use mdpptx_pptx::{Bullet, Paragraph};

    fn render(markdown_text: &str, options: &ConvertOptions, native: bool) -> TextFrame {
        let mut frame = TextFrame::new(native);
        let nodes = markdown::parse(markdown_text);
        ContentRenderer::new(options).render(&mut frame, &nodes).unwrap();
        frame
    }

    fn lines(frame: &TextFrame) -> Vec<(String, u8)> {
        frame
            .paragraphs()
            .iter()
            .map(|p| (p.text(), p.level()))
            .collect()
    }

    #[test]
    fn test_ordered_list_prefixed() {
        let frame = render("1. A\n2. B\n", &ConvertOptions::default(), true);
        assert_eq!(
            lines(&frame),
            vec![("1. A".to_string(), 0), ("2. B".to_string(), 0)]
        );
        assert_eq!(frame.paragraphs()[0].bullet(), Some(&Bullet::None));
    }

    #[test]
    fn test_ordered_list_auto_number() {
        let options = ConvertOptions {
            numbering: NumberingStyle::AutoNumber,
            ..ConvertOptions::default()
        };
        let frame = render("1. A\n2. B\n", &options, true);
        assert_eq!(frame.paragraphs()[1].text(), "B");
        assert!(matches!(
            frame.paragraphs()[1].bullet(),
            Some(Bullet::AutoNumber { start_at: 1, .. })
        ));
    }

    #[test]
    fn test_nested_list_levels() {
        let frame = render("- X\n  - Y\n    - Z\n- W\n", &ConvertOptions::default(), true);
        assert_eq!(
            lines(&frame),
            vec![
                ("X".to_string(), 0),
                ("Y".to_string(), 1),
                ("Z".to_string(), 2),
                ("W".to_string(), 0)
            ]
        );
        assert!(frame
            .paragraphs()
            .iter()
            .all(|p| p.bullet() == Some(&Bullet::Char('•'))));
    }

    #[test]
    fn test_loose_list_item_parts_joined() {
        let frame = render("- one\n\n  two\n\n- three\n", &ConvertOptions::default(), true);
        assert_eq!(frame.paragraphs()[0].text(), "one two");
        assert_eq!(frame.paragraphs().len(), 2);
    }

    #[test]
    fn test_text_box_lists_use_raw_bullets() {
        let frame = render("- item\n", &ConvertOptions::default(), false);
        let properties = frame.paragraphs()[0].properties().unwrap();
        assert_eq!(properties.children()[0].local_name(), "buChar");
        assert!(frame.paragraphs()[0].bullet().is_none());
    }

    #[test]
    fn test_table_lines() {
        let frame = render(
            "| H1 | H2 |\n|----|----|\n| a | b |\n",
            &ConvertOptions::default(),
            true,
        );
        let texts: Vec<String> = frame.paragraphs().iter().map(Paragraph::text).collect();
        assert_eq!(texts, vec!["H1 | H2", "-------", "a | b"]);
    }

    #[test]
    fn test_headings_and_code_formatting() {
        let frame = render(
            "### Sub\n\n###### Tiny\n\n# Big\n\n```\nlet x = 1;\n```\n",
            &ConvertOptions::default(),
            true,
        );
        let paragraphs = frame.paragraphs();
        assert_eq!(paragraphs.len(), 4);

        let font = |i: usize| &paragraphs[i].runs()[0].font;
        assert_eq!(font(0).size, Some(18.0));
        assert_eq!(font(0).bold, Some(true));
        assert_eq!(font(1).size, Some(12.0));
        assert_eq!(font(2).size, Some(18.0));
        assert_eq!(paragraphs[3].text(), "let x = 1;");
        assert_eq!(font(3).name.as_deref(), Some("Courier New"));
        assert_eq!(font(3).size, Some(10.0));
    }

    #[test]
    fn test_empty_lines_skipped_and_frame_cleared() {
        let mut frame = TextFrame::new(true);
        frame.add_paragraph().set_text("stale").unwrap();
        let nodes = vec![
            Node::element("p", vec![Node::text("   ")]),
            Node::text("\n"),
            Node::element("p", vec![Node::text(" kept ")]),
        ];
        ContentRenderer::default().render(&mut frame, &nodes).unwrap();
        assert_eq!(frame.text(), "kept");
        assert_eq!(frame.word_wrap(), Some(true));
    }

    #[test]
    fn test_block_quote_contents_rendered() {
        let frame = render("> quoted\n", &ConvertOptions::default(), true);
        assert_eq!(frame.text(), "quoted");
    }

    #[test]
    fn test_invalid_text_is_an_error() {
        let mut frame = TextFrame::new(true);
        let nodes = vec![Node::element("p", vec![Node::text("bad\u{7}")])];
        assert!(ContentRenderer::default().render(&mut frame, &nodes).is_err());
    }
}
