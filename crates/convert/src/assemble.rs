//! One conversion: plan the deck, build its slides, serialize.

use mdpptx_core::{DeckPlan, Result, Segmenter};
use mdpptx_pptx::Presentation;

use crate::builder::SlideBuilder;
use crate::content::ContentRenderer;
use crate::options::ConvertOptions;

/// Converts Markdown documents into presentations.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    segmenter: Segmenter,
    builder: SlideBuilder,
}

impl Assembler {
    pub fn new(options: &ConvertOptions) -> Self {
        Self {
            segmenter: Segmenter::new().with_preamble(options.preamble),
            builder: SlideBuilder::new(ContentRenderer::new(options)),
        }
    }

    /// Plan the slides for a document without building them.
    pub fn plan(&self, markdown: &str, title: &str) -> DeckPlan {
        self.segmenter.plan(markdown, title)
    }

    /// Add the document's slides to `presentation`.
    pub fn build(&self, markdown: &str, title: &str, presentation: &mut Presentation) -> Result<DeckPlan> {
        let plan = self.plan(markdown, title);
        log::debug!(
            "Building {} slide(s) in {:?} mode",
            plan.slide_count(),
            plan.mode
        );

        self.builder.add_title_slide(presentation, &plan.title_slide)?;
        for group in &plan.groups {
            self.builder.add_group_slide(presentation, group, plan.mode)?;
        }
        Ok(plan)
    }

    /// Build the document onto `presentation` and return the `.pptx` bytes.
    pub fn convert(&self, markdown: &str, title: &str, mut presentation: Presentation) -> Result<Vec<u8>> {
        self.build(markdown, title, &mut presentation)?;
        presentation.to_bytes()
    }
}

/// Convert with the given options onto `presentation`.
pub fn convert(
    markdown: &str,
    title: &str,
    presentation: Presentation,
    options: &ConvertOptions,
) -> Result<Vec<u8>> {
    Assembler::new(options).convert(markdown, title, presentation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpptx_pptx::{DeckInspector, Outline};
    use std::io::Cursor;

    fn outline(markdown: &str, title: &str) -> Outline {
        let bytes = convert(
            markdown,
            title,
            Presentation::blank().unwrap(),
            &ConvertOptions::default(),
        )
        .unwrap();
        DeckInspector::new().inspect(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_heading_mode_deck() {
        let deck = outline("# Intro\n\nHello\n\n## Points\n\n- a\n- b\n", "My Talk");
        assert_eq!(deck.slide_count(), 3);
        assert_eq!(deck.slides[0].title.as_deref(), Some("My Talk"));
        assert_eq!(deck.slides[1].title.as_deref(), Some("Intro"));
        assert_eq!(deck.slides[1].layout.as_deref(), Some("Title Slide"));
        assert_eq!(deck.slides[2].layout.as_deref(), Some("Title and Content"));

        let texts: Vec<_> = deck.slides[2]
            .body_paragraphs()
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_separator_mode_counts() {
        let md = "# Deck\n\n---\n\n## One\n\ntext\n\n---\n\n\n\n---\n\n# Two\n\n| A | B |\n|---|---|\n| 1 | 2 |\n";
        let deck = outline(md, "Fallback");
        // Four sections, one blank: title + two body slides.
        assert_eq!(deck.slide_count(), 3);
        assert_eq!(deck.slides[0].title.as_deref(), Some("Deck"));
        assert_eq!(deck.slides[1].title.as_deref(), Some("One"));
        assert_eq!(deck.slides[2].title.as_deref(), Some("Two"));
        assert_eq!(deck.slides[2].layout.as_deref(), Some("Two Content"));

        let texts: Vec<_> = deck.slides[2]
            .body_paragraphs()
            .iter()
            .map(|p| p.text.clone())
            .filter(|t| !t.is_empty())
            .collect();
        assert_eq!(texts, vec!["A | B", "-----", "1 | 2"]);
    }

    #[test]
    fn test_metadata_byline_subtitle() {
        let deck = outline("author: Jane\ndate: 2024\n\n# Topic\n\nBody\n", "Deck");
        let subtitle = deck.slides[0]
            .shapes
            .iter()
            .find(|s| s.idx == Some(1))
            .map(|s| s.text());
        assert_eq!(subtitle.as_deref(), Some("Jane | 2024"));
        // Header lines are not rendered anywhere.
        assert!(!deck.to_text().contains("author:"));
    }

    #[test]
    fn test_same_input_same_outline() {
        let md = "# A\n\n1. x\n2. y\n\n## B\n\n```\ncode\n```\n";
        assert_eq!(outline(md, "T"), outline(md, "T"));
    }

    #[test]
    fn test_preamble_policy() {
        let md = "Before\n\n## Slide\n\nAfter\n";
        let dropped = outline(md, "T");
        assert!(!dropped.to_text().contains("Before"));

        let options = ConvertOptions {
            preamble: mdpptx_core::PreamblePolicy::TitleSlide,
            ..ConvertOptions::default()
        };
        let bytes = convert(md, "T", Presentation::blank().unwrap(), &options).unwrap();
        let kept = DeckInspector::new().inspect(Cursor::new(bytes)).unwrap();
        assert_eq!(kept.slides[0].body_paragraphs()[0].text, "Before");
    }

    #[test]
    fn test_invalid_text_in_title_fails() {
        let result = convert(
            "## Bad\u{1}Title\n",
            "T",
            Presentation::blank().unwrap(),
            &ConvertOptions::default(),
        );
        assert!(result.is_err());
    }
}
