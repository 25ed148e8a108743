//! Slide segmentation.
//!
//! A document is cut into slides in one of two mutually exclusive ways,
//! chosen once per document:
//!
//! - **Separators**: lines of three or more dashes split the raw text into
//!   sections. The first section is the title slide; every other non-blank
//!   section becomes one slide.
//! - **Headings**: the title slide is synthesized from the supplied title and
//!   metadata, then every `h1`/`h2` opens a new slide.

use regex::Regex;
use std::sync::LazyLock;

use crate::classify::{Consumed, ElementList, Role};
use crate::markdown;
use crate::metadata::{self, Metadata};
use crate::types::{DeckPlan, Node, PreamblePolicy, SegmentMode, SlideGroup, TitleSlide};

/// A separator line: three or more dashes on a line of their own.
static SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n-{3,}[ \t]*\r?\n").unwrap());

impl SegmentMode {
    /// Pick the mode for a document.
    pub fn detect(markdown: &str) -> Self {
        if SEPARATOR_REGEX.is_match(markdown) {
            SegmentMode::Separators
        } else {
            SegmentMode::Headings
        }
    }
}

/// Split raw text into separator-delimited sections.
pub fn split_sections(markdown: &str) -> Vec<&str> {
    SEPARATOR_REGEX.split(markdown).collect()
}

/// Builds a [`DeckPlan`] from Markdown.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    preamble: PreamblePolicy,
}

impl Segmenter {
    /// Create a segmenter that drops content before the first heading.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set what happens to content before the first heading.
    pub fn with_preamble(mut self, preamble: PreamblePolicy) -> Self {
        self.preamble = preamble;
        self
    }

    /// Plan the deck for a document.
    ///
    /// `title` is used for the title slide unless the document supplies its
    /// own (first `h1` of the title section, separator mode only).
    pub fn plan(&self, markdown: &str, title: &str) -> DeckPlan {
        let mode = SegmentMode::detect(markdown);
        log::debug!("Segmenting document in {:?} mode", mode);
        match mode {
            SegmentMode::Separators => self.plan_by_separators(markdown, title),
            SegmentMode::Headings => self.plan_by_headings(markdown, title),
        }
    }

    fn plan_by_separators(&self, markdown: &str, title: &str) -> DeckPlan {
        let sections = split_sections(markdown);
        let (first, rest) = match sections.split_first() {
            Some((first, rest)) => (*first, rest),
            None => ("", &[][..]),
        };

        let (metadata, first_body) = metadata::split_header(first);
        let title_slide = title_section(first_body, title, &metadata);

        let mut groups = Vec::new();
        for (number, section) in rest.iter().enumerate() {
            if section.trim().is_empty() {
                log::debug!("Skipping blank section {}", number + 2);
                continue;
            }
            groups.push(content_section(section));
        }

        DeckPlan {
            mode: SegmentMode::Separators,
            metadata,
            title_slide,
            groups,
        }
    }

    fn plan_by_headings(&self, markdown: &str, title: &str) -> DeckPlan {
        let (metadata, body) = metadata::split_header(markdown);
        let nodes = markdown::parse(body);
        let elements = ElementList::new(&nodes);
        let mut consumed = Consumed::default();

        let mut groups = Vec::new();
        let mut current: Option<SlideGroup> = None;
        let mut preamble = Vec::new();

        for (index, element) in elements.iter() {
            if consumed.contains(index) || !element.role.is_block() {
                continue;
            }
            consumed.consume(&elements, index);

            match element.role {
                Role::Heading(level) if level <= 2 => {
                    if let Some(group) = current.take() {
                        groups.push(group);
                    }
                    current = Some(SlideGroup::with_heading(level, element.node.text_content()));
                }
                Role::Heading(level) if current.is_none() => {
                    current = Some(SlideGroup::with_heading(level, element.node.text_content()));
                }
                _ => match current.as_mut() {
                    Some(group) => group.body.push(element.node.clone()),
                    None => preamble.push(element.node.clone()),
                },
            }
        }
        if let Some(group) = current.take() {
            groups.push(group);
        }

        let body = match self.preamble {
            PreamblePolicy::TitleSlide => preamble,
            PreamblePolicy::Drop => {
                if !preamble.is_empty() {
                    log::debug!(
                        "Dropping {} element(s) before the first heading",
                        preamble.len()
                    );
                }
                Vec::new()
            }
        };

        let title_slide = TitleSlide {
            title: title.to_string(),
            subtitle: metadata.byline(),
            body,
        };

        DeckPlan {
            mode: SegmentMode::Headings,
            metadata,
            title_slide,
            groups,
        }
    }
}

/// The first separator section: deck title, subtitle, and leftover content.
fn title_section(text: &str, default_title: &str, metadata: &Metadata) -> TitleSlide {
    let nodes = markdown::parse(text);
    let elements = ElementList::new(&nodes);
    let mut consumed = Consumed::default();

    let title = match take_text(&elements, Role::Heading(1), &mut consumed) {
        Some(text) => text,
        None => default_title.to_string(),
    };
    let subtitle =
        take_text(&elements, Role::Heading(2), &mut consumed).or_else(|| metadata.byline());

    TitleSlide {
        title,
        subtitle,
        body: elements.remaining_top_level(&consumed),
    }
}

/// A later separator section: titled by its first `h1`, else its first `h2`.
fn content_section(text: &str) -> SlideGroup {
    let nodes = markdown::parse(text);
    let elements = ElementList::new(&nodes);
    let mut consumed = Consumed::default();

    let mut group = SlideGroup::default();
    for level in [1, 2] {
        if let Some(text) = take_text(&elements, Role::Heading(level), &mut consumed) {
            group = SlideGroup::with_heading(level, text);
            break;
        }
    }
    group.body = elements.remaining_top_level(&consumed);
    group
}

/// Consume the first element with `role` and return its trimmed text.
fn take_text(elements: &ElementList<'_>, role: Role, consumed: &mut Consumed) -> Option<String> {
    let index = elements.first_unconsumed(role, consumed)?;
    consumed.consume(elements, index);
    elements
        .get(index)
        .map(|element| element.node.text_content().trim().to_string())
}

/// Body nodes that carry renderable content.
pub fn has_content(body: &[Node]) -> bool {
    body.iter().any(|node| !node.is_blank_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(plan: &DeckPlan) -> Vec<&str> {
        plan.groups.iter().map(SlideGroup::title).collect()
    }

    #[test]
    fn test_detect_mode() {
        assert_eq!(SegmentMode::detect("# A\n\ntext\n"), SegmentMode::Headings);
        assert_eq!(SegmentMode::detect("# A\n---\n# B\n"), SegmentMode::Separators);
        assert_eq!(SegmentMode::detect("# A\r\n-----\r\n# B"), SegmentMode::Separators);
        // A leading rule has no preceding line break.
        assert_eq!(SegmentMode::detect("---\n# A\n"), SegmentMode::Headings);
    }

    #[test]
    fn test_split_sections() {
        let sections = split_sections("one\n---\ntwo\n-----\nthree");
        assert_eq!(sections, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_headings_mode_groups_on_h1_h2() {
        let md = "# Intro\n\nWelcome\n\n## Details\n\n- a\n- b\n\n### Sub\n\nMore\n";
        let plan = Segmenter::new().plan(md, "Deck");
        assert_eq!(plan.mode, SegmentMode::Headings);
        assert_eq!(plan.title_slide.title, "Deck");
        assert_eq!(titles(&plan), vec!["Intro", "Details"]);
        assert_eq!(plan.groups[0].heading_level(), Some(1));
        // h3 inside an open group stays in the body.
        let body_tags: Vec<_> = plan.groups[1].body.iter().filter_map(Node::tag).collect();
        assert_eq!(body_tags, vec!["ul", "h3", "p"]);
        assert_eq!(plan.slide_count(), 3);
    }

    #[test]
    fn test_headings_mode_h3_opens_group_when_none_open() {
        let plan = Segmenter::new().plan("### Lone\n\ntext\n", "Deck");
        assert_eq!(titles(&plan), vec!["Lone"]);
        assert_eq!(plan.groups[0].body.len(), 1);
    }

    #[test]
    fn test_headings_mode_preamble_policy() {
        let md = "Before any heading\n\n## First\n\nbody\n";
        let dropped = Segmenter::new().plan(md, "Deck");
        assert!(dropped.title_slide.body.is_empty());
        assert_eq!(dropped.groups.len(), 1);

        let kept = Segmenter::new()
            .with_preamble(PreamblePolicy::TitleSlide)
            .plan(md, "Deck");
        assert_eq!(kept.title_slide.body.len(), 1);
        assert_eq!(kept.title_slide.body[0].text_content(), "Before any heading");
    }

    #[test]
    fn test_headings_mode_byline_subtitle() {
        let plan = Segmenter::new().plan("author: Jane\ndate: 2024\n\n# Hello\n", "Deck");
        assert_eq!(plan.title_slide.subtitle.as_deref(), Some("Jane | 2024"));
        assert_eq!(titles(&plan), vec!["Hello"]);
    }

    #[test]
    fn test_headings_mode_nested_elements_not_duplicated() {
        let md = "## Slide\n\n- one\n\n  two\n\n- three\n\n```\ncode\n```\n";
        let plan = Segmenter::new().plan(md, "Deck");
        let body_tags: Vec<_> = plan.groups[0].body.iter().filter_map(Node::tag).collect();
        assert_eq!(body_tags, vec!["ul", "pre"]);
    }

    #[test]
    fn test_separators_title_section() {
        let md = "author: Jane\ndate: 2024\n\n# My Deck\n\nIntro text\n\n---\n\n## Agenda\n\n- a\n";
        let plan = Segmenter::new().plan(md, "Fallback");
        assert_eq!(plan.mode, SegmentMode::Separators);
        assert_eq!(plan.title_slide.title, "My Deck");
        assert_eq!(plan.title_slide.subtitle.as_deref(), Some("Jane | 2024"));
        assert_eq!(plan.title_slide.body.len(), 1);
        assert_eq!(titles(&plan), vec!["Agenda"]);
    }

    #[test]
    fn test_separators_h2_subtitle_and_default_title() {
        let md = "## Tagline\n\n---\n\nBody only\n";
        let plan = Segmenter::new().plan(md, "Fallback");
        assert_eq!(plan.title_slide.title, "Fallback");
        assert_eq!(plan.title_slide.subtitle.as_deref(), Some("Tagline"));
        assert_eq!(titles(&plan), vec![""]);
    }

    #[test]
    fn test_separators_skip_blank_sections() {
        let md = "# T\n\n---\n\n   \n\n---\n\n# One\n\n---\n\n## Two\n\ntext\n";
        let plan = Segmenter::new().plan(md, "Deck");
        assert_eq!(titles(&plan), vec!["One", "Two"]);
        assert_eq!(plan.slide_count(), 3);
    }

    #[test]
    fn test_separators_h1_preferred_over_h2() {
        let md = "T\n\n---\n\n## Second\n\n# First\n\ntext\n";
        let plan = Segmenter::new().plan(md, "Deck");
        assert_eq!(titles(&plan), vec!["First"]);
        let body_tags: Vec<_> = plan.groups[0].body.iter().filter_map(Node::tag).collect();
        assert_eq!(body_tags, vec!["h2", "p"]);
    }

    #[test]
    fn test_has_content() {
        assert!(!has_content(&[]));
        assert!(!has_content(&[Node::text("\n")]));
        assert!(has_content(&[Node::element("p", vec![])]));
    }

    #[test]
    fn test_headings_mode_colon_heading_kept() {
        let plan = Segmenter::new().plan("# Agenda: Q3\n\n- a\n", "Deck");
        assert_eq!(titles(&plan), vec!["Agenda: Q3"]);
        assert_eq!(plan.groups[0].body.len(), 1);
        assert!(plan.groups[0].body[0].is("ul"));
        assert_eq!(plan.slide_count(), 2);
    }

    #[test]
    fn test_separators_colon_heading_titles_deck() {
        let plan = Segmenter::new().plan("# Agenda: Q3\n\n---\n\n## A\n", "Fallback");
        assert_eq!(plan.mode, SegmentMode::Separators);
        assert_eq!(plan.title_slide.title, "Agenda: Q3");
        assert_eq!(titles(&plan), vec!["A"]);
    }

    #[test]
    fn test_separators_nested_title_not_repeated() {
        let plan = Segmenter::new().plan("> # Quoted\n\n---\n\n## A\n", "Fallback");
        assert_eq!(plan.title_slide.title, "Quoted");
        assert!(plan
            .title_slide
            .body
            .iter()
            .all(|node| !node.text_content().contains("Quoted")));
    }
}
