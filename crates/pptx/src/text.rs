//! Text frames, paragraphs, and runs.

use mdpptx_core::{Error, Result};
use quick_xml::escape::escape;

use crate::markup::{ns, Element};

/// Deepest paragraph indentation level PowerPoint supports.
pub const MAX_LEVEL: u8 = 8;

/// Character formatting applied to a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Font {
    /// Latin typeface name.
    pub name: Option<String>,

    /// Size in points.
    pub size: Option<f64>,

    /// Bold weight.
    pub bold: Option<bool>,
}

/// A run of text with uniform formatting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    /// Run text. Line breaks are written as `a:br`.
    pub text: String,

    /// Run formatting.
    pub font: Font,
}

/// Bullet marking of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bullet {
    /// A literal bullet character.
    Char(char),
    /// Automatic numbering with an OOXML scheme such as `arabicPeriod`.
    AutoNumber { scheme: String, start_at: u32 },
    /// Explicitly no bullet, overriding inherited list styles.
    None,
}

impl Bullet {
    /// The DrawingML element expressing this bullet.
    pub fn to_element(&self) -> Element {
        match self {
            Bullet::Char(c) => Element::drawing("buChar").with_attr("char", c.to_string()),
            Bullet::AutoNumber { scheme, start_at } => Element::drawing("buAutoNum")
                .with_attr("type", scheme.as_str())
                .with_attr("startAt", start_at.to_string()),
            Bullet::None => Element::drawing("buNone"),
        }
    }

    /// Whether an element is one of the mutually exclusive bullet kinds.
    pub fn is_bullet_element(element: &Element) -> bool {
        element.namespace() == Some(ns::DRAWINGML)
            && matches!(
                element.local_name(),
                "buNone" | "buChar" | "buAutoNum" | "buBlip"
            )
    }
}

/// Reject characters XML 1.0 cannot carry.
pub fn validate_text(text: &str) -> Result<()> {
    match text
        .chars()
        .find(|&c| (c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')) || matches!(c, '\u{FFFE}' | '\u{FFFF}'))
    {
        Some(c) => Err(Error::InvalidText(format!(
            "character U+{:04X} is not allowed in XML",
            c as u32
        ))),
        None => Ok(()),
    }
}

/// A paragraph of a text frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    level: u8,
    runs: Vec<Run>,
    properties: Option<Element>,
    bullet: Option<Bullet>,
    native_bullets: bool,
}

impl Paragraph {
    /// Create an empty paragraph without a native bullet property.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_native_bullets(native_bullets: bool) -> Self {
        Self {
            native_bullets,
            ..Self::default()
        }
    }

    /// Paragraph text, runs concatenated.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Replace all runs with a single unformatted run.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        validate_text(text)?;
        self.runs.clear();
        if !text.is_empty() {
            self.runs.push(Run {
                text: text.replace("\r\n", "\n").replace('\r', "\n"),
                font: Font::default(),
            });
        }
        Ok(())
    }

    /// Append a run.
    pub fn add_run(&mut self, text: &str) -> Result<&mut Run> {
        validate_text(text)?;
        self.runs.push(Run {
            text: text.to_string(),
            font: Font::default(),
        });
        let index = self.runs.len() - 1;
        Ok(&mut self.runs[index])
    }

    /// The runs of this paragraph.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Mutable access to the runs, e.g. for font changes.
    pub fn runs_mut(&mut self) -> &mut [Run] {
        &mut self.runs
    }

    /// Indentation level, 0-based.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Set the indentation level, clamped to [`MAX_LEVEL`].
    pub fn set_level(&mut self, level: usize) {
        self.level = level.min(MAX_LEVEL as usize) as u8;
    }

    /// Whether this paragraph exposes the high-level bullet property.
    pub fn supports_native_bullets(&self) -> bool {
        self.native_bullets
    }

    /// High-level bullet, if one was set through [`Paragraph::set_bullet`].
    pub fn bullet(&self) -> Option<&Bullet> {
        self.bullet.as_ref()
    }

    /// Set the high-level bullet property.
    ///
    /// Only paragraphs of placeholder text frames expose it; free text boxes
    /// return [`Error::Unsupported`].
    pub fn set_bullet(&mut self, bullet: Bullet) -> Result<()> {
        if !self.native_bullets {
            return Err(Error::Unsupported(
                "paragraph has no native bullet property".to_string(),
            ));
        }
        self.bullet = Some(bullet);
        Ok(())
    }

    /// Raw `a:pPr` block, if any.
    pub fn properties(&self) -> Option<&Element> {
        self.properties.as_ref()
    }

    /// Raw `a:pPr` block, created empty if missing.
    pub fn properties_or_insert(&mut self) -> &mut Element {
        self.properties
            .get_or_insert_with(|| Element::drawing("pPr"))
    }

    /// Replace the whole raw `a:pPr` block.
    pub fn replace_properties(&mut self, properties: Element) -> Result<()> {
        if !properties.is(ns::DRAWINGML, "pPr") {
            return Err(Error::MarkupError(format!(
                "expected a:pPr, found {}",
                properties.local_name()
            )));
        }
        self.properties = Some(properties);
        Ok(())
    }

    /// Effective bullet markup after merging the raw block and the native
    /// property. Used when writing and by callers inspecting the result.
    pub fn effective_properties(&self) -> Option<Element> {
        let mut properties = self.properties.clone();

        if let Some(bullet) = &self.bullet {
            let block = properties.get_or_insert_with(|| Element::drawing("pPr"));
            block.retain_children(|c| !Bullet::is_bullet_element(c));
            block.push(bullet.to_element());
        }

        if self.level > 0 {
            properties
                .get_or_insert_with(|| Element::drawing("pPr"))
                .set_attr("lvl", self.level.to_string());
        } else if let Some(block) = properties.as_mut() {
            block.remove_attr("lvl");
        }

        properties
    }

    pub(crate) fn write_xml(&self, out: &mut String) {
        let properties = self.effective_properties();
        if properties.is_none() && self.runs.is_empty() {
            out.push_str("<a:p/>");
            return;
        }

        out.push_str("<a:p>");
        if let Some(properties) = properties {
            properties.write_xml(out);
        }
        for run in &self.runs {
            write_run(run, out);
        }
        out.push_str("</a:p>");
    }
}

fn write_run(run: &Run, out: &mut String) {
    let mut first = true;
    for line in run.text.split('\n') {
        if !first {
            out.push_str("<a:br>");
            write_run_properties(&run.font, out);
            out.push_str("</a:br>");
        }
        first = false;
        if line.is_empty() {
            continue;
        }
        out.push_str("<a:r>");
        write_run_properties(&run.font, out);
        out.push_str("<a:t>");
        out.push_str(&escape(line));
        out.push_str("</a:t></a:r>");
    }
}

fn write_run_properties(font: &Font, out: &mut String) {
    out.push_str(r#"<a:rPr lang="en-US""#);
    if let Some(size) = font.size {
        out.push_str(&format!(r#" sz="{}""#, (size * 100.0).round() as i64));
    }
    if let Some(bold) = font.bold {
        out.push_str(if bold { r#" b="1""# } else { r#" b="0""# });
    }
    out.push_str(r#" dirty="0""#);
    match &font.name {
        Some(name) => {
            out.push('>');
            out.push_str(&format!(r#"<a:latin typeface="{}"/>"#, escape(name.as_str())));
            out.push_str("</a:rPr>");
        }
        None => out.push_str("/>"),
    }
}

/// The text-holding body of a shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFrame {
    paragraphs: Vec<Paragraph>,
    word_wrap: Option<bool>,
    native_bullets: bool,
}

impl TextFrame {
    /// Create an empty frame. `native_bullets` controls whether its
    /// paragraphs expose the high-level bullet property.
    pub fn new(native_bullets: bool) -> Self {
        Self {
            native_bullets,
            ..Self::default()
        }
    }

    /// Remove all paragraphs.
    pub fn clear(&mut self) {
        self.paragraphs.clear();
    }

    /// Replace the content with a single paragraph; newlines become line breaks.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        validate_text(text)?;
        self.clear();
        let paragraph = self.add_paragraph();
        paragraph.set_text(text)
    }

    /// Append an empty paragraph and return it.
    pub fn add_paragraph(&mut self) -> &mut Paragraph {
        self.paragraphs
            .push(Paragraph::with_native_bullets(self.native_bullets));
        let index = self.paragraphs.len() - 1;
        &mut self.paragraphs[index]
    }

    /// The paragraphs in order.
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Mutable access to the paragraphs.
    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        &mut self.paragraphs
    }

    /// Frame text, paragraphs joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Word-wrap setting; `None` inherits from the layout.
    pub fn word_wrap(&self) -> Option<bool> {
        self.word_wrap
    }

    /// Enable or disable word wrap.
    pub fn set_word_wrap(&mut self, wrap: bool) {
        self.word_wrap = Some(wrap);
    }

    /// Write `p:txBody`. `auto_fit` adds `a:spAutoFit` (text boxes).
    pub(crate) fn write_xml(&self, auto_fit: bool, out: &mut String) {
        out.push_str("<p:txBody><a:bodyPr");
        match self.word_wrap {
            Some(true) => out.push_str(r#" wrap="square""#),
            Some(false) => out.push_str(r#" wrap="none""#),
            None => {}
        }
        if auto_fit {
            out.push_str(r#" rtlCol="0"><a:spAutoFit/></a:bodyPr>"#);
        } else {
            out.push_str("/>");
        }
        out.push_str("<a:lstStyle/>");
        if self.paragraphs.is_empty() {
            // A text body needs at least one paragraph.
            out.push_str("<a:p/>");
        }
        for paragraph in &self.paragraphs {
            paragraph.write_xml(out);
        }
        out.push_str("</p:txBody>");
    }
}
