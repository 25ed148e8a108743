//! Read back the text outline of a PPTX file.
//!
//! Slides are visited in `p:sldIdLst` order. Each shape contributes its
//! paragraphs with level, bullet marker, and the formatting of the first run.

use mdpptx_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::io::{Read, Seek};
use zip::ZipArchive;

use crate::layout::id_list;
use crate::package::{attr_value, local_name, parse_relationships, rels_part_for, resolve_target};

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// A paragraph as stored in a slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutlineParagraph {
    pub text: String,
    pub level: u8,
    /// `char:•`, `auto:arabicPeriod`, or `none`; absent when inherited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    pub bold: bool,
}

/// A shape and its text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutlineShape {
    pub name: String,
    /// Placeholder type; `obj` when the placeholder omits it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idx: Option<u32>,
    pub paragraphs: Vec<OutlineParagraph>,
}

impl OutlineShape {
    pub fn is_title(&self) -> bool {
        matches!(self.placeholder.as_deref(), Some("title") | Some("ctrTitle"))
    }

    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One slide of the outline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutlineSlide {
    pub number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub shapes: Vec<OutlineShape>,
}

impl OutlineSlide {
    /// Shapes other than the title, in document order.
    pub fn body_shapes(&self) -> impl Iterator<Item = &OutlineShape> {
        self.shapes.iter().filter(|s| !s.is_title())
    }

    /// Every non-title paragraph in document order.
    pub fn body_paragraphs(&self) -> Vec<&OutlineParagraph> {
        self.body_shapes().flat_map(|s| s.paragraphs.iter()).collect()
    }
}

/// Text outline of a whole deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outline {
    pub slides: Vec<OutlineSlide>,
}

impl Outline {
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Indented plain-text rendering.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for slide in &self.slides {
            out.push_str(&format!(
                "Slide {}: {}\n",
                slide.number,
                slide.title.as_deref().unwrap_or("(untitled)")
            ));
            for paragraph in slide.body_paragraphs() {
                if paragraph.text.is_empty() {
                    continue;
                }
                let marker = match paragraph.bullet.as_deref() {
                    Some(b) if b.starts_with("char:") => "* ",
                    Some(b) if b.starts_with("auto:") => "# ",
                    _ => "",
                };
                let indent = "  ".repeat(paragraph.level as usize + 1);
                for (i, line) in paragraph.text.lines().enumerate() {
                    let lead = if i == 0 { marker } else { "  " };
                    out.push_str(&format!("{}{}{}\n", indent, lead, line));
                }
            }
        }
        out
    }
}

/// Reads slide text out of PPTX archives.
pub struct DeckInspector;

impl DeckInspector {
    pub fn new() -> Self {
        Self
    }

    /// Build the outline of a PPTX archive.
    pub fn inspect<R: Read + Seek>(&self, reader: R) -> Result<Outline> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut outline = Outline::default();
        for (idx, slide_path) in self.get_slide_order(&mut archive)?.iter().enumerate() {
            let slide = self.parse_slide(&mut archive, slide_path, idx + 1)?;
            outline.slides.push(slide);
        }
        Ok(outline)
    }

    /// Slide parts in presentation order.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let presentation = self.read_file_from_archive(archive, PRESENTATION_PART)?;
        let rels = parse_relationships(
            &self.read_file_from_archive(archive, &rels_part_for(PRESENTATION_PART))?,
        )?;

        let mut slides = Vec::new();
        for rid in id_list(&presentation, b"sldId")? {
            match rels.iter().find(|rel| rel.id == rid) {
                Some(rel) => slides.push(resolve_target(PRESENTATION_PART, &rel.target)),
                None => log::warn!("Slide relationship '{}' not found", rid),
            }
        }
        Ok(slides)
    }

    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<OutlineSlide> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let shapes = self.extract_shapes_from_xml(&content)?;
        let title = shapes
            .iter()
            .find(|s| s.is_title())
            .map(OutlineShape::text)
            .filter(|t| !t.is_empty());

        Ok(OutlineSlide {
            number: slide_number,
            layout: self.layout_name(archive, slide_path),
            title,
            shapes,
        })
    }

    /// Name of the layout a slide uses, if it can be resolved.
    fn layout_name<R: Read + Seek>(&self, archive: &mut ZipArchive<R>, slide_path: &str) -> Option<String> {
        let rels = self
            .read_file_from_archive(archive, &rels_part_for(slide_path))
            .ok()?;
        let rel = parse_relationships(&rels)
            .ok()?
            .into_iter()
            .find(|rel| rel.rel_type.ends_with("/slideLayout"))?;
        let layout_path = resolve_target(slide_path, &rel.target);
        let layout = self.read_file_from_archive(archive, &layout_path).ok()?;

        let mut reader = Reader::from_str(&layout);
        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"cSld" => {
                    return attr_value(e, b"name");
                }
                Ok(Event::Eof) | Err(_) => return None,
                _ => {}
            }
        }
    }

    /// Extract shapes and their paragraphs from slide XML.
    fn extract_shapes_from_xml(&self, xml_content: &str) -> Result<Vec<OutlineShape>> {
        let mut reader = Reader::from_str(xml_content);
        let mut scan = SlideScan::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => scan.open(e),
                Ok(Event::Empty(ref e)) => {
                    scan.open(e);
                    scan.close(local_name(e.name().as_ref()));
                }
                Ok(Event::Text(ref e)) if scan.in_text => {
                    if let Some(paragraph) = scan.paragraph.as_mut() {
                        let text = e.unescape().unwrap_or_default();
                        paragraph.text.push_str(&text);
                    }
                }
                Ok(Event::End(ref e)) => scan.close(local_name(e.name().as_ref())),
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!("Error parsing slide: {}", e)));
                }
                _ => {}
            }
        }

        Ok(scan.shapes)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for DeckInspector {
    fn default() -> Self {
        Self::new()
    }
}

/// Parser state while walking one slide part.
#[derive(Default)]
struct SlideScan {
    shapes: Vec<OutlineShape>,
    shape: Option<OutlineShape>,
    paragraph: Option<OutlineParagraph>,
    in_text_body: bool,
    in_run_properties: bool,
    in_text: bool,
    seen_run: bool,
}

impl SlideScan {
    fn open(&mut self, e: &BytesStart<'_>) {
        let name = e.name();
        let local = local_name(name.as_ref());

        match local {
            b"sp" => self.shape = Some(OutlineShape::default()),
            b"cNvPr" => {
                if let Some(shape) = self.shape.as_mut() {
                    shape.name = attr_value(e, b"name").unwrap_or_default();
                }
            }
            b"ph" => {
                if let Some(shape) = self.shape.as_mut() {
                    shape.placeholder =
                        Some(attr_value(e, b"type").unwrap_or_else(|| "obj".to_string()));
                    shape.idx = attr_value(e, b"idx").and_then(|v| v.parse().ok());
                }
            }
            b"txBody" => self.in_text_body = true,
            b"p" if self.in_text_body => {
                self.paragraph = Some(OutlineParagraph::default());
                self.seen_run = false;
            }
            b"pPr" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.level = attr_value(e, b"lvl")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                }
            }
            b"buChar" | b"buAutoNum" | b"buNone" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.bullet = Some(match local {
                        b"buChar" => format!("char:{}", attr_value(e, b"char").unwrap_or_default()),
                        b"buAutoNum" => {
                            format!("auto:{}", attr_value(e, b"type").unwrap_or_default())
                        }
                        _ => "none".to_string(),
                    });
                }
            }
            b"rPr" if !self.seen_run => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.size = attr_value(e, b"sz")
                        .and_then(|v| v.parse::<f64>().ok())
                        .map(|sz| sz / 100.0);
                    paragraph.bold =
                        matches!(attr_value(e, b"b").as_deref(), Some("1") | Some("true"));
                    self.in_run_properties = true;
                }
            }
            b"latin" if self.in_run_properties => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.font = attr_value(e, b"typeface");
                }
            }
            b"br" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.text.push('\n');
                }
            }
            b"t" => self.in_text = true,
            _ => {}
        }
    }

    fn close(&mut self, local: &[u8]) {
        match local {
            b"sp" => {
                if let Some(shape) = self.shape.take() {
                    self.shapes.push(shape);
                }
                self.in_text_body = false;
            }
            b"txBody" => self.in_text_body = false,
            b"p" if self.in_text_body => {
                if let (Some(shape), Some(paragraph)) = (self.shape.as_mut(), self.paragraph.take()) {
                    shape.paragraphs.push(paragraph);
                }
            }
            b"rPr" => {
                self.in_run_properties = false;
                self.seen_run = true;
            }
            b"t" => self.in_text = false,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::Presentation;
    use crate::slide::Geometry;
    use crate::text::Bullet;
    use std::io::Cursor;

    fn sample_deck() -> Vec<u8> {
        let mut presentation = Presentation::blank().unwrap();

        let slide = presentation.add_slide(0).unwrap();
        slide.title_mut().unwrap().text_frame_mut().set_text("Deck").unwrap();

        let slide = presentation.add_slide(1).unwrap();
        slide.title_mut().unwrap().text_frame_mut().set_text("Agenda").unwrap();
        let body = slide.placeholder(1).unwrap().id();
        let frame = slide.shape_mut(body).unwrap().text_frame_mut();
        frame.clear();
        let p = frame.add_paragraph();
        p.set_text("first").unwrap();
        p.set_bullet(Bullet::Char('•')).unwrap();
        let p = frame.add_paragraph();
        p.set_text("nested").unwrap();
        p.set_level(1);
        p.set_bullet(Bullet::AutoNumber {
            scheme: "arabicPeriod".to_string(),
            start_at: 1,
        })
        .unwrap();

        let boxed = slide.add_textbox(Geometry::inches(1.0, 2.0, 8.0, 4.0));
        let p = boxed.text_frame_mut().add_paragraph();
        p.set_text("fn main() {}").unwrap();
        for run in p.runs_mut() {
            run.font.name = Some("Courier New".to_string());
            run.font.size = Some(10.0);
        }

        presentation.to_bytes().unwrap()
    }

    #[test]
    fn test_inspect_slide_order_and_titles() {
        let outline = DeckInspector::new().inspect(Cursor::new(sample_deck())).unwrap();
        assert_eq!(outline.slide_count(), 2);
        assert_eq!(outline.slides[0].title.as_deref(), Some("Deck"));
        assert_eq!(outline.slides[0].layout.as_deref(), Some("Title Slide"));
        assert_eq!(outline.slides[1].title.as_deref(), Some("Agenda"));
        assert_eq!(outline.slides[1].layout.as_deref(), Some("Title and Content"));
    }

    #[test]
    fn test_inspect_paragraph_details() {
        let outline = DeckInspector::new().inspect(Cursor::new(sample_deck())).unwrap();
        let paragraphs = outline.slides[1].body_paragraphs();
        assert_eq!(paragraphs.len(), 3);

        assert_eq!(paragraphs[0].text, "first");
        assert_eq!(paragraphs[0].bullet.as_deref(), Some("char:•"));
        assert_eq!(paragraphs[1].level, 1);
        assert_eq!(paragraphs[1].bullet.as_deref(), Some("auto:arabicPeriod"));

        assert_eq!(paragraphs[2].font.as_deref(), Some("Courier New"));
        assert_eq!(paragraphs[2].size, Some(10.0));
        assert!(!paragraphs[2].bold);
    }

    #[test]
    fn test_outline_text() {
        let outline = DeckInspector::new().inspect(Cursor::new(sample_deck())).unwrap();
        let text = outline.to_text();
        assert!(text.starts_with("Slide 1: Deck\n"));
        assert!(text.contains("Slide 2: Agenda\n  * first\n    # nested\n"));
    }

    #[test]
    fn test_inspect_rejects_non_zip() {
        let result = DeckInspector::new().inspect(Cursor::new(b"not a zip".to_vec()));
        assert!(matches!(result, Err(Error::ZipError(_))));
    }
}
