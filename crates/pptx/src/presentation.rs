//! Presentation object: layouts from a template, slides built in memory.

use mdpptx_core::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

use crate::layout::{discover_layouts, SlideLayout};
use crate::markup::ns;
use crate::package::{
    content_type, local_name, next_relationship_id, parse_relationships, rel_type, rels_part_for,
    relative_target, write_relationships, ContentTypes, Package, Relationship, CONTENT_TYPES_PART,
};
use crate::slide::Slide;

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// First id PowerPoint assigns in `p:sldIdLst`.
const FIRST_SLIDE_ID: u32 = 256;

/// Children of `p:presentation` that come after `p:sldIdLst`.
const AFTER_SLIDE_LIST: &[&[u8]] = &[
    b"sldSz",
    b"notesSz",
    b"smartTags",
    b"embeddedFontLst",
    b"custShowLst",
    b"photoAlbum",
    b"custDataLst",
    b"kinsoku",
    b"defaultTextStyle",
    b"modifyVerifier",
    b"extLst",
];

/// A presentation under construction.
///
/// Masters, layouts, and the theme come from the source package. Slides
/// already present in a template are discarded; the deck holds only the
/// slides added through [`Presentation::add_slide`].
#[derive(Debug, Clone)]
pub struct Presentation {
    package: Package,
    layouts: Vec<SlideLayout>,
    slides: Vec<Slide>,
}

impl Presentation {
    /// A presentation on the built-in blank template.
    pub fn blank() -> Result<Self> {
        Self::from_package(Package::blank())
    }

    /// Open a template file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::debug!("Opening template {}", path.display());
        Self::from_reader(BufReader::new(file))
    }

    /// Read a template from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_package(Package::from_reader(reader)?)
    }

    /// Wrap a loaded package.
    pub fn from_package(package: Package) -> Result<Self> {
        if !package.contains(PRESENTATION_PART) {
            return Err(Error::TemplateError(format!(
                "Not a presentation: missing {}",
                PRESENTATION_PART
            )));
        }

        let existing = package
            .relationships(PRESENTATION_PART)?
            .iter()
            .filter(|rel| rel.rel_type == rel_type::SLIDE)
            .count();
        if existing > 0 {
            log::debug!("Discarding {} slide(s) from template", existing);
        }

        let layouts = discover_layouts(&package)?;
        Ok(Self {
            package,
            layouts,
            slides: Vec::new(),
        })
    }

    /// Layouts available to new slides.
    pub fn layouts(&self) -> &[SlideLayout] {
        &self.layouts
    }

    /// Append a slide using the layout at `layout_index`.
    pub fn add_slide(&mut self, layout_index: usize) -> Result<&mut Slide> {
        let layout = self.layouts.get(layout_index).ok_or_else(|| {
            Error::LayoutError(format!(
                "Layout index {} out of range ({} layouts)",
                layout_index,
                self.layouts.len()
            ))
        })?;
        self.slides.push(Slide::from_layout(layout));
        let index = self.slides.len() - 1;
        Ok(&mut self.slides[index])
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    /// Serialize to PPTX bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Serialize as a PPTX archive.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        self.build_package()?.write_to(writer)
    }

    fn build_package(&self) -> Result<Package> {
        let mut package = self.package.clone();
        package.remove_prefix("ppt/slides/");
        package.remove_prefix("ppt/notesSlides/");

        let rels_part = rels_part_for(PRESENTATION_PART);
        let mut rels: Vec<Relationship> = parse_relationships(&package.part_str(&rels_part)?)?
            .into_iter()
            .filter(|rel| rel.rel_type != rel_type::SLIDE && rel.rel_type != rel_type::NOTES_SLIDE)
            .collect();
        let first_rid = next_relationship_id(&rels);

        let mut types = ContentTypes::parse(&package.part_str(CONTENT_TYPES_PART)?)?;
        types.remove_content_type(content_type::SLIDE);
        types.remove_content_type(content_type::NOTES_SLIDE);

        let mut slide_ids = Vec::with_capacity(self.slides.len());
        for (index, slide) in self.slides.iter().enumerate() {
            let number = index + 1;
            let part = format!("ppt/slides/slide{}.xml", number);

            let slide_rels = [Relationship::new(
                "rId1",
                rel_type::SLIDE_LAYOUT,
                relative_target(&part, slide.layout_part()),
            )];
            package.set_part(rels_part_for(&part), write_relationships(&slide_rels));
            package.set_part(part.as_str(), slide.to_xml());
            types.set_override(&part, content_type::SLIDE);

            let rid = format!("rId{}", first_rid + index as u32);
            rels.push(Relationship::new(
                rid.as_str(),
                rel_type::SLIDE,
                format!("slides/slide{}.xml", number),
            ));
            slide_ids.push((FIRST_SLIDE_ID + index as u32, rid));
        }

        package.set_part(rels_part, write_relationships(&rels));
        package.set_part(CONTENT_TYPES_PART, types.to_xml());

        let presentation = package.part_str(PRESENTATION_PART)?;
        package.set_part(PRESENTATION_PART, rewrite_slide_list(&presentation, &slide_ids)?);

        log::debug!("Serialized {} slide(s)", self.slides.len());
        Ok(package)
    }
}

/// Replace `p:sldIdLst` in `presentation.xml` with the given `(id, rId)`
/// entries, keeping everything else as written.
fn rewrite_slide_list(xml: &str, slides: &[(u32, String)]) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let mut depth = 0usize;
    let mut skipping = 0usize;
    let mut inserted = slides.is_empty();
    let mut p_prefix = String::from("p");
    let mut r_prefix = String::from("r");

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("Error reading presentation: {}", e)))?;
        if let Event::Eof = event {
            break;
        }

        if skipping > 0 {
            match event {
                Event::Start(_) => skipping += 1,
                Event::End(_) => skipping -= 1,
                _ => {}
            }
            continue;
        }

        match &event {
            Event::Start(e) if depth == 0 => {
                let qname = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                p_prefix = qname
                    .split_once(':')
                    .map(|(prefix, _)| prefix.to_string())
                    .unwrap_or_default();
                for attr in e.attributes().flatten() {
                    if attr.value.as_ref() == ns::RELATIONSHIPS.as_bytes() {
                        if let Some(prefix) = attr.key.as_ref().strip_prefix(b"xmlns:") {
                            r_prefix = String::from_utf8_lossy(prefix).into_owned();
                        }
                    }
                }
            }
            Event::Start(e) | Event::Empty(e) if depth == 1 => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if local == b"sldIdLst" {
                    if matches!(event, Event::Start(_)) {
                        skipping = 1;
                    }
                    continue;
                }
                if !inserted && AFTER_SLIDE_LIST.contains(&local) {
                    write_slide_list(&mut writer, &p_prefix, &r_prefix, slides)?;
                    inserted = true;
                }
            }
            Event::End(_) if depth == 1 && !inserted => {
                write_slide_list(&mut writer, &p_prefix, &r_prefix, slides)?;
                inserted = true;
            }
            _ => {}
        }

        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        writer
            .write_event(event)
            .map_err(|e| Error::XmlError(format!("Error writing presentation: {}", e)))?;
    }

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| Error::XmlError(format!("Presentation is not UTF-8: {}", e)))
}

fn write_slide_list(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    p_prefix: &str,
    r_prefix: &str,
    slides: &[(u32, String)],
) -> Result<()> {
    let qualify = |prefix: &str, local: &str| {
        if prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", prefix, local)
        }
    };
    let list = qualify(p_prefix, "sldIdLst");
    let entry = qualify(p_prefix, "sldId");
    let rid_attr = qualify(r_prefix, "id");
    let xml_err = |e: quick_xml::Error| Error::XmlError(format!("Error writing slide list: {}", e));

    writer
        .write_event(Event::Start(BytesStart::new(list.as_str())))
        .map_err(xml_err)?;
    for (id, rid) in slides {
        let mut element = BytesStart::new(entry.as_str());
        element.push_attribute(("id", id.to_string().as_str()));
        element.push_attribute((rid_attr.as_str(), rid.as_str()));
        writer.write_event(Event::Empty(element)).map_err(xml_err)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(list.as_str())))
        .map_err(xml_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::id_list;
    use crate::markup::Element;

    #[test]
    fn test_blank_has_layouts_and_no_slides() {
        let presentation = Presentation::blank().unwrap();
        assert_eq!(presentation.layouts().len(), 4);
        assert!(presentation.slides().is_empty());
    }

    #[test]
    fn test_add_slide_rejects_missing_layout() {
        let mut presentation = Presentation::blank().unwrap();
        assert!(matches!(
            presentation.add_slide(9),
            Err(Error::LayoutError(_))
        ));
    }

    #[test]
    fn test_rewrite_slide_list_placement() {
        let xml = Package::blank().part_str(PRESENTATION_PART).unwrap();
        let slides = vec![(256, "rId6".to_string()), (257, "rId7".to_string())];
        let rewritten = rewrite_slide_list(&xml, &slides).unwrap();

        let list = rewritten.find("<p:sldIdLst>").unwrap();
        assert!(rewritten.find("</p:sldMasterIdLst>").unwrap() < list);
        assert!(list < rewritten.find("<p:sldSz").unwrap());
        assert!(rewritten.contains(r#"<p:sldId id="257" r:id="rId7"/>"#));
        assert_eq!(id_list(&rewritten, b"sldId").unwrap(), vec!["rId6", "rId7"]);

        // Rewriting again replaces rather than duplicates.
        let again = rewrite_slide_list(&rewritten, &slides[..1]).unwrap();
        assert_eq!(again.matches("<p:sldIdLst>").count(), 1);
        assert_eq!(id_list(&again, b"sldId").unwrap(), vec!["rId6"]);
    }

    #[test]
    fn test_build_package_wires_slides() {
        let mut presentation = Presentation::blank().unwrap();
        presentation.add_slide(0).unwrap();
        presentation.add_slide(1).unwrap();

        let package = presentation.build_package().unwrap();
        assert!(package.contains("ppt/slides/slide1.xml"));
        assert!(package.contains("ppt/slides/_rels/slide2.xml.rels"));

        let rels = package.relationships("ppt/slides/slide2.xml").unwrap();
        assert_eq!(rels[0].target, "../slideLayouts/slideLayout2.xml");

        let presentation_rels = package.relationships(PRESENTATION_PART).unwrap();
        let slide_rels: Vec<_> = presentation_rels
            .iter()
            .filter(|rel| rel.rel_type == rel_type::SLIDE)
            .map(|rel| rel.id.as_str())
            .collect();
        assert_eq!(slide_rels, vec!["rId6", "rId7"]);

        let types = ContentTypes::parse(&package.part_str(CONTENT_TYPES_PART).unwrap()).unwrap();
        assert_eq!(types.get("ppt/slides/slide2.xml"), Some(content_type::SLIDE));

        let xml = package.part_str(PRESENTATION_PART).unwrap();
        let body = xml.split_once("?>").unwrap().1.trim();
        assert!(Element::parse(body).is_ok());
    }

    #[test]
    fn test_reopened_output_discards_previous_slides() {
        let mut presentation = Presentation::blank().unwrap();
        presentation.add_slide(1).unwrap();
        presentation.add_slide(1).unwrap();
        let bytes = presentation.to_bytes().unwrap();

        let mut reopened = Presentation::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(reopened.layouts().len(), 4);
        reopened.add_slide(0).unwrap();
        let package = reopened.build_package().unwrap();
        assert!(package.contains("ppt/slides/slide1.xml"));
        assert!(!package.contains("ppt/slides/slide2.xml"));

        let xml = package.part_str(PRESENTATION_PART).unwrap();
        assert_eq!(id_list(&xml, b"sldId").unwrap().len(), 1);
    }
}
