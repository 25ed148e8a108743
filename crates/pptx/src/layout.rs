//! Slide layout discovery.

use mdpptx_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::package::{attr_value, local_name, rel_type, resolve_target, Package};
use crate::slide::PlaceholderKind;

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// A placeholder declared by a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderSpec {
    pub kind: PlaceholderKind,
    pub idx: u32,
    pub name: String,
    pub has_text_body: bool,
}

/// A slide layout of the presentation's masters.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideLayout {
    pub name: String,
    pub part_name: String,
    pub placeholders: Vec<PlaceholderSpec>,
}

impl SlideLayout {
    /// The placeholder with the given index.
    pub fn placeholder(&self, idx: u32) -> Option<&PlaceholderSpec> {
        self.placeholders.iter().find(|ph| ph.idx == idx)
    }

    /// Parse a layout part.
    pub fn parse(part_name: &str, xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut layout = SlideLayout {
            name: String::new(),
            part_name: part_name.to_string(),
            placeholders: Vec::new(),
        };

        let mut in_shape = false;
        let mut shape_name = String::new();
        let mut placeholder: Option<(PlaceholderKind, u32)> = None;
        let mut has_text_body = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    match local_name(e.name().as_ref()) {
                        b"cSld" => {
                            layout.name = attr_value(e, b"name").unwrap_or_default();
                        }
                        b"sp" => {
                            in_shape = true;
                            shape_name.clear();
                            placeholder = None;
                            has_text_body = false;
                        }
                        b"cNvPr" if in_shape => {
                            shape_name = attr_value(e, b"name").unwrap_or_default();
                        }
                        b"ph" if in_shape => {
                            let kind = attr_value(e, b"type")
                                .map(|t| PlaceholderKind::from_attr(&t))
                                .unwrap_or(PlaceholderKind::Object);
                            let idx = attr_value(e, b"idx")
                                .and_then(|v| v.parse().ok())
                                .unwrap_or(0);
                            placeholder = Some((kind, idx));
                        }
                        b"txBody" if in_shape => has_text_body = true,
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"sp" => {
                    if let Some((kind, idx)) = placeholder.take() {
                        layout.placeholders.push(PlaceholderSpec {
                            kind,
                            idx,
                            name: std::mem::take(&mut shape_name),
                            has_text_body,
                        });
                    }
                    in_shape = false;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing layout '{}': {}",
                        part_name, e
                    )));
                }
                _ => {}
            }
        }

        Ok(layout)
    }
}

/// Every layout of every master, in master order then layout-list order.
pub fn discover_layouts(package: &Package) -> Result<Vec<SlideLayout>> {
    let presentation_rels = package.relationships(PRESENTATION_PART)?;
    let presentation = package.part_str(PRESENTATION_PART)?;

    let mut layouts = Vec::new();
    for master_rid in id_list(&presentation, b"sldMasterId")? {
        let Some(rel) = presentation_rels
            .iter()
            .find(|rel| rel.id == master_rid && rel.rel_type == rel_type::SLIDE_MASTER)
        else {
            log::warn!("Slide master relationship '{}' not found", master_rid);
            continue;
        };
        let master_part = resolve_target(PRESENTATION_PART, &rel.target);
        let master = package.part_str(&master_part)?;
        let master_rels = package.relationships(&master_part)?;

        for layout_rid in id_list(&master, b"sldLayoutId")? {
            let Some(rel) = master_rels
                .iter()
                .find(|rel| rel.id == layout_rid && rel.rel_type == rel_type::SLIDE_LAYOUT)
            else {
                log::warn!(
                    "Layout relationship '{}' of '{}' not found",
                    layout_rid,
                    master_part
                );
                continue;
            };
            let layout_part = resolve_target(&master_part, &rel.target);
            let xml = package.part_str(&layout_part)?;
            layouts.push(SlideLayout::parse(&layout_part, &xml)?);
        }
    }

    log::debug!("Discovered {} slide layout(s)", layouts.len());
    Ok(layouts)
}

/// The `r:id` values of every `element` entry, in document order.
pub(crate) fn id_list(xml: &str, element: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == element =>
            {
                let rid = e
                    .attributes()
                    .flatten()
                    .find(|attr| {
                        let key = attr.key.as_ref();
                        key != b"id" && local_name(key) == b"id"
                    })
                    .map(|attr| String::from_utf8_lossy(&attr.value).into_owned());
                if let Some(rid) = rid {
                    ids.push(rid);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("Error reading id list: {}", e))),
            _ => {}
        }
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_blank_layouts() {
        let layouts = discover_layouts(&Package::blank()).unwrap();
        let names: Vec<_> = layouts.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Title Slide", "Title and Content", "Section Header", "Two Content"]
        );
        assert_eq!(layouts[1].part_name, "ppt/slideLayouts/slideLayout2.xml");
    }

    #[test]
    fn test_placeholder_defaults() {
        let layouts = discover_layouts(&Package::blank()).unwrap();

        let title = &layouts[0];
        assert_eq!(title.placeholders[0].kind, PlaceholderKind::CenterTitle);
        assert_eq!(title.placeholders[0].idx, 0);
        let subtitle = title.placeholder(1).unwrap();
        assert_eq!(subtitle.kind, PlaceholderKind::Subtitle);
        assert!(subtitle.has_text_body);

        // `<p:ph idx="1"/>` has the implicit object type.
        let content = &layouts[1];
        assert_eq!(content.placeholder(1).unwrap().kind, PlaceholderKind::Object);
        assert_eq!(content.placeholder(1).unwrap().name, "Content Placeholder 2");
    }

    #[test]
    fn test_id_list_skips_plain_id() {
        let xml = r#"<p:presentation xmlns:p="urn:p" xmlns:r="urn:r"><p:sldIdLst><p:sldId id="256" r:id="rId9"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst></p:presentation>"#;
        assert_eq!(id_list(xml, b"sldId").unwrap(), vec!["rId9", "rId3"]);
    }
}
