//! OPC package access: parts, relationships, and content types.

use mdpptx_core::{Error, Result};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::io::{Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Part name of the content types stream.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Largest up-front buffer reserved for a single part.
const MAX_CAPACITY_HINT: usize = 1 << 20;

/// Buffer size to reserve for a part whose header declares `declared` bytes.
fn capacity_hint(declared: u64) -> usize {
    usize::try_from(declared)
        .unwrap_or(MAX_CAPACITY_HINT)
        .min(MAX_CAPACITY_HINT)
}

/// Relationship type URIs.
pub mod rel_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
}

/// Content type URIs.
pub mod content_type {
    pub const SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const NOTES_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";
}

/// A ZIP-backed OPC package held in memory.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: BTreeMap<String, Vec<u8>>,
}

macro_rules! resource {
    ($path:literal) => {
        (
            $path,
            include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/", $path)) as &[u8],
        )
    };
}

/// Parts of the built-in blank presentation.
const BLANK_PARTS: &[(&str, &[u8])] = &[
    resource!("[Content_Types].xml"),
    resource!("_rels/.rels"),
    resource!("docProps/app.xml"),
    resource!("docProps/core.xml"),
    resource!("ppt/presentation.xml"),
    resource!("ppt/_rels/presentation.xml.rels"),
    resource!("ppt/presProps.xml"),
    resource!("ppt/viewProps.xml"),
    resource!("ppt/tableStyles.xml"),
    resource!("ppt/theme/theme1.xml"),
    resource!("ppt/slideMasters/slideMaster1.xml"),
    resource!("ppt/slideMasters/_rels/slideMaster1.xml.rels"),
    resource!("ppt/slideLayouts/slideLayout1.xml"),
    resource!("ppt/slideLayouts/_rels/slideLayout1.xml.rels"),
    resource!("ppt/slideLayouts/slideLayout2.xml"),
    resource!("ppt/slideLayouts/_rels/slideLayout2.xml.rels"),
    resource!("ppt/slideLayouts/slideLayout3.xml"),
    resource!("ppt/slideLayouts/_rels/slideLayout3.xml.rels"),
    resource!("ppt/slideLayouts/slideLayout4.xml"),
    resource!("ppt/slideLayouts/_rels/slideLayout4.xml.rels"),
];

impl Package {
    /// The built-in blank presentation package.
    pub fn blank() -> Self {
        let parts = BLANK_PARTS
            .iter()
            .map(|(name, data)| (name.to_string(), data.to_vec()))
            .collect();
        Self { parts }
    }

    /// Read every part of a ZIP archive into memory.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = BTreeMap::new();
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", index, e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut data = Vec::with_capacity(capacity_hint(file.size()));
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
            parts.insert(name, data);
        }

        if !parts.contains_key(CONTENT_TYPES_PART) {
            return Err(Error::TemplateError(
                "Not an OPC package: missing [Content_Types].xml".to_string(),
            ));
        }
        Ok(Self { parts })
    }

    /// Raw bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    /// A part decoded as UTF-8 text.
    pub fn part_str(&self, name: &str) -> Result<String> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))?;
        String::from_utf8(data.to_vec())
            .map_err(|e| Error::XmlError(format!("Part '{}' is not UTF-8: {}", name, e)))
    }

    /// Whether a part exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    /// Insert or replace a part.
    pub fn set_part(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.parts.insert(name.into(), data.into());
    }

    /// Remove every part whose name starts with `prefix`. Returns the
    /// removed names.
    pub fn remove_prefix(&mut self, prefix: &str) -> Vec<String> {
        let names: Vec<String> = self
            .parts
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect();
        for name in &names {
            self.parts.remove(name);
        }
        names
    }

    /// All part names, sorted.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// Relationships of a part; empty if it has none.
    pub fn relationships(&self, part: &str) -> Result<Vec<Relationship>> {
        let rels = rels_part_for(part);
        if !self.contains(&rels) {
            return Ok(Vec::new());
        }
        parse_relationships(&self.part_str(&rels)?)
    }

    /// Write the package as a ZIP archive, content types first.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let ordered = self
            .parts
            .iter()
            .filter(|(name, _)| name.as_str() == CONTENT_TYPES_PART)
            .chain(
                self.parts
                    .iter()
                    .filter(|(name, _)| name.as_str() != CONTENT_TYPES_PART),
            );

        for (name, data) in ordered {
            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
            zip.write_all(data)?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish ZIP: {}", e)))?;
        Ok(())
    }
}

/// One relationship from a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// An internal relationship.
    pub fn new(id: impl Into<String>, rel_type: &str, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.to_string(),
            target: target.into(),
            external: false,
        }
    }
}

/// Parse a relationships part.
pub fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut relationships = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut rel = Relationship::new(String::new(), "", String::new());
                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                    match attr.key.as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        b"TargetMode" => rel.external = value == "External",
                        _ => {}
                    }
                }
                relationships.push(rel);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(relationships)
}

/// Serialize a relationships part.
pub fn write_relationships(relationships: &[Relationship]) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    );
    for rel in relationships {
        out.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}""#,
            escape(rel.id.as_str()),
            escape(rel.rel_type.as_str()),
            escape(rel.target.as_str())
        ));
        if rel.external {
            out.push_str(r#" TargetMode="External""#);
        }
        out.push_str("/>");
    }
    out.push_str("</Relationships>");
    out
}

/// First `rIdN` not used by any of the relationships.
pub fn next_relationship_id(relationships: &[Relationship]) -> u32 {
    relationships
        .iter()
        .filter_map(|rel| rel.id.strip_prefix("rId")?.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
        + 1
}

/// The `.rels` part holding the relationships of `part`.
pub fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None if part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns it.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Relative target from one part to another.
pub fn relative_target(from_part: &str, to_part: &str) -> String {
    let from_dir: Vec<&str> = match from_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let to: Vec<&str> = to_part.split('/').collect();

    let common = from_dir
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = vec![".."; from_dir.len() - common];
    segments.extend(&to[common..]);
    segments.join("/")
}

/// Parsed `[Content_Types].xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Parse the content types part.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut types = Self::default();

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    let kind = local_name(name.as_ref()).to_vec();
                    if kind != b"Default" && kind != b"Override" {
                        continue;
                    }
                    let mut key = String::new();
                    let mut value = String::new();
                    for attr in e.attributes().flatten() {
                        let text = String::from_utf8_lossy(&attr.value).to_string();
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => key = text,
                            b"ContentType" => value = text,
                            _ => {}
                        }
                    }
                    if kind == b"Default" {
                        types.defaults.push((key, value));
                    } else {
                        types.overrides.push((key, value));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing content types: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(types)
    }

    /// Content type registered for a part, by override or extension.
    pub fn get(&self, part: &str) -> Option<&str> {
        let part_name = format!("/{}", part.trim_start_matches('/'));
        self.overrides
            .iter()
            .find(|(name, _)| *name == part_name)
            .or_else(|| {
                let extension = part.rsplit_once('.')?.1;
                self.defaults
                    .iter()
                    .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            })
            .map(|(_, value)| value.as_str())
    }

    /// Register an override, replacing an existing one for the same part.
    pub fn set_override(&mut self, part: &str, content_type: &str) {
        let part_name = format!("/{}", part.trim_start_matches('/'));
        match self.overrides.iter_mut().find(|(name, _)| *name == part_name) {
            Some(slot) => slot.1 = content_type.to_string(),
            None => self.overrides.push((part_name, content_type.to_string())),
        }
    }

    /// Drop every override with the given content type.
    pub fn remove_content_type(&mut self, content_type: &str) {
        self.overrides.retain(|(_, value)| value != content_type);
    }

    /// Serialize back to XML.
    pub fn to_xml(&self) -> String {
        let mut out = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
        );
        for (extension, value) in &self.defaults {
            out.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape(extension.as_str()),
                escape(value.as_str())
            ));
        }
        for (part, value) in &self.overrides {
            out.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape(part.as_str()),
                escape(value.as_str())
            ));
        }
        out.push_str("</Types>");
        out
    }
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Value of an attribute on a start tag, by local name.
pub(crate) fn attr_value(start: &quick_xml::events::BytesStart<'_>, key: &[u8]) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|attr| local_name(attr.key.as_ref()) == key)
        .map(|attr| {
            attr.unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
        })
}
