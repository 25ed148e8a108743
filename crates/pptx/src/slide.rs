//! Slides and their shapes.

use quick_xml::escape::escape;

use crate::layout::SlideLayout;
use crate::text::TextFrame;

/// English Metric Units; 914400 per inch.
pub type Emu = i64;

/// EMUs per inch.
pub const EMU_PER_INCH: Emu = 914_400;

/// Shape identifier, unique within a slide.
pub type ShapeId = u32;

/// Position and size of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: Emu,
    pub y: Emu,
    pub cx: Emu,
    pub cy: Emu,
}

impl Geometry {
    /// Geometry given in inches.
    pub fn inches(x: f64, y: f64, width: f64, height: f64) -> Self {
        let emu = |v: f64| (v * EMU_PER_INCH as f64).round() as Emu;
        Self {
            x: emu(x),
            y: emu(y),
            cx: emu(width),
            cy: emu(height),
        }
    }
}

/// Placeholder type, from the `type` attribute of `p:ph`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderKind {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    Object,
    Date,
    Footer,
    SlideNumber,
    Other(String),
}

impl PlaceholderKind {
    pub fn from_attr(value: &str) -> Self {
        match value {
            "title" => PlaceholderKind::Title,
            "ctrTitle" => PlaceholderKind::CenterTitle,
            "subTitle" => PlaceholderKind::Subtitle,
            "body" => PlaceholderKind::Body,
            "obj" => PlaceholderKind::Object,
            "dt" => PlaceholderKind::Date,
            "ftr" => PlaceholderKind::Footer,
            "sldNum" => PlaceholderKind::SlideNumber,
            other => PlaceholderKind::Other(other.to_string()),
        }
    }

    pub fn as_attr(&self) -> &str {
        match self {
            PlaceholderKind::Title => "title",
            PlaceholderKind::CenterTitle => "ctrTitle",
            PlaceholderKind::Subtitle => "subTitle",
            PlaceholderKind::Body => "body",
            PlaceholderKind::Object => "obj",
            PlaceholderKind::Date => "dt",
            PlaceholderKind::Footer => "ftr",
            PlaceholderKind::SlideNumber => "sldNum",
            PlaceholderKind::Other(value) => value,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, PlaceholderKind::Title | PlaceholderKind::CenterTitle)
    }

    /// Footer-area placeholders are not copied onto new slides.
    fn is_footer_area(&self) -> bool {
        matches!(
            self,
            PlaceholderKind::Date | PlaceholderKind::Footer | PlaceholderKind::SlideNumber
        )
    }

    fn label(&self) -> &str {
        match self {
            PlaceholderKind::Title | PlaceholderKind::CenterTitle => "Title",
            PlaceholderKind::Subtitle => "Subtitle",
            PlaceholderKind::Body => "Text Placeholder",
            _ => "Content Placeholder",
        }
    }
}

/// Placeholder identity of a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    pub idx: u32,
}

/// A text-bearing shape: a layout placeholder or a free text box.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: ShapeId,
    name: String,
    placeholder: Option<Placeholder>,
    geometry: Option<Geometry>,
    text_frame: TextFrame,
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn placeholder(&self) -> Option<&Placeholder> {
        self.placeholder.as_ref()
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    /// Explicit geometry; placeholders inherit theirs from the layout.
    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    pub fn text_frame(&self) -> &TextFrame {
        &self.text_frame
    }

    pub fn text_frame_mut(&mut self) -> &mut TextFrame {
        &mut self.text_frame
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<p:sp><p:nvSpPr>");
        out.push_str(&format!(
            r#"<p:cNvPr id="{}" name="{}"/>"#,
            self.id,
            escape(self.name.as_str())
        ));

        match &self.placeholder {
            Some(ph) => {
                out.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph"#);
                if ph.kind != PlaceholderKind::Object {
                    out.push_str(&format!(r#" type="{}""#, escape(ph.kind.as_attr())));
                }
                if ph.idx != 0 {
                    out.push_str(&format!(r#" idx="{}""#, ph.idx));
                }
                out.push_str("/></p:nvPr>");
            }
            None => out.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/>"#),
        }
        out.push_str("</p:nvSpPr>");

        match self.geometry {
            Some(g) => {
                out.push_str(&format!(
                    r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
                    g.x, g.y, g.cx, g.cy
                ));
                out.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                if self.placeholder.is_none() {
                    out.push_str("<a:noFill/>");
                }
                out.push_str("</p:spPr>");
            }
            None => out.push_str("<p:spPr/>"),
        }

        self.text_frame.write_xml(self.placeholder.is_none(), out);
        out.push_str("</p:sp>");
    }
}

/// A slide built on a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    layout_part: String,
    layout_name: String,
    shapes: Vec<Shape>,
}

impl Slide {
    /// New slide carrying the layout's content placeholders, empty.
    pub fn from_layout(layout: &SlideLayout) -> Self {
        let mut shapes = Vec::new();
        for spec in &layout.placeholders {
            if spec.kind.is_footer_area() {
                continue;
            }
            let id = shapes.len() as ShapeId + 2;
            let name = if spec.name.is_empty() {
                format!("{} {}", spec.kind.label(), id - 1)
            } else {
                spec.name.clone()
            };
            shapes.push(Shape {
                id,
                name,
                placeholder: Some(Placeholder {
                    kind: spec.kind.clone(),
                    idx: spec.idx,
                }),
                geometry: None,
                text_frame: TextFrame::new(true),
            });
        }

        Self {
            layout_part: layout.part_name.clone(),
            layout_name: layout.name.clone(),
            shapes,
        }
    }

    /// Part name of the layout this slide uses.
    pub fn layout_part(&self) -> &str {
        &self.layout_part
    }

    pub fn layout_name(&self) -> &str {
        &self.layout_name
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Placeholder shapes in document order.
    pub fn placeholders(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(|s| s.is_placeholder())
    }

    /// The placeholder with the given index.
    pub fn placeholder(&self, idx: u32) -> Option<&Shape> {
        self.shapes
            .iter()
            .find(|s| s.placeholder.as_ref().is_some_and(|ph| ph.idx == idx))
    }

    /// The title placeholder.
    pub fn title(&self) -> Option<&Shape> {
        self.shapes
            .iter()
            .find(|s| s.placeholder.as_ref().is_some_and(|ph| ph.kind.is_title()))
    }

    pub fn title_mut(&mut self) -> Option<&mut Shape> {
        self.shapes
            .iter_mut()
            .find(|s| s.placeholder.as_ref().is_some_and(|ph| ph.kind.is_title()))
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    /// Add a word-wrapped text box.
    pub fn add_textbox(&mut self, geometry: Geometry) -> &mut Shape {
        let id = self.shapes.iter().map(|s| s.id).max().unwrap_or(1) + 1;
        let mut text_frame = TextFrame::new(false);
        text_frame.set_word_wrap(true);
        self.shapes.push(Shape {
            id,
            name: format!("TextBox {}", id - 1),
            placeholder: None,
            geometry: Some(geometry),
            text_frame,
        });
        let index = self.shapes.len() - 1;
        &mut self.shapes[index]
    }

    /// Serialize the slide part.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(2048);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        out.push_str(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
        );
        out.push_str("<p:cSld><p:spTree>");
        out.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
        out.push_str(
            r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
        );
        for shape in &self.shapes {
            shape.write_xml(&mut out);
        }
        out.push_str("</p:spTree></p:cSld>");
        out.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
        out
    }
}
