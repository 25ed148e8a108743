//! Slide construction: layout choice, body container resolution, and the
//! fallback text box.

use mdpptx_core::segment::has_content;
use mdpptx_core::{Error, Node, Result, SegmentMode, SlideGroup, TitleSlide};
use mdpptx_pptx::{Geometry, PlaceholderKind, Presentation, ShapeId, Slide, TextFrame};

use crate::content::ContentRenderer;

/// What a slide is for, mapped to a layout index of the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutRole {
    Title,
    TitleAndContent,
    TitleAndTable,
}

impl LayoutRole {
    /// Pick the role for a slide group.
    pub fn for_group(group: &SlideGroup, mode: SegmentMode) -> Self {
        if mode == SegmentMode::Headings && group.heading_level() == Some(1) {
            LayoutRole::Title
        } else if group.has_table() {
            LayoutRole::TitleAndTable
        } else {
            LayoutRole::TitleAndContent
        }
    }

    /// Layout index for this role given how many layouts exist.
    pub fn layout_index(self, layout_count: usize) -> Result<usize> {
        if layout_count == 0 {
            return Err(Error::LayoutError(
                "Template defines no slide layouts".to_string(),
            ));
        }
        let index = match self {
            LayoutRole::Title => 0,
            LayoutRole::TitleAndTable if layout_count > 3 => 3,
            LayoutRole::TitleAndContent | LayoutRole::TitleAndTable if layout_count > 1 => 1,
            _ => 0,
        };
        Ok(index)
    }
}

/// Where a body goes when a slide has no usable container.
pub fn fallback_geometry() -> Geometry {
    Geometry::inches(1.0, 2.0, 8.0, 4.0)
}

/// Find the shape that should hold a slide's body.
///
/// In order: a body placeholder, placeholder 1, any non-title placeholder,
/// any non-title shape. `exclude` skips a shape already used (the subtitle).
pub fn find_body_shape(slide: &Slide, exclude: Option<ShapeId>) -> Option<ShapeId> {
    let candidates = || slide.shapes().iter().filter(move |s| Some(s.id()) != exclude);
    let is_title = |kind: &PlaceholderKind| kind.is_title();

    candidates()
        .find(|s| s.placeholder().is_some_and(|ph| ph.kind == PlaceholderKind::Body))
        .or_else(|| candidates().find(|s| s.placeholder().is_some_and(|ph| ph.idx == 1)))
        .or_else(|| candidates().find(|s| s.placeholder().is_some_and(|ph| !is_title(&ph.kind))))
        .or_else(|| candidates().find(|s| s.placeholder().map_or(true, |ph| !is_title(&ph.kind))))
        .map(|s| s.id())
}

/// Fill a slide's body container with `fill`.
///
/// If filling fails, a new text box at [`fallback_geometry`] is added and
/// filled instead. That retry happens once; a second failure is returned.
pub fn populate_with_retry<F>(slide: &mut Slide, exclude: Option<ShapeId>, mut fill: F) -> Result<ShapeId>
where
    F: FnMut(&mut TextFrame) -> Result<()>,
{
    let target = match find_body_shape(slide, exclude) {
        Some(id) => id,
        None => {
            log::debug!("No body container on slide; adding a text box");
            slide.add_textbox(fallback_geometry()).id()
        }
    };

    let frame = slide
        .shape_mut(target)
        .ok_or_else(|| Error::NoTextFrame(format!("shape {}", target)))?
        .text_frame_mut();

    match fill(frame) {
        Ok(()) => Ok(target),
        Err(e) => {
            log::warn!("Failed to populate slide body ({}); retrying in a text box", e);
            let shape = slide.add_textbox(fallback_geometry());
            let id = shape.id();
            fill(shape.text_frame_mut())?;
            Ok(id)
        }
    }
}

/// Turns a deck plan into slides.
#[derive(Debug, Clone, Default)]
pub struct SlideBuilder {
    renderer: ContentRenderer,
}

impl SlideBuilder {
    pub fn new(renderer: ContentRenderer) -> Self {
        Self { renderer }
    }

    /// Add the title slide.
    pub fn add_title_slide(&self, presentation: &mut Presentation, title_slide: &TitleSlide) -> Result<()> {
        let index = LayoutRole::Title.layout_index(presentation.layouts().len())?;
        let slide = presentation.add_slide(index)?;

        set_title(slide, &title_slide.title)?;

        let mut exclude = None;
        if let Some(subtitle) = &title_slide.subtitle {
            if slide.placeholders().count() > 1 {
                if let Some(id) = slide.placeholder(1).map(|s| s.id()) {
                    if let Some(shape) = slide.shape_mut(id) {
                        shape.text_frame_mut().set_text(subtitle)?;
                        exclude = Some(id);
                    }
                }
            } else {
                log::debug!("Title layout has no subtitle placeholder");
            }
        }

        self.populate(slide, exclude, &title_slide.body)
    }

    /// Add one content slide.
    pub fn add_group_slide(
        &self,
        presentation: &mut Presentation,
        group: &SlideGroup,
        mode: SegmentMode,
    ) -> Result<()> {
        let role = LayoutRole::for_group(group, mode);
        let index = role.layout_index(presentation.layouts().len())?;
        log::debug!("Slide '{}' uses {:?} layout (index {})", group.title(), role, index);

        let slide = presentation.add_slide(index)?;
        set_title(slide, group.title())?;
        self.populate(slide, None, &group.body)
    }

    fn populate(&self, slide: &mut Slide, exclude: Option<ShapeId>, body: &[Node]) -> Result<()> {
        if !has_content(body) {
            return Ok(());
        }
        populate_with_retry(slide, exclude, |frame| self.renderer.render(frame, body))?;
        Ok(())
    }
}

fn set_title(slide: &mut Slide, title: &str) -> Result<()> {
    match slide.title_mut() {
        Some(shape) => shape.text_frame_mut().set_text(title),
        None => {
            log::debug!("Layout '{}' has no title placeholder", slide.layout_name());
            Ok(())
        }
    }
}
