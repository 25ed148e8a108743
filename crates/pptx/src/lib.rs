//! PowerPoint (Office Open XML) presentation writer.
//!
//! A `.pptx` file is a ZIP archive of XML parts. This crate loads a template
//! package, discovers its slide layouts, builds slides in memory, and writes
//! the archive back out. [`DeckInspector`] reads the text outline of a file.

pub mod inspect;
pub mod layout;
pub mod markup;
pub mod package;
pub mod presentation;
pub mod slide;
pub mod text;

pub use inspect::{DeckInspector, Outline, OutlineParagraph, OutlineShape, OutlineSlide};
pub use layout::{discover_layouts, PlaceholderSpec, SlideLayout};
pub use markup::Element;
pub use package::Package;
pub use presentation::Presentation;
pub use slide::{Emu, Geometry, Placeholder, PlaceholderKind, Shape, ShapeId, Slide};
pub use text::{Bullet, Font, Paragraph, Run, TextFrame};
