//! Core document model, metadata extraction, and slide segmentation
//! for Markdown to PowerPoint conversion.

pub mod classify;
pub mod error;
pub mod markdown;
pub mod metadata;
pub mod segment;
pub mod types;

pub use classify::{classify, Consumed, Element, ElementList, Role};
pub use error::{Error, Result};
pub use metadata::Metadata;
pub use segment::Segmenter;
pub use types::{DeckPlan, Heading, Node, PreamblePolicy, SegmentMode, SlideGroup, TitleSlide};
