//! Markdown to PowerPoint conversion.
//!
//! Pipeline: Markdown → deck plan (`mdpptx-core`) → slides built on a
//! template (`mdpptx-pptx`) → `.pptx` bytes, wrapped as tool messages.

pub mod assemble;
pub mod builder;
pub mod bullet;
pub mod content;
pub mod options;
pub mod tool;

pub use assemble::{convert, Assembler};
pub use builder::{find_body_shape, populate_with_retry, LayoutRole, SlideBuilder};
pub use bullet::{BulletFormatter, BulletTarget, ListKind};
pub use content::ContentRenderer;
pub use options::{ConvertOptions, NumberingStyle};
pub use tool::{MarkdownToPptx, ToolMessage, ToolParameters};
