//! Conversion options.

use mdpptx_core::PreamblePolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How ordered list items are numbered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberingStyle {
    /// Literal `"1. "` prefixes in the text; bullets suppressed.
    #[default]
    Prefix,
    /// PowerPoint auto-numbering; text left unprefixed.
    AutoNumber,
}

/// Options for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Ordered list numbering.
    pub numbering: NumberingStyle,

    /// Content before the first heading in heading-driven mode.
    pub preamble: PreamblePolicy,

    /// Directory searched for theme templates. Defaults to the install root.
    pub template_root: Option<PathBuf>,
}
