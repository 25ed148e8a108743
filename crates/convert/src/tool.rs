//! Tool invocation: parameters in, messages out.

use mdpptx_core::Result;
use mdpptx_pptx::Presentation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::assemble::Assembler;
use crate::options::ConvertOptions;

/// MIME type of the generated file.
pub const PPTX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Theme name that selects the built-in blank template.
pub const DEFAULT_THEME: &str = "default";

fn default_title() -> String {
    "Presentation".to_string()
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

/// Input parameters of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameters {
    /// Markdown source.
    #[serde(default)]
    pub markdown_content: String,

    /// Deck title; also names the output file.
    #[serde(default = "default_title")]
    pub title: String,

    /// Template name, looked up as `{theme}.pptx`.
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for ToolParameters {
    fn default() -> Self {
        Self {
            markdown_content: String::new(),
            title: default_title(),
            theme: default_theme(),
        }
    }
}

/// Metadata attached to a blob message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobMeta {
    pub mime_type: String,
    pub filename: String,
}

/// A message produced by an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolMessage {
    Text {
        text: String,
    },
    Blob {
        #[serde(skip)]
        blob: Vec<u8>,
        meta: BlobMeta,
        size: usize,
    },
}

impl ToolMessage {
    pub fn text(text: impl Into<String>) -> Self {
        ToolMessage::Text { text: text.into() }
    }

    pub fn blob(blob: Vec<u8>, mime_type: &str, filename: impl Into<String>) -> Self {
        ToolMessage::Blob {
            size: blob.len(),
            blob,
            meta: BlobMeta {
                mime_type: mime_type.to_string(),
                filename: filename.into(),
            },
        }
    }

    /// Text of a text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolMessage::Text { text } => Some(text),
            ToolMessage::Blob { .. } => None,
        }
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, ToolMessage::Blob { .. })
    }
}

/// Output file name for a deck title.
pub fn output_filename(title: &str) -> String {
    format!("{}.pptx", title.replace(' ', "_"))
}

/// Install root: the parent of the executable's directory.
pub fn default_template_root() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent()?.parent().map(Path::to_path_buf)
}

/// The Markdown to PowerPoint tool.
#[derive(Debug, Clone, Default)]
pub struct MarkdownToPptx {
    template_root: Option<PathBuf>,
    assembler: Assembler,
}

impl MarkdownToPptx {
    pub fn new(options: &ConvertOptions) -> Self {
        Self {
            template_root: options.template_root.clone(),
            assembler: Assembler::new(options),
        }
    }

    /// Run one conversion. Never fails; errors become text messages.
    pub fn invoke(&self, params: &ToolParameters) -> Vec<ToolMessage> {
        if params.markdown_content.is_empty() {
            return vec![ToolMessage::text("No markdown content provided.")];
        }

        match self.generate(params) {
            Ok(bytes) => {
                log::debug!("Generated {} bytes for '{}'", bytes.len(), params.title);
                vec![
                    ToolMessage::text(format!(
                        "PowerPoint presentation '{}' generated successfully",
                        params.title
                    )),
                    ToolMessage::blob(bytes, PPTX_MIME_TYPE, output_filename(&params.title)),
                ]
            }
            Err(e) => {
                log::warn!("Conversion failed: {}", e);
                vec![ToolMessage::text(format!(
                    "Error converting markdown to PPTX: {}",
                    e
                ))]
            }
        }
    }

    /// Convert to `.pptx` bytes.
    pub fn generate(&self, params: &ToolParameters) -> Result<Vec<u8>> {
        let presentation = self.load_template(&params.theme)?;
        self.assembler
            .convert(&params.markdown_content, &params.title, presentation)
    }

    /// Locate `{theme}.pptx` under `_assets/templates/`, then the root itself.
    pub fn find_theme(&self, theme: &str) -> Option<PathBuf> {
        let root = self.template_root.clone().or_else(default_template_root)?;
        let file_name = format!("{}.pptx", theme);
        [root.join("_assets").join("templates"), root]
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
    }

    /// The template for a theme, or the blank presentation.
    fn load_template(&self, theme: &str) -> Result<Presentation> {
        if theme == DEFAULT_THEME {
            return Presentation::blank();
        }

        match self.find_theme(theme) {
            Some(path) => match Presentation::open(&path) {
                Ok(presentation) => {
                    log::debug!("Using template {}", path.display());
                    Ok(presentation)
                }
                Err(e) => {
                    log::warn!(
                        "Failed to load template {}: {}; using default",
                        path.display(),
                        e
                    );
                    Presentation::blank()
                }
            },
            None => {
                log::warn!("Theme '{}' not found; using default", theme);
                Presentation::blank()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpptx_pptx::DeckInspector;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn params(markdown: &str) -> ToolParameters {
        ToolParameters {
            markdown_content: markdown.to_string(),
            ..ToolParameters::default()
        }
    }

    fn tool_with_root(root: &Path) -> MarkdownToPptx {
        MarkdownToPptx::new(&ConvertOptions {
            template_root: Some(root.to_path_buf()),
            ..ConvertOptions::default()
        })
    }

    /// A template that already carries two slides.
    fn write_template(path: &Path) {
        let mut presentation = Presentation::blank().unwrap();
        for _ in 0..2 {
            let slide = presentation.add_slide(1).unwrap();
            slide
                .title_mut()
                .unwrap()
                .text_frame_mut()
                .set_text("Old slide")
                .unwrap();
        }
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, presentation.to_bytes().unwrap()).unwrap();
    }

    fn blob_bytes(messages: &[ToolMessage]) -> &[u8] {
        messages
            .iter()
            .find_map(|m| match m {
                ToolMessage::Blob { blob, .. } => Some(blob.as_slice()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_parameter_defaults() {
        let parsed: ToolParameters =
            serde_json::from_str(r#"{"markdown_content": "x"}"#).unwrap();
        assert_eq!(parsed.title, "Presentation");
        assert_eq!(parsed.theme, "default");
    }

    #[test]
    fn test_empty_content_message() {
        let messages = MarkdownToPptx::default().invoke(&params(""));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].as_text(), Some("No markdown content provided."));
        assert!(!messages.iter().any(ToolMessage::is_blob));
    }

    #[test]
    fn test_success_messages() {
        let mut p = params("# Hello\n\nWorld\n");
        p.title = "Quarterly Review".to_string();
        let messages = MarkdownToPptx::default().invoke(&p);

        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0].as_text(),
            Some("PowerPoint presentation 'Quarterly Review' generated successfully")
        );
        match &messages[1] {
            ToolMessage::Blob { blob, meta, size } => {
                assert_eq!(meta.mime_type, PPTX_MIME_TYPE);
                assert_eq!(meta.filename, "Quarterly_Review.pptx");
                assert_eq!(*size, blob.len());
                assert!(blob.starts_with(b"PK"));
            }
            other => panic!("expected blob, got {:?}", other),
        }
    }

    #[test]
    fn test_error_message() {
        let messages = MarkdownToPptx::default().invoke(&params("# Ba\u{1}d\n"));
        assert_eq!(messages.len(), 1);
        let text = messages[0].as_text().unwrap();
        assert!(text.starts_with("Error converting markdown to PPTX: "));
    }

    #[test]
    fn test_blob_json_omits_bytes() {
        let message = ToolMessage::blob(vec![1, 2, 3], PPTX_MIME_TYPE, "a.pptx");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "blob");
        assert_eq!(json["size"], 3);
        assert_eq!(json["meta"]["filename"], "a.pptx");
        assert!(json.get("blob").is_none());
    }

    #[test]
    fn test_theme_lookup_order() {
        let root = TempDir::new().unwrap();
        let tool = tool_with_root(root.path());
        assert!(tool.find_theme("corporate").is_none());

        let fallback = root.path().join("corporate.pptx");
        write_template(&fallback);
        assert_eq!(tool.find_theme("corporate"), Some(fallback));

        let preferred = root.path().join("_assets").join("templates").join("corporate.pptx");
        write_template(&preferred);
        assert_eq!(tool.find_theme("corporate"), Some(preferred));
    }

    #[test]
    fn test_theme_template_slides_discarded() {
        let root = TempDir::new().unwrap();
        write_template(&root.path().join("_assets").join("templates").join("corporate.pptx"));
        let tool = tool_with_root(root.path());

        let mut p = params("## Only\n\ntext\n");
        p.theme = "corporate".to_string();
        let messages = tool.invoke(&p);
        assert_eq!(messages.len(), 2);

        let outline = DeckInspector::new()
            .inspect(Cursor::new(blob_bytes(&messages).to_vec()))
            .unwrap();
        assert_eq!(outline.slide_count(), 2);
        assert!(!outline.to_text().contains("Old slide"));
    }

    #[test]
    fn test_unreadable_theme_falls_back_to_blank() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("broken.pptx"), b"not a zip").unwrap();
        let tool = tool_with_root(root.path());

        for theme in ["broken", "missing"] {
            let mut p = params("# A\n");
            p.theme = theme.to_string();
            let messages = tool.invoke(&p);
            assert_eq!(messages.len(), 2, "theme {}", theme);
            assert!(messages[1].is_blob());
        }
    }
}
