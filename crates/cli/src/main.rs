//! CLI tool for converting Markdown files to PowerPoint presentations.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use mdpptx_convert::{ConvertOptions, MarkdownToPptx, NumberingStyle, ToolMessage, ToolParameters};
use mdpptx_core::PreamblePolicy;
use mdpptx_pptx::DeckInspector;
use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Convert Markdown into a PowerPoint deck.
#[derive(Parser, Debug)]
#[command(name = "md2pptx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input Markdown file, or `-` for stdin
    input: PathBuf,

    /// Deck title (default: input file name)
    #[arg(short, long)]
    title: Option<String>,

    /// Template name, looked up as `{theme}.pptx`
    #[arg(long, default_value = "default")]
    theme: String,

    /// Directory searched for theme templates
    #[arg(long)]
    template_root: Option<PathBuf>,

    /// Output directory (default: current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// How ordered list items are numbered
    #[arg(long, value_enum, default_value = "prefix")]
    numbering: Numbering,

    /// What to do with content before the first heading
    #[arg(long, value_enum, default_value = "drop")]
    preamble: Preamble,

    /// Print the tool messages as JSON
    #[arg(long)]
    json: bool,

    /// Print a text outline of the generated deck
    #[arg(long)]
    outline: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Numbering {
    Prefix,
    Auto,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Preamble {
    Drop,
    TitleSlide,
}

impl Args {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            numbering: match self.numbering {
                Numbering::Prefix => NumberingStyle::Prefix,
                Numbering::Auto => NumberingStyle::AutoNumber,
            },
            preamble: match self.preamble {
                Preamble::Drop => PreamblePolicy::Drop,
                Preamble::TitleSlide => PreamblePolicy::TitleSlide,
            },
            template_root: self.template_root.clone(),
        }
    }

    fn title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        if is_stdin(&self.input) {
            return ToolParameters::default().title;
        }
        self.input
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| ToolParameters::default().title)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let params = ToolParameters {
        markdown_content: read_input(&args.input)?,
        title: args.title(),
        theme: args.theme.clone(),
    };
    log::debug!("Converting '{}' with theme '{}'", params.title, params.theme);

    let messages = MarkdownToPptx::new(&args.options()).invoke(&params);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
    }

    let Some((blob, filename)) = messages.iter().find_map(|m| match m {
        ToolMessage::Blob { blob, meta, .. } => Some((blob, meta.filename.as_str())),
        ToolMessage::Text { .. } => None,
    }) else {
        let reason = messages
            .iter()
            .find_map(ToolMessage::as_text)
            .unwrap_or("no output produced");
        bail!("{}", reason);
    };

    let output_path = get_output_path(args.output.as_deref(), filename)?;
    write_output(&output_path, blob)?;

    if !args.json {
        for text in messages.iter().filter_map(ToolMessage::as_text) {
            eprintln!("{}", text);
        }
        eprintln!("Written to: {}", output_path.display());
    }

    if args.outline {
        let outline = DeckInspector::new()
            .inspect(Cursor::new(blob.as_slice()))
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        print!("{}", outline.to_text());
    }

    Ok(())
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read the Markdown source from a file or stdin.
fn read_input(path: &Path) -> Result<String> {
    let mut content = String::new();
    if is_stdin(path) {
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .read_to_string(&mut content)
            .with_context(|| format!("Failed to read {}", path.display()))?;
    }
    Ok(content)
}

/// Determine where the generated deck is written.
fn get_output_path(output_dir: Option<&Path>, filename: &str) -> Result<PathBuf> {
    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(filename)
        }
        None => PathBuf::from(filename),
    };

    Ok(output_path)
}

/// Write the deck to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
