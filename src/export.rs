//! Export of OCR results as a DOCX document or a Markdown report.
//!
//! Both formats share one layout: the title "Arabic OCR Results", the
//! original Arabic text, then the translation and the transliteration when
//! they are non-empty. [`export_report`] picks the format from the target
//! extension and writes atomically.

use crate::error::OcrError;
use docx_rs::{AlignmentType, Docx, Paragraph, Run, RunFonts, Style, StyleType};
use std::io::Cursor;
use std::path::Path;
use tracing::info;

const TITLE: &str = "Arabic OCR Results";
const ARABIC_HEADING: &str = "Original Arabic Text";
const TRANSLATION_HEADING: &str = "English Translation";
const TRANSLITERATION_HEADING: &str = "Latin Transliteration";

/// Output format of an exported report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Docx,
    Markdown,
}

impl ExportFormat {
    /// `.md` / `.markdown` give Markdown; everything else is DOCX.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("md") | Some("markdown") => ExportFormat::Markdown,
            _ => ExportFormat::Docx,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Markdown => "md",
        }
    }
}

/// Trimmed Arabic text, or `MissingText` when there is none.
fn required_arabic(arabic: &str) -> Result<&str, OcrError> {
    let arabic = arabic.trim();
    if arabic.is_empty() {
        return Err(OcrError::MissingText { what: "Arabic text" });
    }
    Ok(arabic)
}

fn non_empty(section: Option<&str>) -> Option<&str> {
    section.map(str::trim).filter(|s| !s.is_empty())
}

/// Build the Markdown report.
///
/// The Arabic text sits in an RTL `<div>` so Markdown renderers lay it out
/// right-to-left. Empty translation or transliteration sections are omitted.
pub fn render_report(
    arabic: &str,
    translation: Option<&str>,
    transliteration: Option<&str>,
) -> Result<String, OcrError> {
    let arabic = required_arabic(arabic)?;

    let mut out = format!("# {TITLE}\n\n## {ARABIC_HEADING}\n\n<div dir=\"rtl\">\n\n");
    out.push_str(arabic);
    out.push_str("\n\n</div>\n");

    let sections = [
        (TRANSLATION_HEADING, translation),
        (TRANSLITERATION_HEADING, transliteration),
    ];
    for (title, body) in sections {
        if let Some(body) = non_empty(body) {
            out.push_str(&format!("\n## {title}\n\n{body}\n"));
        }
    }
    Ok(out)
}

// ── DOCX ─────────────────────────────────────────────────────────────────────

const STYLE_TITLE: &str = "Title";
const STYLE_HEADING: &str = "SectionHeading";
const STYLE_ARABIC: &str = "Arabic";
const STYLE_ENGLISH: &str = "English";
const STYLE_TRANSLITERATION: &str = "Transliteration";

fn fonts(name: &str) -> RunFonts {
    RunFonts::new().ascii(name).hi_ansi(name).cs(name)
}

/// Paragraph styles. Sizes are in half-points.
fn with_styles(docx: Docx) -> Docx {
    docx.add_style(
        Style::new(STYLE_TITLE, StyleType::Paragraph)
            .name("Title")
            .size(52)
            .bold()
            .align(AlignmentType::Center),
    )
    .add_style(
        Style::new(STYLE_HEADING, StyleType::Paragraph)
            .name("Section Heading")
            .fonts(fonts("Arial"))
            .size(32)
            .bold()
            .color("000080")
            .align(AlignmentType::Center),
    )
    .add_style(
        Style::new(STYLE_ARABIC, StyleType::Paragraph)
            .name("Arabic")
            .fonts(fonts("Arial"))
            .size(28)
            .bold()
            .align(AlignmentType::Right),
    )
    .add_style(
        Style::new(STYLE_ENGLISH, StyleType::Paragraph)
            .name("English")
            .fonts(fonts("Times New Roman"))
            .size(24)
            .align(AlignmentType::Left),
    )
    .add_style(
        Style::new(STYLE_TRANSLITERATION, StyleType::Paragraph)
            .name("Transliteration")
            .fonts(fonts("Courier New"))
            .size(24)
            .italic()
            .align(AlignmentType::Left),
    )
}

fn paragraph(text: &str, style: &str, align: AlignmentType) -> Paragraph {
    Paragraph::new()
        .style(style)
        .align(align)
        .add_run(Run::new().add_text(text))
}

/// One paragraph per line; blank lines stay as empty paragraphs.
fn add_lines(mut docx: Docx, text: &str, style: &str, align: AlignmentType) -> Docx {
    for line in text.split('\n') {
        docx = if line.trim().is_empty() {
            docx.add_paragraph(Paragraph::new())
        } else {
            docx.add_paragraph(paragraph(line, style, align))
        };
    }
    docx
}

/// Build the DOCX document and return the packed archive.
///
/// Arabic lines are right-aligned; translation and transliteration lines
/// are left-aligned. Empty optional sections are omitted.
pub fn render_docx(
    arabic: &str,
    translation: Option<&str>,
    transliteration: Option<&str>,
) -> Result<Vec<u8>, OcrError> {
    let arabic = required_arabic(arabic)?;

    let mut docx = with_styles(Docx::new())
        .add_paragraph(paragraph(TITLE, STYLE_TITLE, AlignmentType::Center))
        .add_paragraph(paragraph(ARABIC_HEADING, STYLE_HEADING, AlignmentType::Center));
    docx = add_lines(docx, arabic, STYLE_ARABIC, AlignmentType::Right);

    let sections = [
        (TRANSLATION_HEADING, STYLE_ENGLISH, translation),
        (TRANSLITERATION_HEADING, STYLE_TRANSLITERATION, transliteration),
    ];
    for (heading, style, body) in sections {
        if let Some(body) = non_empty(body) {
            docx = docx.add_paragraph(paragraph(heading, STYLE_HEADING, AlignmentType::Center));
            docx = add_lines(docx, body, style, AlignmentType::Left);
        }
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| OcrError::Internal(format!("Cannot pack DOCX archive: {e}")))?;
    Ok(buf.into_inner())
}

/// Write the report to `path` atomically (temp file + rename).
///
/// The format follows the extension of `path`; see [`ExportFormat::from_path`].
pub async fn export_report(
    path: impl AsRef<Path>,
    arabic: &str,
    translation: Option<&str>,
    transliteration: Option<&str>,
) -> Result<ExportFormat, OcrError> {
    let path = path.as_ref();
    let format = ExportFormat::from_path(path);
    let bytes = match format {
        ExportFormat::Docx => render_docx(arabic, translation, transliteration)?,
        ExportFormat::Markdown => render_report(arabic, translation, transliteration)?.into_bytes(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| OcrError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension(format!("{}.tmp", format.extension()));
    tokio::fs::write(&tmp_path, &bytes)
        .await
        .map_err(|e| OcrError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| OcrError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!("Report written to {} ({:?})", path.display(), format);
    Ok(format)
}
