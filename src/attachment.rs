use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};

/// Returned as preview content for files that cannot be attached.
pub const UNSUPPORTED_FORMAT: &str = "Unsupported file format.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Docx,
    Unsupported,
}

impl FileKind {
    /// Classifies a file by its extension, case-insensitively.
    pub fn from_path(path: &Path) -> FileKind {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => FileKind::Csv,
            Some("docx") => FileKind::Docx,
            _ => FileKind::Unsupported,
        }
    }
}

/// Result of reading an attachment: the preview text and the file name to
/// store on the task. Only the name is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub content: String,
    pub file_name: Option<String>,
}

/// Reads an attachment for preview.
///
/// Unsupported types are not an error: the content is
/// [`UNSUPPORTED_FORMAT`] and no file name is returned.
pub fn parse_file(path: &Path) -> Result<Parsed> {
    let kind = FileKind::from_path(path);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());

    let content = match kind {
        FileKind::Csv => render_csv(csv::Reader::from_path(path)?)?,
        FileKind::Docx => render_docx(File::open(path)?)?,
        FileKind::Unsupported => {
            return Ok(Parsed {
                content: UNSUPPORTED_FORMAT.to_string(),
                file_name: None,
            })
        }
    };

    Ok(Parsed { content, file_name })
}

/// Renders CSV records as left-aligned, space-padded columns.
fn render_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<String> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    rows.push(reader.headers()?.iter().map(str::to_string).collect());
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|r| r.get(c))
                .map(|v| v.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(value, width)| format!("{:<width$}", value, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Extracts the body text of a DOCX archive, one line per paragraph.
fn render_docx<R: Read + Seek>(reader: R) -> Result<String> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let mut xml = String::new();
    archive.by_name("word/document.xml")?.read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    loop {
        match reader.read_event().map_err(|e| Error::Docx(e.to_string()))? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text = true,
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" => current.push('\n'),
                b"p" => paragraphs.push(String::new()),
                _ => {}
            },
            Event::Text(t) if in_text => {
                current.push_str(&t.unescape().map_err(|e| Error::Docx(e.to_string()))?);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(paragraphs.join("\n").trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn write_docx(path: &Path, body: &str) {
        let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
        zip.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#
        )
        .unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn classifies_by_extension() {
        assert_eq!(FileKind::from_path(Path::new("report.CSV")), FileKind::Csv);
        assert_eq!(FileKind::from_path(Path::new("notes.docx")), FileKind::Docx);
        assert_eq!(FileKind::from_path(Path::new("slides.pdf")), FileKind::Unsupported);
        assert_eq!(FileKind::from_path(Path::new("README")), FileKind::Unsupported);
    }

    #[test]
    fn unsupported_file_returns_sentinel_without_name() {
        let parsed = parse_file(Path::new("does-not-matter.pdf")).unwrap();
        assert_eq!(parsed.content, UNSUPPORTED_FORMAT);
        assert_eq!(parsed.file_name, None);
    }

    #[test]
    fn csv_preview_aligns_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("budget.csv");
        fs::write(&path, "item,cost\nlaptop,1200\npen,2\n").unwrap();

        let parsed = parse_file(&path).unwrap();
        assert_eq!(parsed.file_name.as_deref(), Some("budget.csv"));
        assert_eq!(parsed.content, "item    cost\nlaptop  1200\npen     2");
    }

    #[test]
    fn docx_preview_extracts_paragraph_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.docx");
        write_docx(
            &path,
            concat!(
                "<w:p><w:r><w:t>Quarterly </w:t></w:r><w:r><w:t>survey</w:t></w:r></w:p>",
                "<w:p/>",
                "<w:p><w:r><w:t>Q&amp;A</w:t><w:tab/><w:t>Friday</w:t></w:r></w:p>",
            ),
        );

        let parsed = parse_file(&path).unwrap();
        assert_eq!(parsed.file_name.as_deref(), Some("brief.docx"));
        assert_eq!(parsed.content, "Quarterly survey\n\nQ&A\tFriday");
    }

    #[test]
    fn docx_without_document_part_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.docx");
        let mut zip = zip::ZipWriter::new(fs::File::create(&path).unwrap());
        zip.start_file("word/styles.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"<w:styles/>").unwrap();
        zip.finish().unwrap();

        assert!(matches!(parse_file(&path), Err(Error::Zip(_))));
    }

    #[test]
    fn non_zip_docx_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renamed.docx");
        fs::write(&path, "plain text, not a zip").unwrap();
        assert!(matches!(parse_file(&path), Err(Error::Zip(_))));
        assert!(matches!(parse_file(&dir.path().join("missing.docx")), Err(Error::Io(_))));
    }

    #[test]
    fn missing_csv_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse_file(&dir.path().join("missing.csv")).is_err());
    }
}
