use std::{
    io::{self, BufRead, BufReader, Read, Seek, Write},
    path::Path,
};

use quick_xml::{events::Event, Reader};
use tempfile::NamedTempFile;
use thiserror::Error;
use zip::{result::ZipError, ZipArchive};

const DOCUMENT_PART: &str = "word/document.xml";
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    CorruptDocument(String),

    #[error("Upload exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("I/O error while reading document: {0}")]
    Io(#[from] io::Error),
}

pub fn is_docx_filename(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".docx")
}

/// Reads the visible text of a `.docx` document, one paragraph per line.
pub fn extract_docx_text<R: Read + Seek>(mut reader: R) -> Result<String, ExtractError> {
    let mut magic = [0u8; 4];
    match reader.read_exact(&mut magic) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(ExtractError::UnsupportedFormat(
                "File is too short to be a .docx document".to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    }
    if &magic != ZIP_MAGIC {
        return Err(ExtractError::UnsupportedFormat(
            "File is not a .docx (zip) container".to_string(),
        ));
    }
    reader.rewind()?;

    let mut archive = ZipArchive::new(reader)
        .map_err(|e| ExtractError::CorruptDocument(format!("Unreadable .docx container: {}", e)))?;

    let part = match archive.by_name(DOCUMENT_PART) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => {
            return Err(ExtractError::CorruptDocument(format!(
                "Document has no {} part",
                DOCUMENT_PART
            )));
        }
        Err(e) => {
            return Err(ExtractError::CorruptDocument(format!(
                "Unreadable {} part: {}",
                DOCUMENT_PART, e
            )));
        }
    };

    paragraphs_from_xml(BufReader::new(part))
}

fn paragraphs_from_xml<R: BufRead>(source: R) -> Result<String, ExtractError> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    // w:p can nest through text boxes
    let mut open: Vec<String> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => open.push(String::new()),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" => push_to_open(&mut open, "\t"),
                b"br" | b"cr" => push_to_open(&mut open, "\n"),
                _ => {}
            },
            Ok(Event::Text(text)) if in_text => {
                let text = text.unescape().map_err(|e| {
                    ExtractError::CorruptDocument(format!("Malformed document text: {}", e))
                })?;
                push_to_open(&mut open, &text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if let Some(paragraph) = open.pop() {
                        paragraphs.push(paragraph);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::CorruptDocument(format!(
                    "Malformed document XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}

fn push_to_open(open: &mut [String], text: &str) {
    if let Some(paragraph) = open.last_mut() {
        paragraph.push_str(text);
    }
}

/// An upload written to a private temporary file. The file is removed when
/// the value is dropped, whichever way extraction ends.
pub struct SpooledUpload {
    file: NamedTempFile,
    written: usize,
    limit: usize,
}

impl SpooledUpload {
    pub fn new(limit: usize) -> Result<Self, ExtractError> {
        Ok(Self {
            file: NamedTempFile::new()?,
            written: 0,
            limit,
        })
    }

    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), ExtractError> {
        self.written += chunk.len();
        if self.written > self.limit {
            return Err(ExtractError::TooLarge { limit: self.limit });
        }
        self.file.write_all(chunk)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn extract_text(mut self) -> Result<String, ExtractError> {
        self.file.flush()?;
        let file = self.file.as_file_mut();
        file.rewind()?;
        extract_docx_text(BufReader::new(file))
    }
}
