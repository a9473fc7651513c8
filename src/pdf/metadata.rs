//! Document information dictionary: stamping and reading
//!
//! The concatenated document carries Creator, Title, Author, CreationDate and
//! ModDate. Nothing is inherited from the sources.

use std::env;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use directories::UserDirs;
use lopdf::{decode_text_string, text_string, Dictionary, Document, Object, ObjectId};

use crate::config::{APP_NAME, DEFAULT_OUTPUT_NAME};
use crate::error::Result;
use crate::pdf::merge::load_source;

/// Environment variables consulted for the login name, in order
const LOGIN_VARS: [&str; 4] = ["LOGNAME", "USER", "LNAME", "USERNAME"];

/// Values written into the output's Info dictionary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub creator: String,
    pub title: String,
    pub author: String,
    /// Used for both CreationDate and ModDate
    pub timestamp: String,
}

impl DocumentInfo {
    /// Info for a document written now by the current user
    pub fn new(title: impl Into<String>) -> Self {
        Self::at(title, Local::now().naive_local())
    }

    /// Info with an explicit timestamp
    pub fn at(title: impl Into<String>, time: NaiveDateTime) -> Self {
        Self {
            creator: APP_NAME.to_string(),
            title: title.into(),
            author: title_case(&current_user()),
            timestamp: pdf_timestamp(time),
        }
    }
}

/// Format a time as a PDF date without a zone suffix: `D:YYYYMMDDHHMMSS`
pub fn pdf_timestamp(time: NaiveDateTime) -> String {
    time.format("D:%Y%m%d%H%M%S").to_string()
}

/// Capitalise the first letter of every word and lowercase the rest
///
/// A word is a run of letters; anything else (digits, punctuation,
/// whitespace) starts a new word.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

/// Login name of the current OS user
///
/// Falls back to the home directory name, then to "unknown".
pub fn current_user() -> String {
    LOGIN_VARS
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|name| !name.trim().is_empty())
        .or_else(|| {
            UserDirs::new().and_then(|dirs| {
                dirs.home_dir()
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Title for an output file: its stem with underscores as spaces, title-cased
///
/// An empty stem falls back to `fallback`, then to the default document name.
pub fn derive_title(output_path: &Path, fallback: &str) -> String {
    let stem = output_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().replace('_', " "))
        .unwrap_or_default();

    let base = [stem.trim(), fallback.trim()]
        .into_iter()
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(DEFAULT_OUTPUT_NAME);

    title_case(base)
}

/// Write a fresh Info dictionary and point the trailer at it
pub fn stamp_info(doc: &mut Document, info: &DocumentInfo) -> ObjectId {
    let mut dict = Dictionary::new();
    dict.set("Creator", text_string(&info.creator));
    dict.set("Title", text_string(&info.title));
    dict.set("Author", text_string(&info.author));
    dict.set("CreationDate", text_string(&info.timestamp));
    dict.set("ModDate", text_string(&info.timestamp));

    let info_id = doc.add_object(Object::Dictionary(dict));
    doc.trailer.set("Info", Object::Reference(info_id));
    info_id
}

/// PDF metadata
#[derive(Debug, Clone, Default)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub creation_date: Option<String>,
    pub mod_date: Option<String>,
}

/// Read the Info dictionary of a loaded document
pub fn read_info(doc: &Document) -> PdfMetadata {
    let info = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .ok();

    let field = |key: &[u8]| -> Option<String> {
        info.and_then(|dict| dict.get(key).ok())
            .and_then(|obj| decode_text_string(obj).ok())
    };

    PdfMetadata {
        page_count: doc.get_pages().len(),
        title: field(b"Title"),
        author: field(b"Author"),
        creator: field(b"Creator"),
        creation_date: field(b"CreationDate"),
        mod_date: field(b"ModDate"),
    }
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    let doc = load_source(path)?;
    Ok(read_info(&doc))
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    let doc = load_source(path)?;
    Ok(doc.get_pages().len())
}
