//! PDF manipulation module

pub mod merge;
pub mod metadata;
pub mod write;

// Re-export commonly used items
pub use merge::{concatenate, load_source, spawn_concatenate, ConcatOptions, Concatenated};
pub use metadata::{count_pages, extract_metadata, DocumentInfo, PdfMetadata};
pub use write::with_default_extension;
