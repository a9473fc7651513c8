//! PDF Concatenator Library
//!
//! Select PDF files, put them in order, and concatenate them into a single
//! document stamped with Creator, Title, Author and creation/modification
//! dates. This library provides:
//! - An ordered file list with selection tracking ([`order`])
//! - Page-order-preserving concatenation with atomic output ([`pdf`])
//! - A shell-agnostic command session over the list ([`session`])
//!
//! # Example
//!
//! ```no_run
//! use pdf_concatenator::order::{Direction, FileOrderModel};
//! use pdf_concatenator::pdf::{concatenate, ConcatOptions};
//! use std::path::PathBuf;
//!
//! let mut files = FileOrderModel::new();
//! files.add("2. advanced.pdf");
//! files.add("1. intro.pdf");
//! files.move_entry(1, Direction::Up);
//!
//! let options = ConcatOptions::new(files.paths(), PathBuf::from("handout"));
//! let done = concatenate(&options).expect("Failed to concatenate PDFs");
//! println!("PDF saved as {}", done.output_path.display());
//! ```

pub mod config;
pub mod error;
pub mod order;
pub mod pdf;
pub mod session;

// Re-export commonly used items
pub use error::{Error, Result, SourceFault};
