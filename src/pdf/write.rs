//! Saving the concatenated document

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use lopdf::Document;
use tempfile::Builder;
use tracing::debug;

use crate::config::DEFAULT_EXTENSION;
use crate::error::{Error, Result};

/// Append `.pdf` unless the path already ends in it (any case)
///
/// The extension is appended, never substituted: `report.v2` becomes
/// `report.v2.pdf`.
pub fn with_default_extension(path: &Path) -> PathBuf {
    let wanted = DEFAULT_EXTENSION.trim_start_matches('.');
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted));

    if has_extension {
        return path.to_path_buf();
    }

    let mut name = path.as_os_str().to_os_string();
    name.push(DEFAULT_EXTENSION);
    PathBuf::from(name)
}

/// Compress and save `doc` to `path` through a temporary file
///
/// The temporary file lives next to the destination and is renamed over it
/// only once fully written; on any failure it is removed and the destination
/// is left as it was.
pub fn write_atomically(doc: &mut Document, path: &Path) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut temp = Builder::new()
        .prefix(".pdf-concatenator-")
        .suffix(".tmp")
        .tempfile_in(&directory)
        .map_err(|e| Error::output_write(path, e))?;

    doc.compress();

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        doc.save_to(&mut writer)
            .map_err(|e| Error::output_write(path, io::Error::other(e)))?;
        writer.flush().map_err(|e| Error::output_write(path, e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::output_write(path, e))?;

    debug!(temp = %temp.path().display(), "renaming into place");
    temp.persist(path)
        .map_err(|e| Error::output_write(path, e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extension_appended() {
        assert_eq!(with_default_extension(Path::new("out")), PathBuf::from("out.pdf"));
        assert_eq!(
            with_default_extension(Path::new("dir/report.v2")),
            PathBuf::from("dir/report.v2.pdf")
        );
    }

    #[test]
    fn test_extension_kept() {
        assert_eq!(with_default_extension(Path::new("out.pdf")), PathBuf::from("out.pdf"));
        assert_eq!(with_default_extension(Path::new("OUT.PDF")), PathBuf::from("OUT.PDF"));
    }

    #[test]
    fn test_write_into_missing_directory_fails_cleanly() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("out.pdf");
        let mut doc = Document::with_version("1.5");

        let result = write_atomically(&mut doc, &path);
        assert!(matches!(result, Err(Error::OutputWrite { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.pdf");
        let mut doc = Document::with_version("1.5");

        write_atomically(&mut doc, &path).unwrap();
        assert!(path.exists());

        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
