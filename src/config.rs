//! Application constants and output settings

use std::path::{Path, PathBuf};

use directories::UserDirs;

/// Application name, stamped as the document Creator
pub const APP_NAME: &str = "PDF Concatenator 2000 Pro";

/// Title used when the user has not supplied one
pub const DEFAULT_OUTPUT_NAME: &str = "Concatenated Document";

/// Extension appended to output names that lack it
pub const DEFAULT_EXTENSION: &str = ".pdf";

/// Where and under which title the concatenated document is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    /// Destination directory; empty means the current directory
    pub directory: PathBuf,
    /// File name inside `directory`; `None` derives it from the title
    pub file_name: Option<String>,
    /// Document title entered by the user
    pub title: String,
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            file_name: None,
            title: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }
}

impl OutputSpec {
    /// Settings for an explicit output path
    pub fn from_path(path: &Path, title: impl Into<String>) -> Self {
        Self {
            directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            file_name: path.file_name().map(|name| name.to_string_lossy().into_owned()),
            title: title.into(),
        }
    }

    /// File name proposed for the title: spaces become underscores
    pub fn suggested_file_name(&self) -> String {
        let title = self.title.trim();
        let title = if title.is_empty() { DEFAULT_OUTPUT_NAME } else { title };
        title.replace(' ', "_")
    }

    /// Destination path before the extension is enforced
    pub fn path(&self) -> PathBuf {
        let name = self
            .file_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.suggested_file_name());
        self.directory.join(name)
    }
}

/// The user's Documents folder when it exists, otherwise an empty path
pub fn default_output_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(Path::to_path_buf))
        .filter(|dir| dir.is_dir())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title() {
        let spec = OutputSpec::default();
        assert_eq!(spec.title, DEFAULT_OUTPUT_NAME);
        assert_eq!(spec.suggested_file_name(), "Concatenated_Document");
    }

    #[test]
    fn test_default_output_dir_exists_or_is_empty() {
        let dir = default_output_dir();
        assert!(dir.as_os_str().is_empty() || dir.is_dir());
    }

    #[test]
    fn test_path_from_title() {
        let spec = OutputSpec {
            directory: PathBuf::from("out"),
            file_name: None,
            title: "Quarterly Report".to_string(),
        };
        assert_eq!(spec.path(), Path::new("out").join("Quarterly_Report"));
    }

    #[test]
    fn test_blank_title_falls_back() {
        let spec = OutputSpec {
            directory: PathBuf::new(),
            file_name: None,
            title: "   ".to_string(),
        };
        assert_eq!(spec.path(), PathBuf::from("Concatenated_Document"));
    }

    #[test]
    fn test_from_path_keeps_file_name() {
        let spec = OutputSpec::from_path(Path::new("dir/merged.pdf"), "Merged");
        assert_eq!(spec.directory, PathBuf::from("dir"));
        assert_eq!(spec.file_name.as_deref(), Some("merged.pdf"));
        assert_eq!(spec.path(), Path::new("dir").join("merged.pdf"));
    }
}
