use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Maximum file size for security (10 MB)
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// FileSystemReader adapter for reading configuration files
///
/// Used for the filter file; rejects symlinks, non-regular files and
/// anything larger than a configuration file plausibly is.
pub struct FileSystemReader;

impl FileSystemReader {
    pub fn new() -> Self {
        Self
    }

    /// Safely read a file with security checks:
    /// - Reject symbolic links
    /// - Check file size limits
    /// - Validate file is a regular file
    pub fn read_text(&self, path: &Path, file_type: &str) -> Result<String> {
        // Get file metadata without following symlinks
        let metadata = fs::symlink_metadata(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {} metadata: {}", file_type, e))?;

        if metadata.is_symlink() {
            anyhow::bail!(
                "Security: {} is a symbolic link. For security reasons, symbolic links are not allowed.",
                path.display()
            );
        }

        if !metadata.is_file() {
            anyhow::bail!("{} is not a regular file", path.display());
        }

        let file_size = metadata.len();
        if file_size > MAX_FILE_SIZE {
            anyhow::bail!(
                "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
                path.display(),
                file_size,
                MAX_FILE_SIZE
            );
        }

        fs::read_to_string(path).map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file_type, e))
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_text_success() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("filters.yaml");
        fs::write(&path, "azqr: {}").unwrap();

        let content = FileSystemReader::new().read_text(&path, "filter file").unwrap();

        assert_eq!(content, "azqr: {}");
    }

    #[test]
    fn test_read_text_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = FileSystemReader::new()
            .read_text(&temp_dir.path().join("missing.yaml"), "filter file")
            .unwrap_err();
        assert!(format!("{}", err).contains("Failed to read filter file metadata"));
    }

    #[test]
    fn test_read_text_rejects_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = FileSystemReader::new()
            .read_text(temp_dir.path(), "filter file")
            .unwrap_err();
        assert!(format!("{}", err).contains("not a regular file"));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_text_rejects_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let real = temp_dir.path().join("real.yaml");
        fs::write(&real, "azqr: {}").unwrap();
        let link = temp_dir.path().join("link.yaml");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let err = FileSystemReader::new().read_text(&link, "filter file").unwrap_err();
        assert!(format!("{}", err).contains("symbolic link"));
    }
}
