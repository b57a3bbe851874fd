use crate::ports::outbound::{OutputPresenter, RenderedFile};
use crate::shared::error::AuditError;
use crate::shared::Result;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// FileSystemWriter adapter for writing report files into a directory
///
/// This adapter implements the OutputPresenter port for file output.
pub struct FileSystemWriter {
    output_dir: PathBuf,
}

impl FileSystemWriter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Validates that the output directory exists and is a real directory
    fn validate_output_directory(&self) -> Result<()> {
        let dir = if self.output_dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            self.output_dir.as_path()
        };

        let metadata = fs::symlink_metadata(dir).map_err(|e| AuditError::FileWriteError {
            path: dir.to_path_buf(),
            details: format!("Output directory does not exist: {}", e),
        })?;

        if metadata.is_symlink() {
            return Err(AuditError::FileWriteError {
                path: dir.to_path_buf(),
                details: "Security: Output directory is a symbolic link. For security reasons, writing through symbolic links is not allowed.".to_string(),
            }
            .into());
        }
        if !metadata.is_dir() {
            return Err(AuditError::FileWriteError {
                path: dir.to_path_buf(),
                details: "Output path is not a directory".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Rejects names that would escape the output directory and existing
    /// symlinks at the target path
    fn validate_target(&self, file_name: &str) -> Result<PathBuf> {
        let escapes = Path::new(file_name)
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)));
        let path = self.output_dir.join(file_name);
        if escapes || file_name.is_empty() {
            return Err(AuditError::FileWriteError {
                path,
                details: "Output file name must not contain directory components".to_string(),
            }
            .into());
        }

        if let Ok(metadata) = fs::symlink_metadata(&path) {
            if metadata.is_symlink() {
                return Err(AuditError::FileWriteError {
                    path,
                    details: "Security: Output path is a symbolic link. For security reasons, writing to symbolic links is not allowed.".to_string(),
                }
                .into());
            }
        }
        Ok(path)
    }
}

impl OutputPresenter for FileSystemWriter {
    fn present(&self, files: &[RenderedFile]) -> Result<Vec<PathBuf>> {
        self.validate_output_directory()?;

        // validate everything first so a bad name never leaves a partial report
        let targets = files
            .iter()
            .map(|file| self.validate_target(&file.file_name))
            .collect::<Result<Vec<_>>>()?;

        for (file, path) in files.iter().zip(&targets) {
            fs::write(path, &file.contents).map_err(|e| AuditError::FileWriteError {
                path: path.clone(),
                details: e.to_string(),
            })?;
            tracing::info!(path = %path.display(), "report written");
        }

        Ok(targets)
    }
}

/// StdoutPresenter adapter for writing report contents to stdout
///
/// Files are written back to back; nothing touches the file system.
pub struct StdoutPresenter;

impl StdoutPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdoutPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPresenter for StdoutPresenter {
    fn present(&self, files: &[RenderedFile]) -> Result<Vec<PathBuf>> {
        let mut stdout = io::stdout().lock();
        for file in files {
            stdout
                .write_all(file.contents.as_bytes())
                .map_err(|e| anyhow::anyhow!("Failed to write to stdout: {}", e))?;
            if !file.contents.ends_with('\n') {
                stdout
                    .write_all(b"\n")
                    .map_err(|e| anyhow::anyhow!("Failed to write to stdout: {}", e))?;
            }
        }
        Ok(Vec::new())
    }
}
