use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow schedulers and CI systems to distinguish a broken
/// invocation from a scan that ran and failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - every stage completed and the reports were written
    Success = 0,
    /// Configuration error detected before any stage ran
    ConfigurationError = 1,
    /// A pipeline stage returned an error
    ScanError = 2,
    /// Unrecoverable internal error (credentials, report writing, panics)
    InternalError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::ConfigurationError => write!(f, "Configuration Error (1)"),
            ExitCode::ScanError => write!(f, "Scan Error (2)"),
            ExitCode::InternalError => write!(f, "Internal Error (3)"),
        }
    }
}

/// Application-specific errors raised before or around a scan.
///
/// Uses thiserror to derive Display and Error traits automatically,
/// keeping the user-facing hint next to each failure.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to read filter file: {path} ({details}). 💡 Hint: Check that the file exists and is readable")]
    FilterFileRead { path: PathBuf, details: String },

    #[error("Failed to parse filter file: {path} ({details}). 💡 Hint: The document must be rooted at 'azqr' with optional 'include' and 'exclude' sections")]
    FilterFileParse { path: PathBuf, details: String },

    #[error("Invalid resource group id: {id}. 💡 Hint: Use the form /subscriptions/<subscription-id>/resourceGroups/<name>")]
    InvalidResourceGroupId { id: String },

    #[error("Invalid arguments: {message}. 💡 Hint: {hint}")]
    InvalidArguments { message: String, hint: String },

    #[error("Failed to load plugin: {path} ({details}). 💡 Hint: A plugin needs a name and at least one query with an id and query text")]
    PluginLoad { path: PathBuf, details: String },

    #[error("Unknown plugin: {name}. 💡 Hint: Available plugins: {available}")]
    UnknownPlugin { name: String, available: String },

    #[error("Failed to acquire an access token ({details}). 💡 Hint: Set AZURE_ACCESS_TOKEN or sign in with 'az login'")]
    CredentialUnavailable { details: String },

    #[error("Failed to write to file: {path} ({details}). 💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },
}

impl AuditError {
    /// Exit code the CLI reports when this error aborts the run
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AuditError::CredentialUnavailable { .. } | AuditError::FileWriteError { .. } => {
                ExitCode::InternalError
            }
            _ => ExitCode::ConfigurationError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::ConfigurationError.as_i32(), 1);
        assert_eq!(ExitCode::ScanError.as_i32(), 2);
        assert_eq!(ExitCode::InternalError.as_i32(), 3);
    }

    #[test]
    fn test_exit_code_display() {
        assert_eq!(format!("{}", ExitCode::Success), "Success (0)");
        assert_eq!(
            format!("{}", ExitCode::ConfigurationError),
            "Configuration Error (1)"
        );
        assert_eq!(format!("{}", ExitCode::ScanError), "Scan Error (2)");
        assert_eq!(format!("{}", ExitCode::InternalError), "Internal Error (3)");
    }

    #[test]
    fn test_filter_file_parse_display() {
        let error = AuditError::FilterFileParse {
            path: PathBuf::from("/tmp/filters.yaml"),
            details: "unknown field `includes`".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Failed to parse filter file"));
        assert!(display.contains("/tmp/filters.yaml"));
        assert!(display.contains("unknown field"));
        assert!(display.contains("💡 Hint:"));
    }

    #[test]
    fn test_invalid_resource_group_display() {
        let error = AuditError::InvalidResourceGroupId {
            id: "rg-prod".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("rg-prod"));
        assert!(display.contains("/subscriptions/"));
    }

    #[test]
    fn test_configuration_errors_map_to_exit_code_one() {
        let error = AuditError::UnknownPlugin {
            name: "bogus".to_string(),
            available: "(none)".to_string(),
        };
        assert_eq!(error.exit_code(), ExitCode::ConfigurationError);

        let error = AuditError::InvalidArguments {
            message: "x".to_string(),
            hint: "y".to_string(),
        };
        assert_eq!(error.exit_code(), ExitCode::ConfigurationError);
    }

    #[test]
    fn test_io_errors_map_to_internal_exit_code() {
        let error = AuditError::FileWriteError {
            path: PathBuf::from("/out/report.json"),
            details: "Permission denied".to_string(),
        };
        assert_eq!(error.exit_code(), ExitCode::InternalError);

        let error = AuditError::CredentialUnavailable {
            details: "az not found".to_string(),
        };
        assert_eq!(error.exit_code(), ExitCode::InternalError);
    }
}
