//! BMV-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, BmvError>;

/// Top-level error type for bulk_mv.
#[derive(Debug, Error)]
pub enum BmvError {
    #[error("[BMV-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[BMV-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[BMV-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[BMV-1101] start directory {start} is not a path prefix of walk root {root}")]
    StartNotPrefix { start: PathBuf, root: PathBuf },

    #[error("[BMV-2001] ignore-rule file failure at {path}: {details}")]
    IgnoreParse { path: PathBuf, details: String },

    #[error("[BMV-2002] walk failure at {path}: {source}")]
    WalkIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "[BMV-2101] edited listing has {actual} lines but the original had {expected}; \
         refusing to guess which files moved"
    )]
    ListingCountMismatch { expected: usize, actual: usize },

    #[error("[BMV-2102] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[BMV-3001] failed to copy {src} to {dst}: {details}")]
    CopyFailed {
        src: PathBuf,
        dst: PathBuf,
        details: String,
    },

    #[error("[BMV-3002] rollback failed for {path}: {details}")]
    RollbackFailed { path: PathBuf, details: String },

    #[error("[BMV-3003] failed to delete original {path}: {details}")]
    DeleteFailed { path: PathBuf, details: String },

    #[error("[BMV-3004] copied content of {dst} does not match {src}; source kept")]
    CopyVerifyMismatch { src: PathBuf, dst: PathBuf },

    #[error("[BMV-3005] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[BMV-4001] editor `{editor}` exited abnormally: {details}")]
    EditorFailed { editor: String, details: String },

    #[error("[BMV-4002] no suitable editor found; set $EDITOR or install nano/vim/code")]
    NoEditorFound,

    #[error("[BMV-4101] failed to load script manifest {path}: {details}")]
    ManifestLoad { path: PathBuf, details: String },

    #[error("[BMV-4102] script `{name}` failed: {details}")]
    ScriptFailed { name: String, details: String },

    #[error("[BMV-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl BmvError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "BMV-1001",
            Self::MissingConfig { .. } => "BMV-1002",
            Self::ConfigParse { .. } => "BMV-1003",
            Self::StartNotPrefix { .. } => "BMV-1101",
            Self::IgnoreParse { .. } => "BMV-2001",
            Self::WalkIo { .. } => "BMV-2002",
            Self::ListingCountMismatch { .. } => "BMV-2101",
            Self::Serialization { .. } => "BMV-2102",
            Self::CopyFailed { .. } => "BMV-3001",
            Self::RollbackFailed { .. } => "BMV-3002",
            Self::DeleteFailed { .. } => "BMV-3003",
            Self::CopyVerifyMismatch { .. } => "BMV-3004",
            Self::Io { .. } => "BMV-3005",
            Self::EditorFailed { .. } => "BMV-4001",
            Self::NoEditorFound => "BMV-4002",
            Self::ManifestLoad { .. } => "BMV-4101",
            Self::ScriptFailed { .. } => "BMV-4102",
            Self::Runtime { .. } => "BMV-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::WalkIo { .. }
                | Self::CopyFailed { .. }
                | Self::RollbackFailed { .. }
                | Self::DeleteFailed { .. }
                | Self::Io { .. }
                | Self::EditorFailed { .. }
                | Self::ScriptFailed { .. }
                | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for walk IO errors with a known path.
    #[must_use]
    pub fn walk_io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::WalkIo {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for BmvError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for BmvError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_errors() -> Vec<BmvError> {
        vec![
            BmvError::InvalidConfig {
                details: String::new(),
            },
            BmvError::MissingConfig {
                path: PathBuf::new(),
            },
            BmvError::ConfigParse {
                context: "",
                details: String::new(),
            },
            BmvError::StartNotPrefix {
                start: PathBuf::new(),
                root: PathBuf::new(),
            },
            BmvError::IgnoreParse {
                path: PathBuf::new(),
                details: String::new(),
            },
            BmvError::WalkIo {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            },
            BmvError::ListingCountMismatch {
                expected: 0,
                actual: 0,
            },
            BmvError::Serialization {
                context: "",
                details: String::new(),
            },
            BmvError::CopyFailed {
                src: PathBuf::new(),
                dst: PathBuf::new(),
                details: String::new(),
            },
            BmvError::RollbackFailed {
                path: PathBuf::new(),
                details: String::new(),
            },
            BmvError::DeleteFailed {
                path: PathBuf::new(),
                details: String::new(),
            },
            BmvError::CopyVerifyMismatch {
                src: PathBuf::new(),
                dst: PathBuf::new(),
            },
            BmvError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            },
            BmvError::EditorFailed {
                editor: String::new(),
                details: String::new(),
            },
            BmvError::NoEditorFound,
            BmvError::ManifestLoad {
                path: PathBuf::new(),
                details: String::new(),
            },
            BmvError::ScriptFailed {
                name: String::new(),
                details: String::new(),
            },
            BmvError::Runtime {
                details: String::new(),
            },
        ]
    }

    #[test]
    fn error_codes_are_unique() {
        let errors = sample_errors();
        let codes: Vec<&str> = errors.iter().map(BmvError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
    }

    #[test]
    fn error_codes_have_bmv_prefix() {
        for err in &sample_errors() {
            assert!(
                err.code().starts_with("BMV-"),
                "code {} must start with BMV-",
                err.code()
            );
        }
    }

    #[test]
    fn error_display_includes_code() {
        let err = BmvError::ListingCountMismatch {
            expected: 4,
            actual: 5,
        };
        let msg = err.to_string();
        assert!(
            msg.contains("BMV-2101"),
            "display should contain error code: {msg}"
        );
        assert!(msg.contains('4') && msg.contains('5'), "{msg}");
    }

    #[test]
    fn configuration_errors_are_not_retryable() {
        assert!(
            !BmvError::InvalidConfig {
                details: String::new()
            }
            .is_retryable()
        );
        assert!(
            !BmvError::StartNotPrefix {
                start: PathBuf::new(),
                root: PathBuf::new()
            }
            .is_retryable()
        );
        assert!(
            !BmvError::ListingCountMismatch {
                expected: 1,
                actual: 2
            }
            .is_retryable()
        );
        assert!(!BmvError::NoEditorFound.is_retryable());
    }

    #[test]
    fn io_failures_are_retryable() {
        assert!(BmvError::io("/tmp/x", std::io::Error::other("test")).is_retryable());
        assert!(
            BmvError::DeleteFailed {
                path: PathBuf::new(),
                details: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn io_convenience_constructor() {
        let err = BmvError::io(
            "/tmp/listing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code(), "BMV-3005");
        assert!(err.to_string().contains("/tmp/listing.txt"));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: BmvError = json_err.into();
        assert_eq!(err.code(), "BMV-2102");
    }

    #[test]
    fn from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: BmvError = toml_err.into();
        assert_eq!(err.code(), "BMV-1003");
    }
}
