//! # Error Handling
//!
//! Error types for the segmentation session engine. Every failure the session can hit is
//! caught at the operation boundary, logged, and turned into a one-line status message;
//! none of them is fatal and none is retried automatically. The user re-triggers the
//! failed action.
//!
//! ## Error Kinds
//!
//! - `Load`: remote frame fetch or local file read failed; session state unchanged
//! - `Embedding`: the embedding call failed; no embedding, decode stays disabled
//! - `Decode`: the decode call failed; the coordinator is released, overlay kept
//! - `Upload`: the remote mask sink rejected the cut-out; local export still succeeds
//! - `Export`: local persistence of the cut-out failed, or there was nothing to cut
//! - `State`: an operation was refused in the current session state
//!
//! ## Usage
//!
//! ```rust
//! use point_prompt_cutout::error::{HasSeverity, SegmentError, ErrorSeverity};
//!
//! let error = SegmentError::load("http://127.0.0.1:17860/frame/current.png", "HTTP 404")
//!     .with_recovery_suggestion("Enable frame export in the editor first");
//!
//! assert_eq!(error.category(), "load");
//! assert_eq!(error.severity(), ErrorSeverity::Warning);
//! assert!(error.status_message().contains("HTTP 404"));
//! ```

use std::{error::Error as StdError, fmt, time::SystemTime};

use cutout_raster::RasterError;

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Refused operations that are expected during normal interaction
    Info,
    /// Failures of external collaborators the user can work around
    Warning,
    /// Failures that leave a feature unusable until re-triggered
    Error,
    /// Misconfiguration that prevents the session from starting
    Critical,
}

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action shown to the user
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
    /// Additional metadata as key-value pairs
    pub metadata: std::collections::HashMap<String, String>,
}

impl ErrorContext {
    pub fn new(severity: ErrorSeverity) -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            recovery_suggestion: None,
            severity,
            metadata: std::collections::HashMap::new(),
        }
    }
}

/// Base error type for the cut-out client
#[derive(Debug)]
pub enum SegmentError {
    /// Frame fetch or file read failed
    Load {
        source_desc: String,
        reason: String,
        context: ErrorContext,
    },
    /// Embedding computation failed
    Embedding {
        model: String,
        reason: String,
        context: ErrorContext,
    },
    /// Decode call failed or returned an unusable mask set
    Decode {
        reason: String,
        context: ErrorContext,
    },
    /// Remote mask sink rejected the upload or was unreachable
    Upload {
        target: String,
        reason: String,
        context: ErrorContext,
    },
    /// Cut-out could not be produced or persisted
    Export {
        sink: String,
        reason: String,
        context: ErrorContext,
    },
    /// Operation refused in the current session state
    State {
        current_state: String,
        attempted_operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// Pixel buffer errors from the raster crate
    Raster {
        operation: String,
        source: RasterError,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
    /// Network errors
    Network {
        operation: String,
        address: Option<String>,
        source: Option<Box<dyn StdError + Send + Sync>>,
        context: ErrorContext,
    },
}

impl SegmentError {
    /// Create a load error
    pub fn load(source_desc: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            source_desc: source_desc.into(),
            reason: reason.into(),
            context: ErrorContext::new(ErrorSeverity::Warning),
        }
    }

    /// Create an embedding error
    pub fn embedding(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Embedding {
            model: model.into(),
            reason: reason.into(),
            context: ErrorContext::new(ErrorSeverity::Error),
        }
    }

    /// Create a decode error
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
            context: ErrorContext::new(ErrorSeverity::Error),
        }
    }

    /// Create an upload error
    pub fn upload(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Upload {
            target: target.into(),
            reason: reason.into(),
            context: ErrorContext::new(ErrorSeverity::Warning),
        }
    }

    /// Create an export error
    pub fn export(sink: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Export {
            sink: sink.into(),
            reason: reason.into(),
            context: ErrorContext::new(ErrorSeverity::Error),
        }
    }

    /// Create a refused-operation error
    pub fn state(
        current_state: impl Into<String>,
        attempted_operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::State {
            current_state: current_state.into(),
            attempted_operation: attempted_operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(ErrorSeverity::Info),
        }
    }

    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new(ErrorSeverity::Critical),
        }
    }

    /// Create a raster error
    pub fn raster(operation: impl Into<String>, source: RasterError) -> Self {
        Self::Raster {
            operation: operation.into(),
            source,
            context: ErrorContext::new(ErrorSeverity::Error),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(ErrorSeverity::Error),
        }
    }

    /// Create a network error
    pub fn network(
        operation: impl Into<String>,
        address: Option<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Network {
            operation: operation.into(),
            address,
            source: Some(source.into()),
            context: ErrorContext::new(ErrorSeverity::Warning),
        }
    }

    /// Attach a path to an I/O error; other variants are returned unchanged
    pub fn with_path(mut self, new_path: impl Into<String>) -> Self {
        if let Self::Io { path, .. } = &mut self {
            *path = Some(new_path.into());
        }
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Set the operation being performed
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Set recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Set severity level
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.context_mut().severity = severity;
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_mut().metadata.insert(key.into(), value.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Load { context, .. }
            | Self::Embedding { context, .. }
            | Self::Decode { context, .. }
            | Self::Upload { context, .. }
            | Self::Export { context, .. }
            | Self::State { context, .. }
            | Self::Config { context, .. }
            | Self::Raster { context, .. }
            | Self::Io { context, .. }
            | Self::Network { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Load { context, .. }
            | Self::Embedding { context, .. }
            | Self::Decode { context, .. }
            | Self::Upload { context, .. }
            | Self::Export { context, .. }
            | Self::State { context, .. }
            | Self::Config { context, .. }
            | Self::Raster { context, .. }
            | Self::Io { context, .. }
            | Self::Network { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Embedding { .. } => "embedding",
            Self::Decode { .. } => "decode",
            Self::Upload { .. } => "upload",
            Self::Export { .. } => "export",
            Self::State { .. } => "state",
            Self::Config { .. } => "config",
            Self::Raster { .. } => "raster",
            Self::Io { .. } => "io",
            Self::Network { .. } => "network",
        }
    }

    /// One-line, user-facing status text for this error.
    pub fn status_message(&self) -> String {
        match self.recovery_suggestion() {
            Some(suggestion) => format!("{} ({})", self, suggestion),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentError::Load {
                source_desc,
                reason,
                ..
            } => {
                write!(f, "Failed to load image from {}: {}", source_desc, reason)
            }
            SegmentError::Embedding { model, reason, .. } => {
                write!(f, "Embedding with model '{}' failed: {}", model, reason)
            }
            SegmentError::Decode { reason, .. } => {
                write!(f, "Decode failed: {}", reason)
            }
            SegmentError::Upload { target, reason, .. } => {
                write!(f, "Upload to {} failed: {}", target, reason)
            }
            SegmentError::Export { sink, reason, .. } => {
                write!(f, "Export to {} failed: {}", sink, reason)
            }
            SegmentError::State {
                current_state,
                attempted_operation,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Cannot {} while {}: {}",
                    attempted_operation, current_state, reason
                )
            }
            SegmentError::Config {
                field,
                value,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Configuration error in '{}': {} (value: {})",
                    field, reason, value
                )
            }
            SegmentError::Raster {
                operation, source, ..
            } => {
                write!(f, "Pixel buffer error during {}: {}", operation, source)
            }
            SegmentError::Io {
                operation,
                path,
                source,
                ..
            } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "I/O error during {} on '{}': {}",
                        operation, path, source
                    )
                } else {
                    write!(f, "I/O error during {}: {}", operation, source)
                }
            }
            SegmentError::Network {
                operation,
                address,
                source,
                ..
            } => {
                match address {
                    Some(address) => write!(f, "Network error during {} on {}", operation, address)?,
                    None => write!(f, "Network error during {}", operation)?,
                }
                if let Some(source) = source {
                    write!(f, ": {}", source)?;
                }
                Ok(())
            }
        }
    }
}

impl StdError for SegmentError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Raster { source, .. } => Some(source),
            Self::Network {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias for session operations
pub type SegmentResult<T> = Result<T, SegmentError>;

/// Trait for errors with severity levels
pub trait HasSeverity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for SegmentError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors with recovery suggestions
pub trait HasRecoverySuggestion {
    /// Get a recovery suggestion for this error
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for SegmentError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

impl From<std::io::Error> for SegmentError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<RasterError> for SegmentError {
    fn from(error: RasterError) -> Self {
        Self::raster("unknown", error)
    }
}
