//! Error types for the report processing pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ReadError`] - file reading and parsing errors (recoverable per file)
//! - [`ValidationError`] - structure and content contract violations (abort the batch)
//! - [`ExportError`] - result export errors
//! - [`ProcessError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations, allowing `?`
//! to work across error boundaries. Display strings are the Spanish
//! messages the operator sees, so `to_string()` on any of these is the
//! user-facing text.

use thiserror::Error;

// =============================================================================
// Read Errors (per file, recoverable)
// =============================================================================

/// Errors while reading a delimited input file.
///
/// These are per-file failures: the batch logs them and continues with the
/// remaining files.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Input file does not exist.
    #[error("Error: No se encontró el archivo {file}")]
    NotFound { file: String },

    /// Malformed delimited text (inconsistent field counts, bad encoding,
    /// duplicate column names).
    #[error("Error de formato en {file}. Verifique las columnas y separadores.")]
    Format { file: String, detail: String },

    /// Any other I/O failure while reading.
    #[error("Error al leer archivo {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

impl ReadError {
    /// File the error refers to.
    pub fn file(&self) -> &str {
        match self {
            ReadError::NotFound { file }
            | ReadError::Format { file, .. }
            | ReadError::Io { file, .. } => file,
        }
    }
}

// =============================================================================
// Validation Errors (batch-level contract violations)
// =============================================================================

/// Contract violations found in an otherwise readable file.
///
/// Unlike [`ReadError`], any of these aborts the whole batch: downstream
/// aggregation assumes a uniform, clean schema across accepted files.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required column is missing.
    #[error("El archivo {file} no tiene la estructura requerida")]
    Structure { file: String, missing: Vec<String> },

    /// The message column contains characters outside the allow-list.
    /// `report` is the bounded, human-readable violation listing.
    #[error("Caracteres no permitidos encontrados en {file}:\n{report}")]
    Content { file: String, report: String },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing per-campaign result files.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing a campaign file failed. The whole export is aborted.
    #[error("Error al exportar {file}: {source}")]
    Write {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Process Errors (top-level)
// =============================================================================

/// Top-level error returned by a batch run.
///
/// This is the single error surface of [`crate::transform::pipeline::process_batch`]
/// and of the worker: its Display string is exactly what the caller shows.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Batch-aborting validation failure.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Export failure.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Catch-all for unexpected internal failures. No partial result is
    /// ever emitted alongside this.
    #[error("Error inesperado: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for read operations.
pub type ReadResult<T> = Result<T, ReadError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for batch processing.
pub type ProcessResult<T> = Result<T, ProcessError>;
