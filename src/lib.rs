//! # Reporteo - SMS/RCS campaign delivery report processing
//!
//! Reporteo ingests delimited text files describing campaign delivery
//! records, validates their structure and content, and aggregates them into
//! per-campaign statistics across four report variants (devoluciones,
//! simples, basic, directo).
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ Input files│──▶│    Parser    │──▶│  Validation  │──▶│  Aggregate  │
//! │ (, or |)   │   │ (auto-sep)   │   │ (schema+msg) │   │ (4 variants)│
//! └────────────┘   └──────────────┘   └──────────────┘   └─────────────┘
//!                                                               │
//!                         per-campaign │-delimited files ◀──────┘
//! ```
//!
//! Each batch runs on one dedicated worker thread that emits progress and
//! status notifications and exactly one terminal event.
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (RecordTable, ReportVariant, summaries)
//! - [`parser`] - Delimited reading with separator detection
//! - [`validation`] - Structure and message content checks
//! - [`transform`] - Coercion, aggregation strategies and the pipeline
//! - [`export`] - Per-campaign result exporter
//! - [`worker`] - One-thread-per-run execution with event notifications

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Transformation
pub mod transform;

// Export
pub mod export;

// Worker
pub mod worker;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ExportError, ExportResult, ProcessError, ProcessResult, ReadError, ReadResult,
    ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CampaignCount, CampaignTable, DirectStats, FileStats, ProcessOutcome, RecordTable,
    ReportVariant, DIRECTO_CAMPAIGN_LABEL,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{detect_separator, read_report_file, read_table, DETECTION_LINES};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    is_valid_structure, missing_columns, validate_messages, CARACTERES_PERMITIDOS,
    MAX_VIOLATIONS,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{process_batch, Notice};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{export_campaigns, safe_file_name, select_export_columns, EXPORT_COLUMNS};

// =============================================================================
// Re-exports - Worker
// =============================================================================

pub use worker::{spawn_run, RunEvent, RunHandle, RunOptions};
