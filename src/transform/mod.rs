//! Per-variant transformation: type coercion, aggregation strategies and
//! the batch pipeline that sequences them.

pub mod aggregate;
pub mod coerce;
pub mod pipeline;

pub use aggregate::{aggregator_for, Aggregator};
pub use coerce::{coerce_numeric_columns, fold_text_columns};
pub use pipeline::{process_batch, Notice};
