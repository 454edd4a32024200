//! SAS Transport (XPORT) file format reader.
//!
//! This crate reads SAS XPORT V5/V6 transport files, a fixed-layout
//! binary format organized in 80-byte records. It exposes dataset
//! metadata, a lazy streaming row reader, buffered paged reads,
//! unique-value collection, and CSV export.
//!
//! # Features
//!
//! - Library/member/variable header parsing per the official layout
//! - IBM mainframe to IEEE floating-point conversion
//! - All SAS missing value codes (`.`, `_`, `A`-`Z`)
//! - Column projection, declarative row filters, numeric rounding
//! - Caller-selected single-byte text encodings via `encoding_rs`
//!
//! # Example
//!
//! ```no_run
//! use xport_core::{Library, ReadOptions, RowFormat};
//!
//! let mut library = Library::new("dm.xpt");
//! for meta in library.get_metadata().unwrap() {
//!     println!("{}.{} ({})", meta.dataset, meta.name, meta.var_type);
//! }
//!
//! let options = ReadOptions::new().with_row_format(RowFormat::Object);
//! for row in library.read(options).unwrap() {
//!     println!("{:?}", row.unwrap());
//! }
//! ```
//!
//! # Missing values
//!
//! Numeric fields whose first byte is a missing-value sentinel (`.`,
//! `_`, or `A`-`Z`) with all remaining bytes zero decode to
//! [`Value::Missing`]. Any other byte pattern decodes to a number,
//! matching the format's lack of validation.

mod cursor;
mod error;
pub mod filter;
pub mod float;
pub mod header;
mod library;
pub mod record;
mod types;

// Re-export error types
pub use error::{Result, XportError};

// Re-export core types
pub use types::{
    ColumnMetadata, DatasetMetadata, Justification, Member, ReadOptions, Row, RowFormat,
    SourceSystem, Value, VarType, Variable, VariableMetadata,
};

// Re-export the orchestrator and query results
pub use cursor::RowCursor;
pub use library::{ColumnValues, DataPage, Library, UniqueOptions, UniqueValues};

// Re-export filter building blocks
pub use filter::{CompareOp, CompiledFilter, Condition, Connector, FilterSpec, FilterValue};

// Re-export missing-value handling
pub use float::MissingValue;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
