//! cardledger-core: statement data model, value normalization and CSV export.

pub mod error;
pub mod export;
pub mod normalize;
pub mod statement;

pub use error::{Error, Result};
pub use export::{ImportRow, IMPORT_HEADER, import_rows, render_import_csv, write_import_csv, write_import_file};
pub use statement::{Statement, StatementMetadata, TransactionRecord};
