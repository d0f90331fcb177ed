//! cardledger-ingest: statement discovery, text extraction and the
//! section-aware statement parser.

pub mod discovery;
pub mod parsers;
pub mod text_source;

pub use discovery::{StatementMatcher, discover_statements, import_path_for};
pub use parsers::apple_card::{StatementParser, parse_apple_card_text};
pub use text_source::{PdfToText, PlainTextFile, ScratchDir, TextSource};
