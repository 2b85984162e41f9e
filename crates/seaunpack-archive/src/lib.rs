//! Archive classification and extraction with path sanitization.
//!
//! # Architecture
//!
//! - `classify.rs` - Filename recognition and extraction folder naming
//! - `format.rs` - Format detection and tar decompression codecs
//! - `sanitize.rs` - Path sanitization (zip-slip prevention)
//! - `extract/` - Per-format entry sources and the write pipeline
//! - `entry.rs` - Extraction report types

pub use classify::{ARCHIVE_SUFFIXES, EXTRACTED_SUFFIX, format_hint, is_archive, target_folder_name};
pub use entry::{ArchiveReport, Entry, EntryKind};
pub use error::{Error, Result};
pub use extract::{extract_file, extract_from_reader};
pub use format::{ArchiveFormat, TarCompress, detect_format};
pub use sanitize::{SanitizedPath, sanitize_path, sanitize_symlink_target};

mod classify;
pub mod entry;
mod error;
pub mod extract;
mod format;
mod sanitize;
