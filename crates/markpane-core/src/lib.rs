#![forbid(unsafe_code)]

//! Shared logic for `markpane` (GUI + CLI): conversion, document state,
//! preview sync and the New/Open/Save lifecycle.

pub mod config;
pub mod disk_io;
pub mod document;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod markdown;
pub mod page;
pub mod session;

pub use document::Document;
pub use error::{ConfigError, ConversionError, FileError};
pub use input::{Command, KeyChord};
pub use lifecycle::{FileDialog, FileFilter, FileLifecycle, Outcome};
pub use markdown::{Converter, MarkdownConverter};
pub use page::Page;
pub use session::{Renderer, Session};

/// Hard cap on file sizes we will load into memory.
pub const MAX_FILE_BYTES: u64 = 64 * 1024 * 1024;
