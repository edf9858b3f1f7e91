//! Line-oriented I/O around the estimators
//!
//! - `EdgeReader`: parses `u v` edge lists into vertex pairs
//! - `write_local_estimates` / `read_local_counts`: `id<TAB>count` files

pub mod reader;
pub mod writer;

use thiserror::Error;

// Re-export main types
pub use reader::{Delimiter, EdgeReader, EdgeReaderOptions};
pub use writer::{read_local_counts, write_local_estimates};

#[derive(Error, Debug)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record on line {line}: {content:?}")]
    Malformed { line: usize, content: String },
}

pub type IoResult<T> = Result<T, IoError>;
