//! Happy Hours Common Library
//!
//! 移行CLIとテストで共有される型と正規化ユーティリティ

pub mod types;
pub mod error;
pub mod normalizer;

pub use types::{Coordinates, ImageColumn, MatchRecord, VenueRecord};
pub use error::{Error, Result};
pub use normalizer::{clean, clean_str, contains_thai, export_file_name, CellValue};
