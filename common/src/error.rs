//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown image column: {0} (expected Image or Logo)")]
    UnknownImageColumn(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
