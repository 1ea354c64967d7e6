//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use happy_hours_migrate::error::MigrationError;
use happy_hours_migrate::{matcher, scanner, source};
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, MigrationError::FolderNotFound(_)));
}

/// 空のフォルダをスキャンした場合
#[test]
fn test_scan_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::scan_folder(dir.path());

    // 空フォルダはエラーではなく空のVecを返す
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// 画像のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let result = scanner::scan_folder(dir.path());
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// 壊れた画像は候補から除外される
#[test]
fn test_load_candidates_skips_broken_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

    let candidates = scanner::load_candidates(dir.path()).unwrap();
    assert!(candidates.is_empty());
}

/// 存在しないブック
#[test]
fn test_match_missing_workbook() {
    let result = matcher::match_embedded_images(
        Path::new("/nonexistent/happy_hour.xlsx"),
        &matcher::MatchOptions::default(),
        &[],
    );
    assert!(matches!(result, Err(MigrationError::FileNotFound(_))));
}

/// 壊れたブックはパニックせずエラーになる
#[test]
fn test_read_sheet_invalid_workbook() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"PK not really a zip").unwrap();

    assert!(source::read_sheet(&path, "REAL ONE").is_err());
}

/// MigrationErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        MigrationError::Config("テスト設定エラー".to_string()),
        MigrationError::FileNotFound("happyhoursreal.csv".to_string()),
        MigrationError::FolderNotFound("/path/to/folder".to_string()),
        MigrationError::SheetNotFound("REAL ONE".to_string()),
        MigrationError::InvalidTableName("bad-name".to_string()),
        MigrationError::InvalidWorkbook("drawing がありません".to_string()),
        MigrationError::ApiCall("API呼び出し失敗".to_string()),
        MigrationError::ApiParse("想定外の形式".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 必須列不足のメッセージに列名が並ぶ
#[test]
fn test_missing_columns_message() {
    let err = MigrationError::MissingColumns(vec!["Telephone".into(), "Remark".into()]);
    let display = format!("{}", err);

    assert!(display.contains("Telephone, Remark"));
}

/// MissingDatabaseUrlエラーのメッセージ確認
#[test]
fn test_missing_database_url_message() {
    let err = MigrationError::MissingDatabaseUrl;
    let display = format!("{}", err);

    assert!(display.contains("HAPPY_HOURS_DATABASE_URL"));
    assert!(display.contains("happy-hours config"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: MigrationError = io_err.into();

    assert!(matches!(err, MigrationError::Io(_)));
    let display = format!("{}", err);
    assert!(display.contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: MigrationError = json_err.into();

    assert!(matches!(err, MigrationError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_conversion() {
    let common_err = happy_hours_common::Error::UnknownImageColumn("Banner".to_string());
    let err: MigrationError = common_err.into();

    assert!(matches!(err, MigrationError::Common(_)));
    assert!(format!("{}", err).contains("Banner"));
}
