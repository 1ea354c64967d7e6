use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("データベースURLが設定されていません。`happy-hours config --set-database-url URL` または環境変数 HAPPY_HOURS_DATABASE_URL で設定してください")]
    MissingDatabaseUrl,

    #[error("テーブル名が不正: {0}")]
    InvalidTableName(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("シートが見つかりません: {0}")]
    SheetNotFound(String),

    #[error("必須列がありません: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("ブック構造が不正: {0}")]
    InvalidWorkbook(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("データベースエラー: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("画像読み込みエラー: {0}")]
    Image(#[from] image::ImageError),

    #[error("Excel読み込みエラー: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("xlsx展開エラー: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML解析エラー: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Common(#[from] happy_hours_common::Error),
}

pub type Result<T> = std::result::Result<T, MigrationError>;
