//! 埋め込み画像の照合モジュール
//!
//! Excelシートに貼られた画像を候補フォルダの画像ファイルとピクセル単位で照合し、
//! 行の店舗名・IDと一致ファイル名を MatchRecord として出力する。

pub mod compare;
pub mod drawing;
pub mod types;

pub use compare::{find_first_match, images_are_equal, rgb_equal};
pub use drawing::read_embedded_images;
pub use types::{CellAnchor, EmbeddedImage, MatchOptions};

use crate::error::{MigrationError, Result};
use crate::scanner::CandidateImage;
use crate::source::cell_value;
use calamine::{open_workbook_auto, Data, Range, Reader};
use happy_hours_common::{clean, ImageColumn, MatchRecord};
use std::path::Path;
use tracing::{debug, warn};

/// シート内の埋め込み画像を候補と照合する
///
/// - 対象列以外・アンカー情報なしの画像はスキップ
/// - 候補は列挙順に比較し、最初の一致を採用（同点は検出しない）
/// - 一致なしの画像は出力に含めない
pub fn match_embedded_images(
    workbook_path: &Path,
    options: &MatchOptions,
    candidates: &[CandidateImage],
) -> Result<Vec<MatchRecord>> {
    let sheet = SheetCells::load(workbook_path, &options.sheet_name)?;
    let name_col = sheet.require_column(&options.name_column)?;
    let id_col = sheet.require_column(&options.id_column)?;

    let embedded = read_embedded_images(workbook_path, &options.sheet_name)?;
    debug!(count = embedded.len(), "埋め込み画像を検出");

    let mut matches = Vec::new();

    for image in embedded {
        let Some(anchor) = image.anchor else {
            debug!(media = %image.media_path, "アンカー情報のない画像をスキップ");
            continue;
        };

        let Some(excel_row) = anchor.excel_row() else {
            warn!(media = %image.media_path, row = anchor.row, "行番号が不正な画像をスキップ");
            continue;
        };

        let Some(column) = sheet
            .header_at(anchor.col)
            .and_then(|h| h.parse::<ImageColumn>().ok())
            .filter(|c| options.image_columns.contains(c))
        else {
            continue;
        };

        let decoded = match image::load_from_memory(&image.data) {
            Ok(img) => img.to_rgb8(),
            Err(e) => {
                warn!(media = %image.media_path, row = excel_row, error = %e, "埋め込み画像をデコードできません");
                continue;
            }
        };

        if let Some(candidate) = find_first_match(&decoded, candidates) {
            matches.push(MatchRecord {
                excel_row,
                happy_hours_id: sheet.value_at(anchor.row, id_col),
                name: sheet.value_at(anchor.row, name_col),
                column: column.header().to_string(),
                matched_file: candidate.file_name.clone(),
            });
        }
    }

    Ok(matches)
}

/// セル値の絶対位置アクセス（ヘッダは1行目）
pub(crate) struct SheetCells {
    range: Range<Data>,
    headers: Vec<Option<String>>,
}

impl SheetCells {
    pub(crate) fn load(path: &Path, sheet_name: &str) -> Result<Self> {
        if !path.exists() {
            return Err(MigrationError::FileNotFound(path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(path)?;
        if !workbook.sheet_names().iter().any(|name| name == sheet_name) {
            return Err(MigrationError::SheetNotFound(sheet_name.to_string()));
        }
        let range = workbook.worksheet_range(sheet_name)?;

        let last_col = range.end().map(|(_, col)| col).unwrap_or(0);
        let headers = if range.is_empty() {
            Vec::new()
        } else {
            (0..=last_col)
                .map(|col| range.get_value((0, col)).map(cell_value).and_then(|v| clean(&v)))
                .collect()
        };

        Ok(Self { range, headers })
    }

    fn header_at(&self, col: u32) -> Option<&str> {
        self.headers.get(col as usize).and_then(|h| h.as_deref())
    }

    pub(crate) fn require_column(&self, name: &str) -> Result<u32> {
        self.headers
            .iter()
            .position(|h| h.as_deref() == Some(name))
            .map(|i| i as u32)
            .ok_or_else(|| MigrationError::MissingColumns(vec![name.to_string()]))
    }

    pub(crate) fn value_at(&self, row: u32, col: u32) -> Option<String> {
        self.range
            .get_value((row, col))
            .map(cell_value)
            .and_then(|v| clean(&v))
    }
}

/// 照合結果をCSVに書き出す
pub fn write_match_csv(path: &Path, records: &[MatchRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        // ヘッダのみのファイルにする
        writer.write_record(["ExcelRow", "happy_hours_id", "Name", "Column", "MatchedFile"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// 照合CSVを読み込む
///
/// 行ごとのパース結果を返す（不正行は呼び出し側でスキップする）。
pub fn read_match_csv(path: &Path) -> Result<Vec<std::result::Result<MatchRecord, csv::Error>>> {
    if !path.exists() {
        return Err(MigrationError::FileNotFound(path.display().to_string()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    Ok(reader.deserialize().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(row: u32, name: &str, column: &str, file: &str) -> MatchRecord {
        MatchRecord {
            excel_row: row,
            happy_hours_id: Some(format!("id-{}", row)),
            name: Some(name.to_string()),
            column: column.to_string(),
            matched_file: file.to_string(),
        }
    }

    #[test]
    fn test_match_csv_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matched_images_output.csv");

        write_match_csv(&path, &[record(2, "Sky Bar", "Image", "temp_image_1.png")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("ExcelRow,happy_hours_id,Name,Column,MatchedFile"));
        assert_eq!(lines.next(), Some("2,id-2,Sky Bar,Image,temp_image_1.png"));
    }

    #[test]
    fn test_match_csv_empty_has_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_match_csv(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "ExcelRow,happy_hours_id,Name,Column,MatchedFile");
        assert!(read_match_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_match_csv_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matches.csv");
        std::fs::write(
            &path,
            "ExcelRow,happy_hours_id,Name,Column,MatchedFile\n3,,Sky Bar,Logo,logo.png\nx,,Bad,Image,a.png\n",
        )
        .unwrap();

        let rows = read_match_csv(&path).unwrap();
        assert_eq!(rows.len(), 2);

        let first = rows[0].as_ref().unwrap();
        assert_eq!(first.happy_hours_id, None);
        assert_eq!(first.name.as_deref(), Some("Sky Bar"));
        assert!(rows[1].is_err());
    }

    #[test]
    fn test_read_match_csv_not_found() {
        let result = read_match_csv(Path::new("/nonexistent/matches.csv"));
        assert!(matches!(result, Err(MigrationError::FileNotFound(_))));
    }
}
