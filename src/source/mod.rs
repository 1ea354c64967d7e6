//! 行ソース読み込み
//!
//! CSV（UTF-8、BOM付き可）またはスプレッドシートの指定シートを
//! 列名 → 生セル値の行リストとして読み込む。

use crate::error::{MigrationError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use happy_hours_common::{clean, CellValue};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 1行分のセル（列順を保持）
#[derive(Debug, Clone, Default)]
pub struct SourceRow {
    /// データ行の0始まりインデックス（ヘッダ行を含まない）
    pub index: usize,
    cells: Vec<(String, CellValue)>,
}

impl SourceRow {
    pub fn new(index: usize, cells: Vec<(String, CellValue)>) -> Self {
        Self { index, cells }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// 列の正規化済み値（列がなければ `None`）
    pub fn cleaned(&self, column: &str) -> Option<String> {
        self.get(column).and_then(clean)
    }

    pub fn cells(&self) -> &[(String, CellValue)] {
        &self.cells
    }
}

/// 読み込んだ表
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// 存在しない列名を返す
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect()
    }

    /// 必須列の確認（不足は致命的エラー）
    pub fn require_columns(&self, required: &[&str]) -> Result<()> {
        let missing = self.missing_columns(required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MigrationError::MissingColumns(missing))
        }
    }

    /// 列名を変換する（例: トリム＋小文字化）
    pub fn map_headers<F>(&mut self, f: F)
    where
        F: Fn(&str) -> String,
    {
        self.headers = self.headers.iter().map(|h| f(h)).collect();
        for row in &mut self.rows {
            for (name, _) in &mut row.cells {
                *name = f(name);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// CSVを読み込む
pub fn read_csv(path: &Path) -> Result<SourceTable> {
    if !path.exists() {
        return Err(MigrationError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    parse_csv(&bytes)
}

/// CSVバイト列をパース（先頭BOMは除去）
pub fn parse_csv(bytes: &[u8]) -> Result<SourceTable> {
    let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let cells = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), CellValue::from(record.get(i).unwrap_or(""))))
            .collect();
        rows.push(SourceRow::new(index, cells));
    }

    Ok(SourceTable { headers, rows })
}

/// スプレッドシートの指定シートを読み込む（先頭行がヘッダ）
pub fn read_sheet(path: &Path, sheet: &str) -> Result<SourceTable> {
    if !path.exists() {
        return Err(MigrationError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)?;
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(MigrationError::SheetNotFound(sheet.to_string()));
    }
    let range = workbook.worksheet_range(sheet)?;

    let mut row_iter = range.rows();
    let headers: Vec<String> = match row_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell_value(cell).as_raw_string())
            .collect(),
        None => return Ok(SourceTable::default()),
    };

    let rows = row_iter
        .enumerate()
        .map(|(index, row)| {
            let cells = headers
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let value = row.get(i).map(cell_value).unwrap_or(CellValue::Empty);
                    (name.clone(), value)
                })
                .collect();
            SourceRow::new(index, cells)
        })
        .collect();

    Ok(SourceTable { headers, rows })
}

/// calamineのセルを生セル値に変換
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        other => CellValue::Text(other.to_string()),
    }
}
