//! セル値の正規化
//!
//! - 文字列のトリム
//! - 空欄・NaN・NA表記を `None` に統一
//! - タイ文字（U+0E00〜U+0E7F）の検出
//! - 書き出し画像のファイル名生成

use regex::Regex;

/// 表データの生セル値
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 変換前の文字列表現（空欄は空文字）
    pub fn as_raw_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

/// 欠損値として扱う文字列（表計算・CSVローダの慣例）
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan",
    "1.#IND", "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None",
    "n/a", "nan", "null",
];

/// セル値を正規化する
///
/// 欠損（空欄・空白のみ・NaN・NA表記）は `None`、それ以外はトリムした文字列。
pub fn clean(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) if n.is_nan() => None,
        CellValue::Number(n) => Some(format_number(*n)),
        CellValue::Bool(b) => Some(b.to_string()),
        CellValue::Text(s) => clean_str(s),
    }
}

/// 文字列版の [`clean`]
pub fn clean_str(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || NA_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 整数値の浮動小数は `.0` を付けない
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// タイ文字を含むか
pub fn contains_thai(text: &str) -> bool {
    lazy_static::lazy_static! {
        static ref THAI_RE: Regex = Regex::new(r"[\u{0E00}-\u{0E7F}]").unwrap();
    }
    THAI_RE.is_match(text)
}

/// 店名・住所から書き出し画像のファイル名を作る
///
/// `"{店名} - {住所}.jpg"` のうち `\ / : * ? " < > |` を `-` に置換し、連続空白を1つにまとめる。
pub fn export_file_name(name: &str, address: &str) -> String {
    lazy_static::lazy_static! {
        static ref INVALID_RE: Regex = Regex::new(r#"[\\/:*?"<>|]"#).unwrap();
        static ref SPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    }
    let file_name = format!("{} - {}.jpg", name.trim(), address.trim());
    let replaced = INVALID_RE.replace_all(&file_name, "-");
    SPACE_RE.replace_all(&replaced, " ").into_owned()
}
