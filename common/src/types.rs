//! 移行データの型定義
//!
//! - VenueRecord: 店舗テーブルの1行
//! - MatchRecord: 埋め込み画像と候補ファイルの照合結果（中間CSVの1行）
//! - Coordinates: ジオコーディング結果

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 店舗レコード（happy_hours_bangkok テーブルの1行）
///
/// `happy_hours_id` は取り込み時に一度だけ生成され、以降の補完処理の結合キーになる。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueRecord {
    pub happy_hours_id: String,
    pub row_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub google_marker: Option<String>,
    pub image_link: Option<String>,
    pub logo_link: Option<String>,
    pub open_hours: Option<String>,
    pub happy_hour_start: Option<String>,
    pub happy_hour_end: Option<String>,
    pub happy_hours_yes_no: Option<String>,
    pub telephone: Option<String>,
    pub remark: Option<String>,

    /// 照合済み画像ファイル名
    pub image: Option<String>,
    /// 照合済みロゴファイル名
    pub logo: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// 画像照合結果
///
/// CSVヘッダは `ExcelRow,happy_hours_id,Name,Column,MatchedFile` 固定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Excel上の行番号（1始まり）
    #[serde(rename = "ExcelRow")]
    pub excel_row: u32,

    #[serde(rename = "happy_hours_id")]
    pub happy_hours_id: Option<String>,

    #[serde(rename = "Name")]
    pub name: Option<String>,

    /// 画像列名（Image / Logo）
    #[serde(rename = "Column")]
    pub column: String,

    #[serde(rename = "MatchedFile")]
    pub matched_file: String,
}

/// 画像を持つ列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageColumn {
    Image,
    Logo,
}

impl ImageColumn {
    pub const ALL: [ImageColumn; 2] = [ImageColumn::Image, ImageColumn::Logo];

    /// スプレッドシート・照合CSV上の列名
    pub fn header(&self) -> &'static str {
        match self {
            ImageColumn::Image => "Image",
            ImageColumn::Logo => "Logo",
        }
    }

    /// 店舗テーブル上のファイル名カラム
    pub fn db_column(&self) -> &'static str {
        match self {
            ImageColumn::Image => "image",
            ImageColumn::Logo => "logo",
        }
    }
}

impl std::str::FromStr for ImageColumn {
    type Err = Error;

    /// 大文字小文字を区別する（"image" は不可）
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Image" => Ok(ImageColumn::Image),
            "Logo" => Ok(ImageColumn::Logo),
            _ => Err(Error::UnknownImageColumn(s.to_string())),
        }
    }
}

impl std::fmt::Display for ImageColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// 緯度・経度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// 文字列の緯度・経度をパース（範囲外はエラー）
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        let lat: f64 = latitude
            .trim()
            .parse()
            .map_err(|_| Error::InvalidCoordinate(format!("lat={}", latitude)))?;
        let lon: f64 = longitude
            .trim()
            .parse()
            .map_err(|_| Error::InvalidCoordinate(format!("lon={}", longitude)))?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidCoordinate(format!("{}, {}", lat, lon)));
        }

        Ok(Self { latitude: lat, longitude: lon })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_column_from_str_is_case_sensitive() {
        assert_eq!("Image".parse::<ImageColumn>().unwrap(), ImageColumn::Image);
        assert_eq!("Logo".parse::<ImageColumn>().unwrap(), ImageColumn::Logo);
        assert!("image".parse::<ImageColumn>().is_err());
        assert!("Banner".parse::<ImageColumn>().is_err());
    }

    #[test]
    fn test_image_column_db_column() {
        assert_eq!(ImageColumn::Image.db_column(), "image");
        assert_eq!(ImageColumn::Logo.db_column(), "logo");
        assert_eq!(ImageColumn::Logo.to_string(), "Logo");
    }

    #[test]
    fn test_coordinates_parse() {
        let c = Coordinates::parse("13.7563", " 100.5018 ").unwrap();
        assert!((c.latitude - 13.7563).abs() < 1e-9);
        assert!((c.longitude - 100.5018).abs() < 1e-9);
    }

    #[test]
    fn test_coordinates_parse_invalid() {
        assert!(Coordinates::parse("abc", "100.5").is_err());
        assert!(Coordinates::parse("95.0", "100.5").is_err());
        assert!(Coordinates::parse("13.7", "200").is_err());
    }

    #[test]
    fn test_venue_record_default() {
        let venue = VenueRecord::default();
        assert_eq!(venue.happy_hours_id, "");
        assert!(venue.latitude.is_none());
    }
}
