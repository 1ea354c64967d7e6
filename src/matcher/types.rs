use happy_hours_common::ImageColumn;

/// 画像照合の対象シート・列設定
#[derive(Debug, Clone)]
pub struct MatchOptions {
    pub sheet_name: String,
    /// 画像を持つ列（これ以外の列に固定された画像は無視）
    pub image_columns: Vec<ImageColumn>,
    pub name_column: String,
    pub id_column: String,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            sheet_name: "REAL ONE".into(),
            image_columns: ImageColumn::ALL.to_vec(),
            name_column: "Name".into(),
            id_column: "happy_hours_id".into(),
        }
    }
}

/// 埋め込み画像の固定セル（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAnchor {
    pub row: u32,
    pub col: u32,
}

impl CellAnchor {
    /// Excel上の行番号（1始まり）。桁あふれする不正な行は `None`
    pub fn excel_row(&self) -> Option<u32> {
        self.row.checked_add(1)
    }
}

/// シートに埋め込まれた画像
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// `from` 情報のないアンカー（absoluteAnchor等）は `None`
    pub anchor: Option<CellAnchor>,
    /// パッケージ内のメディアパス（例: `xl/media/image1.png`）
    pub media_path: String,
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excel_row() {
        assert_eq!(CellAnchor { row: 0, col: 2 }.excel_row(), Some(1));
        assert_eq!(CellAnchor { row: 41, col: 3 }.excel_row(), Some(42));
        assert_eq!(CellAnchor { row: u32::MAX, col: 2 }.excel_row(), None);
    }

    #[test]
    fn test_default_options() {
        let options = MatchOptions::default();
        assert_eq!(options.sheet_name, "REAL ONE");
        assert_eq!(options.image_columns, vec![ImageColumn::Image, ImageColumn::Logo]);
    }
}
