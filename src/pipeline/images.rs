use super::RunReport;
use crate::db::Session;
use crate::error::Result;
use crate::matcher::{self, MatchOptions, SheetCells};
use crate::scanner;
use crate::source;
use clap::ValueEnum;
use happy_hours_common::{clean_str, export_file_name, ImageColumn, MatchRecord};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// 照合CSVを店舗へ反映する際の結合キー
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum JoinKey {
    /// 店名の完全一致（大文字小文字を区別）
    #[default]
    Name,
    /// 照合CSVの happy_hours_id
    Id,
}

/// シートの埋め込み画像を `"{店名} - {住所}.jpg"` として候補フォルダへ書き出す
///
/// - ヘッダ行・アンカー情報なしの画像はスキップ
/// - 店名または住所が空の行はスキップ
/// - 同名ファイルが既にあれば上書きしない
///
/// 画像のバイト列はそのまま書き出す（形式変換はしない）。
pub fn export_embedded_images(workbook: &Path, sheet_name: &str, folder: &Path) -> Result<RunReport> {
    let sheet = SheetCells::load(workbook, sheet_name)?;
    let name_col = sheet.require_column("Name")?;
    let address_col = sheet.require_column("Address")?;

    let embedded = matcher::read_embedded_images(workbook, sheet_name)?;
    info!(count = embedded.len(), "埋め込み画像を検出");
    std::fs::create_dir_all(folder)?;

    let mut report = RunReport::default();

    for image in embedded {
        report.processed += 1;

        let Some((anchor, excel_row)) = image
            .anchor
            .filter(|a| a.row > 0)
            .and_then(|a| a.excel_row().map(|row| (a, row)))
        else {
            debug!(media = %image.media_path, "ヘッダ行またはアンカー情報のない画像をスキップ");
            report.skipped += 1;
            continue;
        };

        let (Some(name), Some(address)) = (
            sheet.value_at(anchor.row, name_col),
            sheet.value_at(anchor.row, address_col),
        ) else {
            warn!(row = excel_row, "店名または住所がないためスキップ");
            report.skipped += 1;
            continue;
        };

        let file_name = export_file_name(&name, &address);
        let path = folder.join(&file_name);
        if path.exists() {
            info!(file = %file_name, "既に存在するためスキップ");
            report.skipped += 1;
            continue;
        }

        match std::fs::write(&path, &image.data) {
            Ok(()) => {
                info!(row = excel_row, file = %file_name, "保存");
                report.succeeded += 1;
            }
            Err(e) => {
                error!(row = excel_row, file = %file_name, error = %e, "書き出しに失敗");
                report.failed += 1;
            }
        }
    }

    report.log_summary("export-images");
    Ok(report)
}

/// シートの埋め込み画像を候補フォルダと照合し、結果CSVを書き出す
pub fn match_images(
    workbook: &Path,
    candidate_folder: &Path,
    output: &Path,
    options: &MatchOptions,
) -> Result<Vec<MatchRecord>> {
    let candidates = scanner::load_candidates(candidate_folder)?;
    info!(count = candidates.len(), folder = %candidate_folder.display(), "候補画像を読み込みました");

    let matches = matcher::match_embedded_images(workbook, options, &candidates)?;

    for m in &matches {
        info!(
            row = m.excel_row,
            id = m.happy_hours_id.as_deref().unwrap_or(""),
            name = m.name.as_deref().unwrap_or(""),
            column = %m.column,
            file = %m.matched_file,
            "一致"
        );
    }

    matcher::write_match_csv(output, &matches)?;
    info!(count = matches.len(), output = %output.display(), "照合結果を保存しました");
    Ok(matches)
}

/// 照合CSVの画像ファイル名を店舗の image / logo 列へ反映する
///
/// 指定列以外は変更しない。列名が Image / Logo 以外の行は警告してスキップ。
pub async fn update_image_references(
    session: &mut Session,
    match_csv: &Path,
    join: JoinKey,
) -> Result<RunReport> {
    let records = matcher::read_match_csv(match_csv)?;
    let mut report = RunReport::default();
    let (mut tx, venues) = session.begin().await?;

    for (index, record) in records.into_iter().enumerate() {
        report.processed += 1;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(row = index + 1, error = %e, "照合CSVの行を読み込めません");
                report.skipped += 1;
                continue;
            }
        };

        let key = match join {
            JoinKey::Name => record.name.as_deref(),
            JoinKey::Id => record.happy_hours_id.as_deref(),
        }
        .filter(|k| !k.is_empty());

        let Some(key) = key else {
            report.skipped += 1;
            continue;
        };
        if record.column.is_empty() || record.matched_file.is_empty() {
            report.skipped += 1;
            continue;
        }

        let column: ImageColumn = match record.column.parse() {
            Ok(c) => c,
            Err(_) => {
                warn!(column = %record.column, key, "不明な列のためスキップ");
                report.skipped += 1;
                continue;
            }
        };

        let ids = match join {
            JoinKey::Name => venues.find_ids_by_name(&mut *tx, key).await,
            JoinKey::Id => Ok(vec![key.to_string()]),
        };
        let ids = match ids {
            Ok(ids) => ids,
            Err(e) => {
                error!(key, error = %e, "店舗の検索に失敗");
                report.failed += 1;
                continue;
            }
        };

        let mut updated = 0u64;
        let mut failed = false;
        for id in &ids {
            match venues
                .set_image_reference(&mut *tx, id, column, &record.matched_file)
                .await
            {
                Ok(n) => updated += n,
                Err(e) => {
                    error!(column = %column, key, error = %e, "更新に失敗");
                    failed = true;
                }
            }
        }

        if failed {
            report.failed += 1;
        } else if updated == 0 {
            warn!(column = %column, key, "該当する店舗がありません");
            report.unmatched += 1;
        } else {
            info!(column = %column, key, file = %record.matched_file, "更新");
            report.succeeded += 1;
        }
    }

    tx.commit().await?;
    report.log_summary("update-images");
    Ok(report)
}

/// シート必須列（トリム・小文字化後）
pub const IMAGE_SHEET_COLUMNS: &[&str] = &["name", "address", "image", "logo"];

/// シートに記載された画像ファイルを読み込み、店名＋住所が一致する店舗へ格納する
pub async fn insert_image_data(
    session: &mut Session,
    workbook: &Path,
    sheet: &str,
) -> Result<RunReport> {
    let mut table = source::read_sheet(workbook, sheet)?;
    table.map_headers(|h| h.trim().to_lowercase());
    info!(columns = ?table.headers, "シートの列");
    table.require_columns(IMAGE_SHEET_COLUMNS)?;

    let mut report = RunReport::default();
    let (mut tx, venues) = session.begin().await?;

    for row in &table.rows {
        report.processed += 1;

        let (Some(name), Some(address)) = (row.cleaned("name"), row.cleaned("address")) else {
            warn!(row = row.index, "店名または住所がないためスキップ");
            report.skipped += 1;
            continue;
        };

        let image = read_image_file(row.get("image").map(|v| v.as_raw_string()));
        let logo = read_image_file(row.get("logo").map(|v| v.as_raw_string()));

        let ids = match venues.find_ids_by_name_and_address(&mut *tx, &name, &address).await {
            Ok(ids) => ids,
            Err(e) => {
                error!(row = row.index, error = %e, "店舗の検索に失敗");
                report.failed += 1;
                continue;
            }
        };

        if ids.is_empty() {
            warn!(row = row.index, name = %name, address = %address, "該当する店舗がありません");
            report.unmatched += 1;
            continue;
        }

        let mut failed = false;
        for id in &ids {
            if let Err(e) = venues.set_image_data(&mut *tx, id, image.clone(), logo.clone()).await {
                error!(row = row.index, error = %e, "画像の格納に失敗");
                failed = true;
            }
        }

        if failed {
            report.failed += 1;
        } else {
            report.succeeded += 1;
        }
    }

    tx.commit().await?;
    report.log_summary("insert-images");
    Ok(report)
}

/// セルに書かれたパスの画像を読む（空欄・存在しないファイルは `None`）
fn read_image_file(path: Option<String>) -> Option<Vec<u8>> {
    let path = clean_str(&path?)?;
    let file = Path::new(&path);
    if !file.is_file() {
        warn!(path = %path, "ファイルが見つかりません");
        return None;
    }
    match std::fs::read(file) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!(path = %path, error = %e, "ファイルを読み込めません");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_image_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let padded = format!("  {}  ", path.display());
        assert_eq!(read_image_file(Some(padded)), Some(b"\x89PNG".to_vec()));
        assert_eq!(read_image_file(Some("".into())), None);
        assert_eq!(read_image_file(None), None);
        assert_eq!(read_image_file(Some(dir.path().join("missing.png").display().to_string())), None);
    }

    #[test]
    fn test_join_key_default() {
        assert_eq!(JoinKey::default(), JoinKey::Name);
    }
}
