use super::RunReport;
use crate::db::Session;
use crate::error::Result;
use crate::source::{self, SourceRow};
use happy_hours_common::VenueRecord;
use std::path::Path;
use tracing::{debug, error, info};
use uuid::Uuid;

/// 取り込みCSVの必須列（大文字小文字を区別）
pub const REQUIRED_COLUMNS: &[&str] = &[
    "row_id",
    "Name",
    "Description",
    "Address",
    "Google_Marker",
    "image_link",
    "logo_link",
    "Open_hours",
    "Happy_hour_start",
    "Happy_hour_end",
    "Happy_hours_yes_no",
    "Telephone",
    "Remark",
];

const PREVIEW_ROWS: usize = 3;

/// CSVの1行から店舗レコードを作る（IDは新規生成）
pub fn venue_from_row(row: &SourceRow) -> VenueRecord {
    VenueRecord {
        happy_hours_id: Uuid::new_v4().to_string(),
        row_id: row.cleaned("row_id"),
        name: row.cleaned("Name"),
        description: row.cleaned("Description"),
        address: row.cleaned("Address"),
        google_marker: row.cleaned("Google_Marker"),
        image_link: row.cleaned("image_link"),
        logo_link: row.cleaned("logo_link"),
        open_hours: row.cleaned("Open_hours"),
        happy_hour_start: row.cleaned("Happy_hour_start"),
        happy_hour_end: row.cleaned("Happy_hour_end"),
        happy_hours_yes_no: row.cleaned("Happy_hours_yes_no"),
        telephone: row.cleaned("Telephone"),
        remark: row.cleaned("Remark"),
        ..Default::default()
    }
}

/// CSVを店舗テーブルへ取り込む
///
/// 必須列の欠落は致命的エラー。行単位のINSERT失敗はログに残して続行する。
pub async fn run(session: &mut Session, csv_path: &Path) -> Result<RunReport> {
    let table = source::read_csv(csv_path)?;
    info!(columns = ?table.headers, rows = table.len(), "CSVを読み込みました");
    table.require_columns(REQUIRED_COLUMNS)?;

    let mut report = RunReport::default();
    let (mut tx, venues) = session.begin().await?;

    for row in &table.rows {
        report.processed += 1;
        if row.index < PREVIEW_ROWS {
            debug!(row = row.index, cells = ?row.cells(), "行プレビュー");
        }

        let venue = venue_from_row(row);
        match venues.insert(&mut *tx, &venue).await {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                error!(row = row.index, name = ?venue.name, error = %e, "INSERTに失敗");
                report.failed += 1;
            }
        }
    }

    tx.commit().await?;
    report.log_summary("import");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_csv;

    #[test]
    fn test_venue_from_row() {
        let table = parse_csv(
            "row_id,Name,Description,Address,Telephone,Remark\n7, Sky Bar ,,Silom Rd,nan,  \n".as_bytes(),
        )
        .unwrap();

        let venue = venue_from_row(&table.rows[0]);
        assert_eq!(venue.happy_hours_id.len(), 36);
        assert_eq!(venue.row_id.as_deref(), Some("7"));
        assert_eq!(venue.name.as_deref(), Some("Sky Bar"));
        assert_eq!(venue.description, None);
        assert_eq!(venue.address.as_deref(), Some("Silom Rd"));
        assert_eq!(venue.telephone, None);
        assert_eq!(venue.remark, None);
        // CSVにない列
        assert_eq!(venue.open_hours, None);
    }

    #[test]
    fn test_ids_are_unique() {
        let table = parse_csv(b"Name\nA\n").unwrap();
        let a = venue_from_row(&table.rows[0]);
        let b = venue_from_row(&table.rows[0]);
        assert_ne!(a.happy_hours_id, b.happy_hours_id);
    }
}
