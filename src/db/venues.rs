use crate::error::{MigrationError, Result};
use happy_hours_common::{Coordinates, ImageColumn, VenueRecord};
use sqlx::any::AnyRow;
use sqlx::{AnyConnection, Row};

/// 店舗テーブルへのパラメータ化クエリ
///
/// 更新はすべて `happy_hours_id` をキーに行う。
/// 店名・住所しか持たない入力は `find_ids_*` で先にIDへ解決する。
#[derive(Debug, Clone)]
pub struct VenueTable {
    name: String,
}

const SELECT_COLUMNS: &str = "happy_hours_id, row_id, name, description, address, google_marker, \
     image_link, logo_link, open_hours, happy_hour_start, happy_hour_end, happy_hours_yes_no, \
     telephone, remark, image, logo, latitude, longitude";

impl VenueTable {
    pub fn new(name: &str) -> Result<Self> {
        if !is_valid_identifier(name) {
            return Err(MigrationError::InvalidTableName(name.to_string()));
        }
        Ok(Self { name: name.to_string() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                happy_hours_id VARCHAR(36) NOT NULL PRIMARY KEY,
                row_id TEXT,
                name TEXT,
                description TEXT,
                address TEXT,
                google_marker TEXT,
                image_link TEXT,
                logo_link TEXT,
                open_hours TEXT,
                happy_hour_start TEXT,
                happy_hour_end TEXT,
                happy_hours_yes_no TEXT,
                telephone TEXT,
                remark TEXT,
                image TEXT,
                logo TEXT,
                image_data LONGBLOB,
                logo_data LONGBLOB,
                latitude DOUBLE,
                longitude DOUBLE
            )",
            self.name
        )
    }

    pub async fn insert(&self, conn: &mut AnyConnection, venue: &VenueRecord) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (
                happy_hours_id, row_id, name, description, address,
                google_marker, image_link, logo_link, open_hours,
                happy_hour_start, happy_hour_end, happy_hours_yes_no,
                telephone, remark
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.name
        );

        sqlx::query(&sql)
            .bind(venue.happy_hours_id.as_str())
            .bind(venue.row_id.clone())
            .bind(venue.name.clone())
            .bind(venue.description.clone())
            .bind(venue.address.clone())
            .bind(venue.google_marker.clone())
            .bind(venue.image_link.clone())
            .bind(venue.logo_link.clone())
            .bind(venue.open_hours.clone())
            .bind(venue.happy_hour_start.clone())
            .bind(venue.happy_hour_end.clone())
            .bind(venue.happy_hours_yes_no.clone())
            .bind(venue.telephone.clone())
            .bind(venue.remark.clone())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// 店名の完全一致（大文字小文字を区別、照合順序に依存しない）でIDを引く
    pub async fn find_ids_by_name(&self, conn: &mut AnyConnection, name: &str) -> Result<Vec<String>> {
        let sql = format!("SELECT happy_hours_id, name FROM {} WHERE name = ?", self.name);
        let rows = sqlx::query(&sql).bind(name).fetch_all(&mut *conn).await?;

        let mut ids = Vec::new();
        for row in rows {
            if text(&row, "name")?.as_deref() == Some(name) {
                ids.push(required_text(&row, "happy_hours_id")?);
            }
        }
        Ok(ids)
    }

    /// 店名＋住所の完全一致でIDを引く
    pub async fn find_ids_by_name_and_address(
        &self,
        conn: &mut AnyConnection,
        name: &str,
        address: &str,
    ) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT happy_hours_id, name, address FROM {} WHERE name = ? AND address = ?",
            self.name
        );
        let rows = sqlx::query(&sql)
            .bind(name)
            .bind(address)
            .fetch_all(&mut *conn)
            .await?;

        let mut ids = Vec::new();
        for row in rows {
            let found_name = text(&row, "name")?;
            let found_address = text(&row, "address")?;
            if found_name.as_deref() == Some(name) && found_address.as_deref() == Some(address) {
                ids.push(required_text(&row, "happy_hours_id")?);
            }
        }
        Ok(ids)
    }

    /// 緯度または経度が未設定の店舗（ID, 住所）
    pub async fn missing_coordinates(
        &self,
        conn: &mut AnyConnection,
    ) -> Result<Vec<(String, Option<String>)>> {
        let sql = format!(
            "SELECT happy_hours_id, address FROM {} WHERE latitude IS NULL OR longitude IS NULL",
            self.name
        );
        let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;

        rows.iter()
            .map(|row| -> Result<(String, Option<String>)> {
                Ok((required_text(row, "happy_hours_id")?, text(row, "address")?))
            })
            .collect()
    }

    pub async fn set_coordinates(
        &self,
        conn: &mut AnyConnection,
        id: &str,
        coords: Coordinates,
    ) -> Result<u64> {
        let sql = format!(
            "UPDATE {} SET latitude = ?, longitude = ? WHERE happy_hours_id = ?",
            self.name
        );
        let result = sqlx::query(&sql)
            .bind(coords.latitude)
            .bind(coords.longitude)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// 画像・ロゴのファイル名のみ更新（他の列は変更しない）
    pub async fn set_image_reference(
        &self,
        conn: &mut AnyConnection,
        id: &str,
        column: ImageColumn,
        file_name: &str,
    ) -> Result<u64> {
        let sql = format!(
            "UPDATE {} SET {} = ? WHERE happy_hours_id = ?",
            self.name,
            column.db_column()
        );
        let result = sqlx::query(&sql)
            .bind(file_name)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_image_data(
        &self,
        conn: &mut AnyConnection,
        id: &str,
        image: Option<Vec<u8>>,
        logo: Option<Vec<u8>>,
    ) -> Result<u64> {
        let sql = format!(
            "UPDATE {} SET image_data = ?, logo_data = ? WHERE happy_hours_id = ?",
            self.name
        );
        let result = sqlx::query(&sql)
            .bind(image)
            .bind(logo)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn image_data(
        &self,
        conn: &mut AnyConnection,
        id: &str,
    ) -> Result<Option<(Option<Vec<u8>>, Option<Vec<u8>>)>> {
        let sql = format!(
            "SELECT image_data, logo_data FROM {} WHERE happy_hours_id = ?",
            self.name
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?;
        row.map(|row| -> Result<(Option<Vec<u8>>, Option<Vec<u8>>)> {
            Ok((row.try_get("image_data")?, row.try_get("logo_data")?))
        })
        .transpose()
    }

    pub async fn fetch(&self, conn: &mut AnyConnection, id: &str) -> Result<Option<VenueRecord>> {
        let sql = format!("SELECT {} FROM {} WHERE happy_hours_id = ?", SELECT_COLUMNS, self.name);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?;
        row.as_ref().map(venue_from_row).transpose()
    }

    /// 全店舗（row_id 順ではなく取得順）
    pub async fn fetch_all(&self, conn: &mut AnyConnection) -> Result<Vec<VenueRecord>> {
        let sql = format!("SELECT {} FROM {}", SELECT_COLUMNS, self.name);
        let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
        rows.iter().map(venue_from_row).collect()
    }
}

fn venue_from_row(row: &AnyRow) -> Result<VenueRecord> {
    Ok(VenueRecord {
        happy_hours_id: required_text(row, "happy_hours_id")?,
        row_id: text(row, "row_id")?,
        name: text(row, "name")?,
        description: text(row, "description")?,
        address: text(row, "address")?,
        google_marker: text(row, "google_marker")?,
        image_link: text(row, "image_link")?,
        logo_link: text(row, "logo_link")?,
        open_hours: text(row, "open_hours")?,
        happy_hour_start: text(row, "happy_hour_start")?,
        happy_hour_end: text(row, "happy_hour_end")?,
        happy_hours_yes_no: text(row, "happy_hours_yes_no")?,
        telephone: text(row, "telephone")?,
        remark: text(row, "remark")?,
        image: text(row, "image")?,
        logo: text(row, "logo")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
    })
}

/// 文字列列を読む
///
/// MySQL は TEXT 列を BLOB 型として返すため、Any ドライバ経由では `String` に
/// デコードできない。その場合はバイト列で読み直して UTF-8 として解釈する。
fn text(row: &AnyRow, column: &str) -> Result<Option<String>> {
    let decoded: std::result::Result<Option<String>, sqlx::Error> = row.try_get(column);
    match decoded {
        Ok(value) => Ok(value),
        Err(sqlx::Error::ColumnDecode { .. }) => {
            let bytes: Option<Vec<u8>> = row.try_get(column)?;
            bytes.map(text_from_bytes).transpose()
        }
        Err(e) => Err(e.into()),
    }
}

fn required_text(row: &AnyRow, column: &str) -> Result<String> {
    text(row, column)?.ok_or_else(|| {
        MigrationError::Database(sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: "NULL は許可されていません".into(),
        })
    })
}

fn text_from_bytes(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| MigrationError::Database(sqlx::Error::Decode(Box::new(e))))
}

/// テーブル名は英数字とアンダースコアのみ（SQLに埋め込むため）
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_table_names() {
        assert!(VenueTable::new("happy_hours_bangkok").is_ok());
        assert!(VenueTable::new("_venues2").is_ok());
    }

    #[test]
    fn test_invalid_table_names() {
        for name in ["", "1venues", "venues; DROP TABLE x", "happy-hours", "db.table"] {
            assert!(
                matches!(VenueTable::new(name), Err(MigrationError::InvalidTableName(_))),
                "accepted: {:?}",
                name
            );
        }
    }

    #[test]
    fn test_text_from_bytes() {
        assert_eq!(text_from_bytes("สีลม".as_bytes().to_vec()).unwrap(), "สีลม");
        assert!(matches!(
            text_from_bytes(vec![0xff, 0xfe]),
            Err(MigrationError::Database(sqlx::Error::Decode(_)))
        ));
    }

    #[test]
    fn test_create_sql_uses_table_name() {
        let table = VenueTable::new("venues").unwrap();
        let sql = table.create_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS venues ("));
        assert!(sql.contains("latitude DOUBLE"));
    }
}
