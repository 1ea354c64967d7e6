//! データベース接続
//!
//! 1回の実行につき1接続。sqlx の Any ドライバ経由で MySQL（本番）と SQLite（ローカル・テスト）を扱う。
//! 接続は `Session` がスコープで所有し、どの終了経路でも破棄される。
//! コミットされずに破棄されたトランザクションはロールバックされる。

pub mod venues;

pub use venues::VenueTable;

use crate::error::Result;
use sqlx::any::install_default_drivers;
use sqlx::{Any, AnyConnection, Connection, Transaction};
use tracing::debug;

pub struct Session {
    conn: AnyConnection,
    venues: VenueTable,
}

impl Session {
    pub async fn connect(database_url: &str, table: &str) -> Result<Self> {
        install_default_drivers();

        let venues = VenueTable::new(table)?;
        let conn = AnyConnection::connect(database_url).await?;
        debug!(backend = conn.backend_name(), table = venues.name(), "データベースに接続");

        Ok(Self { conn, venues })
    }

    pub fn venues(&self) -> &VenueTable {
        &self.venues
    }

    pub fn connection(&mut self) -> &mut AnyConnection {
        &mut self.conn
    }

    /// 実行全体を囲むトランザクションを開始
    pub async fn begin(&mut self) -> Result<(Transaction<'_, Any>, &VenueTable)> {
        let tx = self.conn.begin().await?;
        Ok((tx, &self.venues))
    }

    /// 店舗テーブルがなければ作成（ローカル・テスト用DBの準備）
    pub async fn create_table(&mut self) -> Result<()> {
        sqlx::query(&self.venues.create_sql())
            .execute(&mut self.conn)
            .await?;
        Ok(())
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}
