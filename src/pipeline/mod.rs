//! 移行処理（1回の実行 = 1回の線形パス）
//!
//! ## 処理一覧
//! - import: CSV → 店舗テーブルへINSERT
//! - translate: CSV内のタイ語セルを英訳したCSVを出力
//! - geocode: 座標未設定の店舗を住所からジオコーディング
//! - match_images / update_image_references: 埋め込み画像の照合と反映
//! - insert_image_data: シート記載の画像ファイルを店舗へ格納
//!
//! 行単位の失敗はログに残して続行し、DBへのコミットは実行の最後に1回だけ行う。

pub mod geocode;
pub mod images;
pub mod import;
pub mod translate;

use tracing::info;

/// 実行結果の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// 処理対象件数
    pub processed: usize,
    /// 成功件数
    pub succeeded: usize,
    /// 入力不備でスキップした件数
    pub skipped: usize,
    /// 対応先が見つからなかった件数（一致なし・該当店舗なし・ジオコード結果なし）
    pub unmatched: usize,
    /// 書き込み・外部呼び出しに失敗した件数
    pub failed: usize,
}

impl RunReport {
    pub fn log_summary(&self, run: &str) {
        info!(
            run,
            processed = self.processed,
            succeeded = self.succeeded,
            skipped = self.skipped,
            unmatched = self.unmatched,
            failed = self.failed,
            "実行完了"
        );
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "対象 {} 件 / 成功 {} / スキップ {} / 該当なし {} / 失敗 {}",
            self.processed, self.succeeded, self.skipped, self.unmatched, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display() {
        let report = RunReport {
            processed: 3,
            succeeded: 2,
            skipped: 1,
            ..Default::default()
        };
        assert_eq!(report.to_string(), "対象 3 件 / 成功 2 / スキップ 1 / 該当なし 0 / 失敗 0");
    }
}
