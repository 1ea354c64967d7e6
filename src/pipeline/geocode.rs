use super::RunReport;
use crate::db::Session;
use crate::enrich::Geocoder;
use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{error, info, warn};

/// 座標未設定の店舗をジオコーディングして緯度経度を更新する
///
/// - 住所が空の行はスキップ
/// - 外部呼び出しの間隔は `delay`（レート制限回避、初回は待たない）
/// - 結果なし・タイムアウト・サービス失敗は未解決として続行
pub async fn run<G>(session: &mut Session, geocoder: &G, delay: Duration) -> Result<RunReport>
where
    G: Geocoder + ?Sized,
{
    let (mut tx, venues) = session.begin().await?;
    let targets = venues.missing_coordinates(&mut *tx).await?;
    info!(count = targets.len(), "座標未設定の店舗");

    let progress = ProgressBar::new(targets.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut report = RunReport::default();
    let mut first_call = true;

    for (id, address) in targets {
        report.processed += 1;
        progress.inc(1);

        let Some(address) = address.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()) else {
            warn!(id = %id, "住所が空のためスキップ");
            report.skipped += 1;
            continue;
        };

        if !first_call {
            tokio::time::sleep(delay).await;
        }
        first_call = false;

        info!(address = %address, "座標を取得中");
        let coords = match geocoder.geocode(&address).await {
            Ok(Some(coords)) => coords,
            Ok(None) => {
                warn!(id = %id, address = %address, "座標を取得できませんでした");
                report.unmatched += 1;
                continue;
            }
            Err(e) => {
                warn!(id = %id, address = %address, error = %e, "ジオコーディングに失敗");
                report.unmatched += 1;
                continue;
            }
        };

        match venues.set_coordinates(&mut *tx, &id, coords).await {
            Ok(_) => {
                info!(id = %id, lat = coords.latitude, lon = coords.longitude, "座標を更新");
                report.succeeded += 1;
            }
            Err(e) => {
                error!(id = %id, error = %e, "座標の更新に失敗");
                report.failed += 1;
            }
        }
    }

    progress.finish_and_clear();
    tx.commit().await?;
    report.log_summary("geocode");
    Ok(report)
}
