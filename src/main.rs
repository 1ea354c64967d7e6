use clap::Parser;
use happy_hours_migrate::{cli, config, db, enrich, error, matcher, pipeline};
use cli::{Cli, Commands};
use config::Config;
use db::Session;
use error::Result;
use enrich::{GoogleTranslator, LanguagePair, NominatimGeocoder};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;

    match cli.command {
        Commands::Import { csv, create_table } => {
            println!("📥 happy-hours - CSV取り込み\n");

            let mut session = connect(&config).await?;
            if create_table {
                session.create_table().await?;
            }
            let report = pipeline::import::run(&mut session, &csv).await?;
            session.close().await?;

            println!("\n✅ 取り込み完了: {}", report);
        }

        Commands::Translate { input, output } => {
            println!("🌐 happy-hours - 翻訳\n");

            let translator = GoogleTranslator::new(&config.translate_url, config.request_timeout())?;
            let pair = LanguagePair {
                source: config.source_lang.clone(),
                target: config.target_lang.clone(),
            };
            let report = pipeline::translate::run(&translator, &input, &output, &pair).await?;

            println!("\n✅ 翻訳完了: {} → {}", report, output.display());
        }

        Commands::Geocode => {
            println!("📍 happy-hours - 座標取得\n");

            let geocoder = NominatimGeocoder::new(
                &config.geocoder_url,
                &config.geocoder_user_agent,
                config.request_timeout(),
            )?;
            let mut session = connect(&config).await?;
            let report = pipeline::geocode::run(&mut session, &geocoder, config.geocode_delay()).await?;
            session.close().await?;

            println!("\n✅ 座標更新完了: {}", report);
        }

        Commands::ExportImages { workbook, folder, sheet } => {
            println!("💾 happy-hours - 埋め込み画像の書き出し\n");

            let report = pipeline::images::export_embedded_images(&workbook, &sheet, &folder)?;

            println!("\n✅ 書き出し完了: {} → {}", report, folder.display());
        }

        Commands::MatchImages { workbook, folder, sheet, output } => {
            println!("🖼  happy-hours - 画像照合\n");

            let options = matcher::MatchOptions {
                sheet_name: sheet,
                ..Default::default()
            };
            let matches = pipeline::images::match_images(&workbook, &folder, &output, &options)?;

            println!("\n🔍 完了: {}件一致 → {}", matches.len(), output.display());
        }

        Commands::UpdateImages { csv, join_on } => {
            println!("🔁 happy-hours - 画像ファイル名の反映\n");

            let mut session = connect(&config).await?;
            let report = pipeline::images::update_image_references(&mut session, &csv, join_on).await?;
            session.close().await?;

            println!("\n✅ 反映完了: {}", report);
        }

        Commands::InsertImages { workbook, sheet } => {
            println!("📦 happy-hours - 画像データ格納\n");

            let mut session = connect(&config).await?;
            let report = pipeline::images::insert_image_data(&mut session, &workbook, &sheet).await?;
            session.close().await?;

            println!("\n✅ 格納完了: {}", report);
        }

        Commands::Config { set_database_url, show } => {
            let mut config = config;

            if let Some(url) = set_database_url {
                config.set_database_url(url)?;
                println!("✔ データベースURLを設定しました");
            }

            if show {
                println!("設定:");
                println!("  データベース: {}", config.masked_database_url().unwrap_or_else(|| "未設定".into()));
                println!("  テーブル: {}", config.table);
                println!("  翻訳: {} ({} → {})", config.translate_url, config.source_lang, config.target_lang);
                println!("  ジオコーダ: {} (間隔 {}ms)", config.geocoder_url, config.geocode_delay_ms);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn connect(config: &Config) -> Result<Session> {
    let url = config.database_url()?;
    println!("データベース: {}", config.masked_database_url().unwrap_or_default());
    Session::connect(url, &config.table).await
}
