use crate::pipeline::images::JoinKey;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "happy-hours")]
#[command(about = "バンコク・ハッピーアワー店舗データの移行・補完ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// CSVを店舗テーブルへ取り込む
    Import {
        /// 入力CSV
        #[arg(default_value = "happyhoursreal.csv")]
        csv: PathBuf,

        /// テーブルがなければ作成する（ローカルDB用）
        #[arg(long)]
        create_table: bool,
    },

    /// CSV内のタイ語セルを英訳して別CSVに保存
    Translate {
        /// 入力CSV
        #[arg(default_value = "happyhoursreal.csv")]
        input: PathBuf,

        /// 出力CSV
        #[arg(short, long, default_value = "translated_output.csv")]
        output: PathBuf,
    },

    /// 座標未設定の店舗を住所からジオコーディング
    Geocode,

    /// Excelの埋め込み画像を「店名 - 住所.jpg」としてフォルダへ書き出す
    ExportImages {
        /// Excelファイル
        #[arg(default_value = "happy_hour.xlsx")]
        workbook: PathBuf,

        /// 出力フォルダ
        #[arg(short, long)]
        folder: PathBuf,

        /// シート名
        #[arg(short, long, default_value = "REAL ONE")]
        sheet: String,
    },

    /// Excelの埋め込み画像を候補フォルダの画像と照合
    MatchImages {
        /// Excelファイル
        #[arg(default_value = "happy_hour.xlsx")]
        workbook: PathBuf,

        /// 候補画像フォルダ
        #[arg(short, long)]
        folder: PathBuf,

        /// シート名
        #[arg(short, long, default_value = "REAL ONE")]
        sheet: String,

        /// 出力CSV
        #[arg(short, long, default_value = "matched_images_output.csv")]
        output: PathBuf,
    },

    /// 照合CSVの画像ファイル名を店舗へ反映
    UpdateImages {
        /// 照合CSV
        #[arg(default_value = "matched_images_output.csv")]
        csv: PathBuf,

        /// 結合キー (name/id)
        #[arg(long, value_enum, default_value_t = JoinKey::Name)]
        join_on: JoinKey,
    },

    /// シート記載の画像ファイルを店名＋住所で店舗へ格納
    InsertImages {
        /// Excelファイル
        #[arg(default_value = "happy_hour.xlsx")]
        workbook: PathBuf,

        /// シート名
        #[arg(short, long, default_value = "REAL ONE")]
        sheet: String,
    },

    /// 設定を表示/編集
    Config {
        /// データベースURLを設定
        #[arg(long)]
        set_database_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_match_images_defaults() {
        let cli = Cli::parse_from(["happy-hours", "match-images", "--folder", "D:/bangkok_images"]);
        match cli.command {
            Commands::MatchImages { workbook, folder, sheet, output } => {
                assert_eq!(workbook, PathBuf::from("happy_hour.xlsx"));
                assert_eq!(folder, PathBuf::from("D:/bangkok_images"));
                assert_eq!(sheet, "REAL ONE");
                assert_eq!(output, PathBuf::from("matched_images_output.csv"));
            }
            _ => panic!("match-images expected"),
        }
    }

    #[test]
    fn test_parse_export_images() {
        let cli = Cli::parse_from(["happy-hours", "export-images", "bars.xlsx", "-f", "out", "-s", "Draft"]);
        match cli.command {
            Commands::ExportImages { workbook, folder, sheet } => {
                assert_eq!(workbook, PathBuf::from("bars.xlsx"));
                assert_eq!(folder, PathBuf::from("out"));
                assert_eq!(sheet, "Draft");
            }
            _ => panic!("export-images expected"),
        }
    }

    #[test]
    fn test_parse_update_images_join_on() {
        let cli = Cli::parse_from(["happy-hours", "-v", "update-images", "m.csv", "--join-on", "id"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::UpdateImages { csv, join_on } => {
                assert_eq!(csv, PathBuf::from("m.csv"));
                assert_eq!(join_on, JoinKey::Id);
            }
            _ => panic!("update-images expected"),
        }
    }
}
