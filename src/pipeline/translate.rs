use super::RunReport;
use crate::enrich::translate::{translate_cell, LanguagePair, TranslationOutcome, Translator};
use crate::error::Result;
use crate::source;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSVの全セルを翻訳して別CSVに保存する
///
/// ヘッダと空セルはそのまま。出力はBOM付きUTF-8。
/// 集計はタイ語を含むセル単位（processed = 翻訳対象セル数）。
pub async fn run<T>(
    translator: &T,
    input: &Path,
    output: &Path,
    pair: &LanguagePair,
) -> Result<RunReport>
where
    T: Translator + ?Sized,
{
    let table = source::read_csv(input)?;
    info!(rows = table.len(), "翻訳対象CSVを読み込みました");

    let mut report = RunReport::default();
    let mut translated_rows = Vec::with_capacity(table.len());

    for row in &table.rows {
        let mut fields = Vec::with_capacity(table.headers.len());
        for (_, value) in row.cells() {
            let text = value.as_raw_string();

            let outcome = translate_cell(translator, &text, pair).await;
            match &outcome {
                TranslationOutcome::Unchanged => {}
                TranslationOutcome::Translated(_) => {
                    report.processed += 1;
                    report.succeeded += 1;
                }
                TranslationOutcome::Failed => {
                    report.processed += 1;
                    report.failed += 1;
                }
            }
            fields.push(outcome.into_text(&text));
        }
        translated_rows.push(fields);
    }

    write_bom_csv(output, &table.headers, &translated_rows)?;

    info!(output = %output.display(), "翻訳結果を保存しました");
    report.log_summary("translate");
    Ok(report)
}

fn write_bom_csv(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
