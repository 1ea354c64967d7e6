use crate::error::{MigrationError, Result};
use async_trait::async_trait;
use happy_hours_common::contains_thai;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// 翻訳言語ペア
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            source: "th".into(),
            target: "en".into(),
        }
    }
}

#[async_trait]
pub trait Translator {
    async fn translate(&self, text: &str, pair: &LanguagePair) -> Result<String>;
}

/// Google翻訳（translate_a/single, client=gtx）
pub struct GoogleTranslator {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, pair: &LanguagePair) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/translate_a/single", self.base_url))
            .query(&[
                ("client", "gtx"),
                ("sl", pair.source.as_str()),
                ("tl", pair.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MigrationError::ApiCall(format!("translate: HTTP {}", status)));
        }

        let body: Value = response.json().await?;
        parse_gtx_response(&body)
    }
}

/// `[[["訳文","原文",...], ...], ...]` から訳文を連結する
pub fn parse_gtx_response(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| MigrationError::ApiParse("translate: 訳文配列がありません".into()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(MigrationError::ApiParse("translate: 訳文が空です".into()));
    }
    Ok(translated)
}

/// セル単位の翻訳結果
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutcome {
    /// タイ文字なし（入力そのまま）
    Unchanged,
    Translated(String),
    /// 翻訳失敗（元の文字列を使う）
    Failed,
}

impl TranslationOutcome {
    pub fn into_text(self, original: &str) -> String {
        match self {
            TranslationOutcome::Translated(text) => text,
            TranslationOutcome::Unchanged | TranslationOutcome::Failed => original.to_string(),
        }
    }
}

/// タイ文字を含む場合のみ翻訳する（失敗はログに残して元の文字列）
pub async fn translate_cell<T>(translator: &T, text: &str, pair: &LanguagePair) -> TranslationOutcome
where
    T: Translator + ?Sized,
{
    if !contains_thai(text) {
        return TranslationOutcome::Unchanged;
    }

    match translator.translate(text, pair).await {
        Ok(translated) => TranslationOutcome::Translated(translated),
        Err(e) => {
            warn!(text = %text, error = %e, "翻訳エラー");
            TranslationOutcome::Failed
        }
    }
}

/// [`translate_cell`] の文字列版
pub async fn translate_if_thai<T>(translator: &T, text: &str, pair: &LanguagePair) -> String
where
    T: Translator + ?Sized,
{
    translate_cell(translator, text, pair).await.into_text(text)
}
