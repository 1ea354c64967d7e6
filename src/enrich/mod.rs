//! 外部サービスによる補完
//!
//! 翻訳・ジオコーディングはいずれもベストエフォート。失敗しても処理は止めない。

pub mod geocode;
pub mod translate;

pub use geocode::{Geocoder, NominatimGeocoder};
pub use translate::{translate_cell, translate_if_thai, GoogleTranslator, LanguagePair, TranslationOutcome, Translator};
