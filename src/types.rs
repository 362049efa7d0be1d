//! Core domain types for the scoring pipeline.
//!
//! Wire payloads keep the legacy Portuguese field names (`musica`,
//! `nota_final`, ...) via serde renames; Rust-side names are English.

use serde::{Deserialize, Serialize};

/// A single word from the canonical lyrics of a song.
///
/// Immutable once written to the lyric cache. Positions are 1-based and
/// order-significant within one cached set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceWord {
    /// 1-based position within the song's lyric.
    pub position: usize,
    pub text: String,
}

/// One reference word paired with its best-matching sung word.
///
/// The alignment engine emits exactly one pair per reference word, in
/// reference order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentPair {
    /// The reference word being matched.
    pub reference: String,
    /// Best-matching sung word, or `None` when nothing was sung.
    pub sung: Option<String>,
    /// Cosine similarity in [-1, 1]; -1.0 sentinel when no sung words exist.
    pub similarity: f32,
}

/// Quality bucket for one aligned word pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordRating {
    /// similarity > 0.85
    Otimo,
    /// 0.60 < similarity <= 0.85
    Bom,
    /// similarity <= 0.60
    Ruim,
}

impl WordRating {
    /// Bucket a pair similarity. Boundaries are exact: 0.85 is `Bom`,
    /// 0.60 is `Ruim`.
    pub fn from_similarity(similarity: f32) -> Self {
        if similarity > 0.85 {
            WordRating::Otimo
        } else if similarity > 0.60 {
            WordRating::Bom
        } else {
            WordRating::Ruim
        }
    }
}

/// Per-word entry of the detailed analysis (wire format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordDetail {
    /// Reference word from the canonical lyrics.
    #[serde(rename = "original")]
    pub reference: String,
    /// Best-matching sung word; empty string when nothing was sung.
    #[serde(rename = "usuario")]
    pub sung: String,
    /// Pair similarity rounded to 4 decimals.
    pub score: f64,
    pub status: WordRating,
}

/// Aggregate result produced by the scoring engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreReport {
    /// Mean pair similarity rounded to 4 decimals; 0.0 when there are no pairs.
    pub mean_similarity: f64,
    /// Integer grade in [0, 99]: `floor(mean * 99)`, clamped.
    pub grade: u8,
    /// Reference words absent (case-insensitive) from the sung word list.
    pub missing_words: Vec<String>,
    /// `(1 - missing/reference) * 100`, rounded to 2 decimals.
    pub coverage: f64,
    /// One entry per alignment pair, in reference order.
    pub details: Vec<WordDetail>,
}

/// Success payload of `POST /analisar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(rename = "sucesso")]
    pub success: bool,
    #[serde(rename = "musica")]
    pub title: String,
    #[serde(rename = "artista")]
    pub artist: String,
    #[serde(rename = "nota_final")]
    pub grade: u8,
    #[serde(rename = "similaridade_media")]
    pub mean_similarity: f64,
    #[serde(rename = "cobertura_letra")]
    pub coverage: f64,
    #[serde(rename = "palavras_nao_cantadas")]
    pub missing_words: Vec<String>,
    #[serde(rename = "analise_detalhada")]
    pub details: Vec<WordDetail>,
}
