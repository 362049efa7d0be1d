//! Scoring engine
//!
//! Turns aligned word pairs into the user-facing report: mean similarity,
//! a 0–99 grade, per-word quality buckets, and a coverage report of
//! reference words that never showed up in the transcript.
//!
//! Coverage is deliberately computed from the raw sung word list, not the
//! aligned pairs: a reference word counts as covered if it was sung
//! anywhere, regardless of alignment position.

use crate::types::{AlignmentPair, ScoreReport, WordDetail, WordRating};

/// Score an alignment. `reference` and `sung` are the raw word lists the
/// alignment was built from; they drive the coverage report.
pub fn score(pairs: &[AlignmentPair], reference: &[String], sung: &[String]) -> ScoreReport {
    let mean = if pairs.is_empty() {
        0.0
    } else {
        pairs.iter().map(|p| p.similarity as f64).sum::<f64>() / pairs.len() as f64
    };

    // The -1.0 no-match sentinel can drive the mean negative; the grade
    // floor is 0, not a negative number.
    let grade = ((mean * 99.0).floor() as i64).clamp(0, 99) as u8;

    let details = pairs
        .iter()
        .map(|pair| WordDetail {
            reference: pair.reference.clone(),
            sung: pair.sung.clone().unwrap_or_default(),
            score: round4(pair.similarity as f64),
            status: WordRating::from_similarity(pair.similarity),
        })
        .collect();

    let (missing_words, coverage) = coverage_report(reference, sung);

    ScoreReport {
        mean_similarity: round4(mean),
        grade,
        missing_words,
        coverage,
        details,
    }
}

/// Reference words absent (case-insensitive) from the sung list, plus the
/// covered percentage. An empty reference list yields (empty, 0.0); the
/// pipeline never produces one.
fn coverage_report(reference: &[String], sung: &[String]) -> (Vec<String>, f64) {
    if reference.is_empty() {
        return (Vec::new(), 0.0);
    }

    let sung_lower: Vec<String> = sung.iter().map(|w| w.to_lowercase()).collect();
    let missing: Vec<String> = reference
        .iter()
        .filter(|word| !sung_lower.contains(&word.to_lowercase()))
        .cloned()
        .collect();

    let coverage = (1.0 - missing.len() as f64 / reference.len() as f64) * 100.0;
    (missing, round2(coverage))
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
