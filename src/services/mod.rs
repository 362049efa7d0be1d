//! Core services: lyric cache, alignment, scoring, and the per-request
//! pipeline that strings them together.

pub mod alignment;
pub mod lyric_store;
pub mod pipeline;
pub mod scoring;

pub use alignment::AlignmentEngine;
pub use lyric_store::LyricStore;
pub use pipeline::{AnalysisPipeline, AnalysisRequest, AnalysisStage};
