//! Daily Insight - On-device analysis engine for daily self-tracking data
//!
//! Insight turns sparse, irregularly dated day/value samples into chart-ready
//! trends and explains how two logged variables relate:
//! normalization → temporal clustering (one variable) or
//! normalization → date alignment → pair analysis → recommendation (two variables).
//!
//! ## Modules
//!
//! - **Trend view**: [`normalizer`], [`clusterer`], [`summary`]
//! - **Relationship view**: [`analyzer`], [`contingency`], [`recommendation`]
//! - **Entry points**: [`pipeline::InsightEngine`] and the JSON helpers

pub mod analyzer;
pub mod clusterer;
pub mod config;
pub mod contingency;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod recommendation;
pub mod stats;
pub mod summary;
pub mod types;

// FFI bindings for C interop
#[cfg(feature = "ffi")]
pub mod ffi;

pub use analyzer::PairAnalyzer;
pub use clusterer::TemporalClusterer;
pub use config::{EngineConfig, Locale};
pub use contingency::ContingencyTable;
pub use error::{AnalysisError, Result};
pub use normalizer::SeriesNormalizer;
pub use pipeline::{
    heatmap_to_json, relationship_to_json, select_cell_to_json, trend_to_json, InsightEngine,
};
pub use recommendation::RecommendationComposer;

/// Engine version reported by the CLI
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "daily-insight";
