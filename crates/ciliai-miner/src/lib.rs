//! ciliai-miner: Literature mining engine for ciliary gene phenotypes.
//! Covers the CiliAI analysis flow:
//! - Gene-centric literature search (PubMed abstracts, PMC full text)
//! - Rate-limited fetching with retry/backoff and request pacing
//! - PubMed and PMC XML extraction
//! - Evidence location (gene mention + ciliary keyword sentence windows)
//! - Effect detection and role inference
//! - Per-gene aggregation into a run report

pub mod classifier;
pub mod config;
pub mod curated;
pub mod export;
pub mod fetch;
pub mod input;
pub mod locator;
pub mod models;
pub mod pipeline;
pub mod retriever;
pub mod scoring;
pub mod sources;
pub mod xml;

pub use config::{AnalysisMode, MinerConfig};
pub use models::{ArticleRecord, ArticleSource, GeneResult, RunReport};
pub use pipeline::{LiteratureMinerEngine, MinerProgress};
