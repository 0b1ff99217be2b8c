//! Literature source clients.

pub mod eutils;
pub mod pmc;
pub mod pubmed;

use async_trait::async_trait;
use ciliai_common::Result;

use crate::models::{ArticleRecord, ArticleSource};

pub use eutils::EutilsClient;
pub use pmc::PmcSource;
pub use pubmed::PubMedSource;

/// Common interface for the literature databases the miner searches.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    fn source(&self) -> ArticleSource;

    /// Search field the keyword clause is restricted to, if the database supports one.
    fn keyword_field(&self) -> Option<&'static str> {
        None
    }

    /// Search for article identifiers matching `query`.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>>;

    /// Fetch and parse full records for a batch of identifiers in one request.
    async fn fetch(&self, ids: &[String]) -> Result<Vec<ArticleRecord>>;
}

/// `"<gene>" AND (kw1 OR kw2 OR ...)`, each keyword quoted and optionally field-qualified.
pub fn build_query(gene: &str, keywords: &[String], field: Option<&str>) -> String {
    let clause = keywords
        .iter()
        .map(|kw| match field {
            Some(f) => format!("\"{}\"[{}]", kw, f),
            None => format!("\"{}\"", kw),
        })
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("\"{}\" AND ({})", gene.trim(), clause)
}

/// Scripted in-memory source shared by the retriever and pipeline tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use ciliai_common::{CiliaiError, Result};
    use tokio::time::Instant;

    use super::LiteratureSource;
    use crate::models::{ArticleRecord, ArticleSource};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CallKind {
        Search,
        Fetch,
    }

    #[derive(Debug, Clone)]
    pub struct Call {
        pub kind: CallKind,
        pub source: ArticleSource,
        /// Gene for searches, comma-joined ids for fetches.
        pub detail: String,
        pub at: Instant,
    }

    pub type CallLog = Arc<Mutex<Vec<Call>>>;

    pub fn call_log() -> CallLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    pub struct ScriptedSource {
        source: ArticleSource,
        log: CallLog,
        ids: HashMap<String, Vec<String>>,
        records: Vec<ArticleRecord>,
        failing: HashSet<String>,
    }

    impl ScriptedSource {
        pub fn new(source: ArticleSource, log: CallLog) -> Self {
            Self { source, log, ids: HashMap::new(), records: Vec::new(), failing: HashSet::new() }
        }

        pub fn with_ids(mut self, gene: &str, ids: &[&str]) -> Self {
            self.ids.insert(gene.to_string(), ids.iter().map(|s| s.to_string()).collect());
            self
        }

        pub fn with_records(mut self, records: Vec<ArticleRecord>) -> Self {
            self.records.extend(records);
            self
        }

        pub fn failing_for(mut self, gene: &str) -> Self {
            self.failing.insert(gene.to_string());
            self
        }

        fn record(&self, kind: CallKind, detail: String) {
            self.log.lock().unwrap().push(Call { kind, source: self.source, detail, at: Instant::now() });
        }
    }

    #[async_trait]
    impl LiteratureSource for ScriptedSource {
        fn source(&self) -> ArticleSource {
            self.source
        }

        async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
            let gene = query.split('"').nth(1).unwrap_or_default().to_string();
            self.record(CallKind::Search, gene.clone());
            if self.failing.contains(&gene) {
                return Err(CiliaiError::Network(format!("{} search for {gene} failed", self.source.as_str())));
            }
            let mut ids = self.ids.get(&gene).cloned().unwrap_or_default();
            ids.truncate(max_results);
            Ok(ids)
        }

        async fn fetch(&self, ids: &[String]) -> Result<Vec<ArticleRecord>> {
            self.record(CallKind::Fetch, ids.join(","));
            Ok(ids
                .iter()
                .filter_map(|id| self.records.iter().find(|r| &r.id == id).cloned())
                .collect())
        }
    }
}
