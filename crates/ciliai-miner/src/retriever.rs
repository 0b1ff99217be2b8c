//! Per-gene article retrieval: search, then one batched fetch.
//!
//! Every completed outbound call (search or fetch, successful or not) is
//! followed by the pacing delay, so consecutive calls to the upstream
//! service are always at least `pacing` apart.

use ciliai_common::Result;
use tracing::{debug, instrument};

use crate::config::MinerConfig;
use crate::fetch::Pacer;
use crate::models::ArticleRecord;
use crate::sources::{build_query, LiteratureSource};

pub struct ArticleRetriever {
    pacer: Pacer,
    max_results: usize,
    keywords: Vec<String>,
}

impl ArticleRetriever {
    pub fn new(config: &MinerConfig) -> Self {
        Self {
            pacer: Pacer::new(config.pacing()),
            max_results: config.articles_per_gene,
            keywords: config.query_vocabulary(),
        }
    }

    pub fn query_for(&self, source: &dyn LiteratureSource, gene: &str) -> String {
        build_query(gene, &self.keywords, source.keyword_field())
    }

    /// Articles about `gene` from one source. Zero search hits skip the fetch.
    #[instrument(skip(self, source), fields(source = source.source().as_str()))]
    pub async fn find_articles(&self, source: &dyn LiteratureSource, gene: &str) -> Result<Vec<ArticleRecord>> {
        let query = self.query_for(source, gene);

        let searched = source.search(&query, self.max_results).await;
        self.pacer.pause().await;
        let ids = searched?;

        if ids.is_empty() {
            debug!(gene, "No identifiers found, skipping fetch");
            return Ok(vec![]);
        }

        let fetched = source.fetch(&ids).await;
        self.pacer.pause().await;
        let records = fetched?;

        debug!(gene, ids = ids.len(), records = records.len(), "Fetched articles");
        Ok(records)
    }
}
