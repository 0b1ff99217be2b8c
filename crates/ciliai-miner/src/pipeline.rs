//! Mining engine.
//!
//! Orchestrates the full flow for a list of genes:
//!   1. Curated evidence (expert table, screen data) when the mode asks for it
//!   2. Search + batched fetch per enabled source, sources in fixed order
//!   3. Article de-duplication by id across sources (`seen_ids`)
//!   4. Evidence location per paragraph and subject gene
//!   5. Effect detection, role inference, relevance scoring
//!   6. Context de-duplication and per-gene role summary
//!   7. Progress events via broadcast channel, cancellation between genes
//!
//! Genes are processed strictly one at a time: the pacing delay is a global
//! throttle on the upstream service, not a per-gene one.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use ciliai_common::{CiliaiError, Result};
use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::classifier::{summarize, Classifier};
use crate::config::MinerConfig;
use crate::curated::CuratedStore;
use crate::locator::{EvidenceLocator, GeneMatcher};
use crate::models::{
    ArticleEvidenceGroup, ArticleRecord, ArticleSource, Axis, EvidenceItem, GeneResult,
    InferredRoles, RoleSummary, RunMetadata, RunReport,
};
use crate::retriever::ArticleRetriever;
use crate::scoring::{has_quantitative_data, RelevanceScorer};
use crate::sources::{EutilsClient, LiteratureSource, PmcSource, PubMedSource};

/// Contexts sharing this many leading characters count as duplicates.
const CONTEXT_KEY_CHARS: usize = 150;

// ── Progress events ───────────────────────────────────────────────────────────

/// Emitted once per gene, in order, before that gene is processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinerProgress {
    pub gene: String,
    /// Zero-based position in the run.
    pub index: usize,
    pub total: usize,
}

// ── Engine ────────────────────────────────────────────────────────────────────

pub struct LiteratureMinerEngine {
    config: MinerConfig,
    sources: Vec<Box<dyn LiteratureSource>>,
    retriever: ArticleRetriever,
    locator: EvidenceLocator,
    classifier: Classifier,
    scorer: RelevanceScorer,
    curated: CuratedStore,
    progress_tx: Option<broadcast::Sender<MinerProgress>>,
    cancel: CancellationToken,
}

impl LiteratureMinerEngine {
    /// Engine over explicit sources. Fails on invalid configuration.
    pub fn new(config: MinerConfig, sources: Vec<Box<dyn LiteratureSource>>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            retriever: ArticleRetriever::new(&config),
            locator: EvidenceLocator::new(&config)?,
            classifier: Classifier::new(&config)?,
            scorer: RelevanceScorer::new(&config),
            curated: CuratedStore::from_path(config.screen_data_path.as_deref()),
            config,
            sources,
            progress_tx: None,
            cancel: CancellationToken::new(),
        })
    }

    /// Engine over NCBI E-utilities for every source enabled in `config`.
    pub fn from_config(config: MinerConfig) -> Result<Self> {
        let mut sources: Vec<Box<dyn LiteratureSource>> = Vec::new();
        if config.mode.uses_literature() {
            let eutils = Arc::new(EutilsClient::new(&config)?);
            for source in &config.sources {
                match source {
                    ArticleSource::PubMed => sources.push(Box::new(PubMedSource::new(eutils.clone()))),
                    ArticleSource::Pmc => {
                        sources.push(Box::new(PmcSource::new(eutils.clone(), config.min_fragment_len)))
                    }
                }
            }
        }
        Self::new(config, sources)
    }

    pub fn with_curated(mut self, curated: CuratedStore) -> Self {
        self.curated = curated;
        self
    }

    pub fn with_progress(mut self, tx: broadcast::Sender<MinerProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    fn emit(&self, progress: MinerProgress) {
        if let Some(ref tx) = self.progress_tx {
            let _ = tx.send(progress);
        }
    }

    /// Process every gene and collect a report. Never fails as a whole:
    /// each gene's slot carries its own result or error.
    #[instrument(skip(self, genes), fields(n = genes.len(), mode = self.config.mode.as_str()))]
    pub async fn process_genes(&self, genes: &[String]) -> RunReport {
        let run_id = Uuid::new_v4();
        let timestamp = Utc::now();
        let t0 = std::time::Instant::now();

        let mut requested: Vec<String> = Vec::new();
        for gene in genes {
            let gene = gene.trim().to_string();
            if !requested.contains(&gene) {
                requested.push(gene);
            }
        }
        let total = requested.len();
        let all_genes: Vec<GeneMatcher> = requested
            .iter()
            .filter_map(|g| GeneMatcher::new(g).ok())
            .collect();

        info!(run_id = %run_id, total, "Starting mining run");

        let mut results: IndexMap<String, GeneResult> = IndexMap::with_capacity(total);
        let mut cancelled = false;

        for (index, gene) in requested.iter().enumerate() {
            if cancelled || self.cancel.is_cancelled() {
                if !cancelled {
                    warn!(remaining = total - index, "Run cancelled");
                }
                cancelled = true;
                results.insert(gene.clone(), GeneResult::failed(gene.clone(), CiliaiError::Cancelled.to_string()));
                continue;
            }

            self.emit(MinerProgress { gene: gene.clone(), index, total });
            info!("Processing gene {}/{}: {}", index + 1, total, gene);

            let result = match self.process_gene(gene, &all_genes).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(gene = %gene, "Gene failed: {}", e);
                    GeneResult::failed(gene.clone(), e.to_string())
                }
            };
            results.insert(gene.clone(), result);
        }

        let duration_ms = t0.elapsed().as_millis() as u64;
        info!(run_id = %run_id, duration_ms, cancelled, "Mining run complete");

        RunReport {
            metadata: RunMetadata {
                run_id,
                timestamp,
                gene_count: results.len(),
                mode: self.config.mode,
                cancelled,
                duration_ms,
            },
            results,
        }
    }

    /// Everything found for one gene. `all_genes` is the full run list, used
    /// for subject attribution and collective references.
    #[instrument(skip(self, all_genes))]
    pub async fn process_gene(&self, gene: &str, all_genes: &[GeneMatcher]) -> Result<GeneResult> {
        let matcher = GeneMatcher::new(gene)?;
        let mut result = GeneResult::new(matcher.symbol());
        let mut seen_contexts: HashSet<(String, String)> = HashSet::new();

        if self.config.mode.uses_curated() {
            for ev in self.curated.evidence_for(&matcher, &self.classifier) {
                if seen_contexts.insert((matcher.symbol().to_string(), context_key(&ev.context))) {
                    result.curated.push(ev);
                }
            }
        }

        if self.config.mode.uses_literature() {
            let mut seen_ids: HashSet<String> = HashSet::new();

            for source in &self.sources {
                let articles = match self.retriever.find_articles(source.as_ref(), matcher.symbol()).await {
                    Ok(a) => a,
                    Err(e) => {
                        warn!(gene = %matcher.symbol(), source = source.source().as_str(), "Source failed: {}", e);
                        result.source_errors.push(format!("{}: {}", source.source().as_str(), e));
                        continue;
                    }
                };

                for article in articles {
                    if !seen_ids.insert(article.id.clone()) {
                        debug!(id = %article.id, "Skipping duplicate article");
                        continue;
                    }
                    let mut evidence: Vec<EvidenceItem> = self
                        .extract_evidence(&article, all_genes)
                        .into_iter()
                        .filter(|ev| seen_contexts.insert((ev.gene.clone(), context_key(&ev.context))))
                        .collect();
                    // Most relevant first; ties keep document order.
                    evidence.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
                    if let Some(group) = ArticleEvidenceGroup::from_evidence(&article, evidence) {
                        result.push_article(group);
                    }
                }
            }
        }

        result.summary = self.summarize_gene(&matcher, &result);
        info!(
            gene = %matcher.symbol(),
            articles = result.found_article_count(),
            curated = result.curated.len(),
            length = %result.summary.length,
            frequency = %result.summary.frequency,
            "Gene processed"
        );
        Ok(result)
    }

    /// Evidence items for every (context, subject gene) pair in `article`.
    pub fn extract_evidence(&self, article: &ArticleRecord, all_genes: &[GeneMatcher]) -> Vec<EvidenceItem> {
        let mut items = Vec::new();

        for block in article.body.blocks() {
            if !self.locator.has_keyword(block) {
                continue;
            }
            for subject in self.locator.subject_genes(block, all_genes) {
                let contexts = if self.locator.paragraph_matches(block, subject) {
                    self.locator.sentence_context(block, subject)
                } else {
                    self.locator.collective_context(block)
                };

                for context in contexts {
                    items.push(EvidenceItem {
                        gene: subject.symbol().to_string(),
                        effects: self.classifier.detect_effect(&context),
                        source: article.source(),
                        article_id: article.id.clone(),
                        article_title: article.title.clone(),
                        inferred_roles: self.classifier.interpret_evidence(subject, &context),
                        relevance: self.scorer.score(&context, subject),
                        quantitative: has_quantitative_data(&context),
                        context,
                    });
                }
            }
        }
        items
    }

    fn summarize_gene(&self, gene: &GeneMatcher, result: &GeneResult) -> RoleSummary {
        let mut roles = InferredRoles::default();
        for ev in result.evidence().filter(|ev| ev.gene.eq_ignore_ascii_case(gene.symbol())) {
            roles.merge(&ev.inferred_roles);
        }
        for ev in &result.curated {
            roles.merge(&ev.inferred_roles);
        }
        RoleSummary {
            length: summarize(roles.axis(Axis::Length)),
            frequency: summarize(roles.axis(Axis::Frequency)),
        }
    }
}

fn context_key(context: &str) -> String {
    context.chars().take(CONTEXT_KEY_CHARS).collect()
}
