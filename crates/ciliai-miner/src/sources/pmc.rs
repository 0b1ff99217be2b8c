//! PMC source: open-access full-text records via E-utilities.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use ciliai_common::Result;
use tracing::{debug, warn};

use crate::models::{ArticleBody, ArticleRecord, ArticleSource};
use crate::xml::{parse_document, XmlElement};
use super::{EutilsClient, LiteratureSource};

pub struct PmcSource {
    eutils: Arc<EutilsClient>,
    min_fragment_len: usize,
}

impl PmcSource {
    pub fn new(eutils: Arc<EutilsClient>, min_fragment_len: usize) -> Self {
        Self { eutils, min_fragment_len }
    }
}

#[async_trait]
impl LiteratureSource for PmcSource {
    fn source(&self) -> ArticleSource {
        ArticleSource::Pmc
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        self.eutils.esearch(ArticleSource::Pmc.db(), query, max_results).await
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<ArticleRecord>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let xml = self.eutils.efetch(ArticleSource::Pmc.db(), ids).await?;
        Ok(parse_pmc_xml(&xml, self.min_fragment_len))
    }
}

/// Parse PMC efetch XML (`<pmc-articleset><article>...`) into article records.
///
/// Body blocks come from body paragraphs, then body captions; top-level
/// sections are used only when neither produced text, and the abstract
/// only when the body produced nothing at all. Fragments of
/// `min_fragment_len` characters or fewer are dropped.
pub fn parse_pmc_xml(xml: &str, min_fragment_len: usize) -> Vec<ArticleRecord> {
    let doc = match parse_document(xml) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("PMC XML parse error: {}", e);
            return vec![];
        }
    };

    let records: Vec<ArticleRecord> = doc
        .descendants_named("article")
        .into_iter()
        .enumerate()
        .map(|(index, article)| pmc_record(index, article, min_fragment_len))
        .collect();

    debug!(n = records.len(), "Parsed PMC articles");
    records
}

fn pmc_id(article: &XmlElement) -> Option<String> {
    let raw = article
        .descendants_named("article-id")
        .into_iter()
        .find(|e| {
            e.attr("pub-id-type")
                .map(|t| t.to_ascii_lowercase().contains("pmc"))
                .unwrap_or(false)
        })?
        .normalized_text();

    if raw.is_empty() {
        None
    } else if raw.chars().all(|c| c.is_ascii_digit()) {
        Some(format!("PMC{}", raw))
    } else {
        Some(raw)
    }
}

struct BlockCollector {
    min_len: usize,
    seen: HashSet<String>,
    blocks: Vec<String>,
}

impl BlockCollector {
    fn push(&mut self, el: &XmlElement) {
        let text = el.normalized_text();
        if text.chars().count() > self.min_len && self.seen.insert(text.clone()) {
            self.blocks.push(text);
        }
    }
}

fn pmc_record(index: usize, article: &XmlElement, min_fragment_len: usize) -> ArticleRecord {
    let id = pmc_id(article).unwrap_or_else(|| format!("unknown-{}", index));

    let title = article
        .find("article-title")
        .map(|e| e.normalized_text())
        .unwrap_or_default();

    let mut collector = BlockCollector { min_len: min_fragment_len, seen: HashSet::new(), blocks: Vec::new() };

    if let Some(body) = article.find("body") {
        for p in body.descendants_named("p") {
            collector.push(p);
        }
        for caption in body.descendants_named("caption") {
            collector.push(caption);
        }
        if collector.blocks.is_empty() {
            for sec in body.children_named("sec") {
                collector.push(sec);
            }
        }
    }

    if collector.blocks.is_empty() {
        if let Some(abstract_el) = article.find("abstract") {
            collector.push(abstract_el);
        }
    }

    ArticleRecord::new(id, ArticleSource::Pmc, title, ArticleBody::Paragraphs(collector.blocks))
}
