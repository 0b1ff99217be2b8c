//! PubMed source: title + abstract records via E-utilities.

use std::sync::Arc;

use async_trait::async_trait;
use ciliai_common::Result;
use tracing::{debug, warn};

use crate::models::{ArticleBody, ArticleRecord, ArticleSource};
use crate::xml::{parse_document, XmlElement};
use super::{EutilsClient, LiteratureSource};

pub struct PubMedSource {
    eutils: Arc<EutilsClient>,
}

impl PubMedSource {
    pub fn new(eutils: Arc<EutilsClient>) -> Self {
        Self { eutils }
    }
}

#[async_trait]
impl LiteratureSource for PubMedSource {
    fn source(&self) -> ArticleSource {
        ArticleSource::PubMed
    }

    fn keyword_field(&self) -> Option<&'static str> {
        Some("tiab")
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        self.eutils.esearch(ArticleSource::PubMed.db(), query, max_results).await
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<ArticleRecord>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let xml = self.eutils.efetch(ArticleSource::PubMed.db(), ids).await?;
        Ok(parse_pubmed_xml(&xml))
    }
}

/// Parse PubMed efetch XML (`<PubmedArticleSet><PubmedArticle>...`) into article records.
///
/// A document the parser rejects yields no records.
pub fn parse_pubmed_xml(xml: &str) -> Vec<ArticleRecord> {
    let doc = match parse_document(xml) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("PubMed XML parse error: {}", e);
            return vec![];
        }
    };

    let records: Vec<ArticleRecord> = doc
        .descendants_named("PubmedArticle")
        .into_iter()
        .enumerate()
        .map(|(index, article)| pubmed_record(index, article))
        .collect();

    debug!(n = records.len(), "Parsed PubMed articles");
    records
}

fn pubmed_record(index: usize, article: &XmlElement) -> ArticleRecord {
    let id = article
        .find("PMID")
        .map(|e| e.normalized_text())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("unknown-{}", index));

    let title = article
        .find("ArticleTitle")
        .map(|e| e.normalized_text())
        .unwrap_or_default();

    let abstract_text = article
        .descendants_named("AbstractText")
        .iter()
        .map(|e| e.normalized_text())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let body = format!("{} {}", title, abstract_text).trim().to_string();
    ArticleRecord::new(id, ArticleSource::PubMed, title, ArticleBody::Text(body))
}
