//! Data models for the mining pipeline.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::config::AnalysisMode;

/// Literature database an article was retrieved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleSource {
    /// Bibliographic records (title + abstract).
    PubMed,
    /// Open-access full text.
    Pmc,
}

impl ArticleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleSource::PubMed => "pubmed",
            ArticleSource::Pmc    => "pmc",
        }
    }

    /// E-utilities database name.
    pub fn db(&self) -> &'static str {
        self.as_str()
    }

    /// Public landing page for an article id from this source.
    pub fn ref_link(&self, id: &str) -> String {
        match self {
            ArticleSource::PubMed => format!("https://pubmed.ncbi.nlm.nih.gov/{}/", id),
            ArticleSource::Pmc    => format!("https://www.ncbi.nlm.nih.gov/pmc/articles/{}/", id),
        }
    }
}

/// Article text: a flat title+abstract string, or full-text paragraph blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleBody {
    Text(String),
    Paragraphs(Vec<String>),
}

impl ArticleBody {
    /// The body as a list of analysable blocks.
    pub fn blocks(&self) -> Vec<&str> {
        match self {
            ArticleBody::Text(text) => {
                if text.trim().is_empty() { vec![] } else { vec![text.as_str()] }
            }
            ArticleBody::Paragraphs(paras) => paras.iter().map(String::as_str).collect(),
        }
    }
}

/// A normalised article extracted from a source document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleRecord {
    pub id: String,
    source: ArticleSource,
    pub title: String,
    pub body: ArticleBody,
}

impl ArticleRecord {
    pub fn new(id: impl Into<String>, source: ArticleSource, title: impl Into<String>, body: ArticleBody) -> Self {
        Self { id: id.into(), source, title: title.into(), body }
    }

    pub fn source(&self) -> ArticleSource {
        self.source
    }
}

/// Observed ciliary phenotype change detected in a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectLabel {
    Shorter,
    Fewer,
    ReducedFlow,
    Longer,
    NoChange,
    Increased,
    Unknown,
}

impl EffectLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectLabel::Shorter     => "shorter",
            EffectLabel::Fewer       => "fewer",
            EffectLabel::ReducedFlow => "reduced_flow",
            EffectLabel::Longer      => "longer",
            EffectLabel::NoChange    => "no_change",
            EffectLabel::Increased   => "increased",
            EffectLabel::Unknown     => "unknown",
        }
    }
}

/// Inferred relationship between a gene's normal function and a phenotype axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Promotes,
    Inhibits,
    Neutral,
    Variable,
}

/// Phenotype axis a role vote applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Length,
    Frequency,
}

/// Role votes per phenotype axis, de-duplicated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferredRoles {
    pub length: Vec<Role>,
    pub frequency: Vec<Role>,
}

impl InferredRoles {
    pub fn axis(&self, axis: Axis) -> &[Role] {
        match axis {
            Axis::Length    => &self.length,
            Axis::Frequency => &self.frequency,
        }
    }

    pub fn vote(&mut self, axis: Axis, role: Role) {
        let votes = match axis {
            Axis::Length    => &mut self.length,
            Axis::Frequency => &mut self.frequency,
        };
        if !votes.contains(&role) {
            votes.push(role);
        }
    }

    pub fn merge(&mut self, other: &InferredRoles) {
        for &r in &other.length { self.vote(Axis::Length, r); }
        for &r in &other.frequency { self.vote(Axis::Frequency, r); }
    }

    pub fn is_empty(&self) -> bool {
        self.length.is_empty() && self.frequency.is_empty()
    }
}

/// One (context, subject gene) evidence pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceItem {
    pub gene: String,
    pub context: String,
    /// Never empty: `{unknown}` when no pattern matched.
    pub effects: BTreeSet<EffectLabel>,
    pub source: ArticleSource,
    pub article_id: String,
    pub article_title: String,
    pub inferred_roles: InferredRoles,
    pub relevance: f64,
    pub quantitative: bool,
}

/// Evidence extracted from one article. Only built when evidence exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleEvidenceGroup {
    pub id: String,
    pub source: ArticleSource,
    pub title: String,
    pub ref_link: String,
    evidence: Vec<EvidenceItem>,
}

impl ArticleEvidenceGroup {
    /// Returns `None` when `evidence` is empty.
    pub fn from_evidence(article: &ArticleRecord, evidence: Vec<EvidenceItem>) -> Option<Self> {
        if evidence.is_empty() {
            return None;
        }
        Some(Self {
            id: article.id.clone(),
            source: article.source(),
            title: article.title.clone(),
            ref_link: article.source().ref_link(&article.id),
            evidence,
        })
    }

    pub fn evidence(&self) -> &[EvidenceItem] {
        &self.evidence
    }
}

/// Where a curated evidence item comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CuratedOrigin {
    ExpertDb,
    ScreenData,
}

/// Evidence that did not come from a literature search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuratedEvidence {
    pub id: String,
    pub origin: CuratedOrigin,
    pub context: String,
    pub effects: BTreeSet<EffectLabel>,
    pub inferred_roles: InferredRoles,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_link: Option<String>,
}

/// Human-readable verdict derived from a set of role votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryLabel {
    #[serde(rename = "No specific data")]
    NoSpecificData,
    #[serde(rename = "Conflicting Data")]
    ConflictingData,
    #[serde(rename = "Promotes/Maintains")]
    PromotesMaintains,
    #[serde(rename = "Inhibits/Restricts")]
    InhibitsRestricts,
    #[serde(rename = "Affects Morphology/Variability")]
    AffectsMorphology,
    #[serde(rename = "No clear role")]
    NoClearRole,
    #[serde(rename = "Unclear")]
    Unclear,
}

impl SummaryLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLabel::NoSpecificData    => "No specific data",
            SummaryLabel::ConflictingData   => "Conflicting Data",
            SummaryLabel::PromotesMaintains => "Promotes/Maintains",
            SummaryLabel::InhibitsRestricts => "Inhibits/Restricts",
            SummaryLabel::AffectsMorphology => "Affects Morphology/Variability",
            SummaryLabel::NoClearRole       => "No clear role",
            SummaryLabel::Unclear           => "Unclear",
        }
    }
}

impl std::fmt::Display for SummaryLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleSummary {
    pub length: SummaryLabel,
    pub frequency: SummaryLabel,
}

impl Default for RoleSummary {
    fn default() -> Self {
        Self {
            length: SummaryLabel::NoSpecificData,
            frequency: SummaryLabel::NoSpecificData,
        }
    }
}

/// Everything found for one queried gene.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneResult {
    pub gene: String,
    articles: Vec<ArticleEvidenceGroup>,
    pub curated: Vec<CuratedEvidence>,
    pub summary: RoleSummary,
    /// Failures of individual sources; the gene itself still succeeded.
    pub source_errors: Vec<String>,
    pub error: Option<String>,
}

impl GeneResult {
    pub fn new(gene: impl Into<String>) -> Self {
        Self {
            gene: gene.into(),
            articles: Vec::new(),
            curated: Vec::new(),
            summary: RoleSummary::default(),
            source_errors: Vec::new(),
            error: None,
        }
    }

    pub fn failed(gene: impl Into<String>, message: impl Into<String>) -> Self {
        let mut result = Self::new(gene);
        result.error = Some(message.into());
        result
    }

    pub fn push_article(&mut self, group: ArticleEvidenceGroup) {
        self.articles.push(group);
    }

    pub fn articles(&self) -> &[ArticleEvidenceGroup] {
        &self.articles
    }

    /// Always `articles().len()`.
    pub fn found_article_count(&self) -> usize {
        self.articles.len()
    }

    /// All literature evidence across articles, in article order.
    pub fn evidence(&self) -> impl Iterator<Item = &EvidenceItem> {
        self.articles.iter().flat_map(|a| a.evidence.iter())
    }
}

impl Serialize for GeneResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("GeneResult", 7)?;
        s.serialize_field("gene", &self.gene)?;
        s.serialize_field("articles", &self.articles)?;
        s.serialize_field("found_article_count", &self.found_article_count())?;
        s.serialize_field("curated", &self.curated)?;
        s.serialize_field("summary", &self.summary)?;
        if self.source_errors.is_empty() {
            s.skip_field("source_errors")?;
        } else {
            s.serialize_field("source_errors", &self.source_errors)?;
        }
        match &self.error {
            Some(e) => s.serialize_field("error", e)?,
            None => s.skip_field("error")?,
        }
        s.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub gene_count: usize,
    pub mode: AnalysisMode,
    pub cancelled: bool,
    pub duration_ms: u64,
}

/// Output of one `process_genes` call. Results keep the request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub results: IndexMap<String, GeneResult>,
}
