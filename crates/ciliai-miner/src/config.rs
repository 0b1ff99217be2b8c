//! Immutable miner configuration.
//!
//! Every vocabulary the engine consults (query keywords, analysis keywords,
//! collective-reference phrases, inference lexicon, effect patterns) lives
//! here and is handed to the engine at construction, so tests can run the
//! whole pipeline against reduced vocabularies.

use std::path::PathBuf;
use std::time::Duration;

use ciliai_common::{CiliaiError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{ArticleSource, EffectLabel};

/// Which evidence providers a run consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Live literature mining only.
    #[default]
    Literature,
    /// Curated database and screen data only. No network traffic.
    Expert,
    /// Curated evidence plus literature mining.
    Hybrid,
}

impl AnalysisMode {
    pub fn uses_literature(&self) -> bool {
        matches!(self, AnalysisMode::Literature | AnalysisMode::Hybrid)
    }

    pub fn uses_curated(&self) -> bool {
        matches!(self, AnalysisMode::Expert | AnalysisMode::Hybrid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Literature => "literature",
            AnalysisMode::Expert     => "expert",
            AnalysisMode::Hybrid     => "hybrid",
        }
    }
}

impl std::str::FromStr for AnalysisMode {
    type Err = CiliaiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literature" | "nlp" => Ok(AnalysisMode::Literature),
            "expert"             => Ok(AnalysisMode::Expert),
            "hybrid"             => Ok(AnalysisMode::Hybrid),
            other => Err(CiliaiError::Config(format!(
                "unknown analysis mode {other:?}; expected literature, expert or hybrid"
            ))),
        }
    }
}

/// A labelled regex tested against context text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectPattern {
    pub label: EffectLabel,
    pub pattern: String,
}

/// Keyword sets that map manipulations and phenotypes to roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceLexicon {
    #[serde(default = "default_loss")]
    pub loss: Vec<String>,
    #[serde(default = "default_gain")]
    pub gain: Vec<String>,
    #[serde(default = "default_length_decrease")]
    pub length_decrease: Vec<String>,
    #[serde(default = "default_length_increase")]
    pub length_increase: Vec<String>,
    #[serde(default = "default_length_neutral")]
    pub length_neutral: Vec<String>,
    #[serde(default = "default_length_variable")]
    pub length_variable: Vec<String>,
    #[serde(default = "default_freq_decrease")]
    pub freq_decrease: Vec<String>,
    #[serde(default = "default_freq_increase")]
    pub freq_increase: Vec<String>,
    #[serde(default = "default_freq_neutral")]
    pub freq_neutral: Vec<String>,
}

impl Default for InferenceLexicon {
    fn default() -> Self {
        Self {
            loss: default_loss(),
            gain: default_gain(),
            length_decrease: default_length_decrease(),
            length_increase: default_length_increase(),
            length_neutral: default_length_neutral(),
            length_variable: default_length_variable(),
            freq_decrease: default_freq_decrease(),
            freq_increase: default_freq_increase(),
            freq_neutral: default_freq_neutral(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_loss() -> Vec<String> {
    strings(&[
        "depletion", "deficient", "loss of", "knockout", "ko", "mutant",
        "silencing", "abrogated", "disruption", "ablation", "null",
        "knockdown", "kd", "impaired", "mutation", "defects", "lacking",
        "deleted", "frameshift", "nonsense", "homozygous", "truncating",
        "generated mutants", "crispr/cas9", "loss-of-function", "lof",
        "shrnas targeting",
    ])
}

fn default_gain() -> Vec<String> {
    strings(&[
        "overexpression", "ectopic expression", "transfection with wild-type",
        "rescued", "restoring", "treatment with", "application of", "expressing",
        "gain-of-function", "gof", "constitutively active", "stabilized",
        "hyperactive", "induced expression",
    ])
}

fn default_length_decrease() -> Vec<String> {
    strings(&[
        "shorter", "shortened", "decrease in length", "reduced length",
        "reduction in length", "decreased the length", "diminished length",
        "loss of axonemal length", "stunted", "hypoplastic cilia",
    ])
}

fn default_length_increase() -> Vec<String> {
    strings(&[
        "longer", "elongated", "increase in length", "increased ciliary length",
        "elongation of", "twofold increase in the average length",
        "hyperelongated", "over-extended", "significantly lengthened",
    ])
}

fn default_length_neutral() -> Vec<String> {
    strings(&[
        "length remained unchanged", "no difference in the primary ciliary length",
        "length was not altered", "length was similar",
        "did not significantly alter cilia length", "unchanged ciliary length",
        "not statistically different", "comparable length",
        "cilia length remained unchanged",
    ])
}

fn default_length_variable() -> Vec<String> {
    strings(&[
        "altered cilia length", "abnormal morphology", "variations in cilia size",
        "diverse", "broader length distribution", "greater variation",
        "heterogeneous length", "mixed phenotype", "inconsistent length changes",
        "change cilia length", "change ciliary length", "change in cilia length",
        "alter cilia length", "alter ciliary length", "affect cilia length",
        "affect ciliary length",
    ])
}

fn default_freq_decrease() -> Vec<String> {
    strings(&[
        "fewer", "reduced number", "decrease in number", "loss of cilia",
        "absence of primary cilia", "ciliogenesis defect", "impaired ciliogenesis",
        "suppresses cilium formation", "required for cilia formation",
        "lower rate of ciliated", "failed to form",
        "deficit in de novo cilia formation", "diminished",
        "abrogated ciliogenesis", "failure of ciliogenesis",
        "prevented cilia assembly", "ciliation was abolished",
        "significant reduction in ciliation", "markedly decreased frequency",
        "number of ciliated cells decreased",
    ])
}

fn default_freq_increase() -> Vec<String> {
    strings(&[
        "increase in the percentage of ciliated",
        "increased the numbers of ciliated",
        "increase in the percent of ciliated",
        "multiciliogenesis", "induced primary ciliogenesis",
        "hyper-ciliation", "enhanced ciliogenesis",
        "promoted cilium formation", "stimulated ciliogenesis",
    ])
}

fn default_freq_neutral() -> Vec<String> {
    strings(&[
        "did not affect ciliation levels", "normal rate of ciliation",
        "ciliation unaffected", "no significant change in ciliation",
        "comparable fraction of ciliated cells",
    ])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerConfig {
    #[serde(default)]
    pub mode: AnalysisMode,
    #[serde(default = "default_sources")]
    pub sources: Vec<ArticleSource>,
    #[serde(default = "default_articles_per_gene")]
    pub articles_per_gene: usize,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    #[serde(default = "default_min_fragment_len")]
    pub min_fragment_len: usize,
    #[serde(default = "default_eutils_base")]
    pub eutils_base: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_tool")]
    pub tool: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_query_keywords")]
    pub query_keywords: Vec<String>,
    #[serde(default = "default_local_keywords")]
    pub local_keywords: Vec<String>,
    #[serde(default = "default_collective_phrases")]
    pub collective_phrases: Vec<String>,
    #[serde(default)]
    pub lexicon: InferenceLexicon,
    #[serde(default = "default_effect_patterns")]
    pub effect_patterns: Vec<EffectPattern>,
    #[serde(default)]
    pub screen_data_path: Option<PathBuf>,
}

fn default_sources()           -> Vec<ArticleSource> { vec![ArticleSource::PubMed, ArticleSource::Pmc] }
fn default_articles_per_gene() -> usize  { 20 }
fn default_timeout_secs()      -> u64    { 30 }
fn default_max_retries()       -> u32    { 3 }
fn default_backoff_base_ms()   -> u64    { 500 }
fn default_pacing_ms()         -> u64    { 340 }
fn default_context_window()    -> usize  { 2 }
fn default_min_fragment_len()  -> usize  { 10 }
fn default_eutils_base()       -> String { "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string() }
fn default_user_agent()        -> String { format!("CiliAI/{} (+https://theciliahub.github.io)", env!("CARGO_PKG_VERSION")) }
fn default_tool()              -> String { "ciliai".to_string() }

fn default_query_keywords() -> Vec<String> {
    strings(&[
        "cilia", "ciliary", "cilia length", "ciliary length", "shorter cilia",
        "longer cilia", "ciliogenesis", "ciliation", "loss of cilia", "fewer cilia",
        "impaired ciliogenesis", "cilia assembly", "fluid flow", "mucociliary",
        "multiciliated", "primary cilium", "axoneme", "basal body",
    ])
}

fn default_local_keywords() -> Vec<String> {
    strings(&[
        "cilia", "ciliary", "cilium", "ciliogenesis", "ciliation", "axoneme",
        "basal body", "cilia length", "shorter", "shortened", "longer", "fewer",
        "reduction", "reduced", "decrease", "increased", "increase", "flow",
        "fluid flow", "mucociliary", "multiciliated", "extracellular fluid",
        "bead", "beads", "displacement", "cilia-generated", "mucociliary clearance",
    ])
}

fn default_collective_phrases() -> Vec<String> {
    strings(&[
        "these mutants", "these single mutants", "all mutants", "all genes",
        "each mutant", "compared to control",
    ])
}

fn effect(label: EffectLabel, pattern: &str) -> EffectPattern {
    EffectPattern { label, pattern: pattern.to_string() }
}

fn default_effect_patterns() -> Vec<EffectPattern> {
    vec![
        effect(
            EffectLabel::Shorter,
            r"(?i)\b(shorter|shortened|shortening|stunted|truncated cilia|reduced (cilia |ciliary )?length|decrease[ds]? in (cilia |ciliary )?length)\b",
        ),
        effect(
            EffectLabel::Fewer,
            r"(?i)\b(fewer|reduced number|decrease[ds]? in (the )?number|loss of (primary )?cilia|absence of (primary )?cilia|lack(ed|ing)? cilia|fail(ed|ure)? to form|impaired ciliogenesis|reduced ciliation|ciliation was abolished)\b",
        ),
        effect(
            EffectLabel::ReducedFlow,
            r"(?i)\b((reduced|decreased|impaired|abolished|diminished|disrupted|slower)\s+([\w-]+\s+){0,3}(fluid\s+)?flow|flow\s+(was\s+)?(reduced|decreased|impaired|abolished)|reduced (bead )?displacement|impaired mucociliary clearance)\b",
        ),
        effect(
            EffectLabel::Longer,
            r"(?i)\b(longer|elongated|lengthened|elongation|hyperelongated|over-extended|increased (cilia |ciliary )?length|increase in (cilia |ciliary )?length)\b",
        ),
        effect(
            EffectLabel::NoChange,
            r"(?i)\b(no (significant )?(change|difference|effect)|unchanged|unaltered|unaffected|not (significantly )?(altered|affected|changed|different)|did not (significantly )?(alter|affect|change)|comparable to (control|wild[- ]type))\b",
        ),
        effect(
            EffectLabel::Increased,
            r"(?i)\b(increased|increase in|more cilia|enhanced ciliogenesis|hyper-?ciliation|multiciliogenesis|upregulated)\b",
        ),
    ]
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::default(),
            sources: default_sources(),
            articles_per_gene: default_articles_per_gene(),
            request_timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            pacing_ms: default_pacing_ms(),
            context_window: default_context_window(),
            min_fragment_len: default_min_fragment_len(),
            eutils_base: default_eutils_base(),
            user_agent: default_user_agent(),
            tool: default_tool(),
            email: None,
            api_key: None,
            query_keywords: default_query_keywords(),
            local_keywords: default_local_keywords(),
            collective_phrases: default_collective_phrases(),
            lexicon: InferenceLexicon::default(),
            effect_patterns: default_effect_patterns(),
            screen_data_path: None,
        }
    }
}

impl MinerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Query keywords with duplicates removed, first occurrence kept.
    pub fn query_vocabulary(&self) -> Vec<String> {
        dedup_lowercase(self.query_keywords.iter())
    }

    /// Local analysis keywords: the query vocabulary plus the local list, de-duplicated.
    pub fn analysis_keywords(&self) -> Vec<String> {
        dedup_lowercase(self.query_keywords.iter().chain(self.local_keywords.iter()))
    }

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.articles_per_gene == 0 {
            return Err(CiliaiError::Config("articles_per_gene must be at least 1".into()));
        }
        if self.max_retries == 0 {
            return Err(CiliaiError::Config("max_retries must be at least 1".into()));
        }
        if self.mode.uses_literature() && self.sources.is_empty() {
            return Err(CiliaiError::Config("no literature sources enabled".into()));
        }
        if self.query_vocabulary().is_empty() {
            return Err(CiliaiError::Config("query_keywords must not be empty".into()));
        }
        for p in &self.effect_patterns {
            Regex::new(&p.pattern).map_err(|e| {
                CiliaiError::Config(format!("effect pattern for {} does not compile: {e}", p.label.as_str()))
            })?;
        }
        Ok(())
    }
}

fn dedup_lowercase<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for kw in items {
        let kw = kw.trim().to_lowercase();
        if !kw.is_empty() && !out.contains(&kw) {
            out.push(kw);
        }
    }
    out
}
