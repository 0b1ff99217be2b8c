//! Heuristic relevance score for an evidence context.
//!
//! raw = min(3, gene mentions) + min(4, keyword hits)
//!     + proximity (up to 2, gene vs nearest keyword within 120 chars)
//!     + 1.5 if quantitative + 1.0 if a manipulation keyword is present
//! score = min(1, raw / 9)

use std::sync::OnceLock;

use regex::Regex;

use crate::config::MinerConfig;
use crate::locator::GeneMatcher;

const PROXIMITY_WINDOW: f64 = 120.0;
const MAX_RAW: f64 = 9.0;

fn quantitative() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b\d+(?:\.\d+)?\s?(?:µm|μm|%|±|vs\b|fold\b|-fold\b)|\b(?:twofold|threefold|fold-change)\b",
        )
        .expect("static quantitative regex")
    })
}

/// Numeric measurement such as `2.5 µm`, `40%`, `3-fold` or `twofold`.
pub fn has_quantitative_data(text: &str) -> bool {
    quantitative().is_match(text)
}

pub struct RelevanceScorer {
    keywords: Vec<String>,
    manipulation: Vec<String>,
}

impl RelevanceScorer {
    pub fn new(config: &MinerConfig) -> Self {
        let manipulation = config
            .lexicon
            .loss
            .iter()
            .chain(config.lexicon.gain.iter())
            .map(|s| s.to_lowercase())
            .collect();
        Self { keywords: config.analysis_keywords(), manipulation }
    }

    pub fn score(&self, text: &str, gene: &GeneMatcher) -> f64 {
        let lower = text.to_lowercase();

        let gene_score = gene.count(&lower).min(3) as f64;
        let keyword_score = self
            .keywords
            .iter()
            .filter(|kw| lower.contains(kw.as_str()))
            .count()
            .min(4) as f64;

        let proximity = gene
            .first_offset(&lower)
            .map(|g| {
                self.keywords
                    .iter()
                    .filter_map(|kw| lower.find(kw.as_str()))
                    .map(|k| (PROXIMITY_WINDOW - k.abs_diff(g) as f64) / PROXIMITY_WINDOW * 2.0)
                    .fold(0.0_f64, f64::max)
            })
            .unwrap_or(0.0);

        let quant_bonus = if has_quantitative_data(&lower) { 1.5 } else { 0.0 };
        let manip_bonus = if self.manipulation.iter().any(|m| lower.contains(m.as_str())) { 1.0 } else { 0.0 };

        let raw = gene_score + keyword_score + proximity + quant_bonus + manip_bonus;
        (raw / MAX_RAW).min(1.0)
    }
}
