//! Effect detection and role inference over context text.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use ciliai_common::{CiliaiError, Result};
use regex::Regex;

use crate::config::{InferenceLexicon, MinerConfig};
use crate::locator::GeneMatcher;
use crate::models::{Axis, EffectLabel, InferredRoles, Role, SummaryLabel};

fn clause_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)[.!?]+\s+|\b(?:while|whereas|but)\b").expect("static clause regex")
    })
}

fn negation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(no|not|did not|none|unchanged|unaltered|without)\b").expect("static negation regex")
    })
}

/// A phenotype keyword category and the role it implies for each manipulation.
struct Category {
    axis: Axis,
    keywords: Vec<String>,
    on_loss: Role,
    on_gain: Role,
}

pub struct Classifier {
    effects: Vec<(EffectLabel, Regex)>,
    loss: Vec<String>,
    gain: Vec<String>,
    categories: Vec<Category>,
}

fn lowered(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Classifier {
    pub fn new(config: &MinerConfig) -> Result<Self> {
        let effects = config
            .effect_patterns
            .iter()
            .map(|p| {
                Regex::new(&p.pattern)
                    .map(|re| (p.label, re))
                    .map_err(|e| CiliaiError::Config(format!("effect pattern for {}: {e}", p.label.as_str())))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            effects,
            loss: lowered(&config.lexicon.loss),
            gain: lowered(&config.lexicon.gain),
            categories: categories(&config.lexicon),
        })
    }

    /// Every effect label whose pattern matches; `{unknown}` when none does.
    pub fn detect_effect(&self, text: &str) -> BTreeSet<EffectLabel> {
        let found: BTreeSet<EffectLabel> = self
            .effects
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(label, _)| *label)
            .collect();

        if found.is_empty() {
            BTreeSet::from([EffectLabel::Unknown])
        } else {
            found
        }
    }

    /// Role votes for `gene` from every clause of `text` that mentions it.
    pub fn interpret_evidence(&self, gene: &GeneMatcher, text: &str) -> InferredRoles {
        let mut roles = InferredRoles::default();

        for clause in clause_splitter().split(text) {
            if !gene.is_match(clause) {
                continue;
            }
            let lower = clause.to_lowercase();
            let negated = negation().is_match(&lower);
            let is_loss = self.loss.iter().any(|kw| lower.contains(kw.as_str()));
            let is_gain = self.gain.iter().any(|kw| lower.contains(kw.as_str()));

            for cat in &self.categories {
                if !cat.keywords.iter().any(|kw| lower.contains(kw.as_str())) {
                    continue;
                }
                if negated {
                    roles.vote(cat.axis, Role::Neutral);
                    continue;
                }
                if is_loss {
                    roles.vote(cat.axis, cat.on_loss);
                }
                if is_gain {
                    roles.vote(cat.axis, cat.on_gain);
                }
            }
        }
        roles
    }
}

fn categories(lex: &InferenceLexicon) -> Vec<Category> {
    let cat = |axis, keywords: &[String], on_loss, on_gain| Category {
        axis,
        keywords: lowered(keywords),
        on_loss,
        on_gain,
    };
    vec![
        cat(Axis::Length, &lex.length_decrease, Role::Promotes, Role::Inhibits),
        cat(Axis::Length, &lex.length_increase, Role::Inhibits, Role::Promotes),
        cat(Axis::Length, &lex.length_neutral, Role::Neutral, Role::Neutral),
        cat(Axis::Length, &lex.length_variable, Role::Variable, Role::Variable),
        cat(Axis::Frequency, &lex.freq_decrease, Role::Promotes, Role::Inhibits),
        cat(Axis::Frequency, &lex.freq_increase, Role::Inhibits, Role::Promotes),
        cat(Axis::Frequency, &lex.freq_neutral, Role::Neutral, Role::Neutral),
    ]
}

/// Collapse a set of role votes into one verdict. Conflict is checked first.
pub fn summarize(votes: &[Role]) -> SummaryLabel {
    if votes.is_empty() {
        return SummaryLabel::NoSpecificData;
    }
    let has = |r: Role| votes.contains(&r);
    let only = |r: Role| votes.iter().all(|v| *v == r);

    if has(Role::Promotes) && has(Role::Inhibits) {
        SummaryLabel::ConflictingData
    } else if has(Role::Promotes) {
        SummaryLabel::PromotesMaintains
    } else if has(Role::Inhibits) {
        SummaryLabel::InhibitsRestricts
    } else if only(Role::Variable) {
        SummaryLabel::AffectsMorphology
    } else if only(Role::Neutral) {
        SummaryLabel::NoClearRole
    } else {
        SummaryLabel::Unclear
    }
}
