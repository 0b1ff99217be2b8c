//! Curated evidence: the built-in expert table and optional ciliary screen data.

use std::collections::HashMap;
use std::path::Path;

use ciliai_common::Result;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::locator::GeneMatcher;
use crate::models::{CuratedEvidence, CuratedOrigin};

struct ExpertEntry {
    gene: &'static str,
    pmid: &'static str,
    context: &'static str,
}

const EXPERT_DB: &[ExpertEntry] = &[
    ExpertEntry {
        gene: "HDAC6",
        pmid: "21873644",
        context: "...loss of HDAC6 results in hyperacetylation of tubulin and leads to the formation of longer, more stable primary cilia in renal epithelial cells.",
    },
    ExpertEntry {
        gene: "IFT88",
        pmid: "10882118",
        context: "Mutations in IFT88 (polaris) disrupt intraflagellar transport, leading to a failure in cilia assembly and resulting in severely shortened or absent cilia.",
    },
    ExpertEntry {
        gene: "ARL13B",
        pmid: "21940428",
        context: "The small GTPase ARL13B is critical for ciliary structure; its absence leads to stunted cilia with abnormal morphology and axonemal defects.",
    },
];

/// One gene's row in a ciliary screen data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ScreenRecord {
    #[serde(default)]
    pub cilia_length: Value,
    #[serde(default)]
    pub percent_ciliated: Value,
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "not reported".to_string(),
        other => other.to_string(),
    }
}

impl ScreenRecord {
    fn context(&self, gene: &str) -> String {
        format!(
            "Ciliary screen data indicates a length phenotype of \"{}\" following knockdown of {gene}, \
             while the ciliation frequency phenotype of {gene} knockdown is \"{}\".",
            display(&self.cilia_length),
            display(&self.percent_ciliated),
        )
    }
}

/// Read a screen data file (`{"GENE": {"cilia_length": .., "percent_ciliated": ..}}`).
/// Gene keys are uppercased.
pub fn load_screen_data(path: &Path) -> Result<HashMap<String, ScreenRecord>> {
    let raw = std::fs::read_to_string(path)?;
    let parsed: HashMap<String, ScreenRecord> = serde_json::from_str(&raw)?;
    Ok(parsed
        .into_iter()
        .map(|(gene, record)| (gene.trim().to_uppercase(), record))
        .collect())
}

#[derive(Default)]
pub struct CuratedStore {
    screen: HashMap<String, ScreenRecord>,
}

impl CuratedStore {
    pub fn new(screen: HashMap<String, ScreenRecord>) -> Self {
        Self { screen }
    }

    /// Store with screen data from `path`. A missing or malformed file is
    /// logged and leaves the store with expert entries only.
    pub fn from_path(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match load_screen_data(path) {
            Ok(screen) => {
                info!(genes = screen.len(), path = %path.display(), "Screen data loaded");
                Self::new(screen)
            }
            Err(e) => {
                warn!(path = %path.display(), "Screen data unavailable: {}", e);
                Self::default()
            }
        }
    }

    pub fn screen_gene_count(&self) -> usize {
        self.screen.len()
    }

    /// Expert entries and screen evidence for `gene`, classified.
    pub fn evidence_for(&self, gene: &GeneMatcher, classifier: &Classifier) -> Vec<CuratedEvidence> {
        let key = gene.symbol().to_uppercase();

        let expert = EXPERT_DB
            .iter()
            .filter(|e| e.gene == key)
            .map(|e| CuratedEvidence {
                id: e.pmid.to_string(),
                origin: CuratedOrigin::ExpertDb,
                context: e.context.to_string(),
                effects: classifier.detect_effect(e.context),
                inferred_roles: classifier.interpret_evidence(gene, e.context),
                ref_link: Some(format!("https://pubmed.ncbi.nlm.nih.gov/{}/", e.pmid)),
            });

        let screen = self.screen.get(&key).map(|record| {
            let context = record.context(gene.symbol());
            CuratedEvidence {
                id: format!("Screen-{}", gene.symbol()),
                origin: CuratedOrigin::ScreenData,
                effects: classifier.detect_effect(&context),
                inferred_roles: classifier.interpret_evidence(gene, &context),
                context,
                ref_link: None,
            }
        });

        expert.chain(screen).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::classifier::summarize;
    use crate::config::MinerConfig;
    use crate::models::{EffectLabel, Role, SummaryLabel};

    fn classifier() -> Classifier {
        Classifier::new(&MinerConfig::default()).unwrap()
    }

    #[test]
    fn test_expert_entries_are_classified() {
        let store = CuratedStore::default();
        let c = classifier();

        let hdac6 = store.evidence_for(&GeneMatcher::new("hdac6").unwrap(), &c);
        assert_eq!(hdac6.len(), 1);
        assert_eq!(hdac6[0].id, "21873644");
        assert_eq!(hdac6[0].inferred_roles.length, vec![Role::Inhibits]);
        assert!(hdac6[0].effects.contains(&EffectLabel::Longer));
        assert_eq!(hdac6[0].ref_link.as_deref(), Some("https://pubmed.ncbi.nlm.nih.gov/21873644/"));

        let ift88 = store.evidence_for(&GeneMatcher::new("IFT88").unwrap(), &c);
        assert_eq!(summarize(&ift88[0].inferred_roles.length), SummaryLabel::PromotesMaintains);

        assert!(store.evidence_for(&GeneMatcher::new("BBS1").unwrap(), &c).is_empty());
    }

    #[test]
    fn test_screen_data_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"bbs1": {{"cilia_length": "Shorter", "percent_ciliated": "Fewer ciliated cells"}},
                "TTLL5": {{"cilia_length": 3.4}}}}"#
        )
        .unwrap();

        let store = CuratedStore::from_path(Some(file.path()));
        assert_eq!(store.screen_gene_count(), 2);

        let ev = store.evidence_for(&GeneMatcher::new("BBS1").unwrap(), &classifier());
        assert_eq!(ev.len(), 1);
        assert_eq!(ev[0].id, "Screen-BBS1");
        assert_eq!(ev[0].origin, CuratedOrigin::ScreenData);
        assert!(ev[0].context.starts_with("Ciliary screen data indicates a length phenotype of \"Shorter\""));
        assert_eq!(ev[0].inferred_roles.length, vec![Role::Promotes]);
        assert_eq!(ev[0].inferred_roles.frequency, vec![Role::Promotes]);
        assert!(ev[0].ref_link.is_none());
    }

    #[test]
    fn test_missing_or_malformed_screen_file_is_tolerated() {
        let store = CuratedStore::from_path(Some(Path::new("/nonexistent/ciliai-screen.json")));
        assert_eq!(store.screen_gene_count(), 0);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_screen_data(file.path()).is_err());
        assert_eq!(CuratedStore::from_path(Some(file.path())).screen_gene_count(), 0);
    }
}
