//! Evidence location: which paragraphs talk about a gene, and the bounded
//! sentence windows around each mention.

use ciliai_common::{CiliaiError, Result};
use regex::{Regex, RegexBuilder};

use crate::config::MinerConfig;

/// A queried gene symbol and its whole-word, case-insensitive matcher.
#[derive(Debug, Clone)]
pub struct GeneMatcher {
    symbol: String,
    regex: Regex,
}

impl GeneMatcher {
    pub fn new(symbol: &str) -> Result<Self> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(CiliaiError::InvalidGene(symbol.to_string()));
        }
        let regex = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(symbol)))
            .case_insensitive(true)
            .build()
            .map_err(|_| CiliaiError::InvalidGene(symbol.to_string()))?;
        Ok(Self { symbol: symbol.to_string(), regex })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn count(&self, text: &str) -> usize {
        self.regex.find_iter(text).count()
    }

    /// Byte offset of the first whole-word mention.
    pub fn first_offset(&self, text: &str) -> Option<usize> {
        self.regex.find(text).map(|m| m.start())
    }
}

/// Split on `.`, `!` or `?` followed by whitespace. Terminators stay with their sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(_, next)) = chars.peek() {
            if next.is_whitespace() {
                let end = i + c.len_utf8();
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    out.push(sentence);
                }
                start = end;
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

pub struct EvidenceLocator {
    keywords: Vec<String>,
    window: usize,
    collective: Option<Regex>,
}

impl EvidenceLocator {
    pub fn new(config: &MinerConfig) -> Result<Self> {
        let phrases: Vec<String> = config
            .collective_phrases
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(regex::escape)
            .collect();

        let collective = if phrases.is_empty() {
            None
        } else {
            let pattern = format!(r"\b({})\b", phrases.join("|"));
            Some(
                RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| CiliaiError::Config(format!("collective phrases: {e}")))?,
            )
        };

        Ok(Self {
            keywords: config.analysis_keywords(),
            window: config.context_window,
            collective,
        })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn has_keyword(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords.iter().any(|kw| lower.contains(kw.as_str()))
    }

    /// Whole-word gene mention plus at least one analysis keyword.
    pub fn paragraph_matches(&self, text: &str, gene: &GeneMatcher) -> bool {
        gene.is_match(text) && self.has_keyword(text)
    }

    pub fn is_collective(&self, text: &str) -> bool {
        self.collective.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// Queried genes named in `paragraph`; all of them when none is named but
    /// the paragraph uses a collective reference; otherwise none.
    pub fn subject_genes<'a>(&self, paragraph: &str, genes: &'a [GeneMatcher]) -> Vec<&'a GeneMatcher> {
        let named: Vec<&GeneMatcher> = genes.iter().filter(|g| g.is_match(paragraph)).collect();
        if !named.is_empty() {
            return named;
        }
        if self.is_collective(paragraph) {
            return genes.iter().collect();
        }
        Vec::new()
    }

    /// Keyword-bearing sentence windows around each mention of `gene`.
    pub fn sentence_context(&self, text: &str, gene: &GeneMatcher) -> Vec<String> {
        self.windows(text, |s| gene.is_match(s))
    }

    /// Keyword-bearing sentence windows around each collective reference.
    pub fn collective_context(&self, text: &str) -> Vec<String> {
        self.windows(text, |s| self.is_collective(s))
    }

    fn windows(&self, text: &str, anchor: impl Fn(&str) -> bool) -> Vec<String> {
        let sentences = split_sentences(text);
        let mut contexts: Vec<String> = Vec::new();
        let mut covered_until: Option<usize> = None;

        for (i, sentence) in sentences.iter().enumerate() {
            if !anchor(sentence) || covered_until.is_some_and(|end| i <= end) {
                continue;
            }
            // Windows never share sentences with the one emitted before.
            let start = match covered_until {
                Some(end) => i.saturating_sub(self.window).max(end + 1),
                None => i.saturating_sub(self.window),
            };
            let end = (i + self.window).min(sentences.len() - 1);
            let context = sentences[start..=end].join(" ");

            if self.has_keyword(&context) && !contexts.contains(&context) {
                contexts.push(context);
                covered_until = Some(end);
            }
        }
        contexts
    }
}
