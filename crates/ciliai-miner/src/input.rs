//! Gene list and question parsing.

use std::sync::OnceLock;

use regex::Regex;

/// Split on whitespace and commas, uppercase, drop duplicates keeping first occurrence.
pub fn parse_gene_list(text: &str) -> Vec<String> {
    let mut genes: Vec<String> = Vec::new();
    for token in text.split(|c: char| c.is_whitespace() || c == ',') {
        let gene = token.trim().to_uppercase();
        if !gene.is_empty() && !genes.contains(&gene) {
            genes.push(gene);
        }
    }
    genes
}

fn symbol_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Z0-9]{3,})\b").expect("static symbol regex"))
}

/// First gene-like token (3+ uppercase letters/digits) in a free-text question.
pub fn detect_gene_in_question(question: &str) -> Option<String> {
    symbol_token()
        .captures_iter(question)
        .map(|c| c[1].to_string())
        .find(|tok| tok.chars().any(|ch| ch.is_ascii_alphabetic()))
}
