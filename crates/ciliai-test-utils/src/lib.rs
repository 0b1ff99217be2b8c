//! Shared fixtures for CiliAI tests.
//!
//! XML documents mirror the shape of real E-utilities efetch responses,
//! trimmed to the elements the extractors read.

pub mod fixtures;

use serde_json::{json, Value};

/// An esearch JSON response carrying `ids`.
pub fn esearch_response(ids: &[&str]) -> Value {
    json!({
        "header": {"type": "esearch", "version": "0.3"},
        "esearchresult": {
            "count": ids.len().to_string(),
            "retmax": ids.len().to_string(),
            "retstart": "0",
            "idlist": ids,
        }
    })
}
