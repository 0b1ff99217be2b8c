use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::CiliaiError;

/// Hosts the miner is allowed to reach by default.
const DEFAULT_ALLOWLIST: &[&str] = &[
    "eutils.ncbi.nlm.nih.gov", // E-utilities (esearch/efetch)
    "www.ncbi.nlm.nih.gov",    // PMC
    "pubmed.ncbi.nlm.nih.gov", // PubMed
    "www.ebi.ac.uk",           // Europe PMC mirror
    "localhost",               // local mirrors and test servers
    "127.0.0.1",
];

/// An HTTP client capped to an allowlist of approved domains.
///
/// Every outbound request carries the same identifying user-agent and is
/// bounded by the client-wide timeout.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a client with the default allowlist.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, CiliaiError> {
        let allowlist = DEFAULT_ALLOWLIST.iter().map(|d| d.to_string()).collect();

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| CiliaiError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Exact match or a subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Builds a GET request if the URL is permitted.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, CiliaiError> {
        if !self.is_allowed(url) {
            return Err(CiliaiError::SecurityError(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.get(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SandboxClient {
        SandboxClient::new(Duration::from_secs(5), "ciliai-test/0.1").unwrap()
    }

    #[test]
    fn test_eutils_allowed() {
        let c = client();
        assert!(c.is_allowed("https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi"));
        assert!(c.is_allowed("http://127.0.0.1:8080/esearch.fcgi"));
    }

    #[test]
    fn test_unknown_domain_rejected() {
        let c = client();
        assert!(!c.is_allowed("https://example.com/esearch.fcgi"));
        assert!(!c.is_allowed("not a url"));
        assert!(matches!(
            c.get("https://example.com/"),
            Err(CiliaiError::SecurityError(_))
        ));
    }

    #[test]
    fn test_allow_domain_extends_policy() {
        let mut c = client();
        c.allow_domain("mirror.example.org");
        assert!(c.is_allowed("https://mirror.example.org/efetch"));
        assert!(c.is_allowed("https://eu.mirror.example.org/efetch"));
    }
}
