//! NCBI E-utilities client shared by the PubMed and PMC sources.
//!
//! Endpoints used:
//!   esearch: <base>/esearch.fcgi  (JSON id list)
//!   efetch:  <base>/efetch.fcgi   (XML records, one combined request per batch)

use ciliai_common::Result;
use tracing::{debug, instrument, warn};

use crate::config::MinerConfig;
use crate::fetch::RateLimitedClient;

pub struct EutilsClient {
    http: RateLimitedClient,
    base: String,
    tool: String,
    email: Option<String>,
    api_key: Option<String>,
}

impl EutilsClient {
    pub fn new(config: &MinerConfig) -> Result<Self> {
        Ok(Self::with_client(RateLimitedClient::new(config)?, config))
    }

    pub fn with_client(http: RateLimitedClient, config: &MinerConfig) -> Self {
        Self {
            http,
            base: config.eutils_base.trim_end_matches('/').to_string(),
            tool: config.tool.clone(),
            email: config.email.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base, name)
    }

    fn identification_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("tool", self.tool.clone())];
        if let Some(email) = &self.email {
            params.push(("email", email.clone()));
        }
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    /// Search `db` and return the identifier list.
    #[instrument(skip(self))]
    pub async fn esearch(&self, db: &str, term: &str, retmax: usize) -> Result<Vec<String>> {
        let mut params = vec![
            ("db", db.to_string()),
            ("term", term.to_string()),
            ("retmode", "json".to_string()),
            ("retmax", retmax.to_string()),
        ];
        params.extend(self.identification_params());

        let resp = self.http
            .get_json(&self.endpoint("esearch.fcgi"), &params, &format!("{db} esearch"))
            .await?;

        let Some(list) = resp["esearchresult"]["idlist"].as_array() else {
            warn!(db, "esearch response carried no idlist");
            return Ok(vec![]);
        };
        let ids: Vec<String> = list
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();

        debug!(db, n = ids.len(), "esearch returned ids");
        Ok(ids)
    }

    /// Fetch XML records for `ids` from `db` in one combined request.
    #[instrument(skip(self, ids), fields(n = ids.len()))]
    pub async fn efetch(&self, db: &str, ids: &[String]) -> Result<String> {
        let mut params = vec![
            ("db", db.to_string()),
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
        ];
        params.extend(self.identification_params());

        self.http
            .get_text(&self.endpoint("efetch.fcgi"), &params, &format!("{db} efetch"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use ciliai_common::SandboxClient;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, config: &MinerConfig) -> EutilsClient {
        let sandbox = SandboxClient::new(Duration::from_secs(5), "ciliai-test/0.1").unwrap();
        let http = RateLimitedClient::from_parts(sandbox, Duration::from_secs(5), 1, Duration::from_millis(1));
        let mut cfg = config.clone();
        cfg.eutils_base = server.uri();
        EutilsClient::with_client(http, &cfg)
    }

    #[tokio::test]
    async fn test_esearch_sets_expected_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .and(query_param("db", "pubmed"))
            .and(query_param("term", "\"IFT88\" AND (\"cilia\")"))
            .and(query_param("retmode", "json"))
            .and(query_param("retmax", "20"))
            .and(query_param("tool", "ciliai"))
            .and(query_param("api_key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "esearchresult": {"count": "2", "idlist": ["111", "222"]}
            })))
            .mount(&server)
            .await;

        let cfg = MinerConfig { api_key: Some("secret".into()), ..MinerConfig::default() };
        let eutils = client(&server, &cfg);
        let ids = eutils.esearch("pubmed", "\"IFT88\" AND (\"cilia\")", 20).await.unwrap();
        assert_eq!(ids, vec!["111", "222"]);
    }

    #[tokio::test]
    async fn test_esearch_without_idlist_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "esearchresult": {"ERROR": "Invalid query"}
            })))
            .mount(&server)
            .await;

        let eutils = client(&server, &MinerConfig::default());
        assert!(eutils.esearch("pmc", "x", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_efetch_joins_ids_into_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/efetch.fcgi"))
            .and(query_param("db", "pmc"))
            .and(query_param("id", "1,2,3"))
            .and(query_param("retmode", "xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<pmc-articleset/>"))
            .expect(1)
            .mount(&server)
            .await;

        let eutils = client(&server, &MinerConfig::default());
        let ids = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        assert_eq!(eutils.efetch("pmc", &ids).await.unwrap(), "<pmc-articleset/>");
    }
}
