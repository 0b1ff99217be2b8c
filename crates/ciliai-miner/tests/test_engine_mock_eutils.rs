//! End-to-end engine run against a mocked E-utilities server.

use ciliai_miner::{LiteratureMinerEngine, MinerConfig};
use ciliai_test_utils::{esearch_response, fixtures};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_eutils() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(esearch_response(&["10882118", "20000001"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pmc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(esearch_response(&[])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("id", "10882118,20000001"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixtures::PUBMED_TWO_ARTICLES))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("db", "pmc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    server
}

fn config(server: &MockServer) -> MinerConfig {
    MinerConfig {
        eutils_base: server.uri(),
        pacing_ms: 0,
        backoff_base_ms: 1,
        ..MinerConfig::default()
    }
}

#[tokio::test]
async fn test_engine_round_trip_over_http() {
    let server = mock_eutils().await;
    let engine = LiteratureMinerEngine::from_config(config(&server)).unwrap();

    let report = engine.process_genes(&["IFT88".to_string()]).await;
    let result = &report.results["IFT88"];
    assert_eq!(result.found_article_count(), 1);
    assert!(result.source_errors.is_empty());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["metadata"]["gene_count"], 1);
    assert_eq!(json["metadata"]["mode"], "literature");
    let gene = &json["results"]["IFT88"];
    assert_eq!(gene["found_article_count"], 1);
    assert_eq!(gene["articles"][0]["id"], "10882118");
    assert_eq!(gene["articles"][0]["source"], "pubmed");
    assert_eq!(gene["summary"]["length"], "Promotes/Maintains");
    assert!(gene.get("error").is_none());
}

#[tokio::test]
async fn test_unreachable_service_degrades_to_source_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let cfg = MinerConfig { max_retries: 2, ..config(&server) };
    let engine = LiteratureMinerEngine::from_config(cfg).unwrap();

    let report = engine.process_genes(&["BBS1".to_string()]).await;
    let result = &report.results["BBS1"];
    assert!(result.error.is_none());
    assert_eq!(result.source_errors.len(), 2);
    assert_eq!(result.found_article_count(), 0);
    // two sources, search only, two attempts each
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}
