//! Live NCBI E-utilities checks.
//!
//! Run with: cargo test --package ciliai-miner --test test_live_pubmed -- --ignored --nocapture

use std::sync::Arc;

use ciliai_miner::sources::{EutilsClient, LiteratureSource, PmcSource, PubMedSource};
use ciliai_miner::{LiteratureMinerEngine, MinerConfig};

#[tokio::test]
#[ignore] // Requires network access
async fn test_pubmed_search_ift88() {
    let config = MinerConfig { articles_per_gene: 5, ..MinerConfig::default() };
    let eutils = Arc::new(EutilsClient::new(&config).expect("client"));
    let source = PubMedSource::new(eutils);

    let ids = source
        .search(r#""IFT88" AND ("cilia"[tiab])"#, 5)
        .await
        .expect("PubMed search failed");
    println!("Found {} ids: {:?}", ids.len(), ids);
    assert!(!ids.is_empty(), "Should find at least one paper");

    let records = source.fetch(&ids).await.expect("PubMed fetch failed");
    for r in &records {
        println!("\n---\nPMID: {}\nTitle: {}", r.id, r.title);
    }
    assert_eq!(records.len(), ids.len());
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_pmc_fetch_full_text() {
    let config = MinerConfig::default();
    let eutils = Arc::new(EutilsClient::new(&config).expect("client"));
    let source = PmcSource::new(eutils, config.min_fragment_len);

    let ids = source
        .search(r#""ARL13B" AND ("cilia length")"#, 2)
        .await
        .expect("PMC search failed");
    let records = source.fetch(&ids).await.expect("PMC fetch failed");
    for r in &records {
        println!("\n---\nID: {}\nTitle: {}\nBlocks: {}", r.id, r.title, r.body.blocks().len());
    }
    assert!(records.iter().all(|r| r.id.starts_with("PMC") || r.id.starts_with("unknown-")));
}

#[tokio::test]
#[ignore] // Requires network access, takes ~10s with pacing
async fn test_engine_run_two_genes() {
    let config = MinerConfig { articles_per_gene: 3, ..MinerConfig::default() };
    let engine = LiteratureMinerEngine::from_config(config).expect("engine");

    let report = engine
        .process_genes(&["IFT88".to_string(), "ARL13B".to_string()])
        .await;
    println!("{}", serde_json::to_string_pretty(&report).unwrap());
    assert_eq!(report.metadata.gene_count, 2);
}
