//! Store, fetch and search a handful of documents.

use std::sync::Arc;

use anyhow::Result;
use futures_util::future::join_all;

use lexcache::{
    BankedArchive, CachedDocument, Config, InMemoryBackend, RiskLevel, SearchFilters,
    SearchOptions, SystemClock, TieredCache,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::default();
    let archive = Arc::new(BankedArchive::new(&config.archive));
    let cache = TieredCache::new(
        config,
        Arc::new(InMemoryBackend::new()),
        archive,
        Arc::new(SystemClock),
    )?;
    cache.start().await?;

    let documents = vec![
        CachedDocument::new("msa-2024", "contract")
            .with_title("Master Services Agreement")
            .with_content("Either party may terminate for material breach.")
            .with_priority(180)
            .with_confidence(0.9)
            .with_risk_level(RiskLevel::High),
        CachedDocument::new("exh-12", "evidence")
            .with_title("Exhibit 12")
            .with_content("Email thread discussing breach of delivery terms.")
            .with_priority(90)
            .with_confidence(0.7)
            .with_risk_level(RiskLevel::Medium),
        CachedDocument::new("smith-v-jones", "precedent")
            .with_title("Smith v. Jones")
            .with_summary("Anticipatory breach excused performance.")
            .with_priority(30)
            .with_confidence(0.6)
            .with_risk_level(RiskLevel::Low),
    ];

    let stored = join_all(documents.into_iter().map(|doc| cache.store(doc, None))).await;
    for result in stored {
        result?;
    }

    if let Some(doc) = cache.get("msa-2024").await {
        println!("fetched {} (accessed {} times)", doc.title, doc.access_count);
    }

    let results = cache
        .search(
            "breach",
            SearchFilters::default(),
            SearchOptions::default().highlight(true),
        )
        .await;
    for entry in &results {
        println!("{:>8.2}  {}  {:?}", entry.score, entry.id, entry.highlights);
    }

    let stats = cache.stats();
    println!(
        "L1 documents: {}, L3 failures: {}, hit ratio: {:.2}",
        stats.l1.documents, stats.l3_allocation_failures, stats.hit_ratio
    );

    cache.destroy().await?;
    Ok(())
}
