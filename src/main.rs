use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use kitestore::{
    AsyncStoreWorker, MessageBody, MessageEntity, MessageHeader, MessageStore, StoreConfig,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "kitestore")]
#[command(about = "Load an in-flight message store and run a redelivery scan")]
struct Cli {
    /// Storage url
    #[arg(long, default_value = "mmap://file=.&initcap=1000&maxcap=10000")]
    url: String,

    /// Number of synthetic messages to save
    #[arg(long, default_value_t = 1000)]
    messages: usize,

    /// Commit every K-th message through the async worker (0 disables)
    #[arg(long, default_value_t = 3)]
    commit_every: usize,

    /// Page size of the redelivery scan
    #[arg(long, default_value_t = 20)]
    limit: usize,

    #[arg(long)]
    topic: Option<String>,

    /// Print the page as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = StoreConfig::from_url(&cli.url)
        .with_context(|| format!("Failed to parse storage url '{}'", cli.url))?;
    let store = Arc::new(config.open().context("Failed to open store")?);
    store.start();

    let topic = cli.topic.as_deref().unwrap_or("trade");
    let now = Utc::now().timestamp();
    let mut ids = Vec::with_capacity(cli.messages);
    for i in 0..cli.messages {
        let id = Uuid::new_v4().simple().to_string();
        let header = MessageHeader::new(&id, topic)
            .message_type("pay-succ")
            .group_id("ps-trade-a")
            .deliver_limit(100)
            .expired_time(-1);
        let entity = MessageEntity::new(header, MessageBody::Text(format!("message {}", i)))
            .kite_server("kiteserver-0")
            .expired_time(now + 3600)
            .next_deliver_time(now - (cli.messages - i) as i64);
        store.save(entity);
        ids.push(id);
    }

    let worker = AsyncStoreWorker::spawn(store.clone(), config.async_queue_depth);
    if cli.commit_every > 0 {
        let handle = worker.handle()?;
        for id in ids.iter().step_by(cli.commit_every) {
            handle.commit(id).await?;
        }
    }
    let worker_stats = worker.shutdown().await?;
    info!(
        applied = worker_stats.applied,
        rejected = worker_stats.rejected,
        "async commits applied"
    );

    let page = store.page_query_entity("", "kiteserver-0", now, 0, cli.limit);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&page.entities)?);
    } else {
        for entity in &page.entities {
            println!(
                "{}  topic={} commit={} deliver_count={} next_deliver_time={}",
                entity.message_id,
                entity.topic,
                entity.commit,
                entity.deliver_count,
                entity.next_deliver_time
            );
        }
    }

    let stats = store.stats();
    println!(
        "page: {} entities, has_more={} | store: {}/{} saved={} evicted={}",
        page.entities.len(),
        page.has_more,
        stats.len,
        stats.max_capacity,
        stats.saved,
        stats.evicted
    );

    store.stop();
    Ok(())
}
