//! Leaderboard demo for SkipKV.
//!
//! Stores player records, refreshes some of them with a weekly TTL, lets one
//! expire, and prints the ranking after each step.
//!
//! Run with `cargo run --example leaderboard`. Set `RUST_LOG=skipkv=debug`
//! to watch the reaper.

use bytes::Bytes;
use skipkv::{SkipListStore, StoreConfig};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const PLAYERS: &[(&str, &str, u32)] = &[
    ("player:1001", "Zhang", 8750),
    ("player:1002", "Li", 9320),
    ("player:1003", "Wang", 7600),
    ("player:1004", "Zhao", 9100),
    ("player:1005", "Sun", 8900),
    ("player:1006", "Zhou", 7200),
    ("player:1007", "Wu", 9500),
    ("player:1008", "Zheng", 8300),
];

/// Parses a `name|score` record.
fn parse_record(value: &[u8]) -> Option<(String, u32)> {
    let text = std::str::from_utf8(value).ok()?;
    let (name, score) = text.split_once('|')?;
    Some((name.to_string(), score.parse().ok()?))
}

fn record(name: &str, score: u32) -> Bytes {
    Bytes::from(format!("{name}|{score}"))
}

fn print_leaderboard(store: &SkipListStore) {
    let mut players: Vec<(String, u32)> = store
        .keys()
        .into_iter()
        .filter(|key| key.starts_with(b"player:"))
        .filter_map(|key| store.get(&key))
        .filter_map(|value| parse_record(&value))
        .collect();

    players.sort_by(|a, b| b.1.cmp(&a.1));

    println!("Leaderboard (highest first):");
    for (rank, (name, score)) in players.iter().enumerate() {
        println!("  #{}: {name} - {score}", rank + 1);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let store = SkipListStore::open(StoreConfig {
        reap_interval: Duration::from_millis(500),
        ..Default::default()
    })?;

    println!("\n1. Adding players");
    for &(id, name, score) in PLAYERS {
        store.set(Bytes::from(id), record(name, score));
        println!("  added {name} with {score}");
    }

    println!("\n2. Current standings");
    print_leaderboard(&store);

    println!("\n3. Weekly score updates");
    for (id, new_score) in [("player:1001", 9100), ("player:1003", 8200), ("player:1006", 9800)] {
        let Some((name, _)) = store.get(id.as_bytes()).and_then(|v| parse_record(&v)) else {
            println!("  {id} not found");
            continue;
        };
        store.set_with_ttl(
            Bytes::from(id),
            record(&name, new_score),
            Duration::from_secs(7 * 24 * 60 * 60),
        )?;
        println!("  {name} now has {new_score} (valid for 7 days)");
    }

    println!("\n4. Standings after updates");
    print_leaderboard(&store);

    println!("\n5. Letting one record expire");
    let expiring = b"player:1002";
    if let Some(value) = store.get(expiring) {
        store.set_with_ttl(Bytes::from_static(expiring), value, Duration::from_secs(1))?;
        println!("  player:1002 expires in {:?}", store.ttl(expiring));
    }
    tokio::time::sleep(Duration::from_millis(1500)).await;

    println!("\n6. Standings after expiry");
    print_leaderboard(&store);

    println!("\n7. Prefix scan for players");
    let all = store.scan(b"player:", 0);
    println!("  found {} players", all.len());
    for (key, value) in &all {
        println!(
            "  {}: {}",
            String::from_utf8_lossy(key),
            String::from_utf8_lossy(value)
        );
    }

    let stats = store.stats();
    info!(
        keys = stats.keys,
        active = store.len_active(),
        levels = stats.levels,
        reaped = stats.reaped,
        "Store statistics"
    );

    store.close();
    Ok(())
}
