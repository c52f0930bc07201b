//! Snapshot assembly: source bundle in, dashboard document out.

pub mod agents;
pub mod assembler;
pub mod classify;
pub mod content;
pub mod feeds;
pub mod finance;
pub mod health;
pub mod tasks;
pub mod trading;

pub use assembler::{assemble, Snapshot};

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::domain::Clock;
use crate::services::{fetch_bundle, SourceGateway};

/// Fetch every record set and assemble a snapshot as of `now`.
#[instrument(skip_all, fields(source = gateway.source_name()))]
pub async fn build_snapshot(gateway: &SourceGateway, config: &AppConfig, now: DateTime<Utc>) -> Snapshot {
    let clock = Clock::at(now);
    let bundle = fetch_bundle(gateway, clock.today()).await;
    let snapshot = assemble(&bundle, config, &clock);
    info!(
        health = snapshot.health_score.score,
        grade = snapshot.health_score.grade,
        "Snapshot assembled"
    );
    snapshot
}
