use serde_json::Value;
use tracing::debug;

use crate::adapters::QueryOpts;
use crate::domain::roster::tables;
use crate::domain::{
    AffiliateClick, Event, Opportunity, Policy, Position, Product, RevenueEntry, Session, Signal,
    Task, TokenUsage, Trigger,
};
use crate::services::SourceGateway;

/// Every record set a snapshot needs. Collections may be empty, never absent.
#[derive(Debug, Clone, Default)]
pub struct SourceBundle {
    pub tasks: Vec<Task>,
    pub events: Vec<Event>,
    pub policies: Vec<Policy>,
    pub triggers: Vec<Trigger>,
    pub revenue: Vec<RevenueEntry>,
    pub products: Vec<Product>,
    pub opportunities: Vec<Opportunity>,
    pub sessions: Vec<Session>,
    pub token_usage: Vec<TokenUsage>,
    pub model_routes: Vec<Value>,
    pub positions: Vec<Position>,
    pub signals: Vec<Signal>,
    pub affiliate_clicks: Vec<AffiliateClick>,
}

/// Read all record sets concurrently and wait for every read to finish.
///
/// `today` bounds the token-usage read to the current UTC date.
pub async fn fetch_bundle(gateway: &SourceGateway, today: &str) -> SourceBundle {
    let (
        tasks,
        events,
        policies,
        triggers,
        revenue,
        products,
        opportunities,
        sessions,
        token_usage,
        model_routes,
        positions,
        signals,
        affiliate_clicks,
    ) = tokio::join!(
        gateway.read::<Task>(tables::TASKS, QueryOpts::new().order_desc("created_at").limit(300)),
        gateway.read::<Event>(tables::EVENTS, QueryOpts::new().order_desc("created_at").limit(500)),
        gateway.read::<Policy>(tables::POLICY, QueryOpts::new()),
        gateway.read::<Trigger>(tables::TRIGGERS, QueryOpts::new()),
        gateway.read::<RevenueEntry>(tables::REVENUE, QueryOpts::new().order_desc("created_at").limit(200)),
        gateway.read::<Product>(tables::PRODUCTS, QueryOpts::new()),
        gateway.read::<Opportunity>(tables::OPPORTUNITIES, QueryOpts::new().order_desc("score").limit(30)),
        gateway.read::<Session>(tables::SESSIONS, QueryOpts::new().order_desc("started_at").limit(50)),
        gateway.read::<TokenUsage>(
            tables::TOKEN_USAGE,
            QueryOpts::new()
                .gte("created_at", today)
                .order_desc("created_at")
                .limit(500),
        ),
        gateway.read_raw(tables::MODEL_ROUTING, QueryOpts::new()),
        gateway.read::<Position>(tables::POSITIONS, QueryOpts::new().order_desc("opened_at").limit(500)),
        gateway.read::<Signal>(tables::SIGNALS, QueryOpts::new().order_desc("timestamp").limit(500)),
        gateway.read::<AffiliateClick>(
            tables::AFFILIATE_CLICKS,
            QueryOpts::new().order_desc("created_at").limit(500)
        ),
    );

    let bundle = SourceBundle {
        tasks,
        events,
        policies,
        triggers,
        revenue,
        products,
        opportunities,
        sessions,
        token_usage,
        model_routes,
        positions,
        signals,
        affiliate_clicks,
    };
    debug!(
        source = gateway.source_name(),
        tasks = bundle.tasks.len(),
        events = bundle.events.len(),
        sessions = bundle.sessions.len(),
        positions = bundle.positions.len(),
        signals = bundle.signals.len(),
        "Fetched source bundle"
    );
    bundle
}
