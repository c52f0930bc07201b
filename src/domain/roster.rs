//! Static reference data the dashboard renders alongside live figures.

use serde::Serialize;

/// Record sets read for every snapshot
pub mod tables {
    pub const TASKS: &str = "factory_tasks";
    pub const STEPS: &str = "factory_steps";
    pub const EVENTS: &str = "factory_events";
    pub const POLICY: &str = "factory_policy";
    pub const TRIGGERS: &str = "factory_triggers";
    pub const REVENUE: &str = "revenue_events";
    pub const PRODUCTS: &str = "products";
    pub const OPPORTUNITIES: &str = "opportunities";
    pub const SESSIONS: &str = "agent_sessions";
    pub const TOKEN_USAGE: &str = "token_usage";
    pub const MODEL_ROUTING: &str = "model_routing";
    pub const POSITIONS: &str = "v3_positions";
    pub const SIGNALS: &str = "v3_signals";
    pub const AFFILIATE_CLICKS: &str = "affiliate_clicks";
}

/// Record sets advertised to the dashboard's data browser
pub const KNOWN_TABLES: [&str; 13] = [
    tables::TASKS,
    tables::STEPS,
    tables::EVENTS,
    tables::POLICY,
    tables::TRIGGERS,
    tables::REVENUE,
    tables::PRODUCTS,
    tables::OPPORTUNITIES,
    tables::SESSIONS,
    tables::TOKEN_USAGE,
    tables::MODEL_ROUTING,
    tables::POSITIONS,
    tables::SIGNALS,
];

#[derive(Debug, Clone, Copy)]
pub struct AgentProfile {
    pub id: &'static str,
    pub role: &'static str,
    pub icon: &'static str,
    /// Position on the dashboard's agent ring, in degrees
    pub angle: u16,
    pub color: &'static str,
}

pub const AGENTS: [AgentProfile; 6] = [
    AgentProfile { id: "alfred", role: "COO", icon: "🎩", angle: 270, color: "#00d4ff" },
    AgentProfile { id: "isaiah", role: "Engineer", icon: "⚡", angle: 342, color: "#a78bfa" },
    AgentProfile { id: "paul", role: "Growth", icon: "📢", angle: 54, color: "#00ff88" },
    AgentProfile { id: "daniel", role: "Intel", icon: "🔍", angle: 126, color: "#fbbf24" },
    AgentProfile { id: "gordon", role: "Trading", icon: "📊", angle: 198, color: "#475569" },
    AgentProfile { id: "raphael", role: "Design", icon: "🎨", angle: 162, color: "#64748b" },
];

/// Agent that owns the gateway session shown in the infra panel
pub const COORDINATOR: &str = "alfred";

/// Agent that runs the trading desk
pub const TRADER: &str = "gordon";

/// Hand-off edges between agents, drawn as the network graph
pub const CONNECTIONS: [(&str, &str); 6] = [
    ("daniel", "paul"),
    ("paul", "alfred"),
    ("alfred", "isaiah"),
    ("daniel", "alfred"),
    ("alfred", "raphael"),
    ("raphael", "isaiah"),
];

#[derive(Debug, Clone, Copy)]
pub struct ScannerDef {
    pub name: &'static str,
    pub freq: &'static str,
    pub icon: &'static str,
}

impl ScannerDef {
    /// A scanner with no cadence has not been built yet.
    pub fn is_planned(&self) -> bool {
        self.freq == "—"
    }

    /// `"Crypto Prices"` → `"crypto_prices"`, the id scanners report under.
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
    }
}

pub const SCANNERS: [ScannerDef; 8] = [
    ScannerDef { name: "Polymarket", freq: "4h", icon: "📈" },
    ScannerDef { name: "Reddit", freq: "6h", icon: "🔴" },
    ScannerDef { name: "Crypto Prices", freq: "30m", icon: "₿" },
    ScannerDef { name: "GSC Keywords", freq: "daily", icon: "🔑" },
    ScannerDef { name: "Hacker News", freq: "—", icon: "🟠" },
    ScannerDef { name: "Product Hunt", freq: "—", icon: "🐱" },
    ScannerDef { name: "Twitter/X", freq: "—", icon: "✕" },
    ScannerDef { name: "Amazon", freq: "—", icon: "📦" },
];

#[derive(Debug, Clone, Copy)]
pub struct CronDef {
    pub schedule: &'static str,
    pub job: &'static str,
    pub agent: &'static str,
}

pub const CRONS: [CronDef; 12] = [
    CronDef { schedule: "*/5m", job: "Watchdog", agent: "system" },
    CronDef { schedule: "*/30m", job: "OAuth Refresh", agent: "system" },
    CronDef { schedule: "*/30m", job: "Crypto Scan", agent: "daniel" },
    CronDef { schedule: "4h", job: "Polymarket", agent: "daniel" },
    CronDef { schedule: "6h", job: "Reddit Scan", agent: "daniel" },
    CronDef { schedule: "@reboot", job: "Gateway", agent: "system" },
    CronDef { schedule: "6 AM", job: "Keywords", agent: "daniel" },
    CronDef { schedule: "8 AM", job: "Content", agent: "paul" },
    CronDef { schedule: "9 AM", job: "Heartbeat", agent: "alfred" },
    CronDef { schedule: "10 AM", job: "Review", agent: "alfred" },
    CronDef { schedule: "8 PM", job: "Report", agent: "alfred" },
    CronDef { schedule: "Weekly", job: "Memory", agent: "alfred" },
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SocialAccount {
    #[serde(rename = "p")]
    pub platform: &'static str,
    #[serde(rename = "h")]
    pub handle: &'static str,
    #[serde(rename = "s")]
    pub status: &'static str,
}

pub const SOCIALS: [SocialAccount; 7] = [
    SocialAccount { platform: "X/Twitter", handle: "@GetPolyPulse", status: "ok" },
    SocialAccount { platform: "X/Twitter", handle: "@aistackpicks", status: "ok" },
    SocialAccount { platform: "Reddit", handle: "poly_trader_tx", status: "farm" },
    SocialAccount { platform: "Reddit", handle: "Fit_Mike_txfisher", status: "farm" },
    SocialAccount { platform: "Reddit", handle: "HonestFastTeam", status: "brand" },
    SocialAccount { platform: "Telegram", handle: "@Albert_Botstein_bot", status: "ok" },
    SocialAccount { platform: "GitHub", handle: "alfredbotstein-commits", status: "ok" },
];

/// Roadmap phases with their baseline completion percentage
pub const PHASES: [(&str, &str, u8); 7] = [
    ("1", "Foundation", 100),
    ("1B", "Factory Tooling", 65),
    ("2", "First Revenue", 20),
    ("3", "Scale", 0),
    ("4", "Trading", 0),
    ("5", "Business Intake", 0),
    ("6", "Full Autonomy", 10),
];

/// Phase whose progress moves once the first revenue lands
pub const REVENUE_PHASE: &str = "2";

/// Cost tiers: `(tier label, representative model)`
pub const TIER_LABELS: [(&str, &str); 3] = [
    ("T1 Routine", "Kimi k2.5"),
    ("T2 Standard", "Sonnet 4.5"),
    ("T3 Complex", "Opus 4.5"),
];

/// Trading desk playbook shown on the trader's card
pub const DESK_STRATEGIES: [&str; 4] = ["Grid (Low)", "Momentum (Med)", "F&G DCA (Low)", "Arb (Opp)"];

/// Gateway host facts shown in the infra panel
pub struct HostFacts {
    pub host: &'static str,
    pub gateway_port: &'static str,
    pub runtime_version: &'static str,
    pub context_window: &'static str,
    pub reserve: &'static str,
}

pub const HOST: HostFacts = HostFacts {
    host: "online",
    gateway_port: ":18789",
    runtime_version: "2026.2.18",
    context_window: "~42K/200K",
    reserve: "40K",
};

pub fn agent_ids() -> impl Iterator<Item = &'static str> {
    AGENTS.iter().map(|a| a.id)
}
