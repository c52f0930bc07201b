use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::AppConfig;
use crate::domain::clock::wall_time;
use crate::domain::roster::{
    agent_ids, SocialAccount, CONNECTIONS, COORDINATOR, DESK_STRATEGIES, HOST, KNOWN_TABLES, PHASES,
    REVENUE_PHASE, SOCIALS, TRADER,
};
use crate::domain::{Clock, Session};
use crate::services::SourceBundle;
use crate::snapshot::agents::{self, ActivityItem, AgentReport, AgentStatus, AgentUptime};
use crate::snapshot::content::{self, ContentBoard, ContentVelocity};
use crate::snapshot::feeds::{self, CapGate, CronStatus, FeedItem, LastBriefing, ScannerStatus, TriggerState};
use crate::snapshot::finance::{
    self, OpportunityCard, ProductCard, RevenueChannel, RevenueDetail, RevenueSummary, TokenSummary,
};
use crate::snapshot::health::{self, HealthScore};
use crate::snapshot::tasks::{self, KanbanTask, Optimization, P0Item, PendingApproval, TaskSummary};
use crate::snapshot::trading::{self, ArbSummary, TradingReport};

/// Progress shown for the revenue phase once money has come in
const REVENUE_PHASE_PROGRESS: u8 = 40;

#[derive(Debug, Clone, Serialize)]
pub struct Connection {
    pub from: &'static str,
    pub to: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Phase {
    pub n: &'static str,
    #[serde(rename = "nm")]
    pub name: &'static str,
    #[serde(rename = "p")]
    pub progress: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct Infra {
    pub mac: &'static str,
    pub gw: &'static str,
    pub oc: &'static str,
    pub tok: &'static str,
    pub res: &'static str,
    /// Wall-clock time the coordinator's session last started
    pub rst: String,
    pub sess: BTreeMap<String, &'static str>,
}

/// The trading agent's desk card
#[derive(Debug, Clone, Serialize)]
pub struct TraderCard {
    pub strategies: [&'static str; 4],
    pub risk: &'static str,
    pub halt: &'static str,
    pub cash: &'static str,
    pub status: &'static str,
}

/// Everything the dashboard renders, computed from one source bundle.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub generated_at: String,
    pub agents: BTreeMap<String, AgentStatus>,
    pub connections: Vec<Connection>,
    pub products: Vec<ProductCard>,
    pub opportunities: Vec<OpportunityCard>,
    pub scanners: Vec<ScannerStatus>,
    pub tasks: Vec<KanbanTask>,
    pub task_summary: TaskSummary,
    pub events: Vec<FeedItem>,
    pub triggers: Vec<TriggerState>,
    pub cap_gates: Vec<CapGate>,
    pub revenue: RevenueSummary,
    pub rev_channels: Vec<RevenueChannel>,
    pub tokens: TokenSummary,
    pub p0: Vec<P0Item>,
    pub content: ContentBoard,
    pub phases: Vec<Phase>,
    pub socials: &'static [SocialAccount],
    pub infra: Infra,
    pub gordon: TraderCard,
    pub optimization: Optimization,
    pub crons: Vec<CronStatus>,
    pub trading: TradingReport,
    pub agent_activity: BTreeMap<String, Vec<ActivityItem>>,
    pub content_velocity: ContentVelocity,
    pub arb_summary: ArbSummary,
    pub revenue_detail: RevenueDetail,
    pub last_briefing: Option<LastBriefing>,
    pub agent_last_active: BTreeMap<String, Option<i64>>,
    pub pending_approvals: Vec<PendingApproval>,
    pub health_score: HealthScore,
    pub commander_brief: String,
    pub agent_uptime: BTreeMap<String, AgentUptime>,
    pub model_routing: Vec<Value>,
    pub db_tables: &'static [&'static str],
}

pub fn connections(agents: &AgentReport) -> Vec<Connection> {
    CONNECTIONS
        .iter()
        .map(|&(from, to)| Connection {
            from,
            to,
            active: agents.is_online(from) && agents.is_online(to),
        })
        .collect()
}

pub fn phases(total_revenue: Decimal) -> Vec<Phase> {
    PHASES
        .iter()
        .map(|&(n, name, baseline)| Phase {
            n,
            name,
            progress: if n == REVENUE_PHASE && total_revenue > Decimal::ZERO {
                REVENUE_PHASE_PROGRESS
            } else {
                baseline
            },
        })
        .collect()
}

pub fn infra(sessions: &[Session], agents: &AgentReport) -> Infra {
    let rst = agents::latest_session(sessions, COORDINATOR)
        .and_then(|s| s.started_at.as_deref())
        .and_then(wall_time)
        .unwrap_or_else(|| "—".to_string());

    Infra {
        mac: HOST.host,
        gw: HOST.gateway_port,
        oc: HOST.runtime_version,
        tok: HOST.context_window,
        res: HOST.reserve,
        rst,
        sess: agent_ids()
            .map(|id| (id.to_string(), if agents.is_online(id) { "ok" } else { "—" }))
            .collect(),
    }
}

pub fn trader_card(agents: &AgentReport, decommissioned: bool) -> TraderCard {
    let status = if decommissioned {
        "DECOMMISSIONED"
    } else if agents.is_online(TRADER) {
        "ACTIVE"
    } else {
        "NOT ACTIVE"
    };
    TraderCard {
        strategies: DESK_STRATEGIES,
        risk: "2%/trade",
        halt: "5% → HALT",
        cash: "40% reserve",
        status,
    }
}

/// Run every aggregator over `bundle` and merge the results with reference data.
pub fn assemble(bundle: &SourceBundle, config: &AppConfig, clock: &Clock) -> Snapshot {
    let limits = &config.snapshot;

    let agent_report = agents::aggregate(
        &bundle.sessions,
        &bundle.tasks,
        &bundle.events,
        &bundle.token_usage,
        clock,
        limits.stale_after_minutes,
    );
    let task_report = tasks::aggregate(&bundle.tasks, clock);
    let revenue_detail = finance::revenue_detail(&bundle.revenue, &bundle.affiliate_clicks, clock);
    let velocity = content::velocity(&bundle.events, clock, limits.content_daily_target);
    let trading_report = trading::aggregate(&bundle.positions, &bundle.signals, &config.trading, limits, clock);
    let arb_summary = trading::arb_summary(&trading_report, &bundle.signals, &bundle.events, clock);

    let health_score = health::score(
        &agent_report,
        &task_report,
        &velocity,
        &revenue_detail,
        &trading_report.positions,
    );
    let commander_brief = health::commander_brief(
        &agent_report,
        &task_report,
        &velocity,
        &revenue_detail,
        &trading_report.positions,
    );

    Snapshot {
        generated_at: clock.generated_at(),
        connections: connections(&agent_report),
        products: finance::product_cards(&bundle.products, &bundle.revenue),
        opportunities: finance::opportunity_cards(&bundle.opportunities),
        scanners: feeds::scanners(&bundle.events),
        tasks: task_report.kanban,
        task_summary: task_report.summary,
        events: feeds::event_feed(&bundle.events),
        triggers: feeds::trigger_states(&bundle.triggers),
        cap_gates: feeds::cap_gates(&bundle.policies),
        revenue: RevenueSummary {
            total: revenue_detail.total,
            today: revenue_detail.today,
        },
        rev_channels: finance::revenue_channels(revenue_detail.total),
        tokens: finance::token_summary(&bundle.token_usage),
        p0: task_report.p0,
        content: velocity.board(),
        phases: phases(revenue_detail.total),
        socials: &SOCIALS,
        infra: infra(&bundle.sessions, &agent_report),
        gordon: trader_card(&agent_report, config.trading.decommissioned),
        optimization: task_report.optimization,
        crons: feeds::crons(&bundle.events),
        trading: trading_report,
        content_velocity: velocity,
        arb_summary,
        revenue_detail,
        last_briefing: feeds::last_briefing(&bundle.events, clock),
        pending_approvals: task_report.pending_approvals,
        health_score,
        commander_brief,
        agents: agent_report.agents,
        agent_activity: agent_report.activity,
        agent_last_active: agent_report.last_active,
        agent_uptime: agent_report.uptime,
        model_routing: bundle.model_routes.clone(),
        db_tables: &KNOWN_TABLES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Position, PositionStatus, RevenueEntry};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn clock() -> Clock {
        Clock::at(Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap())
    }

    fn online(agent: &str) -> Session {
        Session {
            agent: Some(agent.into()),
            status: Some("online".into()),
            started_at: Some("2026-03-08T15:30:00Z".into()),
            last_heartbeat: Some("2026-03-09T11:58:00Z".into()),
            model: None,
        }
    }

    #[test]
    fn empty_bundle_still_yields_every_panel() {
        let snapshot = assemble(&SourceBundle::default(), &AppConfig::default(), &clock());
        let json = serde_json::to_value(&snapshot).unwrap();

        for key in [
            "generated_at", "agents", "connections", "products", "opportunities", "scanners",
            "tasks", "task_summary", "events", "triggers", "cap_gates", "revenue", "rev_channels",
            "tokens", "p0", "content", "phases", "socials", "infra", "gordon", "optimization",
            "crons", "trading", "agent_activity", "content_velocity", "arb_summary",
            "revenue_detail", "last_briefing", "agent_last_active", "pending_approvals",
            "health_score", "commander_brief", "agent_uptime", "db_tables",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["generated_at"], "2026-03-09T12:00:00.000Z");
        assert_eq!(json["agents"].as_object().unwrap().len(), 6);
        assert!(json["last_briefing"].is_null());
        assert_eq!(json["trading"]["balance"], serde_json::json!(1010.0));
        assert_eq!(json["db_tables"].as_array().unwrap().len(), 13);
        assert_eq!(json["gordon"]["status"], "NOT ACTIVE");
    }

    #[test]
    fn connections_light_up_when_both_ends_online() {
        let bundle = SourceBundle {
            sessions: vec![online("alfred"), online("isaiah")],
            ..Default::default()
        };
        let snapshot = assemble(&bundle, &AppConfig::default(), &clock());

        let active: Vec<_> = snapshot
            .connections
            .iter()
            .filter(|c| c.active)
            .map(|c| (c.from, c.to))
            .collect();
        assert_eq!(active, vec![("alfred", "isaiah")]);
        assert_eq!(snapshot.infra.sess["alfred"], "ok");
        assert_eq!(snapshot.infra.sess["paul"], "—");
        assert_eq!(snapshot.infra.rst, "03:30 PM");
    }

    #[test]
    fn revenue_moves_the_revenue_phase() {
        assert_eq!(phases(Decimal::ZERO)[2].progress, 20);
        assert_eq!(phases(dec!(5))[2].progress, 40);
        assert_eq!(phases(dec!(5))[0].progress, 100);
    }

    #[test]
    fn trading_and_health_flow_through() {
        let bundle = SourceBundle {
            positions: vec![Position {
                status: Some(PositionStatus::Open),
                ..Default::default()
            }],
            revenue: vec![RevenueEntry {
                amount: dec!(9.99),
                created_at: Some("2026-03-09T10:00:00Z".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut config = AppConfig::default();
        config.trading.decommissioned = true;

        let snapshot = assemble(&bundle, &config, &clock());
        assert_eq!(snapshot.trading.positions.open, 1);
        assert_eq!(snapshot.arb_summary.status, "active");
        assert_eq!(snapshot.gordon.status, "DECOMMISSIONED");
        assert_eq!(snapshot.health_score.breakdown.systems, 20);
        assert_eq!(snapshot.rev_channels[0].status, "Live");
        assert!(snapshot.commander_brief.contains("Revenue: $9.99 today."));
        assert!(snapshot.commander_brief.contains("Open positions: 1."));
    }

    fn rows<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Vec<T> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn extreme_amounts_degrade_instead_of_panicking() {
        let bundle = SourceBundle {
            positions: rows(serde_json::json!([
                {"status": "settled", "realized_pnl": "1e27", "total_cost": "0.01", "edge": "arb",
                 "closed_at": "2026-03-09T10:00:00Z"},
                {"status": "settled", "realized_pnl": "5e28", "total_cost": "0.01", "edge": "arb",
                 "closed_at": "2026-03-09T10:00:00Z"},
                {"status": "settled", "realized_pnl": "5e28", "total_cost": "0.01", "edge": "arb",
                 "closed_at": "2026-03-09T10:00:00Z"}
            ])),
            revenue: rows(serde_json::json!([
                {"amount": "5e28", "created_at": "2026-03-09T09:00:00Z"},
                {"amount": "5e28", "created_at": "2026-03-09T09:00:00Z"}
            ])),
            token_usage: rows(serde_json::json!([
                {"agent": "alfred", "model": "opus", "cost_usd": "5e28"},
                {"agent": "alfred", "model": "opus", "cost_usd": "5e28"}
            ])),
            events: rows(serde_json::json!([
                {"event_type": "articles_published", "created_at": "2026-03-09T09:00:00Z",
                 "payload": {"articles_count": i64::MAX}},
                {"event_type": "articles_published", "created_at": "2026-03-09T10:00:00Z",
                 "payload": {"articles_count": i64::MAX}}
            ])),
            ..Default::default()
        };

        let snapshot = assemble(&bundle, &AppConfig::default(), &clock());

        // The third position would overflow the totals and is left out
        let five = Decimal::from_scientific("5e28").unwrap();
        let one = Decimal::from_scientific("1e27").unwrap();
        assert_eq!(snapshot.trading.positions.settled, 3);
        assert_eq!(snapshot.trading.daily_pnl[0].trades, 2);
        assert_eq!(snapshot.trading.pnl.total, one + five);
        assert_eq!(snapshot.trading.pnl.roi, Decimal::ZERO);
        assert_eq!(snapshot.trading.edges[0].roi, Decimal::ZERO);
        assert_eq!(snapshot.revenue_detail.total, five);
        assert_eq!(snapshot.tokens.total_cost, five);
        assert_eq!(snapshot.content_velocity.today, i64::MAX);
        assert!(serde_json::to_string(&snapshot).is_ok());
    }
}
