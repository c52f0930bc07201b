//! Composite health score and the narrative brief.
//!
//! Both read only the results of the other aggregators.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::domain::money::usd;
use crate::domain::roster::AGENTS;
use crate::snapshot::agents::{AgentReport, Liveness};
use crate::snapshot::content::ContentVelocity;
use crate::snapshot::finance::RevenueDetail;
use crate::snapshot::tasks::TaskReport;
use crate::snapshot::trading::PositionBuckets;

const SUB_SCORE_MAX: u32 = 25;
const TOTAL_MAX: u32 = 100;
const PENALTY_PER_ITEM: u32 = 5;
const SYSTEMS_BASE: u32 = 15;
const SYSTEMS_BONUS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub agents: u32,
    pub tasks: u32,
    pub content: u32,
    pub systems: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthScore {
    pub score: u32,
    pub grade: &'static str,
    pub breakdown: ScoreBreakdown,
}

pub fn grade(score: u32) -> &'static str {
    match score {
        80.. => "A",
        60..=79 => "B",
        40..=59 => "C",
        _ => "D",
    }
}

/// `part / whole` of the sub-score range, rounded to a whole point.
/// Anything at or above `whole` earns the full range.
fn scaled(part: Decimal, whole: Decimal) -> u32 {
    part.min(whole)
        .checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::from(SUB_SCORE_MAX)))
        .and_then(|points| {
            points
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_u32()
        })
        .unwrap_or(0)
        .min(SUB_SCORE_MAX)
}

pub fn score(
    agents: &AgentReport,
    tasks: &TaskReport,
    content: &ContentVelocity,
    revenue: &RevenueDetail,
    positions: &PositionBuckets,
) -> HealthScore {
    let online = agents.online_ids().len();
    let agents_score = scaled(Decimal::from(online), Decimal::from(agents.agents.len()));

    let penalties = (tasks.summary.blocked + tasks.p0.len()) as u32;
    let tasks_score = SUB_SCORE_MAX.saturating_sub(penalties.saturating_mul(PENALTY_PER_ITEM));

    // A zero target is met by definition
    let content_score = if content.target_daily == 0 {
        SUB_SCORE_MAX
    } else {
        scaled(
            Decimal::from(content.today.max(0)),
            Decimal::from(content.target_daily),
        )
    };

    let mut systems = SYSTEMS_BASE;
    if revenue.total > Decimal::ZERO {
        systems += SYSTEMS_BONUS;
    }
    if positions.open == 0 {
        systems += SYSTEMS_BONUS;
    }

    let breakdown = ScoreBreakdown {
        agents: agents_score,
        tasks: tasks_score,
        content: content_score,
        systems: systems.min(SUB_SCORE_MAX),
    };
    let total = (breakdown.agents + breakdown.tasks + breakdown.content + breakdown.systems).min(TOTAL_MAX);

    HealthScore {
        score: total,
        grade: grade(total),
        breakdown,
    }
}

/// One-paragraph status line for the operator.
pub fn commander_brief(
    agents: &AgentReport,
    tasks: &TaskReport,
    content: &ContentVelocity,
    revenue: &RevenueDetail,
    positions: &PositionBuckets,
) -> String {
    let mut clauses: Vec<String> = Vec::new();

    let online: Vec<String> = agents.online_ids().iter().map(|id| id.to_uppercase()).collect();
    if !online.is_empty() {
        clauses.push(format!(
            "{}/{} agents online ({}).",
            online.len(),
            AGENTS.len(),
            online.join(", ")
        ));
    }

    let down: Vec<String> = AGENTS
        .iter()
        .filter_map(|a| match agents.status_of(a.id) {
            Some(Liveness::Online) => None,
            Some(Liveness::Stale) => Some(format!("{} (stale)", a.id.to_uppercase())),
            _ => Some(a.id.to_uppercase()),
        })
        .collect();
    if !down.is_empty() {
        clauses.push(format!("Offline: {}.", down.join(", ")));
    }

    let blocked = tasks.summary.blocked;
    if blocked > 0 {
        clauses.push(format!("⚠ Blocked tasks: {blocked}."));
    }

    let p0 = tasks.p0.len();
    if p0 > 0 {
        clauses.push(format!("🔴 P0 open: {p0}."));
    }

    clauses.push(format!(
        "Content: {}/{} articles today.",
        content.today, content.target_daily
    ));

    if revenue.today.is_zero() {
        clauses.push(format!("Revenue: $0 today. MRR: {}.", usd(revenue.mrr)));
    } else {
        clauses.push(format!("Revenue: {} today.", usd(revenue.today)));
    }

    if positions.open > 0 {
        clauses.push(format!("Open positions: {}.", positions.open));
    }

    let approvals = tasks.pending_approvals.len();
    if approvals > 0 {
        clauses.push(format!("Pending approvals: {approvals}."));
    }

    clauses.join(" ")
}
