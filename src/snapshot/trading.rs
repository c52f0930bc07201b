//! Trading desk performance from positions and signals.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::{SnapshotConfig, TradingConfig};
use crate::domain::clock::{date_prefix, recency_key};
use crate::domain::money::{add_or_keep, percent, round2};
use crate::domain::{Clock, Event, Position, PositionStatus, Signal};
use crate::snapshot::classify::{arb_is_active, is_arb_event};

const DECOMMISSIONED_MODE: &str = "decommissioned";

/// Running totals over settled positions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettledStats {
    pub trades: usize,
    pub wins: usize,
    pub pnl: Decimal,
    pub cost: Decimal,
}

impl SettledStats {
    /// Fold one settled position in. A position whose figures would
    /// overflow the totals is left out entirely.
    pub fn add(&mut self, position: &Position) {
        let pnl = position.pnl();
        let (Some(total_pnl), Some(total_cost)) = (
            self.pnl.checked_add(pnl),
            self.cost.checked_add(position.cost()),
        ) else {
            return;
        };
        self.trades += 1;
        if pnl > Decimal::ZERO {
            self.wins += 1;
        }
        self.pnl = total_pnl;
        self.cost = total_cost;
    }

    pub fn over<'a>(positions: impl IntoIterator<Item = &'a Position>) -> Self {
        let mut stats = Self::default();
        for p in positions {
            stats.add(p);
        }
        stats
    }

    pub fn win_rate(&self) -> Decimal {
        percent(Decimal::from(self.wins), Decimal::from(self.trades))
    }

    pub fn roi(&self) -> Decimal {
        percent(self.pnl, self.cost)
    }
}

/// Positions by lifecycle state. Buckets are disjoint and sum to `total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PositionBuckets {
    pub open: usize,
    pub settled: usize,
    pub cancelled: usize,
    pub expired_unprocessed: usize,
    pub flushed: usize,
    pub other: usize,
    pub total: usize,
}

impl PositionBuckets {
    pub fn count(positions: &[Position]) -> Self {
        let mut buckets = Self {
            total: positions.len(),
            ..Self::default()
        };
        for p in positions {
            match &p.status {
                Some(PositionStatus::Open) => buckets.open += 1,
                Some(PositionStatus::Settled) => buckets.settled += 1,
                Some(PositionStatus::Cancelled) => buckets.cancelled += 1,
                Some(PositionStatus::ExpiredUnprocessed) => buckets.expired_unprocessed += 1,
                Some(PositionStatus::Flushed | PositionStatus::FlushedStale) => buckets.flushed += 1,
                Some(PositionStatus::Other(_)) | None => buckets.other += 1,
            }
        }
        buckets
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PnlSummary {
    pub total: Decimal,
    pub today: Decimal,
    pub cost: Decimal,
    pub wins: usize,
    pub win_rate: Decimal,
    pub roi: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPnl {
    pub date: String,
    pub pnl: Decimal,
    pub cost: Decimal,
    pub trades: usize,
    pub wins: usize,
    pub win_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeStats {
    pub edge: String,
    pub signals: usize,
    pub positions: usize,
    pub settled: usize,
    pub wins: usize,
    pub win_rate: Decimal,
    pub pnl: Decimal,
    pub cost: Decimal,
    pub roi: Decimal,
    pub pnl_today: Decimal,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SignalSummary {
    pub total: usize,
    pub today: usize,
    pub by_action: BTreeMap<String, usize>,
    pub by_edge: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TradingReport {
    pub balance: Decimal,
    pub mode: String,
    pub decommissioned: bool,
    pub positions: PositionBuckets,
    pub pnl: PnlSummary,
    pub daily_pnl: Vec<DailyPnl>,
    pub edges: Vec<EdgeStats>,
    pub recent_positions: Vec<Position>,
    pub recent_signals: Vec<Signal>,
    pub signal_summary: SignalSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArbSummary {
    pub pnl_total: Decimal,
    pub pnl_today: Decimal,
    pub win_rate: Decimal,
    pub positions_open: usize,
    pub positions_settled: usize,
    pub last_signal: Option<String>,
    pub last_event: Option<String>,
    pub status: &'static str,
}

fn settled(positions: &[Position]) -> impl Iterator<Item = &Position> {
    positions
        .iter()
        .filter(|p| p.has_status(&PositionStatus::Settled))
}

fn booked_today(position: &Position, clock: &Clock) -> bool {
    clock.is_today(position.booked_at())
}

/// Settled P&L per booking date, newest `days` kept, ascending.
pub fn daily_history(positions: &[Position], days: usize) -> Vec<DailyPnl> {
    let mut by_day: BTreeMap<&str, SettledStats> = BTreeMap::new();
    for p in settled(positions) {
        let Some(day) = p.booked_at().and_then(date_prefix) else {
            continue;
        };
        by_day.entry(day).or_default().add(p);
    }

    let skip = by_day.len().saturating_sub(days);
    by_day
        .into_iter()
        .skip(skip)
        .map(|(date, stats)| DailyPnl {
            date: date.to_string(),
            pnl: round2(stats.pnl),
            cost: round2(stats.cost),
            trades: stats.trades,
            wins: stats.wins,
            win_rate: stats.win_rate(),
        })
        .collect()
}

/// One entry per distinct position edge label, in first-seen order.
pub fn edge_breakdown(positions: &[Position], signals: &[Signal], clock: &Clock) -> Vec<EdgeStats> {
    let mut labels: Vec<&str> = Vec::new();
    for edge in positions.iter().filter_map(|p| p.edge.as_deref()) {
        if !labels.contains(&edge) {
            labels.push(edge);
        }
    }

    labels
        .into_iter()
        .map(|edge| {
            let mine: Vec<&Position> = positions
                .iter()
                .filter(|p| p.edge.as_deref() == Some(edge))
                .collect();
            let settled_here = mine
                .iter()
                .copied()
                .filter(|p| p.has_status(&PositionStatus::Settled));
            let stats = SettledStats::over(settled_here.clone());
            let today = SettledStats::over(settled_here.filter(|p| booked_today(p, clock)));

            EdgeStats {
                edge: edge.to_string(),
                signals: signals.iter().filter(|s| s.edge.as_deref() == Some(edge)).count(),
                positions: mine.len(),
                settled: stats.trades,
                wins: stats.wins,
                win_rate: stats.win_rate(),
                pnl: round2(stats.pnl),
                cost: round2(stats.cost),
                roi: stats.roi(),
                pnl_today: round2(today.pnl),
            }
        })
        .collect()
}

pub fn signal_summary(signals: &[Signal], clock: &Clock) -> SignalSummary {
    let mut summary = SignalSummary {
        total: signals.len(),
        today: signals
            .iter()
            .filter(|s| clock.is_today(s.timestamp.as_deref()))
            .count(),
        ..SignalSummary::default()
    };
    for s in signals {
        let action = s.action.clone().unwrap_or_else(|| "unknown".to_string());
        let edge = s.edge.clone().unwrap_or_else(|| "unknown".to_string());
        *summary.by_action.entry(action).or_default() += 1;
        *summary.by_edge.entry(edge).or_default() += 1;
    }
    summary
}

fn newest_positions(positions: &[Position], limit: usize) -> Vec<Position> {
    let mut sorted: Vec<&Position> = positions.iter().collect();
    sorted.sort_by(|a, b| recency_key(b.opened_at.as_deref()).cmp(&recency_key(a.opened_at.as_deref())));
    sorted.into_iter().take(limit).cloned().collect()
}

fn newest_signals(signals: &[Signal], limit: usize) -> Vec<Signal> {
    let mut sorted: Vec<&Signal> = signals.iter().collect();
    sorted.sort_by(|a, b| recency_key(b.timestamp.as_deref()).cmp(&recency_key(a.timestamp.as_deref())));
    sorted.into_iter().take(limit).cloned().collect()
}

fn latest_signal(signals: &[Signal]) -> Option<&Signal> {
    signals.iter().reduce(|best, s| {
        if recency_key(s.timestamp.as_deref()) > recency_key(best.timestamp.as_deref()) {
            s
        } else {
            best
        }
    })
}

pub fn aggregate(
    positions: &[Position],
    signals: &[Signal],
    trading: &TradingConfig,
    limits: &SnapshotConfig,
    clock: &Clock,
) -> TradingReport {
    let stats = SettledStats::over(settled(positions));
    let today = SettledStats::over(settled(positions).filter(|p| booked_today(p, clock)));

    let (balance, mode) = if trading.decommissioned {
        (Decimal::ZERO, DECOMMISSIONED_MODE.to_string())
    } else {
        (round2(add_or_keep(trading.starting_balance, stats.pnl)), trading.mode.clone())
    };

    TradingReport {
        balance,
        mode,
        decommissioned: trading.decommissioned,
        positions: PositionBuckets::count(positions),
        pnl: PnlSummary {
            total: round2(stats.pnl),
            today: round2(today.pnl),
            cost: round2(stats.cost),
            wins: stats.wins,
            win_rate: stats.win_rate(),
            roi: stats.roi(),
        },
        daily_pnl: daily_history(positions, limits.daily_pnl_days),
        edges: edge_breakdown(positions, signals, clock),
        recent_positions: newest_positions(positions, limits.recent_positions),
        recent_signals: newest_signals(signals, limits.recent_signals),
        signal_summary: signal_summary(signals, clock),
    }
}

pub fn arb_summary(report: &TradingReport, signals: &[Signal], events: &[Event], clock: &Clock) -> ArbSummary {
    let latest = latest_signal(signals);
    let last_event = events
        .iter()
        .filter(|e| is_arb_event(e))
        .reduce(|best, e| {
            if recency_key(e.created_at.as_deref()) > recency_key(best.created_at.as_deref()) {
                e
            } else {
                best
            }
        })
        .and_then(|e| e.created_at.clone());

    ArbSummary {
        pnl_total: report.pnl.total,
        pnl_today: report.pnl.today,
        win_rate: report.pnl.win_rate,
        positions_open: report.positions.open,
        positions_settled: report.positions.settled,
        last_signal: latest.and_then(|s| s.timestamp.clone()),
        last_event,
        status: if arb_is_active(report.positions.open, latest, clock) {
            "active"
        } else {
            "idle"
        },
    }
}
