//! Per-agent liveness, workload, spend and activity.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::domain::clock::{clock_time, recency_key};
use crate::domain::money::{checked_total, count_percent, round2};
use crate::domain::roster::{AgentProfile, AGENTS};
use crate::domain::{Clock, Event, Session, Task, TaskStatus, TokenUsage};

/// Derived liveness of an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Liveness {
    Online,
    /// Session claims `online` but the heartbeat is too old to trust
    Stale,
    Offline,
    /// Whatever else the session reported
    Reported(String),
}

impl Liveness {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Online => "online",
            Self::Stale => "stale",
            Self::Offline => "offline",
            Self::Reported(raw) => raw,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl Serialize for Liveness {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Session with the latest start time for `agent`; first one wins on ties.
pub fn latest_session<'a>(sessions: &'a [Session], agent: &str) -> Option<&'a Session> {
    sessions
        .iter()
        .filter(|s| s.is_for(agent))
        .reduce(|best, s| {
            if recency_key(s.started_at.as_deref()) > recency_key(best.started_at.as_deref()) {
                s
            } else {
                best
            }
        })
}

/// Classify a session against the heartbeat staleness threshold.
///
/// An `online` session without a readable heartbeat is treated as stale.
pub fn liveness(session: Option<&Session>, clock: &Clock, stale_after_minutes: i64) -> Liveness {
    let Some(session) = session else {
        return Liveness::Offline;
    };
    if session.reports_online() {
        // Compare the exact age; whole minutes would let 30m59s pass as 30
        return match clock.elapsed_since(session.last_heartbeat.as_deref()) {
            Some(age) if age <= Duration::minutes(stale_after_minutes) => Liveness::Online,
            _ => Liveness::Stale,
        };
    }
    match session.status.as_deref() {
        None | Some("offline") => Liveness::Offline,
        Some(other) => Liveness::Reported(other.to_string()),
    }
}

/// The running task assigned to `agent`, if any.
pub fn running_task<'a>(tasks: &'a [Task], agent: &str) -> Option<&'a Task> {
    tasks
        .iter()
        .find(|t| t.is_assigned_to(agent) && t.has_status(&TaskStatus::Running))
}

pub fn task_label(running: Option<&Task>, liveness: &Liveness) -> String {
    if let Some(task) = running {
        return task.title_or_untitled().to_string();
    }
    match liveness {
        Liveness::Online => "awaiting dispatch",
        Liveness::Stale => "no heartbeat",
        Liveness::Offline | Liveness::Reported(_) => "offline",
    }
    .to_string()
}

/// Most recent event attributed to `agent`.
pub fn latest_event<'a>(events: &'a [Event], agent: &str) -> Option<&'a Event> {
    events.iter().filter(|e| e.is_by(agent)).reduce(|best, e| {
        if recency_key(e.created_at.as_deref()) > recency_key(best.created_at.as_deref()) {
            e
        } else {
            best
        }
    })
}

/// Agent card on the dashboard ring
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub name: String,
    pub role: &'static str,
    pub icon: &'static str,
    pub angle: u16,
    pub color: &'static str,
    pub status: Liveness,
    pub model: Option<String>,
    pub task: String,
    /// Tasks created today and assigned to this agent
    pub tasks: usize,
    pub succeeded: usize,
    /// Today's model spend
    pub cost: Decimal,
    /// Today's success rate, whole percent
    pub eff: u32,
    /// Minutes since the agent's last event
    pub last_active: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentUptime {
    pub status: Liveness,
    pub session_started: Option<String>,
    /// Minutes the current session has been live; only set while online
    pub uptime_min: Option<i64>,
    pub last_heartbeat: Option<String>,
    pub heartbeat_age_min: Option<i64>,
    pub sessions_today: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityItem {
    pub t: String,
    pub ts: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub m: String,
    pub product: String,
    pub tags: Vec<String>,
}

const ACTIVITY_PER_AGENT: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct AgentReport {
    pub agents: BTreeMap<String, AgentStatus>,
    pub last_active: BTreeMap<String, Option<i64>>,
    pub uptime: BTreeMap<String, AgentUptime>,
    pub activity: BTreeMap<String, Vec<ActivityItem>>,
}

impl AgentReport {
    /// Ids of agents currently online, in roster order.
    pub fn online_ids(&self) -> Vec<&'static str> {
        AGENTS
            .iter()
            .filter(|a| self.is_online(a.id))
            .map(|a| a.id)
            .collect()
    }

    pub fn is_online(&self, agent: &str) -> bool {
        self.agents
            .get(agent)
            .is_some_and(|a| a.status.is_online())
    }

    pub fn status_of(&self, agent: &str) -> Option<&Liveness> {
        self.agents.get(agent).map(|a| &a.status)
    }
}

fn agent_cost(token_usage: &[TokenUsage], agent: &str) -> Decimal {
    round2(checked_total(
        token_usage
            .iter()
            .filter(|t| t.agent.as_deref() == Some(agent))
            .map(|t| t.cost_usd),
    ))
}

fn activity_feed(events: &[Event], agent: &str) -> Vec<ActivityItem> {
    let mut mine: Vec<&Event> = events.iter().filter(|e| e.is_by(agent)).collect();
    // Stable sort keeps source order for equal timestamps
    mine.sort_by(|a, b| recency_key(b.created_at.as_deref()).cmp(&recency_key(a.created_at.as_deref())));
    mine.into_iter()
        .take(ACTIVITY_PER_AGENT)
        .map(|e| ActivityItem {
            t: e.created_at
                .as_deref()
                .and_then(clock_time)
                .unwrap_or_else(|| "—".to_string()),
            ts: e.created_at.clone(),
            kind: e.event_type.clone().unwrap_or_else(|| "unknown".to_string()),
            m: e.headline().to_string(),
            product: e.product_ref().unwrap_or("").to_string(),
            tags: e.tags.clone(),
        })
        .collect()
}

fn agent_status(
    profile: &AgentProfile,
    session: Option<&Session>,
    status: Liveness,
    tasks: &[Task],
    token_usage: &[TokenUsage],
    last_active: Option<i64>,
    clock: &Clock,
) -> AgentStatus {
    let todays: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.is_assigned_to(profile.id) && clock.is_today(t.created_at.as_deref()))
        .collect();
    let succeeded = todays
        .iter()
        .filter(|t| t.has_status(&TaskStatus::Succeeded))
        .count();

    AgentStatus {
        name: profile.id.to_uppercase(),
        role: profile.role,
        icon: profile.icon,
        angle: profile.angle,
        color: profile.color,
        model: session.and_then(|s| s.model.clone()),
        task: task_label(running_task(tasks, profile.id), &status),
        status,
        tasks: todays.len(),
        succeeded,
        cost: agent_cost(token_usage, profile.id),
        eff: count_percent(succeeded, todays.len()),
        last_active,
    }
}

pub fn aggregate(
    sessions: &[Session],
    tasks: &[Task],
    events: &[Event],
    token_usage: &[TokenUsage],
    clock: &Clock,
    stale_after_minutes: i64,
) -> AgentReport {
    let mut report = AgentReport::default();

    for profile in AGENTS.iter() {
        let session = latest_session(sessions, profile.id);
        let status = liveness(session, clock, stale_after_minutes);
        let last_active = latest_event(events, profile.id)
            .and_then(|e| clock.minutes_since(e.created_at.as_deref()));

        let uptime = AgentUptime {
            status: status.clone(),
            session_started: session.and_then(|s| s.started_at.clone()),
            uptime_min: if status.is_online() {
                session.and_then(|s| clock.minutes_since(s.started_at.as_deref()))
            } else {
                None
            },
            last_heartbeat: session.and_then(|s| s.last_heartbeat.clone()),
            heartbeat_age_min: session.and_then(|s| clock.minutes_since(s.last_heartbeat.as_deref())),
            sessions_today: sessions
                .iter()
                .filter(|s| s.is_for(profile.id) && clock.is_today(s.started_at.as_deref()))
                .count(),
        };

        let card = agent_status(profile, session, status, tasks, token_usage, last_active, clock);

        report.last_active.insert(profile.id.to_string(), last_active);
        report.uptime.insert(profile.id.to_string(), uptime);
        report
            .activity
            .insert(profile.id.to_string(), activity_feed(events, profile.id));
        report.agents.insert(profile.id.to_string(), card);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn clock() -> Clock {
        Clock::at(Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap())
    }

    fn ago(clock: &Clock, minutes: i64) -> String {
        (clock.now() - Duration::minutes(minutes)).to_rfc3339()
    }

    fn session(agent: &str, status: &str, started: &str, heartbeat: Option<String>) -> Session {
        Session {
            agent: Some(agent.to_string()),
            status: Some(status.to_string()),
            started_at: Some(started.to_string()),
            last_heartbeat: heartbeat,
            model: Some("sonnet-4.5".to_string()),
        }
    }

    fn task(agent: &str, status: &str, created: &str, title: &str) -> Task {
        Task {
            title: Some(title.to_string()),
            assigned_agent: Some(agent.to_string()),
            status: Some(TaskStatus::from(status.to_string())),
            created_at: Some(created.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn fresh_heartbeat_is_online() {
        let clock = clock();
        let sessions = vec![session("alfred", "online", &ago(&clock, 120), Some(ago(&clock, 5)))];

        let report = aggregate(&sessions, &[], &[], &[], &clock, 30);
        let alfred = &report.agents["alfred"];
        assert_eq!(alfred.status, Liveness::Online);
        assert_eq!(alfred.task, "awaiting dispatch");
        assert_eq!(report.uptime["alfred"].uptime_min, Some(120));
    }

    #[test]
    fn old_heartbeat_is_stale_never_online() {
        let clock = clock();
        let sessions = vec![session("alfred", "online", &ago(&clock, 120), Some(ago(&clock, 45)))];

        let report = aggregate(&sessions, &[], &[], &[], &clock, 30);
        let alfred = &report.agents["alfred"];
        assert_eq!(alfred.status, Liveness::Stale);
        assert_eq!(alfred.task, "no heartbeat");
        assert!(report.uptime["alfred"].uptime_min.is_none());
        assert!(!report.is_online("alfred"));
    }

    #[test]
    fn heartbeat_exactly_at_threshold_is_still_online() {
        let clock = clock();
        let s = session("paul", "online", &ago(&clock, 60), Some(ago(&clock, 30)));
        assert_eq!(liveness(Some(&s), &clock, 30), Liveness::Online);
    }

    #[test]
    fn heartbeat_one_second_past_threshold_is_stale() {
        let clock = clock();
        let heartbeat = (clock.now() - Duration::minutes(30) - Duration::seconds(1)).to_rfc3339();
        let s = session("paul", "online", &ago(&clock, 60), Some(heartbeat));
        assert_eq!(liveness(Some(&s), &clock, 30), Liveness::Stale);

        let s = session("paul", "online", &ago(&clock, 60), Some("2026-03-09T11:29:15+00:00".into()));
        assert_eq!(liveness(Some(&s), &clock, 30), Liveness::Stale);
    }

    #[test]
    fn missing_heartbeat_on_online_session_is_stale() {
        let clock = clock();
        let s = session("paul", "online", &ago(&clock, 60), None);
        assert_eq!(liveness(Some(&s), &clock, 30), Liveness::Stale);
    }

    #[test]
    fn no_session_is_offline_and_other_statuses_pass_through() {
        let clock = clock();
        assert_eq!(liveness(None, &clock, 30), Liveness::Offline);

        let s = session("paul", "paused", &ago(&clock, 60), Some(ago(&clock, 1)));
        assert_eq!(
            liveness(Some(&s), &clock, 30),
            Liveness::Reported("paused".to_string())
        );
        assert_eq!(task_label(None, &Liveness::Reported("paused".into())), "offline");
    }

    #[test]
    fn latest_session_wins_regardless_of_order() {
        let clock = clock();
        let sessions = vec![
            session("isaiah", "offline", &ago(&clock, 300), Some(ago(&clock, 250))),
            session("isaiah", "online", &ago(&clock, 20), Some(ago(&clock, 2))),
            session("isaiah", "offline", &ago(&clock, 600), None),
        ];
        let latest = latest_session(&sessions, "isaiah").unwrap();
        assert_eq!(latest.status.as_deref(), Some("online"));
        assert!(latest_session(&sessions, "paul").is_none());
    }

    #[test]
    fn workload_efficiency_and_cost() {
        let clock = clock();
        let today = "2026-03-09T08:00:00Z";
        let tasks = vec![
            task("isaiah", "succeeded", today, "a"),
            task("isaiah", "succeeded", today, "b"),
            task("isaiah", "failed", today, "c"),
            task("isaiah", "running", "2026-03-08T08:00:00Z", "Refactor billing"),
            task("paul", "succeeded", today, "d"),
        ];
        let usage = vec![
            TokenUsage {
                agent: Some("isaiah".into()),
                cost_usd: dec!(0.105),
                ..Default::default()
            },
            TokenUsage {
                agent: Some("isaiah".into()),
                cost_usd: dec!(0.2),
                ..Default::default()
            },
        ];

        let report = aggregate(&[], &tasks, &[], &usage, &clock, 30);
        let isaiah = &report.agents["isaiah"];
        assert_eq!(isaiah.tasks, 3);
        assert_eq!(isaiah.succeeded, 2);
        assert_eq!(isaiah.eff, 67);
        assert_eq!(isaiah.cost, dec!(0.31));
        assert_eq!(isaiah.task, "Refactor billing");
        assert_eq!(isaiah.status, Liveness::Offline);

        let gordon = &report.agents["gordon"];
        assert_eq!(gordon.tasks, 0);
        assert_eq!(gordon.eff, 0);
        assert_eq!(gordon.task, "offline");
    }

    #[test]
    fn last_activity_uses_newest_event() {
        let clock = clock();
        let events = vec![
            Event {
                agent: Some("daniel".into()),
                created_at: Some(ago(&clock, 90)),
                event_type: Some("scan_done".into()),
                ..Default::default()
            },
            Event {
                agent: Some("daniel".into()),
                created_at: Some(ago(&clock, 7)),
                event_type: Some("scan_started".into()),
                ..Default::default()
            },
        ];

        let report = aggregate(&[], &[], &events, &[], &clock, 30);
        assert_eq!(report.last_active["daniel"], Some(7));
        assert_eq!(report.last_active["paul"], None);
        let feed = &report.activity["daniel"];
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].kind, "scan_started");
    }

    #[test]
    fn every_roster_agent_is_reported() {
        let report = aggregate(&[], &[], &[], &[], &clock(), 30);
        assert_eq!(report.agents.len(), AGENTS.len());
        assert!(report.online_ids().is_empty());
    }
}
