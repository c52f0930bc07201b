//! Event-driven panels: activity feed, scanners, crons, triggers and gates.

use serde::Serialize;
use serde_json::Value;

use crate::domain::clock::{clock_time, recency_key};
use crate::domain::lenient::{value_is_truthy, value_to_i64};
use crate::domain::roster::{COORDINATOR, CRONS, SCANNERS};
use crate::domain::{Clock, Event, Policy, Trigger};
use crate::snapshot::classify::{is_briefing, is_cron_run, is_from_scanner, is_scanner_event, is_success_event};

const FEED_LIMIT: usize = 50;
const NO_TIME: &str = "—";

#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub t: String,
    #[serde(rename = "a")]
    pub agent: String,
    #[serde(rename = "m")]
    pub message: String,
    #[serde(rename = "y")]
    pub tone: &'static str,
    #[serde(rename = "type")]
    pub kind: String,
    pub product: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerState {
    #[serde(rename = "n")]
    pub name: Option<String>,
    #[serde(rename = "s")]
    pub state: &'static str,
    #[serde(rename = "f")]
    pub fire_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapGate {
    #[serde(rename = "n")]
    pub name: Option<String>,
    #[serde(rename = "v")]
    pub value: String,
    #[serde(rename = "s")]
    pub state: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScannerStatus {
    pub name: &'static str,
    pub freq: &'static str,
    pub icon: &'static str,
    pub sigs: i64,
    pub status: &'static str,
    pub last: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CronStatus {
    pub t: &'static str,
    #[serde(rename = "j")]
    pub job: &'static str,
    #[serde(rename = "a")]
    pub agent: &'static str,
    pub last: String,
    pub next: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LastBriefing {
    pub timestamp: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub agent: String,
    pub ago: Option<i64>,
}

/// Events sorted newest first; equal timestamps keep source order.
pub fn newest_first(events: &[Event]) -> Vec<&Event> {
    let mut sorted: Vec<&Event> = events.iter().collect();
    sorted.sort_by(|a, b| recency_key(b.created_at.as_deref()).cmp(&recency_key(a.created_at.as_deref())));
    sorted
}

fn display_time(event: &Event) -> String {
    event
        .created_at
        .as_deref()
        .and_then(clock_time)
        .unwrap_or_else(|| NO_TIME.to_string())
}

pub fn event_feed(events: &[Event]) -> Vec<FeedItem> {
    newest_first(events)
        .into_iter()
        .take(FEED_LIMIT)
        .map(|e| FeedItem {
            t: display_time(e),
            agent: e.agent.clone().unwrap_or_else(|| "system".to_string()),
            message: e.headline().to_string(),
            tone: if is_success_event(e) { "success" } else { "ok" },
            kind: e.event_type.clone().unwrap_or_else(|| "unknown".to_string()),
            product: e.product_ref().unwrap_or("factory").to_string(),
        })
        .collect()
}

pub fn trigger_states(triggers: &[Trigger]) -> Vec<TriggerState> {
    triggers
        .iter()
        .map(|t| TriggerState {
            name: t.name.clone(),
            state: if t.fire_count > 0 {
                "fired"
            } else if t.enabled {
                "armed"
            } else {
                "off"
            },
            fire_count: t.fire_count,
        })
        .collect()
}

fn policy_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Gate state: `blocked` when the policy says so, `ok` only when explicitly
/// disarmed, `armed` otherwise.
pub fn gate_state(value: &Value) -> &'static str {
    if value.get("blocked").is_some_and(value_is_truthy) {
        "blocked"
    } else if value.get("armed") == Some(&Value::Bool(false)) {
        "ok"
    } else {
        "armed"
    }
}

pub fn cap_gates(policies: &[Policy]) -> Vec<CapGate> {
    policies
        .iter()
        .map(|p| CapGate {
            name: p.key.clone(),
            value: policy_text(&p.value),
            state: gate_state(&p.value),
        })
        .collect()
}

pub fn scanners(events: &[Event]) -> Vec<ScannerStatus> {
    let tagged: Vec<&Event> = newest_first(events)
        .into_iter()
        .filter(|e| is_scanner_event(e))
        .collect();

    SCANNERS
        .iter()
        .map(|def| {
            let latest = tagged.iter().find(|e| is_from_scanner(e, def));
            let status = match latest {
                Some(_) => "ok",
                None if def.is_planned() => "planned",
                None => "idle",
            };
            ScannerStatus {
                name: def.name,
                freq: def.freq,
                icon: def.icon,
                sigs: latest
                    .and_then(|e| e.payload.get("signals"))
                    .and_then(value_to_i64)
                    .unwrap_or(0),
                status,
                last: latest.map(|e| display_time(e)),
            }
        })
        .collect()
}

pub fn crons(events: &[Event]) -> Vec<CronStatus> {
    let sorted = newest_first(events);
    CRONS
        .iter()
        .map(|cron| {
            let last = sorted
                .iter()
                .find(|e| is_cron_run(e, cron))
                .map(|e| display_time(e));
            CronStatus {
                t: cron.schedule,
                job: cron.job,
                agent: cron.agent,
                status: if last.is_some() { "ok" } else { "unknown" },
                last: last.unwrap_or_else(|| NO_TIME.to_string()),
                next: NO_TIME,
            }
        })
        .collect()
}

pub fn last_briefing(events: &[Event], clock: &Clock) -> Option<LastBriefing> {
    let latest = newest_first(events).into_iter().find(|e| is_briefing(e))?;
    Some(LastBriefing {
        timestamp: latest.created_at.clone(),
        kind: latest
            .event_type
            .clone()
            .unwrap_or_else(|| "briefing".to_string()),
        agent: latest
            .agent
            .clone()
            .unwrap_or_else(|| COORDINATOR.to_string()),
        ago: clock.minutes_since(latest.created_at.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn events(value: Value) -> Vec<Event> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn feed_is_newest_first_with_defaults() {
        let feed = event_feed(&events(json!([
            {"created_at": "2026-03-09T07:00:00Z", "event_type": "step_completed", "agent": "isaiah"},
            {"created_at": "2026-03-09T09:15:00Z", "payload": {"message": "hello", "product": "aisp"}}
        ])));
        assert_eq!(feed[0].t, "09:15");
        assert_eq!(feed[0].agent, "system");
        assert_eq!(feed[0].message, "hello");
        assert_eq!(feed[0].kind, "unknown");
        assert_eq!(feed[0].product, "aisp");
        assert_eq!(feed[1].tone, "success");
        assert_eq!(feed[1].product, "factory");
    }

    #[test]
    fn trigger_states_prefer_fired() {
        let states = trigger_states(&[
            Trigger { name: Some("a".into()), enabled: false, fire_count: 3 },
            Trigger { name: Some("b".into()), enabled: true, fire_count: 0 },
            Trigger { name: Some("c".into()), enabled: false, fire_count: 0 },
        ]);
        let s: Vec<_> = states.iter().map(|t| t.state).collect();
        assert_eq!(s, vec!["fired", "armed", "off"]);
    }

    #[test]
    fn gate_states_and_display_values() {
        let gates = cap_gates(&[
            Policy { key: Some("spend".into()), value: json!({"blocked": true}) },
            Policy { key: Some("deploy".into()), value: json!({"armed": false}) },
            Policy { key: Some("limit".into()), value: json!(25) },
            Policy { key: Some("mode".into()), value: json!("manual") },
        ]);
        let s: Vec<_> = gates.iter().map(|g| g.state).collect();
        assert_eq!(s, vec!["blocked", "ok", "armed", "armed"]);
        assert_eq!(gates[0].value, r#"{"blocked":true}"#);
        assert_eq!(gates[2].value, "25");
        assert_eq!(gates[3].value, "manual");
    }

    #[test]
    fn scanner_status_from_tagged_events() {
        let list = scanners(&events(json!([
            {"created_at": "2026-03-09T06:00:00Z", "tags": ["scanner"], "payload": {"scanner": "reddit", "signals": 2}},
            {"created_at": "2026-03-09T08:00:00Z", "tags": ["scanner"], "payload": {"scanner": "reddit", "signals": 5}},
            {"created_at": "2026-03-09T08:00:00Z", "payload": {"scanner": "polymarket"}}
        ])));
        let reddit = list.iter().find(|s| s.name == "Reddit").unwrap();
        assert_eq!(reddit.status, "ok");
        assert_eq!(reddit.sigs, 5);
        assert_eq!(reddit.last.as_deref(), Some("08:00"));

        let poly = list.iter().find(|s| s.name == "Polymarket").unwrap();
        assert_eq!(poly.status, "idle");
        let amazon = list.iter().find(|s| s.name == "Amazon").unwrap();
        assert_eq!(amazon.status, "planned");
    }

    #[test]
    fn cron_last_run_from_matching_events() {
        let list = crons(&events(json!([
            {"created_at": "2026-03-09T09:02:00Z", "agent": "alfred", "event_type": "heartbeat"},
            {"created_at": "2026-03-09T09:00:00Z", "agent": "paul", "event_type": "heartbeat"}
        ])));
        let heartbeat = list.iter().find(|c| c.job == "Heartbeat").unwrap();
        assert_eq!(heartbeat.last, "09:02");
        assert_eq!(heartbeat.status, "ok");
        let memory = list.iter().find(|c| c.job == "Memory").unwrap();
        assert_eq!(memory.last, "—");
        assert_eq!(memory.status, "unknown");
    }

    #[test]
    fn last_briefing_with_age() {
        let clock = Clock::at(Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap());
        let briefing = last_briefing(
            &events(json!([
                {"created_at": "2026-03-09T09:00:00Z", "event_type": "morning_briefing", "agent": "alfred"},
                {"created_at": "2026-03-09T11:00:00Z", "payload": {"message": "Evening briefing queued"}}
            ])),
            &clock,
        )
        .unwrap();
        assert_eq!(briefing.ago, Some(60));
        assert_eq!(briefing.kind, "briefing");
        assert_eq!(briefing.agent, "alfred");

        assert!(last_briefing(&[], &clock).is_none());
    }
}
