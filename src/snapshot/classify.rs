//! Event classification predicates.

use chrono::Duration;

use crate::domain::clock::parse_timestamp;
use crate::domain::roster::{CronDef, ScannerDef};
use crate::domain::{Clock, Event, Signal};

const BRIEFING_TYPES: [&str; 3] = ["briefing_sent", "morning_briefing", "evening_briefing"];

pub fn is_scanner_event(event: &Event) -> bool {
    event.has_tag("scanner")
}

/// A scanner event belongs to `scanner` when it reports under the scanner's
/// slug or its payload type mentions the scanner name.
pub fn is_from_scanner(event: &Event, scanner: &ScannerDef) -> bool {
    if event.payload_str("scanner") == Some(scanner.slug().as_str()) {
        return true;
    }
    event
        .payload_str("type")
        .is_some_and(|t| t.contains(&scanner.name.to_lowercase()))
}

/// Run of a scheduled job: same agent, and the job name appears in the
/// message or (snake-cased) in the event type.
pub fn is_cron_run(event: &Event, cron: &CronDef) -> bool {
    if !event.is_by(cron.agent) {
        return false;
    }
    let job = cron.job.to_lowercase();
    let in_message = event
        .message()
        .is_some_and(|m| m.to_lowercase().contains(&job));
    let job_type = job.split_whitespace().collect::<Vec<_>>().join("_");
    in_message || event.kind().to_lowercase().contains(&job_type)
}

pub fn is_briefing(event: &Event) -> bool {
    BRIEFING_TYPES.contains(&event.kind())
        || event
            .message()
            .is_some_and(|m| m.to_lowercase().contains("briefing"))
}

pub fn is_arb_event(event: &Event) -> bool {
    event.has_tag("arb") || event.kind().contains("arb")
}

/// The arb daemon is active while it holds positions or signalled within the hour.
pub fn arb_is_active(open_positions: usize, latest_signal: Option<&Signal>, clock: &Clock) -> bool {
    if open_positions > 0 {
        return true;
    }
    latest_signal
        .and_then(|s| s.timestamp.as_deref())
        .and_then(parse_timestamp)
        .is_some_and(|ts| ts > clock.now() - Duration::hours(1))
}

pub fn is_success_event(event: &Event) -> bool {
    let kind = event.kind();
    kind.contains("success") || kind.contains("complete")
}

pub fn is_content_event(event: &Event) -> bool {
    match event.kind() {
        "article_published" | "articles_published" => true,
        "step_completed" if event.has_tag("content") || event.has_tag("article") => true,
        _ => event.has_tag("content"),
    }
}

/// Articles an event stands for: `articles_count`, else `count`, else one.
pub fn article_count(event: &Event) -> i64 {
    event
        .payload_count("articles_count")
        .filter(|n| *n > 0)
        .or_else(|| event.payload_count("count").filter(|n| *n > 0))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::roster::{CRONS, SCANNERS};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn event(value: serde_json::Value) -> Event {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn scanner_match_by_slug_or_type() {
        let crypto = &SCANNERS[2];
        assert!(is_from_scanner(
            &event(json!({"tags": ["scanner"], "payload": {"scanner": "crypto_prices"}})),
            crypto
        ));
        assert!(is_from_scanner(
            &event(json!({"payload": {"type": "crypto prices sweep"}})),
            crypto
        ));
        assert!(!is_from_scanner(
            &event(json!({"payload": {"scanner": "reddit"}})),
            crypto
        ));
        assert!(is_scanner_event(&event(json!({"tags": ["scanner"]}))));
    }

    #[test]
    fn cron_run_needs_matching_agent() {
        let crypto_scan = CRONS.iter().find(|c| c.job == "Crypto Scan").unwrap();
        assert!(is_cron_run(
            &event(json!({"agent": "daniel", "event_type": "crypto_scan_done"})),
            crypto_scan
        ));
        assert!(is_cron_run(
            &event(json!({"agent": "daniel", "payload": {"message": "Crypto scan finished"}})),
            crypto_scan
        ));
        assert!(!is_cron_run(
            &event(json!({"agent": "paul", "event_type": "crypto_scan_done"})),
            crypto_scan
        ));
    }

    #[test]
    fn briefing_by_type_or_message() {
        assert!(is_briefing(&event(json!({"event_type": "morning_briefing"}))));
        assert!(is_briefing(&event(json!({"payload": {"message": "Sent the Briefing"}}))));
        assert!(!is_briefing(&event(json!({"event_type": "task_done"}))));
    }

    #[test]
    fn arb_activity_window() {
        let clock = Clock::at(Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap());
        let recent = Signal {
            timestamp: Some("2026-03-09T11:30:00Z".into()),
            ..Default::default()
        };
        let old = Signal {
            timestamp: Some("2026-03-09T10:30:00Z".into()),
            ..Default::default()
        };
        assert!(arb_is_active(0, Some(&recent), &clock));
        assert!(!arb_is_active(0, Some(&old), &clock));
        assert!(arb_is_active(2, Some(&old), &clock));
        assert!(!arb_is_active(0, None, &clock));
        assert!(is_arb_event(&event(json!({"event_type": "arb_fill"}))));
        assert!(is_arb_event(&event(json!({"tags": ["arb"]}))));
    }

    #[test]
    fn content_classification() {
        assert!(is_content_event(&event(json!({"event_type": "articles_published"}))));
        assert!(is_content_event(&event(json!({"event_type": "step_completed", "tags": ["article"]}))));
        assert!(!is_content_event(&event(json!({"event_type": "step_completed", "tags": ["deploy"]}))));
        assert!(is_content_event(&event(json!({"event_type": "note", "tags": ["content"]}))));
        assert!(is_success_event(&event(json!({"event_type": "step_completed"}))));
        assert!(!is_success_event(&event(json!({"event_type": "step_started"}))));
    }

    #[test]
    fn article_counts_fall_back_to_one() {
        assert_eq!(article_count(&event(json!({"payload": {"articles_count": 4}}))), 4);
        assert_eq!(article_count(&event(json!({"payload": {"count": "3"}}))), 3);
        assert_eq!(article_count(&event(json!({"payload": {"articles_count": 0}}))), 1);
        assert_eq!(article_count(&event(json!({"payload": {"count": -2}}))), 1);
        assert_eq!(article_count(&event(json!({}))), 1);
    }
}
