use serde::Serialize;

use crate::domain::{Clock, Event};
use crate::snapshot::classify::{article_count, is_content_event};

/// Today's output against the daily target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBoard {
    pub target: u32,
    pub today: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentVelocity {
    pub today: i64,
    pub week: i64,
    pub total: i64,
    pub target_daily: u32,
}

impl ContentVelocity {
    pub fn board(&self) -> ContentBoard {
        ContentBoard {
            target: self.target_daily,
            today: self.today,
        }
    }
}

pub fn velocity(events: &[Event], clock: &Clock, target_daily: u32) -> ContentVelocity {
    let mut velocity = ContentVelocity {
        today: 0,
        week: 0,
        total: 0,
        target_daily,
    };
    for event in events.iter().filter(|e| is_content_event(e)) {
        let articles = article_count(event);
        let created = event.created_at.as_deref();
        if clock.is_today(created) {
            velocity.today = velocity.today.saturating_add(articles);
        }
        if clock.is_within_week(created) {
            velocity.week = velocity.week.saturating_add(articles);
        }
        velocity.total = velocity.total.saturating_add(articles);
    }
    velocity
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn counts_articles_per_window() {
        let clock = Clock::at(Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap());
        let events: Vec<Event> = serde_json::from_value(json!([
            {"event_type": "articles_published", "created_at": "2026-03-09T08:00:00Z", "payload": {"articles_count": 4}},
            {"event_type": "note", "tags": ["content"], "created_at": "2026-03-09T09:00:00Z"},
            {"event_type": "article_published", "created_at": "2026-03-04T09:00:00Z", "payload": {"count": 2}},
            {"event_type": "article_published", "created_at": "2026-02-01T09:00:00Z"},
            {"event_type": "deploy", "created_at": "2026-03-09T09:00:00Z", "payload": {"count": 9}}
        ]))
        .unwrap();

        let v = velocity(&events, &clock, 10);
        assert_eq!(v.today, 5);
        assert_eq!(v.week, 7);
        assert_eq!(v.total, 8);
        assert_eq!(v.board(), ContentBoard { target: 10, today: 5 });
    }

    #[test]
    fn no_content_is_zero() {
        let clock = Clock::at(Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap());
        let v = velocity(&[], &clock, 10);
        assert_eq!((v.today, v.week, v.total), (0, 0, 0));
    }
}
