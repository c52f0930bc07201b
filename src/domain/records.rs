//! Rows read from the upstream record sets.
//!
//! Every field is optional and decoded leniently; nothing here guarantees
//! referential integrity between sets.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::lenient;

/// Task lifecycle state as written by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Blocked,
    Cancelled,
    /// Any value the dispatcher writes that we do not recognise
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Blocked => "blocked",
            Self::Cancelled => "cancelled",
            Self::Other(raw) => raw,
        }
    }

    /// Succeeded or cancelled: nothing left for anyone to do.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Cancelled)
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "queued" => Self::Queued,
            "running" => Self::Running,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "blocked" => Self::Blocked,
            "cancelled" => Self::Cancelled,
            _ => Self::Other(raw),
        }
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Trading position lifecycle state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PositionStatus {
    Open,
    Settled,
    Cancelled,
    ExpiredUnprocessed,
    Flushed,
    FlushedStale,
    Other(String),
}

impl PositionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::Settled => "settled",
            Self::Cancelled => "cancelled",
            Self::ExpiredUnprocessed => "expired_unprocessed",
            Self::Flushed => "flushed",
            Self::FlushedStale => "flushed_stale",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for PositionStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "open" => Self::Open,
            "settled" => Self::Settled,
            "cancelled" => Self::Cancelled,
            "expired_unprocessed" => Self::ExpiredUnprocessed,
            "flushed" => Self::Flushed,
            "flushed_stale" => Self::FlushedStale,
            _ => Self::Other(raw),
        }
    }
}

impl Serialize for PositionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One agent process run (`agent_sessions`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Session {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub agent: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub started_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub last_heartbeat: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub model: Option<String>,
}

impl Session {
    pub fn is_for(&self, agent: &str) -> bool {
        self.agent.as_deref() == Some(agent)
    }

    pub fn reports_online(&self) -> bool {
        self.status.as_deref() == Some("online")
    }
}

/// Unit of dispatched work (`factory_tasks`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Task {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub assigned_agent: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_parsed")]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub product: Option<String>,
}

impl Task {
    pub fn has_status(&self, status: &TaskStatus) -> bool {
        self.status.as_ref() == Some(status)
    }

    pub fn is_critical(&self) -> bool {
        self.priority.as_deref() == Some("critical")
    }

    pub fn is_closed(&self) -> bool {
        self.status.as_ref().is_some_and(TaskStatus::is_closed)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Exact agent-name match; unassigned tasks belong to nobody.
    pub fn is_assigned_to(&self, agent: &str) -> bool {
        self.assigned_agent.as_deref() == Some(agent)
    }

    pub fn title_or_untitled(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }
}

/// Activity log entry (`factory_events`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Event {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub agent: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub product: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

impl Event {
    pub fn kind(&self) -> &str {
        self.event_type.as_deref().unwrap_or("")
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_by(&self, agent: &str) -> bool {
        self.agent.as_deref() == Some(agent)
    }

    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn payload_count(&self, key: &str) -> Option<i64> {
        self.payload.get(key).and_then(lenient::value_to_i64)
    }

    pub fn message(&self) -> Option<&str> {
        self.payload_str("message")
    }

    /// Message if present, else the event type.
    pub fn headline(&self) -> &str {
        self.message().unwrap_or_else(|| self.kind())
    }

    /// Product column, else the payload's product field.
    pub fn product_ref(&self) -> Option<&str> {
        self.product
            .as_deref()
            .or_else(|| self.payload_str("product"))
    }
}

/// Money received (`revenue_events`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevenueEntry {
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub product: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub channel: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_string")]
    pub entry_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub recurring: bool,
}

/// Model spend for one call (`token_usage`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenUsage {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub agent: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub cost_usd: Decimal,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
}

/// Trading position (`v3_positions`). Unknown columns are kept for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, deserialize_with = "lenient::opt_parsed")]
    pub status: Option<PositionStatus>,
    #[serde(default, deserialize_with = "lenient::opt_decimal")]
    pub realized_pnl: Option<Decimal>,
    /// Legacy column the daemon wrote settled P&L into
    #[serde(default, deserialize_with = "lenient::opt_decimal")]
    pub unrealized_pnl: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::opt_decimal")]
    pub total_cost: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub edge: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub opened_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub closed_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Position {
    pub fn has_status(&self, status: &PositionStatus) -> bool {
        self.status.as_ref() == Some(status)
    }

    pub fn pnl(&self) -> Decimal {
        self.realized_pnl
            .or(self.unrealized_pnl)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn cost(&self) -> Decimal {
        self.total_cost.unwrap_or(Decimal::ZERO)
    }

    /// Close time, else open time: the moment the position is booked against.
    pub fn booked_at(&self) -> Option<&str> {
        self.closed_at.as_deref().or(self.opened_at.as_deref())
    }
}

/// Strategy signal (`v3_signals`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Signal {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub edge: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub action: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Capability gate (`factory_policy`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Policy {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Value,
}

/// Automation trigger (`factory_triggers`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Trigger {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient::count")]
    pub fire_count: i64,
}

/// Product in the pipeline (`products`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub price_point: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub blocker: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub maturity: Decimal,
}

impl Product {
    /// Stage column, else status column.
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref().or(self.status.as_deref())
    }
}

/// Scored market opportunity (`opportunities`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Opportunity {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub score: Decimal,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub verdict: Option<String>,
}

/// Outbound affiliate click (`affiliate_clicks`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AffiliateClick {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn task_tolerates_missing_and_odd_fields() {
        let task: Task = serde_json::from_value(json!({
            "id": 42,
            "title": "Ship pricing page",
            "status": "waiting_on_human",
            "tags": null,
            "priority": "critical"
        }))
        .unwrap();

        assert_eq!(task.id.as_deref(), Some("42"));
        assert_eq!(
            task.status,
            Some(TaskStatus::Other("waiting_on_human".to_string()))
        );
        assert!(task.tags.is_empty());
        assert!(task.is_critical());
        assert!(task.assigned_agent.is_none());
    }

    #[test]
    fn position_prefers_realized_pnl_and_keeps_extra_columns() {
        let position: Position = serde_json::from_value(json!({
            "id": "p-1",
            "status": "settled",
            "realized_pnl": "4.20",
            "unrealized_pnl": 9,
            "total_cost": 10,
            "market": "btc-up"
        }))
        .unwrap();

        assert_eq!(position.pnl(), dec!(4.20));
        assert_eq!(position.cost(), dec!(10));
        assert!(position.has_status(&PositionStatus::Settled));
        assert_eq!(position.extra.get("market"), Some(&json!("btc-up")));

        let legacy: Position =
            serde_json::from_value(json!({"status": "settled", "unrealized_pnl": -3})).unwrap();
        assert_eq!(legacy.pnl(), dec!(-3));
    }

    #[test]
    fn event_payload_accessors() {
        let event: Event = serde_json::from_value(json!({
            "event_type": "articles_published",
            "payload": {"message": "", "product": "aisp", "articles_count": "3"}
        }))
        .unwrap();

        assert_eq!(event.message(), None);
        assert_eq!(event.headline(), "articles_published");
        assert_eq!(event.product_ref(), Some("aisp"));
        assert_eq!(event.payload_count("articles_count"), Some(3));
    }

    #[test]
    fn revenue_amount_defaults_to_zero() {
        let entry: RevenueEntry =
            serde_json::from_value(json!({"amount": "oops", "recurring": "true", "type": "subscription"}))
                .unwrap();
        assert_eq!(entry.amount, Decimal::ZERO);
        assert!(entry.recurring);
        assert_eq!(entry.entry_type.as_deref(), Some("subscription"));
    }
}
