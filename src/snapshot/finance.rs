//! Revenue, product and model-spend rollups.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::money::{add_or_keep, checked_total, round2, whole_percent};
use crate::domain::roster::TIER_LABELS;
use crate::domain::{AffiliateClick, Clock, Opportunity, Product, RevenueEntry, TokenUsage};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub total: Decimal,
    pub today: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RevenueDetail {
    pub total: Decimal,
    pub today: Decimal,
    pub mtd: Decimal,
    pub mrr: Decimal,
    pub affiliate_clicks_today: usize,
    pub affiliate_clicks_total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueChannel {
    #[serde(rename = "c")]
    pub channel: &'static str,
    #[serde(rename = "s")]
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductCard {
    pub name: Option<String>,
    pub price: String,
    pub status: String,
    pub blocker: String,
    pub rev: Decimal,
    #[serde(rename = "c")]
    pub color: &'static str,
    #[serde(rename = "mat")]
    pub maturity: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpportunityCard {
    pub name: Option<String>,
    pub score: Decimal,
    #[serde(rename = "v")]
    pub verdict: String,
    #[serde(rename = "c")]
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CostTier {
    Routine,
    Standard,
    Complex,
}

impl CostTier {
    /// Tier by model name: `kimi` is routine, `opus` complex, anything else standard.
    pub fn of_model(model: Option<&str>) -> Self {
        match model {
            Some(m) if m.contains("kimi") => Self::Routine,
            Some(m) if m.contains("opus") => Self::Complex,
            _ => Self::Standard,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Share reported when nothing has been spent yet
    fn baseline_percent(self) -> u32 {
        match self {
            Self::Routine => 30,
            Self::Standard => 50,
            Self::Complex => 20,
        }
    }
}

const TIERS: [CostTier; 3] = [CostTier::Routine, CostTier::Standard, CostTier::Complex];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierShare {
    #[serde(rename = "t")]
    pub tier: &'static str,
    #[serde(rename = "m")]
    pub model: &'static str,
    #[serde(rename = "p")]
    pub percent: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenSummary {
    pub total_cost: Decimal,
    pub by_agent: BTreeMap<String, Decimal>,
    pub tiers: Vec<TierShare>,
}

fn sum<'a>(entries: impl Iterator<Item = &'a RevenueEntry>) -> Decimal {
    round2(checked_total(entries.map(|r| r.amount)))
}

fn is_stripe_recurring(entry: &RevenueEntry) -> bool {
    let stripe = entry.source.as_deref() == Some("stripe") || entry.channel.as_deref() == Some("stripe");
    stripe && (entry.recurring || entry.entry_type.as_deref() == Some("subscription"))
}

pub fn revenue_detail(revenue: &[RevenueEntry], clicks: &[AffiliateClick], clock: &Clock) -> RevenueDetail {
    RevenueDetail {
        total: sum(revenue.iter()),
        today: sum(revenue.iter().filter(|r| clock.is_today(r.created_at.as_deref()))),
        mtd: sum(revenue.iter().filter(|r| clock.is_this_month(r.created_at.as_deref()))),
        mrr: sum(revenue.iter().filter(|r| is_stripe_recurring(r))),
        affiliate_clicks_today: clicks
            .iter()
            .filter(|c| clock.is_today(c.created_at.as_deref()))
            .count(),
        affiliate_clicks_total: clicks.len(),
    }
}

/// Revenue attributed to `product`: the entry's product ref equals the
/// product id or its lowercased name.
pub fn product_revenue(revenue: &[RevenueEntry], product: &Product) -> Decimal {
    let lower_name = product.name.as_deref().map(str::to_lowercase);
    sum(revenue.iter().filter(|r| {
        let Some(target) = r.product.as_deref() else {
            return false;
        };
        product.id.as_deref() == Some(target) || lower_name.as_deref() == Some(target)
    }))
}

fn stage_color(stage: Option<&str>) -> &'static str {
    match stage {
        Some("qa") => "#22d3ee",
        Some("build") => "#a78bfa",
        Some("launch") => "#00ff88",
        _ => "#64748b",
    }
}

pub fn product_cards(products: &[Product], revenue: &[RevenueEntry]) -> Vec<ProductCard> {
    products
        .iter()
        .map(|p| ProductCard {
            name: p.name.clone(),
            price: p
                .price_point
                .clone()
                .or_else(|| p.price.clone())
                .unwrap_or_else(|| "—".to_string()),
            status: p.stage().unwrap_or("Planned").to_string(),
            blocker: p.blocker.clone().unwrap_or_default(),
            rev: product_revenue(revenue, p),
            color: stage_color(p.stage()),
            maturity: p.maturity,
        })
        .collect()
}

pub fn opportunity_cards(opportunities: &[Opportunity]) -> Vec<OpportunityCard> {
    opportunities
        .iter()
        .map(|o| {
            let (verdict, color) = if o.score >= Decimal::from(20) {
                ("GO", "#00ff88")
            } else if o.score >= Decimal::from(15) {
                ("MAYBE", "#fbbf24")
            } else {
                ("NO", "#ef4444")
            };
            OpportunityCard {
                name: o.name.clone(),
                score: o.score,
                verdict: o.verdict.clone().unwrap_or_else(|| verdict.to_string()),
                color,
            }
        })
        .collect()
}

pub fn revenue_channels(total_revenue: Decimal) -> Vec<RevenueChannel> {
    let stripe = if total_revenue > Decimal::ZERO { "Live" } else { "Wiring" };
    vec![
        RevenueChannel { channel: "Stripe (SaaS)", status: stripe },
        RevenueChannel { channel: "Apple App Store", status: "Blocked" },
        RevenueChannel { channel: "Google Play", status: "Blocked" },
        RevenueChannel { channel: "Affiliate (AISP)", status: "Live" },
        RevenueChannel { channel: "Kraken Trading", status: "Not started" },
    ]
}

pub fn token_summary(usage: &[TokenUsage]) -> TokenSummary {
    let mut by_agent: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut by_tier = [Decimal::ZERO; 3];
    let mut total = Decimal::ZERO;

    for entry in usage {
        let agent = entry.agent.clone().unwrap_or_else(|| "unknown".to_string());
        let Some(next_total) = total.checked_add(entry.cost_usd) else {
            continue;
        };
        total = next_total;
        let spent = by_agent.entry(agent).or_default();
        *spent = add_or_keep(*spent, entry.cost_usd);
        let tier = &mut by_tier[CostTier::of_model(entry.model.as_deref()).index()];
        *tier = add_or_keep(*tier, entry.cost_usd);
    }

    let tiers = TIERS
        .iter()
        .zip(TIER_LABELS)
        .map(|(tier, (label, model))| TierShare {
            tier: label,
            model,
            percent: if total.is_zero() {
                tier.baseline_percent()
            } else {
                whole_percent(by_tier[tier.index()], total)
            },
        })
        .collect();

    TokenSummary {
        total_cost: round2(total),
        by_agent: by_agent.into_iter().map(|(k, v)| (k, round2(v))).collect(),
        tiers,
    }
}
