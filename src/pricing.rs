//! Per-model pricing and the no-cache counterfactual.
//!
//! Rates are expressed in USD per million tokens. The table is static
//! configuration resolved once at process start; tier selection is a
//! longest-pattern-substring match so that a more specific model id always
//! beats a broader family pattern, regardless of declaration order.

use crate::models::{CostBreakdown, EventCost, RawUsage, UsageEvent};
use std::sync::OnceLock;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

#[derive(Debug, Clone)]
pub struct PricingTier {
    /// Substring matched against the event's model identifier.
    pub pattern: &'static str,
    pub input: f64,
    pub output: f64,
    pub cache_write: f64,
    pub cache_read: f64,
}

fn default_tiers() -> Vec<PricingTier> {
    vec![
        PricingTier {
            pattern: "claude-sonnet-4-20250514",
            input: 3.0,
            output: 15.0,
            cache_write: 3.75,
            cache_read: 0.3,
        },
        PricingTier {
            pattern: "claude-3-5-sonnet-20241022",
            input: 3.0,
            output: 15.0,
            cache_write: 3.75,
            cache_read: 0.3,
        },
        PricingTier {
            pattern: "claude-3-5-haiku-20241022",
            input: 0.8,
            output: 4.0,
            cache_write: 1.0,
            cache_read: 0.08,
        },
        PricingTier {
            pattern: "claude-3-opus-20240229",
            input: 15.0,
            output: 75.0,
            cache_write: 18.75,
            cache_read: 1.5,
        },
        PricingTier {
            pattern: "claude-opus-4-20250514",
            input: 15.0,
            output: 75.0,
            cache_write: 18.75,
            cache_read: 1.5,
        },
    ]
}

#[derive(Debug)]
pub struct PricingTable {
    tiers: Vec<PricingTier>,
}

impl PricingTable {
    pub fn new(mut tiers: Vec<PricingTier>) -> Self {
        // Longest pattern first, so the first substring hit is the longest match.
        tiers.sort_by(|a, b| b.pattern.len().cmp(&a.pattern.len()));
        Self { tiers }
    }

    pub fn resolve(&self, model: &str) -> Option<&PricingTier> {
        self.tiers.iter().find(|tier| model.contains(tier.pattern))
    }

    /// Price a raw usage record. A supplied cost wins verbatim; otherwise the
    /// matching tier prices each token category, and a model with no tier is
    /// `Unpriced` (zero cost) rather than an error.
    pub fn price(&self, usage: &RawUsage, model: &str, supplied: Option<f64>) -> EventCost {
        if let Some(total) = supplied {
            return EventCost::Supplied { total };
        }
        let Some(tier) = self.resolve(model) else {
            return EventCost::Unpriced;
        };
        let breakdown = CostBreakdown {
            input: usage.input_tokens as f64 / TOKENS_PER_MILLION * tier.input,
            output: usage.output_tokens as f64 / TOKENS_PER_MILLION * tier.output,
            cache_write: usage.cache_creation_input_tokens as f64 / TOKENS_PER_MILLION
                * tier.cache_write,
            cache_read: usage.cache_read_input_tokens as f64 / TOKENS_PER_MILLION
                * tier.cache_read,
        };
        EventCost::Computed {
            total: breakdown.total(),
            breakdown,
        }
    }

    /// What the event would have cost had every cache token been billed at
    /// the plain input rate. Savings reporting only; never the authoritative
    /// cost.
    pub fn no_cache_cost(&self, event: &UsageEvent) -> Option<f64> {
        let tier = self.resolve(&event.model)?;
        let uncached_input =
            (event.input_tokens + event.cache_write_tokens + event.cache_read_tokens) as f64;
        Some(
            uncached_input / TOKENS_PER_MILLION * tier.input
                + event.output_tokens as f64 / TOKENS_PER_MILLION * tier.output,
        )
    }
}

static DEFAULT_TABLE: OnceLock<PricingTable> = OnceLock::new();

/// The built-in rate table, resolved once per process.
pub fn default_table() -> &'static PricingTable {
    DEFAULT_TABLE.get_or_init(|| PricingTable::new(default_tiers()))
}
