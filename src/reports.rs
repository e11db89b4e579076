//! Time-bucketed aggregation of priced events.
//!
//! Events are bucketed by local calendar date (daily), Sunday-anchored local
//! week (weekly), and local calendar month (monthly). Cache savings are
//! computed once per bucket after all events are folded in, so rounding
//! never compounds across events.

use crate::models::{DailyStats, EventCost, MonthlyStats, UsageEvent, WeeklyStats};
use crate::plans::Plan;
use crate::pricing::PricingTable;
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};

pub struct Aggregator<'a> {
    pricing: &'a PricingTable,
}

impl<'a> Aggregator<'a> {
    pub fn new(pricing: &'a PricingTable) -> Self {
        Self { pricing }
    }

    /// One bucket per local calendar date with activity, ascending.
    pub fn daily(&self, events: &[UsageEvent]) -> Vec<DailyStats> {
        let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
        for event in events {
            buckets
                .entry(local_date(event))
                .or_default()
                .fold(event, self.pricing);
        }

        buckets
            .into_iter()
            .map(|(date, bucket)| DailyStats {
                date: date.format("%Y-%m-%d").to_string(),
                events: bucket.events,
                total_tokens: bucket.total_tokens,
                total_cost: bucket.total_cost,
                input_tokens: bucket.input_tokens,
                output_tokens: bucket.output_tokens,
                cache_write_tokens: bucket.cache_write_tokens,
                cache_read_tokens: bucket.cache_read_tokens,
                tokens_by_model: bucket.tokens_by_model,
                cost_by_model: bucket.cost_by_model,
                cache_cost: bucket.cache_cost,
                no_cache_cost: bucket.no_cache_cost,
                cache_savings: bucket.no_cache_cost - bucket.total_cost,
            })
            .collect()
    }

    /// The most recent `weeks` Sunday-anchored weeks with activity, ascending.
    pub fn weekly(&self, events: &[UsageEvent], weeks: usize) -> Vec<WeeklyStats> {
        let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
        for event in events {
            buckets
                .entry(week_start(local_date(event)))
                .or_default()
                .fold(event, self.pricing);
        }

        let mut stats: Vec<WeeklyStats> = buckets
            .into_iter()
            .map(|(start, bucket)| {
                let active_days = bucket.active_days.len() as u32;
                WeeklyStats {
                    week_start: start.format("%Y-%m-%d").to_string(),
                    week_end: (start + Duration::days(6)).format("%Y-%m-%d").to_string(),
                    days: active_days,
                    events: bucket.events,
                    total_tokens: bucket.total_tokens,
                    total_cost: bucket.total_cost,
                    daily_average: bucket.total_cost / active_days.max(1) as f64,
                    input_tokens: bucket.input_tokens,
                    output_tokens: bucket.output_tokens,
                    cache_write_tokens: bucket.cache_write_tokens,
                    cache_read_tokens: bucket.cache_read_tokens,
                    tokens_by_model: bucket.tokens_by_model,
                    cost_by_model: bucket.cost_by_model,
                    cache_cost: bucket.cache_cost,
                    no_cache_cost: bucket.no_cache_cost,
                    cache_savings: bucket.no_cache_cost - bucket.total_cost,
                }
            })
            .collect();

        truncate_to_recent(&mut stats, weeks);
        stats
    }

    /// The most recent `months` calendar months with activity, ascending.
    /// Savings are measured against the caller's current plan and may be
    /// negative; that is reported as-is.
    pub fn monthly(&self, events: &[UsageEvent], months: usize, plan: &Plan) -> Vec<MonthlyStats> {
        let mut buckets: BTreeMap<(i32, u32), Bucket> = BTreeMap::new();
        for event in events {
            let date = local_date(event);
            buckets
                .entry((date.year(), date.month()))
                .or_default()
                .fold(event, self.pricing);
        }

        let mut stats: Vec<MonthlyStats> = buckets
            .into_iter()
            .map(|((year, month), bucket)| {
                let active_days = bucket.active_days.len() as u32;
                let active_weeks = (active_days + 6) / 7;
                let api_equivalent_cost = bucket.total_cost;
                MonthlyStats {
                    year,
                    month,
                    days: active_days,
                    events: bucket.events,
                    total_tokens: bucket.total_tokens,
                    total_cost: bucket.total_cost,
                    daily_average: bucket.total_cost / active_days.max(1) as f64,
                    weekly_average: bucket.total_cost / active_weeks.max(1) as f64,
                    input_tokens: bucket.input_tokens,
                    output_tokens: bucket.output_tokens,
                    cache_write_tokens: bucket.cache_write_tokens,
                    cache_read_tokens: bucket.cache_read_tokens,
                    tokens_by_model: bucket.tokens_by_model,
                    cost_by_model: bucket.cost_by_model,
                    cache_cost: bucket.cache_cost,
                    no_cache_cost: bucket.no_cache_cost,
                    cache_savings: bucket.no_cache_cost - bucket.total_cost,
                    api_equivalent_cost,
                    plan_cost: plan.monthly_cost,
                    savings: api_equivalent_cost - plan.monthly_cost,
                }
            })
            .collect();

        truncate_to_recent(&mut stats, months);
        stats
    }
}

#[derive(Default)]
struct Bucket {
    events: u64,
    total_tokens: u64,
    total_cost: f64,
    input_tokens: u64,
    output_tokens: u64,
    cache_write_tokens: u64,
    cache_read_tokens: u64,
    tokens_by_model: HashMap<String, u64>,
    cost_by_model: HashMap<String, f64>,
    cache_cost: f64,
    no_cache_cost: f64,
    active_days: HashSet<NaiveDate>,
}

impl Bucket {
    fn fold(&mut self, event: &UsageEvent, pricing: &PricingTable) {
        let cost = event.cost.total();
        self.events += 1;
        self.total_tokens += event.total_tokens;
        self.total_cost += cost;
        self.input_tokens += event.input_tokens;
        self.output_tokens += event.output_tokens;
        self.cache_write_tokens += event.cache_write_tokens;
        self.cache_read_tokens += event.cache_read_tokens;
        *self
            .tokens_by_model
            .entry(event.model.clone())
            .or_insert(0) += event.total_tokens;
        *self
            .cost_by_model
            .entry(event.model.clone())
            .or_insert(0.0) += cost;

        // Cache figures only exist for costs we computed ourselves; a
        // supplied cost has no breakdown to attribute.
        if let EventCost::Computed { breakdown, .. } = &event.cost {
            self.cache_cost += breakdown.cache_write + breakdown.cache_read;
            if let Some(counterfactual) = pricing.no_cache_cost(event) {
                self.no_cache_cost += counterfactual;
            }
        }

        self.active_days.insert(local_date(event));
    }
}

fn local_date(event: &UsageEvent) -> NaiveDate {
    event.timestamp.with_timezone(&Local).date_naive()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

fn truncate_to_recent<T>(stats: &mut Vec<T>, keep: usize) {
    if stats.len() > keep {
        let drop = stats.len() - keep;
        stats.drain(..drop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawUsage;
    use crate::pricing::default_table;
    use chrono::{DateTime, TimeZone, Utc};

    // Anchored to local noon so bucket dates are stable in any timezone.
    fn local_noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn priced_event(
        timestamp: DateTime<Utc>,
        model: &str,
        input: u64,
        output: u64,
        cache_write: u64,
        cache_read: u64,
    ) -> UsageEvent {
        let usage = RawUsage {
            input_tokens: input,
            output_tokens: output,
            cache_creation_input_tokens: cache_write,
            cache_read_input_tokens: cache_read,
        };
        UsageEvent {
            timestamp,
            model: model.to_string(),
            input_tokens: input,
            output_tokens: output,
            cache_write_tokens: cache_write,
            cache_read_tokens: cache_read,
            total_tokens: usage.total(),
            cost: default_table().price(&usage, model, None),
            project: "alpha".to_string(),
        }
    }

    #[test]
    fn test_daily_buckets_by_local_date() {
        let events = vec![
            priced_event(
                local_noon(2025, 6, 15),
                "claude-3-5-haiku-20241022",
                1_000_000,
                500_000,
                0,
                0,
            ),
            priced_event(local_noon(2025, 6, 15), "claude-3-5-haiku-20241022", 0, 0, 0, 0),
            priced_event(
                local_noon(2025, 6, 16),
                "claude-3-5-haiku-20241022",
                100,
                0,
                0,
                0,
            ),
        ];
        let stats = Aggregator::new(default_table()).daily(&events);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].date, "2025-06-15");
        assert_eq!(stats[0].events, 2);
        assert_eq!(stats[0].total_tokens, 1_500_000);
        assert!((stats[0].total_cost - 2.8).abs() < 1e-9);
        assert_eq!(
            stats[0].tokens_by_model["claude-3-5-haiku-20241022"],
            1_500_000
        );
        assert_eq!(stats[1].date, "2025-06-16");
    }

    #[test]
    fn test_cache_savings_formula_holds_per_bucket() {
        let model = "claude-3-5-sonnet-20241022";
        let events = vec![
            priced_event(local_noon(2025, 6, 15), model, 10_000, 2_000, 50_000, 100_000),
            priced_event(local_noon(2025, 6, 15), model, 0, 0, 0, 200_000),
        ];
        let stats = Aggregator::new(default_table()).daily(&events);
        assert_eq!(stats.len(), 1);
        let day = &stats[0];
        assert!((day.cache_savings - (day.no_cache_cost - day.total_cost)).abs() < 1e-12);
        // 300k cache reads at $0.30/M plus 50k cache writes at $3.75/M.
        assert!((day.cache_cost - (0.3 * 0.3 + 0.05 * 3.75)).abs() < 1e-9);
        // Counterfactual: all input-side tokens at the plain input rate.
        let expected_no_cache =
            (10_000.0 + 50_000.0 + 100_000.0) / 1e6 * 3.0 + 2_000.0 / 1e6 * 15.0 + 200_000.0 / 1e6 * 3.0;
        assert!((day.no_cache_cost - expected_no_cache).abs() < 1e-9);
    }

    #[test]
    fn test_supplied_cost_contributes_no_cache_figures() {
        let mut event = priced_event(local_noon(2025, 6, 15), "claude-3-5-sonnet-20241022", 0, 0, 0, 100_000);
        event.cost = EventCost::Supplied { total: 1.25 };
        let stats = Aggregator::new(default_table()).daily(&[event]);
        assert_eq!(stats[0].cache_cost, 0.0);
        assert_eq!(stats[0].no_cache_cost, 0.0);
        assert!((stats[0].total_cost - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_weekly_sunday_anchor_and_daily_average() {
        let model = "claude-3-5-haiku-20241022";
        // 2025-06-15 is a Sunday; 2025-06-08 lands in the prior week.
        let events = vec![
            priced_event(local_noon(2025, 6, 8), model, 1_000_000, 0, 0, 0),
            priced_event(local_noon(2025, 6, 15), model, 1_000_000, 0, 0, 0),
            priced_event(local_noon(2025, 6, 16), model, 1_000_000, 0, 0, 0),
        ];
        let stats = Aggregator::new(default_table()).weekly(&events, 4);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].week_start, "2025-06-08");
        assert_eq!(stats[1].week_start, "2025-06-15");
        assert_eq!(stats[1].week_end, "2025-06-21");
        assert_eq!(stats[1].days, 2);
        // $0.80 per event at the haiku input rate, two active days.
        assert!((stats[1].daily_average - 0.8).abs() < 1e-9);

        let recent = Aggregator::new(default_table()).weekly(&events, 1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].week_start, "2025-06-15");
    }

    #[test]
    fn test_monthly_savings_may_be_negative() {
        let model = "claude-3-5-haiku-20241022";
        let events = vec![
            priced_event(local_noon(2025, 6, 15), model, 1_000_000, 0, 0, 0),
            priced_event(local_noon(2025, 7, 1), model, 1_000_000, 0, 0, 0),
        ];
        let plan = Plan::pro();
        let stats = Aggregator::new(default_table()).monthly(&events, 3, &plan);
        assert_eq!(stats.len(), 2);
        assert_eq!((stats[0].year, stats[0].month), (2025, 6));
        assert_eq!((stats[1].year, stats[1].month), (2025, 7));
        // $0.80 of metered usage against a $20 plan: negative, unclamped.
        assert!((stats[0].savings - (0.8 - 20.0)).abs() < 1e-9);
        assert_eq!(stats[0].api_equivalent_cost, stats[0].total_cost);

        let recent = Aggregator::new(default_table()).monthly(&events, 1, &plan);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].month, 7);
    }

    #[test]
    fn test_totals_are_exact_sums_over_events() {
        let model = "claude-3-5-sonnet-20241022";
        let events: Vec<_> = (0..10)
            .map(|i| priced_event(local_noon(2025, 6, 15), model, 1_000 * i, 500, 10, 20))
            .collect();
        let stats = Aggregator::new(default_table()).daily(&events);
        let expected_cost: f64 = events.iter().map(|e| e.cost.total()).sum();
        let expected_tokens: u64 = events.iter().map(|e| e.total_tokens).sum();
        assert_eq!(stats[0].total_tokens, expected_tokens);
        assert!((stats[0].total_cost - expected_cost).abs() < 1e-12);
    }
}
