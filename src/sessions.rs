//! Billing-session reconstruction.
//!
//! Usage counts toward 5-hour windows that are anchored to activity, not to
//! a global clock: a window opens at the top of the hour in which the first
//! event after the previous window lands, runs exactly 5 hours, and the next
//! event at or past its end opens a fresh window. Windows therefore never
//! overlap, and every event in the input lands in exactly one session.

use crate::models::{Session, UsageEvent};
use chrono::{DateTime, Duration, Timelike, Utc};

pub const SESSION_WINDOW_HOURS: i64 = 5;

/// Partition a chronologically sorted event stream into sessions, most
/// recent first. Zero events yields an empty vector, not an error.
pub fn reconstruct_sessions(events: &[UsageEvent]) -> Vec<Session> {
    let window = Duration::hours(SESSION_WINDOW_HOURS);
    let mut sessions: Vec<Session> = Vec::new();
    let mut window_start: Option<DateTime<Utc>> = None;
    let mut current: Vec<UsageEvent> = Vec::new();

    for event in events {
        let rolls_over = match window_start {
            None => true,
            Some(start) => event.timestamp >= start + window,
        };
        if rolls_over {
            if let Some(start) = window_start.take() {
                if !current.is_empty() {
                    sessions.push(seal(start, start + window, std::mem::take(&mut current)));
                }
            }
            window_start = Some(floor_to_hour(event.timestamp));
        }
        current.push(event.clone());
    }

    if let Some(start) = window_start {
        if !current.is_empty() {
            sessions.push(seal(start, start + window, current));
        }
    }

    sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    sessions
}

/// Events per minute over the window, rounded. Zero for sessions with fewer
/// than two events or no duration.
pub fn burn_rate(session: &Session) -> u64 {
    if session.events.len() < 2 {
        return 0;
    }
    let duration_minutes = (session.end_time - session.start_time).num_minutes();
    if duration_minutes <= 0 {
        return 0;
    }
    (session.events.len() as f64 / duration_minutes as f64).round() as u64
}

/// Whole minutes until the window resets. A session already past its end
/// still reads as the current one, with zero time remaining.
pub fn minutes_until_reset(session: &Session, now: DateTime<Utc>) -> i64 {
    let remaining = (session.end_time - now).num_seconds() as f64 / 60.0;
    (remaining.round() as i64).max(0)
}

fn floor_to_hour(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}

fn seal(start: DateTime<Utc>, end: DateTime<Utc>, events: Vec<UsageEvent>) -> Session {
    let total_tokens = events.iter().map(|e| e.total_tokens).sum();
    let total_cost = events.iter().map(|e| e.cost.total()).sum();
    Session {
        id: start.to_rfc3339(),
        start_time: start,
        end_time: end,
        events,
        total_tokens,
        total_cost,
    }
}
