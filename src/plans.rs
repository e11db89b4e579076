//! Subscription plan catalog and usage alerts.

use serde::Serialize;

/// A named subscription tier: per-session allowances, session duration, and
/// monthly price. Swapping the active plan never rewrites historical
/// reports; it only changes alerts and limits computed against current
/// usage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub name: String,
    #[serde(rename = "messagesPerSession")]
    pub messages_per_session: u32,
    #[serde(rename = "messagesPerDay")]
    pub messages_per_day: Option<u32>,
    #[serde(rename = "codePromptsPerSession")]
    pub code_prompts_per_session: u32,
    #[serde(rename = "resetHours")]
    pub reset_hours: u32,
    #[serde(rename = "monthlyCost")]
    pub monthly_cost: f64,
    #[serde(rename = "sessionLimit")]
    pub session_limit: u32,
    #[serde(rename = "estimatedTokensPerSession")]
    pub estimated_tokens_per_session: u64,
}

impl Plan {
    pub fn free() -> Self {
        Self {
            name: "Free".to_string(),
            messages_per_session: 0,
            messages_per_day: Some(40),
            code_prompts_per_session: 0,
            reset_hours: 24,
            monthly_cost: 0.0,
            session_limit: 0,
            estimated_tokens_per_session: 0,
        }
    }

    pub fn pro() -> Self {
        Self {
            name: "Pro".to_string(),
            messages_per_session: 45,
            messages_per_day: None,
            code_prompts_per_session: 25,
            reset_hours: 5,
            monthly_cost: 20.0,
            session_limit: 999,
            estimated_tokens_per_session: 4_500_000,
        }
    }

    pub fn max5() -> Self {
        Self {
            name: "Max5".to_string(),
            messages_per_session: 225,
            messages_per_day: None,
            code_prompts_per_session: 125,
            reset_hours: 5,
            monthly_cost: 100.0,
            session_limit: 50,
            estimated_tokens_per_session: 22_500_000,
        }
    }

    pub fn max20() -> Self {
        Self {
            name: "Max20".to_string(),
            messages_per_session: 900,
            messages_per_day: None,
            code_prompts_per_session: 500,
            reset_hours: 5,
            monthly_cost: 200.0,
            session_limit: 50,
            estimated_tokens_per_session: 90_000_000,
        }
    }

    pub fn team() -> Self {
        Self {
            name: "Team".to_string(),
            messages_per_session: 45,
            messages_per_day: None,
            code_prompts_per_session: 25,
            reset_hours: 5,
            monthly_cost: 25.0,
            session_limit: 999,
            estimated_tokens_per_session: 4_500_000,
        }
    }

    /// Case-insensitive lookup by plan name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "free" => Some(Self::free()),
            "pro" => Some(Self::pro()),
            "max5" => Some(Self::max5()),
            "max20" => Some(Self::max20()),
            "team" => Some(Self::team()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: String,
}

/// Derive alerts from the day's spend and the active plan. Pure: the result
/// is returned alongside the stats that triggered it; nothing is stored.
pub fn compute_alerts(daily_cost: f64, plan: &Plan) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if daily_cost > 5.0 {
        alerts.push(Alert {
            severity: AlertSeverity::Critical,
            message: format!("High daily cost: ${:.2}", daily_cost),
        });
    } else if daily_cost > 1.0 {
        alerts.push(Alert {
            severity: AlertSeverity::Warning,
            message: format!("Moderate daily cost: ${:.2}", daily_cost),
        });
    }

    if plan.name == "Free" {
        alerts.push(Alert {
            severity: AlertSeverity::Info,
            message: "Limited Claude Code access on Free plan".to_string(),
        });
    }

    alerts
}
