// Subscription module
// Billing state mirrored from the payment provider's webhooks

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
        }
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Plan::Free),
            "pro" => Ok(Plan::Pro),
            other => Err(format!("Unknown plan '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
    PastDue,
    Paused,
    OnTrial,
    Unpaid,
}

impl SubscriptionStatus {
    pub const ALL: [SubscriptionStatus; 7] = [
        SubscriptionStatus::Active,
        SubscriptionStatus::Cancelled,
        SubscriptionStatus::Expired,
        SubscriptionStatus::PastDue,
        SubscriptionStatus::Paused,
        SubscriptionStatus::OnTrial,
        SubscriptionStatus::Unpaid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::OnTrial => "on_trial",
            SubscriptionStatus::Unpaid => "unpaid",
        }
    }

    /// Statuses that keep paid features unlocked.
    pub fn grants_access(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::OnTrial)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown subscription status '{}'", s))
    }
}

/// One user's subscription record. Timestamps are kept as the provider's
/// ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Option<i64>,
    pub user_id: String,
    pub provider_subscription_id: String,
    pub order_id: Option<String>,
    pub customer_id: String,
    pub product_id: String,
    pub variant_id: String,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub card_brand: Option<String>,
    pub card_last_four: Option<String>,
    pub renews_at: Option<String>,
    pub ends_at: Option<String>,
    pub trial_ends_at: Option<String>,
    pub update_payment_method_url: Option<String>,
}

impl Subscription {
    pub fn is_pro(&self) -> bool {
        self.plan == Plan::Pro && self.status.grants_access()
    }
}

/// Partial update applied by lifecycle webhooks. `None` leaves a column
/// untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionPatch {
    pub plan: Option<Plan>,
    pub status: Option<SubscriptionStatus>,
    pub card_brand: Option<Option<String>>,
    pub card_last_four: Option<Option<String>>,
    pub renews_at: Option<Option<String>>,
    pub ends_at: Option<Option<String>>,
}

impl SubscriptionPatch {
    pub fn is_empty(&self) -> bool {
        self == &SubscriptionPatch::default()
    }
}
