//! Billing: hosted checkout link, paywall access, and the inbound webhook.

pub mod webhook;

use anyhow::{anyhow, Result};

use crate::models::subscription::Subscription;
use crate::models::user::UserSession;

/// Checkout URL carrying the user's email and id as provider metadata.
pub fn checkout_url(base: &str, session: &UserSession) -> Result<String> {
    let base = base.trim();
    if base.is_empty() {
        return Err(anyhow!("Checkout URL is not configured"));
    }

    let mut params: Vec<(&str, &str)> = Vec::new();
    if !session.email.is_empty() {
        params.push(("checkout[email]", &session.email));
    }
    if !session.id.is_empty() {
        params.push(("checkout[custom][user_id]", &session.id));
    }
    params.push(("embed", "1"));

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if base.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", base, separator, query))
}

/// Whether paid features are unlocked for this subscription record.
pub fn has_pro_access(subscription: Option<&Subscription>) -> bool {
    subscription.is_some_and(Subscription::is_pro)
}
