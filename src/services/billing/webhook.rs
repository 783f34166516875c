//! Payment-provider webhook: signature check, payload parsing, and the
//! mapping from lifecycle events to subscription writes.

use std::fmt;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::models::subscription::{Plan, Subscription, SubscriptionPatch, SubscriptionStatus};
use crate::services::subscription::SubscriptionService;

pub const SIGNATURE_HEADER: &str = "x-signature";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
}

impl WebhookResponse {
    fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    fn received() -> Self {
        Self::new(200, serde_json::json!({ "received": true }).to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub meta: Meta,
    pub data: Data,
}

#[derive(Debug, Deserialize)]
pub struct Meta {
    pub event_name: String,
    #[serde(default)]
    pub custom_data: Option<CustomData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomData {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Data {
    pub id: IdValue,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Attributes {
    pub customer_id: Option<IdValue>,
    pub order_id: Option<IdValue>,
    pub product_id: Option<IdValue>,
    pub variant_id: Option<IdValue>,
    pub status: Option<String>,
    pub card_brand: Option<String>,
    pub card_last_four: Option<String>,
    pub renews_at: Option<String>,
    pub ends_at: Option<String>,
    pub trial_ends_at: Option<String>,
    pub urls: Option<Urls>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Urls {
    pub update_payment_method: Option<String>,
}

/// Provider ids arrive as numbers or strings; both are stored as text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdValue::Number(n) => write!(f, "{}", n),
            IdValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    Created,
    Updated,
    Cancelled,
    Expired,
    Resumed,
    PaymentSuccess,
    PaymentFailed,
    Other(String),
}

impl WebhookEvent {
    pub fn parse(name: &str) -> Self {
        match name {
            "subscription_created" => WebhookEvent::Created,
            "subscription_updated" => WebhookEvent::Updated,
            "subscription_cancelled" => WebhookEvent::Cancelled,
            "subscription_expired" => WebhookEvent::Expired,
            "subscription_resumed" => WebhookEvent::Resumed,
            "subscription_payment_success" => WebhookEvent::PaymentSuccess,
            "subscription_payment_failed" => WebhookEvent::PaymentFailed,
            other => WebhookEvent::Other(other.to_string()),
        }
    }
}

/// What an event asks the subscription table to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionWrite {
    Upsert(Subscription),
    Patch(SubscriptionPatch),
    Ignore,
}

/// Provider status to stored status; unknown values count as active.
pub fn map_status(provider_status: Option<&str>) -> SubscriptionStatus {
    provider_status
        .and_then(|s| s.parse().ok())
        .unwrap_or(SubscriptionStatus::Active)
}

/// Hex HMAC-SHA256 of `body` under `secret`.
pub fn sign(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a hex signature against `body`.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

pub fn subscription_write(event: &WebhookEvent, user_id: &str, data: &Data) -> SubscriptionWrite {
    let attrs = &data.attributes;
    let text = |id: &Option<IdValue>| id.as_ref().map(ToString::to_string).unwrap_or_default();

    match event {
        WebhookEvent::Created | WebhookEvent::Updated => SubscriptionWrite::Upsert(Subscription {
            id: None,
            user_id: user_id.to_string(),
            provider_subscription_id: data.id.to_string(),
            order_id: attrs.order_id.as_ref().map(ToString::to_string),
            customer_id: text(&attrs.customer_id),
            product_id: text(&attrs.product_id),
            variant_id: text(&attrs.variant_id),
            plan: Plan::Pro,
            status: map_status(attrs.status.as_deref()),
            card_brand: attrs.card_brand.clone(),
            card_last_four: attrs.card_last_four.clone(),
            renews_at: attrs.renews_at.clone(),
            ends_at: attrs.ends_at.clone(),
            trial_ends_at: attrs.trial_ends_at.clone(),
            update_payment_method_url: attrs
                .urls
                .as_ref()
                .and_then(|urls| urls.update_payment_method.clone()),
        }),
        WebhookEvent::Cancelled => SubscriptionWrite::Patch(SubscriptionPatch {
            status: Some(SubscriptionStatus::Cancelled),
            ends_at: Some(attrs.ends_at.clone()),
            ..Default::default()
        }),
        WebhookEvent::Expired => SubscriptionWrite::Patch(SubscriptionPatch {
            plan: Some(Plan::Free),
            status: Some(SubscriptionStatus::Expired),
            ends_at: Some(attrs.ends_at.clone()),
            ..Default::default()
        }),
        WebhookEvent::Resumed => SubscriptionWrite::Patch(SubscriptionPatch {
            plan: Some(Plan::Pro),
            status: Some(SubscriptionStatus::Active),
            renews_at: Some(attrs.renews_at.clone()),
            ends_at: Some(None),
            ..Default::default()
        }),
        WebhookEvent::PaymentSuccess => SubscriptionWrite::Patch(SubscriptionPatch {
            status: Some(SubscriptionStatus::Active),
            card_brand: Some(attrs.card_brand.clone()),
            card_last_four: Some(attrs.card_last_four.clone()),
            renews_at: Some(attrs.renews_at.clone()),
            ..Default::default()
        }),
        WebhookEvent::PaymentFailed => SubscriptionWrite::Patch(SubscriptionPatch {
            status: Some(SubscriptionStatus::PastDue),
            ..Default::default()
        }),
        WebhookEvent::Other(_) => SubscriptionWrite::Ignore,
    }
}

/// Handle one inbound webhook request.
pub fn handle(
    method: &str,
    signature: Option<&str>,
    body: &[u8],
    secret: &str,
    subscriptions: &SubscriptionService<'_>,
) -> WebhookResponse {
    if !method.eq_ignore_ascii_case("POST") {
        return WebhookResponse::new(405, "Method not allowed");
    }

    let verified = match signature {
        Some(signature) if !secret.is_empty() => verify_signature(secret, body, signature),
        _ => false,
    };
    if !verified {
        log::warn!("Rejected webhook with missing or invalid signature");
        return WebhookResponse::new(401, "Invalid signature");
    }

    let payload: WebhookPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("Malformed webhook payload: {}", e);
            return WebhookResponse::new(400, "Malformed payload");
        }
    };

    let event_name = payload.meta.event_name.as_str();
    let user_id = payload
        .meta
        .custom_data
        .as_ref()
        .and_then(|custom| custom.user_id.as_deref())
        .filter(|id| !id.is_empty());
    log::info!("Received event: {}, user_id: {:?}", event_name, user_id);

    let Some(user_id) = user_id else {
        log::error!("No user_id in custom_data for {}", event_name);
        return WebhookResponse::new(400, "Missing user_id");
    };

    let event = WebhookEvent::parse(event_name);
    let result = match subscription_write(&event, user_id, &payload.data) {
        SubscriptionWrite::Upsert(subscription) => subscriptions.upsert(&subscription).map(|_| ()),
        SubscriptionWrite::Patch(patch) => subscriptions.apply_patch(user_id, &patch).map(|_| ()),
        SubscriptionWrite::Ignore => {
            log::info!("Unhandled event: {}", event_name);
            Ok(())
        }
    };

    match result {
        Ok(()) => WebhookResponse::received(),
        Err(e) => {
            log::error!("Error processing {}: {:#}", event_name, e);
            WebhookResponse::new(500, "Internal error")
        }
    }
}
