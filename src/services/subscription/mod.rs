//! Subscription service.
//! One row per user, written by the billing webhook and read by the paywall.

use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

use crate::models::subscription::{Subscription, SubscriptionPatch};

const SELECT_COLUMNS: &str = "id, user_id, provider_subscription_id, order_id, customer_id,
    product_id, variant_id, plan, status, card_brand, card_last_four, renews_at, ends_at,
    trial_ends_at, update_payment_method_url";

pub struct SubscriptionService<'a> {
    conn: &'a Connection,
}

impl<'a> SubscriptionService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, user_id: &str) -> Result<Option<Subscription>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM subscriptions WHERE user_id = ?1", SELECT_COLUMNS),
                [user_id],
                map_subscription_row,
            )
            .optional()
            .context("Failed to load subscription")
    }

    /// Insert or fully replace the user's subscription.
    pub fn upsert(&self, sub: &Subscription) -> Result<Subscription> {
        self.conn
            .execute(
                "INSERT INTO subscriptions (
                    user_id, provider_subscription_id, order_id, customer_id, product_id,
                    variant_id, plan, status, card_brand, card_last_four, renews_at, ends_at,
                    trial_ends_at, update_payment_method_url
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT(user_id) DO UPDATE SET
                    provider_subscription_id = excluded.provider_subscription_id,
                    order_id = excluded.order_id,
                    customer_id = excluded.customer_id,
                    product_id = excluded.product_id,
                    variant_id = excluded.variant_id,
                    plan = excluded.plan,
                    status = excluded.status,
                    card_brand = excluded.card_brand,
                    card_last_four = excluded.card_last_four,
                    renews_at = excluded.renews_at,
                    ends_at = excluded.ends_at,
                    trial_ends_at = excluded.trial_ends_at,
                    update_payment_method_url = excluded.update_payment_method_url,
                    updated_at = CURRENT_TIMESTAMP",
                params![
                    sub.user_id,
                    sub.provider_subscription_id,
                    sub.order_id,
                    sub.customer_id,
                    sub.product_id,
                    sub.variant_id,
                    sub.plan.as_str(),
                    sub.status.as_str(),
                    sub.card_brand,
                    sub.card_last_four,
                    sub.renews_at,
                    sub.ends_at,
                    sub.trial_ends_at,
                    sub.update_payment_method_url,
                ],
            )
            .context("Failed to upsert subscription")?;

        log::info!(
            "Stored subscription for user {}: {} ({})",
            sub.user_id,
            sub.plan.as_str(),
            sub.status
        );

        self.get(&sub.user_id)?
            .context("Subscription missing after upsert")
    }

    /// Apply a partial update. Returns `false` when the user has no row.
    pub fn apply_patch(&self, user_id: &str, patch: &SubscriptionPatch) -> Result<bool> {
        if patch.is_empty() {
            return Ok(self.get(user_id)?.is_some());
        }

        let plan = patch.plan.map(|p| p.as_str().to_string());
        let status = patch.status.map(|s| s.as_str().to_string());

        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(plan) = &plan {
            assignments.push("plan = ?");
            values.push(plan);
        }
        if let Some(status) = &status {
            assignments.push("status = ?");
            values.push(status);
        }
        if let Some(card_brand) = &patch.card_brand {
            assignments.push("card_brand = ?");
            values.push(card_brand);
        }
        if let Some(card_last_four) = &patch.card_last_four {
            assignments.push("card_last_four = ?");
            values.push(card_last_four);
        }
        if let Some(renews_at) = &patch.renews_at {
            assignments.push("renews_at = ?");
            values.push(renews_at);
        }
        if let Some(ends_at) = &patch.ends_at {
            assignments.push("ends_at = ?");
            values.push(ends_at);
        }
        values.push(&user_id);

        let sql = format!(
            "UPDATE subscriptions SET {}, updated_at = CURRENT_TIMESTAMP WHERE user_id = ?",
            assignments.join(", ")
        );
        let changed = self
            .conn
            .execute(&sql, values.as_slice())
            .context("Failed to update subscription")?;

        if changed == 0 {
            log::warn!("No subscription row to update for user {}", user_id);
        }
        Ok(changed > 0)
    }
}

fn map_subscription_row(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    let plan: String = row.get(7)?;
    let status: String = row.get(8)?;

    Ok(Subscription {
        id: row.get(0)?,
        user_id: row.get(1)?,
        provider_subscription_id: row.get(2)?,
        order_id: row.get(3)?,
        customer_id: row.get(4)?,
        product_id: row.get(5)?,
        variant_id: row.get(6)?,
        plan: plan
            .parse()
            .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, e.into()))?,
        status: status
            .parse()
            .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, e.into()))?,
        card_brand: row.get(9)?,
        card_last_four: row.get(10)?,
        renews_at: row.get(11)?,
        ends_at: row.get(12)?,
        trial_ends_at: row.get(13)?,
        update_payment_method_url: row.get(14)?,
    })
}
