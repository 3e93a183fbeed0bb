/// Donations
///
/// A donation row is written in the same transaction as the matching
/// increment of its campaign's running total.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::user::{summary_json, UserSummary};
use crate::money::Cents;

/// How the donation arrived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "donation_source", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationSource {
    #[default]
    Manual,
    Online,
    Check,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: Uuid,
    pub amount: Cents,
    pub donor_name: String,
    pub donor_email: Option<String>,
    pub campaign_id: Uuid,
    pub source: DonationSource,
    pub notes: Option<String>,

    #[serde(rename = "recordedById")]
    pub recorded_by: Uuid,

    pub donated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DonationView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub donation: Donation,

    #[serde(rename = "recordedBy")]
    pub recorder: Json<UserSummary>,
}

#[derive(Debug, Clone)]
pub struct CreateDonation {
    pub amount: Cents,
    pub donor_name: String,
    pub donor_email: Option<String>,
    pub campaign_id: Uuid,
    pub source: DonationSource,
    pub notes: Option<String>,
    pub recorded_by: Uuid,
    /// Defaults to now when None
    pub donated_at: Option<DateTime<Utc>>,
}

impl Donation {
    /// Inserts a donation and returns it with the recording user
    pub async fn create<'e, E>(executor: E, data: CreateDonation) -> Result<DonationView, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO donations (amount, donor_name, donor_email, campaign_id, source,
                                       notes, recorded_by, donated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, NOW()))
                RETURNING id, amount, donor_name, donor_email, campaign_id, source, notes,
                          recorded_by, donated_at, created_at
            )
            SELECT i.id, i.amount, i.donor_name, i.donor_email, i.campaign_id, i.source, i.notes,
                   i.recorded_by, i.donated_at, i.created_at, {} AS recorder
            FROM inserted i
            JOIN users u ON u.id = i.recorded_by
            "#,
            summary_json("u")
        );

        sqlx::query_as::<_, DonationView>(&sql)
            .bind(data.amount)
            .bind(data.donor_name)
            .bind(data.donor_email)
            .bind(data.campaign_id)
            .bind(data.source)
            .bind(data.notes)
            .bind(data.recorded_by)
            .bind(data.donated_at)
            .fetch_one(executor)
            .await
    }

    /// Donations to a campaign, most recent gift first
    pub async fn list_for_campaign<'e, E>(
        executor: E,
        campaign_id: Uuid,
    ) -> Result<Vec<DonationView>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"
            SELECT d.id, d.amount, d.donor_name, d.donor_email, d.campaign_id, d.source, d.notes,
                   d.recorded_by, d.donated_at, d.created_at, {} AS recorder
            FROM donations d
            JOIN users u ON u.id = d.recorded_by
            WHERE d.campaign_id = $1
            ORDER BY d.donated_at DESC, d.created_at DESC, d.id DESC
            "#,
            summary_json("u")
        );

        sqlx::query_as::<_, DonationView>(&sql)
            .bind(campaign_id)
            .fetch_all(executor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serde() {
        assert_eq!(DonationSource::default(), DonationSource::Manual);
        let source: DonationSource = serde_json::from_str("\"CHECK\"").unwrap();
        assert_eq!(source, DonationSource::Check);
    }
}
