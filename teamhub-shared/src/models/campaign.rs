/// Fundraising campaigns
///
/// `goal_amount` and `current_amount` are integer cents. `current_amount` is
/// a running total maintained by [`Campaign::add_to_total`], which applies the
/// donation as a relative increment in SQL. Two concurrent donations never
/// read-modify-write the total in application code, so neither can be lost.
///
/// At every committed point `current_amount` equals the sum of the campaign's
/// donation amounts; [`Campaign::ledger_totals`] reads both for checking.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE campaigns (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL CHECK (length(name) > 0),
///     description TEXT,
///     goal_amount BIGINT NOT NULL CHECK (goal_amount > 0),
///     current_amount BIGINT NOT NULL DEFAULT 0 CHECK (current_amount >= 0),
///     status campaign_status NOT NULL DEFAULT 'ACTIVE',
///     start_date DATE NOT NULL,
///     end_date DATE,
///     created_by UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::user::{summary_json, UserSummary};
use crate::money::{self, Cents};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "campaign_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    #[default]
    Active,
    Paused,
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Active => "ACTIVE",
            CampaignStatus::Paused => "PAUSED",
            CampaignStatus::Completed => "COMPLETED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub goal_amount: Cents,
    pub current_amount: Cents,
    pub status: CampaignStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,

    #[serde(rename = "createdById")]
    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn progress_percent(&self) -> u8 {
        money::progress_percent(self.current_amount, self.goal_amount)
    }
}

/// Campaign with creator and donation count
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CampaignView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub campaign: Campaign,

    #[serde(rename = "createdBy")]
    pub creator: Json<UserSummary>,

    pub donation_count: i64,
}

#[derive(Debug, Clone)]
pub struct CreateCampaign {
    pub name: String,
    pub description: Option<String>,
    pub goal_amount: Cents,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_by: Uuid,
}

/// Stored running total next to the recomputed donation sum
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct LedgerTotals {
    pub current_amount: Cents,
    pub donation_sum: Cents,
    pub donation_count: i64,
}

impl LedgerTotals {
    pub fn is_consistent(&self) -> bool {
        self.current_amount == self.donation_sum
    }
}

const CAMPAIGN_VIEW_SELECT: &str = "SELECT c.id, c.name, c.description, c.goal_amount, c.current_amount, \
     c.status, c.start_date, c.end_date, c.created_by, c.created_at, c.updated_at";

impl Campaign {
    pub async fn create<'e, E>(executor: E, data: CreateCampaign) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Campaign>(
            r#"
            INSERT INTO campaigns (name, description, goal_amount, start_date, end_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, goal_amount, current_amount, status,
                      start_date, end_date, created_by, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.goal_amount)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.created_by)
        .fetch_one(executor)
        .await
    }

    /// Adds `delta` cents to the running total
    ///
    /// The increment happens in the UPDATE itself, so concurrent callers
    /// serialize on the row lock and each sees the other's committed total.
    /// Returns the updated campaign, or None if it doesn't exist.
    pub async fn add_to_total<'e, E>(
        executor: E,
        id: Uuid,
        delta: Cents,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Campaign>(
            r#"
            UPDATE campaigns
            SET current_amount = current_amount + $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, goal_amount, current_amount, status,
                      start_date, end_date, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_view<'e, E>(executor: E, id: Uuid) -> Result<Option<CampaignView>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"
            {}, {} AS creator,
                (SELECT COUNT(*) FROM donations d WHERE d.campaign_id = c.id) AS donation_count
            FROM campaigns c
            JOIN users u ON u.id = c.created_by
            WHERE c.id = $1
            "#,
            CAMPAIGN_VIEW_SELECT,
            summary_json("u")
        );

        sqlx::query_as::<_, CampaignView>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// All campaigns, newest first
    pub async fn list<'e, E>(executor: E) -> Result<Vec<CampaignView>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"
            {}, {} AS creator,
                (SELECT COUNT(*) FROM donations d WHERE d.campaign_id = c.id) AS donation_count
            FROM campaigns c
            JOIN users u ON u.id = c.created_by
            ORDER BY c.created_at DESC, c.id DESC
            "#,
            CAMPAIGN_VIEW_SELECT,
            summary_json("u")
        );

        sqlx::query_as::<_, CampaignView>(&sql).fetch_all(executor).await
    }

    /// Reads the stored total and the recomputed donation sum in one snapshot
    pub async fn ledger_totals<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<LedgerTotals>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, LedgerTotals>(
            r#"
            SELECT c.current_amount,
                   COALESCE(SUM(d.amount), 0)::BIGINT AS donation_sum,
                   COUNT(d.id) AS donation_count
            FROM campaigns c
            LEFT JOIN donations d ON d.campaign_id = c.id
            WHERE c.id = $1
            GROUP BY c.id
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(current: Cents, goal: Cents) -> Campaign {
        Campaign {
            id: Uuid::new_v4(),
            name: "Spring Drive".to_string(),
            description: None,
            goal_amount: goal,
            current_amount: current,
            status: CampaignStatus::Active,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(campaign(20000, 500000).progress_percent(), 4);
        assert_eq!(campaign(600000, 500000).progress_percent(), 100);
    }

    #[test]
    fn test_ledger_totals_consistency() {
        let ok = LedgerTotals {
            current_amount: 20000,
            donation_sum: 20000,
            donation_count: 4,
        };
        assert!(ok.is_consistent());

        let drifted = LedgerTotals {
            current_amount: 17450,
            ..ok
        };
        assert!(!drifted.is_consistent());
    }

    #[test]
    fn test_campaign_status_default() {
        assert_eq!(CampaignStatus::default(), CampaignStatus::Active);
        assert_eq!(CampaignStatus::Completed.as_str(), "COMPLETED");
    }
}
