/// Fundraising ledger
///
/// Campaign goals and donations arrive in decimal currency units and are
/// stored in integer cents (see [`crate::money`]). Recording a donation
/// inserts the donation, adds its cents to the campaign total with a relative
/// `UPDATE`, and appends the activity, all in one transaction. The total is
/// never read into the application and written back.
///
/// # Example
///
/// ```no_run
/// use rust_decimal::Decimal;
/// use teamhub_shared::auth::middleware::AuthContext;
/// use teamhub_shared::models::user::UserRole;
/// use teamhub_shared::services::ledger::{create_campaign, record_donation, NewCampaign, NewDonation};
/// use uuid::Uuid;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let actor = AuthContext::new(Uuid::new_v4(), UserRole::Coordinator);
///
/// let campaign = create_campaign(&pool, &actor, NewCampaign {
///     name: Some("Spring Drive".to_string()),
///     goal_amount: Some(Decimal::new(500000, 2)),
///     start_date: chrono::NaiveDate::from_ymd_opt(2026, 3, 1),
///     ..NewCampaign::default()
/// }).await?;
///
/// record_donation(&pool, &actor, campaign.view.campaign.id, NewDonation {
///     amount: Some(Decimal::new(2550, 2)),
///     donor_name: Some("A. Lee".to_string()),
///     ..NewDonation::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{optional_text, reference_error, required_text};
use crate::auth::middleware::AuthContext;
use crate::error::{ServiceError, ServiceResult};
use crate::models::activity::{Activity, ActivityType, NewActivity};
use crate::models::campaign::{Campaign, CampaignView, CreateCampaign};
use crate::models::donation::{CreateDonation, Donation, DonationSource, DonationView};
use crate::money::{format_cents, to_cents};

#[derive(Debug, Clone, Default)]
pub struct NewCampaign {
    pub name: Option<String>,
    pub description: Option<String>,
    pub goal_amount: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct NewDonation {
    pub amount: Option<Decimal>,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub source: Option<DonationSource>,
    pub notes: Option<String>,
    pub donated_at: Option<DateTime<Utc>>,
}

/// Campaign summary with derived progress
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    #[serde(flatten)]
    pub view: CampaignView,

    pub progress_percent: u8,
}

impl From<CampaignView> for CampaignSummary {
    fn from(view: CampaignView) -> Self {
        let progress_percent = view.campaign.progress_percent();
        Self {
            view,
            progress_percent,
        }
    }
}

/// Campaign with its full donation history, most recent gift first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub summary: CampaignSummary,

    pub donations: Vec<DonationView>,
}

/// Creates a campaign with a zero total and logs CAMPAIGN_CREATED
///
/// # Errors
///
/// `Validation` if the name, goal or start date is missing, the goal is not
/// positive, or the end date precedes the start date
pub async fn create_campaign(
    pool: &PgPool,
    actor: &AuthContext,
    input: NewCampaign,
) -> ServiceResult<CampaignSummary> {
    let name = required_text(input.name, "name", "Name")?;
    let goal = input
        .goal_amount
        .ok_or_else(|| ServiceError::validation("goalAmount", "Goal amount is required"))?;
    let goal_amount = to_cents(goal)
        .map_err(|e| ServiceError::validation("goalAmount", e.to_string()))?;
    let start_date = input
        .start_date
        .ok_or_else(|| ServiceError::validation("startDate", "Start date is required"))?;

    if let Some(end_date) = input.end_date {
        if end_date < start_date {
            return Err(ServiceError::validation(
                "endDate",
                "End date must not be before the start date",
            ));
        }
    }

    let mut tx = pool.begin().await?;

    let campaign = Campaign::create(
        &mut *tx,
        CreateCampaign {
            name,
            description: optional_text(input.description),
            goal_amount,
            start_date,
            end_date: input.end_date,
            created_by: actor.user_id,
        },
    )
    .await
    .map_err(reference_error)?;

    Activity::append(
        &mut *tx,
        NewActivity::new(
            ActivityType::CampaignCreated,
            actor.user_id,
            format!(
                "Created campaign \"{}\" with a goal of {}",
                campaign.name,
                format_cents(campaign.goal_amount)
            ),
        )
        .metadata(json!({
            "campaignId": campaign.id,
            "goalAmount": campaign.goal_amount,
        })),
    )
    .await?;

    let view = Campaign::find_view(&mut *tx, campaign.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Campaign"))?;

    tx.commit().await?;

    info!(campaign_id = %campaign.id, goal_cents = campaign.goal_amount, "Campaign created");
    Ok(view.into())
}

/// Records a donation and adds it to the campaign total
///
/// The donation insert, the total increment and the DONATION_RECORDED
/// activity commit together or not at all. Concurrent donations to one
/// campaign queue on the campaign row lock taken by the increment.
///
/// # Errors
///
/// - `Validation` if the amount or donor name is missing, the amount
///   rounds to zero cents or less, or it exceeds `MAX_AMOUNT_CENTS`
/// - `NotFound` if the campaign does not exist
pub async fn record_donation(
    pool: &PgPool,
    actor: &AuthContext,
    campaign_id: Uuid,
    input: NewDonation,
) -> ServiceResult<DonationView> {
    let amount = input
        .amount
        .ok_or_else(|| ServiceError::validation("amount", "Amount is required"))?;
    let cents = to_cents(amount)?;
    let donor_name = required_text(input.donor_name, "donorName", "Donor name")?;

    let mut tx = pool.begin().await?;

    let campaign = Campaign::add_to_total(&mut *tx, campaign_id, cents)
        .await
        .map_err(total_overflow_error)?
        .ok_or_else(|| ServiceError::not_found("Campaign"))?;

    let donation = Donation::create(
        &mut *tx,
        CreateDonation {
            amount: cents,
            donor_name,
            donor_email: optional_text(input.donor_email),
            campaign_id,
            source: input.source.unwrap_or_default(),
            notes: optional_text(input.notes),
            recorded_by: actor.user_id,
            donated_at: input.donated_at,
        },
    )
    .await
    .map_err(reference_error)?;

    Activity::append(
        &mut *tx,
        NewActivity::new(
            ActivityType::DonationRecorded,
            actor.user_id,
            format!(
                "Recorded {} donation from {} to \"{}\"",
                format_cents(cents),
                donation.donation.donor_name,
                campaign.name
            ),
        )
        .metadata(json!({
            "campaignId": campaign.id,
            "donationId": donation.donation.id,
            "amount": cents,
        })),
    )
    .await?;

    tx.commit().await?;

    info!(
        campaign_id = %campaign_id,
        donation_id = %donation.donation.id,
        amount_cents = cents,
        campaign_total_cents = campaign.current_amount,
        "Donation recorded"
    );
    Ok(donation)
}

/// Reports a campaign total pushed past `BIGINT` as an amount error
fn total_overflow_error(err: sqlx::Error) -> ServiceError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("22003") {
            return ServiceError::validation("amount", "Amount would overflow the campaign total");
        }
    }

    ServiceError::Database(err)
}

/// Loads a campaign with its donations
pub async fn get_campaign(pool: &PgPool, campaign_id: Uuid) -> ServiceResult<CampaignDetail> {
    let view = Campaign::find_view(pool, campaign_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Campaign"))?;
    let donations = Donation::list_for_campaign(pool, campaign_id).await?;

    Ok(CampaignDetail {
        summary: view.into(),
        donations,
    })
}

/// All campaigns with donation counts, newest first
pub async fn list_campaigns(pool: &PgPool) -> ServiceResult<Vec<CampaignSummary>> {
    let views = Campaign::list(pool).await?;
    Ok(views.into_iter().map(CampaignSummary::from).collect())
}
