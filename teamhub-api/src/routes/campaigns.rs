/// Fundraising endpoints
///
/// # Endpoints
///
/// - `GET /v1/campaigns` - List campaigns with progress
/// - `POST /v1/campaigns` - Create campaign
/// - `GET /v1/campaigns/:id` - Campaign with donations
/// - `POST /v1/campaigns/:id/donations` - Record donation
///
/// Amounts are decimal currency units on the wire (`25.5` or `"25.50"`) and
/// integer cents in responses.

use super::DateInput;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use teamhub_shared::{
    auth::middleware::AuthContext,
    models::donation::{DonationSource, DonationView},
    services::ledger::{self, CampaignDetail, CampaignSummary, NewCampaign, NewDonation},
};
use uuid::Uuid;
use validator::Validate;

/// Create campaign request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
    pub goal_amount: Option<Decimal>,
    pub start_date: Option<DateInput>,
    pub end_date: Option<DateInput>,
}

impl From<CreateCampaignRequest> for NewCampaign {
    fn from(req: CreateCampaignRequest) -> Self {
        NewCampaign {
            name: req.name,
            description: req.description,
            goal_amount: req.goal_amount,
            start_date: req.start_date.map(DateInput::date),
            end_date: req.end_date.map(DateInput::date),
        }
    }
}

/// Record donation request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordDonationRequest {
    pub amount: Option<Decimal>,

    #[validate(length(max = 255, message = "Donor name must be at most 255 characters"))]
    pub donor_name: Option<String>,

    #[validate(email(message = "Donor email is invalid"))]
    pub donor_email: Option<String>,

    pub source: Option<DonationSource>,

    #[validate(length(max = 5000, message = "Notes must be at most 5000 characters"))]
    pub notes: Option<String>,

    pub donated_at: Option<DateInput>,
}

impl RecordDonationRequest {
    /// Drops a blank donor email so it counts as absent rather than malformed
    fn without_blank_email(mut self) -> Self {
        self.donor_email = self.donor_email.filter(|email| !email.trim().is_empty());
        self
    }
}

impl From<RecordDonationRequest> for NewDonation {
    fn from(req: RecordDonationRequest) -> Self {
        NewDonation {
            amount: req.amount,
            donor_name: req.donor_name,
            donor_email: req.donor_email,
            source: req.source,
            notes: req.notes,
            donated_at: req.donated_at.map(DateInput::instant),
        }
    }
}

pub async fn list_campaigns(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CampaignSummary>>> {
    Ok(Json(ledger::list_campaigns(&state.db).await?))
}

/// Creates a campaign with a zero total
///
/// # Endpoint
///
/// ```text
/// POST /v1/campaigns
///
/// { "name": "Spring Drive", "goalAmount": 5000.00, "startDate": "2026-03-01" }
/// ```
pub async fn create_campaign(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCampaignRequest>,
) -> ApiResult<(StatusCode, Json<CampaignSummary>)> {
    req.validate()?;

    let campaign = ledger::create_campaign(&state.db, &auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CampaignDetail>> {
    Ok(Json(ledger::get_campaign(&state.db, id).await?))
}

/// Records a donation and adds it to the campaign total
///
/// # Errors
///
/// - `404 Not Found`: no such campaign
/// - `422 Unprocessable Entity`: missing donor, or an amount that is not
///   positive once rounded to cents
pub async fn record_donation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecordDonationRequest>,
) -> ApiResult<(StatusCode, Json<DonationView>)> {
    let req = req.without_blank_email();
    req.validate()?;

    let donation = ledger::record_donation(&state.db, &auth, id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(donation)))
}
