/// API route handlers
///
/// Handlers are thin: they deserialize the request, run `validator` rules on
/// the body, call one core service and shape the response. All business
/// rules live in `teamhub_shared::services`.
///
/// - `health`: Liveness and database connectivity
/// - `tasks`: Tasks and their comment threads
/// - `campaigns`: Fundraising campaigns and donations
/// - `teams`: Teams and membership
/// - `files`: File metadata
/// - `activities`: Recent activity feed
/// - `dashboard`: Task counters

pub mod activities;
pub mod campaigns;
pub mod dashboard;
pub mod files;
pub mod health;
pub mod tasks;
pub mod teams;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Body returned by delete endpoints
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Date field that also accepts a full RFC 3339 timestamp
///
/// Browsers tend to send `2026-03-01T00:00:00.000Z` where a plain
/// `2026-03-01` is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl DateInput {
    /// Calendar date in UTC
    pub fn date(self) -> NaiveDate {
        match self {
            DateInput::DateTime(at) => at.date_naive(),
            DateInput::Date(date) => date,
        }
    }

    /// Instant; a bare date means midnight UTC
    pub fn instant(self) -> DateTime<Utc> {
        match self {
            DateInput::DateTime(at) => at,
            DateInput::Date(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }
}

/// Distinguishes an explicit `null` from an absent field
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`: absent gives
/// `None`, `null` gives `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        note: Option<Option<String>>,
    }

    #[test]
    fn test_nullable() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.note, None);

        let cleared: Patch = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(cleared.note, Some(None));

        let set: Patch = serde_json::from_str(r#"{"note": "hi"}"#).unwrap();
        assert_eq!(set.note, Some(Some("hi".to_string())));
    }

    #[test]
    fn test_date_input() {
        let date: DateInput = serde_json::from_str(r#""2026-03-01""#).unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(date.instant().to_rfc3339(), "2026-03-01T00:00:00+00:00");

        let at: DateInput = serde_json::from_str(r#""2026-03-01T18:30:00.000Z""#).unwrap();
        assert_eq!(at.date(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(at.instant().to_rfc3339(), "2026-03-01T18:30:00+00:00");

        assert!(serde_json::from_str::<DateInput>(r#""March 1st""#).is_err());
    }

    #[test]
    fn test_success_response() {
        assert_eq!(
            serde_json::to_value(SuccessResponse::ok()).unwrap(),
            serde_json::json!({ "success": true })
        );
    }
}
