use uuid::Uuid;

use chrono::{DateTime, NaiveDate, Utc};

use serde::{Deserialize, Serialize};

use crate::domain::{Price, ServiceName, SubDate};

/// New subscription request, parsed and validated
#[derive(Debug)]
pub struct NewSubscription {
    /// Caller-supplied id; generated at materialization time when absent
    pub id: Option<Uuid>,
    pub service_name: ServiceName,
    pub price: Price,
    pub user_id: Uuid,
    pub start_date: SubDate,
    pub end_date: Option<SubDate>,
}

impl NewSubscription {
    /// Materialize the full record: assign an id when the caller did not
    /// supply one, stamp the creation time, and check the validity window.
    pub fn into_record(self) -> Result<Subscription, String> {
        let start_date = self.start_date.date();
        let end_date = self.end_date.map(|d| d.date());
        validate_window(start_date, end_date)?;

        Ok(Subscription {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            service_name: self.service_name.into(),
            price: self.price.into(),
            user_id: self.user_id,
            start_date,
            end_date,
            created_at: Utc::now(),
        })
    }
}

/// Stored subscription record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    /// ID of the subscription
    pub id: Uuid,
    /// User supplied data
    /// TODO: Should this be parsed back into domain objects?
    pub service_name: String,
    pub price: i32,
    /// Owner; immutable after creation
    pub user_id: Uuid,
    /// Validity window, day granularity. `end_date` absent means open-ended
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Creation timestamp, set once, never modified
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Merge a partial update: a present patch field replaces the stored
    /// value, an absent field retains it. `user_id` and `created_at` are
    /// never touched.
    pub fn merge(mut self, patch: SubscriptionPatch) -> Result<Self, String> {
        if let Some(service_name) = patch.service_name {
            self.service_name = service_name.into();
        }
        if let Some(price) = patch.price {
            self.price = price.into();
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date.date();
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = Some(end_date.date());
        }
        validate_window(self.start_date, self.end_date)?;
        Ok(self)
    }
}

/// Partial update of a subscription. Presence is tracked per field, so an
/// omitted field and a field set to a legitimate value are never confused.
#[derive(Debug, Default)]
pub struct SubscriptionPatch {
    pub service_name: Option<ServiceName>,
    pub price: Option<Price>,
    pub start_date: Option<SubDate>,
    pub end_date: Option<SubDate>,
}

/// Filters for the aggregate spend query. The date range is always fully
/// resolved: a missing lower bound opens the range to the calendar floor,
/// a missing upper bound closes it at today, so future-dated rows are only
/// included when the caller asks for them explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl TotalFilter {
    pub fn new(
        user_id: Option<Uuid>,
        service_name: Option<String>,
        from: Option<SubDate>,
        to: Option<SubDate>,
    ) -> Self {
        let from = from.map(|d| d.date()).unwrap_or_else(calendar_floor);
        let to = to
            .map(|d| d.date())
            .unwrap_or_else(|| Utc::now().date_naive());

        Self {
            user_id,
            service_name,
            from,
            to,
        }
    }
}

/// The lower bound used when `from` is omitted. Postgres rejects dates
/// before 4713 BC, so year 1 stands in for "unbounded below".
fn calendar_floor() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).expect("year 1 is a valid date")
}

fn validate_window(start_date: NaiveDate, end_date: Option<NaiveDate>) -> Result<(), String> {
    match end_date {
        Some(end) if end < start_date => Err("end_date cannot precede start_date".into()),
        _ => Ok(()),
    }
}
