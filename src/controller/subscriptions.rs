use actix_web::dev::HttpServiceFactory;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

use serde::Deserialize;

use serde_json::json;

use sqlx::PgPool;

use uuid::Uuid;

use crate::domain::Price;
use crate::error::{RestError, RestResult};
use crate::model::{NewSubscription, SubscriptionPatch, TotalFilter};
use crate::repo::SubscriptionRepo;

/// Form deserialization wrapper for parsing new subscriptions
#[derive(Debug, Deserialize)]
pub struct SubscriptionForm {
    id: Option<Uuid>,
    service_name: String,
    price: i32,
    user_id: String,
    start_date: String,
    end_date: Option<String>,
}

impl TryInto<NewSubscription> for SubscriptionForm {
    type Error = String;

    fn try_into(self) -> Result<NewSubscription, Self::Error> {
        let service_name = self.service_name.parse()?;
        let price = Price::try_from(self.price)?;
        let user_id = parse_user_id(&self.user_id)?;
        let start_date = self.start_date.parse()?;
        let end_date = self
            .end_date
            .filter(|date| !date.is_empty())
            .map(|date| date.parse())
            .transpose()?;

        Ok(NewSubscription {
            id: self.id,
            service_name,
            price,
            user_id,
            start_date,
            end_date,
        })
    }
}

/// Form deserialization wrapper for partial updates. An absent field keeps
/// the stored value; a present field must parse.
#[derive(Debug, Deserialize)]
pub struct SubscriptionPatchForm {
    service_name: Option<String>,
    price: Option<i32>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl TryInto<SubscriptionPatch> for SubscriptionPatchForm {
    type Error = String;

    fn try_into(self) -> Result<SubscriptionPatch, Self::Error> {
        let service_name = self.service_name.map(|name| name.parse()).transpose()?;
        let price = self.price.map(Price::try_from).transpose()?;
        let start_date = self.start_date.map(|date| date.parse()).transpose()?;
        let end_date = self.end_date.map(|date| date.parse()).transpose()?;

        Ok(SubscriptionPatch {
            service_name,
            price,
            start_date,
            end_date,
        })
    }
}

/// Query parameters for listing a user's subscriptions
#[derive(Debug, Deserialize)]
pub struct ListParams {
    user_id: String,
}

/// Query parameters for the aggregate spend endpoint. Every parameter is
/// optional; an empty string reads the same as an absent parameter.
#[derive(Debug, Deserialize)]
pub struct TotalParams {
    user_id: Option<String>,
    service_name: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

impl TryInto<TotalFilter> for TotalParams {
    type Error = String;

    fn try_into(self) -> Result<TotalFilter, Self::Error> {
        let user_id = self
            .user_id
            .filter(|value| !value.is_empty())
            .map(|value| parse_user_id(&value))
            .transpose()?;
        let service_name = self.service_name.filter(|name| !name.is_empty());
        let from = self
            .from
            .filter(|date| !date.is_empty())
            .map(|date| date.parse())
            .transpose()
            .map_err(|_| "Invalid 'from' date".to_string())?;
        let to = self
            .to
            .filter(|date| !date.is_empty())
            .map(|date| date.parse())
            .transpose()
            .map_err(|_| "Invalid 'to' date".to_string())?;

        Ok(TotalFilter::new(user_id, service_name, from, to))
    }
}

/// Create endpoint for new subscriptions
#[tracing::instrument(name = "Create a new subscription", skip(pool))]
#[post("")]
async fn create(
    pool: web::Data<PgPool>,
    form: web::Json<SubscriptionForm>,
) -> RestResult<impl Responder> {
    let new_subscription: NewSubscription = form
        .into_inner()
        .try_into()
        .map_err(RestError::ParseError)?;
    let subscription = new_subscription
        .into_record()
        .map_err(RestError::ParseError)?;

    SubscriptionRepo::insert(pool.get_ref(), &subscription).await?;

    Ok(HttpResponse::Created().json(subscription))
}

/// List endpoint for all of a user's subscriptions
#[tracing::instrument(name = "List subscriptions for a user", skip(pool))]
#[get("")]
async fn list(
    pool: web::Data<PgPool>,
    params: web::Query<ListParams>,
) -> RestResult<impl Responder> {
    let user_id = parse_user_id(&params.user_id).map_err(RestError::ParseError)?;

    let subscriptions = SubscriptionRepo::list_by_user(pool.get_ref(), user_id).await?;

    Ok(HttpResponse::Ok().json(subscriptions))
}

/// Aggregate spend endpoint
#[tracing::instrument(name = "Calculate subscription total", skip(pool))]
#[get("/total")]
async fn total(
    pool: web::Data<PgPool>,
    params: web::Query<TotalParams>,
) -> RestResult<impl Responder> {
    let filter: TotalFilter = params
        .into_inner()
        .try_into()
        .map_err(RestError::ParseError)?;

    let total = SubscriptionRepo::total(pool.get_ref(), &filter).await?;

    Ok(HttpResponse::Ok().json(json!({ "total": total })))
}

/// Fetch endpoint for a single subscription
#[tracing::instrument(name = "Fetch a subscription by id", skip(pool))]
#[get("/{id}")]
async fn get_by_id(
    pool: web::Data<PgPool>,
    path: web::Path<(String,)>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();
    let id = parse_id(&id)?;

    let subscription = SubscriptionRepo::fetch_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| RestError::NotFound("Subscription not found".into()))?;

    Ok(HttpResponse::Ok().json(subscription))
}

/// Update endpoint applying a partial update to an existing subscription
#[tracing::instrument(name = "Update a subscription", skip(pool))]
#[put("/{id}")]
async fn update(
    pool: web::Data<PgPool>,
    path: web::Path<(String,)>,
    form: web::Json<SubscriptionPatchForm>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();
    let id = parse_id(&id)?;
    let patch: SubscriptionPatch = form
        .into_inner()
        .try_into()
        .map_err(RestError::ParseError)?;

    let subscription = SubscriptionRepo::fetch_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| RestError::NotFound("Subscription not found".into()))?;
    let subscription = subscription.merge(patch).map_err(RestError::ParseError)?;

    SubscriptionRepo::update(pool.get_ref(), &subscription).await?;

    Ok(HttpResponse::Ok().json(subscription))
}

/// Delete endpoint for a single subscription
#[tracing::instrument(name = "Delete a subscription", skip(pool))]
#[delete("/{id}")]
async fn remove(
    pool: web::Data<PgPool>,
    path: web::Path<(String,)>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();
    let id = parse_id(&id)?;

    let deleted = SubscriptionRepo::delete(pool.get_ref(), id).await?;
    if deleted == 0 {
        return Err(RestError::NotFound("Subscription not found".into()));
    }

    Ok(HttpResponse::NoContent())
}

/// Path ids are parsed by hand so a malformed id reads as a bad request
/// rather than an unmatched route.
fn parse_id(value: &str) -> RestResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RestError::ParseError(format!("Invalid subscription id '{}'", value)))
}

fn parse_user_id(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value).map_err(|_| format!("Invalid user_id '{}', expected a UUID", value))
}

/// Subscriptions API endpoints
pub fn scope() -> impl HttpServiceFactory {
    // `total` must register ahead of the `{id}` routes so it is not
    // captured as a path parameter
    web::scope("/subscriptions")
        .service(create)
        .service(list)
        .service(total)
        .service(get_by_id)
        .service(update)
        .service(remove)
}
