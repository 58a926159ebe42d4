use uuid::Uuid;

use sqlx::{PgExecutor, Postgres, QueryBuilder};

use crate::model::{Subscription, TotalFilter};

/// Repository for interfacing with the subscriptions table
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    #[tracing::instrument(name = "Insert subscription", skip(executor))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        subscription: &Subscription,
    ) -> sqlx::Result<()> {
        sqlx::query(
            "insert into subscriptions(id, service_name, price, user_id, start_date, end_date, created_at) \
             values ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(subscription.id)
        .bind(&subscription.service_name)
        .bind(subscription.price)
        .bind(subscription.user_id)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Fetch a subscription by id. Absence is `None`, not an error.
    #[tracing::instrument(name = "Fetch subscription by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<Option<Subscription>> {
        sqlx::query_as::<_, Subscription>(
            "select id, service_name, price, user_id, start_date, end_date, created_at \
             from subscriptions where id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Overwrite the mutable columns of an existing record. Does not check
    /// that the row exists; callers confirm existence first.
    #[tracing::instrument(name = "Update subscription", skip(executor))]
    pub async fn update<'con>(
        executor: impl PgExecutor<'con>,
        subscription: &Subscription,
    ) -> sqlx::Result<()> {
        sqlx::query(
            "update subscriptions set service_name = $1, price = $2, start_date = $3, end_date = $4 \
             where id = $5",
        )
        .bind(&subscription.service_name)
        .bind(subscription.price)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.id)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Delete a subscription by id, returning the number of rows removed.
    #[tracing::instrument(name = "Delete subscription", skip(executor))]
    pub async fn delete<'con>(executor: impl PgExecutor<'con>, id: Uuid) -> sqlx::Result<u64> {
        let result = sqlx::query("delete from subscriptions where id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "List subscriptions by user", skip(executor))]
    pub async fn list_by_user<'con>(
        executor: impl PgExecutor<'con>,
        user_id: Uuid,
    ) -> sqlx::Result<Vec<Subscription>> {
        sqlx::query_as::<_, Subscription>(
            "select id, service_name, price, user_id, start_date, end_date, created_at \
             from subscriptions where user_id = $1",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// Sum of `price` over rows matching the filter, `0` when none match.
    #[tracing::instrument(name = "Total subscription spend", skip(executor))]
    pub async fn total<'con>(
        executor: impl PgExecutor<'con>,
        filter: &TotalFilter,
    ) -> sqlx::Result<i64> {
        let mut query = total_query(filter);

        let total: i64 = query.build_query_scalar().fetch_one(executor).await?;
        Ok(total)
    }
}

/// Build the aggregate statement. Optional predicates are appended in a
/// fixed order (user id, then service name), so the same filter combination
/// always produces the same statement shape.
fn total_query(filter: &TotalFilter) -> QueryBuilder<'_, Postgres> {
    let mut query = QueryBuilder::new(
        "select coalesce(sum(price), 0) from subscriptions where start_date >= ",
    );
    query.push_bind(filter.from);
    query.push(" and start_date <= ");
    query.push_bind(filter.to);

    if let Some(user_id) = filter.user_id {
        query.push(" and user_id = ");
        query.push_bind(user_id);
    }
    if let Some(service_name) = filter.service_name.as_deref() {
        query.push(" and service_name = ");
        query.push_bind(service_name);
    }

    query
}
