use anyhow::Context;
use bigdecimal::BigDecimal;
use diesel::dsl::sum;
use diesel::{Connection, ExpressionMethods, QueryDsl, RunQueryDsl};
use serde::Serialize;

use crate::{
    models::{DeliveryStatus, Order, Restaurant, User, UserView},
    schema::{deliveries, orders, restaurants, users},
    telemetry::spawn_blocking_with_tracing,
    utils::DbConnection,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_restaurants: i64,
    pub total_orders: i64,
    pub total_revenue: BigDecimal,
}

#[tracing::instrument("Computing dashboard statistics", skip_all)]
pub async fn dashboard_stats(mut conn: DbConnection) -> Result<DashboardStats, anyhow::Error> {
    let stats = spawn_blocking_with_tracing(move || {
        conn.transaction::<DashboardStats, anyhow::Error, _>(|conn| {
            let total_users: i64 = users::table
                .count()
                .get_result(conn)
                .context("Failed to count users")?;

            let total_restaurants: i64 = restaurants::table
                .count()
                .get_result(conn)
                .context("Failed to count restaurants")?;

            let total_orders: i64 = orders::table
                .count()
                .get_result(conn)
                .context("Failed to count orders")?;

            let total_revenue: Option<BigDecimal> = orders::table
                .select(sum(orders::total_amount))
                .get_result(conn)
                .context("Failed to sum order amounts")?;

            Ok(DashboardStats {
                total_users,
                total_restaurants,
                total_orders,
                total_revenue: total_revenue.unwrap_or_else(|| BigDecimal::from(0)),
            })
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(stats)
}

#[tracing::instrument("Listing users page", skip(conn))]
pub async fn list_users_page(
    mut conn: DbConnection,
    page: i64,
    limit: i64,
) -> Result<(Vec<UserView>, i64), anyhow::Error> {
    let offset_value = (page - 1) * limit;

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<(Vec<UserView>, i64), anyhow::Error, _>(|conn| {
            let rows = users::table
                .select((
                    users::id,
                    users::name,
                    users::email,
                    users::role,
                    users::phone,
                    users::address,
                    users::created_at,
                ))
                .order(users::created_at.desc())
                .limit(limit)
                .offset(offset_value)
                .load::<UserView>(conn)
                .context("Failed to load users page")?;

            let total: i64 = users::table
                .count()
                .get_result(conn)
                .context("Failed to count users")?;

            Ok((rows, total))
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[derive(Serialize)]
pub struct RestaurantWithOwner {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub owner: UserView,
}

#[tracing::instrument("Listing restaurants page", skip(conn))]
pub async fn list_restaurants_page(
    mut conn: DbConnection,
    page: i64,
    limit: i64,
) -> Result<(Vec<RestaurantWithOwner>, i64), anyhow::Error> {
    let offset_value = (page - 1) * limit;

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<(Vec<RestaurantWithOwner>, i64), anyhow::Error, _>(|conn| {
            let rows: Vec<(Restaurant, User)> = restaurants::table
                .inner_join(users::table)
                .order(restaurants::created_at.desc())
                .limit(limit)
                .offset(offset_value)
                .load(conn)
                .context("Failed to load restaurants page")?;

            let total: i64 = restaurants::table
                .count()
                .get_result(conn)
                .context("Failed to count restaurants")?;

            let rows = rows
                .into_iter()
                .map(|(restaurant, owner)| RestaurantWithOwner {
                    restaurant,
                    owner: owner.into(),
                })
                .collect();

            Ok((rows, total))
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[derive(Serialize)]
pub struct OrderWithParties {
    #[serde(flatten)]
    pub order: Order,
    pub customer: UserView,
    pub restaurant: Restaurant,
}

#[tracing::instrument("Listing orders page", skip(conn))]
pub async fn list_orders_page(
    mut conn: DbConnection,
    page: i64,
    limit: i64,
) -> Result<(Vec<OrderWithParties>, i64), anyhow::Error> {
    let offset_value = (page - 1) * limit;

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<(Vec<OrderWithParties>, i64), anyhow::Error, _>(|conn| {
            let rows: Vec<(Order, User, Restaurant)> = orders::table
                .inner_join(users::table)
                .inner_join(restaurants::table)
                .order(orders::created_at.desc())
                .limit(limit)
                .offset(offset_value)
                .load(conn)
                .context("Failed to load orders page")?;

            let total: i64 = orders::table
                .count()
                .get_result(conn)
                .context("Failed to count orders")?;

            let rows = rows
                .into_iter()
                .map(|(order, customer, restaurant)| OrderWithParties {
                    order,
                    customer: customer.into(),
                    restaurant,
                })
                .collect();

            Ok((rows, total))
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStats {
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
}

#[tracing::instrument("Computing delivery statistics", skip_all)]
pub async fn delivery_stats(mut conn: DbConnection) -> Result<DeliveryStats, anyhow::Error> {
    let stats = spawn_blocking_with_tracing(move || {
        conn.transaction::<DeliveryStats, anyhow::Error, _>(|conn| {
            let count_for = |conn: &mut DbConnection, status: DeliveryStatus| {
                deliveries::table
                    .filter(deliveries::status.eq(status))
                    .count()
                    .get_result::<i64>(conn)
                    .context("Failed to count deliveries")
            };

            Ok(DeliveryStats {
                pending: count_for(conn, DeliveryStatus::Pending)?,
                in_progress: count_for(conn, DeliveryStatus::PickedUp)?,
                completed: count_for(conn, DeliveryStatus::Delivered)?,
            })
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(stats)
}
