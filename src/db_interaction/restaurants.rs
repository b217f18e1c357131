use anyhow::Context;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};

use crate::{
    models::{NewRestaurant, Restaurant, RestaurantChanges, RestaurantStatus},
    schema::restaurants,
    telemetry::spawn_blocking_with_tracing,
    utils::DbConnection,
};

// Public listing only ever shows approved restaurants.
#[tracing::instrument("Listing active restaurants", skip_all)]
pub async fn list_active_restaurants(
    mut conn: DbConnection,
) -> Result<Vec<Restaurant>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        restaurants::table
            .filter(restaurants::status.eq(RestaurantStatus::Active))
            .order(restaurants::created_at.desc())
            .load::<Restaurant>(&mut conn)
            .context("Failed to load active restaurants")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Getting restaurant by id", skip(conn))]
pub async fn get_restaurant_by_id(
    mut conn: DbConnection,
    restaurant_id: i32,
) -> Result<Option<Restaurant>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        restaurants::table
            .find(restaurant_id)
            .first::<Restaurant>(&mut conn)
            .optional()
            .context("Failed to query restaurant by id")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Inserting restaurant", skip_all)]
pub async fn insert_restaurant(
    mut conn: DbConnection,
    new_restaurant: NewRestaurant,
) -> Result<Restaurant, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        diesel::insert_into(restaurants::table)
            .values(new_restaurant)
            .get_result::<Restaurant>(&mut conn)
            .context("Failed to insert restaurant")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

// Partial update; absent fields keep their stored values. Returns None when
// the restaurant does not exist.
#[tracing::instrument("Updating restaurant", skip(conn, changes))]
pub async fn update_restaurant(
    mut conn: DbConnection,
    restaurant_id: i32,
    changes: RestaurantChanges,
) -> Result<Option<Restaurant>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        diesel::update(restaurants::table.find(restaurant_id))
            .set((&changes, restaurants::updated_at.eq(diesel::dsl::now)))
            .get_result::<Restaurant>(&mut conn)
            .optional()
            .context("Failed to update restaurant")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Updating restaurant status", skip(conn))]
pub async fn update_restaurant_status(
    mut conn: DbConnection,
    restaurant_id: i32,
    status: RestaurantStatus,
) -> Result<Option<Restaurant>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        diesel::update(restaurants::table.find(restaurant_id))
            .set((
                restaurants::status.eq(status),
                restaurants::updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<Restaurant>(&mut conn)
            .optional()
            .context("Failed to update restaurant status")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Deleting restaurant", skip(conn))]
pub async fn delete_restaurant(
    mut conn: DbConnection,
    restaurant_id: i32,
) -> Result<bool, anyhow::Error> {
    let affected = spawn_blocking_with_tracing(move || {
        diesel::delete(restaurants::table.find(restaurant_id))
            .execute(&mut conn)
            .context("Failed to delete restaurant")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(affected > 0)
}
