use anyhow::Context;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};

use crate::{
    models::{MenuItem, MenuItemChanges, NewMenuItem},
    schema::menu_items,
    telemetry::spawn_blocking_with_tracing,
    utils::DbConnection,
};

#[tracing::instrument("Listing all menu items", skip_all)]
pub async fn list_menu_items(mut conn: DbConnection) -> Result<Vec<MenuItem>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        menu_items::table
            .order(menu_items::id.asc())
            .load::<MenuItem>(&mut conn)
            .context("Failed to load menu items")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Listing menu for restaurant", skip(conn))]
pub async fn list_menu_for_restaurant(
    mut conn: DbConnection,
    restaurant_id: i32,
) -> Result<Vec<MenuItem>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        menu_items::table
            .filter(menu_items::restaurant_id.eq(restaurant_id))
            .order(menu_items::id.asc())
            .load::<MenuItem>(&mut conn)
            .context("Failed to load restaurant menu")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Getting menu item by id", skip(conn))]
pub async fn get_menu_item_by_id(
    mut conn: DbConnection,
    item_id: i32,
) -> Result<Option<MenuItem>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        menu_items::table
            .find(item_id)
            .first::<MenuItem>(&mut conn)
            .optional()
            .context("Failed to query menu item by id")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Inserting menu item", skip_all)]
pub async fn insert_menu_item(
    mut conn: DbConnection,
    new_item: NewMenuItem,
) -> Result<MenuItem, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        diesel::insert_into(menu_items::table)
            .values(new_item)
            .get_result::<MenuItem>(&mut conn)
            .context("Failed to insert menu item")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Updating menu item", skip(conn, changes))]
pub async fn update_menu_item(
    mut conn: DbConnection,
    item_id: i32,
    changes: MenuItemChanges,
) -> Result<Option<MenuItem>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        diesel::update(menu_items::table.find(item_id))
            .set((&changes, menu_items::updated_at.eq(diesel::dsl::now)))
            .get_result::<MenuItem>(&mut conn)
            .optional()
            .context("Failed to update menu item")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Deleting menu item", skip(conn))]
pub async fn delete_menu_item(
    mut conn: DbConnection,
    item_id: i32,
) -> Result<bool, anyhow::Error> {
    let affected = spawn_blocking_with_tracing(move || {
        diesel::delete(menu_items::table.find(item_id))
            .execute(&mut conn)
            .context("Failed to delete menu item")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(affected > 0)
}

// Distinct non-null categories across every restaurant's menu.
#[tracing::instrument("Listing menu categories", skip_all)]
pub async fn list_categories(mut conn: DbConnection) -> Result<Vec<String>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        menu_items::table
            .select(menu_items::category)
            .filter(menu_items::category.is_not_null())
            .distinct()
            .load::<Option<String>>(&mut conn)
            .context("Failed to load menu categories")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res.into_iter().flatten().collect())
}
