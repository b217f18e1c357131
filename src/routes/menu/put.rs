use actix_web::{
    error::{ErrorForbidden, ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::{
        menu_items::{get_menu_item_by_id, update_menu_item},
        restaurants::get_restaurant_by_id,
    },
    models::{MenuItemChanges, UserRole},
    utils::{get_pooled_connection, DbPool},
};

#[tracing::instrument("Updating menu item", skip(pool, user, changes))]
pub async fn put_menu_item(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    changes: web::Json<MenuItemChanges>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::ManageMenu)?;

    let item_id = path.into_inner();

    ensure_caller_manages_item(&pool, &user, item_id).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let updated = update_menu_item(conn, item_id, changes.into_inner())
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Menu item not found"))?;

    Ok(HttpResponse::Ok().json(updated))
}

// Owners may touch a menu item only when the parent restaurant is theirs.
pub(super) async fn ensure_caller_manages_item(
    pool: &actix_web::web::Data<DbPool>,
    user: &AuthenticatedUser,
    item_id: i32,
) -> Result<(), actix_web::Error> {
    let conn = get_pooled_connection(pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let item = get_menu_item_by_id(conn, item_id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Menu item not found"))?;

    if user.role == UserRole::RestaurantOwner {
        let conn = get_pooled_connection(pool)
            .await
            .map_err(ErrorInternalServerError)?;

        let restaurant = get_restaurant_by_id(conn, item.restaurant_id)
            .await
            .map_err(ErrorInternalServerError)?
            .ok_or_else(|| ErrorNotFound("Restaurant not found"))?;

        if restaurant.owner_id != user.id {
            return Err(ErrorForbidden("Access denied"));
        }
    }

    Ok(())
}
