use actix_web::{
    error::{ErrorForbidden, ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::restaurants::{get_restaurant_by_id, update_restaurant},
    models::{RestaurantChanges, UserRole},
    utils::{get_pooled_connection, DbPool},
};

// Admins may edit any restaurant; owners only their own.
#[tracing::instrument("Updating restaurant", skip(pool, user, changes))]
pub async fn put_restaurant(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    changes: web::Json<RestaurantChanges>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::UpdateRestaurant)?;

    let restaurant_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let restaurant = get_restaurant_by_id(conn, restaurant_id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Restaurant not found"))?;

    if user.role == UserRole::RestaurantOwner && restaurant.owner_id != user.id {
        return Err(ErrorForbidden("Access denied"));
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let updated = update_restaurant(conn, restaurant_id, changes.into_inner())
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Restaurant not found"))?;

    Ok(HttpResponse::Ok().json(updated))
}
