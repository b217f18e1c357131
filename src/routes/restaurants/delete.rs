use actix_web::{
    error::{ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};
use serde_json::json;

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::restaurants::delete_restaurant,
    utils::{get_pooled_connection, DbPool},
};

// Removal cascades to the restaurant's menu items.
#[tracing::instrument("Deleting restaurant", skip(pool, user))]
pub async fn remove_restaurant(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::DeleteRestaurant)?;

    let restaurant_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let removed = delete_restaurant(conn, restaurant_id)
        .await
        .map_err(ErrorInternalServerError)?;

    if !removed {
        return Err(ErrorNotFound("Restaurant not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Restaurant deleted successfully" })))
}
