use actix_web::{
    error::{ErrorBadRequest, ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::{admin::list_restaurants_page, restaurants::update_restaurant_status},
    models::RestaurantStatus,
    utils::{get_pooled_connection, DbPool},
};

use super::{PageQuery, Pagination};

#[tracing::instrument("Listing restaurants for admin", skip(pool, user))]
pub async fn admin_restaurants(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::ViewAdminPanel)?;

    let (page, limit) = query.sanitized();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let (restaurants, total) = list_restaurants_page(conn, page, limit)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(json!({
        "restaurants": restaurants,
        "pagination": Pagination::new(total, page, limit),
    })))
}

#[derive(Deserialize, Debug)]
pub struct RestaurantStatusForm {
    pub status: String,
}

// Approval switch: pending restaurants go active here, and active ones can be
// suspended or retired.
#[tracing::instrument("Updating restaurant status", skip(pool, user, form))]
pub async fn admin_restaurant_status(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    form: web::Json<RestaurantStatusForm>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::ViewAdminPanel)?;

    let restaurant_id = path.into_inner();
    let status: RestaurantStatus = form.into_inner().status.parse().map_err(ErrorBadRequest)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let restaurant = update_restaurant_status(conn, restaurant_id, status)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Restaurant not found"))?;

    Ok(HttpResponse::Ok().json(restaurant))
}
