use actix_web::{
    error::{ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};

use crate::{
    db_interaction::{
        menu_items::list_menu_for_restaurant,
        restaurants::{get_restaurant_by_id, list_active_restaurants},
    },
    utils::{get_pooled_connection, DbPool},
};

// Public browse endpoint: only approved restaurants are listed.
#[tracing::instrument("Listing restaurants", skip_all)]
pub async fn list_restaurants(pool: web::Data<DbPool>) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let restaurants = list_active_restaurants(conn)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(restaurants))
}

#[tracing::instrument("Getting restaurant", skip(pool))]
pub async fn get_restaurant(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, actix_web::Error> {
    let restaurant_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let restaurant = get_restaurant_by_id(conn, restaurant_id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Restaurant not found"))?;

    Ok(HttpResponse::Ok().json(restaurant))
}

#[tracing::instrument("Listing restaurant menu", skip(pool))]
pub async fn get_restaurant_menu(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, actix_web::Error> {
    let restaurant_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    get_restaurant_by_id(conn, restaurant_id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Restaurant not found"))?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let menu = list_menu_for_restaurant(conn, restaurant_id)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(menu))
}
