use actix_web::{
    error::{ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};

use crate::{
    db_interaction::menu_items::{get_menu_item_by_id, list_categories, list_menu_items},
    utils::{get_pooled_connection, DbPool},
};

#[tracing::instrument("Listing menu items", skip_all)]
pub async fn get_menu(pool: web::Data<DbPool>) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let items = list_menu_items(conn)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(items))
}

#[tracing::instrument("Listing menu categories", skip_all)]
pub async fn get_categories(pool: web::Data<DbPool>) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let categories = list_categories(conn)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(categories))
}

#[tracing::instrument("Getting menu item", skip(pool))]
pub async fn get_menu_item(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, actix_web::Error> {
    let item_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let item = get_menu_item_by_id(conn, item_id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Menu item not found"))?;

    Ok(HttpResponse::Ok().json(item))
}
