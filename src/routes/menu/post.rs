use actix_web::{
    error::{ErrorForbidden, ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};
use bigdecimal::BigDecimal;
use serde::Deserialize;

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::{menu_items::insert_menu_item, restaurants::get_restaurant_by_id},
    models::{NewMenuItem, UserRole},
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct CreateMenuItemForm {
    pub restaurant_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

#[tracing::instrument("Creating menu item", skip(pool, user, form))]
pub async fn create_menu_item(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    form: web::Json<CreateMenuItemForm>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::ManageMenu)?;

    let form = form.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let restaurant = get_restaurant_by_id(conn, form.restaurant_id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Restaurant not found"))?;

    if user.role == UserRole::RestaurantOwner && restaurant.owner_id != user.id {
        return Err(ErrorForbidden("Access denied"));
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let new_item = NewMenuItem {
        restaurant_id: form.restaurant_id,
        name: form.name,
        description: form.description,
        price: form.price,
        category: form.category,
        image_url: form.image_url,
        is_available: form.is_available.unwrap_or(true),
    };

    let item = insert_menu_item(conn, new_item)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Created().json(item))
}
