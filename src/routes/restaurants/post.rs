use actix_web::{error::ErrorInternalServerError, web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::Deserialize;

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::restaurants::insert_restaurant,
    models::{NewRestaurant, RestaurantStatus},
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct CreateRestaurantForm {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub opening_hours: Option<String>,
    pub delivery_fee: Option<BigDecimal>,
    pub minimum_order: Option<BigDecimal>,
    pub owner_id: Option<i32>,
}

// New restaurants start as pending and only show up in the public listing
// once an admin activates them.
#[tracing::instrument("Creating restaurant", skip(pool, user, form))]
pub async fn create_restaurant(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    form: web::Json<CreateRestaurantForm>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::CreateRestaurant)?;

    let form = form.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let new_restaurant = NewRestaurant {
        owner_id: form.owner_id.unwrap_or(user.id),
        name: form.name,
        description: form.description,
        address: form.address,
        phone: form.phone,
        email: form.email,
        image_url: form.image_url,
        status: RestaurantStatus::Pending,
        opening_hours: form.opening_hours,
        delivery_fee: form.delivery_fee.unwrap_or_else(|| BigDecimal::from(0)),
        minimum_order: form.minimum_order.unwrap_or_else(|| BigDecimal::from(0)),
    };

    let restaurant = insert_restaurant(conn, new_restaurant)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Created().json(restaurant))
}
