use actix_web::{
    error::{ErrorBadRequest, ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};
use serde::Deserialize;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::{
        orders::{create_order, CreateOrderError, OrderLine},
        users::get_user_by_id,
    },
    domain::user_email::UserEmail,
    email_client::EmailClient,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct OrderLineForm {
    pub menu_item_id: i32,
    pub quantity: i32,
}

#[derive(Deserialize, Debug)]
pub struct CreateOrderForm {
    pub restaurant_id: i32,
    pub items: Vec<OrderLineForm>,
    pub delivery_address: Option<String>,
}

#[tracing::instrument("Placing order", skip(pool, email_client, user, form))]
pub async fn place_order(
    pool: web::Data<DbPool>,
    email_client: web::Data<EmailClient>,
    user: AuthenticatedUser,
    form: web::Json<CreateOrderForm>,
) -> Result<HttpResponse, actix_web::Error> {
    let form = form.into_inner();

    if form.items.is_empty() {
        return Err(ErrorBadRequest("Order must contain at least one item"));
    }

    if form.items.iter().any(|line| line.quantity <= 0) {
        return Err(ErrorBadRequest("Item quantity must be positive"));
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let customer = get_user_by_id(conn, user.id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("User not found"))?;

    // Fall back to the address stored on the profile.
    let delivery_address = form
        .delivery_address
        .or_else(|| customer.address.clone())
        .ok_or_else(|| ErrorBadRequest("Delivery address is required"))?;

    let lines = form
        .items
        .iter()
        .map(|line| OrderLine {
            menu_item_id: line.menu_item_id,
            quantity: line.quantity,
        })
        .collect();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let order = create_order(conn, user.id, form.restaurant_id, lines, delivery_address)
        .await
        .map_err(|e| match e {
            CreateOrderError::UnknownRestaurant(_) => ErrorNotFound("Restaurant not found"),
            CreateOrderError::UnknownMenuItem(_) => ErrorNotFound("Menu item not found"),
            _ => ErrorInternalServerError(e),
        })?;

    // Confirmation mail is best-effort: a gateway failure never unwinds an
    // order that is already committed.
    if let Ok(recipient) = UserEmail::parse(customer.email) {
        if let Err(e) = email_client
            .send_order_confirmation(&recipient, order.id, &order.total_amount)
            .await
        {
            tracing::warn!("Failed to send order confirmation email: {:?}", e);
        }
    }

    Ok(HttpResponse::Created().json(order))
}
