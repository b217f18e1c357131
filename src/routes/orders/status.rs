use actix_web::{
    error::{ErrorBadRequest, ErrorForbidden, ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};
use serde::Deserialize;

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::orders::{
        get_order_with_restaurant, update_order_status, UpdateOrderStatusError,
    },
    models::{OrderStatus, UserRole},
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct UpdateOrderStatusForm {
    pub status: String,
}

// Statuses a rider is allowed to submit on this endpoint. Checked against the
// raw string before parsing, so an out-of-set value answers 403 rather
// than 400.
const RIDER_ALLOWED_STATUSES: [&str; 3] = ["ready", "picked_up", "delivered"];

#[tracing::instrument("Updating order status", skip(pool, user, form))]
pub async fn put_order_status(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    form: web::Json<UpdateOrderStatusForm>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::UpdateOrderStatus)?;

    let order_id = path.into_inner();
    let requested = form.into_inner().status;

    if user.role == UserRole::Rider && !RIDER_ALLOWED_STATUSES.contains(&requested.as_str()) {
        return Err(ErrorForbidden("Access denied"));
    }

    // Pickup and handover are tracked on the delivery record; the order status
    // out_for_delivery is only ever reached through the delivery cascade.
    let status: OrderStatus = requested.parse().map_err(ErrorBadRequest)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let (_order, restaurant) = get_order_with_restaurant(conn, order_id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Order not found"))?;

    if user.role == UserRole::RestaurantOwner && restaurant.owner_id != user.id {
        return Err(ErrorForbidden("Access denied"));
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    // Transition validity is enforced inside the update transaction, against
    // the current row rather than the one read above.
    let updated = update_order_status(conn, order_id, status)
        .await
        .map_err(|e| match e {
            UpdateOrderStatusError::NoSuchOrder(_) => ErrorNotFound("Order not found"),
            UpdateOrderStatusError::InvalidTransition { .. } => ErrorBadRequest(e.to_string()),
            _ => ErrorInternalServerError(e),
        })?;

    Ok(HttpResponse::Ok().json(updated))
}
