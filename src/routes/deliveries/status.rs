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
    db_interaction::deliveries::{get_delivery_by_id, update_delivery_status, UpdateDeliveryError},
    models::{DeliveryStatus, UserRole},
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct UpdateDeliveryStatusForm {
    pub status: String,
    pub current_location: Option<String>,
}

#[tracing::instrument("Updating delivery status", skip(pool, user, form))]
pub async fn put_delivery_status(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    form: web::Json<UpdateDeliveryStatusForm>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::UpdateDeliveryStatus)?;

    let delivery_id = path.into_inner();
    let form = form.into_inner();

    let status: DeliveryStatus = form.status.parse().map_err(ErrorBadRequest)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let delivery = get_delivery_by_id(conn, delivery_id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Delivery not found"))?;

    if user.role == UserRole::Rider && delivery.rider_id != Some(user.id) {
        return Err(ErrorForbidden("Access denied"));
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    // Transition validity is enforced inside the update transaction, against
    // the current row rather than the one read above.
    let view = update_delivery_status(conn, delivery_id, status, form.current_location)
        .await
        .map_err(|e| match e {
            UpdateDeliveryError::NoSuchDelivery(_) => ErrorNotFound("Delivery not found"),
            UpdateDeliveryError::InvalidTransition { .. } => ErrorBadRequest(e.to_string()),
            _ => ErrorInternalServerError(e),
        })?;

    Ok(HttpResponse::Ok().json(view))
}
