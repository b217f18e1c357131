use actix_web::{
    error::{ErrorBadRequest, ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};
use serde::Deserialize;

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::{
        deliveries::{assign_delivery, get_delivery_by_id, UpdateDeliveryError},
        users::get_user_by_id,
    },
    models::{DeliveryStatus, UserRole},
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct AssignDeliveryForm {
    pub rider_id: i32,
}

#[tracing::instrument("Assigning delivery", skip(pool, user, form))]
pub async fn put_delivery_assignment(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    form: web::Json<AssignDeliveryForm>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::AssignDelivery)?;

    let delivery_id = path.into_inner();
    let rider_id = form.into_inner().rider_id;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let rider = get_user_by_id(conn, rider_id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorBadRequest("Rider not found"))?;

    if rider.role != UserRole::Rider {
        return Err(ErrorBadRequest("User is not a rider"));
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let delivery = get_delivery_by_id(conn, delivery_id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Delivery not found"))?;

    if delivery.status != DeliveryStatus::Pending {
        return Err(ErrorBadRequest("Delivery is already assigned"));
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let view = assign_delivery(conn, delivery_id, rider_id)
        .await
        .map_err(|e| match e {
            UpdateDeliveryError::NoSuchDelivery(_) => ErrorNotFound("Delivery not found"),
            _ => ErrorInternalServerError(e),
        })?;

    Ok(HttpResponse::Ok().json(view))
}
