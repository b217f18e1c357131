use actix_web::{
    error::{ErrorForbidden, ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::deliveries::{
        get_delivery_view, list_all_deliveries, list_available_deliveries, list_deliveries_by_rider,
    },
    models::UserRole,
    utils::{get_pooled_connection, DbPool},
};

#[tracing::instrument("Listing all deliveries", skip(pool, user))]
pub async fn all_deliveries(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::ListAllDeliveries)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let deliveries = list_all_deliveries(conn)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(deliveries))
}

#[tracing::instrument("Listing available deliveries", skip(pool, user))]
pub async fn available_deliveries(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::ListAvailableDeliveries)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let deliveries = list_available_deliveries(conn)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(deliveries))
}

#[tracing::instrument("Listing own deliveries", skip(pool, user))]
pub async fn my_deliveries(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::ListOwnDeliveries)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let deliveries = list_deliveries_by_rider(conn, user.id)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(deliveries))
}

// Visible to the admin, the assigned rider and the ordering customer.
#[tracing::instrument("Getting delivery", skip(pool, user))]
pub async fn get_delivery(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, actix_web::Error> {
    let delivery_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let delivery = get_delivery_view(conn, delivery_id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Delivery not found"))?;

    let is_assigned_rider = delivery
        .rider
        .as_ref()
        .map(|rider| rider.id == user.id)
        .unwrap_or(false);

    if user.role != UserRole::Admin && delivery.customer.id != user.id && !is_assigned_rider {
        return Err(ErrorForbidden("Access denied"));
    }

    Ok(HttpResponse::Ok().json(delivery))
}
