use actix_web::{
    error::{ErrorForbidden, ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::{
        orders::{get_order_view, list_all_orders, list_orders_by_customer, list_orders_by_restaurant},
        restaurants::get_restaurant_by_id,
    },
    models::UserRole,
    utils::{get_pooled_connection, DbPool},
};

#[tracing::instrument("Listing own orders", skip(pool, user))]
pub async fn my_orders(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let orders = list_orders_by_customer(conn, user.id)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(orders))
}

// A customer sees their own orders; everything else requires the admin role.
#[tracing::instrument("Getting order", skip(pool, user))]
pub async fn get_order(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, actix_web::Error> {
    let order_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let order = get_order_view(conn, order_id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Order not found"))?;

    if user.role != UserRole::Admin && order.customer.id != user.id {
        return Err(ErrorForbidden("Access denied"));
    }

    Ok(HttpResponse::Ok().json(order))
}

#[tracing::instrument("Listing restaurant orders", skip(pool, user))]
pub async fn restaurant_orders(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::ListRestaurantOrders)?;

    let restaurant_id = path.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let restaurant = get_restaurant_by_id(conn, restaurant_id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("Restaurant not found"))?;

    if user.role == UserRole::RestaurantOwner && restaurant.owner_id != user.id {
        return Err(ErrorForbidden("Access denied"));
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let orders = list_orders_by_restaurant(conn, restaurant_id)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(orders))
}

#[tracing::instrument("Listing all orders", skip(pool, user))]
pub async fn all_orders(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::ListAllOrders)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let orders = list_all_orders(conn)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(orders))
}
