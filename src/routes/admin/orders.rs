use actix_web::{error::ErrorInternalServerError, web, HttpResponse};
use serde_json::json;

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::admin::list_orders_page,
    utils::{get_pooled_connection, DbPool},
};

use super::{PageQuery, Pagination};

#[tracing::instrument("Listing orders for admin", skip(pool, user))]
pub async fn admin_orders(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::ViewAdminPanel)?;

    let (page, limit) = query.sanitized();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let (orders, total) = list_orders_page(conn, page, limit)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(json!({
        "orders": orders,
        "pagination": Pagination::new(total, page, limit),
    })))
}
