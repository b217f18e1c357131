use actix_web::{error::ErrorInternalServerError, web, HttpResponse};

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::admin::dashboard_stats,
    utils::{get_pooled_connection, DbPool},
};

#[tracing::instrument("Getting admin dashboard", skip(pool, user))]
pub async fn admin_dashboard(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::ViewAdminPanel)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let stats = dashboard_stats(conn)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(stats))
}
