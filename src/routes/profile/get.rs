use actix_web::{
    error::{ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::users::get_user_by_id,
    models::UserView,
    utils::{get_pooled_connection, DbPool},
};

#[tracing::instrument("Getting own profile", skip(pool, user))]
pub async fn get_profile(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let row = get_user_by_id(conn, user.id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("User not found"))?;

    Ok(HttpResponse::Ok().json(UserView::from(row)))
}
