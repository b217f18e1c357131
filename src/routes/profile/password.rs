use actix_web::{
    error::{ErrorBadRequest, ErrorInternalServerError, ErrorNotFound, ErrorUnauthorized},
    web, HttpResponse,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::users::{get_user_by_id, update_user_password},
    password::{compute_password_hash, verify_password},
    telemetry::spawn_blocking_with_tracing,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    pub current_password: SecretString,
    pub new_password: SecretString,
}

#[tracing::instrument("Changing own password", skip(pool, user, form))]
pub async fn change_password(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    form: web::Json<ChangePasswordForm>,
) -> Result<HttpResponse, actix_web::Error> {
    let form = form.into_inner();

    if form.new_password.expose_secret().len() < 6 {
        return Err(ErrorBadRequest(
            "Password must be at least 6 characters long",
        ));
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let row = get_user_by_id(conn, user.id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("User not found"))?;

    let verified = verify_password(form.current_password, row.password.clone())
        .await
        .map_err(ErrorInternalServerError)?;

    if !verified {
        return Err(ErrorUnauthorized("Current password is incorrect"));
    }

    let new_password = form.new_password;
    let password_hash = spawn_blocking_with_tracing(move || compute_password_hash(new_password))
        .await
        .map_err(ErrorInternalServerError)?
        .map_err(ErrorInternalServerError)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    update_user_password(conn, user.id, password_hash.expose_secret().to_string())
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Password updated successfully" })))
}
