use actix_web::{
    error::{ErrorInternalServerError, ErrorUnauthorized},
    web, HttpResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::jwt::Tokenizer,
    db_interaction::users::get_user_by_id,
    utils::{get_pooled_connection, DbPool},
};

// The token is optional at the deserialization layer so a missing field is an
// authentication failure, not a malformed request.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshForm {
    pub refresh_token: Option<String>,
}

// Exchanges a valid refresh token for a fresh access token. The user row is
// re-read so a rotated role or email lands in the new claims.
#[tracing::instrument("Refreshing token pair", skip_all)]
pub async fn refresh(
    pool: web::Data<DbPool>,
    tokenizer: web::Data<Tokenizer>,
    form: web::Json<RefreshForm>,
) -> Result<HttpResponse, actix_web::Error> {
    let refresh_token = form
        .into_inner()
        .refresh_token
        .ok_or_else(|| ErrorUnauthorized("A token is required for authentication"))?;

    let claims = tokenizer
        .decode_refresh_token(refresh_token)
        .ok_or_else(|| ErrorUnauthorized("Invalid Token"))?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let user = get_user_by_id(conn, claims.sub)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorUnauthorized("Invalid Token"))?;

    let access_token = tokenizer.generate_access_token(user.id, user.email, user.role);

    Ok(HttpResponse::Ok().json(json!({ "accessToken": access_token })))
}
