use actix_web::{
    error::{ErrorInternalServerError, ErrorUnauthorized},
    web, HttpResponse,
};
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    auth::jwt::Tokenizer,
    db_interaction::users::get_user_by_email,
    password::verify_password,
    utils::{get_pooled_connection, DbPool},
};

use super::AuthResponse;

#[derive(Deserialize, Debug)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

// A missing account and a wrong password answer identically, so the endpoint
// does not leak which emails are registered.
#[tracing::instrument("Logging in user", skip(pool, tokenizer, form))]
pub async fn login(
    pool: web::Data<DbPool>,
    tokenizer: web::Data<Tokenizer>,
    form: web::Json<LoginForm>,
) -> Result<HttpResponse, actix_web::Error> {
    let form = form.into_inner();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let user = get_user_by_email(conn, form.email)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorUnauthorized("Invalid credentials"))?;

    let verified = verify_password(form.password, user.password.clone())
        .await
        .map_err(ErrorInternalServerError)?;

    if !verified {
        return Err(ErrorUnauthorized("Invalid credentials"));
    }

    let tokens = tokenizer.generate_token_pair(&user);

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: user.into(),
        tokens,
    }))
}
