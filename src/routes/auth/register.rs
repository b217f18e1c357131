use actix_web::{
    error::{ErrorBadRequest, ErrorInternalServerError},
    web, HttpResponse,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    auth::jwt::{TokenPair, Tokenizer},
    db_interaction::users::{insert_user, UserInsertError},
    domain::{phone_number::PhoneNumber, user_email::UserEmail},
    models::{NewUser, UserRole, UserView},
    password::compute_password_hash,
    telemetry::spawn_blocking_with_tracing,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub role: Option<UserRole>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// Body shared by register and login: the public user row plus a fresh
// token pair.
#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserView,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[tracing::instrument("Registering new user", skip(pool, tokenizer, form))]
pub async fn register(
    pool: web::Data<DbPool>,
    tokenizer: web::Data<Tokenizer>,
    form: web::Json<RegisterForm>,
) -> Result<HttpResponse, actix_web::Error> {
    let form = form.into_inner();

    let email = UserEmail::parse(form.email).map_err(ErrorBadRequest)?;

    if form.password.expose_secret().len() < 6 {
        return Err(ErrorBadRequest(
            "Password must be at least 6 characters long",
        ));
    }

    let phone = match form.phone {
        Some(phone) => Some(PhoneNumber::parse(phone).map_err(ErrorBadRequest)?),
        None => None,
    };

    let password = form.password;
    let password_hash = spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .map_err(ErrorInternalServerError)?
        .map_err(ErrorInternalServerError)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let new_user = NewUser {
        name: form.name,
        email: email.inner(),
        password: password_hash.expose_secret().to_string(),
        role: form.role.unwrap_or(UserRole::Customer),
        phone: phone.map(|p| p.inner()),
        address: form.address,
    };

    let user = insert_user(conn, new_user).await.map_err(|e| match e {
        UserInsertError::EmailNotUnique(_) => ErrorBadRequest("Email already registered"),
        _ => ErrorInternalServerError(e),
    })?;

    let tokens = tokenizer.generate_token_pair(&user);

    Ok(HttpResponse::Created().json(AuthResponse {
        user: user.into(),
        tokens,
    }))
}
