use actix_web::{
    error::{ErrorBadRequest, ErrorInternalServerError},
    web, HttpResponse,
};
use serde::Deserialize;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::users::{update_user_profile, ProfileUpdateError, UserProfileChanges},
    domain::{phone_number::PhoneNumber, user_email::UserEmail},
    models::UserView,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct UpdateProfileForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[tracing::instrument("Updating own profile", skip(pool, user, form))]
pub async fn update_profile(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    form: web::Json<UpdateProfileForm>,
) -> Result<HttpResponse, actix_web::Error> {
    let form = form.into_inner();

    let email = match form.email {
        Some(email) => Some(UserEmail::parse(email).map_err(ErrorBadRequest)?),
        None => None,
    };

    let phone = match form.phone {
        Some(phone) => Some(PhoneNumber::parse(phone).map_err(ErrorBadRequest)?),
        None => None,
    };

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let changes = UserProfileChanges {
        name: form.name,
        email: email.map(|e| e.inner()),
        phone: phone.map(|p| p.inner()),
        address: form.address,
    };

    let row = update_user_profile(conn, user.id, changes)
        .await
        .map_err(|e| match e {
            ProfileUpdateError::EmailNotUnique(_) => ErrorBadRequest("Email already registered"),
            _ => ErrorInternalServerError(e),
        })?;

    Ok(HttpResponse::Ok().json(UserView::from(row)))
}
