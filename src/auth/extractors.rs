use actix_web::{error::ErrorUnauthorized, web, FromRequest};
use futures_util::future::{ready, Ready};

use crate::models::UserRole;

use super::jwt::Tokenizer;

// Identity claims of the caller, decoded from the bearer token. This is the
// single authoritative extraction path: the Authorization header only.
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let tokenizer: &web::Data<Tokenizer> = req.app_data().unwrap();

        let header = match req.headers().get("Authorization") {
            Some(header) => header,
            None => return ready(Err(ErrorUnauthorized("A token is required for authentication"))),
        };

        let token = match header.to_str() {
            Ok(value) => match value.strip_prefix("Bearer ") {
                Some(token) => token.trim(),
                None => return ready(Err(ErrorUnauthorized("Invalid Token"))),
            },
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid Token"))),
        };

        match tokenizer.decode_access_token(token.to_string()) {
            Some(claims) => ready(Ok(AuthenticatedUser {
                id: claims.sub,
                email: claims.email,
                role: claims.role,
            })),
            None => ready(Err(ErrorUnauthorized("Invalid Token"))),
        }
    }
}
