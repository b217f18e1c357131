use actix_web::HttpResponse;
use serde_json::json;

use crate::auth::extractors::AuthenticatedUser;

// Tokens are stateless and short-lived; logout is acknowledgement only and
// clients simply drop their copies.
#[tracing::instrument("Logging out user", skip_all)]
pub async fn logout(_user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Logged out successfully" }))
}
