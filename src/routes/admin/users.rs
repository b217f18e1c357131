use actix_web::{error::ErrorInternalServerError, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::admin::list_users_page,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

impl PageQuery {
    // Clamp out nonsensical values rather than erroring on them.
    pub fn sanitized(&self) -> (i64, i64) {
        (self.page.max(1), self.limit.clamp(1, 100))
    }
}

#[derive(Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            total,
            page,
            pages: (total + limit - 1) / limit,
        }
    }
}

#[tracing::instrument("Listing users for admin", skip(pool, user))]
pub async fn admin_users(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::ViewAdminPanel)?;

    let (page, limit) = query.sanitized();

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let (users, total) = list_users_page(conn, page, limit)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(json!({
        "users": users,
        "pagination": Pagination::new(total, page, limit),
    })))
}
