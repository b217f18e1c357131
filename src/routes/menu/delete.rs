use actix_web::{
    error::{ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};
use serde_json::json;

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action},
    },
    db_interaction::menu_items::delete_menu_item,
    utils::{get_pooled_connection, DbPool},
};

use super::put::ensure_caller_manages_item;

#[tracing::instrument("Deleting menu item", skip(pool, user))]
pub async fn remove_menu_item(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, actix_web::Error> {
    authorize(&user, Action::ManageMenu)?;

    let item_id = path.into_inner();

    ensure_caller_manages_item(&pool, &user, item_id).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let removed = delete_menu_item(conn, item_id)
        .await
        .map_err(ErrorInternalServerError)?;

    if !removed {
        return Err(ErrorNotFound("Menu item not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Menu item deleted successfully" })))
}
