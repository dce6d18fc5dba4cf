use actix_web::{get, post, web, HttpResponse};
use uuid::Uuid;

use crate::dto::NotificationListQuery;
use crate::errors::AppError;
use crate::service::identity::CurrentUser;
use crate::service::notification;
use crate::PGPool;

#[get("")]
pub async fn list(
    user: CurrentUser,
    query: web::Query<NotificationListQuery>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let notifications =
        notification::list(&user, query.unread_only, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

#[post("/{id}/read")]
pub async fn mark_read(
    user: CurrentUser,
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    notification::mark_read(&user, id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list).service(mark_read);
}
