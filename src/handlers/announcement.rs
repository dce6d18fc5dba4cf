use actix_web::{delete, get, post, web, HttpResponse};
use uuid::Uuid;

use crate::dto::{AnnouncementListQuery, ReactionDto};
use crate::errors::AppError;
use crate::service::announcement;
use crate::service::identity::CurrentUser;
use crate::PGPool;

#[get("")]
pub async fn list(
    query: web::Query<AnnouncementListQuery>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let view = announcement::list(query.category.as_deref(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[get("/{id}")]
pub async fn detail(
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let found = announcement::detail(id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(found))
}

#[delete("/{id}")]
pub async fn delete(
    user: CurrentUser,
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    announcement::delete(&user, id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/{id}/react")]
pub async fn react(
    user: CurrentUser,
    id: web::Path<Uuid>,
    dto: web::Json<ReactionDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let outcome = announcement::react(
        &user,
        id.into_inner(),
        dto.reaction_type,
        pool_state.get_ref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(detail)
        .service(delete)
        .service(react);
}
