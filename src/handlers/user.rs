use actix_web::{get, put, web, HttpResponse};
use uuid::Uuid;

use crate::db;
use crate::dto::UpdateProfileDto;
use crate::errors::AppError;
use crate::service::identity::CurrentUser;
use crate::service::user;
use crate::PGPool;

#[get("")]
pub async fn get_all(pool_state: web::Data<PGPool>) -> Result<HttpResponse, AppError> {
    let users = user::get_all(pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/me")]
pub async fn me(
    current: CurrentUser,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let view = user::profile(&current, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[put("/me")]
pub async fn update_me(
    current: CurrentUser,
    dto: web::Json<UpdateProfileDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let updated = user::update_profile(&current, dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[get("/{id}")]
pub async fn get_by_id(
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let found = user::get_by_id(id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(found))
}

#[get("")]
pub async fn achievements(pool_state: web::Data<PGPool>) -> Result<HttpResponse, AppError> {
    let catalog = db::achievement::list(pool_state.get_ref())
        .await
        .map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(catalog))
}

#[get("")]
pub async fn dashboard(
    current: CurrentUser,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let view = user::dashboard(&current, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_all)
        .service(me)
        .service(update_me)
        .service(get_by_id);
}

pub fn init_achievement_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(achievements);
}

pub fn init_dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard);
}
