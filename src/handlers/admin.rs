use actix_web::{get, post, web, HttpResponse};
use uuid::Uuid;

use crate::dto::{
    AwardAchievementDto, NewAnnouncementDto, NewEventDto, NewForumCategoryDto, NewUserDto,
};
use crate::errors::AppError;
use crate::service::identity::CurrentUser;
use crate::service::{self};
use crate::PGPool;

#[post("/events")]
pub async fn create_event(
    user: CurrentUser,
    dto: web::Json<NewEventDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let event = service::event::create(&user, dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Created().json(event))
}

#[post("/events/{id}/deactivate")]
pub async fn deactivate_event(
    user: CurrentUser,
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    service::event::deactivate(&user, id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().finish())
}

#[get("/events/{id}/registrations")]
pub async fn event_registrations(
    user: CurrentUser,
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let view =
        service::event::admin_registrations(&user, id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/announcements")]
pub async fn create_announcement(
    user: CurrentUser,
    dto: web::Json<NewAnnouncementDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let announcement =
        service::announcement::create(&user, dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Created().json(announcement))
}

#[post("/forum/categories")]
pub async fn create_forum_category(
    user: CurrentUser,
    dto: web::Json<NewForumCategoryDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let category =
        service::forum::create_category(&user, dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Created().json(category))
}

#[post("/users")]
pub async fn provision_user(
    user: CurrentUser,
    dto: web::Json<NewUserDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let created = service::user::provision(&user, dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Created().json(created))
}

#[post("/achievements/award")]
pub async fn award_achievement(
    user: CurrentUser,
    dto: web::Json<AwardAchievementDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let earned =
        service::user::award_achievement(&user, dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Created().json(earned))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_event)
        .service(deactivate_event)
        .service(event_registrations)
        .service(create_announcement)
        .service(create_forum_category)
        .service(provision_user)
        .service(award_achievement);
}
