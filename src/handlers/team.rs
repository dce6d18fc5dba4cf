use actix_web::{delete, get, post, put, web, HttpResponse};
use log::info;
use uuid::Uuid;

use crate::dto::{JoinTeamDto, NewTeamDto, NewTeamMessageDto, UpdateRoleDto};
use crate::errors::AppError;
use crate::service::identity::CurrentUser;
use crate::service::team;
use crate::PGPool;

#[get("")]
pub async fn list(pool_state: web::Data<PGPool>) -> Result<HttpResponse, AppError> {
    let teams = team::list_open_teams(pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(teams))
}

#[post("")]
pub async fn create(
    user: CurrentUser,
    dto: web::Json<NewTeamDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let created = team::create_team(&user, dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Created().json(created))
}

#[get("/{id}")]
pub async fn detail(
    user: CurrentUser,
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let view = team::team_detail(&user, id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/{id}/join")]
pub async fn join(
    user: CurrentUser,
    id: web::Path<Uuid>,
    dto: web::Json<JoinTeamDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let request = team::join_team(&user, id.into_inner(), dto.into_inner(), pool_state.get_ref())
        .await?;
    Ok(HttpResponse::Created().json(request))
}

#[post("/{team_id}/requests/{request_id}/approve")]
pub async fn approve_request(
    user: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let (team_id, request_id) = path.into_inner();
    let request =
        team::review_join_request(&user, team_id, request_id, true, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(request))
}

#[post("/{team_id}/requests/{request_id}/reject")]
pub async fn reject_request(
    user: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let (team_id, request_id) = path.into_inner();
    let request =
        team::review_join_request(&user, team_id, request_id, false, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(request))
}

#[delete("/{team_id}/members/{member_id}")]
pub async fn remove_member(
    user: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let (team_id, member_id) = path.into_inner();
    team::remove_member(&user, team_id, member_id, pool_state.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[put("/{team_id}/members/{member_id}/role")]
pub async fn update_role(
    user: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    dto: web::Json<UpdateRoleDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let (team_id, member_id) = path.into_inner();
    let member =
        team::update_member_role(&user, team_id, member_id, dto.role, pool_state.get_ref())
            .await?;
    Ok(HttpResponse::Ok().json(member))
}

#[post("/{team_id}/transfer/{member_id}")]
pub async fn transfer_leadership(
    user: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let (team_id, member_id) = path.into_inner();
    team::transfer_leadership(&user, team_id, member_id, pool_state.get_ref()).await?;
    info!("team {} leadership transferred to member {}", team_id, member_id);
    Ok(HttpResponse::Ok().finish())
}

#[post("/{id}/messages")]
pub async fn send_message(
    user: CurrentUser,
    id: web::Path<Uuid>,
    dto: web::Json<NewTeamMessageDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let message =
        team::send_message(&user, id.into_inner(), dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Created().json(message))
}

#[delete("/{team_id}/messages/{message_id}")]
pub async fn delete_message(
    user: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let (team_id, message_id) = path.into_inner();
    team::delete_message(&user, team_id, message_id, pool_state.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(create)
        .service(detail)
        .service(join)
        .service(approve_request)
        .service(reject_request)
        .service(remove_member)
        .service(update_role)
        .service(transfer_leadership)
        .service(send_message)
        .service(delete_message);
}
