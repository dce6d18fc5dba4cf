use actix_web::{delete, get, http::header, post, put, web, HttpResponse};
use log::info;
use uuid::Uuid;

use crate::dto::{EventListQuery, IndividualRegistrationDto, RegisterTeamDto};
use crate::errors::AppError;
use crate::service::identity::CurrentUser;
use crate::service::registration::{self, InvitationDecision, RegisterTeamResult};
use crate::service::{self};
use crate::PGPool;

#[get("")]
pub async fn list(
    query: web::Query<EventListQuery>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let view = service::event::list(query.event_type.as_deref(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[get("/{id}")]
pub async fn detail(
    user: CurrentUser,
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let view = service::event::detail(&user, id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/{id}/register")]
pub async fn register_individual(
    user: CurrentUser,
    id: web::Path<Uuid>,
    dto: web::Json<IndividualRegistrationDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let registration = registration::register_individual(
        &user,
        id.into_inner(),
        dto.into_inner(),
        pool_state.get_ref(),
    )
    .await?;
    Ok(HttpResponse::Created().json(registration))
}

#[post("/{id}/register-team")]
pub async fn register_team(
    user: CurrentUser,
    id: web::Path<Uuid>,
    dto: web::Json<RegisterTeamDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let event_id = id.into_inner();
    let result =
        registration::register_team(&user, event_id, dto.into_inner(), pool_state.get_ref())
            .await?;
    match result {
        RegisterTeamResult::Created(outcome) => {
            info!(
                "team registered for event {}: {} invitation(s), {} warning(s)",
                event_id,
                outcome.invitations_sent,
                outcome.warnings.len()
            );
            Ok(HttpResponse::Created().json(outcome))
        }
        RegisterTeamResult::ExistingRegistration(registration_id) => Ok(HttpResponse::SeeOther()
            .insert_header((
                header::LOCATION,
                format!("/events/registrations/{registration_id}"),
            ))
            .finish()),
    }
}

#[get("/{event_id}/invitations/{invitation_id}")]
pub async fn view_invitation(
    user: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let (_event_id, invitation_id) = path.into_inner();
    let view = registration::invitation_view(&user, invitation_id, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/{event_id}/invitations/{invitation_id}/accept")]
pub async fn accept_invitation(
    user: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let (_event_id, invitation_id) = path.into_inner();
    let invitation = registration::respond_to_invitation(
        &user,
        invitation_id,
        InvitationDecision::Accept,
        pool_state.get_ref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(invitation))
}

#[post("/{event_id}/invitations/{invitation_id}/reject")]
pub async fn reject_invitation(
    user: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let (_event_id, invitation_id) = path.into_inner();
    let invitation = registration::respond_to_invitation(
        &user,
        invitation_id,
        InvitationDecision::Reject,
        pool_state.get_ref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(invitation))
}

#[post("/{id}/quit-team")]
pub async fn quit_team(
    user: CurrentUser,
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    registration::quit_team(&user, id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[put("/registrations/{id}")]
pub async fn edit_registration(
    user: CurrentUser,
    id: web::Path<Uuid>,
    dto: web::Json<RegisterTeamDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let outcome = registration::edit_registration(
        &user,
        id.into_inner(),
        dto.into_inner(),
        pool_state.get_ref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[delete("/registrations/{id}")]
pub async fn unregister_team(
    user: CurrentUser,
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    registration::unregister_team(&user, id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(edit_registration)
        .service(unregister_team)
        .service(detail)
        .service(register_individual)
        .service(register_team)
        .service(view_invitation)
        .service(accept_invitation)
        .service(reject_invitation)
        .service(quit_team);
}
