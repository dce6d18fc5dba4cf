use chrono::{DateTime, Duration, Utc};
use log::warn;
use uuid::Uuid;

use crate::db;
use crate::dto::{
    EditRegistrationOutcome, IndividualRegistrationDto, InvitationView, RegisterTeamDto,
    TeamRegistrationOutcome,
};
use crate::errors::AppError;
use crate::models::{
    Event, EventRegistration, EventTeamInvitation, EventTeamMember, EventTeamRegistration,
    InvitationStatus, RegistrationStatus, TeamRole,
};
use crate::service::identity::CurrentUser;
use crate::service::notification::{self, Notice};
use crate::PGPool;

const INVITATION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationDecision {
    Accept,
    Reject,
}

pub enum RegisterTeamResult {
    Created(TeamRegistrationOutcome),
    /// The leader already has a registration for this event; callers should
    /// send them to the edit flow for it.
    ExistingRegistration(Uuid),
}

pub fn registration_open(event: &Event, now: DateTime<Utc>) -> bool {
    now <= event.registration_deadline
}

/// Team size is validated against the raw submitted email count, before any
/// of the addresses are resolved to users. A batch of unresolvable emails can
/// pass this check and leave the team under `min_team_size` at the deadline,
/// where lazy disqualification picks it up.
pub fn submitted_team_size(invitee_emails: &[String]) -> i64 {
    invitee_emails
        .iter()
        .filter(|email| !email.trim().is_empty())
        .count() as i64
        + 1
}

pub fn check_team_size(event: &Event, total_members: i64) -> Result<(), AppError> {
    if total_members < event.min_team_size as i64 || total_members > event.max_team_size as i64 {
        return Err(AppError::TeamSizeOutOfRange);
    }
    Ok(())
}

pub fn invitation_expired(invitation: &EventTeamInvitation, now: DateTime<Utc>) -> bool {
    now > invitation.expires_at
}

/// Expiry is never written back; the stored status stays `pending` and the
/// expired state is recomputed from `now` wherever the invitation is read.
pub fn effective_status(invitation: &EventTeamInvitation, now: DateTime<Utc>) -> InvitationStatus {
    if invitation.status == InvitationStatus::Pending && invitation_expired(invitation, now) {
        InvitationStatus::Expired
    } else {
        invitation.status
    }
}

/// Gatekeeper for responding to an invitation. The expiry check applies to
/// the accept arm only: a reject is honored even after `expires_at`.
pub fn check_response(
    invitation: &EventTeamInvitation,
    user_id: Uuid,
    decision: InvitationDecision,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if invitation.invited_user_id != user_id {
        return Err(AppError::AccessDenied);
    }
    if invitation.status != InvitationStatus::Pending {
        return Err(AppError::AlreadyResponded);
    }
    if decision == InvitationDecision::Accept && invitation_expired(invitation, now) {
        return Err(AppError::Expired);
    }
    Ok(())
}

pub fn should_disqualify(
    registration: &EventTeamRegistration,
    member_count: i64,
    event: &Event,
    now: DateTime<Utc>,
) -> bool {
    registration.status == RegistrationStatus::Registered
        && now > event.registration_deadline
        && member_count < event.min_team_size as i64
}

pub async fn register_individual(
    user: &CurrentUser,
    event_id: Uuid,
    dto: IndividualRegistrationDto,
    pool: &PGPool,
) -> Result<EventRegistration, AppError> {
    let _event = db::event::get_by_id(pool, event_id).await?;
    if db::registration::individual_by_user_event(pool, user.user_id, event_id)
        .await?
        .is_some()
    {
        return Err(AppError::AlreadyRegistered);
    }
    let registration = EventRegistration {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        event_id,
        team_name: dto.team_name,
        additional_info: dto.additional_info,
        registered_at: Utc::now(),
    };
    db::registration::insert_individual(pool, &registration).await?;
    Ok(registration)
}

pub async fn register_team(
    user: &CurrentUser,
    event_id: Uuid,
    dto: RegisterTeamDto,
    pool: &PGPool,
) -> Result<RegisterTeamResult, AppError> {
    let now = Utc::now();
    let event = db::event::get_by_id(pool, event_id).await?;

    if !registration_open(&event, now) {
        return Err(AppError::DeadlinePassed);
    }
    if let Some(existing) =
        db::registration::team_registration_by_leader(pool, user.user_id, event_id).await?
    {
        return Ok(RegisterTeamResult::ExistingRegistration(existing.id));
    }
    if db::registration::membership_for_event(pool, user.user_id, event_id)
        .await?
        .is_some()
    {
        return Err(AppError::AlreadyMember);
    }

    let emails: Vec<String> = dto.invitees.iter().map(|i| i.email.clone()).collect();
    check_team_size(&event, submitted_team_size(&emails))?;

    let registration = EventTeamRegistration {
        id: Uuid::new_v4(),
        event_id,
        team_name: dto.team_name.clone(),
        team_leader_id: user.user_id,
        status: RegistrationStatus::Registered,
        registered_at: now,
        updated_at: now,
    };
    let leader_member = EventTeamMember {
        id: Uuid::new_v4(),
        team_registration_id: registration.id,
        user_id: user.user_id,
        role: TeamRole::Leader,
        skills: None,
        joined_at: now,
    };

    let mut warnings: Vec<String> = Vec::new();
    let mut notices: Vec<Notice> = Vec::new();
    let mut invitations_sent = 0usize;

    let mut tx = pool.begin().await.map_err(AppError::from)?;
    db::registration::insert_team_registration(&mut *tx, &registration).await?;
    db::registration::insert_member(&mut *tx, &leader_member).await?;

    for invitee in &dto.invitees {
        let email = invitee.email.trim();
        if email.is_empty() {
            continue;
        }
        let Some(invited) = db::user::get_by_email(&mut *tx, email).await? else {
            warn!("team registration {}: no user with email {}", registration.id, email);
            warnings.push(format!("user with email {email} not found"));
            continue;
        };
        if db::registration::membership_for_event(&mut *tx, invited.id, event_id)
            .await?
            .is_some()
        {
            warnings.push(format!(
                "{} is already registered for this event in another team",
                invited.full_name
            ));
            continue;
        }
        let invitation = EventTeamInvitation {
            id: Uuid::new_v4(),
            team_registration_id: registration.id,
            invited_user_id: invited.id,
            invited_by_id: user.user_id,
            email: email.to_string(),
            role: TeamRole::Member,
            skills: Some(invitee.skills.clone()).filter(|s| !s.is_empty()),
            status: InvitationStatus::Pending,
            invited_at: now,
            responded_at: None,
            expires_at: now + Duration::days(INVITATION_TTL_DAYS),
        };
        db::registration::insert_invitation(&mut *tx, &invitation).await?;
        notices.push(Notice {
            user_id: invited.id,
            title: format!("Team Invitation for {}", event.title),
            message: format!(
                "{} invited you to join team \"{}\" for {}",
                user.username, dto.team_name, event.title
            ),
            kind: "team_invitation".to_string(),
            action_url: Some(format!("/events/{}/invitations/{}", event_id, invitation.id)),
        });
        invitations_sent += 1;
    }
    tx.commit().await.map_err(AppError::from)?;

    notification::dispatch(pool, notices).await;

    Ok(RegisterTeamResult::Created(TeamRegistrationOutcome {
        registration_id: registration.id,
        invitations_sent,
        warnings,
    }))
}

pub async fn respond_to_invitation(
    user: &CurrentUser,
    invitation_id: Uuid,
    decision: InvitationDecision,
    pool: &PGPool,
) -> Result<EventTeamInvitation, AppError> {
    let now = Utc::now();
    let invitation = db::registration::invitation_by_id(pool, invitation_id).await?;
    check_response(&invitation, user.user_id, decision, now)?;

    match decision {
        InvitationDecision::Accept => {
            let registration =
                db::registration::team_registration_by_id(pool, invitation.team_registration_id)
                    .await?;
            if db::registration::membership_for_event(pool, user.user_id, registration.event_id)
                .await?
                .is_some()
            {
                return Err(AppError::AlreadyMember);
            }
            let member = EventTeamMember {
                id: Uuid::new_v4(),
                team_registration_id: invitation.team_registration_id,
                user_id: user.user_id,
                role: TeamRole::Member,
                skills: invitation.skills.clone(),
                joined_at: now,
            };
            let mut tx = pool.begin().await.map_err(AppError::from)?;
            db::registration::insert_member(&mut *tx, &member).await?;
            db::registration::mark_invitation(
                &mut *tx,
                invitation.id,
                InvitationStatus::Accepted,
                now,
            )
            .await?;
            tx.commit().await.map_err(AppError::from)?;
        }
        InvitationDecision::Reject => {
            db::registration::mark_invitation(pool, invitation.id, InvitationStatus::Rejected, now)
                .await?;
        }
    }
    db::registration::invitation_by_id(pool, invitation_id)
        .await
        .map_err(AppError::from)
}

pub async fn quit_team(user: &CurrentUser, event_id: Uuid, pool: &PGPool) -> Result<(), AppError> {
    let membership =
        db::registration::non_leader_membership_for_event(pool, user.user_id, event_id)
            .await?
            .ok_or(AppError::NotAMemberOrLeader)?;
    db::registration::delete_member(pool, membership.id).await?;
    Ok(())
}

/// The edit path adds resolved users as members directly, without the
/// invitation round-trip the initial registration uses.
pub async fn edit_registration(
    user: &CurrentUser,
    registration_id: Uuid,
    dto: RegisterTeamDto,
    pool: &PGPool,
) -> Result<EditRegistrationOutcome, AppError> {
    let now = Utc::now();
    let registration = db::registration::team_registration_by_id(pool, registration_id).await?;
    if registration.team_leader_id != user.user_id {
        return Err(AppError::AccessDenied);
    }
    let event = db::event::get_by_id(pool, registration.event_id).await?;
    if !registration_open(&event, now) {
        return Err(AppError::DeadlinePassed);
    }

    let mut warnings: Vec<String> = Vec::new();
    let mut members_added = 0usize;

    let mut tx = pool.begin().await.map_err(AppError::from)?;
    db::registration::update_team_name(&mut *tx, registration.id, &dto.team_name, now).await?;
    db::registration::delete_plain_members(&mut *tx, registration.id).await?;

    for invitee in &dto.invitees {
        let email = invitee.email.trim();
        if email.is_empty() {
            continue;
        }
        let Some(invited) = db::user::get_by_email(&mut *tx, email).await? else {
            warnings.push(format!("user with email {email} not found"));
            continue;
        };
        if invited.id == registration.team_leader_id {
            warnings.push(format!("{} is already the team leader", invited.full_name));
            continue;
        }
        if db::registration::membership_for_event(&mut *tx, invited.id, registration.event_id)
            .await?
            .is_some()
        {
            warnings.push(format!(
                "{} is already registered for this event in another team",
                invited.full_name
            ));
            continue;
        }
        let member = EventTeamMember {
            id: Uuid::new_v4(),
            team_registration_id: registration.id,
            user_id: invited.id,
            role: TeamRole::Member,
            skills: Some(invitee.skills.clone()).filter(|s| !s.is_empty()),
            joined_at: now,
        };
        db::registration::insert_member(&mut *tx, &member).await?;
        members_added += 1;
    }
    tx.commit().await.map_err(AppError::from)?;

    Ok(EditRegistrationOutcome {
        registration_id: registration.id,
        members_added,
        warnings,
    })
}

pub async fn unregister_team(
    user: &CurrentUser,
    registration_id: Uuid,
    pool: &PGPool,
) -> Result<(), AppError> {
    let registration = db::registration::team_registration_by_id(pool, registration_id).await?;
    if registration.team_leader_id != user.user_id {
        return Err(AppError::AccessDenied);
    }
    db::registration::delete_team_registration(pool, registration.id).await?;
    Ok(())
}

/// Lazy sweep over an event's team registrations. Idempotent: a registration
/// is only moved `registered -> disqualified`, never back.
pub async fn evaluate_disqualification(event: &Event, pool: &PGPool) -> Result<usize, AppError> {
    let now = Utc::now();
    if now <= event.registration_deadline {
        return Ok(0);
    }
    let summaries = db::registration::summaries_for_event(pool, event.id).await?;
    let mut disqualified = 0usize;
    for summary in &summaries {
        if should_disqualify(&summary.registration, summary.member_count, event, now) {
            db::registration::set_status(
                pool,
                summary.registration.id,
                RegistrationStatus::Disqualified,
                now,
            )
            .await?;
            disqualified += 1;
        }
    }
    Ok(disqualified)
}

pub async fn invitation_view(
    user: &CurrentUser,
    invitation_id: Uuid,
    pool: &PGPool,
) -> Result<InvitationView, AppError> {
    let invitation = db::registration::invitation_by_id(pool, invitation_id).await?;
    if invitation.invited_user_id != user.user_id {
        return Err(AppError::AccessDenied);
    }
    Ok(InvitationView {
        effective_status: effective_status(&invitation, Utc::now()),
        invitation,
    })
}

pub async fn pending_invitation_views(
    user_id: Uuid,
    event_id: Uuid,
    pool: &PGPool,
) -> Result<Vec<InvitationView>, AppError> {
    let now = Utc::now();
    let invitations =
        db::registration::pending_invitations_for_user(pool, user_id, event_id).await?;
    Ok(invitations
        .into_iter()
        .map(|invitation| InvitationView {
            effective_status: effective_status(&invitation, now),
            invitation,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(min: i32, max: i32, deadline: DateTime<Utc>) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Hack Night".to_string(),
            description: "overnight build sprint".to_string(),
            event_type: "hackathon".to_string(),
            start_date: deadline + Duration::hours(1),
            end_date: deadline + Duration::hours(10),
            venue: None,
            virtual_link: None,
            max_participants: None,
            min_team_size: min,
            max_team_size: max,
            registration_deadline: deadline,
            rules: None,
            prizes: None,
            is_active: true,
            created_at: deadline - Duration::days(30),
            creator_id: Uuid::new_v4(),
        }
    }

    fn invitation(status: InvitationStatus, expires_at: DateTime<Utc>) -> EventTeamInvitation {
        EventTeamInvitation {
            id: Uuid::new_v4(),
            team_registration_id: Uuid::new_v4(),
            invited_user_id: Uuid::new_v4(),
            invited_by_id: Uuid::new_v4(),
            email: "dev@campus.edu".to_string(),
            role: TeamRole::Member,
            skills: None,
            status,
            invited_at: expires_at - Duration::days(INVITATION_TTL_DAYS),
            responded_at: None,
            expires_at,
        }
    }

    fn team_registration(status: RegistrationStatus, event_id: Uuid) -> EventTeamRegistration {
        EventTeamRegistration {
            id: Uuid::new_v4(),
            event_id,
            team_name: "alpha".to_string(),
            team_leader_id: Uuid::new_v4(),
            status,
            registered_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn size_counts_submitted_emails_not_resolved_users() {
        let emails = vec![
            "a@campus.edu".to_string(),
            "nobody@nowhere.example".to_string(),
        ];
        // the bogus address still counts, so min_team_size = 3 passes
        assert_eq!(submitted_team_size(&emails), 3);
        assert!(check_team_size(&event(3, 4, Utc::now()), submitted_team_size(&emails)).is_ok());
    }

    #[test]
    fn size_ignores_blank_emails() {
        let emails = vec!["  ".to_string(), String::new(), "a@campus.edu".to_string()];
        assert_eq!(submitted_team_size(&emails), 2);
    }

    #[test]
    fn size_bounds_are_inclusive() {
        let e = event(2, 4, Utc::now());
        assert!(check_team_size(&e, 1).is_err());
        assert!(check_team_size(&e, 2).is_ok());
        assert!(check_team_size(&e, 4).is_ok());
        assert_eq!(check_team_size(&e, 5), Err(AppError::TeamSizeOutOfRange));
    }

    #[test]
    fn registration_closes_strictly_after_deadline() {
        let deadline = Utc::now();
        let e = event(1, 5, deadline);
        assert!(registration_open(&e, deadline));
        assert!(!registration_open(&e, deadline + Duration::seconds(1)));
    }

    #[test]
    fn respond_requires_the_invited_user() {
        let now = Utc::now();
        let inv = invitation(InvitationStatus::Pending, now + Duration::days(1));
        let err = check_response(&inv, Uuid::new_v4(), InvitationDecision::Accept, now);
        assert_eq!(err, Err(AppError::AccessDenied));
    }

    #[test]
    fn responded_invitations_are_consumed() {
        let now = Utc::now();
        for status in [InvitationStatus::Accepted, InvitationStatus::Rejected] {
            let inv = invitation(status, now + Duration::days(1));
            let err = check_response(&inv, inv.invited_user_id, InvitationDecision::Accept, now);
            assert_eq!(err, Err(AppError::AlreadyResponded));
        }
    }

    #[test]
    fn accept_after_expiry_fails_but_reject_is_allowed() {
        let now = Utc::now();
        let inv = invitation(InvitationStatus::Pending, now - Duration::hours(1));
        assert_eq!(
            check_response(&inv, inv.invited_user_id, InvitationDecision::Accept, now),
            Err(AppError::Expired)
        );
        assert!(check_response(&inv, inv.invited_user_id, InvitationDecision::Reject, now).is_ok());
    }

    #[test]
    fn pending_unexpired_invitation_accepts() {
        let now = Utc::now();
        let inv = invitation(InvitationStatus::Pending, now + Duration::days(1));
        assert!(check_response(&inv, inv.invited_user_id, InvitationDecision::Accept, now).is_ok());
    }

    #[test]
    fn effective_status_reports_expiry_without_persisting_it() {
        let now = Utc::now();
        let inv = invitation(InvitationStatus::Pending, now - Duration::minutes(1));
        assert_eq!(effective_status(&inv, now), InvitationStatus::Expired);
        assert_eq!(inv.status, InvitationStatus::Pending);

        let responded = invitation(InvitationStatus::Rejected, now - Duration::minutes(1));
        assert_eq!(effective_status(&responded, now), InvitationStatus::Rejected);
    }

    #[test]
    fn disqualification_waits_for_the_deadline() {
        let deadline = Utc::now() + Duration::hours(1);
        let e = event(2, 4, deadline);
        let reg = team_registration(RegistrationStatus::Registered, e.id);
        assert!(!should_disqualify(&reg, 1, &e, Utc::now()));
    }

    #[test]
    fn undersized_team_is_disqualified_after_deadline() {
        // event with min 2: team "alpha" filled up, team "beta" never did
        let deadline = Utc::now() - Duration::hours(1);
        let e = event(2, 4, deadline);
        let alpha = team_registration(RegistrationStatus::Registered, e.id);
        let beta = team_registration(RegistrationStatus::Registered, e.id);
        let now = Utc::now();
        assert!(!should_disqualify(&alpha, 2, &e, now));
        assert!(should_disqualify(&beta, 1, &e, now));
    }

    #[test]
    fn disqualification_is_terminal_and_idempotent() {
        let deadline = Utc::now() - Duration::hours(1);
        let e = event(2, 4, deadline);
        let now = Utc::now();
        let disqualified = team_registration(RegistrationStatus::Disqualified, e.id);
        assert!(!should_disqualify(&disqualified, 1, &e, now));
        let qualified = team_registration(RegistrationStatus::Qualified, e.id);
        assert!(!should_disqualify(&qualified, 1, &e, now));
    }
}
