use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::dto::TeamRegistrationSummary;
use crate::models::{
    EventRegistration, EventTeamInvitation, EventTeamMember, EventTeamRegistration,
    InvitationStatus, RegistrationStatus, TeamRole,
};

pub async fn individual_by_user_event(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    event_id: Uuid,
) -> Result<Option<EventRegistration>, sqlx::Error> {
    sqlx::query_as::<_, EventRegistration>(
        "SELECT * FROM event_registrations WHERE user_id = $1 AND event_id = $2",
    )
    .bind(user_id)
    .bind(event_id)
    .fetch_optional(ex)
    .await
}

pub async fn insert_individual(
    ex: impl PgExecutor<'_>,
    reg: &EventRegistration,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO event_registrations (id, user_id, event_id, team_name, additional_info, registered_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(reg.id)
    .bind(reg.user_id)
    .bind(reg.event_id)
    .bind(&reg.team_name)
    .bind(&reg.additional_info)
    .bind(reg.registered_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn individuals_for_event(
    ex: impl PgExecutor<'_>,
    event_id: Uuid,
) -> Result<Vec<EventRegistration>, sqlx::Error> {
    sqlx::query_as::<_, EventRegistration>(
        "SELECT * FROM event_registrations WHERE event_id = $1 ORDER BY registered_at",
    )
    .bind(event_id)
    .fetch_all(ex)
    .await
}

pub async fn registration_count(
    ex: impl PgExecutor<'_>,
    event_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT (SELECT COUNT(*) FROM event_registrations WHERE event_id = $1)
              + (SELECT COUNT(*) FROM event_team_registrations WHERE event_id = $1)",
    )
    .bind(event_id)
    .fetch_one(ex)
    .await
}

pub async fn team_registration_by_id(
    ex: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<EventTeamRegistration, sqlx::Error> {
    sqlx::query_as::<_, EventTeamRegistration>(
        "SELECT * FROM event_team_registrations WHERE id = $1",
    )
    .bind(id)
    .fetch_one(ex)
    .await
}

pub async fn team_registration_by_leader(
    ex: impl PgExecutor<'_>,
    leader_id: Uuid,
    event_id: Uuid,
) -> Result<Option<EventTeamRegistration>, sqlx::Error> {
    sqlx::query_as::<_, EventTeamRegistration>(
        "SELECT * FROM event_team_registrations WHERE team_leader_id = $1 AND event_id = $2",
    )
    .bind(leader_id)
    .bind(event_id)
    .fetch_optional(ex)
    .await
}

pub async fn insert_team_registration(
    ex: impl PgExecutor<'_>,
    reg: &EventTeamRegistration,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO event_team_registrations (id, event_id, team_name, team_leader_id, status, registered_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(reg.id)
    .bind(reg.event_id)
    .bind(&reg.team_name)
    .bind(reg.team_leader_id)
    .bind(reg.status)
    .bind(reg.registered_at)
    .bind(reg.updated_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn update_team_name(
    ex: impl PgExecutor<'_>,
    id: Uuid,
    team_name: &str,
    updated_at: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "UPDATE event_team_registrations SET team_name = $2, updated_at = $3 WHERE id = $1",
    )
    .bind(id)
    .bind(team_name)
    .bind(updated_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn set_status(
    ex: impl PgExecutor<'_>,
    id: Uuid,
    status: RegistrationStatus,
    updated_at: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "UPDATE event_team_registrations SET status = $2, updated_at = $3 WHERE id = $1",
    )
    .bind(id)
    .bind(status)
    .bind(updated_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

// cascades to members and invitations
pub async fn delete_team_registration(
    ex: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM event_team_registrations WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

pub async fn summaries_for_event(
    ex: impl PgExecutor<'_>,
    event_id: Uuid,
) -> Result<Vec<TeamRegistrationSummary>, sqlx::Error> {
    sqlx::query_as::<_, TeamRegistrationSummary>(
        "SELECT r.*,
                (SELECT COUNT(*) FROM event_team_members m WHERE m.team_registration_id = r.id) AS member_count
         FROM event_team_registrations r
         WHERE r.event_id = $1
         ORDER BY r.registered_at",
    )
    .bind(event_id)
    .fetch_all(ex)
    .await
}

pub async fn membership_for_event(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    event_id: Uuid,
) -> Result<Option<EventTeamMember>, sqlx::Error> {
    sqlx::query_as::<_, EventTeamMember>(
        "SELECT m.* FROM event_team_members m
         JOIN event_team_registrations r ON r.id = m.team_registration_id
         WHERE m.user_id = $1 AND r.event_id = $2",
    )
    .bind(user_id)
    .bind(event_id)
    .fetch_optional(ex)
    .await
}

pub async fn non_leader_membership_for_event(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    event_id: Uuid,
) -> Result<Option<EventTeamMember>, sqlx::Error> {
    sqlx::query_as::<_, EventTeamMember>(
        "SELECT m.* FROM event_team_members m
         JOIN event_team_registrations r ON r.id = m.team_registration_id
         WHERE m.user_id = $1 AND r.event_id = $2 AND m.role <> $3",
    )
    .bind(user_id)
    .bind(event_id)
    .bind(TeamRole::Leader)
    .fetch_optional(ex)
    .await
}

pub async fn insert_member(
    ex: impl PgExecutor<'_>,
    member: &EventTeamMember,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO event_team_members (id, team_registration_id, user_id, role, skills, joined_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(member.id)
    .bind(member.team_registration_id)
    .bind(member.user_id)
    .bind(member.role)
    .bind(&member.skills)
    .bind(member.joined_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn delete_member(ex: impl PgExecutor<'_>, id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM event_team_members WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_plain_members(
    ex: impl PgExecutor<'_>,
    team_registration_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let res =
        sqlx::query("DELETE FROM event_team_members WHERE team_registration_id = $1 AND role = $2")
            .bind(team_registration_id)
            .bind(TeamRole::Member)
            .execute(ex)
            .await?;
    Ok(res.rows_affected())
}

pub async fn insert_invitation(
    ex: impl PgExecutor<'_>,
    invitation: &EventTeamInvitation,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO event_team_invitations (id, team_registration_id, invited_user_id, invited_by_id,
                                             email, role, skills, status, invited_at, responded_at, expires_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(invitation.id)
    .bind(invitation.team_registration_id)
    .bind(invitation.invited_user_id)
    .bind(invitation.invited_by_id)
    .bind(&invitation.email)
    .bind(invitation.role)
    .bind(&invitation.skills)
    .bind(invitation.status)
    .bind(invitation.invited_at)
    .bind(invitation.responded_at)
    .bind(invitation.expires_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn invitation_by_id(
    ex: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<EventTeamInvitation, sqlx::Error> {
    sqlx::query_as::<_, EventTeamInvitation>("SELECT * FROM event_team_invitations WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
}

pub async fn pending_invitations_for_user(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    event_id: Uuid,
) -> Result<Vec<EventTeamInvitation>, sqlx::Error> {
    sqlx::query_as::<_, EventTeamInvitation>(
        "SELECT i.* FROM event_team_invitations i
         JOIN event_team_registrations r ON r.id = i.team_registration_id
         WHERE i.invited_user_id = $1 AND r.event_id = $2 AND i.status = $3
         ORDER BY i.invited_at",
    )
    .bind(user_id)
    .bind(event_id)
    .bind(InvitationStatus::Pending)
    .fetch_all(ex)
    .await
}

pub async fn mark_invitation(
    ex: impl PgExecutor<'_>,
    id: Uuid,
    status: InvitationStatus,
    responded_at: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "UPDATE event_team_invitations SET status = $2, responded_at = $3 WHERE id = $1",
    )
    .bind(id)
    .bind(status)
    .bind(responded_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}
