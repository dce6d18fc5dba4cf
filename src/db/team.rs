use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::dto::{TeamListItem, TeamMemberView};
use crate::models::{JoinRequestStatus, Team, TeamJoinRequest, TeamMember, TeamMessage, TeamRole};

pub async fn insert_team(ex: impl PgExecutor<'_>, team: &Team) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO teams (id, name, description, project_idea, max_members, skills_needed, is_open, created_at, leader_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(team.id)
    .bind(&team.name)
    .bind(&team.description)
    .bind(&team.project_idea)
    .bind(team.max_members)
    .bind(&team.skills_needed)
    .bind(team.is_open)
    .bind(team.created_at)
    .bind(team.leader_id)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn get_by_id(ex: impl PgExecutor<'_>, id: Uuid) -> Result<Team, sqlx::Error> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
}

pub async fn set_leader(
    ex: impl PgExecutor<'_>,
    team_id: Uuid,
    leader_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE teams SET leader_id = $2 WHERE id = $1")
        .bind(team_id)
        .bind(leader_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

pub async fn list_open(ex: impl PgExecutor<'_>) -> Result<Vec<TeamListItem>, sqlx::Error> {
    sqlx::query_as::<_, TeamListItem>(
        "SELECT t.*,
                (SELECT COUNT(*) FROM team_members m WHERE m.team_id = t.id) AS member_count
         FROM teams t
         WHERE t.is_open = TRUE
         ORDER BY t.created_at DESC",
    )
    .fetch_all(ex)
    .await
}

pub async fn member(
    ex: impl PgExecutor<'_>,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<Option<TeamMember>, sqlx::Error> {
    sqlx::query_as::<_, TeamMember>(
        "SELECT * FROM team_members WHERE team_id = $1 AND user_id = $2",
    )
    .bind(team_id)
    .bind(user_id)
    .fetch_optional(ex)
    .await
}

pub async fn member_by_id(ex: impl PgExecutor<'_>, id: Uuid) -> Result<TeamMember, sqlx::Error> {
    sqlx::query_as::<_, TeamMember>("SELECT * FROM team_members WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
}

pub async fn insert_member(
    ex: impl PgExecutor<'_>,
    member: &TeamMember,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO team_members (id, team_id, user_id, role, joined_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(member.id)
    .bind(member.team_id)
    .bind(member.user_id)
    .bind(member.role)
    .bind(member.joined_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn delete_member(ex: impl PgExecutor<'_>, id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM team_members WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

pub async fn update_member_role(
    ex: impl PgExecutor<'_>,
    id: Uuid,
    role: TeamRole,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE team_members SET role = $2 WHERE id = $1")
        .bind(id)
        .bind(role)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

pub async fn member_count(ex: impl PgExecutor<'_>, team_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM team_members WHERE team_id = $1")
        .bind(team_id)
        .fetch_one(ex)
        .await
}

pub async fn members_view(
    ex: impl PgExecutor<'_>,
    team_id: Uuid,
) -> Result<Vec<TeamMemberView>, sqlx::Error> {
    sqlx::query_as::<_, TeamMemberView>(
        "SELECT m.id, m.user_id, m.role, m.joined_at, u.username, u.full_name
         FROM team_members m
         JOIN users u ON u.id = m.user_id
         WHERE m.team_id = $1
         ORDER BY m.joined_at",
    )
    .bind(team_id)
    .fetch_all(ex)
    .await
}

pub async fn pending_request(
    ex: impl PgExecutor<'_>,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<Option<TeamJoinRequest>, sqlx::Error> {
    sqlx::query_as::<_, TeamJoinRequest>(
        "SELECT * FROM team_join_requests WHERE team_id = $1 AND user_id = $2 AND status = $3",
    )
    .bind(team_id)
    .bind(user_id)
    .bind(JoinRequestStatus::Pending)
    .fetch_optional(ex)
    .await
}

pub async fn pending_requests_for_team(
    ex: impl PgExecutor<'_>,
    team_id: Uuid,
) -> Result<Vec<TeamJoinRequest>, sqlx::Error> {
    sqlx::query_as::<_, TeamJoinRequest>(
        "SELECT * FROM team_join_requests WHERE team_id = $1 AND status = $2 ORDER BY created_at",
    )
    .bind(team_id)
    .bind(JoinRequestStatus::Pending)
    .fetch_all(ex)
    .await
}

pub async fn request_by_id(
    ex: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<TeamJoinRequest, sqlx::Error> {
    sqlx::query_as::<_, TeamJoinRequest>("SELECT * FROM team_join_requests WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
}

pub async fn insert_request(
    ex: impl PgExecutor<'_>,
    request: &TeamJoinRequest,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO team_join_requests (id, team_id, user_id, message, status, created_at, reviewed_at, reviewed_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(request.id)
    .bind(request.team_id)
    .bind(request.user_id)
    .bind(&request.message)
    .bind(request.status)
    .bind(request.created_at)
    .bind(request.reviewed_at)
    .bind(request.reviewed_by)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn review_request(
    ex: impl PgExecutor<'_>,
    id: Uuid,
    status: JoinRequestStatus,
    reviewed_by: Uuid,
    reviewed_at: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "UPDATE team_join_requests SET status = $2, reviewed_by = $3, reviewed_at = $4 WHERE id = $1",
    )
    .bind(id)
    .bind(status)
    .bind(reviewed_by)
    .bind(reviewed_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn insert_message(
    ex: impl PgExecutor<'_>,
    message: &TeamMessage,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO team_messages (id, team_id, user_id, message, is_deleted, deleted_by, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(message.id)
    .bind(message.team_id)
    .bind(message.user_id)
    .bind(&message.message)
    .bind(message.is_deleted)
    .bind(message.deleted_by)
    .bind(message.created_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn recent_messages(
    ex: impl PgExecutor<'_>,
    team_id: Uuid,
    limit: i64,
) -> Result<Vec<TeamMessage>, sqlx::Error> {
    sqlx::query_as::<_, TeamMessage>(
        "SELECT * FROM team_messages
         WHERE team_id = $1 AND is_deleted = FALSE
         ORDER BY created_at DESC
         LIMIT $2",
    )
    .bind(team_id)
    .bind(limit)
    .fetch_all(ex)
    .await
}

pub async fn message_by_id(ex: impl PgExecutor<'_>, id: Uuid) -> Result<TeamMessage, sqlx::Error> {
    sqlx::query_as::<_, TeamMessage>("SELECT * FROM team_messages WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
}

pub async fn soft_delete_message(
    ex: impl PgExecutor<'_>,
    id: Uuid,
    deleted_by: Uuid,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE team_messages SET is_deleted = TRUE, deleted_by = $2 WHERE id = $1")
        .bind(id)
        .bind(deleted_by)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}
