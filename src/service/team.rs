use chrono::Utc;
use uuid::Uuid;

use crate::db;
use crate::dto::{JoinTeamDto, NewTeamDto, NewTeamMessageDto, TeamDetailView, TeamListItem};
use crate::errors::AppError;
use crate::models::{
    JoinRequestStatus, Team, TeamJoinRequest, TeamMember, TeamMessage, TeamRole,
};
use crate::service::identity::CurrentUser;
use crate::service::notification::{self, Notice};
use crate::PGPool;

const MESSAGE_PAGE: i64 = 50;

pub fn check_review_transition(request: &TeamJoinRequest) -> Result<(), AppError> {
    if request.status != JoinRequestStatus::Pending {
        return Err(AppError::AlreadyResponded);
    }
    Ok(())
}

pub fn check_capacity(team: &Team, member_count: i64) -> Result<(), AppError> {
    if member_count >= team.max_members as i64 {
        return Err(AppError::TeamSizeOutOfRange);
    }
    Ok(())
}

/// Role updates can shuffle member-level roles only. Minting or demoting a
/// leader goes through `transfer_leadership`, which keeps the one-leader
/// invariant inside a single transaction.
pub fn check_role_change(target: &TeamMember, new_role: TeamRole) -> Result<(), AppError> {
    if target.role == TeamRole::Leader || new_role == TeamRole::Leader {
        return Err(AppError::InvalidState);
    }
    Ok(())
}

pub fn check_transfer(current: &TeamMember, target: &TeamMember) -> Result<(), AppError> {
    if current.role != TeamRole::Leader {
        return Err(AppError::AccessDenied);
    }
    if current.team_id != target.team_id {
        return Err(AppError::NotFound);
    }
    if current.id == target.id {
        return Err(AppError::InvalidState);
    }
    Ok(())
}

async fn leader_membership(
    pool: &PGPool,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<TeamMember, AppError> {
    let member = db::team::member(pool, team_id, user_id)
        .await?
        .ok_or(AppError::AccessDenied)?;
    if member.role != TeamRole::Leader {
        return Err(AppError::AccessDenied);
    }
    Ok(member)
}

pub async fn create_team(
    user: &CurrentUser,
    dto: NewTeamDto,
    pool: &PGPool,
) -> Result<Team, AppError> {
    let now = Utc::now();
    let team = Team {
        id: Uuid::new_v4(),
        name: dto.name,
        description: dto.description,
        project_idea: dto.project_idea,
        max_members: dto.max_members,
        skills_needed: dto.skills_needed,
        is_open: true,
        created_at: now,
        leader_id: user.user_id,
    };
    let leader = TeamMember {
        id: Uuid::new_v4(),
        team_id: team.id,
        user_id: user.user_id,
        role: TeamRole::Leader,
        joined_at: now,
    };
    let mut tx = pool.begin().await.map_err(AppError::from)?;
    db::team::insert_team(&mut *tx, &team).await?;
    db::team::insert_member(&mut *tx, &leader).await?;
    tx.commit().await.map_err(AppError::from)?;
    Ok(team)
}

pub async fn list_open_teams(pool: &PGPool) -> Result<Vec<TeamListItem>, AppError> {
    db::team::list_open(pool).await.map_err(AppError::from)
}

pub async fn team_detail(
    user: &CurrentUser,
    team_id: Uuid,
    pool: &PGPool,
) -> Result<TeamDetailView, AppError> {
    let team = db::team::get_by_id(pool, team_id).await?;
    let members = db::team::members_view(pool, team_id).await?;
    let membership = db::team::member(pool, team_id, user.user_id).await?;
    let pending_request = db::team::pending_request(pool, team_id, user.user_id).await?;

    let is_leader = membership
        .as_ref()
        .map(|m| m.role == TeamRole::Leader)
        .unwrap_or(false);
    let join_requests = if is_leader {
        db::team::pending_requests_for_team(pool, team_id).await?
    } else {
        Vec::new()
    };
    let messages = if membership.is_some() {
        db::team::recent_messages(pool, team_id, MESSAGE_PAGE).await?
    } else {
        Vec::new()
    };

    Ok(TeamDetailView {
        team,
        members,
        is_member: membership.is_some(),
        pending_request,
        join_requests,
        messages,
    })
}

pub async fn join_team(
    user: &CurrentUser,
    team_id: Uuid,
    dto: JoinTeamDto,
    pool: &PGPool,
) -> Result<TeamJoinRequest, AppError> {
    let team = db::team::get_by_id(pool, team_id).await?;
    if !team.is_open {
        return Err(AppError::InvalidState);
    }
    if db::team::member(pool, team_id, user.user_id).await?.is_some() {
        return Err(AppError::AlreadyMember);
    }
    if db::team::pending_request(pool, team_id, user.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::AlreadyExists);
    }
    let request = TeamJoinRequest {
        id: Uuid::new_v4(),
        team_id,
        user_id: user.user_id,
        message: dto.message,
        status: JoinRequestStatus::Pending,
        created_at: Utc::now(),
        reviewed_at: None,
        reviewed_by: None,
    };
    db::team::insert_request(pool, &request).await?;
    Ok(request)
}

pub async fn review_join_request(
    user: &CurrentUser,
    team_id: Uuid,
    request_id: Uuid,
    approve: bool,
    pool: &PGPool,
) -> Result<TeamJoinRequest, AppError> {
    let now = Utc::now();
    let team = db::team::get_by_id(pool, team_id).await?;
    leader_membership(pool, team_id, user.user_id).await?;

    let request = db::team::request_by_id(pool, request_id).await?;
    if request.team_id != team_id {
        return Err(AppError::NotFound);
    }
    check_review_transition(&request)?;

    let status = if approve {
        let member_count = db::team::member_count(pool, team_id).await?;
        check_capacity(&team, member_count)?;
        let member = TeamMember {
            id: Uuid::new_v4(),
            team_id,
            user_id: request.user_id,
            role: TeamRole::Member,
            joined_at: now,
        };
        let mut tx = pool.begin().await.map_err(AppError::from)?;
        db::team::insert_member(&mut *tx, &member).await?;
        db::team::review_request(&mut *tx, request.id, JoinRequestStatus::Approved, user.user_id, now)
            .await?;
        tx.commit().await.map_err(AppError::from)?;
        JoinRequestStatus::Approved
    } else {
        db::team::review_request(pool, request.id, JoinRequestStatus::Rejected, user.user_id, now)
            .await?;
        JoinRequestStatus::Rejected
    };

    let verdict = match status {
        JoinRequestStatus::Approved => "approved",
        _ => "declined",
    };
    notification::notify(
        pool,
        Notice {
            user_id: request.user_id,
            title: format!("Join request {}", verdict),
            message: format!("Your request to join team \"{}\" was {}", team.name, verdict),
            kind: "team_join_request".to_string(),
            action_url: Some(format!("/teams/{}", team.id)),
        },
    )
    .await;

    db::team::request_by_id(pool, request_id)
        .await
        .map_err(AppError::from)
}

pub async fn remove_member(
    user: &CurrentUser,
    team_id: Uuid,
    member_id: Uuid,
    pool: &PGPool,
) -> Result<(), AppError> {
    leader_membership(pool, team_id, user.user_id).await?;
    let target = db::team::member_by_id(pool, member_id).await?;
    if target.team_id != team_id {
        return Err(AppError::NotFound);
    }
    if target.role == TeamRole::Leader {
        return Err(AppError::InvalidState);
    }
    db::team::delete_member(pool, target.id).await?;
    Ok(())
}

pub async fn update_member_role(
    user: &CurrentUser,
    team_id: Uuid,
    member_id: Uuid,
    new_role: TeamRole,
    pool: &PGPool,
) -> Result<TeamMember, AppError> {
    leader_membership(pool, team_id, user.user_id).await?;
    let target = db::team::member_by_id(pool, member_id).await?;
    if target.team_id != team_id {
        return Err(AppError::NotFound);
    }
    check_role_change(&target, new_role)?;
    db::team::update_member_role(pool, target.id, new_role).await?;
    db::team::member_by_id(pool, target.id)
        .await
        .map_err(AppError::from)
}

/// Swaps the two member roles and the team's leader pointer in one
/// transaction; a partial write would leave zero or two leaders.
pub async fn transfer_leadership(
    user: &CurrentUser,
    team_id: Uuid,
    member_id: Uuid,
    pool: &PGPool,
) -> Result<(), AppError> {
    let _team = db::team::get_by_id(pool, team_id).await?;
    let current = db::team::member(pool, team_id, user.user_id)
        .await?
        .ok_or(AppError::AccessDenied)?;
    let target = db::team::member_by_id(pool, member_id).await?;
    check_transfer(&current, &target)?;

    let mut tx = pool.begin().await.map_err(AppError::from)?;
    db::team::update_member_role(&mut *tx, current.id, TeamRole::Member).await?;
    db::team::update_member_role(&mut *tx, target.id, TeamRole::Leader).await?;
    db::team::set_leader(&mut *tx, team_id, target.user_id).await?;
    tx.commit().await.map_err(AppError::from)?;
    Ok(())
}

pub async fn send_message(
    user: &CurrentUser,
    team_id: Uuid,
    dto: NewTeamMessageDto,
    pool: &PGPool,
) -> Result<TeamMessage, AppError> {
    let _team = db::team::get_by_id(pool, team_id).await?;
    if db::team::member(pool, team_id, user.user_id).await?.is_none() {
        return Err(AppError::AccessDenied);
    }
    let message = TeamMessage {
        id: Uuid::new_v4(),
        team_id,
        user_id: user.user_id,
        message: dto.message,
        is_deleted: false,
        deleted_by: None,
        created_at: Utc::now(),
    };
    db::team::insert_message(pool, &message).await?;
    Ok(message)
}

pub async fn delete_message(
    user: &CurrentUser,
    team_id: Uuid,
    message_id: Uuid,
    pool: &PGPool,
) -> Result<(), AppError> {
    user.require_admin()?;
    let message = db::team::message_by_id(pool, message_id).await?;
    if message.team_id != team_id {
        return Err(AppError::NotFound);
    }
    db::team::soft_delete_message(pool, message.id, user.user_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn member(team_id: Uuid, role: TeamRole) -> TeamMember {
        TeamMember {
            id: Uuid::new_v4(),
            team_id,
            user_id: Uuid::new_v4(),
            role,
            joined_at: Utc::now(),
        }
    }

    fn team(max_members: i32) -> Team {
        Team {
            id: Uuid::new_v4(),
            name: "builders".to_string(),
            description: None,
            project_idea: None,
            max_members,
            skills_needed: None,
            is_open: true,
            created_at: Utc::now(),
            leader_id: Uuid::new_v4(),
        }
    }

    fn request(status: JoinRequestStatus) -> TeamJoinRequest {
        TeamJoinRequest {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            message: None,
            status,
            created_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    #[test]
    fn only_pending_requests_can_be_reviewed() {
        assert!(check_review_transition(&request(JoinRequestStatus::Pending)).is_ok());
        for status in [JoinRequestStatus::Approved, JoinRequestStatus::Rejected] {
            assert_eq!(
                check_review_transition(&request(status)),
                Err(AppError::AlreadyResponded)
            );
        }
    }

    #[test]
    fn capacity_is_checked_against_max_members() {
        let t = team(3);
        assert!(check_capacity(&t, 2).is_ok());
        assert_eq!(check_capacity(&t, 3), Err(AppError::TeamSizeOutOfRange));
    }

    #[test]
    fn role_updates_never_touch_leadership() {
        let team_id = Uuid::new_v4();
        let plain = member(team_id, TeamRole::Member);
        let leader = member(team_id, TeamRole::Leader);
        assert_eq!(
            check_role_change(&plain, TeamRole::Leader),
            Err(AppError::InvalidState)
        );
        assert_eq!(
            check_role_change(&leader, TeamRole::Member),
            Err(AppError::InvalidState)
        );
        assert!(check_role_change(&plain, TeamRole::Member).is_ok());
    }

    #[test]
    fn transfer_requires_the_current_leader_and_a_distinct_member() {
        let team_id = Uuid::new_v4();
        let leader = member(team_id, TeamRole::Leader);
        let target = member(team_id, TeamRole::Member);
        assert!(check_transfer(&leader, &target).is_ok());

        let outsider = member(Uuid::new_v4(), TeamRole::Member);
        assert_eq!(check_transfer(&leader, &outsider), Err(AppError::NotFound));
        assert_eq!(
            check_transfer(&target, &leader),
            Err(AppError::AccessDenied)
        );
        assert_eq!(check_transfer(&leader, &leader), Err(AppError::InvalidState));
    }

    #[test]
    fn transfer_swap_leaves_exactly_one_leader() {
        let team_id = Uuid::new_v4();
        let mut old_leader = member(team_id, TeamRole::Leader);
        let mut new_leader = member(team_id, TeamRole::Member);
        check_transfer(&old_leader, &new_leader).unwrap();

        // the swap applied by transfer_leadership, in miniature
        old_leader.role = TeamRole::Member;
        new_leader.role = TeamRole::Leader;
        let leaders = [&old_leader, &new_leader]
            .iter()
            .filter(|m| m.role == TeamRole::Leader)
            .count();
        assert_eq!(leaders, 1);
    }
}
