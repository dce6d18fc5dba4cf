use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db;
use crate::dto::{AdminRegistrationsView, EventDetailView, EventListView, NewEventDto};
use crate::errors::AppError;
use crate::models::Event;
use crate::service::identity::CurrentUser;
use crate::service::registration;
use crate::PGPool;

/// Events are immutable after creation apart from `is_active`, so the window
/// constraints are checked here once.
pub fn check_event_window(dto: &NewEventDto) -> Result<(), AppError> {
    if dto.start_date >= dto.end_date {
        return Err(AppError::InvalidState);
    }
    if dto.registration_deadline > dto.start_date {
        return Err(AppError::InvalidState);
    }
    if dto.min_team_size < 1 || dto.min_team_size > dto.max_team_size {
        return Err(AppError::TeamSizeOutOfRange);
    }
    Ok(())
}

pub fn categorize(events: Vec<Event>, now: DateTime<Utc>) -> EventListView {
    let mut view = EventListView {
        upcoming: Vec::new(),
        ongoing: Vec::new(),
        past: Vec::new(),
    };
    for event in events {
        if event.start_date > now {
            view.upcoming.push(event);
        } else if event.end_date >= now {
            view.ongoing.push(event);
        } else {
            view.past.push(event);
        }
    }
    view
}

pub async fn create(
    user: &CurrentUser,
    dto: NewEventDto,
    pool: &PGPool,
) -> Result<Event, AppError> {
    user.require_admin()?;
    check_event_window(&dto)?;
    let event = Event {
        id: Uuid::new_v4(),
        title: dto.title,
        description: dto.description,
        event_type: dto.event_type,
        start_date: dto.start_date,
        end_date: dto.end_date,
        venue: dto.venue,
        virtual_link: dto.virtual_link,
        max_participants: dto.max_participants,
        min_team_size: dto.min_team_size,
        max_team_size: dto.max_team_size,
        registration_deadline: dto.registration_deadline,
        rules: dto.rules,
        prizes: dto.prizes,
        is_active: true,
        created_at: Utc::now(),
        creator_id: user.user_id,
    };
    db::event::create(pool, &event).await?;
    Ok(event)
}

pub async fn deactivate(user: &CurrentUser, event_id: Uuid, pool: &PGPool) -> Result<(), AppError> {
    user.require_admin()?;
    let updated = db::event::set_active(pool, event_id, false).await?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn list(event_type: Option<&str>, pool: &PGPool) -> Result<EventListView, AppError> {
    let events = db::event::list_active(pool, event_type).await?;
    Ok(categorize(events, Utc::now()))
}

pub async fn detail(
    user: &CurrentUser,
    event_id: Uuid,
    pool: &PGPool,
) -> Result<EventDetailView, AppError> {
    let event = db::event::get_by_id(pool, event_id).await?;
    let registration_count = db::registration::registration_count(pool, event_id).await?;
    let is_registered =
        db::registration::individual_by_user_event(pool, user.user_id, event_id)
            .await?
            .is_some();
    let team_registration =
        db::registration::team_registration_by_leader(pool, user.user_id, event_id).await?;
    let team_membership =
        db::registration::membership_for_event(pool, user.user_id, event_id).await?;
    let pending_invitations =
        registration::pending_invitation_views(user.user_id, event_id, pool).await?;

    Ok(EventDetailView {
        event,
        registration_count,
        is_registered,
        team_registration,
        team_membership,
        pending_invitations,
    })
}

/// Admin view of an event's registrations; reading it is what triggers the
/// lazy disqualification sweep.
pub async fn admin_registrations(
    user: &CurrentUser,
    event_id: Uuid,
    pool: &PGPool,
) -> Result<AdminRegistrationsView, AppError> {
    user.require_admin()?;
    let event = db::event::get_by_id(pool, event_id).await?;
    registration::evaluate_disqualification(&event, pool).await?;
    let team_registrations = db::registration::summaries_for_event(pool, event_id).await?;
    let individual_registrations =
        db::registration::individuals_for_event(pool, event_id).await?;
    Ok(AdminRegistrationsView {
        event,
        team_registrations,
        individual_registrations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dto(start_offset: i64, end_offset: i64, deadline_offset: i64) -> NewEventDto {
        let base = Utc::now();
        NewEventDto {
            title: "AI Workshop".to_string(),
            description: "hands-on intro".to_string(),
            event_type: "workshop".to_string(),
            start_date: base + Duration::hours(start_offset),
            end_date: base + Duration::hours(end_offset),
            venue: None,
            virtual_link: None,
            max_participants: None,
            min_team_size: 1,
            max_team_size: 5,
            registration_deadline: base + Duration::hours(deadline_offset),
            rules: None,
            prizes: None,
        }
    }

    fn event_at(start: i64, end: i64) -> Event {
        let base = Utc::now();
        Event {
            id: Uuid::new_v4(),
            title: "e".to_string(),
            description: "d".to_string(),
            event_type: "seminar".to_string(),
            start_date: base + Duration::hours(start),
            end_date: base + Duration::hours(end),
            venue: None,
            virtual_link: None,
            max_participants: None,
            min_team_size: 1,
            max_team_size: 5,
            registration_deadline: base + Duration::hours(start),
            rules: None,
            prizes: None,
            is_active: true,
            created_at: base,
            creator_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn window_must_be_ordered() {
        assert!(check_event_window(&dto(1, 10, 0)).is_ok());
        assert_eq!(check_event_window(&dto(10, 1, 0)), Err(AppError::InvalidState));
        // deadline after start is rejected
        assert_eq!(check_event_window(&dto(1, 10, 5)), Err(AppError::InvalidState));
    }

    #[test]
    fn team_size_bounds_must_be_sane() {
        let mut d = dto(1, 10, 0);
        d.min_team_size = 4;
        d.max_team_size = 2;
        assert_eq!(check_event_window(&d), Err(AppError::TeamSizeOutOfRange));
        d.min_team_size = 0;
        assert_eq!(check_event_window(&d), Err(AppError::TeamSizeOutOfRange));
    }

    #[test]
    fn events_split_into_upcoming_ongoing_past() {
        let now = Utc::now();
        let view = categorize(
            vec![event_at(1, 2), event_at(-1, 1), event_at(-3, -2)],
            now,
        );
        assert_eq!(view.upcoming.len(), 1);
        assert_eq!(view.ongoing.len(), 1);
        assert_eq!(view.past.len(), 1);
    }
}
