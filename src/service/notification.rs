use chrono::Utc;
use log::warn;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::Notification;
use crate::service::identity::CurrentUser;
use crate::PGPool;

/// A notification waiting to be delivered once the operation that produced
/// it has committed.
#[derive(Debug, Clone)]
pub struct Notice {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub action_url: Option<String>,
}

/// Fire-and-forget delivery: a failed insert is logged and dropped, it never
/// fails the operation that raised the notice.
pub async fn dispatch(pool: &PGPool, notices: Vec<Notice>) {
    for notice in notices {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: notice.user_id,
            title: notice.title,
            message: notice.message,
            notification_type: notice.kind,
            is_read: false,
            action_url: notice.action_url,
            created_at: Utc::now(),
        };
        if let Err(err) = db::notification::insert(pool, &notification).await {
            warn!(
                "dropping notification for user {}: {:?}",
                notification.user_id, err
            );
        }
    }
}

pub async fn notify(pool: &PGPool, notice: Notice) {
    dispatch(pool, vec![notice]).await;
}

pub async fn list(
    user: &CurrentUser,
    unread_only: bool,
    pool: &PGPool,
) -> Result<Vec<Notification>, AppError> {
    db::notification::list_for_user(pool, user.user_id, unread_only)
        .await
        .map_err(AppError::from)
}

pub async fn mark_read(
    user: &CurrentUser,
    notification_id: Uuid,
    pool: &PGPool,
) -> Result<(), AppError> {
    let updated = db::notification::mark_read(pool, notification_id, user.user_id).await?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
