use actix_web::{
    error,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use derive_more::{Display, Error};
use log::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum AppError {
    #[display(fmt = "access denied")]
    AccessDenied,

    #[display(fmt = "not found")]
    NotFound,

    #[display(fmt = "already exists")]
    AlreadyExists,

    #[display(fmt = "already registered for this event")]
    AlreadyRegistered,

    #[display(fmt = "already a member of a team for this event")]
    AlreadyMember,

    #[display(fmt = "already responded")]
    AlreadyResponded,

    #[display(fmt = "registration deadline has passed")]
    DeadlinePassed,

    #[display(fmt = "invitation has expired")]
    Expired,

    #[display(fmt = "team size is out of range")]
    TeamSizeOutOfRange,

    #[display(fmt = "operation not allowed in the current state")]
    InvalidState,

    #[display(fmt = "not a team member, or leaders must transfer or unregister instead")]
    NotAMemberOrLeader,

    #[display(fmt = "conflicting concurrent update")]
    Conflict,

    #[display(fmt = "internal error")]
    Internal,
}

impl error::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(serde_json::json!({ "error": self.to_string() }))
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyExists
            | AppError::AlreadyRegistered
            | AppError::AlreadyMember
            | AppError::AlreadyResponded
            | AppError::Conflict
            | AppError::InvalidState => StatusCode::CONFLICT,
            AppError::DeadlinePassed
            | AppError::TeamSizeOutOfRange
            | AppError::NotAMemberOrLeader => StatusCode::BAD_REQUEST,
            AppError::Expired => StatusCode::GONE,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Conflict,
            _ => {
                error!("database error: {:?}", err);
                AppError::Internal
            }
        }
    }
}
