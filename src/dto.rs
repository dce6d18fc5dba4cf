use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::models::{
    Announcement, Event, EventRegistration, EventTeamRegistration, ForumCategory, ForumComment,
    ForumPost, InvitationStatus, Notification, Priority, ReactionType, TeamJoinRequest,
    TeamMessage, TeamRole, User, VoteType,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub exp: usize,
}

impl Claims {
    pub fn new(user_id: Uuid, username: &str, is_admin: bool, exp: usize) -> Self {
        Self {
            sub: user_id,
            username: username.to_string(),
            is_admin,
            exp,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewUserDto {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpdateProfileDto {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewEventDto {
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub venue: Option<String>,
    pub virtual_link: Option<String>,
    pub max_participants: Option<i32>,
    #[serde(default = "default_min_team_size")]
    pub min_team_size: i32,
    #[serde(default = "default_max_team_size")]
    pub max_team_size: i32,
    pub registration_deadline: DateTime<Utc>,
    pub rules: Option<String>,
    pub prizes: Option<String>,
}

fn default_min_team_size() -> i32 {
    1
}

fn default_max_team_size() -> i32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct EventListQuery {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndividualRegistrationDto {
    pub team_name: Option<String>,
    pub additional_info: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InviteeDto {
    pub email: String,
    #[serde(default)]
    pub skills: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegisterTeamDto {
    pub team_name: String,
    #[serde(default)]
    pub invitees: Vec<InviteeDto>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewTeamDto {
    pub name: String,
    pub description: Option<String>,
    pub project_idea: Option<String>,
    pub skills_needed: Option<String>,
    #[serde(default = "default_max_members")]
    pub max_members: i32,
}

fn default_max_members() -> i32 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct JoinTeamDto {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpdateRoleDto {
    pub role: TeamRole,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewTeamMessageDto {
    pub message: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewForumCategoryDto {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewForumPostDto {
    pub title: String,
    pub content: String,
    pub tags: Option<String>,
    pub category_id: Uuid,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewCommentDto {
    pub content: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VoteDto {
    pub vote_type: VoteType,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReactionDto {
    pub reaction_type: ReactionType,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewAnnouncementDto {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub is_pinned: bool,
}

fn default_priority() -> Priority {
    Priority::Normal
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnnouncementListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AwardAchievementDto {
    pub user_id: Uuid,
    pub achievement_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TeamRegistrationOutcome {
    pub registration_id: Uuid,
    pub invitations_sent: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EditRegistrationOutcome {
    pub registration_id: Uuid,
    pub members_added: usize,
    pub warnings: Vec<String>,
}

/// Invitation as stored, plus the status a reader should act on once
/// expiry is taken into account.
#[derive(Debug, Serialize)]
pub struct InvitationView {
    #[serde(flatten)]
    pub invitation: crate::models::EventTeamInvitation,
    pub effective_status: InvitationStatus,
}

#[derive(Debug, Serialize)]
pub struct EventListView {
    pub upcoming: Vec<Event>,
    pub ongoing: Vec<Event>,
    pub past: Vec<Event>,
}

#[derive(Debug, Serialize)]
pub struct EventDetailView {
    pub event: Event,
    pub registration_count: i64,
    pub is_registered: bool,
    pub team_registration: Option<EventTeamRegistration>,
    pub team_membership: Option<crate::models::EventTeamMember>,
    pub pending_invitations: Vec<InvitationView>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TeamRegistrationSummary {
    #[sqlx(flatten)]
    pub registration: EventTeamRegistration,
    pub member_count: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminRegistrationsView {
    pub event: Event,
    pub team_registrations: Vec<TeamRegistrationSummary>,
    pub individual_registrations: Vec<EventRegistration>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TeamMemberView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
    pub username: String,
    pub full_name: String,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TeamListItem {
    #[sqlx(flatten)]
    pub team: crate::models::Team,
    pub member_count: i64,
}

#[derive(Debug, Serialize)]
pub struct TeamDetailView {
    pub team: crate::models::Team,
    pub members: Vec<TeamMemberView>,
    pub is_member: bool,
    pub pending_request: Option<TeamJoinRequest>,
    pub join_requests: Vec<TeamJoinRequest>,
    pub messages: Vec<TeamMessage>,
}

#[derive(Debug, Serialize)]
pub struct ForumIndexView {
    pub categories: Vec<ForumCategory>,
    pub recent_posts: Vec<ForumPost>,
    pub active_members: i64,
}

#[derive(Debug, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: ForumComment,
    pub replies: Vec<CommentNode>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailView {
    pub post: ForumPost,
    pub comments: Vec<CommentNode>,
}

#[derive(Debug, Serialize)]
pub struct VoteCounters {
    pub upvotes: i32,
    pub downvotes: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionAction {
    Added,
    Updated,
    Removed,
}

#[derive(Debug, Serialize)]
pub struct ReactionOutcome {
    pub action: ReactionAction,
}

#[derive(Debug, Serialize)]
pub struct AnnouncementListView {
    pub announcements: Vec<Announcement>,
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub user: User,
    pub achievements: Vec<crate::models::Achievement>,
    pub post_count: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub upcoming_events: Vec<Event>,
    pub recent_announcements: Vec<Announcement>,
    pub trending_posts: Vec<ForumPost>,
    pub unread_notifications: Vec<Notification>,
}
