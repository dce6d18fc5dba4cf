use std::collections::{HashMap, HashSet};

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::db;
use crate::dto::{
    CommentNode, ForumIndexView, NewCommentDto, NewForumCategoryDto, NewForumPostDto,
    PostDetailView, VoteCounters,
};
use crate::errors::AppError;
use crate::models::{
    ForumCategory, ForumComment, ForumCommentVote, ForumPost, ForumVote, VoteType,
};
use crate::service::identity::CurrentUser;
use crate::PGPool;

const RECENT_POST_LIMIT: i64 = 10;
const ACTIVE_MEMBER_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Insert,
    Remove,
    Flip,
}

/// One vote row per (user, target): voting the same way again removes the
/// vote, voting the other way flips it.
pub fn plan_vote(existing: Option<VoteType>, requested: VoteType) -> VoteAction {
    match existing {
        None => VoteAction::Insert,
        Some(current) if current == requested => VoteAction::Remove,
        Some(_) => VoteAction::Flip,
    }
}

/// (upvotes, downvotes) adjustment for the denormalized counters. There is
/// no floor at zero; the counters mirror whatever sequence of actions ran.
pub fn counter_deltas(action: VoteAction, requested: VoteType) -> (i32, i32) {
    match (action, requested) {
        (VoteAction::Insert, VoteType::Upvote) => (1, 0),
        (VoteAction::Insert, VoteType::Downvote) => (0, 1),
        (VoteAction::Remove, VoteType::Upvote) => (-1, 0),
        (VoteAction::Remove, VoteType::Downvote) => (0, -1),
        (VoteAction::Flip, VoteType::Upvote) => (1, -1),
        (VoteAction::Flip, VoteType::Downvote) => (-1, 1),
    }
}

pub fn can_delete_comment(requester: &CurrentUser, comment: &ForumComment) -> bool {
    requester.is_admin || comment.author_id == requester.user_id
}

/// Rebuilds the reply tree by grouping comments by parent id. Input order is
/// preserved, so callers that fetch in created_at order get chronological
/// threads at every level.
pub fn build_comment_tree(comments: Vec<ForumComment>) -> Vec<CommentNode> {
    let ids: HashSet<Uuid> = comments.iter().map(|c| c.id).collect();
    let mut children: HashMap<Uuid, Vec<ForumComment>> = HashMap::new();
    let mut roots: Vec<ForumComment> = Vec::new();
    for comment in comments {
        match comment.parent_id {
            Some(parent_id) if ids.contains(&parent_id) => {
                children.entry(parent_id).or_default().push(comment)
            }
            _ => roots.push(comment),
        }
    }
    roots
        .into_iter()
        .map(|comment| attach_replies(comment, &mut children))
        .collect()
}

fn attach_replies(
    comment: ForumComment,
    children: &mut HashMap<Uuid, Vec<ForumComment>>,
) -> CommentNode {
    let replies = children
        .remove(&comment.id)
        .unwrap_or_default()
        .into_iter()
        .map(|reply| attach_replies(reply, children))
        .collect();
    CommentNode { comment, replies }
}

pub async fn index(pool: &PGPool) -> Result<ForumIndexView, AppError> {
    let since = Utc::now() - Duration::days(ACTIVE_MEMBER_WINDOW_DAYS);
    let categories = db::forum::categories(pool).await?;
    let recent_posts = db::forum::recent_posts(pool, RECENT_POST_LIMIT).await?;
    let active_members = db::forum::active_author_count(pool, since).await?;
    Ok(ForumIndexView {
        categories,
        recent_posts,
        active_members,
    })
}

pub async fn create_category(
    user: &CurrentUser,
    dto: NewForumCategoryDto,
    pool: &PGPool,
) -> Result<ForumCategory, AppError> {
    user.require_admin()?;
    let category = ForumCategory {
        id: Uuid::new_v4(),
        name: dto.name,
        description: dto.description,
        icon: dto.icon,
        color: dto.color,
        created_at: Utc::now(),
    };
    db::forum::insert_category(pool, &category).await?;
    Ok(category)
}

pub async fn create_post(
    user: &CurrentUser,
    dto: NewForumPostDto,
    pool: &PGPool,
) -> Result<ForumPost, AppError> {
    let _category = db::forum::category_by_id(pool, dto.category_id).await?;
    let now = Utc::now();
    let post = ForumPost {
        id: Uuid::new_v4(),
        title: dto.title,
        content: dto.content,
        tags: dto.tags,
        is_pinned: false,
        is_solved: false,
        views: 0,
        upvotes: 0,
        downvotes: 0,
        created_at: now,
        updated_at: now,
        author_id: user.user_id,
        category_id: dto.category_id,
    };
    db::forum::insert_post(pool, &post).await?;
    Ok(post)
}

pub async fn post_detail(post_id: Uuid, pool: &PGPool) -> Result<PostDetailView, AppError> {
    let post = db::forum::record_view(pool, post_id).await?;
    let comments = db::forum::comments_for_post(pool, post_id).await?;
    Ok(PostDetailView {
        post,
        comments: build_comment_tree(comments),
    })
}

pub async fn posts_by_category(
    category_id: Uuid,
    pool: &PGPool,
) -> Result<(ForumCategory, Vec<ForumPost>), AppError> {
    let category = db::forum::category_by_id(pool, category_id).await?;
    let posts = db::forum::posts_by_category(pool, category_id).await?;
    Ok((category, posts))
}

pub async fn add_comment(
    user: &CurrentUser,
    post_id: Uuid,
    dto: NewCommentDto,
    pool: &PGPool,
) -> Result<ForumComment, AppError> {
    let post = db::forum::post_by_id(pool, post_id).await?;
    if let Some(parent_id) = dto.parent_id {
        let parent = db::forum::comment_by_id(pool, parent_id).await?;
        if parent.post_id != post.id {
            return Err(AppError::InvalidState);
        }
    }
    let comment = ForumComment {
        id: Uuid::new_v4(),
        content: dto.content,
        is_accepted: false,
        upvotes: 0,
        downvotes: 0,
        created_at: Utc::now(),
        post_id: post.id,
        author_id: user.user_id,
        parent_id: dto.parent_id,
    };
    db::forum::insert_comment(pool, &comment).await?;
    Ok(comment)
}

pub async fn delete_comment(
    user: &CurrentUser,
    comment_id: Uuid,
    pool: &PGPool,
) -> Result<(), AppError> {
    let comment = db::forum::comment_by_id(pool, comment_id).await?;
    if !can_delete_comment(user, &comment) {
        return Err(AppError::AccessDenied);
    }
    db::forum::delete_comment(pool, comment.id).await?;
    Ok(())
}

pub async fn vote_post(
    user: &CurrentUser,
    post_id: Uuid,
    requested: VoteType,
    pool: &PGPool,
) -> Result<VoteCounters, AppError> {
    let post = db::forum::post_by_id(pool, post_id).await?;
    let existing = db::forum::post_vote(pool, user.user_id, post.id).await?;
    let action = plan_vote(existing.as_ref().map(|v| v.vote_type), requested);
    let (up, down) = counter_deltas(action, requested);

    let mut tx = pool.begin().await.map_err(AppError::from)?;
    match existing {
        None => {
            let vote = ForumVote {
                id: Uuid::new_v4(),
                user_id: user.user_id,
                post_id: post.id,
                vote_type: requested,
                created_at: Utc::now(),
            };
            db::forum::insert_post_vote(&mut *tx, &vote).await?;
        }
        Some(vote) if action == VoteAction::Remove => {
            db::forum::delete_post_vote(&mut *tx, vote.id).await?;
        }
        Some(vote) => {
            db::forum::update_post_vote(&mut *tx, vote.id, requested).await?;
        }
    }
    let (upvotes, downvotes) = db::forum::apply_post_counters(&mut *tx, post.id, up, down).await?;
    tx.commit().await.map_err(AppError::from)?;

    Ok(VoteCounters { upvotes, downvotes })
}

pub async fn vote_comment(
    user: &CurrentUser,
    comment_id: Uuid,
    requested: VoteType,
    pool: &PGPool,
) -> Result<VoteCounters, AppError> {
    let comment = db::forum::comment_by_id(pool, comment_id).await?;
    let existing = db::forum::comment_vote(pool, user.user_id, comment.id).await?;
    let action = plan_vote(existing.as_ref().map(|v| v.vote_type), requested);
    let (up, down) = counter_deltas(action, requested);

    let mut tx = pool.begin().await.map_err(AppError::from)?;
    match existing {
        None => {
            let vote = ForumCommentVote {
                id: Uuid::new_v4(),
                user_id: user.user_id,
                comment_id: comment.id,
                vote_type: requested,
                created_at: Utc::now(),
            };
            db::forum::insert_comment_vote(&mut *tx, &vote).await?;
        }
        Some(vote) if action == VoteAction::Remove => {
            db::forum::delete_comment_vote(&mut *tx, vote.id).await?;
        }
        Some(vote) => {
            db::forum::update_comment_vote(&mut *tx, vote.id, requested).await?;
        }
    }
    let (upvotes, downvotes) =
        db::forum::apply_comment_counters(&mut *tx, comment.id, up, down).await?;
    tx.commit().await.map_err(AppError::from)?;

    Ok(VoteCounters { upvotes, downvotes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn comment(id: Uuid, parent_id: Option<Uuid>, created_at: DateTime<Utc>) -> ForumComment {
        ForumComment {
            id,
            content: "text".to_string(),
            is_accepted: false,
            upvotes: 0,
            downvotes: 0,
            created_at,
            post_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            parent_id,
        }
    }

    fn user(id: Uuid, is_admin: bool) -> CurrentUser {
        CurrentUser {
            user_id: id,
            username: "u".to_string(),
            is_admin,
        }
    }

    #[test]
    fn first_vote_inserts() {
        assert_eq!(plan_vote(None, VoteType::Upvote), VoteAction::Insert);
        assert_eq!(counter_deltas(VoteAction::Insert, VoteType::Upvote), (1, 0));
    }

    #[test]
    fn repeating_a_vote_toggles_it_off() {
        let action = plan_vote(Some(VoteType::Upvote), VoteType::Upvote);
        assert_eq!(action, VoteAction::Remove);
        assert_eq!(counter_deltas(action, VoteType::Upvote), (-1, 0));
    }

    #[test]
    fn vote_toggle_is_its_own_inverse() {
        // up then up again nets out to zero on both counters
        let first = counter_deltas(plan_vote(None, VoteType::Upvote), VoteType::Upvote);
        let second = counter_deltas(
            plan_vote(Some(VoteType::Upvote), VoteType::Upvote),
            VoteType::Upvote,
        );
        assert_eq!((first.0 + second.0, first.1 + second.1), (0, 0));
    }

    #[test]
    fn opposite_vote_flips_both_counters() {
        let action = plan_vote(Some(VoteType::Upvote), VoteType::Downvote);
        assert_eq!(action, VoteAction::Flip);
        assert_eq!(counter_deltas(action, VoteType::Downvote), (-1, 1));
        assert_eq!(
            counter_deltas(
                plan_vote(Some(VoteType::Downvote), VoteType::Upvote),
                VoteType::Upvote
            ),
            (1, -1)
        );
    }

    #[test]
    fn tree_groups_replies_under_their_parent() {
        let now = Utc::now();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let reply_a1 = Uuid::new_v4();
        let reply_a2 = Uuid::new_v4();
        let tree = build_comment_tree(vec![
            comment(a, None, now),
            comment(reply_a1, Some(a), now + Duration::minutes(1)),
            comment(b, None, now + Duration::minutes(2)),
            comment(reply_a2, Some(a), now + Duration::minutes(3)),
        ]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].comment.id, a);
        assert_eq!(tree[0].replies.len(), 2);
        assert_eq!(tree[0].replies[0].comment.id, reply_a1);
        assert_eq!(tree[0].replies[1].comment.id, reply_a2);
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn tree_supports_arbitrary_depth() {
        let now = Utc::now();
        let root = Uuid::new_v4();
        let child = Uuid::new_v4();
        let grandchild = Uuid::new_v4();
        let tree = build_comment_tree(vec![
            comment(root, None, now),
            comment(child, Some(root), now),
            comment(grandchild, Some(child), now),
        ]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].replies[0].replies[0].comment.id, grandchild);
    }

    #[test]
    fn unknown_parent_surfaces_as_a_root() {
        let now = Utc::now();
        let orphan = Uuid::new_v4();
        let tree = build_comment_tree(vec![comment(orphan, Some(Uuid::new_v4()), now)]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].comment.id, orphan);
    }

    #[test]
    fn author_and_admin_may_delete() {
        let author = Uuid::new_v4();
        let c = comment(Uuid::new_v4(), None, Utc::now());
        let mut owned = c.clone();
        owned.author_id = author;
        assert!(can_delete_comment(&user(author, false), &owned));
        assert!(can_delete_comment(&user(Uuid::new_v4(), true), &owned));
        assert!(!can_delete_comment(&user(Uuid::new_v4(), false), &owned));
    }
}
