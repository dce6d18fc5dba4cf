use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{
    ForumCategory, ForumComment, ForumCommentVote, ForumPost, ForumVote, VoteType,
};

pub async fn categories(ex: impl PgExecutor<'_>) -> Result<Vec<ForumCategory>, sqlx::Error> {
    sqlx::query_as::<_, ForumCategory>("SELECT * FROM forum_categories ORDER BY name")
        .fetch_all(ex)
        .await
}

pub async fn category_by_id(
    ex: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<ForumCategory, sqlx::Error> {
    sqlx::query_as::<_, ForumCategory>("SELECT * FROM forum_categories WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
}

pub async fn insert_category(
    ex: impl PgExecutor<'_>,
    category: &ForumCategory,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO forum_categories (id, name, description, icon, color, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.description)
    .bind(&category.icon)
    .bind(&category.color)
    .bind(category.created_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn insert_post(ex: impl PgExecutor<'_>, post: &ForumPost) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO forum_posts (id, title, content, tags, is_pinned, is_solved, views, upvotes,
                                  downvotes, created_at, updated_at, author_id, category_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(post.id)
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.tags)
    .bind(post.is_pinned)
    .bind(post.is_solved)
    .bind(post.views)
    .bind(post.upvotes)
    .bind(post.downvotes)
    .bind(post.created_at)
    .bind(post.updated_at)
    .bind(post.author_id)
    .bind(post.category_id)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn post_by_id(ex: impl PgExecutor<'_>, id: Uuid) -> Result<ForumPost, sqlx::Error> {
    sqlx::query_as::<_, ForumPost>("SELECT * FROM forum_posts WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
}

pub async fn record_view(ex: impl PgExecutor<'_>, id: Uuid) -> Result<ForumPost, sqlx::Error> {
    sqlx::query_as::<_, ForumPost>(
        "UPDATE forum_posts SET views = views + 1 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(ex)
    .await
}

pub async fn posts_by_category(
    ex: impl PgExecutor<'_>,
    category_id: Uuid,
) -> Result<Vec<ForumPost>, sqlx::Error> {
    sqlx::query_as::<_, ForumPost>(
        "SELECT * FROM forum_posts
         WHERE category_id = $1
         ORDER BY is_pinned DESC, created_at DESC",
    )
    .bind(category_id)
    .fetch_all(ex)
    .await
}

pub async fn recent_posts(
    ex: impl PgExecutor<'_>,
    limit: i64,
) -> Result<Vec<ForumPost>, sqlx::Error> {
    sqlx::query_as::<_, ForumPost>("SELECT * FROM forum_posts ORDER BY created_at DESC LIMIT $1")
        .bind(limit)
        .fetch_all(ex)
        .await
}

pub async fn trending_posts(
    ex: impl PgExecutor<'_>,
    limit: i64,
) -> Result<Vec<ForumPost>, sqlx::Error> {
    sqlx::query_as::<_, ForumPost>("SELECT * FROM forum_posts ORDER BY views DESC LIMIT $1")
        .bind(limit)
        .fetch_all(ex)
        .await
}

pub async fn active_author_count(
    ex: impl PgExecutor<'_>,
    since: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT author_id) FROM forum_posts WHERE created_at >= $1",
    )
    .bind(since)
    .fetch_one(ex)
    .await
}

pub async fn post_count_by_author(
    ex: impl PgExecutor<'_>,
    author_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM forum_posts WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(ex)
        .await
}

pub async fn insert_comment(
    ex: impl PgExecutor<'_>,
    comment: &ForumComment,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO forum_comments (id, content, is_accepted, upvotes, downvotes, created_at,
                                     post_id, author_id, parent_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(comment.id)
    .bind(&comment.content)
    .bind(comment.is_accepted)
    .bind(comment.upvotes)
    .bind(comment.downvotes)
    .bind(comment.created_at)
    .bind(comment.post_id)
    .bind(comment.author_id)
    .bind(comment.parent_id)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn comment_by_id(
    ex: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<ForumComment, sqlx::Error> {
    sqlx::query_as::<_, ForumComment>("SELECT * FROM forum_comments WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
}

pub async fn comments_for_post(
    ex: impl PgExecutor<'_>,
    post_id: Uuid,
) -> Result<Vec<ForumComment>, sqlx::Error> {
    sqlx::query_as::<_, ForumComment>(
        "SELECT * FROM forum_comments WHERE post_id = $1 ORDER BY created_at",
    )
    .bind(post_id)
    .fetch_all(ex)
    .await
}

// votes and replies go with it via FK cascade
pub async fn delete_comment(ex: impl PgExecutor<'_>, id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM forum_comments WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

pub async fn post_vote(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    post_id: Uuid,
) -> Result<Option<ForumVote>, sqlx::Error> {
    sqlx::query_as::<_, ForumVote>(
        "SELECT * FROM forum_votes WHERE user_id = $1 AND post_id = $2",
    )
    .bind(user_id)
    .bind(post_id)
    .fetch_optional(ex)
    .await
}

pub async fn insert_post_vote(
    ex: impl PgExecutor<'_>,
    vote: &ForumVote,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO forum_votes (id, user_id, post_id, vote_type, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(vote.id)
    .bind(vote.user_id)
    .bind(vote.post_id)
    .bind(vote.vote_type)
    .bind(vote.created_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn delete_post_vote(ex: impl PgExecutor<'_>, id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM forum_votes WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

pub async fn update_post_vote(
    ex: impl PgExecutor<'_>,
    id: Uuid,
    vote_type: VoteType,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE forum_votes SET vote_type = $2 WHERE id = $1")
        .bind(id)
        .bind(vote_type)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

pub async fn apply_post_counters(
    ex: impl PgExecutor<'_>,
    post_id: Uuid,
    up_delta: i32,
    down_delta: i32,
) -> Result<(i32, i32), sqlx::Error> {
    sqlx::query_as::<_, (i32, i32)>(
        "UPDATE forum_posts SET upvotes = upvotes + $2, downvotes = downvotes + $3
         WHERE id = $1
         RETURNING upvotes, downvotes",
    )
    .bind(post_id)
    .bind(up_delta)
    .bind(down_delta)
    .fetch_one(ex)
    .await
}

pub async fn comment_vote(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    comment_id: Uuid,
) -> Result<Option<ForumCommentVote>, sqlx::Error> {
    sqlx::query_as::<_, ForumCommentVote>(
        "SELECT * FROM forum_comment_votes WHERE user_id = $1 AND comment_id = $2",
    )
    .bind(user_id)
    .bind(comment_id)
    .fetch_optional(ex)
    .await
}

pub async fn insert_comment_vote(
    ex: impl PgExecutor<'_>,
    vote: &ForumCommentVote,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO forum_comment_votes (id, user_id, comment_id, vote_type, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(vote.id)
    .bind(vote.user_id)
    .bind(vote.comment_id)
    .bind(vote.vote_type)
    .bind(vote.created_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn delete_comment_vote(ex: impl PgExecutor<'_>, id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM forum_comment_votes WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

pub async fn update_comment_vote(
    ex: impl PgExecutor<'_>,
    id: Uuid,
    vote_type: VoteType,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE forum_comment_votes SET vote_type = $2 WHERE id = $1")
        .bind(id)
        .bind(vote_type)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

pub async fn apply_comment_counters(
    ex: impl PgExecutor<'_>,
    comment_id: Uuid,
    up_delta: i32,
    down_delta: i32,
) -> Result<(i32, i32), sqlx::Error> {
    sqlx::query_as::<_, (i32, i32)>(
        "UPDATE forum_comments SET upvotes = upvotes + $2, downvotes = downvotes + $3
         WHERE id = $1
         RETURNING upvotes, downvotes",
    )
    .bind(comment_id)
    .bind(up_delta)
    .bind(down_delta)
    .fetch_one(ex)
    .await
}
