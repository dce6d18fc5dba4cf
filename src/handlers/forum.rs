use actix_web::{delete, get, post, web, HttpResponse};
use uuid::Uuid;

use crate::dto::{NewCommentDto, NewForumPostDto, VoteDto};
use crate::errors::AppError;
use crate::service::forum;
use crate::service::identity::CurrentUser;
use crate::PGPool;

#[get("")]
pub async fn index(pool_state: web::Data<PGPool>) -> Result<HttpResponse, AppError> {
    let view = forum::index(pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[get("/categories/{id}/posts")]
pub async fn category_posts(
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let (category, posts) = forum::posts_by_category(id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "category": category,
        "posts": posts,
    })))
}

#[post("/posts")]
pub async fn create_post(
    user: CurrentUser,
    dto: web::Json<NewForumPostDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let post = forum::create_post(&user, dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Created().json(post))
}

#[get("/posts/{id}")]
pub async fn post_detail(
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let view = forum::post_detail(id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/posts/{id}/comments")]
pub async fn add_comment(
    user: CurrentUser,
    id: web::Path<Uuid>,
    dto: web::Json<NewCommentDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let comment =
        forum::add_comment(&user, id.into_inner(), dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Created().json(comment))
}

#[delete("/comments/{id}")]
pub async fn delete_comment(
    user: CurrentUser,
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    forum::delete_comment(&user, id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/posts/{id}/vote")]
pub async fn vote_post(
    user: CurrentUser,
    id: web::Path<Uuid>,
    dto: web::Json<VoteDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let counters =
        forum::vote_post(&user, id.into_inner(), dto.vote_type, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(counters))
}

#[post("/comments/{id}/vote")]
pub async fn vote_comment(
    user: CurrentUser,
    id: web::Path<Uuid>,
    dto: web::Json<VoteDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, AppError> {
    let counters =
        forum::vote_comment(&user, id.into_inner(), dto.vote_type, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(counters))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(category_posts)
        .service(create_post)
        .service(post_detail)
        .service(add_comment)
        .service(delete_comment)
        .service(vote_post)
        .service(vote_comment);
}
