pub mod db;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod service;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use sqlx::{postgres::Postgres, Pool};
use std::env;

use db::init_db_pool;
use service::identity::Identity;
use service::log::RequestLogger;

pub type PGPool = Pool<Postgres>;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    service::log::init_logger();

    let db_url = env::var("DATABASE_URL").unwrap_or_else(|e| {
        panic!("failed to get env with name 'DATABASE_URL': {:?}", e);
    });
    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|e| {
        panic!("failed to get env with name 'JWT_SECRET': {:?}", e);
    });
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    let pool: PGPool = init_db_pool(&db_url).await;
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("failed to run migrations");

    info!("listening on {}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(RequestLogger)
            .service(
                web::scope("/events")
                    .wrap(Identity::new(jwt_secret.as_bytes()))
                    .configure(handlers::event::init_routes),
            )
            .service(
                web::scope("/teams")
                    .wrap(Identity::new(jwt_secret.as_bytes()))
                    .configure(handlers::team::init_routes),
            )
            .service(
                web::scope("/forum")
                    .wrap(Identity::new(jwt_secret.as_bytes()))
                    .configure(handlers::forum::init_routes),
            )
            .service(
                web::scope("/announcements")
                    .wrap(Identity::new(jwt_secret.as_bytes()))
                    .configure(handlers::announcement::init_routes),
            )
            .service(
                web::scope("/notifications")
                    .wrap(Identity::new(jwt_secret.as_bytes()))
                    .configure(handlers::notification::init_routes),
            )
            .service(
                web::scope("/users")
                    .wrap(Identity::new(jwt_secret.as_bytes()))
                    .configure(handlers::user::init_routes),
            )
            .service(
                web::scope("/achievements")
                    .wrap(Identity::new(jwt_secret.as_bytes()))
                    .configure(handlers::user::init_achievement_routes),
            )
            .service(
                web::scope("/dashboard")
                    .wrap(Identity::new(jwt_secret.as_bytes()))
                    .configure(handlers::user::init_dashboard_routes),
            )
            .service(
                web::scope("/admin")
                    .wrap(Identity::new(jwt_secret.as_bytes()))
                    .configure(handlers::admin::init_routes),
            )
    })
    .bind(bind_addr.as_str())?
    .run()
    .await
}
