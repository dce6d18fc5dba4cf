pub mod achievement;
pub mod announcement;
pub mod event;
pub mod forum;
pub mod notification;
pub mod registration;
pub mod team;
pub mod user;

use crate::PGPool;
use log::info;
use sqlx::postgres::PgPoolOptions;

pub async fn init_db_pool(db_url: &str) -> PGPool {
    let pool: PGPool = PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .expect("failed to connect to postgres");
    info!("connected to postgres");
    pool
}
