//! BK Server: application entry point.
//!
//! Connects to SurrealDB, applies pending migrations and, when
//! `BK_SEED_SCHOOL_ID` is set, seeds that school's default violation
//! categories.

use std::env;

use bk_core::models::caller::{Caller, StaffRole};
use bk_db::repository::SurrealViolationCategoryRepository;
use bk_db::{DbConfig, DbManager};
use bk_service::CategoryService;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bk=info".parse().unwrap()))
        .json()
        .init();

    tracing::info!("Starting BK server...");

    if let Err(e) = run().await {
        tracing::error!(error = %e, "BK server failed");
        std::process::exit(1);
    }

    tracing::info!("BK server stopped.");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = DbConfig::from_env();
    let manager = DbManager::connect(&config).await?;
    let db = manager.client().clone();

    bk_db::run_migrations(&db).await?;

    if let Ok(raw) = env::var("BK_SEED_SCHOOL_ID") {
        let school_id = Uuid::parse_str(raw.trim())?;
        let caller = Caller::new(school_id, Uuid::nil(), StaffRole::SuperAdmin);
        let categories = CategoryService::new(SurrealViolationCategoryRepository::new(db));
        let created = categories.initialize_defaults(&caller).await?;
        tracing::info!(
            school_id = %school_id,
            created = created.len(),
            "Seeded default violation categories"
        );
    }

    Ok(())
}
