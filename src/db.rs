use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use tracing::info;

use crate::config::AppConfig;
use crate::food::FoodDatabase;
use crate::profile_store::ProfileStore;

pub type DbPool = SqlitePool;

/// Everything a command needs: storage handles plus configuration
pub struct AppState {
  pub db: DbPool,
  pub profiles: ProfileStore,
  pub foods: FoodDatabase,
  pub config: AppConfig,
}

impl AppState {
  pub async fn open(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
    let db = initialize_db(&config).await?;
    let profiles = ProfileStore::new(config.profile_path());
    let foods = FoodDatabase::load_or_builtin(&config.food_db_path);
    Ok(Self {
      db,
      profiles,
      foods,
      config,
    })
  }
}

/// Initialize the database connection pool and run migrations
/// Stored in: <data_dir>/gymrat.db
pub async fn initialize_db(config: &AppConfig) -> Result<DbPool, Box<dyn std::error::Error>> {
  // Create directory if it doesn't exist
  fs::create_dir_all(&config.data_dir)?;

  let db_path = config.db_path();
  let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

  info!(path = %db_path.display(), "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}
