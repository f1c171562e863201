use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use api::jwt::{JwtConfig, JwtService};
use api::repositories::UserRepository;
use api::repositories::label::{LabelKind, LabelRepository};
use api::repositories::recipe::RecipeRepository;
use api::routes;
use api::state::AppState;
use api::storage::ImageStore;
use common::database::{DatabaseConfig, health_check, init_pool};
use common::error::DatabaseError;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting recipe API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    info!("Database migrations applied");

    // Initialize JWT service
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(&jwt_config);

    // Initialize repositories
    let user_repository = UserRepository::new(pool.clone());
    let recipe_repository = RecipeRepository::new(pool.clone());
    let tag_repository = LabelRepository::new(pool.clone(), LabelKind::Tag);
    let ingredient_repository = LabelRepository::new(pool, LabelKind::Ingredient);
    let image_store = ImageStore::from_env();

    let app_state = AppState {
        jwt_service,
        user_repository,
        recipe_repository,
        tag_repository,
        ingredient_repository,
        image_store,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
    info!("Recipe API service listening on 0.0.0.0:8000");

    axum::serve(listener, app).await?;

    Ok(())
}
