use dotenvy::dotenv;
use std::sync::Arc;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;

use application::{AuthService, BlogService};
use data::{
    InMemoryStore, PostRepository, PostgresPostRepository, PostgresUserRepository,
    UserRepository,
};
use infrastructure::{
    config::AppConfig,
    database::{create_pool, run_migrations},
    jwt::JwtService,
    logging::init_logging,
};
use presentation::{middleware::load_logged_in_user, routes};

type Repositories = (
    Arc<dyn PostRepository + Send + Sync>,
    Arc<dyn UserRepository + Send + Sync>,
);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    init_logging()?;

    let config = AppConfig::from_env()?;

    tracing::info!("Starting blog server...");
    tracing::info!("HTTP server will listen on {}", config.http_addr());

    let (post_repo, user_repo) = init_repositories(&config).await?;

    tracing::info!("Initializing services...");

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt_secret,
        config.session_ttl_hours,
    )?);
    let auth_service = Arc::new(AuthService::new(user_repo, jwt_service));
    let blog_service = Arc::new(BlogService::new(post_repo));

    tracing::info!("Services initialized successfully");

    run_http_server(config.http_addr(), auth_service, blog_service).await?;

    tracing::info!("Shutting down...");
    Ok(())
}

async fn init_repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
    match &config.database {
        Some(database) => {
            tracing::info!("Connecting to database...");
            let pool = create_pool(database).await?;

            tracing::info!("Running database migrations...");
            run_migrations(&pool).await?;

            let post_repo: Arc<dyn PostRepository + Send + Sync> =
                Arc::new(PostgresPostRepository::new(pool.clone()));
            let user_repo: Arc<dyn UserRepository + Send + Sync> =
                Arc::new(PostgresUserRepository::new(pool));
            Ok((post_repo, user_repo))
        }
        None => {
            tracing::warn!("DATABASE_URL not set. Running with in-memory storage.");
            let store = Arc::new(InMemoryStore::new());
            let post_repo: Arc<dyn PostRepository + Send + Sync> = store.clone();
            let user_repo: Arc<dyn UserRepository + Send + Sync> = store;
            Ok((post_repo, user_repo))
        }
    }
}

async fn run_http_server(
    addr: String,
    auth_service: Arc<AuthService>,
    blog_service: Arc<BlogService>,
) -> anyhow::Result<()> {
    use actix_web::{
        middleware::{from_fn, Logger},
        web, App, HttpServer,
    };

    tracing::info!("Configuring HTTP server...");

    let server = HttpServer::new(move || {
        App::new()
            .wrap(from_fn(load_logged_in_user))
            .wrap(Logger::default())
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(blog_service.clone()))
            .configure(routes::configure)
    })
    .bind(&addr)?
    .run();

    tracing::info!("HTTP server running on {}", addr);

    server.await?;

    Ok(())
}
