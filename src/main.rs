use crate::config::CmsConfig;
use crate::database::UserRepository;
use crate::database::sqlite::SqliteRepository;
use crate::features::pages::PageRoutes;
use crate::io::local::LocalFileStorage;
use crate::parser::Renderer;
use crate::services::{FileService, PageService};
use anyhow::Context;
use axum::Router;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub mod config;
mod database;
mod domain;
mod error;
mod features;
mod io;
mod parser;
mod services;

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct AppState {
    pub pages: Arc<PageService>,
    pub files: Arc<FileService>,
    pub users: Arc<dyn UserRepository>,
    pub routes: Arc<PageRoutes>,
    pub config: Arc<CmsConfig>,
}

impl AppState {
    /// Wires the SQLite-backed repositories, renderer and media storage together.
    pub fn new(pool: Pool<Sqlite>, config: Arc<CmsConfig>) -> anyhow::Result<Self> {
        let repo = SqliteRepository::new(pool);
        let renderer = Renderer::from_name(&config.markup_backend, config.debug);

        let pages = PageService::new(Box::new(repo.clone()), renderer, config.clone())?;
        let files = FileService::new(
            Box::new(repo.clone()),
            Box::new(LocalFileStorage::new(
                config.media_root.clone(),
                config.media_url.clone(),
            )),
            config.use_x_accel_redirect,
        );
        let routes = PageRoutes::new(&config.page_path_regex)
            .with_context(|| format!("Invalid PAGE_PATH_REGEX '{}'", config.page_path_regex))?;

        Ok(Self {
            pages: Arc::new(pages),
            files: Arc::new(files),
            users: Arc::new(repo),
            routes: Arc::new(routes),
            config,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(features::files::files_router())
        .merge(features::pages::pages_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // determine environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = CmsConfig::from_env()?;
    let shared_config = Arc::new(config.clone());

    // verify db exists
    if !Sqlite::database_exists(&config.database_url)
        .await
        .unwrap_or(false)
    {
        tracing::info!(
            "Unable to connect to database at {}, creating...",
            config.database_url
        );
        Sqlite::create_database(&config.database_url)
            .await
            .with_context(|| format!("Unable to create database at {}", config.database_url))?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to create pool on {}", config.database_url))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let app_state = AppState::new(pool, shared_config)?;
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        "Serving pages in [{}] on http://{}",
        config.languages.join(", "),
        config.bind_addr
    );

    axum::serve(listener, app).await?;

    Ok(())
}
