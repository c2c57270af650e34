mod unit_access_policy;
mod unit_io_path_verification;
mod unit_markup_renderer;

use crate::AppState;
use crate::config::{CmsConfig, DEFAULT_PAGE_PATH_REGEX};
use crate::database::UserRepository;
use crate::database::sqlite::SqliteRepository;
use crate::domain::access::CHANGE_PAGE;
use crate::domain::{Page, PageStatus};
use axum::body::Body;
use axum::http::{Request, Response};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

// a fresh in-memory database with the real schema
pub async fn setup_test_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub fn test_config(media_root: &Path) -> CmsConfig {
    CmsConfig {
        database_url: "sqlite::memory:".into(),
        max_connections: 1,
        bind_addr: "127.0.0.1:0".into(),
        languages: vec!["en".into(), "ja".into()],
        default_language: "en".into(),
        language_cookie_name: "cms_language".into(),
        page_path_regex: DEFAULT_PAGE_PATH_REGEX.into(),
        debug: false,
        markup_backend: "markdown".into(),
        use_x_accel_redirect: false,
        media_root: media_root.to_path_buf(),
        media_url: "/media/".into(),
        login_url: "/accounts/login/".into(),
    }
}

pub struct TestApp {
    pub state: AppState,
    pub repo: SqliteRepository,
    // dropped with the app, removing uploaded files
    pub media: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut CmsConfig)) -> Self {
        let media = TempDir::new().expect("Failed to create media root");
        let mut config = test_config(media.path());
        adjust(&mut config);

        let pool = setup_test_pool().await;
        let state = AppState::new(pool.clone(), Arc::new(config)).expect("Failed to build state");

        Self {
            state,
            repo: SqliteRepository::new(pool),
            media,
        }
    }

    /// Saves a page through the validating service, the way editors do.
    pub async fn create_page(
        &self,
        content: &str,
        path: &str,
        language: &str,
        status: PageStatus,
    ) -> Page {
        let mut page = Page::new(path, language, content);
        page.status = status;
        self.state
            .pages
            .save(&mut page)
            .await
            .expect("Should save page");
        page
    }

    /// Registers a user holding `change_page` and returns their session token.
    pub async fn login_as_page_editor(&self) -> String {
        self.login_as("user1", "editor-token", &[CHANGE_PAGE]).await
    }

    pub async fn login_as(&self, username: &str, token: &str, permissions: &[&str]) -> String {
        let user_id = self
            .repo
            .create_user(username, Some(token), false)
            .await
            .expect("Should create user");
        for permission in permissions {
            self.repo
                .grant_permission(user_id, permission)
                .await
                .expect("Should grant permission");
        }
        token.to_string()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        crate::build_router(self.state.clone())
            .oneshot(request)
            .await
            .expect("Router should not fail")
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Should read body");
    serde_json::from_slice(&body).expect("Body should be JSON")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Should read body")
        .to_vec()
}
