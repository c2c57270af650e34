use crate::domain::{Page, PageRevision, StoredFile, User};
use anyhow::Result;
use async_trait::async_trait;

pub mod sqlite;

/// Raised by [`PageRepository::save_page`] when (path, language) is already taken.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("a page already exists for path '{path}' and language '{language}'")]
pub struct DuplicatePage {
    pub path: String,
    pub language: String,
}

// repositories are shared between request handlers; sqlx::Pool is thread safe
#[async_trait]
pub trait PageRepository: Send + Sync {
    async fn get_page(&self, id: i64) -> Result<Option<Page>>;
    async fn get_page_by_path_and_language(
        &self,
        path: &str,
        language: &str,
    ) -> Result<Option<Page>>;
    /// All languages at `path`, in insertion order.
    async fn get_pages_by_path(&self, path: &str) -> Result<Vec<Page>>;
    async fn get_all_pages(&self) -> Result<Vec<Page>>;

    // write operations

    /// Inserts or updates, records a revision, and returns the stored page.
    async fn save_page(&self, page: &Page) -> Result<Page>;
    async fn get_revisions(&self, page_id: i64) -> Result<Vec<PageRevision>>;
}

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn get_file(&self, id: i64) -> Result<Option<StoredFile>>;
    async fn create_file(&self, name: &str) -> Result<StoredFile>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user_by_token(&self, token: &str) -> Result<Option<User>>;
    async fn create_user(
        &self,
        username: &str,
        session_token: Option<&str>,
        is_superuser: bool,
    ) -> Result<i64>;
    async fn grant_permission(&self, user_id: i64, codename: &str) -> Result<()>;
}
