use crate::database::{DuplicatePage, FileRepository, PageRepository, UserRepository};
use crate::domain::{Page, PageRevision, StoredFile, User};
use crate::features::files::model::DbFile;
use crate::features::pages::model::{DbPage, DbPageRevision};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

#[derive(Clone)]
pub struct SqliteRepository {
    pool: Pool<Sqlite>,
}

impl SqliteRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

fn to_pages(db_pages: Vec<DbPage>) -> Result<Vec<Page>> {
    db_pages.into_iter().map(Page::try_from).collect()
}

// the (path, language) constraint surfaces as a typed error the services can recognise
fn map_save_error(err: sqlx::Error, page: &Page) -> anyhow::Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DuplicatePage {
            path: page.path.clone(),
            language: page.language.clone(),
        }
        .into(),
        _ => anyhow::Error::new(err).context(format!("Failed to save page {}", page)),
    }
}

#[async_trait]
impl PageRepository for SqliteRepository {
    async fn get_page(&self, id: i64) -> Result<Option<Page>> {
        let db_page_opt = sqlx::query_as::<_, DbPage>("SELECT * FROM pages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        db_page_opt.map(Page::try_from).transpose()
    }

    async fn get_page_by_path_and_language(
        &self,
        path: &str,
        language: &str,
    ) -> Result<Option<Page>> {
        let db_page_opt = sqlx::query_as::<_, DbPage>(
            "SELECT * FROM pages WHERE path = ? AND language = ?",
        )
        .bind(path)
        .bind(language)
        .fetch_optional(&self.pool)
        .await?;

        db_page_opt.map(Page::try_from).transpose()
    }

    async fn get_pages_by_path(&self, path: &str) -> Result<Vec<Page>> {
        let db_pages =
            sqlx::query_as::<_, DbPage>("SELECT * FROM pages WHERE path = ? ORDER BY id")
                .bind(path)
                .fetch_all(&self.pool)
                .await?;

        to_pages(db_pages)
    }

    async fn get_all_pages(&self) -> Result<Vec<Page>> {
        let db_pages = sqlx::query_as::<_, DbPage>("SELECT * FROM pages ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        to_pages(db_pages)
    }

    async fn save_page(&self, page: &Page) -> Result<Page> {
        let now = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await?;

        let id = match page.id {
            None => sqlx::query(
                r#"
                INSERT INTO pages (path, content, language, status, publish_date, created, updated)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&page.path)
            .bind(&page.content)
            .bind(&page.language)
            .bind(page.status.code())
            .bind(page.publish_date)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_save_error(e, page))?
            .last_insert_rowid(),
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE pages
                    SET path = ?, content = ?, language = ?, status = ?, publish_date = ?, updated = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&page.path)
                .bind(&page.content)
                .bind(&page.language)
                .bind(page.status.code())
                .bind(page.publish_date)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_save_error(e, page))?;

                if result.rows_affected() == 0 {
                    bail!("Page {} does not exist", id);
                }
                id
            }
        };

        sqlx::query(
            r#"
            INSERT INTO page_revisions (page_id, path, content, language, status, publish_date, recorded)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&page.path)
        .bind(&page.content)
        .bind(&page.language)
        .bind(page.status.code())
        .bind(page.publish_date)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context(format!("Failed to record revision of page {}", page))?;

        tx.commit().await?;

        let stored = sqlx::query_as::<_, DbPage>("SELECT * FROM pages WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        stored.try_into()
    }

    async fn get_revisions(&self, page_id: i64) -> Result<Vec<PageRevision>> {
        let rows = sqlx::query_as::<_, DbPageRevision>(
            "SELECT * FROM page_revisions WHERE page_id = ? ORDER BY id",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PageRevision::try_from).collect()
    }
}

#[async_trait]
impl FileRepository for SqliteRepository {
    async fn get_file(&self, id: i64) -> Result<Option<StoredFile>> {
        let db_file_opt = sqlx::query_as::<_, DbFile>("SELECT * FROM files WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(db_file_opt.map(StoredFile::from))
    }

    async fn create_file(&self, name: &str) -> Result<StoredFile> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query("INSERT INTO files (name, created) VALUES (?, ?)")
            .bind(name)
            .bind(now)
            .execute(&self.pool)
            .await
            .context(format!("Failed to record file {}", name))?
            .last_insert_rowid();

        Ok(StoredFile {
            id,
            name: name.to_string(),
            created: now,
        })
    }
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let row: Option<(i64, String, bool)> = sqlx::query_as(
            "SELECT id, username, is_superuser FROM users WHERE session_token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some((user_id, username, is_superuser)) = row else {
            return Ok(None);
        };

        let permissions = sqlx::query_scalar::<_, String>(
            "SELECT codename FROM user_permissions WHERE user_id = ? ORDER BY codename",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(User::Authenticated {
            username,
            is_superuser,
            permissions,
        }))
    }

    async fn create_user(
        &self,
        username: &str,
        session_token: Option<&str>,
        is_superuser: bool,
    ) -> Result<i64> {
        let id = sqlx::query(
            "INSERT INTO users (username, session_token, is_superuser) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(session_token)
        .bind(is_superuser)
        .execute(&self.pool)
        .await
        .context(format!("Failed to create user {}", username))?
        .last_insert_rowid();

        Ok(id)
    }

    async fn grant_permission(&self, user_id: i64, codename: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO user_permissions (user_id, codename) VALUES (?, ?)")
            .bind(user_id)
            .bind(codename)
            .execute(&self.pool)
            .await
            .context(format!("Failed to grant {} to user {}", codename, user_id))?;

        Ok(())
    }
}
