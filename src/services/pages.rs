use crate::config::CmsConfig;
use crate::database::{DuplicatePage, PageRepository};
use crate::domain::page::{clean_fields, full_path_regex, update_publish_date, validate_path};
use crate::domain::{Page, PageRevision, PageStatus};
use crate::error::{CmsError, ValidationError};
use crate::parser::{RenderError, Rendered, Renderer};
use crate::services::lookup::select_page;
use anyhow::Context;
use chrono::{NaiveDateTime, Utc};
use regex::Regex;
use std::sync::Arc;

/// A page together with its rendered content, computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub page: Page,
    pub rendered: Rendered,
}

impl RenderedPage {
    pub fn title(&self) -> Option<&str> {
        self.rendered.title.as_deref()
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.rendered.subtitle.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.rendered.body.as_deref()
    }

    pub fn html_body(&self) -> Option<&str> {
        self.rendered.html_body.as_deref()
    }
}

pub struct PageService {
    repo: Box<dyn PageRepository>,
    renderer: Renderer,
    config: Arc<CmsConfig>,
    path_regex: Regex,
}

impl PageService {
    pub fn new(
        repo: Box<dyn PageRepository>,
        renderer: Renderer,
        config: Arc<CmsConfig>,
    ) -> anyhow::Result<Self> {
        let path_regex = full_path_regex(&config.page_path_regex)
            .with_context(|| format!("Invalid page path pattern '{}'", config.page_path_regex))?;

        Ok(Self {
            repo,
            renderer,
            config,
            path_regex,
        })
    }

    pub fn render(&self, page: Page) -> Result<RenderedPage, RenderError> {
        let rendered = self.renderer.render(&page.content)?;
        Ok(RenderedPage { page, rendered })
    }

    pub async fn full_validate(&self, page: &mut Page) -> Result<(), CmsError> {
        self.full_validate_at(page, Utc::now().naive_utc()).await
    }

    /// Field checks, a trial render, path syntax, publish date bookkeeping
    /// and the (path, language) uniqueness check, in that order.
    pub async fn full_validate_at(&self, page: &mut Page, now: NaiveDateTime) -> Result<(), CmsError> {
        clean_fields(page, &self.config.languages)?;
        self.renderer.render(&page.content)?;
        validate_path(&page.path, &self.path_regex)?;
        page.publish_date = update_publish_date(page.status, page.publish_date, now);
        self.validate_unique(page).await
    }

    async fn validate_unique(&self, page: &Page) -> Result<(), CmsError> {
        let existing = self
            .repo
            .get_page_by_path_and_language(&page.path, &page.language)
            .await?;

        match existing {
            Some(other) if other.id != page.id => Err(ValidationError::duplicate_page().into()),
            _ => Ok(()),
        }
    }

    /// Validates, then persists. `page` is replaced by the stored copy.
    pub async fn save(&self, page: &mut Page) -> Result<(), CmsError> {
        if let Err(e) = self.full_validate(page).await {
            tracing::warn!("Refusing to save page {}: {}", page, e);
            return Err(e);
        }

        match self.repo.save_page(page).await {
            Ok(stored) => {
                tracing::info!("Saved page {} (id {:?}, {})", stored, stored.id, stored.status);
                *page = stored;
                Ok(())
            }
            // another writer got there between the check and the insert
            Err(e) if e.downcast_ref::<DuplicatePage>().is_some() => {
                tracing::warn!("Duplicate page rejected by the database: {}", e);
                Err(ValidationError::duplicate_page().into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn publish(&self, page: &mut Page) -> Result<(), CmsError> {
        page.status = PageStatus::Public;
        self.full_validate(page).await
    }

    pub async fn reject(&self, page: &mut Page) -> Result<(), CmsError> {
        page.status = PageStatus::Reject;
        self.full_validate(page).await
    }

    pub async fn find_page(
        &self,
        path: &str,
        language: &str,
        published_only: bool,
    ) -> anyhow::Result<Option<Page>> {
        self.find_page_at(path, language, published_only, Utc::now().naive_utc())
            .await
    }

    pub async fn find_page_at(
        &self,
        path: &str,
        language: &str,
        published_only: bool,
        now: NaiveDateTime,
    ) -> anyhow::Result<Option<Page>> {
        let candidates = self.repo.get_pages_by_path(path).await?;
        let found = select_page(
            &candidates,
            language,
            published_only,
            now,
            self.config.languages.as_slice(),
        )
        .cloned();

        tracing::debug!(
            "Lookup {} [{}] published_only={} -> {}",
            path,
            language,
            published_only,
            found.as_ref().map(|p| p.to_string()).unwrap_or_else(|| "none".into())
        );

        Ok(found)
    }

    pub async fn get_page(&self, id: i64) -> anyhow::Result<Option<Page>> {
        self.repo.get_page(id).await
    }

    pub async fn list_pages(&self) -> anyhow::Result<Vec<Page>> {
        self.repo.get_all_pages().await
    }

    pub async fn revisions(&self, page_id: i64) -> anyhow::Result<Vec<PageRevision>> {
        self.repo.get_revisions(page_id).await
    }
}
