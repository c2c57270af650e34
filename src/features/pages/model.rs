use crate::domain::{Page, PageRevision, PageStatus};
use crate::error::ValidationError;
use crate::services::pages::RenderedPage;
use chrono::NaiveDateTime;
use derive_more::derive::Display;
use serde::{Deserialize, Serialize};

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(sqlx::FromRow, Debug, Eq, PartialEq, Clone, Display)]
#[display("{}({})", path, language)]
pub struct DbPage {
    pub id: i64,
    pub path: String,
    pub content: String,
    pub language: String,
    pub status: i64,
    pub publish_date: Option<NaiveDateTime>,
    pub created: NaiveDateTime,
    pub updated: NaiveDateTime,
}

impl TryFrom<DbPage> for Page {
    type Error = anyhow::Error;

    fn try_from(db_page: DbPage) -> Result<Self, Self::Error> {
        Ok(Page {
            id: Some(db_page.id),
            status: PageStatus::try_from(db_page.status)?,
            path: db_page.path,
            content: db_page.content,
            language: db_page.language,
            publish_date: db_page.publish_date,
            created: Some(db_page.created),
            updated: Some(db_page.updated),
        })
    }
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct DbPageRevision {
    pub id: i64,
    pub page_id: i64,
    pub path: String,
    pub content: String,
    pub language: String,
    pub status: i64,
    pub publish_date: Option<NaiveDateTime>,
    pub recorded: NaiveDateTime,
}

impl TryFrom<DbPageRevision> for PageRevision {
    type Error = anyhow::Error;

    fn try_from(row: DbPageRevision) -> Result<Self, Self::Error> {
        Ok(PageRevision {
            id: row.id,
            page_id: row.page_id,
            status: PageStatus::try_from(row.status)?,
            path: row.path,
            content: row.content,
            language: row.language,
            publish_date: row.publish_date,
            recorded: row.recorded,
        })
    }
}

/// A page as handed to the presentation layer.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JsonPage {
    pub id: Option<i64>,
    pub path: String,
    pub language: String,
    pub status: PageStatus,
    pub url: String,
    pub content: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub html_title: Option<String>,
    pub html_subtitle: Option<String>,
    pub html_body: Option<String>,
    pub publish_date: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
}

impl From<&RenderedPage> for JsonPage {
    fn from(rendered_page: &RenderedPage) -> Self {
        let page = &rendered_page.page;
        let rendered = &rendered_page.rendered;
        JsonPage {
            id: page.id,
            path: page.path.clone(),
            language: page.language.clone(),
            status: page.status,
            url: page.absolute_url(),
            content: page.content.clone(),
            title: rendered.title.clone(),
            subtitle: rendered.subtitle.clone(),
            body: rendered.body.clone(),
            html_title: rendered.html_title.clone(),
            html_subtitle: rendered.html_subtitle.clone(),
            html_body: rendered.html_body.clone(),
            publish_date: format_datetime(page.publish_date),
            created: format_datetime(page.created),
            updated: format_datetime(page.updated),
        }
    }
}

/// One row of the editor listing.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JsonPageSummary {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub language: String,
    pub path: String,
    pub status: PageStatus,
    pub publish_date: Option<String>,
}

impl From<&RenderedPage> for JsonPageSummary {
    fn from(rendered_page: &RenderedPage) -> Self {
        let page = &rendered_page.page;
        JsonPageSummary {
            id: page.id,
            title: rendered_page.rendered.title.clone(),
            language: page.language.clone(),
            path: page.path.clone(),
            status: page.status,
            publish_date: format_datetime(page.publish_date),
        }
    }
}

/// Response of the view flow.
#[derive(Serialize, Deserialize, Debug)]
pub struct PageDetail {
    pub page: JsonPage,
    pub editable: bool,
}

/// Editor state: the bound values plus any field errors.
#[derive(Serialize, Debug, Default)]
pub struct PageEditForm {
    pub path: String,
    pub language: String,
    pub content: String,
    pub errors: ValidationError,
}

/// Submitted editor fields. `path` and `language` come from the URL, never from here.
#[derive(Deserialize, Debug)]
pub struct PageEditInput {
    #[serde(default)]
    pub content: String,
}

fn format_datetime(value: Option<NaiveDateTime>) -> Option<String> {
    value.map(|v| v.format(DATETIME_FORMAT).to_string())
}
