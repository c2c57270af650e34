use chrono::NaiveDateTime;
use derive_more::derive::Display;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const COMMUNITY_PREFIX: &str = "community/";
pub const PATH_MAX_LENGTH: usize = 100;
pub const LANGUAGE_MAX_LENGTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum PageStatus {
    Draft,
    Public,
    Reject,
}

impl PageStatus {
    // stored as an integer column
    pub fn code(self) -> i64 {
        match self {
            PageStatus::Draft => 1,
            PageStatus::Public => 2,
            PageStatus::Reject => 3,
        }
    }
}

impl TryFrom<i64> for PageStatus {
    type Error = ValidationError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(PageStatus::Draft),
            2 => Ok(PageStatus::Public),
            3 => Ok(PageStatus::Reject),
            other => Err(ValidationError::single(
                "status",
                format!("Value {} is not a valid choice.", other),
            )),
        }
    }
}

/// A content record keyed by (path, language).
///
/// `id`, `created` and `updated` are assigned by the repository on save.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{}({})", path, language)]
pub struct Page {
    pub id: Option<i64>,
    pub path: String,
    pub content: String,
    pub language: String,
    pub status: PageStatus,
    pub publish_date: Option<NaiveDateTime>,
    pub created: Option<NaiveDateTime>,
    pub updated: Option<NaiveDateTime>,
}

impl Page {
    /// A new, unsaved draft.
    pub fn new(path: impl Into<String>, language: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            path: path.into(),
            content: content.into(),
            language: language.into(),
            status: PageStatus::Draft,
            publish_date: None,
            created: None,
            updated: None,
        }
    }

    pub fn is_community(&self) -> bool {
        is_community_path(&self.path)
    }

    /// Visible to the public at `now`.
    pub fn is_published_at(&self, now: NaiveDateTime) -> bool {
        self.status == PageStatus::Public && self.publish_date.is_some_and(|date| date <= now)
    }

    /// Canonical view location.
    pub fn absolute_url(&self) -> String {
        format!("/{}", self.path)
    }

    pub fn edit_url(&self) -> String {
        edit_url_for(&self.path)
    }
}

pub fn is_community_path(path: &str) -> bool {
    path.to_lowercase().starts_with(COMMUNITY_PREFIX)
}

// "docs/intro/" -> "/docs/intro/_edit/"
pub fn edit_url_for(path: &str) -> String {
    format!("/{}_edit/", path)
}

/// Compiles the configured page path pattern so it must match the whole path.
pub fn full_path_regex(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

pub fn validate_path(path: &str, path_regex: &Regex) -> Result<(), ValidationError> {
    if path_regex.is_match(path) {
        Ok(())
    } else {
        Err(ValidationError::path_format())
    }
}

/// Publish date follows status: set once on entering Public, cleared otherwise.
pub fn update_publish_date(
    status: PageStatus,
    current: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    match (status, current) {
        (PageStatus::Public, None) => Some(now),
        (PageStatus::Public, Some(existing)) => Some(existing),
        _ => None,
    }
}

/// Field-level checks that need nothing but the page and the configured languages.
pub fn clean_fields(page: &Page, languages: &[String]) -> Result<(), ValidationError> {
    let mut errors = ValidationError::new();

    if page.path.is_empty() {
        errors.add("path", crate::error::MSG_REQUIRED);
    } else if page.path.chars().count() > PATH_MAX_LENGTH {
        errors.add(
            "path",
            format!("Ensure this value has at most {} characters.", PATH_MAX_LENGTH),
        );
    }

    if page.content.is_empty() {
        errors.add("content", crate::error::MSG_REQUIRED);
    }

    if page.language.is_empty() {
        errors.add("language", crate::error::MSG_REQUIRED);
    } else if page.language.chars().count() > LANGUAGE_MAX_LENGTH {
        errors.add(
            "language",
            format!("Ensure this value has at most {} characters.", LANGUAGE_MAX_LENGTH),
        );
    } else if !languages.iter().any(|l| l == &page.language) {
        errors.add(
            "language",
            format!("Value '{}' is not a valid choice.", page.language),
        );
    }

    errors.into_result()
}

/// Snapshot of a page as it was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRevision {
    pub id: i64,
    pub page_id: i64,
    pub path: String,
    pub content: String,
    pub language: String,
    pub status: PageStatus,
    pub publish_date: Option<NaiveDateTime>,
    pub recorded: NaiveDateTime,
}
