pub mod model;

use crate::AppState;
use crate::domain::access::CHANGE_PAGE;
use crate::domain::page::edit_url_for;
use crate::domain::{Page, User, can_edit};
use crate::error::{CmsError, ValidationError};
use crate::features::auth::{CurrentUser, RequestLanguage, require_login};
use crate::features::found_redirect;
use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use model::{JsonPageSummary, PageDetail, PageEditForm, PageEditInput};
use regex::Regex;

/// Which page flow a request path belongs to.
pub struct PageRoutes {
    view: Regex,
    edit: Regex,
}

pub enum PageRoute {
    View(String),
    Edit(String),
}

impl PageRoutes {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            view: Regex::new(&format!("^(?P<path>{})$", pattern))?,
            edit: Regex::new(&format!("^(?P<path>{})_edit/$", pattern))?,
        })
    }

    // edit wins: "foo/_edit/" would otherwise also be a valid page path
    pub fn resolve(&self, request_path: &str) -> Option<PageRoute> {
        if let Some(caps) = self.edit.captures(request_path) {
            return caps.name("path").map(|m| PageRoute::Edit(m.as_str().to_string()));
        }
        self.view
            .captures(request_path)
            .and_then(|caps| caps.name("path"))
            .map(|m| PageRoute::View(m.as_str().to_string()))
    }
}

pub fn pages_router() -> Router<AppState> {
    Router::new()
        .route("/api/pages", get(list_pages_handler))
        .route("/{*path}", get(get_page_handler).post(post_page_handler))
}

async fn get_page_handler(
    State(state): State<AppState>,
    Path(request_path): Path<String>,
    CurrentUser(user): CurrentUser,
    RequestLanguage(language): RequestLanguage,
    uri: Uri,
) -> Result<Response, CmsError> {
    match state.routes.resolve(&request_path) {
        Some(PageRoute::View(path)) => page_view(&state, path, language, user).await,
        Some(PageRoute::Edit(path)) => {
            let user = require_login(user, &state.config.login_url, uri.path())?;
            page_edit_form(&state, path, language, user).await
        }
        None => Err(CmsError::NotFound),
    }
}

async fn post_page_handler(
    State(state): State<AppState>,
    Path(request_path): Path<String>,
    CurrentUser(user): CurrentUser,
    RequestLanguage(language): RequestLanguage,
    uri: Uri,
    Form(input): Form<PageEditInput>,
) -> Result<Response, CmsError> {
    match state.routes.resolve(&request_path) {
        Some(PageRoute::Edit(path)) => {
            let user = require_login(user, &state.config.login_url, uri.path())?;
            page_edit_submit(&state, path, language, user, input).await
        }
        _ => Err(CmsError::NotFound),
    }
}

async fn page_view(
    state: &AppState,
    path: String,
    language: String,
    user: User,
) -> Result<Response, CmsError> {
    let page = state.pages.find_page(&path, &language, true).await?;
    let editable = can_edit(page.as_ref(), &user);

    match page {
        None if editable => Ok(found_redirect(&edit_url_for(&path))),
        None => Err(CmsError::NotFound),
        Some(page) => {
            let rendered = state.pages.render(page)?;
            Ok(Json(PageDetail {
                page: (&rendered).into(),
                editable,
            })
            .into_response())
        }
    }
}

async fn page_edit_form(
    state: &AppState,
    path: String,
    language: String,
    user: User,
) -> Result<Response, CmsError> {
    let page = state.pages.find_page(&path, &language, false).await?;

    // indistinguishable from a missing page
    if !can_edit(page.as_ref(), &user) {
        return Err(CmsError::NotFound);
    }

    Ok(Json(PageEditForm {
        content: page.map(|p| p.content).unwrap_or_default(),
        path,
        language,
        errors: ValidationError::new(),
    })
    .into_response())
}

async fn page_edit_submit(
    state: &AppState,
    path: String,
    language: String,
    user: User,
    input: PageEditInput,
) -> Result<Response, CmsError> {
    let found = state.pages.find_page(&path, &language, false).await?;

    if !can_edit(found.as_ref(), &user) {
        return Err(CmsError::NotFound);
    }

    // a page found through the any-language fallback seeds a new translation
    let mut page = match found {
        Some(page) if page.language == language => page,
        _ => Page::new(path.clone(), language.clone(), ""),
    };
    page.content = input.content;
    page.path = path;
    page.language = language;

    match state.pages.save(&mut page).await {
        Ok(()) => {
            tracing::info!(
                "Page {} edited by {}",
                page,
                user.username().unwrap_or("anonymous")
            );
            Ok(found_redirect(&page.absolute_url()))
        }
        Err(CmsError::Validation(errors)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(PageEditForm {
                path: page.path,
                language: page.language,
                content: page.content,
                errors,
            }),
        )
            .into_response()),
        Err(e) => Err(e),
    }
}

async fn list_pages_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    uri: Uri,
) -> Result<Json<Vec<JsonPageSummary>>, CmsError> {
    let user = require_login(user, &state.config.login_url, uri.path())?;
    if !user.has_perm(CHANGE_PAGE) {
        return Err(CmsError::NotFound);
    }

    let mut summaries = Vec::new();
    for page in state.pages.list_pages().await? {
        let rendered = state.pages.render(page)?;
        summaries.push(JsonPageSummary::from(&rendered));
    }

    Ok(Json(summaries))
}
