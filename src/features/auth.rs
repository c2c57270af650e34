use crate::AppState;
use crate::domain::{User, resolve_language};
use crate::error::CmsError;
use axum::extract::FromRequestParts;
use axum::http::header::{ACCEPT_LANGUAGE, AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;

pub const SESSION_COOKIE: &str = "sessionid";

/// The requesting user; anonymous when no known session token is presented.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = CmsError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(CurrentUser(User::Anonymous));
        };

        match state.users.get_user_by_token(&token).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                tracing::warn!("Unknown session token presented");
                Ok(CurrentUser(User::Anonymous))
            }
        }
    }
}

/// The configured language that best fits the request's locale.
#[derive(Clone, Debug)]
pub struct RequestLanguage(pub String);

impl FromRequestParts<AppState> for RequestLanguage {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let config = &state.config;
        let requested = requested_locales(&parts.headers, &config.language_cookie_name);

        Ok(RequestLanguage(resolve_language(
            requested.as_slice(),
            config.languages.as_slice(),
            &config.default_language,
        )))
    }
}

/// Anonymous users are sent to the login page, with `next` pointing back here.
pub fn require_login(user: User, login_url: &str, next: &str) -> Result<User, CmsError> {
    if user.is_authenticated() {
        Ok(user)
    } else {
        Err(CmsError::Unauthenticated {
            login_url: format!("{}?next={}", login_url, next),
        })
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());

    bearer
        .or_else(|| cookie_value(headers, SESSION_COOKIE))
        .filter(|t| !t.is_empty())
}

/// Candidate locales, most preferred first: the language cookie, then the
/// `Accept-Language` tags by descending q-value. Tags with `q=0` and `*` are skipped.
pub fn requested_locales(headers: &HeaderMap, cookie_name: &str) -> Vec<String> {
    let mut locales: Vec<String> = cookie_value(headers, cookie_name)
        .map(|code| code.to_lowercase())
        .into_iter()
        .collect();

    let mut weighted: Vec<(f32, String)> = headers
        .get_all(ACCEPT_LANGUAGE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(','))
        .filter_map(parse_language_range)
        .collect();
    // stable, so equal weights keep header order
    weighted.sort_by(|a, b| b.0.total_cmp(&a.0));

    locales.extend(weighted.into_iter().map(|(_, tag)| tag));
    locales
}

// "ja;q=0.8" -> (0.8, "ja")
fn parse_language_range(range: &str) -> Option<(f32, String)> {
    let mut parts = range.split(';');
    let tag = parts.next()?.trim().to_lowercase();
    if tag.is_empty() || tag == "*" {
        return None;
    }

    let mut quality = 1.0;
    for param in parts {
        if let Some(value) = param.trim().strip_prefix("q=") {
            quality = value.trim().parse::<f32>().ok()?;
        }
    }

    (quality > 0.0).then_some((quality, tag))
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}
