pub mod model;

use crate::AppState;
use crate::domain::access::CHANGE_PAGE;
use crate::error::CmsError;
use crate::features::auth::{CurrentUser, require_login};
use crate::services::Delivery;
use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Path, Query, Request, State},
    http::{HeaderName, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use model::{JsonFile, UploadParams};
use tower::ServiceExt;
use tower_http::services::ServeFile;

pub const X_ACCEL_REDIRECT: HeaderName = HeaderName::from_static("x-accel-redirect");

pub fn files_router() -> Router<AppState> {
    Router::new()
        .route("/files", post(upload_handler))
        .route("/files/{id}/{name}", get(download_handler))
}

async fn download_handler(
    State(state): State<AppState>,
    Path((id, _name)): Path<(String, String)>,
    request: Request,
) -> Result<Response, CmsError> {
    // the name segment is cosmetic; only the id selects the file
    let id: i64 = id.parse().map_err(|_| CmsError::NotFound)?;

    match state.files.delivery(id).await? {
        // empty body and no content type: the front-end server decides both
        Delivery::AccelRedirect { url } => Ok(([(X_ACCEL_REDIRECT, url)], ()).into_response()),
        Delivery::Direct { path } => match ServeFile::new(path).oneshot(request).await {
            Ok(response) => Ok(response.map(Body::new)),
            Err(never) => match never {},
        },
    }
}

async fn upload_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<UploadParams>,
    uri: Uri,
    body: Bytes,
) -> Result<Response, CmsError> {
    let user = require_login(user, &state.config.login_url, uri.path())?;
    if !user.has_perm(CHANGE_PAGE) {
        return Err(CmsError::NotFound);
    }

    let file = state.files.upload(&params.name, &body).await?;
    Ok((StatusCode::CREATED, Json(JsonFile::from(&file))).into_response())
}
