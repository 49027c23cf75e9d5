//! `GET /media/*path` - stream a stored file to its owner

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio_util::io::ReaderStream;

use super::access::authorize;
use crate::api::AppState;
use crate::error::AppError;
use crate::features::auth::CurrentUser;
use crate::storage::file_extension;

pub fn media_routes() -> Router<AppState> {
    Router::new().route("/*path", get(serve_media))
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        ".pdf" => "application/pdf",
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".txt" => "text/plain; charset=utf-8",
        ".md" => "text/markdown; charset=utf-8",
        ".csv" => "text/csv; charset=utf-8",
        ".doc" => "application/msword",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[tracing::instrument(skip(state, user), fields(user_id = user.id))]
async fn serve_media(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let full_path = authorize(&state.db, &state.storage, user.id, &path)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    let file = tokio::fs::File::open(&full_path).await?;
    let length = file.metadata().await?.len();

    let file_name = full_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("download");
    let disposition = format!("inline; filename=\"{}\"", file_name.replace('"', ""));

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&file_extension(file_name)).to_string()),
        (header::CONTENT_LENGTH, length.to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}
