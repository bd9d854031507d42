//! 会话端点
//!
//! 查询最近一次生成结果，下载 README.md

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::SessionResponse;
use crate::state::AppState;

const README_FILE_NAME: &str = "README.md";
const README_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// 创建会话路由
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/readme", get(download_readme))
}

/// 获取会话最近一次结果
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<SessionResponse>> {
    let session = state
        .get_session(&id)
        .ok_or_else(|| AppError::NotFound(format!("session {}", id)))?;
    Ok(Json(SessionResponse::from(session)))
}

/// 以附件形式下载 README.md
async fn download_readme(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let readme = state
        .get_session(&id)
        .and_then(|s| s.latest)
        .map(|doc| doc.readme)
        .ok_or_else(|| AppError::NotFound(format!("no README generated for session {}", id)))?;

    Ok((
        [
            (header::CONTENT_TYPE, README_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", README_FILE_NAME),
            ),
        ],
        readme,
    ))
}
