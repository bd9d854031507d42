//! 文档生成 API 端点
//!
//! 根据项目描述或 GitHub 仓库生成 README、简介和简历条目

use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;
use tracing::info;

use crate::error::AppResult;
use crate::models::{
    CacheClearResponse, GenerateFromIdeaRequest, GenerateFromRepoRequest, GenerationResponse,
    RepoContextRequest,
};
use crate::services::types::RepoContext;
use crate::state::AppState;

/// 创建文档生成路由
pub fn docs_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/generate/idea", post(generate_from_idea))
        .route("/api/generate/repo", post(generate_from_repo))
        .route("/api/repo/context", post(fetch_repo_context))
        .route("/api/cache/clear", post(clear_cache))
}

/// 根据项目描述生成
async fn generate_from_idea(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateFromIdeaRequest>,
) -> AppResult<Json<GenerationResponse>> {
    let mut session = state.checkout_session(req.session_id.as_deref());
    let api_key = state.api_key();

    let docs = state
        .pipeline
        .generate_from_idea(&mut session, &api_key, req.title.as_deref(), &req.description)
        .await?;

    let session_id = session.id.clone();
    state.store_session(session);
    info!("Idea generation stored: session={}", session_id);

    Ok(Json(GenerationResponse::new(session_id, docs)))
}

/// 根据 GitHub 仓库生成
async fn generate_from_repo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateFromRepoRequest>,
) -> AppResult<Json<GenerationResponse>> {
    let mut session = state.checkout_session(req.session_id.as_deref());
    let api_key = state.api_key();

    let docs = state
        .pipeline
        .generate_from_repo(&mut session, &api_key, &req.repo_url)
        .await?;

    let session_id = session.id.clone();
    state.store_session(session);
    info!("Repository generation stored: session={}", session_id);

    Ok(Json(GenerationResponse::new(session_id, docs)))
}

/// 查看抓取到的仓库上下文
async fn fetch_repo_context(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RepoContextRequest>,
) -> AppResult<Json<RepoContext>> {
    let context = state.pipeline.fetch_repo(&req.repo_url).await?;
    Ok(Json(context))
}

/// 清空抓取和生成缓存
async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<CacheClearResponse> {
    Json(state.pipeline.clear_caches().into())
}
