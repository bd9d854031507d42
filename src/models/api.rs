//! REST API 请求/响应模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::types::{GenerationSource, ParsedDocument, Session};
use crate::services::{CacheClearStats, GeneratedDocs, SectionIssue};

/// 根据项目描述生成的请求
#[derive(Debug, Deserialize)]
pub struct GenerateFromIdeaRequest {
    /// 会话 ID（为空时新建会话）
    #[serde(default)]
    pub session_id: Option<String>,
    /// 项目标题（可选）
    #[serde(default)]
    pub title: Option<String>,
    /// 项目描述
    #[serde(default)]
    pub description: String,
}

/// 根据仓库生成的请求
#[derive(Debug, Deserialize)]
pub struct GenerateFromRepoRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub repo_url: String,
}

/// 仓库上下文查询请求
#[derive(Debug, Deserialize)]
pub struct RepoContextRequest {
    #[serde(default)]
    pub repo_url: String,
}

/// 生成响应
#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub success: bool,
    pub session_id: String,
    pub description: String,
    pub resume_bullet: String,
    pub readme: String,
    /// 是否有可展示的 GitHub 简介
    pub has_description: bool,
    /// 是否有可展示的简历条目
    pub has_resume_bullet: bool,
    /// 模型输出的结构问题
    pub warnings: Vec<SectionIssue>,
    /// 是否整段作为 README
    pub fallback: bool,
}

impl GenerationResponse {
    pub fn new(session_id: String, docs: GeneratedDocs) -> Self {
        let ParsedDocument {
            description,
            resume_bullet,
            readme,
        } = docs.document;
        Self {
            success: true,
            session_id,
            has_description: !description.is_empty(),
            has_resume_bullet: !resume_bullet.is_empty(),
            description,
            resume_bullet,
            readme,
            warnings: docs.warnings,
            fallback: docs.fallback,
        }
    }
}

/// 会话响应
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub document: Option<ParsedDocument>,
    pub source: Option<GenerationSource>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.id,
            document: session.latest,
            source: session.source,
            updated_at: session.updated_at,
        }
    }
}

/// 缓存清理响应
#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub success: bool,
    pub repo_contexts: usize,
    pub generations: usize,
}

impl From<CacheClearStats> for CacheClearResponse {
    fn from(stats: CacheClearStats) -> Self {
        Self {
            success: true,
            repo_contexts: stats.repo_contexts,
            generations: stats.generations,
        }
    }
}
