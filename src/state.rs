//! 应用状态管理
//!
//! 定义在请求处理器之间共享的状态：文档生成流水线和按会话隔离的最近结果。

use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::services::types::Session;
use crate::services::{DocPipeline, PipelineError};

/// 会话注册表
pub type SessionRegistry = DashMap<String, Session>;

/// 应用共享状态
///
/// 使用 Arc 包裹以便在多个处理器之间安全共享
#[derive(Clone)]
pub struct AppState {
    /// 文档生成流水线（持有抓取与生成缓存）
    pub pipeline: Arc<DocPipeline>,
    /// 会话注册表
    pub sessions: Arc<SessionRegistry>,
    /// 当前使用的 API 密钥（可通过配置端点在运行时更新）
    api_key: Arc<RwLock<String>>,
}

impl AppState {
    /// 按配置创建应用状态
    pub fn new(config: &AppConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            pipeline: Arc::new(DocPipeline::from_config(config)?),
            sessions: Arc::new(DashMap::new()),
            api_key: Arc::new(RwLock::new(config.api_key.clone())),
        })
    }

    /// 当前 API 密钥
    pub fn api_key(&self) -> String {
        self.api_key.read().clone()
    }

    /// 替换 API 密钥
    pub fn set_api_key(&self, api_key: String) {
        *self.api_key.write() = api_key;
    }

    /// 取出会话副本；id 为空或不存在时新建
    ///
    /// 不在 await 期间持有注册表的锁，处理完成后通过 [`AppState::store_session`] 写回
    pub fn checkout_session(&self, id: Option<&str>) -> Session {
        match id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => self
                .sessions
                .get(id)
                .map(|s| s.value().clone())
                .unwrap_or_else(|| Session::new(id)),
            None => Session::new(Uuid::new_v4().to_string()),
        }
    }

    /// 写回会话
    pub fn store_session(&self, session: Session) {
        self.sessions.insert(session.id.clone(), session);
    }

    /// 查询会话
    pub fn get_session(&self, id: &str) -> Option<Session> {
        self.sessions.get(id).map(|s| s.value().clone())
    }
}

/// 创建可共享的应用状态
pub fn create_shared_state(config: &AppConfig) -> Result<Arc<AppState>, PipelineError> {
    Ok(Arc::new(AppState::new(config)?))
}
