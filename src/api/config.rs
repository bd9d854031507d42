//! 配置管理端点

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{get_config, update_config, AppConfig};
use crate::error::AppResult;
use crate::state::AppState;

/// 配置响应（隐藏 api_key 的实际值）
#[derive(Serialize)]
pub struct ConfigResponse {
    /// 是否已设置 API 密钥
    pub api_key_set: bool,
    /// API 基础 URL
    pub base_url: String,
    /// 模型名称
    pub model: String,
    /// 温度参数
    pub temperature: f64,
    /// 最大 token 数
    pub max_tokens: u32,
    /// 抓取内容的文件名模式
    pub context_files: Vec<String>,
    /// 严格解析模式
    pub strict_parsing: bool,
}

impl ConfigResponse {
    fn new(config: AppConfig, api_key_set: bool) -> Self {
        Self {
            api_key_set,
            base_url: config.base_url,
            model: config.model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            context_files: config.context_files,
            strict_parsing: config.strict_parsing,
        }
    }
}

/// 配置更新请求
///
/// 只有密钥支持运行时更新，其余配置在启动时生效
#[derive(Deserialize)]
pub struct ConfigUpdateRequest {
    pub api_key: Option<String>,
}

/// 配置更新响应
#[derive(Serialize)]
pub struct ConfigUpdateResponse {
    pub success: bool,
    pub message: String,
    pub api_key_set: bool,
}

/// 获取当前配置
async fn get_config_handler(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let api_key_set = !state.api_key().trim().is_empty();
    Json(ConfigResponse::new(get_config(), api_key_set))
}

/// 更新配置
async fn update_config_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConfigUpdateRequest>,
) -> AppResult<Json<ConfigUpdateResponse>> {
    if let Some(api_key) = req.api_key {
        let api_key = api_key.trim().to_string();
        update_config(|config| config.api_key = api_key.clone())?;
        state.set_api_key(api_key);
    }

    Ok(Json(ConfigUpdateResponse {
        success: true,
        message: "Config updated successfully".to_string(),
        api_key_set: !state.api_key().is_empty(),
    }))
}

/// 创建配置路由
pub fn config_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/config", get(get_config_handler).put(update_config_handler))
}
