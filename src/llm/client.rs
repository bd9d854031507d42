//! Chat Completions 客户端

use reqwest::Client;
use std::time::Duration;
use tracing::info;

use super::openai::complete_openai;
use super::types::{ChatCompletion, ChatMessage, ChatOptions, LlmError};

/// 默认请求超时（秒）
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Chat Completions 客户端
///
/// 面向 Groq 等 OpenAI 兼容服务
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::ConfigError("API Key is required".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)))
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(LlmError::HttpError)?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into(),
        })
    }

    /// 单次补全请求
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        options: &ChatOptions,
    ) -> Result<ChatCompletion, LlmError> {
        info!("LLM request: model={}, messages={}", model, messages.len());
        complete_openai(&self.client, &self.api_key, &self.base_url, messages, model, options).await
    }
}
