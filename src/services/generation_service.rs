//! 文本生成服务
//!
//! 封装 LlmClient：检查密钥、组装消息、按 (密钥, prompt, 系统提示词) 记忆化成功结果，
//! 并把所有失败归类为 [`GenerationOutcome::Failure`]。

use tracing::{debug, info, warn};

use super::cache::MemoCache;
use super::types::{GenerationFailureKind, GenerationOutcome, GenerationRequest};
use crate::config::AppConfig;
use crate::llm::{ChatMessage, ChatOptions, LlmClient, LlmError};

/// 未配置密钥时返回给用户的提示
pub const MISSING_API_KEY_MESSAGE: &str = "Please provide a valid Groq API Key.";

/// 生成参数
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub cache_capacity: usize,
}

impl From<&AppConfig> for GenerationSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.request_timeout_secs,
            cache_capacity: config.cache_capacity,
        }
    }
}

/// 文本生成服务
pub struct GenerationService {
    settings: GenerationSettings,
    cache: MemoCache<String>,
}

impl GenerationService {
    /// 创建新的生成服务
    pub fn new(settings: GenerationSettings) -> Self {
        let cache = MemoCache::new(settings.cache_capacity);
        Self { settings, cache }
    }

    /// 执行一次生成
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        if request.api_key.trim().is_empty() {
            warn!("Generation skipped: API key not configured");
            return GenerationOutcome::Failure {
                kind: GenerationFailureKind::MissingCredential,
                message: MISSING_API_KEY_MESSAGE.to_string(),
            };
        }

        let key = MemoCache::<String>::key_for(&[
            &request.api_key,
            &request.prompt,
            &request.system_message,
        ]);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Generation cache hit");
            return GenerationOutcome::Success(cached);
        }

        let client = match LlmClient::new(
            request.api_key.as_str(),
            self.settings.base_url.as_str(),
            Some(self.settings.timeout_secs),
        ) {
            Ok(c) => c,
            Err(e) => return failure_from(e),
        };

        let messages = vec![
            ChatMessage::system(request.system_message.as_str()),
            ChatMessage::user(request.prompt.as_str()),
        ];
        let options = ChatOptions {
            temperature: Some(self.settings.temperature),
            max_tokens: Some(self.settings.max_tokens),
            ..Default::default()
        };

        match client.complete(&messages, &self.settings.model, &options).await {
            Ok(completion) if completion.content.trim().is_empty() => {
                warn!("Model returned empty content");
                failure_from(LlmError::EmptyResponse)
            }
            Ok(completion) => {
                info!(
                    "Generation completed: {} chars, finish_reason={:?}",
                    completion.content.len(),
                    completion.finish_reason
                );
                self.cache.insert(key, completion.content.clone());
                GenerationOutcome::Success(completion.content)
            }
            Err(e) => {
                warn!("Generation failed: {}", e);
                failure_from(e)
            }
        }
    }

    /// 清空缓存，返回清除的条目数
    pub fn clear_cache(&self) -> usize {
        self.cache.clear()
    }
}

fn failure_from(err: LlmError) -> GenerationOutcome {
    let kind = match &err {
        LlmError::HttpError(_) => GenerationFailureKind::Transport,
        LlmError::Timeout => GenerationFailureKind::Timeout,
        LlmError::ApiError { .. } | LlmError::JsonError(_) => GenerationFailureKind::Api,
        LlmError::ConfigError(_) => GenerationFailureKind::MissingCredential,
        LlmError::EmptyResponse => GenerationFailureKind::EmptyResponse,
    };
    GenerationOutcome::Failure {
        kind,
        message: err.to_string(),
    }
}
