//! OpenAI Chat Completions API 实现（非流式）

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::types::{ChatCompletion, ChatMessage, ChatOptions, LlmError};

/// OpenAI 请求载荷
#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// OpenAI 响应
#[derive(Deserialize, Debug)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize, Debug)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OpenAiMessage {
    content: Option<String>,
}

/// 由基础 URL 得到 Chat Completions 端点
///
/// 接受服务根地址、以 `/v1` 结尾的地址或完整端点，末尾斜杠会被忽略
fn chat_completions_endpoint(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else if base.ends_with("/v1") {
        format!("{}/chat/completions", base)
    } else {
        format!("{}/v1/chat/completions", base)
    }
}

/// 调用 OpenAI 兼容 API
pub async fn complete_openai(
    client: &Client,
    api_key: &str,
    base_url: &str,
    messages: &[ChatMessage],
    model: &str,
    options: &ChatOptions,
) -> Result<ChatCompletion, LlmError> {
    let endpoint = chat_completions_endpoint(base_url);

    let payload = OpenAiRequest {
        model,
        messages,
        stream: false,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
    };

    debug!("OpenAI API request: endpoint={}, model={}", endpoint, model);

    let response = client
        .post(&endpoint)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await
        .map_err(LlmError::from_transport)?;

    let status = response.status();
    if !status.is_success() {
        let status_code = status.as_u16();
        let error_text = response.text().await.unwrap_or_default();
        error!(
            "OpenAI API error: status={}, body={}",
            status_code,
            error_text.chars().take(500).collect::<String>()
        );
        return Err(LlmError::ApiError {
            status: status_code,
            message: error_text,
        });
    }

    let body = response.text().await.map_err(LlmError::from_transport)?;
    let parsed: OpenAiResponse = serde_json::from_str(&body)?;

    let choice = parsed.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;
    Ok(ChatCompletion {
        content: choice.message.content.unwrap_or_default(),
        finish_reason: choice.finish_reason,
    })
}
