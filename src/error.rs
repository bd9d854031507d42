//! 统一错误处理模块
//!
//! 定义应用级错误类型，并实现 axum 的 IntoResponse trait 以便自动转换为 HTTP 响应。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::types::GenerationFailureKind;
use crate::services::{FetchError, PipelineError};

/// 应用错误枚举
#[derive(Error, Debug)]
pub enum AppError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 请求参数错误
    #[error("请求错误: {0}")]
    BadRequest(String),

    /// 资源未找到
    #[error("未找到: {0}")]
    NotFound(String),

    /// GitHub 等上游服务错误
    #[error("上游错误: {0}")]
    Upstream(String),

    /// 文本生成失败
    #[error("生成错误: {message}")]
    Generation {
        kind: GenerationFailureKind,
        message: String,
    },

    /// 模型输出不符合分节格式
    #[error("输出格式错误: {0}")]
    MalformedOutput(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidInput(msg) => AppError::BadRequest(msg),
            PipelineError::Fetch(e @ FetchError::InvalidUrl(_)) => AppError::BadRequest(e.to_string()),
            PipelineError::Fetch(e @ FetchError::Client(_)) => AppError::Internal(e.to_string()),
            PipelineError::Fetch(e) => AppError::Upstream(e.to_string()),
            PipelineError::Generation { kind, message } => AppError::Generation { kind, message },
            PipelineError::Parse(e) => AppError::MalformedOutput(e.to_string()),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Generation { kind, .. } => match kind {
                GenerationFailureKind::MissingCredential => StatusCode::SERVICE_UNAVAILABLE,
                GenerationFailureKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            },
            AppError::MalformedOutput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_message, kind) = match self {
            AppError::Generation { kind, message } => (message, Some(kind)),
            AppError::Config(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Upstream(msg)
            | AppError::MalformedOutput(msg)
            | AppError::Internal(msg) => (msg, None),
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}

/// 便捷类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_mapping() {
        let err: AppError = PipelineError::Fetch(FetchError::InvalidUrl("x".to_string())).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: AppError = PipelineError::Fetch(FetchError::ListingStatus(404)).into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("404"));

        let err: AppError = PipelineError::Generation {
            kind: GenerationFailureKind::MissingCredential,
            message: "no key".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err: AppError = PipelineError::Generation {
            kind: GenerationFailureKind::Timeout,
            message: "slow".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
