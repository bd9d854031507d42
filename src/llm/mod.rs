//! LLM 模块
//!
//! 提供面向 OpenAI 兼容 Chat Completions 服务（默认 Groq）的非流式客户端。

mod client;
mod openai;
mod types;

pub use client::LlmClient;
pub use types::*;
