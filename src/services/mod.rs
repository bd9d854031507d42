//! 服务模块
//!
//! 仓库抓取、Prompt 组装、文本生成、结果解析和把它们串起来的流水线

mod cache;
mod doc_pipeline;
mod generation_service;
mod prompt_service;
pub mod prompts;
mod repo_fetcher;
mod response_parser;
pub mod types;

pub use doc_pipeline::{CacheClearStats, DocPipeline, GeneratedDocs, PipelineError};
pub use repo_fetcher::FetchError;
pub use response_parser::SectionIssue;
