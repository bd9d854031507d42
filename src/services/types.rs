//! 文档生成流水线的核心类型
//!
//! 仓库上下文、生成请求/结果、解析后的文档以及会话状态

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 从 GitHub 抓取到的单个仓库上下文
///
/// 每次抓取生成一份，创建后不再修改
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoContext {
    /// 仓库所有者
    pub owner: String,
    /// 仓库名
    pub repo: String,
    /// 顶层文件/目录名（保持 API 返回顺序）
    pub files: Vec<String>,
    /// 语言 -> 字节数
    pub languages: BTreeMap<String, u64>,
    /// 现有 README 文本，没有时为空
    pub existing_readme: String,
    /// 关键文件名 -> 截断后的内容片段
    pub context_files: BTreeMap<String, String>,
}

impl RepoContext {
    /// 是否存在 README
    pub fn has_readme(&self) -> bool {
        !self.existing_readme.trim().is_empty()
    }

    /// 按字节数降序排列的语言列表（字节数相同按名称排序）
    pub fn languages_by_size(&self) -> Vec<(&str, u64)> {
        let mut langs: Vec<(&str, u64)> = self
            .languages
            .iter()
            .map(|(name, bytes)| (name.as_str(), *bytes))
            .collect();
        langs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        langs
    }
}

/// 一次生成请求
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub api_key: String,
    pub prompt: String,
    pub system_message: String,
}

/// 生成失败的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationFailureKind {
    /// 未配置 API 密钥，未发起任何请求
    MissingCredential,
    /// 网络/传输层错误
    Transport,
    /// 请求超时
    Timeout,
    /// 服务端返回非成功状态或无法解析的响应
    Api,
    /// 服务端没有返回任何内容
    EmptyResponse,
}

/// 生成结果：成功文本或带类别的失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success(String),
    Failure {
        kind: GenerationFailureKind,
        message: String,
    },
}

/// 从生成文本中拆分出的三个产物
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// GitHub "About" 简介
    pub description: String,
    /// 简历项目条目
    pub resume_bullet: String,
    /// README.md 正文
    pub readme: String,
}

/// 生成来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationSource {
    /// 根据项目描述生成
    Idea { title: Option<String> },
    /// 根据 GitHub 仓库生成
    Repository { url: String },
}

/// 会话状态：只保存最近一次成功生成的结果
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub latest: Option<ParsedDocument>,
    pub source: Option<GenerationSource>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            latest: None,
            source: None,
            updated_at: None,
        }
    }

    /// 用新的生成结果覆盖旧结果
    pub fn record(&mut self, document: ParsedDocument, source: GenerationSource) {
        self.latest = Some(document);
        self.source = Some(source);
        self.updated_at = Some(Utc::now());
    }
}
