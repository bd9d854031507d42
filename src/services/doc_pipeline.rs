//! 文档生成流水线
//!
//! 输入 → (仓库抓取) → Prompt 组装 → 文本生成 → 分节解析 → 写入会话。
//! 抓取失败在生成之前终止流水线；生成失败和严格模式下的解析失败都不会修改会话。

use tracing::{info, warn};

use super::generation_service::{GenerationService, GenerationSettings};
use super::prompt_service::{ComposedPrompt, PromptService};
use super::repo_fetcher::{FetchError, RepoFetcher, RepoFetcherConfig};
use super::response_parser::{parse_sections, ParseError, SectionIssue};
use super::types::{
    GenerationFailureKind, GenerationOutcome, GenerationRequest, GenerationSource,
    ParsedDocument, RepoContext, Session,
};
use crate::config::AppConfig;

/// 一次成功生成的结果
#[derive(Debug, Clone)]
pub struct GeneratedDocs {
    pub document: ParsedDocument,
    /// 模型输出的结构问题（宽松模式下仍然返回文档）
    pub warnings: Vec<SectionIssue>,
    /// 是否未找到分节标记、整段作为 README
    pub fallback: bool,
}

/// 缓存清理统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheClearStats {
    pub repo_contexts: usize,
    pub generations: usize,
}

/// 文档生成流水线
pub struct DocPipeline {
    fetcher: RepoFetcher,
    prompts: PromptService,
    generator: GenerationService,
    strict_parsing: bool,
}

impl DocPipeline {
    pub fn new(
        fetcher: RepoFetcher,
        prompts: PromptService,
        generator: GenerationService,
        strict_parsing: bool,
    ) -> Self {
        Self {
            fetcher,
            prompts,
            generator,
            strict_parsing,
        }
    }

    /// 按配置创建流水线
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let fetcher = RepoFetcher::new(RepoFetcherConfig::from(config))?;
        Ok(Self::new(
            fetcher,
            PromptService::new(config.readme_excerpt_chars),
            GenerationService::new(GenerationSettings::from(config)),
            config.strict_parsing,
        ))
    }

    /// 只抓取仓库上下文
    pub async fn fetch_repo(&self, repo_url: &str) -> Result<RepoContext, PipelineError> {
        Ok(self.fetcher.fetch(repo_url).await?)
    }

    /// 根据项目描述生成
    pub async fn generate_from_idea(
        &self,
        session: &mut Session,
        api_key: &str,
        title: Option<&str>,
        description: &str,
    ) -> Result<GeneratedDocs, PipelineError> {
        if description.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "Project description is required".to_string(),
            ));
        }

        info!("Generating docs from description: session={}", session.id);
        let composed = self.prompts.compose_from_idea(title, description);
        let source = GenerationSource::Idea {
            title: title
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        };
        self.run(session, api_key, composed, source).await
    }

    /// 根据 GitHub 仓库生成
    pub async fn generate_from_repo(
        &self,
        session: &mut Session,
        api_key: &str,
        repo_url: &str,
    ) -> Result<GeneratedDocs, PipelineError> {
        if repo_url.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "Repository URL is required".to_string(),
            ));
        }

        info!("Generating docs from repository: session={}, url={}", session.id, repo_url);
        let repo = self.fetcher.fetch(repo_url).await?;
        let composed = self.prompts.compose_from_repo(&repo);
        let source = GenerationSource::Repository {
            url: repo_url.to_string(),
        };
        self.run(session, api_key, composed, source).await
    }

    /// 清空两级缓存
    pub fn clear_caches(&self) -> CacheClearStats {
        let stats = CacheClearStats {
            repo_contexts: self.fetcher.clear_cache(),
            generations: self.generator.clear_cache(),
        };
        info!(
            "Caches cleared: repo_contexts={}, generations={}",
            stats.repo_contexts, stats.generations
        );
        stats
    }

    async fn run(
        &self,
        session: &mut Session,
        api_key: &str,
        composed: ComposedPrompt,
        source: GenerationSource,
    ) -> Result<GeneratedDocs, PipelineError> {
        let request = GenerationRequest {
            api_key: api_key.to_string(),
            prompt: composed.prompt,
            system_message: composed.system_message,
        };

        let text = match self.generator.generate(&request).await {
            GenerationOutcome::Success(text) => text,
            GenerationOutcome::Failure { kind, message } => {
                return Err(PipelineError::Generation { kind, message });
            }
        };

        let mut report = parse_sections(&text);
        if !report.issues.is_empty() {
            warn!(
                "Model output has {} structural issue(s), fallback={}",
                report.issues.len(),
                report.fallback
            );
        }
        if self.strict_parsing {
            report = report.into_strict()?;
        }

        session.record(report.document.clone(), source);
        Ok(GeneratedDocs {
            document: report.document,
            warnings: report.issues,
            fallback: report.fallback,
        })
    }
}

/// 流水线错误类型
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("生成失败 ({kind:?}): {message}")]
    Generation {
        kind: GenerationFailureKind,
        message: String,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
