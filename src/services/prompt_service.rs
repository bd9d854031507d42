//! Prompt 构建服务
//!
//! 根据输入方式（项目描述或仓库上下文）组装系统提示词和用户消息

use super::prompts::{
    format_idea_prompt, format_repo_prompt, CREATE_README_INSTRUCTION, IDEA_SYSTEM_PROMPT,
    IMPROVE_README_INSTRUCTION, REPO_SYSTEM_PROMPT,
};
use super::types::RepoContext;
use crate::utils::truncate_chars;

/// 组装好的一次生成输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system_message: String,
    pub prompt: String,
}

/// Prompt 服务
pub struct PromptService {
    /// 嵌入现有 README 的最大字符数
    readme_excerpt_chars: usize,
}

impl PromptService {
    /// 创建新的 Prompt 服务
    pub fn new(readme_excerpt_chars: usize) -> Self {
        Self {
            readme_excerpt_chars,
        }
    }

    /// 根据项目描述（可选标题）构建
    pub fn compose_from_idea(&self, title: Option<&str>, description: &str) -> ComposedPrompt {
        ComposedPrompt {
            system_message: IDEA_SYSTEM_PROMPT.to_string(),
            prompt: format_idea_prompt(title, description),
        }
    }

    /// 根据仓库上下文构建
    pub fn compose_from_repo(&self, repo: &RepoContext) -> ComposedPrompt {
        let instruction = if repo.has_readme() {
            IMPROVE_README_INSTRUCTION
        } else {
            CREATE_README_INSTRUCTION
        };

        ComposedPrompt {
            system_message: REPO_SYSTEM_PROMPT.to_string(),
            prompt: format_repo_prompt(instruction, &self.build_repo_context(repo)),
        }
    }

    /// 构建仓库技术细节
    fn build_repo_context(&self, repo: &RepoContext) -> String {
        let languages = repo
            .languages_by_size()
            .iter()
            .map(|(name, bytes)| format!("{} ({} bytes)", name, bytes))
            .collect::<Vec<_>>()
            .join(", ");

        let mut context = format!("File list: {}\n", repo.files.join(", "));
        context.push_str(&format!("Languages: {}\n", languages));

        if repo.has_readme() {
            context.push_str(&format!(
                "\n--- EXISTING README.md ---\n{}\n",
                truncate_chars(&repo.existing_readme, self.readme_excerpt_chars)
            ));
        }

        context.push_str("\nKey file contents:\n");
        for (name, content) in &repo.context_files {
            context.push_str(&format!("\n--- {} ---\n{}\n", name, content));
        }

        context
    }
}
