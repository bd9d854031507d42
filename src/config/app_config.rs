//! 应用配置管理
//!
//! 提供配置的加载、保存、更新功能，使用全局单例模式管理配置状态。
//! API 密钥优先从环境变量 `GROQ_API_KEY` 读取（`.env` 文件在启动时加载）。

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// 存放生成服务密钥的环境变量
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// 获取配置文件路径
fn get_config_path() -> PathBuf {
    // 配置文件位于可执行文件同级目录
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.json")
}

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM API 密钥
    #[serde(default)]
    pub api_key: String,

    /// LLM API 基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 模型名称
    #[serde(default = "default_model")]
    pub model: String,

    /// 温度参数 (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// 最大 token 数
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// GitHub REST API 基础 URL
    #[serde(default = "default_github_api_base")]
    pub github_api_base: String,

    /// 需要抓取内容片段的文件名（glob，按小写文件名匹配）
    #[serde(default = "default_context_files")]
    pub context_files: Vec<String>,

    /// 单个文件片段保留的最大字符数
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,

    /// Prompt 中嵌入现有 README 的最大字符数
    #[serde(default = "default_readme_excerpt_chars")]
    pub readme_excerpt_chars: usize,

    /// 外部请求超时（秒）
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// 每个缓存最多保留的条目数
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// 分节标记缺失/重复/乱序时是否直接报错
    #[serde(default)]
    pub strict_parsing: bool,

    /// 监听地址
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_base_url() -> String {
    "https://api.groq.com/openai".to_string()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_context_files() -> Vec<String> {
    ["package.json", "setup.py", "requirements.txt", "main.py", "app.py"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_snippet_chars() -> usize {
    1000
}

fn default_readme_excerpt_chars() -> usize {
    2000
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_cache_capacity() -> usize {
    128
}

fn default_bind_addr() -> String {
    "127.0.0.1:8765".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            github_api_base: default_github_api_base(),
            context_files: default_context_files(),
            snippet_chars: default_snippet_chars(),
            readme_excerpt_chars: default_readme_excerpt_chars(),
            request_timeout_secs: default_request_timeout_secs(),
            cache_capacity: default_cache_capacity(),
            strict_parsing: false,
            bind_addr: default_bind_addr(),
        }
    }
}

impl AppConfig {
    /// 是否已配置 API 密钥
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// 全局配置单例
static CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    let mut config = load_config_from_path(&get_config_path()).unwrap_or_default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    RwLock::new(config)
});

/// 从指定路径加载配置
fn load_config_from_path(path: &Path) -> Option<AppConfig> {
    if path.exists() {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    } else {
        None
    }
}

/// 用环境变量覆盖配置
///
/// 空字符串视为未设置
fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
        config.api_key = key;
    }
}

/// 保存配置到指定路径
///
/// 来自环境变量的密钥不会写入磁盘
fn save_config_to_path(config: &AppConfig, path: &Path, key_from_env: bool) -> Result<(), AppError> {
    let mut persisted = config.clone();
    if key_from_env {
        persisted.api_key.clear();
    }
    let content = serde_json::to_string_pretty(&persisted)
        .map_err(|e| AppError::Config(format!("序列化配置失败: {}", e)))?;
    fs::write(path, content).map_err(|e| AppError::Config(format!("写入配置文件失败: {}", e)))?;
    Ok(())
}

fn save_config_to_file(config: &AppConfig) -> Result<(), AppError> {
    let key_from_env = std::env::var(API_KEY_ENV)
        .map(|k| !k.trim().is_empty() && k == config.api_key)
        .unwrap_or(false);
    save_config_to_path(config, &get_config_path(), key_from_env)
}

/// 获取当前配置（克隆）
pub fn get_config() -> AppConfig {
    CONFIG.read().clone()
}

/// 更新配置
///
/// 接收一个闭包来修改配置，保存到文件成功后才替换内存中的配置
pub fn update_config<F>(updater: F) -> Result<AppConfig, AppError>
where
    F: FnOnce(&mut AppConfig),
{
    let mut config = CONFIG.write();
    commit_update(&mut config, updater, save_config_to_file)
}

/// 在副本上应用修改并持久化，持久化失败时 `current` 保持不变
fn commit_update<F, P>(current: &mut AppConfig, updater: F, persist: P) -> Result<AppConfig, AppError>
where
    F: FnOnce(&mut AppConfig),
    P: FnOnce(&AppConfig) -> Result<(), AppError>,
{
    let mut next = current.clone();
    updater(&mut next);
    persist(&next)?;
    *current = next.clone();
    Ok(next)
}
