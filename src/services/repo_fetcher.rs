//! GitHub 仓库抓取
//!
//! 按顺序请求目录列表、语言统计、README 和关键文件内容，组装成 [`RepoContext`]。
//! 只有目录列表失败是致命的，其余子请求失败时退化为空值。

use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::cache::MemoCache;
use super::types::RepoContext;
use crate::config::AppConfig;
use crate::utils::truncate_chars;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = concat!("readme-forge/", env!("CARGO_PKG_VERSION"));

/// 目录列表中的条目
#[derive(Debug, Deserialize)]
struct ContentItem {
    name: String,
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReadmePayload {
    #[serde(default)]
    content: Option<String>,
}

/// 抓取器配置
#[derive(Debug, Clone)]
pub struct RepoFetcherConfig {
    /// GitHub API 基础 URL
    pub api_base: String,
    /// 需要抓取内容的文件名模式
    pub context_files: Vec<String>,
    /// 每个文件片段的最大字符数
    pub snippet_chars: usize,
    /// 请求超时（秒）
    pub timeout_secs: u64,
    /// 缓存容量
    pub cache_capacity: usize,
}

impl From<&AppConfig> for RepoFetcherConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_base: config.github_api_base.clone(),
            context_files: config.context_files.clone(),
            snippet_chars: config.snippet_chars,
            timeout_secs: config.request_timeout_secs,
            cache_capacity: config.cache_capacity,
        }
    }
}

/// 仓库抓取器
///
/// 成功的抓取结果按 URL 原文缓存
pub struct RepoFetcher {
    client: Client,
    api_base: String,
    allow_list: Vec<glob::Pattern>,
    snippet_chars: usize,
    cache: MemoCache<RepoContext>,
}

impl RepoFetcher {
    /// 创建新的抓取器
    pub fn new(config: RepoFetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(FetchError::Client)?;

        let allow_list = config
            .context_files
            .iter()
            .filter_map(|p| match glob::Pattern::new(&p.to_lowercase()) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Invalid context file pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            allow_list,
            snippet_chars: config.snippet_chars,
            cache: MemoCache::new(config.cache_capacity),
        })
    }

    /// 抓取仓库上下文（带缓存）
    pub async fn fetch(&self, repo_url: &str) -> Result<RepoContext, FetchError> {
        let (owner, repo) = parse_repo_url(repo_url)?;

        let key = MemoCache::<RepoContext>::key_for(&[repo_url]);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Repo context cache hit: {}/{}", owner, repo);
            return Ok(cached);
        }

        let context = self.fetch_uncached(&owner, &repo).await?;
        self.cache.insert(key, context.clone());
        Ok(context)
    }

    /// 清空缓存，返回清除的条目数
    pub fn clear_cache(&self) -> usize {
        self.cache.clear()
    }

    async fn fetch_uncached(&self, owner: &str, repo: &str) -> Result<RepoContext, FetchError> {
        info!("Fetching repository: {}/{}", owner, repo);
        let repo_api = format!("{}/repos/{}/{}", self.api_base, owner, repo);

        // 1. 目录列表（失败即终止）
        let items = self.fetch_listing(&repo_api).await?;
        let files: Vec<String> = items.iter().map(|item| item.name.clone()).collect();

        // 2. 语言统计
        let languages = self.fetch_languages(&repo_api).await;

        // 3. 现有 README
        let existing_readme = self.fetch_readme(&repo_api).await;

        // 4. 关键文件片段
        let mut context_files = BTreeMap::new();
        for item in items.iter().filter(|i| i.item_type == "file" && self.is_context_file(&i.name)) {
            let Some(download_url) = item.download_url.as_deref() else {
                continue;
            };
            if let Some(snippet) = self.fetch_snippet(download_url).await {
                context_files.insert(item.name.clone(), snippet);
            }
        }

        info!(
            "Fetched {}/{}: {} entries, {} languages, readme={}, {} context files",
            owner,
            repo,
            files.len(),
            languages.len(),
            !existing_readme.is_empty(),
            context_files.len()
        );

        Ok(RepoContext {
            owner: owner.to_string(),
            repo: repo.to_string(),
            files,
            languages,
            existing_readme,
            context_files,
        })
    }

    async fn fetch_listing(&self, repo_api: &str) -> Result<Vec<ContentItem>, FetchError> {
        let response = self
            .client
            .get(format!("{}/contents/", repo_api))
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if status != StatusCode::OK {
            error!("Listing request failed: status={}", status.as_u16());
            return Err(FetchError::ListingStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(FetchError::Request)?;
        serde_json::from_str(&body).map_err(FetchError::InvalidListing)
    }

    async fn fetch_languages(&self, repo_api: &str) -> BTreeMap<String, u64> {
        let response = match self.client.get(format!("{}/languages", repo_api)).send().await {
            Ok(r) if r.status() == StatusCode::OK => r,
            Ok(r) => {
                warn!("Languages request returned {}", r.status().as_u16());
                return BTreeMap::new();
            }
            Err(e) => {
                warn!("Languages request failed: {}", e);
                return BTreeMap::new();
            }
        };

        response.json().await.unwrap_or_else(|e| {
            warn!("Failed to parse languages: {}", e);
            BTreeMap::new()
        })
    }

    async fn fetch_readme(&self, repo_api: &str) -> String {
        let response = match self.client.get(format!("{}/readme", repo_api)).send().await {
            Ok(r) if r.status() == StatusCode::OK => r,
            Ok(r) => {
                debug!("No README available (status {})", r.status().as_u16());
                return String::new();
            }
            Err(e) => {
                warn!("README request failed: {}", e);
                return String::new();
            }
        };

        let payload: ReadmePayload = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to parse README payload: {}", e);
                return String::new();
            }
        };

        payload
            .content
            .as_deref()
            .and_then(decode_readme_content)
            .unwrap_or_default()
    }

    async fn fetch_snippet(&self, download_url: &str) -> Option<String> {
        let response = match self.client.get(download_url).send().await {
            Ok(r) if r.status() == StatusCode::OK => r,
            Ok(r) => {
                debug!("Skipping {}: status {}", download_url, r.status().as_u16());
                return None;
            }
            Err(e) => {
                debug!("Skipping {}: {}", download_url, e);
                return None;
            }
        };

        match response.text().await {
            Ok(text) => Some(truncate_chars(&text, self.snippet_chars).to_string()),
            Err(e) => {
                debug!("Skipping {}: {}", download_url, e);
                None
            }
        }
    }

    /// 文件名（小写后）是否命中白名单
    fn is_context_file(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.allow_list.iter().any(|p| p.matches(&lower))
    }
}

/// 从仓库 URL 中解析 owner 和 repo
///
/// 取路径最后两个非空片段；协议和主机部分会被跳过，末尾的 `/` 和 `.git` 会被忽略
pub fn parse_repo_url(repo_url: &str) -> Result<(String, String), FetchError> {
    let trimmed = repo_url.trim().trim_end_matches('/');

    let path = match trimmed.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
        None => trimmed,
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return Err(FetchError::InvalidUrl(repo_url.to_string()));
    }

    let owner = segments[segments.len() - 2];
    let repo = segments[segments.len() - 1];
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return Err(FetchError::InvalidUrl(repo_url.to_string()));
    }

    Ok((owner.to_string(), repo.to_string()))
}

/// 解码 GitHub contents API 返回的 base64 内容
///
/// GitHub 每 60 个字符插入换行，解码前去掉所有空白
pub fn decode_readme_content(content: &str) -> Option<String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = match base64::engine::general_purpose::STANDARD.decode(compact.as_bytes()) {
        Ok(b) => b,
        Err(e) => {
            warn!("README content is not valid base64: {}", e);
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("README content is not valid UTF-8: {}", e);
            None
        }
    }
}

/// 抓取错误类型
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid GitHub URL: {0}")]
    InvalidUrl(String),

    #[error("Error fetching repo contents: {0}")]
    ListingStatus(u16),

    #[error("仓库目录解析失败: {0}")]
    InvalidListing(#[source] serde_json::Error),

    #[error("GitHub 请求失败: {0}")]
    Request(#[source] reqwest::Error),

    #[error("HTTP 客户端创建失败: {0}")]
    Client(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(server: &MockServer) -> RepoFetcher {
        let mut config = RepoFetcherConfig::from(&AppConfig::default());
        config.api_base = server.uri();
        RepoFetcher::new(config).unwrap()
    }

    fn encode(text: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(text)
    }

    async fn mount_listing(server: &MockServer, body: serde_json::Value, expect: u64) {
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/contents/"))
            .and(header("accept", GITHUB_ACCEPT))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(expect)
            .mount(server)
            .await;
    }

    #[test]
    fn test_parse_repo_url() {
        let cases = [
            ("https://github.com/octo/demo", ("octo", "demo")),
            ("https://github.com/octo/demo/", ("octo", "demo")),
            ("https://github.com/octo/demo.git", ("octo", "demo")),
            ("github.com/octo/demo", ("octo", "demo")),
            ("octo/demo", ("octo", "demo")),
            ("  https://github.com/octo/demo  ", ("octo", "demo")),
        ];
        for (url, (owner, repo)) in cases {
            let parsed = parse_repo_url(url).unwrap();
            assert_eq!(parsed, (owner.to_string(), repo.to_string()), "url: {url}");
        }
    }

    #[test]
    fn test_parse_repo_url_rejects_short_paths() {
        for url in ["", "/", "demo", "https://github.com", "https://github.com/", "https://github.com/octo", "//octo//"] {
            assert!(
                matches!(parse_repo_url(url), Err(FetchError::InvalidUrl(_))),
                "url should be rejected: {url:?}"
            );
        }
    }

    #[test]
    fn test_decode_readme_round_trip() {
        let readme = "# Demo\n\nÜnïcödé README with `code`.\n";
        let encoded = encode(readme);
        // 模拟 GitHub 的换行折行
        let wrapped: String = encoded
            .as_bytes()
            .chunks(10)
            .map(|c| format!("{}\n", std::str::from_utf8(c).unwrap()))
            .collect();

        assert_eq!(decode_readme_content(&wrapped).as_deref(), Some(readme));
        assert_eq!(decode_readme_content("not base64 !!"), None);
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let err = fetcher.fetch("https://github.com/octo").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
        assert!(err.to_string().contains("Invalid GitHub URL"));
    }

    #[tokio::test]
    async fn test_listing_failure_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/contents/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let err = fetcher.fetch("https://github.com/octo/demo").await.unwrap_err();
        assert!(matches!(err, FetchError::ListingStatus(404)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_full_fetch() {
        let server = MockServer::start().await;
        let raw_base = format!("{}/raw", server.uri());

        mount_listing(
            &server,
            json!([
                {"name": "Package.json", "type": "file", "download_url": format!("{}/package.json", raw_base)},
                {"name": "main.py", "type": "file", "download_url": format!("{}/main.py", raw_base)},
                {"name": "app.py", "type": "dir", "download_url": null},
                {"name": "README.md", "type": "file", "download_url": format!("{}/README.md", raw_base)},
                {"name": "src", "type": "dir", "download_url": null}
            ]),
            1,
        )
        .await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/languages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Python": 4200, "JavaScript": 300})))
            .mount(&server)
            .await;

        let readme = "# Demo\nExisting docs.";
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/readme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": encode(readme), "encoding": "base64"})))
            .mount(&server)
            .await;

        let long_manifest = "a".repeat(5000);
        Mock::given(method("GET"))
            .and(path("/raw/package.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(long_manifest.clone()))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/raw/main.py"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        // README.md 不在白名单中，不应被下载
        Mock::given(method("GET"))
            .and(path("/raw/README.md"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let ctx = fetcher.fetch("https://github.com/octo/demo").await.unwrap();

        assert_eq!(ctx.owner, "octo");
        assert_eq!(ctx.repo, "demo");
        assert_eq!(ctx.files, vec!["Package.json", "main.py", "app.py", "README.md", "src"]);
        assert_eq!(ctx.languages.get("Python"), Some(&4200));
        assert_eq!(ctx.existing_readme, readme);

        assert_eq!(ctx.context_files.len(), 1);
        let snippet = &ctx.context_files["Package.json"];
        assert_eq!(snippet.chars().count(), 1000);
        assert_eq!(snippet.as_str(), &long_manifest[..1000]);
    }

    #[tokio::test]
    async fn test_sub_request_failures_degrade_to_defaults() {
        let server = MockServer::start().await;
        mount_listing(&server, json!([{"name": "lib.rs", "type": "file", "download_url": null}]), 1).await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/languages"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/readme"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let ctx = fetcher.fetch("octo/demo").await.unwrap();

        assert_eq!(ctx.files, vec!["lib.rs"]);
        assert!(ctx.languages.is_empty());
        assert!(ctx.existing_readme.is_empty());
        assert!(ctx.context_files.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_is_memoized_by_url() {
        let server = MockServer::start().await;
        mount_listing(&server, json!([]), 1).await;

        let fetcher = fetcher_for(&server);
        let first = fetcher.fetch("https://github.com/octo/demo").await.unwrap();
        let second = fetcher.fetch("https://github.com/octo/demo").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let server = MockServer::start().await;
        mount_listing(&server, json!([]), 2).await;

        let fetcher = fetcher_for(&server);
        fetcher.fetch("https://github.com/octo/demo").await.unwrap();
        assert_eq!(fetcher.clear_cache(), 1);
        fetcher.fetch("https://github.com/octo/demo").await.unwrap();
    }

    #[test]
    fn test_allow_list_is_case_insensitive_and_globbed() {
        let config = RepoFetcherConfig {
            api_base: "http://localhost".to_string(),
            context_files: vec!["Cargo.toml".to_string(), "*.gradle".to_string()],
            snippet_chars: 1000,
            timeout_secs: 5,
            cache_capacity: 4,
        };
        let fetcher = RepoFetcher::new(config).unwrap();

        assert!(fetcher.is_context_file("cargo.toml"));
        assert!(fetcher.is_context_file("CARGO.TOML"));
        assert!(fetcher.is_context_file("build.gradle"));
        assert!(!fetcher.is_context_file("main.rs"));
    }
}
