//! GitHub repository analysis over the REST API.

use std::future::Future;
use std::pin::Pin;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indexmap::IndexMap;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{IngestError, Result};

/// Default GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Directory levels listed by [`GitHubFetcher::analyze_repository`].
pub const STRUCTURE_DEPTH: usize = 2;

/// Characters kept per key file.
pub const KEY_FILE_CHARS: usize = 500;

/// Characters of README kept in the learning digest.
pub const README_DIGEST_CHARS: usize = 2000;

/// Files worth showing when present at the repository root.
pub const KEY_FILES: &[&str] = &[
    "requirements.txt",
    "package.json",
    "setup.py",
    "Makefile",
    ".gitignore",
    "LICENSE",
];

/// README placeholder when the repository has none.
pub const NO_README: &str = "No README found";

/// Owner, repository and optional in-repo path parsed from a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    pub owner: String,
    pub repo: String,
    pub path: Option<String>,
}

/// Parse `github.com/<owner>/<repo>` URLs, optionally followed by
/// `/tree/<ref>/<path>` or `/blob/<ref>/<path>`.
pub fn parse_github_url(input: &str) -> Result<RepoLocation> {
    let invalid = || IngestError::InvalidUrl(input.to_string());

    let trimmed = input.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme).map_err(|_| invalid())?;
    match url.host_str() {
        Some("github.com") | Some("www.github.com") => {}
        _ => return Err(invalid()),
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let (owner, repo, rest) = match segments.as_slice() {
        [owner, repo, rest @ ..] => (*owner, *repo, rest),
        _ => return Err(invalid()),
    };

    let path = match rest {
        [] => None,
        ["tree", _reference, path @ ..] => (!path.is_empty()).then(|| path.join("/")),
        ["blob", _reference, path @ ..] if !path.is_empty() => Some(path.join("/")),
        _ => return Err(invalid()),
    };

    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return Err(invalid());
    }

    Ok(RepoLocation {
        owner: owner.to_string(),
        repo: repo.to_string(),
        path,
    })
}

/// One node of a repository tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StructureNode {
    File { size: u64, path: String },
    Dir(DirectoryListing),
}

/// Entries of one directory, in API order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub entries: IndexMap<String, StructureNode>,
    /// Set when the depth limit stopped the listing here.
    #[serde(default)]
    pub truncated: bool,
    /// Listing error, recorded instead of failing the analysis.
    #[serde(default)]
    pub error: Option<String>,
}

impl DirectoryListing {
    fn truncated() -> Self {
        Self {
            truncated: true,
            ..Default::default()
        }
    }

    /// Flat `- path` list of the first `max_items` files and directories,
    /// depth first.
    pub fn summary(&self, max_items: usize) -> String {
        let mut lines = Vec::new();
        self.collect_summary("", max_items, &mut lines);
        lines.join("\n")
    }

    fn collect_summary(&self, prefix: &str, max_items: usize, lines: &mut Vec<String>) {
        for (name, node) in &self.entries {
            if lines.len() >= max_items {
                return;
            }
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", prefix, name)
            };
            match node {
                StructureNode::File { .. } => lines.push(format!("- {}", path)),
                StructureNode::Dir(listing) => {
                    lines.push(format!("- {}/", path));
                    listing.collect_summary(&path, max_items, lines);
                }
            }
        }
    }

    /// Indented tree rendering used in the learning digest.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.render_into(0, &mut out);
        out
    }

    fn render_into(&self, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        if self.truncated {
            out.push_str(&format!("{}...(truncated)\n", pad));
        }
        for (name, node) in &self.entries {
            match node {
                StructureNode::File { .. } => out.push_str(&format!("{}📄 {}\n", pad, name)),
                StructureNode::Dir(listing) => {
                    out.push_str(&format!("{}📁 {}/\n", pad, name));
                    listing.render_into(indent + 1, out);
                }
            }
        }
        if let Some(error) = &self.error {
            out.push_str(&format!("{}{}\n", pad, error));
        }
    }
}

/// A root-level file shown alongside the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFile {
    pub name: String,
    pub content: String,
}

/// Content fetched for the path embedded in a `tree`/`blob` URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificPath {
    pub path: String,
    pub content: String,
}

/// Everything gathered about a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoAnalysis {
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub stars: u64,
    pub structure: DirectoryListing,
    pub readme: String,
    pub key_files: Vec<KeyFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_path: Option<SpecificPath>,
}

/// Markdown digest of an analysis, used as curriculum input.
pub fn learning_content(analysis: &RepoAnalysis) -> String {
    let mut content = format!("# Repository: {}\n\n", analysis.name);

    if let Some(description) = analysis.description.as_deref().filter(|d| !d.is_empty()) {
        content.push_str(&format!("## Description\n{}\n\n", description));
    }

    if !analysis.readme.is_empty() {
        let excerpt: String = analysis.readme.chars().take(README_DIGEST_CHARS).collect();
        content.push_str(&format!("## README Content\n{}\n\n", excerpt));
    }

    content.push_str(&format!(
        "## Primary Language: {}\n\n",
        analysis.language.as_deref().unwrap_or("Unknown")
    ));

    if !analysis.topics.is_empty() {
        content.push_str(&format!("## Topics: {}\n\n", analysis.topics.join(", ")));
    }

    content.push_str("## Repository Structure\n");
    content.push_str(&analysis.structure.render_tree());

    if !analysis.key_files.is_empty() {
        content.push_str("\n## Key Configuration Files\n");
        for file in &analysis.key_files {
            content.push_str(&format!("\n### {}\n```\n{}\n```\n", file.name, file.content));
        }
    }

    content
}

#[derive(Debug, Deserialize)]
struct RepoMetadata {
    name: String,
    description: Option<String>,
    html_url: String,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TopicsResponse {
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    size: u64,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<ContentEntry>),
    File(ContentFile),
}

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

/// Decode the base64 body GitHub returns for file contents.
fn decode_content(file: &ContentFile) -> Result<String> {
    if let Some(encoding) = file.encoding.as_deref() {
        if encoding != "base64" {
            return Err(IngestError::Read(format!("unsupported encoding: {}", encoding)));
        }
    }

    // GitHub wraps the base64 payload at 60 columns
    let compact: String = file.content.split_whitespace().collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| IngestError::Read(format!("base64: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| IngestError::Read(e.to_string()))
}

/// Read-only GitHub client.
#[derive(Clone)]
pub struct GitHubFetcher {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubFetcher {
    /// Create a fetcher. Without a token, requests are anonymous and subject
    /// to GitHub's lower rate limit.
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("learning-copilot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Create a fetcher from `GITHUB_ACCESS_TOKEN` and `GITHUB_API_URL`.
    pub fn from_env() -> Result<Self> {
        let api_url =
            std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(api_url, std::env::var("GITHUB_ACCESS_TOKEN").ok())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.api_url, path);
        debug!("GET {}", url);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GitHubErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(IngestError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    async fn contents(&self, location: &RepoLocation, path: &str) -> Result<ContentsResponse> {
        self.get_json(&format!(
            "/repos/{}/{}/contents/{}",
            location.owner,
            location.repo,
            path.trim_start_matches('/')
        ))
        .await
    }

    async fn readme(&self, location: &RepoLocation) -> String {
        let result: Result<ContentFile> = self
            .get_json(&format!("/repos/{}/{}/readme", location.owner, location.repo))
            .await;

        match result.and_then(|file| decode_content(&file)) {
            Ok(text) => text,
            Err(e) => {
                debug!("README unavailable for {}/{}: {}", location.owner, location.repo, e);
                NO_README.to_string()
            }
        }
    }

    async fn topics(&self, location: &RepoLocation, fallback: Vec<String>) -> Vec<String> {
        let result: Result<TopicsResponse> = self
            .get_json(&format!("/repos/{}/{}/topics", location.owner, location.repo))
            .await;
        match result {
            Ok(topics) => topics.names,
            Err(e) => {
                debug!("Topics unavailable, using metadata: {}", e);
                fallback
            }
        }
    }

    /// Fetch a single file as text.
    async fn file_content(&self, location: &RepoLocation, path: &str) -> Result<String> {
        match self.contents(location, path).await? {
            ContentsResponse::Listing(_) => {
                Err(IngestError::Read("Path is a directory, not a file".to_string()))
            }
            ContentsResponse::File(file) => decode_content(&file),
        }
    }

    fn directory_structure<'a>(
        &'a self,
        location: &'a RepoLocation,
        path: String,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = DirectoryListing> + Send + 'a>> {
        Box::pin(async move {
            if depth >= STRUCTURE_DEPTH {
                return DirectoryListing::truncated();
            }

            let entries = match self.contents(location, &path).await {
                Ok(ContentsResponse::Listing(entries)) => entries,
                Ok(ContentsResponse::File(_)) => Vec::new(),
                Err(e) => {
                    warn!("Failed to list {:?}: {}", path, e);
                    return DirectoryListing {
                        error: Some(e.to_string()),
                        ..Default::default()
                    };
                }
            };

            let mut listing = DirectoryListing::default();
            for entry in entries {
                let node = if entry.entry_type == "dir" {
                    StructureNode::Dir(
                        self.directory_structure(location, entry.path, depth + 1)
                            .await,
                    )
                } else {
                    StructureNode::File {
                        size: entry.size,
                        path: entry.path,
                    }
                };
                listing.entries.insert(entry.name, node);
            }
            listing
        })
    }

    /// Gather metadata, README, structure and key files for a repository URL.
    pub async fn analyze_repository(&self, url: &str) -> Result<RepoAnalysis> {
        let location = parse_github_url(url)?;
        info!("Analyzing repository {}/{}", location.owner, location.repo);

        let metadata: RepoMetadata = self
            .get_json(&format!("/repos/{}/{}", location.owner, location.repo))
            .await?;

        let readme = self.readme(&location).await;
        let topics = self.topics(&location, metadata.topics).await;
        let structure = self
            .directory_structure(&location, String::new(), 0)
            .await;

        let mut key_files = Vec::new();
        for name in KEY_FILES {
            match self.file_content(&location, name).await {
                Ok(content) => key_files.push(KeyFile {
                    name: name.to_string(),
                    content: content.chars().take(KEY_FILE_CHARS).collect(),
                }),
                Err(e) => debug!("Key file {} skipped: {}", name, e),
            }
        }

        let specific_path = match &location.path {
            Some(path) => {
                let content = match self.file_content(&location, path).await {
                    Ok(content) => content,
                    Err(IngestError::Read(message)) => message,
                    Err(e) => format!("Error fetching file: {}", e),
                };
                Some(SpecificPath {
                    path: path.clone(),
                    content,
                })
            }
            None => None,
        };

        Ok(RepoAnalysis {
            name: metadata.name,
            description: metadata.description,
            url: metadata.html_url,
            language: metadata.language,
            topics,
            stars: metadata.stargazers_count,
            structure,
            readme,
            key_files,
            specific_path,
        })
    }
}

impl std::fmt::Debug for GitHubFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubFetcher")
            .field("api_url", &self.api_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

/// Whether an error means the repository does not exist or is private.
pub fn is_not_found(error: &IngestError) -> bool {
    matches!(error, IngestError::Api { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(owner: &str, repo: &str, path: Option<&str>) -> RepoLocation {
        RepoLocation {
            owner: owner.into(),
            repo: repo.into(),
            path: path.map(Into::into),
        }
    }

    #[test]
    fn test_parse_plain_repo_urls() {
        assert_eq!(
            parse_github_url("https://github.com/karpathy/nanoGPT").unwrap(),
            loc("karpathy", "nanoGPT", None)
        );
        assert_eq!(
            parse_github_url("github.com/karpathy/micrograd/").unwrap(),
            loc("karpathy", "micrograd", None)
        );
        assert_eq!(
            parse_github_url("https://github.com/karpathy/minGPT.git").unwrap(),
            loc("karpathy", "minGPT", None)
        );
    }

    #[test]
    fn test_parse_tree_and_blob_urls() {
        assert_eq!(
            parse_github_url("https://github.com/karpathy/nanoGPT/tree/master/config").unwrap(),
            loc("karpathy", "nanoGPT", Some("config"))
        );
        assert_eq!(
            parse_github_url("https://github.com/karpathy/nanoGPT/tree/master").unwrap(),
            loc("karpathy", "nanoGPT", None)
        );
        assert_eq!(
            parse_github_url("https://github.com/karpathy/llm.c/blob/main/dev/cuda/README.md")
                .unwrap(),
            loc("karpathy", "llm.c", Some("dev/cuda/README.md"))
        );
    }

    #[test]
    fn test_parse_rejects_other_urls() {
        for url in [
            "https://gitlab.com/a/b",
            "https://github.com/karpathy",
            "https://github.com/a/b/issues/1",
            "https://github.com/a/b/blob/main",
            "not a url at all",
        ] {
            assert!(
                matches!(parse_github_url(url), Err(IngestError::InvalidUrl(_))),
                "{} should be rejected",
                url
            );
        }
    }

    #[test]
    fn test_decode_wrapped_base64() {
        let file = ContentFile {
            content: "SGVsbG8s\nIHdvcmxk\nIQ==\n".to_string(),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(decode_content(&file).unwrap(), "Hello, world!");
    }

    fn sample_analysis() -> RepoAnalysis {
        let inner = DirectoryListing::truncated();
        let mut src = DirectoryListing::default();
        src.entries.insert(
            "model.py".into(),
            StructureNode::File {
                size: 10,
                path: "src/model.py".into(),
            },
        );
        src.entries.insert("layers".into(), StructureNode::Dir(inner));

        let mut structure = DirectoryListing::default();
        structure.entries.insert(
            "README.md".into(),
            StructureNode::File {
                size: 5,
                path: "README.md".into(),
            },
        );
        structure.entries.insert("src".into(), StructureNode::Dir(src));

        RepoAnalysis {
            name: "nanoGPT".into(),
            description: Some("The simplest GPT".into()),
            url: "https://github.com/karpathy/nanoGPT".into(),
            language: Some("Python".into()),
            topics: vec!["gpt".into(), "pytorch".into()],
            stars: 1,
            structure,
            readme: "r".repeat(2500),
            key_files: vec![KeyFile {
                name: "requirements.txt".into(),
                content: "torch".into(),
            }],
            specific_path: None,
        }
    }

    #[test]
    fn test_structure_summary() {
        let analysis = sample_analysis();
        assert_eq!(
            analysis.structure.summary(20),
            "- README.md\n- src/\n- src/model.py\n- src/layers/"
        );
        assert_eq!(analysis.structure.summary(2), "- README.md\n- src/");
    }

    #[test]
    fn test_learning_content_digest() {
        let digest = learning_content(&sample_analysis());
        assert!(digest.starts_with("# Repository: nanoGPT\n\n## Description\nThe simplest GPT"));
        assert!(digest.contains(&format!("## README Content\n{}\n\n", "r".repeat(2000))));
        assert!(!digest.contains(&"r".repeat(2001)));
        assert!(digest.contains("## Primary Language: Python"));
        assert!(digest.contains("## Topics: gpt, pytorch"));
        assert!(digest.contains("📁 src/\n  📄 model.py\n  📁 layers/\n    ...(truncated)\n"));
        assert!(digest.contains("### requirements.txt\n```\ntorch\n```"));
    }

    #[test]
    fn test_structure_serializes_with_type_tags() {
        let value = serde_json::to_value(&sample_analysis().structure).unwrap();
        assert_eq!(value["entries"]["README.md"]["type"], "file");
        assert_eq!(value["entries"]["src"]["type"], "dir");
        assert_eq!(value["entries"]["src"]["entries"]["layers"]["truncated"], true);
    }

    #[test]
    fn test_not_found_classification() {
        let err = IngestError::Api {
            status: 404,
            message: "Not Found".into(),
        };
        assert!(is_not_found(&err));
        assert!(!is_not_found(&IngestError::InvalidUrl("x".into())));
    }

    #[test]
    fn test_blank_token_is_anonymous() {
        let fetcher = GitHubFetcher::new(DEFAULT_API_URL, Some("  ".into())).unwrap();
        assert!(!fetcher.is_authenticated());
        let fetcher = GitHubFetcher::new(DEFAULT_API_URL, Some("ghp_x".into())).unwrap();
        assert!(fetcher.is_authenticated());
    }
}
