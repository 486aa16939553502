//! GitHub Gists paste service.
//!
//! Uploads go to `POST {base_url}/gists`; the gist's `html_url` is the
//! reference handed back to the user.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{PasteService, UploadReceipt, Visibility};
use crate::auth::{GITHUB_KEY, TokenStore};
use crate::config::Config;

/// Default base URL for the GitHub REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Environment override for the API base URL (GitHub Enterprise, mock servers).
pub const BASE_URL_ENV: &str = "HISTPASTE_GITHUB_API_URL";

/// Environment variable consulted for a token when the config has none.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const CLIENT_USER_AGENT: &str = concat!("histpaste/", env!("CARGO_PKG_VERSION"));

/// Configuration for the gist client.
#[derive(Debug, Clone)]
pub struct GistConfig {
    pub base_url: String,
    /// Token used for uploads; uploads fail without one.
    pub token: Option<String>,
    /// Description attached to every created gist.
    pub description: String,
}

impl GistConfig {
    /// Resolves the client configuration.
    ///
    /// Base URL resolution order:
    /// 1. `HISTPASTE_GITHUB_API_URL` env var (if set and non-empty)
    /// 2. `[github].base_url` from config
    /// 3. Default: `https://api.github.com`
    ///
    /// Token resolution order:
    /// 1. `[github].token` from config
    /// 2. `GITHUB_TOKEN` env var
    /// 3. Token saved by `histpaste login`
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = resolve_base_url(config.github.base_url.as_deref())?;
        let token = resolve_token(config.github.token.as_deref())?;

        Ok(Self {
            base_url,
            token,
            description: config.github.description.clone(),
        })
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Resolves the API base URL with precedence: env > config > default.
fn resolve_base_url(config_base_url: Option<&str>) -> Result<String> {
    let env_url = std::env::var(BASE_URL_ENV).ok();
    choose_base_url(env_url.as_deref(), config_base_url)
}

fn choose_base_url(env_url: Option<&str>, config_base_url: Option<&str>) -> Result<String> {
    let chosen = env_url
        .and_then(non_empty)
        .or_else(|| config_base_url.and_then(non_empty));

    let Some(url) = chosen else {
        return Ok(DEFAULT_BASE_URL.to_string());
    };
    url::Url::parse(url).with_context(|| format!("Invalid GitHub API base URL: {url}"))?;
    Ok(url.trim_end_matches('/').to_string())
}

/// Resolves the token with precedence: config > env > token store.
fn resolve_token(config_token: Option<&str>) -> Result<Option<String>> {
    if let Some(token) = config_token.and_then(non_empty) {
        return Ok(Some(token.to_string()));
    }

    if let Ok(token) = std::env::var(TOKEN_ENV)
        && let Some(token) = non_empty(&token)
    {
        return Ok(Some(token.to_string()));
    }

    let store = TokenStore::load().context("load saved GitHub token")?;
    Ok(store.get(GITHUB_KEY).map(|saved| saved.token.clone()))
}

#[derive(Debug, Serialize)]
struct CreateGistRequest<'a> {
    description: &'a str,
    public: bool,
    files: BTreeMap<&'a str, GistFile<'a>>,
}

#[derive(Debug, Serialize)]
struct GistFile<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct GistResponse {
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// GitHub gist client.
pub struct GistClient {
    config: GistConfig,
    http: reqwest::Client,
}

impl GistClient {
    /// Creates a client with the given configuration.
    ///
    /// # Panics
    /// In test builds, panics if `base_url` is the production API so unit
    /// tests never reach GitHub. Point them at a mock server instead.
    pub fn new(config: GistConfig) -> Self {
        #[cfg(test)]
        if config.base_url == DEFAULT_BASE_URL {
            panic!(
                "Tests must not use the production GitHub API!\n\
                 Set {BASE_URL_ENV} to a mock server (e.g., wiremock)."
            );
        }

        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Creates a gist holding a single file.
    pub async fn create(
        &self,
        text: &str,
        filename: &str,
        visibility: Visibility,
    ) -> Result<UploadReceipt, UploadError> {
        let token = self
            .config
            .token
            .as_deref()
            .ok_or(UploadError::Unauthenticated)?;

        let body = CreateGistRequest {
            description: &self.config.description,
            public: visibility.is_public(),
            files: BTreeMap::from([(filename, GistFile { content: text })]),
        };

        info!(filename, %visibility, bytes = text.len(), "creating gist");
        let response = self
            .http
            .post(format!("{}/gists", self.config.base_url))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header(API_VERSION_HEADER, API_VERSION)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let gist: GistResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        debug!(url = %gist.html_url, "gist created");
        Ok(UploadReceipt { url: gist.html_url })
    }

    /// Returns the login name a token belongs to.
    pub async fn authenticated_login(&self, token: &str) -> Result<String, UploadError> {
        let response = self
            .http
            .get(format!("{}/user", self.config.base_url))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header(API_VERSION_HEADER, API_VERSION)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let user: UserResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        Ok(user.login)
    }
}

impl PasteService for GistClient {
    fn upload(
        &self,
        text: &str,
        filename: &str,
        visibility: Visibility,
    ) -> impl Future<Output = Result<UploadReceipt, UploadError>> + Send {
        self.create(text, filename, visibility)
    }
}

/// Maps a non-2xx response to [`UploadError::Api`], using GitHub's
/// `message` field when the body has one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, UploadError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| body.trim().to_string());

    Err(UploadError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Paste service errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// No token is configured.
    Unauthenticated,
    /// The request never got a response.
    Transport(String),
    /// The service answered with a non-success status.
    Api { status: u16, message: String },
    /// The service answered 2xx with a body we could not read.
    InvalidResponse(String),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Unauthenticated => write!(
                f,
                "Not logged in to GitHub. Run `histpaste login` or set {TOKEN_ENV}."
            ),
            UploadError::Transport(msg) => write!(f, "Failed to reach GitHub: {msg}"),
            UploadError::Api { status, message } => {
                write!(f, "GitHub rejected the request ({status}): {message}")
            }
            UploadError::InvalidResponse(msg) => write!(f, "Unexpected GitHub response: {msg}"),
        }
    }
}

impl std::error::Error for UploadError {}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer, token: Option<&str>) -> GistClient {
        GistClient::new(GistConfig {
            base_url: server.uri(),
            token: token.map(ToString::to_string),
            description: "test upload".to_string(),
        })
    }

    #[tokio::test]
    async fn test_create_posts_single_file_gist() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gists"))
            .and(header("authorization", "Bearer secret-token"))
            .and(header("accept", GITHUB_ACCEPT))
            .and(body_partial_json(json!({
                "description": "test upload",
                "public": false,
                "files": { "session.rb": { "content": "1 + 1\n# => 2\n" } }
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "html_url": "https://gist.github.com/abc123" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let receipt = client_for(&server, Some("secret-token"))
            .create("1 + 1\n# => 2\n", "session.rb", Visibility::Secret)
            .await
            .unwrap();

        assert_eq!(receipt.url, "https://gist.github.com/abc123");
    }

    #[tokio::test]
    async fn test_public_flag_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gists"))
            .and(body_partial_json(json!({ "public": true })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "html_url": "https://g/1" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let receipt = client_for(&server, Some("t"))
            .upload("x", "x.txt", Visibility::Public)
            .await
            .unwrap();
        assert_eq!(receipt.url, "https://g/1");
    }

    #[tokio::test]
    async fn test_api_error_uses_github_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gists"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Bad credentials",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("expired"))
            .create("x", "x.txt", Visibility::Secret)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            UploadError::Api {
                status: 401,
                message: "Bad credentials".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_token_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .create("x", "x.txt", Visibility::Secret)
            .await
            .unwrap_err();

        assert_eq!(err, UploadError::Unauthenticated);
    }

    #[tokio::test]
    async fn test_authenticated_login() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer pat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "octocat" })))
            .mount(&server)
            .await;

        let login = client_for(&server, None)
            .authenticated_login("pat")
            .await
            .unwrap();
        assert_eq!(login, "octocat");
    }

    #[test]
    fn test_base_url_env_wins_over_config() {
        let url = choose_base_url(Some("http://127.0.0.1:9000/"), Some("https://ghe.example.com/api/v3"))
            .unwrap();
        assert_eq!(url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_base_url_blank_values_fall_through() {
        assert_eq!(choose_base_url(Some("  "), None).unwrap(), DEFAULT_BASE_URL);
        assert_eq!(
            choose_base_url(None, Some("https://ghe.example.com/api/v3")).unwrap(),
            "https://ghe.example.com/api/v3"
        );
    }

    #[test]
    fn test_base_url_is_validated() {
        let err = choose_base_url(None, Some("not a url")).unwrap_err();
        assert!(err.to_string().contains("Invalid GitHub API base URL"));
    }
}
