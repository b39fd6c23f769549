//! remote::github
//!
//! GitHub contents API client.
//!
//! # Design
//!
//! This module implements the `ContentSource` trait on top of the REST
//! endpoint `GET /repos/{owner}/{repo}/contents/{path}`. The same endpoint
//! serves two representations, selected with the `Accept` header:
//! - a JSON listing (one object for a file, an array for a directory)
//! - the raw file bytes
//!
//! Listing entries carry absolute addresses (`url` for nested listings,
//! `download_url` for file content) which are requested verbatim.
//!
//! # Authentication
//!
//! A token is optional and fixed at construction. When present it is sent as
//! a bearer token on every request; it never appears in `Debug` output.
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This client does not retry; a 403/429 surfaces as
//! `RemoteError::Api` with the response body. Bounding concurrency is the
//! job of [`ThrottledSource`](super::ThrottledSource).
//!
//! # Example
//!
//! ```ignore
//! use remote_deploy::remote::{github::GitHubContents, ContentSource};
//! use remote_deploy::core::types::{RemoteLocation, Target};
//!
//! let source = GitHubContents::new(Some("ghp_xxx".to_string()));
//! let location = RemoteLocation::new("octocat", "hello-world", "README.md")?;
//! let bytes = source.raw(&Target::Location(location)).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode, Url};

use super::traits::{ContentSource, Payload, RemoteError, ResponseKind};
use crate::core::types::{Listing, RemoteLocation, Target};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "rdeploy-cli";

/// GitHub contents API client.
pub struct GitHubContents {
    /// HTTP client for making requests
    client: Client,
    /// Bearer token, if any
    token: Option<String>,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubContents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubContents")
            .field("has_token", &self.token.is_some())
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubContents {
    /// Create a client for `api.github.com`.
    pub fn new(token: Option<String>) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a client for a custom API base URL.
    ///
    /// Use this for GitHub Enterprise (e.g., `https://github.example.com/api/v3`)
    /// or for tests against a local server.
    pub fn with_api_base(token: Option<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.filter(|t| !t.is_empty()),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Replace the HTTP client with one that enforces a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Network` if the client cannot be built.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, RemoteError> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        Ok(self)
    }

    /// Check if requests will carry an `Authorization` header.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build the contents URL for a structured location.
    ///
    /// Owner, repo and every path segment are percent-encoded, so names
    /// containing `#`, `?`, `%` or spaces address exactly that path.
    fn contents_url(&self, location: &RemoteLocation) -> Result<String, RemoteError> {
        let invalid_base = |reason: String| {
            RemoteError::Network(format!("invalid API base '{}': {}", self.api_base, reason))
        };

        let mut url = Url::parse(&self.api_base).map_err(|e| invalid_base(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| invalid_base("cannot be a base URL".to_string()))?;
            segments
                .pop_if_empty()
                .extend(["repos", location.owner(), location.repo(), "contents"]);
            if !location.path().is_empty() {
                segments.extend(location.path().split('/'));
            }
        }
        Ok(url.to_string())
    }

    /// Build request headers for the given representation.
    fn headers(&self, kind: ResponseKind) -> Result<HeaderMap, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(kind.accept_header()));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Some(ref token) = self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| RemoteError::Network("token contains invalid characters".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl ContentSource for GitHubContents {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn fetch(&self, target: &Target, kind: ResponseKind) -> Result<Payload, RemoteError> {
        let (url, git_ref) = match target {
            Target::Location(location) => (self.contents_url(location)?, location.git_ref()),
            Target::Reference(uri) => (uri.clone(), None),
        };

        let mut request = self.client.get(&url).headers(self.headers(kind)?);
        if let Some(r) = git_ref {
            request = request.query(&[("ref", r)]);
        }

        log::debug!("GET {} ({:?})", url, kind);
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(url));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("failed to read error body: {}", e));
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            });
        }

        match kind {
            ResponseKind::Raw => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| RemoteError::Network(e.to_string()))?;
                Ok(Payload::Raw(bytes.to_vec()))
            }
            ResponseKind::Listing => {
                let value: serde_json::Value = response.json().await.map_err(|e| {
                    RemoteError::MalformedEntry(format!("invalid listing from {}: {}", url, e))
                })?;
                Ok(Payload::Listing(Listing::from_json(value)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(path: &str) -> RemoteLocation {
        RemoteLocation::new("octocat", "hello-world", path).unwrap()
    }

    #[test]
    fn contents_url_format() {
        let source = GitHubContents::new(None);
        assert_eq!(
            source.contents_url(&location("force-app/main")).unwrap(),
            "https://api.github.com/repos/octocat/hello-world/contents/force-app/main"
        );
    }

    #[test]
    fn contents_url_for_root_has_no_trailing_slash() {
        let source = GitHubContents::new(None);
        assert_eq!(
            source.contents_url(&location("")).unwrap(),
            "https://api.github.com/repos/octocat/hello-world/contents"
        );
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let source = GitHubContents::with_api_base(None, "https://github.example.com/api/v3/");
        assert_eq!(source.api_base(), "https://github.example.com/api/v3");
        assert_eq!(
            source.contents_url(&location("a")).unwrap(),
            "https://github.example.com/api/v3/repos/octocat/hello-world/contents/a"
        );
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let source = GitHubContents::new(None);
        assert_eq!(
            source.contents_url(&location("docs/C#/x")).unwrap(),
            "https://api.github.com/repos/octocat/hello-world/contents/docs/C%23/x"
        );
        assert_eq!(
            source.contents_url(&location("My Docs/what?/100%")).unwrap(),
            "https://api.github.com/repos/octocat/hello-world/contents/My%20Docs/what%3F/100%25"
        );
    }

    #[test]
    fn unparsable_api_base_is_reported() {
        let source = GitHubContents::with_api_base(None, "not a url");
        assert!(matches!(
            source.contents_url(&location("a")),
            Err(RemoteError::Network(msg)) if msg.contains("invalid API base")
        ));
    }

    #[test]
    fn empty_token_is_no_token() {
        assert!(!GitHubContents::new(Some(String::new())).has_token());
        assert!(GitHubContents::new(Some("ghp_abc".into())).has_token());
    }

    #[test]
    fn authorization_only_with_token() {
        let anonymous = GitHubContents::new(None);
        let headers = anonymous.headers(ResponseKind::Listing).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(
            headers.get(ACCEPT).unwrap(),
            "application/vnd.github.v3.json"
        );

        let authed = GitHubContents::new(Some("ghp_abc".into()));
        let headers = authed.headers(ResponseKind::Raw).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer ghp_abc");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/vnd.github.v3.raw");
    }

    #[test]
    fn debug_redacts_token() {
        let source = GitHubContents::new(Some("secret_token_abc123".into()));
        let debug_output = format!("{:?}", source);
        assert!(!debug_output.contains("secret_token_abc123"));
        assert!(debug_output.contains("has_token"));
    }

    #[test]
    fn timeout_builds_client() {
        let source = GitHubContents::new(None)
            .with_timeout(Duration::from_secs(5))
            .unwrap();
        assert_eq!(source.name(), "github");
    }
}
