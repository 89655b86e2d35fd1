use std::sync::Arc;

use http::header::{HeaderValue, AUTHORIZATION};
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use serde_json::Value;

use crate::error::{McpGithubOrgError, UpstreamError};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Thin GitHub REST client. One GET per call, no retries, no pagination.
///
/// The credential is fixed at construction and sent as
/// `Authorization: token <credential>` on every request; without one no
/// `Authorization` header is sent at all.
#[derive(Clone)]
pub struct GithubClient {
    octocrab: Arc<Octocrab>,
    api_url: String,
    authenticated: bool,
}

impl GithubClient {
    /// Must be called from within a Tokio runtime.
    pub fn new(api_url: &str, token: Option<&str>) -> Result<Self, McpGithubOrgError> {
        let api_url = api_url.trim_end_matches('/');
        let uri = api_url
            .parse::<http::Uri>()
            .map_err(|e| McpGithubOrgError::Other(format!("Invalid API URL '{}': {}", api_url, e)))?;
        if uri.scheme().is_none() || uri.host().is_none() {
            return Err(McpGithubOrgError::Other(format!(
                "Invalid API URL '{}': scheme and host are required",
                api_url
            )));
        }

        let mut builder = octocrab::OctocrabBuilder::new()
            .base_uri(api_url)
            .map_err(|e| McpGithubOrgError::Other(format!("Invalid API URL '{}': {}", api_url, e)))?
            .add_retry_config(RetryConfig::None);
        if let Some(t) = token {
            HeaderValue::from_str(&format!("token {}", t)).map_err(|_| {
                McpGithubOrgError::Other("GitHub token contains invalid header characters".to_string())
            })?;
            builder = builder.add_header(AUTHORIZATION, format!("token {}", t));
        }
        let octocrab = builder
            .build()
            .map_err(|e| McpGithubOrgError::Other(format!("Failed to create GitHub client: {}", e)))?;

        Ok(Self {
            octocrab: Arc::new(octocrab),
            api_url: api_url.to_string(),
            authenticated: token.is_some(),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Login names of the organization's members, in the order GitHub returns them.
    pub async fn list_org_members(&self, org: &str) -> Result<Vec<String>, McpGithubOrgError> {
        sanitize_github_name(org, "org")?;
        let context = "members";

        let records = self.get_array(&format!("/orgs/{}/members", org), context).await?;
        records
            .iter()
            .enumerate()
            .map(|(i, m)| {
                m.get("login")
                    .and_then(Value::as_str)
                    .map(String::from)
                    .ok_or_else(|| {
                        McpGithubOrgError::from(UpstreamError::Malformed {
                            context,
                            reason: format!("member record {} has no login", i),
                        })
                    })
            })
            .collect()
    }

    /// Issue titles for the authenticated user (`org` absent) or for an
    /// organization. Records without a title are skipped.
    pub async fn list_issue_titles(&self, org: Option<&str>) -> Result<Vec<String>, McpGithubOrgError> {
        let route = match org {
            Some(org) => {
                sanitize_github_name(org, "org")?;
                format!("/orgs/{}/issues", org)
            }
            None => "/issues".to_string(),
        };

        let records = self.get_array(&route, "issues").await?;
        Ok(records
            .iter()
            .filter_map(|i| i.get("title").and_then(Value::as_str).map(String::from))
            .collect())
    }

    async fn get_array(&self, route: &str, context: &'static str) -> Result<Vec<Value>, UpstreamError> {
        let url = format!("{}{}", self.api_url, route);
        tracing::debug!(%url, authenticated = self.authenticated, "GET");

        let response = self
            .octocrab
            ._get(url.as_str())
            .await
            .map_err(|source| UpstreamError::Transport { context, source })?;
        let status = response.status();
        let body = self
            .octocrab
            .body_to_string(response)
            .await
            .map_err(|source| UpstreamError::Transport { context, source })?;

        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "GitHub request failed");
            return Err(UpstreamError::Status {
                context,
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(other) => Err(UpstreamError::Malformed {
                context,
                reason: format!("expected a JSON array, got {}", json_kind(&other)),
            }),
            Err(e) => Err(UpstreamError::Malformed {
                context,
                reason: e.to_string(),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Validate that a GitHub org name doesn't contain characters that
/// could be used for URL injection in API routes.
pub fn sanitize_github_name(name: &str, field: &str) -> Result<(), McpGithubOrgError> {
    if name.is_empty() {
        return Err(McpGithubOrgError::InvalidParam(format!("{} must not be empty", field)));
    }
    for ch in ['/', '?', '#', '%', '\0', ' ', '\n', '\r', '\t'] {
        if name.contains(ch) {
            return Err(McpGithubOrgError::InvalidParam(format!(
                "{} contains invalid character '{}'",
                field,
                ch.escape_default()
            )));
        }
    }
    Ok(())
}
