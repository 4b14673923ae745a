//! # GitHub Label API Client
//!
//! Repository-level label operations over the GitHub REST API, with
//! rate-limit tracking. Calls are single-attempt: when the budget is spent the
//! client fails fast and leaves the retry to the next sync pass.

use async_trait::async_trait;
use reqwest::{header, Client as HttpClient, Method, Response};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::accessor::LabelAccessor;
use crate::desired::LabelDefinition;
use crate::error::GitHubLabelError;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size for label listing (GitHub maximum).
const PER_PAGE: usize = 100;

const USER_AGENT: &str = "label-sync/1.0";
const API_VERSION: &str = "2022-11-28";

/// GitHub API client for repository label operations
pub struct GitHubLabelClient {
    http_client: HttpClient,
    base_url: String,
    token: String,
    owner: String,
    repo: String,
    rate_limit: Mutex<RateLimit>,
}

#[derive(Debug, Deserialize)]
struct GitHubError {
    message: String,
}

#[derive(Debug, Serialize)]
struct CreateLabelRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Debug, Clone, Copy)]
struct RateLimit {
    remaining: i32,
    reset: Option<Instant>,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            remaining: 5000, // GitHub's default rate limit
            reset: None,
        }
    }
}

impl RateLimit {
    /// Refuse a call while the budget is exhausted and the window has not reset.
    fn check(&self, now: Instant) -> Result<(), GitHubLabelError> {
        if self.remaining > 0 {
            return Ok(());
        }

        match self.reset {
            Some(reset) if now < reset => Err(GitHubLabelError::RateLimitExceeded {
                reset_in: reset - now,
            }),
            Some(_) => Ok(()),
            None => Err(GitHubLabelError::RateLimitExceeded {
                reset_in: Duration::from_secs(60), // Conservative fallback
            }),
        }
    }
}

impl GitHubLabelClient {
    /// Create a client for `owner/repo` against the public GitHub API.
    pub fn new(token: String, owner: String, repo: String) -> Result<Self, GitHubLabelError> {
        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            base_url: DEFAULT_API_URL.to_string(),
            token,
            owner,
            repo,
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Point the client at a different API root (GitHub Enterprise, test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `owner/repo` slug this client operates on.
    #[must_use]
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn labels_url(&self) -> String {
        format!("{}/repos/{}/{}/labels", self.base_url, self.owner, self.repo)
    }

    /// Make an HTTP request with rate limit tracking
    async fn make_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&T>,
    ) -> Result<Response, GitHubLabelError> {
        self.rate_limit.lock().await.check(Instant::now())?;

        let mut request = self
            .http_client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.update_rate_limit(&response).await;

        let status = response.status().as_u16();
        let exhausted = header_value::<i32>(&response, "x-ratelimit-remaining") == Some(0);
        if (status == 403 || status == 429) && exhausted {
            return Err(GitHubLabelError::RateLimitExceeded {
                reset_in: Self::get_rate_limit_reset(&response)
                    .unwrap_or(Duration::from_secs(60)),
            });
        }

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::api_error(response).await)
        }
    }

    /// Turn a non-success response into an `ApiError`
    async fn api_error(response: Response) -> GitHubLabelError {
        let status = response.status();
        let message = match response.json::<GitHubError>().await {
            Ok(error) => error.message,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };

        GitHubLabelError::ApiError {
            status: status.as_u16(),
            message,
        }
    }

    /// Update rate limit tracking from response headers
    async fn update_rate_limit(&self, response: &Response) {
        let mut rate_limit = self.rate_limit.lock().await;

        if let Some(remaining) = header_value::<i32>(response, "x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }

        if let Some(reset_in) = Self::get_rate_limit_reset(response) {
            rate_limit.reset = Some(Instant::now() + reset_in);
        }
    }

    /// Extract rate limit reset time from response
    fn get_rate_limit_reset(response: &Response) -> Option<Duration> {
        header_value::<i64>(response, "x-ratelimit-reset").map(|reset_timestamp| {
            let now = chrono::Utc::now().timestamp();
            let seconds_until_reset = (reset_timestamp - now).max(0) as u64;
            Duration::from_secs(seconds_until_reset)
        })
    }
}

fn header_value<T: std::str::FromStr>(response: &Response, name: &str) -> Option<T> {
    response
        .headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<T>().ok())
}

/// GitHub wants colors as bare hex.
fn normalize_color(color: &str) -> &str {
    color.trim().trim_start_matches('#')
}

#[async_trait]
impl LabelAccessor for GitHubLabelClient {
    #[instrument(skip(self))]
    async fn list_labels(&self) -> Result<Vec<LabelDefinition>, GitHubLabelError> {
        let mut labels = Vec::new();
        let mut page = 1;

        loop {
            let url = format!("{}?per_page={PER_PAGE}&page={page}", self.labels_url());
            let response = self.make_request::<()>(Method::GET, &url, None).await?;
            let batch: Vec<LabelDefinition> = response.json().await?;
            let count = batch.len();
            labels.extend(batch);

            if count < PER_PAGE {
                break;
            }
            page += 1;
        }

        debug!("Retrieved {} labels from {}", labels.len(), self.repository());
        Ok(labels)
    }

    #[instrument(skip(self, label), fields(label = %label.name))]
    async fn create_label(&self, label: &LabelDefinition) -> Result<(), GitHubLabelError> {
        let body = CreateLabelRequest {
            name: &label.name,
            color: label.color.as_deref().map(normalize_color),
            description: label.description.as_deref(),
        };

        self.make_request(Method::POST, &self.labels_url(), Some(&body))
            .await?;

        info!("Created label '{}' on {}", label.name, self.repository());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("#d73a4a"), "d73a4a");
        assert_eq!(normalize_color("d73a4a"), "d73a4a");
        assert_eq!(normalize_color(" #fff "), "fff");
    }

    #[test]
    fn test_rate_limit_with_budget() {
        let limit = RateLimit::default();
        assert!(limit.check(Instant::now()).is_ok());
    }

    #[test]
    fn test_rate_limit_exhausted_before_reset() {
        let now = Instant::now();
        let limit = RateLimit {
            remaining: 0,
            reset: Some(now + Duration::from_secs(120)),
        };

        match limit.check(now) {
            Err(GitHubLabelError::RateLimitExceeded { reset_in }) => {
                assert_eq!(reset_in, Duration::from_secs(120));
            }
            other => panic!("expected rate limit error, got {other:?}"),
        }
    }

    #[test]
    fn test_rate_limit_exhausted_after_reset() {
        let now = Instant::now();
        let limit = RateLimit {
            remaining: 0,
            reset: Some(now),
        };
        assert!(limit.check(now + Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_create_request_skips_missing_fields() {
        let body = CreateLabelRequest {
            name: "bug",
            color: None,
            description: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "name": "bug" })
        );
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let client = GitHubLabelClient::new("t".to_string(), "o".to_string(), "r".to_string())
            .unwrap()
            .with_base_url("http://localhost:8080/");
        assert_eq!(client.labels_url(), "http://localhost:8080/repos/o/r/labels");
        assert_eq!(client.repository(), "o/r");
    }
}
