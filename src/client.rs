use const_format::concatcp;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::RateLimit;
use crate::error::{ContribError, Result};
use crate::pagination::{collect_pages, Page};
use crate::rate_limit::RateLimiter;
use crate::responses::{ChangelogResponse, CommentsResponse, SearchResponse};
use crate::types::{ChangelogEntry, Comment, Issue};

const API_PREFIX: &str = "rest/api/2/";
const SEARCH_PATH: &str = concatcp!(API_PREFIX, "search");
const ISSUE_PATH: &str = concatcp!(API_PREFIX, "issue/");

const SEARCH_PAGE_SIZE: usize = 50;
const CHANGELOG_PAGE_SIZE: usize = 100;
const COMMENT_LIMIT: usize = 100;

/// Retries granted to a request answered with 429.
const RATE_LIMIT_RETRIES: u32 = 1;

pub struct JiraClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
    limiter: RateLimiter,
}

impl JiraClient {
    pub fn new(base_url: &str, token: Option<String>, rate_limit: RateLimit) -> Result<Self> {
        let mut parsed =
            Url::parse(base_url).map_err(|_| ContribError::InvalidUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(ContribError::InvalidUrl(base_url.to_string()));
        }
        // Keep any path prefix (e.g. `/jira`) when joining endpoint paths.
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }

        Ok(Self {
            http: Client::new(),
            base_url: parsed,
            token,
            limiter: RateLimiter::new(rate_limit),
        })
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Fetch one JSON document through the rate limiter.
    ///
    /// Returns `Ok(None)` for missing resources, unexpected statuses,
    /// transport faults and undecodable bodies. A 401 is returned as
    /// [`ContribError::Unauthorized`] without retrying. A 429 is retried once
    /// after the configured cooldown; a second 429 is returned as
    /// [`ContribError::RateLimited`].
    pub async fn fetch<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>> {
        let mut retries = 0;

        loop {
            let permit = self.limiter.acquire().await?;

            let response = match self.request(url).send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(%url, error = %e, "request failed");
                    return Ok(None);
                }
            };

            match response.status() {
                status if status.is_success() => {
                    return match response.json::<T>().await {
                        Ok(body) => Ok(Some(body)),
                        Err(e) => {
                            tracing::warn!(%url, error = %e, "failed to decode response");
                            Ok(None)
                        }
                    };
                }
                StatusCode::UNAUTHORIZED => {
                    tracing::error!(%url, "authentication failed");
                    return Err(ContribError::Unauthorized {
                        url: url.to_string(),
                    });
                }
                StatusCode::NOT_FOUND => {
                    tracing::debug!(%url, "resource not found");
                    return Ok(None);
                }
                StatusCode::TOO_MANY_REQUESTS if retries < RATE_LIMIT_RETRIES => {
                    retries += 1;
                    drop(permit);
                    let cooldown = self.limiter.settings().cooldown();
                    tracing::warn!(
                        %url,
                        cooldown_ms = cooldown.as_millis() as u64,
                        "rate limited, backing off"
                    );
                    tokio::time::sleep(cooldown).await;
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    return Err(ContribError::RateLimited {
                        url: url.to_string(),
                    });
                }
                status => {
                    tracing::warn!(%url, %status, "unexpected HTTP status");
                    return Ok(None);
                }
            }
        }
    }

    /// Search issues with JQL, walking pages up to `cap` results.
    pub async fn search(&self, jql: &str, expand: Option<&str>, cap: usize) -> Result<Vec<Issue>> {
        collect_pages(SEARCH_PAGE_SIZE, cap, |start_at, max_results| {
            let url = self.search_url(jql, expand, start_at, max_results);
            async move {
                let response: Option<SearchResponse> = self.fetch_or_skip(&url?).await?;
                Ok(response.map(Page::from))
            }
        })
        .await
    }

    /// Full change history of one issue, up to `cap` entries.
    pub async fn changelog(&self, key: &str, cap: usize) -> Result<Vec<ChangelogEntry>> {
        collect_pages(CHANGELOG_PAGE_SIZE, cap, |start_at, max_results| {
            let url = self.issue_url(key, "changelog").map(|mut url| {
                url.query_pairs_mut()
                    .append_pair("startAt", &start_at.to_string())
                    .append_pair("maxResults", &max_results.to_string());
                url
            });
            async move {
                let response: Option<ChangelogResponse> = self.fetch_or_skip(&url?).await?;
                Ok(response.map(Page::from))
            }
        })
        .await
    }

    /// Comments on one issue. A missing issue yields no comments.
    pub async fn comments(&self, key: &str) -> Result<Vec<Comment>> {
        let mut url = self.issue_url(key, "comment")?;
        url.query_pairs_mut()
            .append_pair("maxResults", &COMMENT_LIMIT.to_string());

        let response: Option<CommentsResponse> = self.fetch_or_skip(&url).await?;
        Ok(response.map(|r| r.comments).unwrap_or_default())
    }

    /// Like [`fetch`](Self::fetch), but a request that stays rate limited is
    /// only logged, so the run can continue without it.
    async fn fetch_or_skip<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>> {
        match self.fetch(url).await {
            Err(ContribError::RateLimited { url }) => {
                tracing::warn!(%url, "giving up on request after repeated rate limiting");
                Ok(None)
            }
            other => other,
        }
    }

    fn request(&self, url: &Url) -> RequestBuilder {
        let request = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json");

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|_| ContribError::InvalidUrl(format!("{}{path}", self.base_url)))
    }

    fn search_url(
        &self,
        jql: &str,
        expand: Option<&str>,
        start_at: usize,
        max_results: usize,
    ) -> Result<Url> {
        let mut url = self.endpoint(SEARCH_PATH)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("jql", jql)
                .append_pair("fields", "*all")
                .append_pair("maxResults", &max_results.to_string())
                .append_pair("startAt", &start_at.to_string());
            if let Some(expand) = expand {
                query.append_pair("expand", expand);
            }
        }
        Ok(url)
    }

    fn issue_url(&self, key: &str, resource: &str) -> Result<Url> {
        let mut url = self.endpoint(ISSUE_PATH)?;
        url.path_segments_mut()
            .map_err(|_| ContribError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(key)
            .push(resource);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_rate_limit() -> RateLimit {
        RateLimit {
            max_concurrent: 3,
            request_delay_ms: 0,
            batch_pause_every: 0,
            batch_pause_ms: 0,
            cooldown_ms: 5,
        }
    }

    fn test_client(server: &MockServer) -> JiraClient {
        JiraClient::new(&server.uri(), Some("fake-token".to_string()), fast_rate_limit()).unwrap()
    }

    fn make_issues(count: usize, offset: usize) -> Vec<serde_json::Value> {
        (0..count)
            .map(|i| {
                serde_json::json!({
                    "key": format!("OCPBUGS-{}", i + offset),
                    "fields": { "summary": format!("Issue {}", i + offset) }
                })
            })
            .collect()
    }

    fn search_page(count: usize, offset: usize, total: usize) -> serde_json::Value {
        serde_json::json!({ "issues": make_issues(count, offset), "total": total })
    }

    #[tokio::test]
    async fn search_single_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("jql", "project = OCPBUGS"))
            .and(query_param("fields", "*all"))
            .and(query_param("startAt", "0"))
            .and(query_param("maxResults", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_page(3, 0, 3)))
            .expect(1)
            .mount(&server)
            .await;

        let issues = test_client(&server)
            .search("project = OCPBUGS", None, 500)
            .await
            .unwrap();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].key, "OCPBUGS-0");
    }

    #[tokio::test]
    async fn search_walks_pages_until_total() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("startAt", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_page(50, 0, 60)))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("startAt", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_page(10, 50, 60)))
            .expect(1)
            .mount(&server)
            .await;

        let issues = test_client(&server).search("x", None, 500).await.unwrap();
        assert_eq!(issues.len(), 60);
        assert_eq!(issues[50].key, "OCPBUGS-50");
    }

    #[tokio::test]
    async fn keyless_issue_does_not_shift_later_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("startAt", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "issues": [
                    { "key": "OCPBUGS-0", "fields": {} },
                    { "fields": { "summary": "no key" } }
                ],
                "total": 4
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("startAt", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_page(2, 2, 4)))
            .expect(1)
            .mount(&server)
            .await;

        let issues = test_client(&server).search("x", None, 500).await.unwrap();

        let keys: Vec<_> = issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["OCPBUGS-0", "OCPBUGS-2", "OCPBUGS-3"]);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn search_never_exceeds_cap() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("startAt", "0"))
            .and(query_param("maxResults", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_page(50, 0, 900)))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("startAt", "50"))
            .and(query_param("maxResults", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_page(10, 50, 900)))
            .expect(1)
            .mount(&server)
            .await;

        let issues = test_client(&server).search("x", None, 60).await.unwrap();
        assert_eq!(issues.len(), 60);
    }

    #[tokio::test]
    async fn search_sends_expand_and_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("expand", "changelog"))
            .and(header("Authorization", "Bearer fake-token"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_page(1, 0, 1)))
            .expect(1)
            .mount(&server)
            .await;

        let issues = test_client(&server)
            .search("x", Some("changelog"), 500)
            .await
            .unwrap();
        assert_eq!(issues.len(), 1);
    }

    #[tokio::test]
    async fn base_url_path_prefix_is_kept() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/jira/rest/api/2/issue/OCPBUGS-7/comment"))
            .and(query_param("maxResults", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "comments": [
                    { "id": "1", "body": "LGTM", "created": "2025-01-02T00:00:00.000+0000",
                      "author": { "name": "dev", "emailAddress": "dev@example.com" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = JiraClient::new(
            &format!("{}/jira", server.uri()),
            None,
            fast_rate_limit(),
        )
        .unwrap();
        let comments = client.comments("OCPBUGS-7").await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].body, "LGTM");
    }

    #[tokio::test]
    async fn changelog_walks_pages() {
        let server = MockServer::start().await;
        let entries = |count: usize| {
            (0..count)
                .map(|i| serde_json::json!({ "id": i.to_string(), "created": "2025-01-01T00:00:00.000+0000", "items": [] }))
                .collect::<Vec<_>>()
        };

        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/OCPBUGS-1/changelog"))
            .and(query_param("startAt", "0"))
            .and(query_param("maxResults", "100"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "values": entries(100), "total": 130 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/OCPBUGS-1/changelog"))
            .and(query_param("startAt", "100"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "values": entries(30), "total": 130 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let history = test_client(&server).changelog("OCPBUGS-1", 1000).await.unwrap();
        assert_eq!(history.len(), 130);
    }

    #[tokio::test]
    async fn not_found_is_absent_not_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let url = Url::parse(&format!("{}/rest/api/2/issue/NOPE-1", server.uri())).unwrap();
        let result: Option<serde_json::Value> = client.fetch(&url).await.unwrap();
        assert!(result.is_none());

        let history = client.changelog("NOPE-1", 1000).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn unauthorized_fails_fast_without_retry() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server).search("x", None, 500).await.unwrap_err();
        assert!(matches!(err, ContribError::Unauthorized { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn retries_once_after_rate_limit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_page(2, 0, 2)))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let issues = client.search("x", None, 500).await.unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
        assert_eq!(client.limiter().requests_sent().await, 2);
    }

    #[tokio::test]
    async fn second_rate_limit_ends_the_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let url = Url::parse(&format!("{}/rest/api/2/search", server.uri())).unwrap();
        let err = client.fetch::<serde_json::Value>(&url).await.unwrap_err();
        assert!(matches!(err, ContribError::RateLimited { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn persistent_rate_limit_degrades_search_to_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .expect(2)
            .mount(&server)
            .await;

        let issues = test_client(&server).search("x", None, 500).await.unwrap();
        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let issues = test_client(&server).search("x", None, 500).await.unwrap();
        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn undecodable_body_is_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let comments = test_client(&server).comments("OCPBUGS-1").await.unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn transport_fault_is_absent() {
        // Nothing listens on port 9 of the loopback interface.
        let client = JiraClient::new("http://127.0.0.1:9", None, fast_rate_limit()).unwrap();
        let issues = client.search("x", None, 500).await.unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = JiraClient::new("not a url", None, fast_rate_limit())
            .err()
            .expect("should fail");
        assert!(matches!(err, ContribError::InvalidUrl(_)));
    }
}
