use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::OnceLock;

use crate::core::error::LmsError;
use crate::core::lms::{Assignment, Course, LmsClient};
use crate::core::ratelimit::{capped_wait, retry_after_ms, MAX_ATTEMPTS};

/// Pages requested per collection call; Canvas caps this at 100.
const PER_PAGE: u32 = 100;

/// Upper bound on followed `rel="next"` links.
const MAX_PAGES: usize = 50;

/// Canvas LMS REST client.
pub struct CanvasClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CanvasClient {
    /// `api_url` is the Canvas host, e.g. `https://school.instructure.com`.
    /// A trailing `/api/v1` is accepted and stripped.
    pub fn new(api_url: &str, api_key: impl Into<String>) -> Self {
        let base = api_url.trim_end_matches('/');
        let base = base.strip_suffix("/api/v1").unwrap_or(base);
        Self {
            client: Client::new(),
            base_url: base.to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    /// GET with bounded retry on 429.
    async fn get(&self, url: &str) -> Result<Response, LmsError> {
        let mut last_err = LmsError::Http("no attempts made".into());

        for attempt in 1..=MAX_ATTEMPTS {
            let resp = match self
                .client
                .get(url)
                .bearer_auth(&self.api_key)
                .header("Accept", "application/json")
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(attempt, "canvas request failed: {e}");
                    last_err = LmsError::Http(e.to_string());
                    continue;
                }
            };

            let status = resp.status();
            if status.is_success() {
                return Ok(resp);
            }

            let headers = resp.headers().clone();
            let text = resp.text().await.unwrap_or_default();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait_ms = retry_after_ms(&headers, &text);
                last_err = LmsError::RateLimited {
                    retry_after_ms: wait_ms,
                };
                if attempt < MAX_ATTEMPTS {
                    let wait = capped_wait(wait_ms);
                    tracing::warn!(attempt, wait_ms = wait.as_millis() as u64, "canvas rate limited, retrying");
                    tokio::time::sleep(wait).await;
                }
                continue;
            }

            return Err(LmsError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        Err(last_err)
    }

    /// Follow `Link: <...>; rel="next"` until exhausted.
    async fn get_paginated<T: DeserializeOwned>(&self, first: String) -> Result<Vec<T>, LmsError> {
        let mut items = Vec::new();
        let mut next = Some(first);
        let mut pages = 0;

        while let Some(url) = next.take() {
            pages += 1;
            if pages > MAX_PAGES {
                tracing::warn!(pages = MAX_PAGES, "canvas pagination limit reached");
                break;
            }

            let resp = self.get(&url).await?;
            next = resp
                .headers()
                .get("link")
                .and_then(|v| v.to_str().ok())
                .and_then(next_link);

            let page: Vec<T> = resp
                .json()
                .await
                .map_err(|e| LmsError::Decode(e.to_string()))?;
            items.extend(page);
        }

        Ok(items)
    }
}

/// Extract the `rel="next"` target from a `Link` header.
pub(crate) fn next_link(header: &str) -> Option<String> {
    static NEXT: OnceLock<Regex> = OnceLock::new();
    let re = NEXT.get_or_init(|| {
        Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#).expect("valid link regex")
    });
    re.captures(header).map(|c| c[1].to_string())
}

#[async_trait]
impl LmsClient for CanvasClient {
    async fn list_active_courses(&self) -> Result<Vec<Course>, LmsError> {
        let courses: Vec<Course> = self
            .get_paginated(self.url(&format!(
                "/courses?enrollment_state=active&per_page={PER_PAGE}"
            )))
            .await?;
        tracing::debug!(count = courses.len(), "fetched active courses");
        Ok(courses)
    }

    async fn course(&self, course_id: u64) -> Result<Course, LmsError> {
        let resp = match self.get(&self.url(&format!("/courses/{course_id}"))).await {
            Ok(resp) => resp,
            Err(LmsError::Api { status: 404, .. }) => {
                return Err(LmsError::CourseNotFound(course_id))
            }
            Err(e) => return Err(e),
        };
        resp.json()
            .await
            .map_err(|e| LmsError::Decode(e.to_string()))
    }

    async fn list_assignments(&self, course_id: u64) -> Result<Vec<Assignment>, LmsError> {
        let result = self
            .get_paginated(self.url(&format!(
                "/courses/{course_id}/assignments?per_page={PER_PAGE}"
            )))
            .await;
        match result {
            Err(LmsError::Api { status: 404, .. }) => Err(LmsError::CourseNotFound(course_id)),
            other => other,
        }
    }
}
