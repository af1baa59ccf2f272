use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use spool_core::Spool;

/// Versioned path segment appended to every configured base URL.
pub const API_SUFFIX: &str = "/api/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum SpoolmanError {
    /// Network-level failure: the request never produced an HTTP response.
    #[error("spoolman unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    /// Spoolman answered but rejected the request.
    #[error("spoolman rejected request (status {status}): {detail}")]
    Upstream { status: u16, detail: String },
    #[error("spool {0} not found")]
    NotFound(i64),
}

pub type Result<T> = std::result::Result<T, SpoolmanError>;

/// Partial spool update; the only fields this system ever writes upstream.
#[derive(Debug, Clone, Serialize)]
pub struct SpoolPatch {
    pub remaining_weight: f64,
    pub last_used: String,
}

/// Bare base URL with any trailing slash and already-present `/api` or
/// `/api/v1` suffix removed. This is the form persisted in settings and
/// echoed back from the config endpoint, so the versioned base stays
/// reconstructible.
pub fn strip_api_suffix(url: &str) -> String {
    let mut base = url.trim().trim_end_matches('/');
    if let Some(stripped) = base.strip_suffix(API_SUFFIX) {
        base = stripped;
    } else if let Some(stripped) = base.strip_suffix("/api") {
        base = stripped;
    }
    base.trim_end_matches('/').to_string()
}

/// Versioned API base for a configured URL. Normalizes first, so configuring
/// with an already-suffixed URL never double-appends the suffix.
pub fn api_base(url: &str) -> String {
    format!("{}{}", strip_api_suffix(url), API_SUFFIX)
}

/// Spoolman returns collection payloads either as a bare array or wrapped in
/// `{ "results": [...] }` depending on version.
#[derive(Deserialize)]
#[serde(untagged)]
enum SpoolList {
    Plain(Vec<Spool>),
    Wrapped { results: Vec<Spool> },
}

impl From<SpoolList> for Vec<Spool> {
    fn from(list: SpoolList) -> Self {
        match list {
            SpoolList::Plain(spools) => spools,
            SpoolList::Wrapped { results } => results,
        }
    }
}

#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base: String,
}

impl Client {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base: api_base(base_url),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Connectivity probe; returns Spoolman's info payload untouched.
    pub async fn info(&self) -> Result<Value> {
        let url = format!("{}/info/", self.base);
        self.get_json(&url).await
    }

    /// Raw spool list payload, passed through for the dashboard.
    pub async fn spools_payload(&self) -> Result<Value> {
        let url = format!("{}/spool/", self.base);
        self.get_json(&url).await
    }

    pub async fn list_spools(&self, include_archived: bool) -> Result<Vec<Spool>> {
        let mut url = format!("{}/spool/", self.base);
        if include_archived {
            url.push_str("?allow_archived=true");
        }
        let payload: Value = self.get_json(&url).await?;
        let list: SpoolList = serde_json::from_value(payload).map_err(|err| {
            SpoolmanError::Upstream {
                status: 200,
                detail: format!("unexpected spool list payload: {}", err),
            }
        })?;
        Ok(list.into())
    }

    pub async fn get_spool(&self, id: i64) -> Result<Spool> {
        let url = format!("{}/spool/{}", self.base, id);
        let response = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(SpoolmanError::Unreachable)?;
        let status = response.status();
        if status.as_u16() == 404 {
            return Err(SpoolmanError::NotFound(id));
        }
        if !status.is_success() {
            return Err(upstream_error(status.as_u16(), response).await);
        }
        response
            .json()
            .await
            .map_err(|err| invalid_body(status.as_u16(), err))
    }

    pub async fn patch_spool(&self, id: i64, patch: &SpoolPatch) -> Result<()> {
        let url = format!("{}/spool/{}", self.base, id);
        let response = self
            .http
            .patch(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(patch)
            .send()
            .await
            .map_err(SpoolmanError::Unreachable)?;
        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(status.as_u16(), response).await);
        }
        Ok(())
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .http
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(SpoolmanError::Unreachable)?;
        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(status.as_u16(), response).await);
        }
        response
            .json()
            .await
            .map_err(|err| invalid_body(status.as_u16(), err))
    }
}

fn invalid_body(status: u16, err: reqwest::Error) -> SpoolmanError {
    SpoolmanError::Upstream {
        status,
        detail: format!("invalid response body: {}", err),
    }
}

/// Surface the upstream `detail` field when the error body carries one,
/// falling back to the raw body text.
async fn upstream_error(status: u16, response: reqwest::Response) -> SpoolmanError {
    let detail = match response.text().await {
        Ok(body) => serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("detail")
                    .and_then(|detail| detail.as_str().map(str::to_string))
            })
            .unwrap_or(body),
        Err(_) => String::new(),
    };
    SpoolmanError::Upstream { status, detail }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_appends_suffix_once() {
        assert_eq!(api_base("http://localhost:7912"), "http://localhost:7912/api/v1");
        assert_eq!(api_base("http://localhost:7912/"), "http://localhost:7912/api/v1");
        assert_eq!(
            api_base("http://localhost:7912/api/v1"),
            "http://localhost:7912/api/v1"
        );
        assert_eq!(
            api_base("http://localhost:7912/api/v1/"),
            "http://localhost:7912/api/v1"
        );
        assert_eq!(
            api_base("http://localhost:7912/api"),
            "http://localhost:7912/api/v1"
        );
    }

    #[test]
    fn strip_api_suffix_returns_bare_base() {
        assert_eq!(strip_api_suffix("http://h:1/api/v1"), "http://h:1");
        assert_eq!(strip_api_suffix("http://h:1/api"), "http://h:1");
        assert_eq!(strip_api_suffix("http://h:1/"), "http://h:1");
        assert_eq!(strip_api_suffix(" http://h:1 "), "http://h:1");
    }

    #[test]
    fn spool_list_accepts_both_shapes() {
        let plain: SpoolList = serde_json::from_str(r#"[{"id": 1}]"#).expect("plain");
        assert_eq!(Vec::<Spool>::from(plain).len(), 1);

        let wrapped: SpoolList =
            serde_json::from_str(r#"{"results": [{"id": 1}, {"id": 2}]}"#).expect("wrapped");
        assert_eq!(Vec::<Spool>::from(wrapped).len(), 2);
    }
}
