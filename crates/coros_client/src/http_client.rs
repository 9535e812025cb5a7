//! HTTP client implementation for the COROS training hub.
//!
//! This module provides a reqwest-based implementation of the [`CorosClient`](crate::CorosClient) trait.

use crate::response;
use crate::{ACCOUNT_TYPE, Activity, COROS_URL, CorosClient, CorosError, FileType, Session};
use async_trait::async_trait;
use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Header carrying the session token on authenticated calls.
const ACCESS_TOKEN_HEADER: &str = "accessToken";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload<'a> {
    account: &'a str,
    account_type: u32,
    pwd: &'a str,
}

/// Client for the COROS training hub using reqwest.
///
/// Each instance owns its own [`Session`]; instances never share a token.
#[derive(Clone, Debug)]
pub struct ReqwestCorosClient {
    base_url: String,
    session: Session,
    client: reqwest::Client,
}

impl Default for ReqwestCorosClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestCorosClient {
    /// Create an unauthenticated client against the production hub.
    pub fn new() -> Self {
        Self::with_base_url(COROS_URL)
    }

    /// Create an unauthenticated client against another host, e.g. a
    /// regional endpoint or a local mock.
    pub fn with_base_url(base_url: &str) -> Self {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// Create a client around a preconfigured `reqwest::Client`. Timeouts,
    /// proxies and TLS settings are taken from `client` as-is.
    pub fn with_http_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session: Session::new(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Build a GET carrying the session token.
    ///
    /// Fails with [`CorosError::NotAuthenticated`] before anything is sent.
    fn authed_get(&self, url: &str) -> Result<reqwest::RequestBuilder, CorosError> {
        let token = self.session.require_token()?;
        Ok(self
            .client
            .get(url)
            .header(ACCESS_TOKEN_HEADER, token.expose_secret()))
    }

    /// Send a request and decode the body as JSON without looking at the status.
    async fn execute_json(&self, request: reqwest::RequestBuilder) -> Result<Value, CorosError> {
        let resp = request.send().await?;
        Ok(resp.json().await?)
    }

    /// First export step: ask the hub for a signed download link.
    ///
    /// The link is not cached; every export resolves a fresh one.
    pub async fn resolve_file_url(
        &self,
        activity: &Activity,
        file_type: FileType,
    ) -> Result<String, CorosError> {
        let url = format!("{}/activity/detail/download", self.base_url);
        let label_id = activity.label_id();
        let request = self.authed_get(&url)?.query(&[
            ("labelId", label_id.as_str()),
            ("sportType", activity.sport_type().as_str()),
            ("fileType", file_type.code().to_string().as_str()),
        ]);
        tracing::debug!(label_id = %label_id, file_type = %file_type, "resolving export url");

        let metadata = self.execute_json(request).await?;
        response::data_str(&metadata, "fileUrl")
            .map(str::to_owned)
            .ok_or(CorosError::FileResolution)
    }

    /// Fetch a resolved download link. The link is pre-signed, so no token is sent.
    async fn fetch_file(&self, file_url: &str) -> Result<reqwest::Response, CorosError> {
        tracing::debug!("downloading exported activity file");
        Ok(self.client.get(file_url).send().await?)
    }

    /// Export an activity and stream the file to `path`.
    ///
    /// Returns the number of bytes written. If the download fails part way,
    /// the partially written file is removed before the error is returned.
    pub async fn export_activity_to_file(
        &self,
        activity: &Activity,
        file_type: FileType,
        path: impl AsRef<Path>,
    ) -> Result<u64, CorosError> {
        let file_url = self.resolve_file_url(activity, file_type).await?;
        let resp = self.fetch_file(&file_url).await?;

        let path = path.as_ref();
        let mut file = tokio::fs::File::create(path).await?;
        match Self::stream_to_file(resp, &mut file).await {
            Ok(written) => Ok(written),
            Err(e) => {
                // Never leave a truncated export behind.
                drop(file);
                if let Err(rm) = tokio::fs::remove_file(path).await {
                    tracing::debug!("could not remove partial export {}: {rm}", path.display());
                }
                Err(e)
            }
        }
    }

    async fn stream_to_file(
        resp: reqwest::Response,
        file: &mut tokio::fs::File,
    ) -> Result<u64, CorosError> {
        let mut stream = resp.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            file.write_all(&bytes).await?;
            written = written.saturating_add(bytes.len() as u64);
        }
        file.sync_all().await?;
        Ok(written)
    }
}

#[async_trait]
impl CorosClient for ReqwestCorosClient {
    async fn login(
        &mut self,
        account: &str,
        password_hash: &SecretString,
    ) -> Result<Value, CorosError> {
        let url = format!("{}/account/login", self.base_url);
        let payload = LoginPayload {
            account,
            account_type: ACCOUNT_TYPE,
            pwd: password_hash.expose_secret(),
        };
        tracing::debug!(base_url = %self.base_url, "logging in");

        let resp = self.client.post(&url).json(&payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CorosError::Transport(status.to_string()));
        }

        let body: Value = resp.json().await?;
        let Some(token) = response::data_str(&body, "accessToken") else {
            let reason = response::message(&body).unwrap_or("no access token in response");
            return Err(CorosError::Authentication(reason.to_string()));
        };
        self.session.authenticate(token);
        Ok(body)
    }

    async fn list_activities(
        &self,
        count: u32,
        type_codes: &[u32],
    ) -> Result<Vec<Activity>, CorosError> {
        let mode_list = type_codes
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        // Built by hand so the commas in modeList reach the hub unescaped.
        let url = format!(
            "{}/activity/query?size={count}&pageNumber=1&modeList={mode_list}",
            self.base_url
        );
        let request = self.authed_get(&url)?;
        tracing::debug!(count, "listing activities");

        let body = self.execute_json(request).await?;
        Ok(response::into_data_list(body, "dataList")
            .map(|items| items.into_iter().map(Activity::from).collect())
            .unwrap_or_default())
    }

    async fn export_activity(
        &self,
        activity: &Activity,
        file_type: FileType,
    ) -> Result<Vec<u8>, CorosError> {
        let file_url = self.resolve_file_url(activity, file_type).await?;
        let resp = self.fetch_file(&file_url).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_targets_production_hub() {
        let client = ReqwestCorosClient::new();
        assert_eq!(client.base_url(), COROS_URL);
        assert!(!client.is_authenticated());
    }

    #[test]
    fn with_base_url_trims_trailing_slash() {
        let client = ReqwestCorosClient::with_base_url("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn login_payload_uses_vendor_field_names() {
        let payload = LoginPayload {
            account: "user@x.com",
            account_type: ACCOUNT_TYPE,
            pwd: "5f4dcc3b",
        };
        let v = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(
            v,
            serde_json::json!({"account": "user@x.com", "accountType": 2, "pwd": "5f4dcc3b"})
        );
    }

    #[tokio::test]
    async fn unauthenticated_calls_fail_before_io() {
        // Port 9 (discard) is never contacted: the precondition fails first.
        let client = ReqwestCorosClient::with_base_url("http://127.0.0.1:9");
        let err = client.list_activities(5, &[100]).await.unwrap_err();
        assert!(matches!(err, CorosError::NotAuthenticated));
        let err = client
            .export_activity(&Activity::new("L1", 100), FileType::FIT)
            .await
            .unwrap_err();
        assert!(matches!(err, CorosError::NotAuthenticated));
    }
}
