// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, error, warn};
use url::Url;

use crate::error::DriveError;
use crate::http::{HttpClient, HttpRequest, HttpResponse};

use super::types::{FileEntry, FolderListing};

/// Files endpoint of the Drive v3 API
pub const DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3/files";

const FILE_FIELDS: &str = "id,name,size,mimeType,webContentLink";
const LIST_FIELDS: &str = "files(id,name,size,mimeType,webContentLink),nextPageToken";

/// Backoff policy for listing requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub attempts: u32,
    /// Wait after the first failed attempt; doubles after each further failure
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Delay after the given zero-based failed attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.initial_delay * 2u32.saturating_pow(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

/// The operations this crate needs from Google Drive
#[async_trait]
pub trait DriveGateway: Send + Sync {
    /// Fetch metadata for a single file or folder
    async fn get_info(&self, id: &str) -> Result<FileEntry, DriveError>;

    /// List every child of a folder, following pagination to the end
    async fn list_folder(&self, folder_id: &str) -> Result<FolderListing, DriveError>;

    /// Rename a file, returning its updated metadata
    async fn rename(&self, file_id: &str, new_name: &str) -> Result<FileEntry, DriveError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    files: Vec<FileEntry>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Drive API client authenticated with an OAuth access token
#[derive(Clone)]
pub struct DriveClient<C> {
    client: C,
    access_token: String,
    base_url: String,
    retry: RetryPolicy,
}

impl<C: HttpClient> DriveClient<C> {
    pub fn new(client: C, access_token: impl Into<String>) -> Self {
        Self {
            client,
            access_token: access_token.into(),
            base_url: DRIVE_API_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Point the client at a different files endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn authorize(&self, request: HttpRequest) -> HttpRequest {
        request
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Accept", "application/json")
    }

    fn file_url(&self, id: &str) -> Result<Url, DriveError> {
        let url = Url::parse_with_params(
            &format!("{}/{}", self.base_url, urlencoding::encode(id)),
            [
                ("fields", FILE_FIELDS),
                ("includeItemsFromAllDrives", "true"),
                ("supportsAllDrives", "true"),
            ],
        )?;
        Ok(url)
    }

    fn list_url(&self, folder_id: &str, page_token: Option<&str>) -> Result<Url, DriveError> {
        let query = format!("'{}' in parents", folder_id.replace('\'', "\\'"));
        let mut url = Url::parse_with_params(
            &self.base_url,
            [
                ("q", query.as_str()),
                ("fields", LIST_FIELDS),
                ("includeItemsFromAllDrives", "true"),
                ("supportsAllDrives", "true"),
                ("orderBy", "name"),
            ],
        )?;
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }
        Ok(url)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, DriveError> {
        let url = request.url.clone();
        self.client
            .send(request)
            .await
            .map_err(|source| DriveError::RequestFailed { url, source })
    }

    async fn send_with_retry(&self, request: HttpRequest) -> Result<HttpResponse, DriveError> {
        let attempts = self.retry.attempts.max(1);

        for attempt in 0..attempts {
            debug!(url = %request.url, attempt = attempt + 1, attempts, "Fetching");

            match self.client.send(request.clone()).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => warn!(
                    url = %request.url,
                    attempt = attempt + 1,
                    attempts,
                    status = response.status,
                    body = %response.text(),
                    "Drive request failed"
                ),
                Err(e) => warn!(
                    url = %request.url,
                    attempt = attempt + 1,
                    attempts,
                    error = %e,
                    "Drive request failed"
                ),
            }

            tokio::time::sleep(self.retry.delay_after(attempt)).await;
        }

        Err(DriveError::RetriesExhausted {
            url: request.url,
            attempts,
        })
    }
}

#[async_trait]
impl<C: HttpClient> DriveGateway for DriveClient<C> {
    async fn get_info(&self, id: &str) -> Result<FileEntry, DriveError> {
        let url = self.file_url(id)?;
        let response = self.send(self.authorize(HttpRequest::get(url))).await?;

        if !response.is_success() {
            return Err(DriveError::Upstream {
                status: response.status,
                body: response.text(),
            });
        }

        Ok(serde_json::from_slice(&response.body)?)
    }

    async fn list_folder(&self, folder_id: &str) -> Result<FolderListing, DriveError> {
        let mut listing = FolderListing::default();
        let mut page_token: Option<String> = None;

        loop {
            let url = self.list_url(folder_id, page_token.as_deref())?;
            let response = self
                .send_with_retry(self.authorize(HttpRequest::get(url)))
                .await?;
            let page: ListPage = serde_json::from_slice(&response.body)?;

            listing.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(
            folder_id,
            files = listing.files.len(),
            subfolders = listing.subfolders.len(),
            "Listed folder"
        );

        Ok(listing)
    }

    async fn rename(&self, file_id: &str, new_name: &str) -> Result<FileEntry, DriveError> {
        let url = self.file_url(file_id)?;
        let request = HttpRequest::new(Method::PATCH, url)
            .json(&serde_json::json!({ "name": new_name }));
        let response = self.send(self.authorize(request)).await?;

        if !response.is_success() {
            let body = response.text();
            error!(file_id, status = response.status, body = %body, "Rename rejected");
            return Err(DriveError::Upstream {
                status: response.status,
                body,
            });
        }

        Ok(serde_json::from_slice(&response.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use bytes::Bytes;

    use crate::drive::FOLDER_MIME_TYPE;

    #[derive(Default)]
    struct MockHttpClient {
        responses: Mutex<VecDeque<HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl MockHttpClient {
        fn with_responses(responses: impl IntoIterator<Item = (u16, String)>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|(status, body)| HttpResponse {
                            status,
                            body: Bytes::from(body),
                        })
                        .collect(),
                ),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, reqwest::Error> {
            self.requests.lock().unwrap().push(request);
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request"))
        }
    }

    fn entry_json(id: &str, mime: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": format!("{id}.mkv"),
            "size": "100",
            "mimeType": mime,
        })
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            initial_delay: Duration::ZERO,
        }
    }

    #[test]
    fn default_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(0), Duration::from_secs(1));
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn list_follows_page_tokens() {
        let first = serde_json::json!({
            "files": [entry_json("a", "video/mp4"), entry_json("sub", FOLDER_MIME_TYPE)],
            "nextPageToken": "page-2",
        });
        let second = serde_json::json!({ "files": [entry_json("b", "video/mp4")] });
        let http = MockHttpClient::with_responses([
            (200, first.to_string()),
            (200, second.to_string()),
        ]);

        let drive = DriveClient::new(http, "token").with_retry(fast_retry());
        let listing = drive.list_folder("folder123").await.unwrap();

        assert_eq!(listing.files.len(), 2);
        assert_eq!(listing.subfolders.len(), 1);

        let requests = drive.client.requests();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].url.contains("pageToken"));
        assert!(requests[1].url.contains("pageToken=page-2"));
        assert!(requests[0].url.contains("folder123"));
        assert!(
            requests[0]
                .headers
                .iter()
                .any(|(k, v)| k == "Authorization" && v == "Bearer token")
        );
    }

    #[tokio::test]
    async fn list_retries_failed_pages() {
        let page = serde_json::json!({ "files": [entry_json("a", "video/mp4")] });
        let http = MockHttpClient::with_responses([
            (500, "boom".to_string()),
            (200, page.to_string()),
        ]);

        let drive = DriveClient::new(http, "token").with_retry(fast_retry());
        let listing = drive.list_folder("folder123").await.unwrap();

        assert_eq!(listing.files.len(), 1);
        assert_eq!(drive.client.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn list_gives_up_after_three_attempts() {
        let http = MockHttpClient::with_responses([
            (503, "busy".to_string()),
            (503, "busy".to_string()),
            (503, "busy".to_string()),
        ]);

        let drive = DriveClient::new(http, "token");
        let started = tokio::time::Instant::now();
        let result = drive.list_folder("folder123").await;

        match result {
            Err(DriveError::RetriesExhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("Expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(drive.client.requests().len(), 3);
        assert!(started.elapsed() >= Duration::from_secs(7));
    }

    #[tokio::test]
    async fn get_info_decodes_entry() {
        let http = MockHttpClient::with_responses([(
            200,
            entry_json("abc", "video/mp4").to_string(),
        )]);

        let drive = DriveClient::new(http, "token");
        let entry = drive.get_info("abc").await.unwrap();

        assert_eq!(entry.id, "abc");
        assert_eq!(entry.size, 100);
        let requests = drive.client.requests();
        assert!(requests[0].url.contains("/abc?fields="));
        assert!(requests[0].url.contains("supportsAllDrives=true"));
    }

    #[tokio::test]
    async fn get_info_reports_upstream_status() {
        let http = MockHttpClient::with_responses([(404, "File not found".to_string())]);

        let drive = DriveClient::new(http, "token");
        match drive.get_info("missing").await {
            Err(DriveError::Upstream { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "File not found");
            }
            other => panic!("Expected Upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rename_patches_name() {
        let renamed = serde_json::json!({
            "id": "abc",
            "name": "new.mkv",
            "size": "100",
            "mimeType": "video/mp4",
        });
        let http = MockHttpClient::with_responses([(200, renamed.to_string())]);

        let drive = DriveClient::new(http, "token");
        let entry = drive.rename("abc", "new.mkv").await.unwrap();

        assert_eq!(entry.name, "new.mkv");
        let requests = drive.client.requests();
        assert_eq!(requests[0].method, Method::PATCH);
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"name":"new.mkv"}"#));
    }

    #[tokio::test]
    async fn rename_failure_is_not_retried() {
        let http = MockHttpClient::with_responses([(403, "insufficient permissions".to_string())]);

        let drive = DriveClient::new(http, "token").with_retry(fast_retry());
        let result = drive.rename("abc", "new.mkv").await;

        match result {
            Err(DriveError::Upstream { status, .. }) => assert_eq!(status, 403),
            other => panic!("Expected Upstream error, got {other:?}"),
        }
        assert_eq!(drive.client.requests().len(), 1);
    }
}
