//! Yandex Disk REST client
//!
//! Implements credential validation, recursive paginated tree enumeration
//! and download-link resolution against the disk REST API.
//!
//! # Enumeration contract
//!
//! [`YandexDiskClient::enumerate_tree`] yields entries lazily in depth-first
//! pre-order: items of a page come out in server order, and a directory's
//! entire subtree is exhausted before the next item of the same page.
//! Pagination follows the opaque `next` URL returned by the server until a
//! page carries none. The stream is pure; persisting what it produces is the
//! consumer's concern.

use chrono::{DateTime, Utc};
use core_mirror::{Entry, EntryKind};
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::error::{Result, YandexDiskError};
use crate::http::{HttpClient, HttpRequest, HttpResponse};
use crate::types::{DownloadLink, ResourceItem, ResourceList};

/// Yandex Disk API base URL
const DISK_API_BASE: &str = "https://cloud-api.yandex.net/v1/disk";

/// Items requested per listing page
const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Client configuration
#[derive(Debug, Clone)]
pub struct DiskClientConfig {
    /// Base URL of the disk REST API
    pub api_base: String,

    /// Items requested per listing page
    pub page_limit: u32,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl DiskClientConfig {
    /// Set the API base URL (no trailing slash)
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the listing page size
    pub fn page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit;
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for DiskClientConfig {
    fn default() -> Self {
        Self {
            api_base: DISK_API_BASE.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Where the next page of a directory listing comes from
#[derive(Debug, Clone)]
enum PageCursor {
    /// First page of a directory, fetched by path
    Start(String),
    /// Follow-up page, fetched through the server-supplied URL verbatim
    Next(String),
}

/// One directory being walked: items of the current page not yet produced,
/// plus the cursor for the page after it
#[derive(Debug)]
struct Frame {
    pending: VecDeque<ResourceItem>,
    cursor: Option<PageCursor>,
}

impl Frame {
    fn start(path: String) -> Self {
        Self {
            pending: VecDeque::new(),
            cursor: Some(PageCursor::Start(path)),
        }
    }
}

/// Explicit traversal state; the top of the stack is the directory currently
/// being exhausted
struct Traversal {
    stack: Vec<Frame>,
}

/// Yandex Disk client, bound to one credential
#[derive(Clone)]
pub struct YandexDiskClient {
    /// HTTP transport
    http: Arc<dyn HttpClient>,

    /// OAuth credential for this account
    token: String,

    config: DiskClientConfig,
}

impl YandexDiskClient {
    /// Create a new client for one credential
    pub fn new(http: Arc<dyn HttpClient>, token: impl Into<String>) -> Self {
        Self::with_config(http, token, DiskClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(
        http: Arc<dyn HttpClient>,
        token: impl Into<String>,
        config: DiskClientConfig,
    ) -> Self {
        Self {
            http,
            token: token.into(),
            config,
        }
    }

    /// Validate the credential with a lightweight root probe
    ///
    /// # Errors
    ///
    /// [`YandexDiskError::Auth`] on a 401, [`YandexDiskError::InvalidResponse`]
    /// on any other non-success status, [`YandexDiskError::Transport`] on a
    /// network failure.
    #[instrument(skip(self))]
    pub async fn validate_credential(&self) -> Result<bool> {
        let response = self.execute_get(format!("{}/", self.config.api_base)).await?;

        match response.status {
            200 => {
                debug!("Credential accepted");
                Ok(true)
            }
            401 => Err(YandexDiskError::Auth),
            status => Err(YandexDiskError::InvalidResponse {
                status,
                message: response.text_lossy(),
            }),
        }
    }

    /// Lazily enumerate every entry under `root`, depth-first
    ///
    /// The stream issues one listing request per page and per directory as it
    /// is polled; nothing is fetched ahead of consumption. The first error
    /// ends the stream.
    pub fn enumerate_tree(&self, root: &str) -> BoxStream<'static, Result<Entry>> {
        info!(root = %root, "Enumerating remote tree");

        let state = Traversal {
            stack: vec![Frame::start(root.to_string())],
        };

        stream::try_unfold((self.clone(), state), |(client, mut state)| async move {
            match client.next_entry(&mut state).await? {
                Some(entry) => Ok(Some((entry, (client, state)))),
                None => Ok(None),
            }
        })
        .boxed()
    }

    /// Resolve one path to an ephemeral download URL
    ///
    /// # Errors
    ///
    /// [`YandexDiskError::MissingDownloadLink`] when the server reports
    /// success but the link field is absent or empty; otherwise the same
    /// kinds as [`validate_credential`](Self::validate_credential).
    #[instrument(skip(self), fields(path = %path))]
    pub async fn download_link(&self, path: &str) -> Result<String> {
        let url = format!(
            "{}/resources/download?path={}",
            self.config.api_base,
            urlencoding::encode(path)
        );

        let response = self.execute_get(url).await?;

        match response.status {
            200 => {
                let link: DownloadLink = response.json()?;
                match link.href {
                    Some(href) if !href.is_empty() => {
                        debug!("Resolved download link");
                        Ok(href)
                    }
                    _ => Err(YandexDiskError::MissingDownloadLink {
                        path: path.to_string(),
                    }),
                }
            }
            401 => Err(YandexDiskError::Auth),
            status => Err(YandexDiskError::InvalidResponse {
                status,
                message: response.text_lossy(),
            }),
        }
    }

    /// Advance the traversal by one produced entry
    ///
    /// Directories push a fresh frame on the stack before their entry is
    /// returned, so their subtree drains ahead of the remaining siblings.
    async fn next_entry(&self, state: &mut Traversal) -> Result<Option<Entry>> {
        loop {
            let Some(frame) = state.stack.last_mut() else {
                return Ok(None);
            };

            if let Some(item) = frame.pending.pop_front() {
                let entry = Self::convert_item(item)?;
                if entry.is_dir() {
                    state.stack.push(Frame::start(entry.path.clone()));
                }
                return Ok(Some(entry));
            }

            if let Some(cursor) = frame.cursor.take() {
                let page = self.fetch_page(cursor).await?;
                frame.pending = page.embedded.items.into();
                frame.cursor = page.embedded.next.map(PageCursor::Next);
                continue;
            }

            state.stack.pop();
        }
    }

    /// Fetch one listing page
    async fn fetch_page(&self, cursor: PageCursor) -> Result<ResourceList> {
        let url = match cursor {
            PageCursor::Start(path) => format!(
                "{}/resources?path={}&limit={}",
                self.config.api_base,
                urlencoding::encode(&path),
                self.config.page_limit
            ),
            PageCursor::Next(url) => url,
        };

        let response = self.execute_get(url).await?;

        match response.status {
            200 => {
                let page: ResourceList = response.json()?;
                debug!(items = page.embedded.items.len(), "Fetched listing page");
                Ok(page)
            }
            401 => Err(YandexDiskError::Auth),
            status => Err(YandexDiskError::InvalidResponse {
                status,
                message: response.text_lossy(),
            }),
        }
    }

    async fn execute_get(&self, url: String) -> Result<HttpResponse> {
        let request = HttpRequest::get(url)
            .oauth_token(&self.token)
            .header("Accept", "application/json")
            .timeout(self.config.request_timeout);

        self.http.execute(request).await
    }

    /// Convert a wire item into a mirror entry
    fn convert_item(item: ResourceItem) -> Result<Entry> {
        let created_at = Self::parse_timestamp(&item.created).ok_or_else(|| bad_timestamp(&item))?;
        let modified_at =
            Self::parse_timestamp(&item.modified).ok_or_else(|| bad_timestamp(&item))?;

        let kind = if item.kind == "dir" {
            EntryKind::Dir
        } else {
            EntryKind::File
        };

        Ok(Entry {
            path: item.path,
            name: item.name,
            kind,
            created_at,
            modified_at,
        })
    }

    /// Parse an RFC 3339 timestamp to Unix seconds
    fn parse_timestamp(rfc3339: &str) -> Option<i64> {
        DateTime::parse_from_rfc3339(rfc3339)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).timestamp())
    }
}

fn bad_timestamp(item: &ResourceItem) -> YandexDiskError {
    YandexDiskError::InvalidResponse {
        status: 200,
        message: format!("unparseable timestamp on {}", item.path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpRequest, HttpResponse};
    use async_trait::async_trait;
    use bytes::Bytes;
    use mockall::mock;

    mock! {
        Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    const BASE: &str = "https://disk.example/v1/disk";

    fn client(http: MockHttp) -> YandexDiskClient {
        YandexDiskClient::with_config(
            Arc::new(http),
            "test_token",
            DiskClientConfig::default().api_base(BASE),
        )
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: Bytes::from(body.as_bytes().to_vec()),
        }
    }

    fn item_json(path: &str, name: &str, kind: &str) -> String {
        format!(
            r#"{{
                "path": "{path}",
                "name": "{name}",
                "type": "{kind}",
                "created": "2024-01-01T00:00:00+00:00",
                "modified": "2024-01-02T00:00:00+00:00"
            }}"#
        )
    }

    #[tokio::test]
    async fn test_validate_credential_success() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|req| {
            assert_eq!(
                req.headers.get("Authorization"),
                Some(&"OAuth test_token".to_string())
            );
            Ok(json_response(200, "{}"))
        });

        assert!(client(http).validate_credential().await.unwrap());
    }

    #[tokio::test]
    async fn test_validate_credential_rejected() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(401, "")));

        let result = client(http).validate_credential().await;
        assert!(matches!(result, Err(YandexDiskError::Auth)));
    }

    #[tokio::test]
    async fn test_validate_credential_unexpected_status() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(503, "maintenance")));

        let result = client(http).validate_credential().await;
        assert!(matches!(
            result,
            Err(YandexDiskError::InvalidResponse { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_enumerate_tree_depth_first_across_pages() {
        // Page 1 of the root holds [a (dir), b.txt]; a's subtree holds
        // [c.txt]; page 2 of the root holds [d.txt]. Expected production
        // order: a, c, b, d.
        let root_page_1 = format!(
            r#"{{"_embedded": {{"items": [{}, {}], "next": "{BASE}/resources?path=%2F&limit=100&offset=100"}}}}"#,
            item_json("/a", "a", "dir"),
            item_json("/b.txt", "b.txt", "file"),
        );
        let subtree_a = format!(
            r#"{{"_embedded": {{"items": [{}]}}}}"#,
            item_json("/a/c.txt", "c.txt", "file"),
        );
        let root_page_2 = format!(
            r#"{{"_embedded": {{"items": [{}]}}}}"#,
            item_json("/d.txt", "d.txt", "file"),
        );

        let mut http = MockHttp::new();
        http.expect_execute().times(3).returning(move |req| {
            let body = if req.url == format!("{BASE}/resources?path=%2F&limit=100") {
                root_page_1.clone()
            } else if req.url == format!("{BASE}/resources?path=%2Fa&limit=100") {
                subtree_a.clone()
            } else if req.url == format!("{BASE}/resources?path=%2F&limit=100&offset=100") {
                root_page_2.clone()
            } else {
                panic!("unexpected listing URL: {}", req.url);
            };
            Ok(json_response(200, &body))
        });

        let client = client(http);
        let entries: Vec<Entry> = client
            .enumerate_tree("/")
            .map(|e| e.unwrap())
            .collect()
            .await;

        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/a/c.txt", "/b.txt", "/d.txt"]);
        assert_eq!(entries[0].kind, EntryKind::Dir);
        assert_eq!(entries[1].kind, EntryKind::File);
    }

    #[tokio::test]
    async fn test_enumerate_tree_empty_listing() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(200, "{}")));

        let client = client(http);
        let entries: Vec<_> = client.enumerate_tree("/").collect().await;
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_enumerate_tree_surfaces_auth_failure() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(401, "")));

        let client = client(http);
        let mut stream = client.enumerate_tree("/");
        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(YandexDiskError::Auth)));
    }

    #[tokio::test]
    async fn test_enumerate_converts_timestamps() {
        let body = format!(
            r#"{{"_embedded": {{"items": [{}]}}}}"#,
            item_json("/x.txt", "x.txt", "file"),
        );

        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(move |_| Ok(json_response(200, &body)));

        let client = client(http);
        let entries: Vec<Entry> = client
            .enumerate_tree("/")
            .map(|e| e.unwrap())
            .collect()
            .await;

        // 2024-01-01T00:00:00Z and 2024-01-02T00:00:00Z
        assert_eq!(entries[0].created_at, 1704067200);
        assert_eq!(entries[0].modified_at, 1704153600);
    }

    #[tokio::test]
    async fn test_download_link_success() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|req| {
            assert!(req.url.contains("/resources/download?path=%2Fdocs%2Freport.pdf"));
            Ok(json_response(
                200,
                r#"{"href": "https://downloader.example/report.pdf"}"#,
            ))
        });

        let href = client(http).download_link("/docs/report.pdf").await.unwrap();
        assert_eq!(href, "https://downloader.example/report.pdf");
    }

    #[tokio::test]
    async fn test_download_link_missing_href() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(200, "{}")));

        let result = client(http).download_link("/docs/report.pdf").await;
        assert!(matches!(
            result,
            Err(YandexDiskError::MissingDownloadLink { path }) if path == "/docs/report.pdf"
        ));
    }

    #[tokio::test]
    async fn test_download_link_empty_href() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(200, r#"{"href": ""}"#)));

        let result = client(http).download_link("/x").await;
        assert!(matches!(
            result,
            Err(YandexDiskError::MissingDownloadLink { .. })
        ));
    }

    #[tokio::test]
    async fn test_download_link_auth_rejected() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(401, "")));

        let result = client(http).download_link("/x").await;
        assert!(matches!(result, Err(YandexDiskError::Auth)));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Err(YandexDiskError::Transport("connection refused".to_string())));

        let result = client(http).validate_credential().await;
        assert!(matches!(result, Err(YandexDiskError::Transport(_))));
    }
}
