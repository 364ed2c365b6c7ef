//! HTTP backend for a TelDrive instance.
//!
//! Every request carries the static token as bearer auth. The stream
//! endpoint additionally takes it as `access_token`, which is how the
//! service authorises direct content downloads.

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;
use url::Url;

use crate::backend::{BoxFuture, FileBackend, RawFileList, StreamOutcome, StreamedFile};
use crate::config::Config;
use crate::error::{BackendError, Error, Result};
use crate::params::{NewFolder, QueryParams};

pub struct TeldriveClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl TeldriveClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tdrive-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: config.auth_token.clone(),
        })
    }

    /// `{base}/api/<segments...>`, with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }
}

/// Longest error body kept as a failure message.
const ERROR_BODY_LIMIT: usize = 4 * 1024;

/// Turn non-2xx responses into [`BackendError::Status`], keeping at most
/// [`ERROR_BODY_LIMIT`] bytes of the body as the message.
async fn check(
    response: reqwest::Response,
) -> std::result::Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut stream = response.bytes_stream();
    let mut body = Vec::new();
    while let Some(Ok(chunk)) = stream.next().await {
        let room = ERROR_BODY_LIMIT - body.len();
        body.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if body.len() == ERROR_BODY_LIMIT {
            break;
        }
    }

    Err(BackendError::Status {
        status: status.as_u16(),
        body: String::from_utf8_lossy(&body).trim().to_string(),
    })
}

impl FileBackend for TeldriveClient {
    fn list_files<'a>(
        &'a self,
        params: &'a QueryParams,
    ) -> BoxFuture<'a, std::result::Result<RawFileList, BackendError>> {
        Box::pin(async move {
            let mut url = self.endpoint(&["files"]);
            url.query_pairs_mut().extend_pairs(params.to_pairs());
            log::debug!("GET {url}");

            let response = self.http.get(url).bearer_auth(&self.token).send().await?;
            check(response)
                .await?
                .json::<RawFileList>()
                .await
                .map_err(BackendError::Decode)
        })
    }

    fn create_folder<'a>(
        &'a self,
        folder: &'a NewFolder,
    ) -> BoxFuture<'a, std::result::Result<(), BackendError>> {
        Box::pin(async move {
            let url = self.endpoint(&["files"]);
            log::debug!("POST {url} (folder {:?} in {:?})", folder.name, folder.path);

            let body = json!({
                "name": folder.name,
                "type": "folder",
                "path": folder.path,
            });
            let response = self
                .http
                .post(url)
                .bearer_auth(&self.token)
                .json(&body)
                .send()
                .await?;
            check(response).await?;
            Ok(())
        })
    }

    fn stream_file<'a>(
        &'a self,
        file_id: &'a str,
        max_bytes: usize,
    ) -> BoxFuture<'a, std::result::Result<StreamOutcome, BackendError>> {
        Box::pin(async move {
            let mut url = self.endpoint(&["files", file_id, "stream"]);
            // Logged before the token is attached.
            log::debug!("GET {url}");
            url.query_pairs_mut().append_pair("access_token", &self.token);

            let response = check(self.http.get(url).bearer_auth(&self.token).send().await?).await?;

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();

            // Early reject if Content-Length exceeds limit
            if response
                .content_length()
                .is_some_and(|len| len > max_bytes as u64)
            {
                return Ok(StreamOutcome::TooLarge);
            }

            let mut stream = response.bytes_stream();
            let mut data = Vec::new();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                if data.len() + chunk.len() > max_bytes {
                    return Ok(StreamOutcome::TooLarge);
                }
                data.extend_from_slice(&chunk);
            }

            Ok(StreamOutcome::Complete(StreamedFile { content_type, data }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Category;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one HTTP exchange, returning the raw request text.
    async fn serve_once(
        status: &'static str,
        headers: &'static str,
        body: &'static [u8],
    ) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            // Read headers, then whatever body Content-Length announces.
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let head = format!(
                "HTTP/1.1 {status}\r\n{headers}Content-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            // The client may hang up early once it has seen enough.
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(body).await;
            let _ = stream.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });
        (addr, handle)
    }

    /// Like [`serve_once`], but streams `count` copies of `chunk` with
    /// chunked transfer encoding, so no `Content-Length` is announced.
    async fn serve_chunked(
        status: &'static str,
        headers: &'static str,
        chunk: &'static [u8],
        count: usize,
    ) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let mut request = Vec::new();
            while !String::from_utf8_lossy(&request).contains("\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let head = format!(
                "HTTP/1.1 {status}\r\n{headers}Transfer-Encoding: chunked\r\nConnection: close\r\n\r\n"
            );
            if stream.write_all(head.as_bytes()).await.is_err() {
                return;
            }
            for _ in 0..count {
                let mut frame = format!("{:x}\r\n", chunk.len()).into_bytes();
                frame.extend_from_slice(chunk);
                frame.extend_from_slice(b"\r\n");
                if stream.write_all(&frame).await.is_err() {
                    return;
                }
            }
            let _ = stream.write_all(b"0\r\n\r\n").await;
            let _ = stream.shutdown().await;
        });
        addr
    }

    fn client_for(addr: SocketAddr) -> TeldriveClient {
        let config = Config {
            base_url: format!("http://{addr}").parse().unwrap(),
            auth_token: "secret-token".into(),
            listen_addr: "127.0.0.1:0".parse().unwrap(),
            max_content_bytes: 1024,
        };
        TeldriveClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn list_files_sends_query_and_auth() {
        let (addr, server) = serve_once(
            "200 OK",
            "Content-Type: application/json\r\n",
            br#"{"items":[{"id":"1","name":"report.pdf","mimeType":"application/pdf","size":10,"updatedAt":"2024-01-02T03:04:05Z"}],"meta":{"count":1,"totalPages":1,"currentPage":1}}"#,
        )
        .await;

        let params = QueryParams {
            query: Some("report".into()),
            limit: Some(10),
            category: vec![Category::Document, Category::Image],
            ..QueryParams::default()
        };
        let list = client_for(addr).list_files(&params).await.unwrap();
        let request = server.await.unwrap();

        let request_line = request.lines().next().unwrap();
        assert_eq!(
            request_line,
            "GET /api/files?query=report&limit=10&category=document&category=image HTTP/1.1"
        );
        assert!(
            request
                .to_ascii_lowercase()
                .contains("authorization: bearer secret-token")
        );
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].name.as_deref(), Some("report.pdf"));
        assert_eq!(list.meta.total_pages, 1);
    }

    #[tokio::test]
    async fn create_folder_posts_json() {
        let (addr, server) =
            serve_once("201 Created", "Content-Type: application/json\r\n", b"{}").await;

        let folder = NewFolder {
            name: "reports".into(),
            path: "/work".into(),
        };
        client_for(addr).create_folder(&folder).await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("POST /api/files HTTP/1.1"));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            body,
            json!({"name": "reports", "type": "folder", "path": "/work"})
        );
    }

    #[tokio::test]
    async fn stream_file_returns_body_and_type() {
        let (addr, server) =
            serve_once("200 OK", "Content-Type: text/plain\r\n", b"hello world").await;

        let outcome = client_for(addr).stream_file("abc", 1024).await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("GET /api/files/abc/stream?access_token=secret-token "));
        match outcome {
            StreamOutcome::Complete(file) => {
                assert_eq!(file.content_type, "text/plain");
                assert_eq!(file.data, b"hello world");
            }
            StreamOutcome::TooLarge => panic!("expected complete body"),
        }
    }

    #[tokio::test]
    async fn stream_file_stops_at_limit() {
        let (addr, _server) =
            serve_once("200 OK", "Content-Type: image/png\r\n", &[0u8; 64]).await;

        let outcome = client_for(addr).stream_file("big", 16).await.unwrap();
        assert!(matches!(outcome, StreamOutcome::TooLarge));
    }

    #[tokio::test]
    async fn chunked_body_over_limit_is_too_large() {
        let addr = serve_chunked("200 OK", "Content-Type: image/png\r\n", &[7u8; 10], 8).await;

        let outcome = client_for(addr).stream_file("big", 16).await.unwrap();
        assert!(matches!(outcome, StreamOutcome::TooLarge));
    }

    #[tokio::test]
    async fn chunked_body_at_limit_is_complete() {
        let addr = serve_chunked("200 OK", "Content-Type: image/png\r\n", &[7u8; 8], 2).await;

        let outcome = client_for(addr).stream_file("exact", 16).await.unwrap();
        match outcome {
            StreamOutcome::Complete(file) => assert_eq!(file.data, vec![7u8; 16]),
            StreamOutcome::TooLarge => panic!("16 bytes fit a 16 byte limit"),
        }
    }

    #[tokio::test]
    async fn oversized_error_body_is_truncated() {
        static PAGE: [u8; 64 * 1024] = [b'x'; 64 * 1024];
        let addr = serve_chunked("500 Internal Server Error", "", &PAGE, 64).await;

        let err = client_for(addr).stream_file("x", 16).await.unwrap_err();
        match err {
            BackendError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), ERROR_BODY_LIMIT);
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_listing_keeps_cause() {
        let (addr, _server) =
            serve_once("200 OK", "Content-Type: application/json\r\n", b"not json").await;

        let err = client_for(addr)
            .list_files(&QueryParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn error_status_carries_body() {
        let (addr, _server) = serve_once("404 Not Found", "", b"file not found").await;

        let err = client_for(addr).stream_file("missing", 1024).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "backend returned HTTP 404: file not found");
    }
}
