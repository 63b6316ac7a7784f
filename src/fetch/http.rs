// src/fetch/http.rs
// =============================================================================
// Fetches pages over HTTP with reqwest.
//
// Behaviour:
// - Connect timeout and read timeout from CrawlConfig (5s each by default)
// - Redirects are followed (up to 10 hops)
// - An identifying User-Agent plus browser-style Accept headers
// - Any status >= 400 becomes FetchError::HttpStatus, never page content
//
// Rust concepts:
// - Builder pattern: Client::builder().x().y().build()
// - ? operator: reqwest::Error turns into FetchError::Request via #[from]
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect, Client};

use super::Fetcher;
use crate::config::CrawlConfig;
use crate::error::FetchError;

const MAX_REDIRECTS: usize = 10;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds the HTTP client. One client is shared by every worker, so
    /// connections to the site get pooled.
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        // Some sites serve different markup (or nothing) without these
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        // Timeouts and the redirect cap apply to every request the client makes
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        // Send the GET. Redirects are followed inside send(), so `response`
        // is the final hop. Timeouts and DNS failures come back as Err here
        let response = self.client.get(url).send().await?;

        // 4xx/5xx: the body is an error page, not content worth crawling
        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        // Read the whole body as text (the read timeout applies here too)
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Serves canned raw HTTP responses keyed by request path on 127.0.0.1.
    // Returns the base URL, e.g. "http://127.0.0.1:54321".
    async fn serve(routes: Vec<(&'static str, String)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: HashMap<&str, String> = routes.into_iter().collect();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let response = routes.get(path.as_str()).cloned().unwrap_or_else(|| {
                    "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        .to_string()
                });
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }

    fn ok(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&CrawlConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let base = serve(vec![("/page", ok("<a href=\"/x\">x</a>"))]).await;
        let body = fetcher().fetch(&format!("{}/page", base)).await.unwrap();
        assert_eq!(body, "<a href=\"/x\">x</a>");
    }

    #[tokio::test]
    async fn test_error_statuses_are_not_content() {
        let server_error =
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\noops"
                .to_string();
        let base = serve(vec![("/boom", server_error)]).await;
        let fetcher = fetcher();

        let missing = fetcher.fetch(&format!("{}/missing", base)).await;
        assert!(matches!(missing, Err(FetchError::HttpStatus { status: 404 })));

        let boom = fetcher.fetch(&format!("{}/boom", base)).await;
        assert!(matches!(boom, Err(FetchError::HttpStatus { status: 500 })));
    }

    #[tokio::test]
    async fn test_follows_redirects() {
        let redirect =
            "HTTP/1.1 301 Moved Permanently\r\nLocation: /new\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                .to_string();
        let base = serve(vec![("/old", redirect), ("/new", ok("moved here"))]).await;
        let body = fetcher().fetch(&format!("{}/old", base)).await.unwrap();
        assert_eq!(body, "moved here");
    }

    #[tokio::test]
    async fn test_connection_failure_is_request_error() {
        // Bind then drop to get a port nobody is listening on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = fetcher().fetch(&format!("http://{}/", addr)).await;
        assert!(matches!(result, Err(FetchError::Request(_))));
    }
}
