//! Webhook transport.
//!
//! Sends HTTP POST requests with a JSON body using reqwest.

use crate::delivery::Transport;
use crate::error::{NotificationError, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Shared HTTP client with connection pooling.
static HTTP_CLIENT: OnceCell<Client> = OnceCell::new();

/// Initialize or get the HTTP client.
///
/// The timeout of the first caller wins for the lifetime of the process.
fn get_http_client(timeout: Duration) -> Result<&'static Client> {
    HTTP_CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION"),
            ))
            .build()
            .map_err(|e| NotificationError::Network(format!("Failed to build HTTP client: {}", e)))
    })
}

/// Transport posting to real webhook endpoints.
pub struct HttpTransport {
    client: &'static Client,
}

impl HttpTransport {
    /// Creates a transport whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: get_http_client(timeout)?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<u16> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            // The webhook token lives in the URL path, so the URL is stripped.
            .map_err(|e| {
                NotificationError::Network(format!("Failed to send webhook: {}", e.without_url()))
            })?;

        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WebhookTargets;
    use crate::delivery::{build_payload, DeliveryOutcome, Dispatcher};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;
    use tracing_test::traced_test;

    /// Accepts one connection, answers with `status` and returns the raw request.
    async fn serve_once(status: u16) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];

            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);

                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .filter_map(|line| line.split_once(':'))
                        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {} Status\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();

            String::from_utf8(request).unwrap()
        });

        (format!("http://{}/api/webhooks/123/token", addr), handle)
    }

    fn split_request(raw: &str) -> (&str, &str) {
        raw.split_once("\r\n\r\n").unwrap()
    }

    #[tokio::test]
    async fn test_invalid_url_is_network_error() {
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let result = transport.post_json("not a url", &json!({"content": "x"})).await;
        assert!(matches!(result, Err(NotificationError::Network(_))));
    }

    #[tokio::test]
    async fn test_posts_json_content() {
        let (url, server) = serve_once(204).await;
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let message = "**Permission Added** for \"Steve\"( a\\b = true@{})\n second line";

        let status = transport.post_json(&url, &build_payload(message)).await.unwrap();
        assert_eq!(status, 204);

        let raw = server.await.unwrap();
        let (head, body) = split_request(&raw);
        assert!(head.starts_with("POST /api/webhooks/123/token HTTP/1.1"));
        assert!(head
            .lines()
            .any(|line| line.eq_ignore_ascii_case("content-type: application/json")));

        let decoded: Value = serde_json::from_str(body).unwrap();
        assert_eq!(decoded, json!({ "content": message }));
    }

    #[tokio::test]
    async fn test_error_status_is_returned() {
        let (url, server) = serve_once(500).await;
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();

        let status = transport.post_json(&url, &json!({"content": "x"})).await.unwrap();
        assert_eq!(status, 500);
        server.await.unwrap();
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failure_reason_hides_webhook_token() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Close every connection without answering.
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        let url = format!("http://{}/api/webhooks/123/SECRETTOKEN", addr);
        let targets = WebhookTargets::from_value(&json!(url)).unwrap();
        let transport = Arc::new(HttpTransport::new(Duration::from_secs(5)).unwrap());
        let outcomes = Dispatcher::new(transport).deliver(&targets, "msg").await;
        server.await.unwrap();

        match &outcomes[0] {
            DeliveryOutcome::Failed(reason) => assert!(!reason.contains("SECRETTOKEN"), "{}", reason),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!logs_contain("SECRETTOKEN"));
        assert!(logs_contain("An error occurred while sending the message to Discord"));
    }
}
