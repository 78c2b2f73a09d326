use crate::transport::{CumulativeBody, TransportError};
use crate::BoxStream;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::env;
use std::time::Duration;
use url::Url;

/// Shared HTTP client for opening streaming requests.
///
/// Connection behavior is env-overridable so deployments can tune pools
/// without an API surface for it.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: Option<String>,
    default_headers: Vec<(String, String)>,
}

impl HttpTransport {
    pub fn new(
        api_key: Option<String>,
        default_headers: Vec<(String, String)>,
    ) -> Result<Self, TransportError> {
        let connect_timeout_secs = env::var("STREAMBLOCKS_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        // No overall request timeout: response bodies stay open for as long
        // as the model keeps generating. Inactivity is policed upstream.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .pool_max_idle_per_host(
                env::var("STREAMBLOCKS_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(8),
            )
            .pool_idle_timeout(Some(Duration::from_secs(
                env::var("STREAMBLOCKS_POOL_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(90),
            )))
            .build()
            .map_err(TransportError::Http)?;

        Ok(Self {
            client,
            api_key,
            default_headers,
        })
    }

    /// POST the request payload and hand back a cumulative body reader.
    /// Non-2xx responses are rejected here, before any body is read.
    pub async fn open_stream(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
        request_id: &str,
    ) -> Result<HttpBody, TransportError> {
        let url = Url::parse(endpoint)
            .map_err(|e| TransportError::InvalidUrl(format!("{endpoint}: {e}")))?;

        let mut req = self
            .client
            .post(url)
            .json(payload)
            .header("accept", "text/event-stream")
            // Correlation id. Backends may ignore it, but applications can
            // use it to link client sessions to server logs.
            .header("x-streamblocks-request-id", request_id);

        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        for (name, value) in &self.default_headers {
            req = req.header(name, value);
        }

        let resp = req.send().await.map_err(TransportError::Http)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(HttpBody::new(resp))
    }
}

/// Reqwest-backed [`CumulativeBody`]: chunks are appended to a growing
/// buffer, and the full buffer is re-readable at any time.
pub struct HttpBody {
    chunks: BoxStream<'static, Result<Bytes, reqwest::Error>>,
    body: Vec<u8>,
}

impl HttpBody {
    fn new(resp: reqwest::Response) -> Self {
        Self {
            chunks: Box::pin(resp.bytes_stream()),
            body: Vec::new(),
        }
    }
}

#[async_trait]
impl CumulativeBody for HttpBody {
    async fn wait_for_more(&mut self) -> Result<bool, TransportError> {
        match self.chunks.next().await {
            Some(Ok(chunk)) => {
                self.body.extend_from_slice(&chunk);
                Ok(true)
            }
            Some(Err(err)) => Err(TransportError::Http(err)),
            None => Ok(false),
        }
    }

    fn received(&self) -> &[u8] {
        &self.body
    }
}
