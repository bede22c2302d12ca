//! HTTP client wrapper used by the metadata client and file downloader.

use reqwest::Client;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("request failed: {message}")]
    RequestFailed { message: String },

    #[error("invalid url: {url}")]
    InvalidUrl { url: String },

    #[error("rate limited")]
    RateLimited,

    #[error("failed to read response body: {message}")]
    Body { message: String },
}

pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new(user_agent: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            user_agent: user_agent.to_string(),
        }
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.get_with_headers(url, &[]).await
    }

    pub async fn get_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, HttpError> {
        let mut request = self.client.get(url).header("User-Agent", &self.user_agent);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| HttpError::RequestFailed {
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(HttpError::RateLimited);
        }

        let body = response.text().await.map_err(|e| HttpError::Body {
            message: e.to_string(),
        })?;

        Ok(HttpResponse { status, body })
    }

    /// GET returning the raw body, for binary payloads.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| HttpError::RequestFailed {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(HttpError::RateLimited);
        }
        if status != 200 {
            return Err(HttpError::RequestFailed {
                message: format!("Status {}", status),
            });
        }

        let bytes = response.bytes().await.map_err(|e| HttpError::Body {
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new("shelfmark/0.1")
    }
}
