//! HTTP client for the image resolution service

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

use super::{ImageResolution, ImageResolver};
use crate::config::ImageServiceConfig;
use crate::domain::{ImageServiceError, IngestError, Result};

/// Resolver backed by the image service's HTTP lookup endpoint
///
/// Issues `GET {resolver_url}?uri={access_uri}` and expects a JSON body
/// carrying `resource_uniq`.
///
/// # Example
///
/// ```no_run
/// use occurrence_ingest::adapters::imaging::{HttpImageResolver, ImageResolver};
/// use occurrence_ingest::config::ImageServiceConfig;
///
/// # async fn example() -> occurrence_ingest::domain::Result<()> {
/// let resolver = HttpImageResolver::new(ImageServiceConfig::default())?;
/// let resolution = resolver.resolve("http://herbarium.example.org/img/123.jpg").await?;
/// println!("{}", resolution.resource_id);
/// # Ok(())
/// # }
/// ```
pub struct HttpImageResolver {
    client: Client,
    resolver_url: Url,
    config: ImageServiceConfig,
}

impl HttpImageResolver {
    /// Create a resolver from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the resolver URL does not parse or
    /// the HTTP client cannot be built.
    pub fn new(config: ImageServiceConfig) -> Result<Self> {
        let resolver_url = Url::parse(&config.resolver_url).map_err(|e| {
            IngestError::Configuration(format!(
                "Invalid images.resolver_url '{}': {e}",
                config.resolver_url
            ))
        })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                IngestError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            resolver_url,
            config,
        })
    }

    fn lookup_url(&self, access_uri: &str) -> Url {
        let mut url = self.resolver_url.clone();
        url.query_pairs_mut().append_pair("uri", access_uri);
        url
    }

    async fn resolve_once(
        &self,
        access_uri: &str,
    ) -> std::result::Result<ImageResolution, ImageServiceError> {
        let mut request = self.client.get(self.lookup_url(access_uri));
        if let Some(ref token) = self.config.api_token {
            let token: &str = token.expose_secret().as_ref();
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ImageServiceError::Timeout(e.to_string())
            } else {
                ImageServiceError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ImageServiceError::NotFound(access_uri.to_string()));
        }
        if status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImageServiceError::ServerError {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImageServiceError::ClientError {
                status: status.as_u16(),
                message,
            });
        }

        let resolution: ImageResolution = response
            .json()
            .await
            .map_err(|e| ImageServiceError::InvalidResponse(e.to_string()))?;

        if resolution.resource_id.trim().is_empty() {
            return Err(ImageServiceError::InvalidResponse(format!(
                "empty resource_uniq for {access_uri}"
            )));
        }

        Ok(resolution)
    }

    /// Retry a lookup with exponential backoff
    ///
    /// Only errors the service may recover from are retried.
    async fn retry_request<F, T, Fut>(
        &self,
        operation: F,
    ) -> std::result::Result<T, ImageServiceError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, ImageServiceError>>,
    {
        let retry = &self.config.retry;
        let max_retries = retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries || !e.is_retryable() {
                        return Err(e);
                    }

                    let delay_ms = (retry.initial_delay_ms as f64
                        * retry.backoff_multiplier.powi((attempt - 1) as i32))
                        as u64;
                    let delay_ms = delay_ms.min(retry.max_delay_ms);

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying image lookup after error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

#[async_trait]
impl ImageResolver for HttpImageResolver {
    async fn resolve(
        &self,
        access_uri: &str,
    ) -> std::result::Result<ImageResolution, ImageServiceError> {
        tracing::debug!(access_uri = %access_uri, "Resolving image access URI");
        self.retry_request(|| self.resolve_once(access_uri)).await
    }
}
