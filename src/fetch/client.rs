use reqwest::Client;

use crate::config::ApiConfig;
use crate::error::{AppError, Context};

use super::request::{prepare_request, Endpoint};
use super::{FetchResult, Upstream};

/// `Upstream` over HTTP using a shared async reqwest client.
#[derive(Debug, Clone)]
pub struct FinnhubClient {
    api: ApiConfig,
    client: Client,
}

impl FinnhubClient {
    pub fn new(api: ApiConfig) -> FetchResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = api.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to construct HTTP client")?;
        Ok(Self { api, client })
    }

    async fn get(&self, endpoint: Endpoint, argument: &str, credential: &str) -> FetchResult<String> {
        let request = prepare_request(&self.api, endpoint, argument, credential)?;

        let response = self
            .client
            .get(request.url)
            .headers(request.headers)
            .send()
            .await
            .with_context(|| format!("{} request failed for `{}`", endpoint.name(), argument))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Status {
                resource: format!("{} `{}`", endpoint.name(), argument),
                status,
            });
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read {} body for `{}`", endpoint.name(), argument))?;
        Ok(body)
    }
}

impl Upstream for FinnhubClient {
    async fn quote(&self, symbol: &str, credential: &str) -> FetchResult<String> {
        self.get(Endpoint::Quote, symbol, credential).await
    }

    async fn search(&self, query: &str, credential: &str) -> FetchResult<String> {
        self.get(Endpoint::Search, query, credential).await
    }
}
