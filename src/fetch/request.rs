use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Url;

use crate::config::ApiConfig;
use crate::error::{AppError, Context};

use super::FetchResult;

const CLIENT_USER_AGENT: &str = concat!("ticker-board/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Quote,
    Search,
}

impl Endpoint {
    fn query_param(self) -> &'static str {
        match self {
            Endpoint::Quote => "symbol",
            Endpoint::Search => "q",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Quote => "quote",
            Endpoint::Search => "search",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub url: Url,
    pub headers: HeaderMap,
}

/// Build the URL and headers for one upstream call. The credential travels as the `token`
/// query parameter.
pub fn prepare_request(
    api: &ApiConfig,
    endpoint: Endpoint,
    argument: &str,
    credential: &str,
) -> FetchResult<PreparedRequest> {
    if credential.trim().is_empty() {
        return Err(AppError::message("Missing API credential"));
    }

    let path = match endpoint {
        Endpoint::Quote => &api.quote_path,
        Endpoint::Search => &api.search_path,
    };
    let base = format!("{}{}", api.base_url.trim_end_matches('/'), path);
    let url = Url::parse_with_params(
        &base,
        &[(endpoint.query_param(), argument), ("token", credential)],
    )
    .with_context(|| format!("Invalid {} endpoint URL: {}", endpoint.name(), base))?;

    Ok(PreparedRequest {
        url,
        headers: default_headers(),
    })
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    headers
}
