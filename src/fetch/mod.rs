use std::future::Future;

use crate::error::Result;

pub mod client;
pub mod decode;
pub mod request;

pub use client::FinnhubClient;
pub use decode::{decode_quote, decode_search};
pub use request::{prepare_request, Endpoint, PreparedRequest};

pub type FetchResult<T> = Result<T>;

/// Raw access to the market-data API. Implementations return the response body of a
/// successful (2xx) call; status and transport failures surface as errors.
pub trait Upstream: Send + Sync {
    fn quote(
        &self,
        symbol: &str,
        credential: &str,
    ) -> impl Future<Output = FetchResult<String>> + Send;

    fn search(
        &self,
        query: &str,
        credential: &str,
    ) -> impl Future<Output = FetchResult<String>> + Send;
}
