use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ApiError;

/// Appends percent-encoded path segments to the configured base address.
/// Labels and filenames are user-controlled, so they always travel as single
/// encoded segments.
pub(crate) fn endpoint(base_url: &Url, segments: &[&str]) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Sends the request and hands back the response if the status is 2xx; a
/// non-2xx status becomes [`ApiError::Server`] with the body read as text.
pub(crate) async fn expect_success(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Server { status, body });
    }
    Ok(response)
}

/// Sends the request and decodes a 2xx JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = expect_success(request).await?;
    Ok(response.json().await?)
}
