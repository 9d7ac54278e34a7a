use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service::catalog::RequestContext;
use tower_http::request_id::RequestId;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extractor for the per-request [`RequestContext`].
///
/// The id comes from the request-id layer, which reuses a client supplied
/// `X-Request-ID` or generates one.
pub struct Ctx(pub RequestContext);

fn request_id_of(parts: &Parts) -> Option<String> {
    if let Some(id) = parts.extensions.get::<RequestId>() {
        return id.header_value().to_str().ok().map(str::to_owned);
    }
    parts.headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()).map(str::to_owned)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Ctx {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Ctx(request_id_of(parts).map(RequestContext::new).unwrap_or_else(RequestContext::detached)))
    }
}
