use crate::error::AtomlinkError;
use atomlink_schema::GenerateContentRequest;
use std::future::Future;
use tracing::{info, warn};

/// Runs `next` with the full request and, if that fails for any reason other
/// than a rate limit, once more with every tool removed.
///
/// Rate limits are handed back untouched so the caller can fail over to
/// another key. Errors from the tool-less attempt are translated with
/// [`AtomlinkError::into_user_facing`].
pub async fn with_capability_fallback<T, F, Fut>(
    request: &GenerateContentRequest,
    mut next: F,
) -> Result<T, AtomlinkError>
where
    F: FnMut(GenerateContentRequest) -> Fut,
    Fut: Future<Output = Result<T, AtomlinkError>>,
{
    let err = match next(request.clone()).await {
        Ok(value) => return Ok(value),
        Err(err) if err.is_rate_limited() => return Err(err),
        Err(err) => err,
    };

    warn!(
        status = ?err.upstream_status(),
        "Full-capability request failed, retrying without tools: {err}"
    );

    match next(request.without_tools()).await {
        Ok(value) => {
            info!("Degraded request without tools succeeded");
            Ok(value)
        }
        Err(err) if err.is_rate_limited() => Err(err),
        Err(err) => Err(err.into_user_facing()),
    }
}
