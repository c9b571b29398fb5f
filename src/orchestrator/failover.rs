use super::credentials::{CredentialLease, CredentialPoolHandle};
use crate::error::AtomlinkError;
use std::future::Future;
use tracing::{info, warn};

/// Runs `next` with the pool's active key. A rate limit on the preferred key
/// moves the pool to its backup and reruns `next` once.
///
/// Without a usable backup, or when the rate-limited key was already a
/// backup, the original error is returned unchanged.
pub async fn with_credential_failover<T, F, Fut>(
    pool: &CredentialPoolHandle,
    mut next: F,
) -> Result<T, AtomlinkError>
where
    F: FnMut(CredentialLease) -> Fut,
    Fut: Future<Output = Result<T, AtomlinkError>>,
{
    let lease = pool.acquire_active().await?;
    let slot = lease.slot;
    let preferred = lease.preferred;

    let err = match next(lease).await {
        Ok(value) => return Ok(value),
        Err(err) if err.is_rate_limited() && preferred => err,
        Err(err) => return Err(err),
    };

    let backup = match pool.failover_from(slot).await {
        Ok(backup) => backup,
        Err(AtomlinkError::NoBackupAvailable) => {
            warn!(slot, "Preferred key rate limited and no backup key is configured");
            return Err(err);
        }
        Err(other) => return Err(other),
    };

    info!(from = slot, to = backup.slot, "Preferred key rate limited, rerunning on backup key");
    next(backup).await
}
