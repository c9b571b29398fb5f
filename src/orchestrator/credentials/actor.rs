use super::pool::{CredentialLease, CredentialPool, PoolSnapshot, SlotIndex};
use crate::error::AtomlinkError;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::time::Instant;
use tracing::{debug, info};

/// Messages handled by the credential pool actor.
#[derive(Debug)]
pub enum CredentialPoolMessage {
    /// Current key, after applying any elapsed recovery window.
    AcquireActive(RpcReplyPort<Result<CredentialLease, AtomlinkError>>),
    /// Fail over if the pool is still on the given slot.
    FailoverFrom(SlotIndex, RpcReplyPort<Result<CredentialLease, AtomlinkError>>),
    Snapshot(RpcReplyPort<PoolSnapshot>),
}

/// Shared handle to one credential pool.
///
/// Every clone talks to the same actor, so failover done by one call is
/// seen by all others.
#[derive(Clone)]
pub struct CredentialPoolHandle {
    actor: ActorRef<CredentialPoolMessage>,
}

impl CredentialPoolHandle {
    pub async fn spawn(pool: CredentialPool) -> Result<Self, AtomlinkError> {
        let (actor, _jh) = Actor::spawn(None, CredentialPoolActor, pool)
            .await
            .map_err(|e| AtomlinkError::Ractor(format!("failed to spawn credential pool: {e}")))?;
        Ok(Self { actor })
    }

    pub async fn acquire_active(&self) -> Result<CredentialLease, AtomlinkError> {
        ractor::call!(self.actor, CredentialPoolMessage::AcquireActive)
            .map_err(|e| AtomlinkError::Ractor(format!("AcquireActive RPC failed: {e}")))?
    }

    pub async fn failover_from(&self, observed: SlotIndex) -> Result<CredentialLease, AtomlinkError> {
        ractor::call!(self.actor, CredentialPoolMessage::FailoverFrom, observed)
            .map_err(|e| AtomlinkError::Ractor(format!("FailoverFrom RPC failed: {e}")))?
    }

    pub async fn snapshot(&self) -> Result<PoolSnapshot, AtomlinkError> {
        ractor::call!(self.actor, CredentialPoolMessage::Snapshot)
            .map_err(|e| AtomlinkError::Ractor(format!("Snapshot RPC failed: {e}")))
    }

    pub async fn active_index(&self) -> Result<SlotIndex, AtomlinkError> {
        self.snapshot().await.map(|s| s.active)
    }

    pub async fn has_backup(&self) -> Result<bool, AtomlinkError> {
        self.snapshot().await.map(|s| s.has_backup)
    }
}

struct CredentialPoolActor;

#[ractor::async_trait]
impl Actor for CredentialPoolActor {
    type Msg = CredentialPoolMessage;
    type State = CredentialPool;
    type Arguments = CredentialPool;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        pool: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let snapshot = pool.snapshot();
        info!(
            configured = snapshot.configured,
            has_backup = snapshot.has_backup,
            "Credential pool ready"
        );
        Ok(pool)
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        pool: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            CredentialPoolMessage::AcquireActive(rp) => {
                let lease = pool.acquire_active_at(Instant::now());
                if let Ok(lease) = &lease {
                    debug!(slot = lease.slot, "Credential leased");
                }
                let _ = rp.send(lease);
            }
            CredentialPoolMessage::FailoverFrom(observed, rp) => {
                let _ = rp.send(pool.failover_from_at(observed, Instant::now()));
            }
            CredentialPoolMessage::Snapshot(rp) => {
                let _ = rp.send(pool.snapshot());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;
    use crate::orchestrator::credentials::{CredentialSlot, PREFERRED_SLOT};
    use std::time::Duration;

    fn two_key_pool() -> CredentialPool {
        CredentialPool::new(
            vec![
                CredentialSlot::configured(ApiKey::new("k1")),
                CredentialSlot::configured(ApiKey::new("k2")),
            ],
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn handle_shares_failover_state_across_clones() {
        let handle = CredentialPoolHandle::spawn(two_key_pool()).await.unwrap();
        let other = handle.clone();

        assert_eq!(handle.acquire_active().await.unwrap().slot, PREFERRED_SLOT);
        assert!(handle.has_backup().await.unwrap());

        let lease = handle.failover_from(PREFERRED_SLOT).await.unwrap();
        assert_eq!(lease.slot, 1);
        assert_eq!(other.active_index().await.unwrap(), 1);

        // A second caller reporting the same slot does not move the pool again.
        let again = other.failover_from(PREFERRED_SLOT).await.unwrap();
        assert_eq!(again.slot, 1);
        assert_eq!(handle.acquire_active().await.unwrap().api_key.expose(), "k2");
    }

    #[tokio::test]
    async fn empty_pool_reports_setup_error() {
        let pool = CredentialPool::new(vec![CredentialSlot::unconfigured()], Duration::from_secs(60));
        let handle = CredentialPoolHandle::spawn(pool).await.unwrap();
        assert!(matches!(
            handle.acquire_active().await,
            Err(AtomlinkError::NoCredentialsAvailable)
        ));
    }
}
