use crate::config::{ApiKey, CredentialsConfig};
use crate::error::AtomlinkError;
use std::time::{Duration, Instant};
use tracing::info;

pub type SlotIndex = usize;

/// Slot every call prefers when it holds a key.
pub const PREFERRED_SLOT: SlotIndex = 0;

/// One position in the pool. A slot without a key is kept so indices stay stable.
#[derive(Debug, Clone)]
pub struct CredentialSlot {
    key: Option<ApiKey>,
}

impl CredentialSlot {
    pub fn new(key: Option<ApiKey>) -> Self {
        Self { key }
    }

    pub fn configured(key: ApiKey) -> Self {
        Self { key: Some(key) }
    }

    pub fn unconfigured() -> Self {
        Self { key: None }
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.key.is_some()
    }
}

/// The key a single call runs with, tagged with the slot it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialLease {
    pub slot: SlotIndex,
    pub api_key: ApiKey,
    /// Set when the key came from the pool's home slot, the first configured one.
    pub preferred: bool,
}

/// Point-in-time view of the pool, safe to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub active: SlotIndex,
    pub has_backup: bool,
    pub configured: usize,
    pub recovering: bool,
}

/// Ordered key pool with failover and timed recovery (no IO, no locks).
///
/// Time is passed in explicitly so the recovery window can be exercised
/// without sleeping.
#[derive(Debug)]
pub struct CredentialPool {
    slots: Vec<CredentialSlot>,
    home: SlotIndex,
    active: SlotIndex,
    recover_after: Option<Instant>,
    recovery_window: Duration,
}

impl CredentialPool {
    /// Starts on the first configured slot. Unset slots ahead of it are
    /// skipped for good; an all-unset pool stays on [`PREFERRED_SLOT`].
    pub fn new(slots: Vec<CredentialSlot>, recovery_window: Duration) -> Self {
        let home = slots
            .iter()
            .position(CredentialSlot::is_configured)
            .unwrap_or(PREFERRED_SLOT);
        Self {
            slots,
            home,
            active: home,
            recover_after: None,
            recovery_window,
        }
    }

    pub fn from_config(cfg: &CredentialsConfig) -> Self {
        let slots = cfg.ordered().into_iter().map(CredentialSlot::new).collect();
        Self::new(slots, cfg.recovery_window())
    }

    pub fn active_index(&self) -> SlotIndex {
        self.active
    }

    /// First configured slot; the one recovery returns to.
    pub fn home_index(&self) -> SlotIndex {
        self.home
    }

    /// Whether the slot after the active one holds a usable key.
    pub fn has_backup(&self) -> bool {
        self.slots
            .get(self.active + 1)
            .is_some_and(CredentialSlot::is_configured)
    }

    pub fn configured_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_configured()).count()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            active: self.active,
            has_backup: self.has_backup(),
            configured: self.configured_count(),
            recovering: self.recover_after.is_some(),
        }
    }

    /// Returns the key to use now, snapping back to the home slot once
    /// the recovery deadline has passed.
    ///
    /// Fails with [`AtomlinkError::NoCredentialsAvailable`] only when no slot
    /// holds a key.
    pub fn acquire_active_at(&mut self, now: Instant) -> Result<CredentialLease, AtomlinkError> {
        if self.active != self.home
            && self.recover_after.is_some_and(|deadline| now >= deadline)
        {
            info!(
                from = self.active,
                to = self.home,
                "Recovery window elapsed, returning to preferred key"
            );
            self.active = self.home;
            self.recover_after = None;
        }

        self.lease(self.active)
            .ok_or(AtomlinkError::NoCredentialsAvailable)
    }

    pub fn acquire_active(&mut self) -> Result<CredentialLease, AtomlinkError> {
        self.acquire_active_at(Instant::now())
    }

    /// Moves to the next slot and arms the recovery deadline.
    ///
    /// Leaves the pool untouched when the next slot is missing or unconfigured.
    pub fn failover_at(&mut self, now: Instant) -> Result<CredentialLease, AtomlinkError> {
        let next = self.active + 1;
        let lease = self.lease(next).ok_or(AtomlinkError::NoBackupAvailable)?;

        info!(
            from = self.active,
            to = next,
            recovery_secs = self.recovery_window.as_secs(),
            "Failing over to backup key"
        );
        self.active = next;
        self.recover_after = Some(now + self.recovery_window);
        Ok(lease)
    }

    pub fn failover(&mut self) -> Result<CredentialLease, AtomlinkError> {
        self.failover_at(Instant::now())
    }

    /// Fails over only if the pool is still on `observed`.
    ///
    /// Concurrent callers that saw the same rate limit get the already
    /// promoted key instead of pushing the pool further down the list.
    pub fn failover_from_at(
        &mut self,
        observed: SlotIndex,
        now: Instant,
    ) -> Result<CredentialLease, AtomlinkError> {
        if self.active != observed {
            return self
                .lease(self.active)
                .ok_or(AtomlinkError::NoBackupAvailable);
        }
        self.failover_at(now)
    }

    fn lease(&self, slot: SlotIndex) -> Option<CredentialLease> {
        let key = self.slots.get(slot)?.key.clone()?;
        Some(CredentialLease {
            slot,
            api_key: key,
            preferred: slot == self.home,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    fn make_pool(keys: &[Option<&str>]) -> CredentialPool {
        let slots = keys
            .iter()
            .map(|k| CredentialSlot::new(k.map(ApiKey::new)))
            .collect();
        CredentialPool::new(slots, WINDOW)
    }

    #[test]
    fn acquire_prefers_first_slot() {
        let mut pool = make_pool(&[Some("k1"), Some("k2")]);
        let lease = pool.acquire_active_at(Instant::now()).unwrap();
        assert_eq!(lease.slot, PREFERRED_SLOT);
        assert_eq!(lease.api_key.expose(), "k1");
        assert!(pool.has_backup());
    }

    #[test]
    fn unset_primary_leases_first_configured_slot() {
        let mut pool = make_pool(&[None, Some("k2")]);
        let lease = pool.acquire_active_at(Instant::now()).unwrap();
        assert_eq!(lease.slot, 1);
        assert_eq!(lease.api_key.expose(), "k2");
        assert!(lease.preferred);
        assert_eq!(pool.home_index(), 1);
        assert!(!pool.has_backup());
        assert!(matches!(
            pool.failover_at(Instant::now()),
            Err(AtomlinkError::NoBackupAvailable)
        ));
    }

    #[test]
    fn setup_error_only_when_no_slot_is_configured() {
        let mut empty = CredentialPool::new(Vec::new(), WINDOW);
        assert!(matches!(
            empty.acquire_active_at(Instant::now()),
            Err(AtomlinkError::NoCredentialsAvailable)
        ));

        let mut all_unset = make_pool(&[None, None]);
        assert!(matches!(
            all_unset.acquire_active_at(Instant::now()),
            Err(AtomlinkError::NoCredentialsAvailable)
        ));
        assert_eq!(all_unset.active_index(), PREFERRED_SLOT);
    }

    #[test]
    fn recovery_returns_to_first_configured_slot() {
        let start = Instant::now();
        let mut pool = make_pool(&[None, Some("k2"), Some("k3")]);

        let backup = pool.failover_at(start).unwrap();
        assert_eq!(backup.slot, 2);
        assert!(!backup.preferred);

        let after = pool.acquire_active_at(start + WINDOW).unwrap();
        assert_eq!(after.slot, 1);
        assert!(after.preferred);
    }

    #[test]
    fn failover_moves_to_backup_and_recovers_after_window() {
        let start = Instant::now();
        let mut pool = make_pool(&[Some("k1"), Some("k2")]);

        let lease = pool.failover_at(start).unwrap();
        assert_eq!(lease.slot, 1);
        assert!(!lease.preferred);
        assert_eq!(pool.active_index(), 1);
        assert!(!pool.has_backup());

        let during = pool.acquire_active_at(start + Duration::from_secs(59)).unwrap();
        assert_eq!(during.slot, 1);

        let after = pool.acquire_active_at(start + WINDOW).unwrap();
        assert_eq!(after.slot, PREFERRED_SLOT);
        assert_eq!(pool.active_index(), PREFERRED_SLOT);
        assert!(!pool.snapshot().recovering);
    }

    #[test]
    fn failover_without_backup_leaves_pool_unchanged() {
        let mut pool = make_pool(&[Some("k1")]);
        assert!(!pool.has_backup());
        let err = pool.failover_at(Instant::now()).unwrap_err();
        assert!(matches!(err, AtomlinkError::NoBackupAvailable));
        assert_eq!(pool.active_index(), PREFERRED_SLOT);

        let mut blank_backup = make_pool(&[Some("k1"), None]);
        assert!(blank_backup.failover_at(Instant::now()).is_err());
        assert_eq!(blank_backup.active_index(), PREFERRED_SLOT);
    }

    #[test]
    fn failover_at_end_of_list_fails() {
        let mut pool = make_pool(&[Some("k1"), Some("k2")]);
        pool.failover_at(Instant::now()).unwrap();
        assert!(matches!(
            pool.failover_at(Instant::now()),
            Err(AtomlinkError::NoBackupAvailable)
        ));
        assert_eq!(pool.active_index(), 1);
    }

    #[test]
    fn failover_from_stale_index_returns_current_lease() {
        let now = Instant::now();
        let mut pool = make_pool(&[Some("k1"), Some("k2")]);

        let first = pool.failover_from_at(PREFERRED_SLOT, now).unwrap();
        let second = pool.failover_from_at(PREFERRED_SLOT, now).unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.active_index(), 1);
    }

    #[test]
    fn from_config_keeps_slot_order() {
        let cfg = CredentialsConfig {
            primary: None,
            secondary: Some(ApiKey::new("k2")),
            recovery_window_secs: 5,
        };
        let pool = CredentialPool::from_config(&cfg);
        let snap = pool.snapshot();
        assert_eq!(snap.configured, 1);
        assert_eq!(snap.active, 1);
        assert!(!snap.has_backup);

        let both = CredentialPool::from_config(&CredentialsConfig {
            primary: Some(ApiKey::new("k1")),
            ..cfg
        });
        assert_eq!(both.active_index(), PREFERRED_SLOT);
        assert!(both.has_backup());
    }
}
