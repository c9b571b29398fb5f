mod actor;
mod pool;

pub use actor::{CredentialPoolHandle, CredentialPoolMessage};
pub use pool::{
    CredentialLease, CredentialPool, CredentialSlot, PREFERRED_SLOT, PoolSnapshot, SlotIndex,
};
