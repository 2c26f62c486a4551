//! External identity-provider seam.
//!
//! Player deletion is a two-phase operation: the club's identity
//! directory must confirm removal before the local record goes away.
//! The engine consults this trait first and refuses to touch local state
//! when the provider fails, so a provider outage never strands a player
//! half-deleted.

use crate::error::Result;

/// Removal hook for the external identity directory.
///
/// Implementations should be idempotent: deleting an already-absent
/// account must succeed.
pub trait IdentityProvider: Send + Sync {
    fn remove_account(&self, player_id: &str) -> Result<()>;
}

/// Provider for deployments without an external directory; always
/// confirms removal.
#[derive(Debug, Default)]
pub struct NullIdentityProvider;

impl IdentityProvider for NullIdentityProvider {
    fn remove_account(&self, _player_id: &str) -> Result<()> {
        Ok(())
    }
}
