//! Notifications emitted by the credential store.
//!
//! The holder of the credential (typically whatever owns the
//! [`TunnelFetcher`](crate::TunnelFetcher)) learns about accepted and cleared
//! credentials through a [`CredentialCallback`]. Events are fire-and-forget;
//! the store does not wait on or react to the callback.

use secrecy::SecretString;

/// Change to the held credential.
#[derive(Debug, Clone)]
pub enum CredentialEvent {
    /// A candidate passed validation and was persisted.
    Accepted(SecretString),

    /// The credential was deleted from storage and memory.
    Cleared,
}

/// Callback receiving credential events.
pub type CredentialCallback = Box<dyn Fn(&CredentialEvent) + Send + Sync>;
