//! Credential lifecycle.
//!
//! ```text
//!            save(ok)                delete()
//! Absent ──> Validating ──> Stored ───────────> Absent
//!              │
//!              └── save(err) ──> Absent
//! ```
//!
//! A credential found in storage at mount time is trusted and goes straight
//! to `Stored` without another round trip.

use std::fmt;

use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};

use tunnelscope_client::{ClientError, GatewayApi};

use crate::error::{CoreError, Result};
use crate::events::{CredentialCallback, CredentialEvent};
use crate::storage::{CREDENTIAL_KEY, KeyValueStore};

/// Shown when the gateway cannot be reached during validation.
pub const VALIDATE_UNREACHABLE: &str = "Failed to validate API Key.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Absent,
    Validating,
    Stored,
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Absent => "absent",
            Self::Validating => "validating",
            Self::Stored => "stored",
        };
        f.write_str(label)
    }
}

/// Reduces a gateway failure to the message shown next to the control.
pub(crate) fn describe_gateway_error(error: &ClientError, unreachable: &str) -> String {
    match error {
        ClientError::GatewayRejected { message, .. } => message.clone(),
        e if e.is_transport() => unreachable.to_string(),
        other => other.to_string(),
    }
}

/// Holds the status at `Validating` for the duration of a `save`.
///
/// If the save future is dropped before it settles, the status falls back
/// to `Absent` so the next attempt is not refused.
struct ValidatingGuard<'a> {
    status: &'a mut CredentialStatus,
    settled: bool,
}

impl<'a> ValidatingGuard<'a> {
    fn enter(status: &'a mut CredentialStatus) -> Self {
        *status = CredentialStatus::Validating;
        Self {
            status,
            settled: false,
        }
    }

    fn settle(mut self, outcome: CredentialStatus) {
        *self.status = outcome;
        self.settled = true;
    }
}

impl Drop for ValidatingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("Validation abandoned, credential back to absent");
            *self.status = CredentialStatus::Absent;
        }
    }
}

/// Holds the user's ngrok API key and its validation state.
///
/// Owns the only persisted copy of the credential.
pub struct CredentialStore<G, S> {
    gateway: G,
    storage: S,
    status: CredentialStatus,
    credential: Option<SecretString>,
    error: Option<String>,
    on_change: Option<CredentialCallback>,
}

impl<G, S> fmt::Debug for CredentialStore<G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("status", &self.status)
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<G: GatewayApi, S: KeyValueStore> CredentialStore<G, S> {
    /// Creates the store, adopting any credential already in `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if `storage` cannot be read.
    pub fn mount(gateway: G, storage: S) -> Result<Self> {
        let credential = storage
            .get(CREDENTIAL_KEY)?
            .filter(|key| !key.is_empty())
            .map(|key| SecretString::new(key.into()));

        let status = if credential.is_some() {
            debug!("Found stored credential, skipping validation");
            CredentialStatus::Stored
        } else {
            CredentialStatus::Absent
        };

        Ok(Self {
            gateway,
            storage,
            status,
            credential,
            error: None,
            on_change: None,
        })
    }

    /// Registers the holder notified when the credential is accepted or
    /// cleared.
    #[must_use]
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&CredentialEvent) + Send + Sync + 'static,
    {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub const fn status(&self) -> CredentialStatus {
        self.status
    }

    /// The accepted credential, present only while `Stored`.
    pub const fn credential(&self) -> Option<&SecretString> {
        self.credential.as_ref()
    }

    /// The message of the last failed `save`, cleared by the next attempt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether credential input should be read-only.
    ///
    /// An accepted credential is immutable; it must be deleted before a new
    /// one can be entered.
    pub const fn is_input_locked(&self) -> bool {
        matches!(
            self.status,
            CredentialStatus::Validating | CredentialStatus::Stored
        )
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn notify(&self, event: &CredentialEvent) {
        if let Some(callback) = &self.on_change {
            callback(event);
        }
    }

    /// Validates `candidate` with the gateway and persists it on success.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidTransition`] unless the store is `Absent`
    /// - [`CoreError::Gateway`] with a human-readable message if validation
    ///   fails; the candidate is not persisted
    /// - a storage error if the accepted candidate cannot be written
    pub async fn save(&mut self, candidate: &str) -> Result<()> {
        if self.status != CredentialStatus::Absent {
            return Err(CoreError::InvalidTransition {
                operation: "save",
                status: self.status,
            });
        }

        self.error = None;
        let validating = ValidatingGuard::enter(&mut self.status);
        debug!("Validating candidate credential ({} chars)", candidate.len());

        let candidate = SecretString::new(candidate.into());

        if let Err(e) = self.gateway.validate_key(&candidate).await {
            let message = describe_gateway_error(&e, VALIDATE_UNREACHABLE);
            warn!("Credential validation failed: {e}");
            self.error = Some(message.clone());
            validating.settle(CredentialStatus::Absent);
            return Err(CoreError::Gateway(message));
        }

        if let Err(e) = self.storage.set(CREDENTIAL_KEY, candidate.expose_secret()) {
            self.error = Some(e.to_string());
            validating.settle(CredentialStatus::Absent);
            return Err(e);
        }

        self.credential = Some(candidate.clone());
        validating.settle(CredentialStatus::Stored);
        info!("Credential validated and stored");

        self.notify(&CredentialEvent::Accepted(candidate));
        Ok(())
    }

    /// Forgets the credential, in storage and in memory.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidTransition`] unless the store is `Stored`
    /// - a storage error if the persisted copy cannot be removed, in which
    ///   case the store stays `Stored`
    pub fn delete(&mut self) -> Result<()> {
        if self.status != CredentialStatus::Stored {
            return Err(CoreError::InvalidTransition {
                operation: "delete",
                status: self.status,
            });
        }

        self.storage.remove(CREDENTIAL_KEY)?;

        self.credential = None;
        self.error = None;
        self.status = CredentialStatus::Absent;
        info!("Credential deleted");

        self.notify(&CredentialEvent::Cleared);
        Ok(())
    }
}
