//! Single-slot relay that survives a full navigation away from the app.
//!
//! A record is written right before the browser leaves for the payment
//! provider and taken (read + deleted) when the browser comes back. There is
//! at most one record per slot. A record left behind by an abandoned flow
//! stays until the next write replaces it or the session scope is cleared.

use super::store::StateStore;
use crate::error::{ConsoleError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    id: Uuid,
    written_at: DateTime<Utc>,
    payload: T,
}

/// Identity of a stored record, readable without decoding the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffMeta {
    pub id: Uuid,
    pub written_at: DateTime<Utc>,
}

pub struct PendingHandoff<T> {
    store: Arc<dyn StateStore>,
    key: String,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Clone for PendingHandoff<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key.clone(),
            _payload: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> PendingHandoff<T> {
    pub fn new(store: Arc<dyn StateStore>, namespace: &str, slot: &str) -> Self {
        Self {
            store,
            key: format!("{namespace}:handoff:{slot}"),
            _payload: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Store `payload`, replacing whatever was pending.
    pub fn write(&self, payload: &T) -> Result<HandoffMeta> {
        if let Some(stale) = self.meta()? {
            tracing::warn!(
                "Replacing pending handoff {} written at {}",
                stale.id,
                stale.written_at
            );
        }

        let envelope = Envelope {
            id: Uuid::new_v4(),
            written_at: Utc::now(),
            payload,
        };
        let json = serde_json::to_string(&envelope)
            .map_err(|e| ConsoleError::decode("handoff record", e))?;
        self.store.set(&self.key, &json)?;

        tracing::debug!("Pending handoff {} written to {}", envelope.id, self.key);
        Ok(HandoffMeta {
            id: envelope.id,
            written_at: envelope.written_at,
        })
    }

    /// Read the pending record and delete it.
    ///
    /// The slot is emptied before decoding, so an unreadable record is dropped
    /// rather than handed back again on the next call.
    pub fn take(&self) -> Result<Option<T>> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        self.store.remove(&self.key)?;

        match serde_json::from_str::<Envelope<T>>(&raw) {
            Ok(envelope) => {
                tracing::debug!("Pending handoff {} taken from {}", envelope.id, self.key);
                Ok(Some(envelope.payload))
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable handoff record in {}: {}", self.key, e);
                Ok(None)
            }
        }
    }

    pub fn is_pending(&self) -> Result<bool> {
        Ok(self.store.get(&self.key)?.is_some())
    }

    /// Id and timestamp of the pending record, if any.
    pub fn meta(&self) -> Result<Option<HandoffMeta>> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        Ok(serde_json::from_str::<HandoffMeta>(&raw).ok())
    }

    /// Drop the pending record without reading it. Returns whether one existed.
    pub fn discard(&self) -> Result<bool> {
        let existed = self.is_pending()?;
        if existed {
            self.store.remove(&self.key)?;
        }
        Ok(existed)
    }
}
