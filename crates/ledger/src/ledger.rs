//! The owned, serialized handle over the state document.
//!
//! Every operation takes the one mutex for its whole read-modify-persist
//! sequence, sweeps included, so no two mutations interleave. Mutations are
//! staged on a copy of the document; the copy replaces the live document only
//! once it is on disk, so memory and disk never disagree after a failed write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::cooldown::{CooldownSource, CooldownTable};
use crate::error::StoreError;
use crate::models::Document;
use crate::retention::RetentionPolicy;
use crate::services::{Notifier, RoleService};
use crate::store::DocumentStore;

/// Tunable behavior of a ledger.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    pub cooldown: CooldownSource,
    pub retention: RetentionPolicy,
}

pub(crate) struct State {
    pub(crate) document: Document,
    pub(crate) cooldowns: CooldownTable,
}

/// Cloneable handle; all clones share one document and one lock.
#[derive(Clone)]
pub struct Ledger {
    pub(crate) state: Arc<Mutex<State>>,
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) roles: Arc<dyn RoleService>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) policy: Policy,
}

impl Ledger {
    /// Load the stored document, creating and persisting an empty one if the
    /// store has none yet.
    pub async fn open(
        store: Arc<dyn DocumentStore>,
        roles: Arc<dyn RoleService>,
        notifier: Arc<dyn Notifier>,
        policy: Policy,
        now: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        let document = match store.load().await? {
            Some(document) => document,
            None => {
                let document = Document::new(now);
                store.persist(&document).await?;
                tracing::info!("created new state document");
                document
            }
        };

        if !document.counts_consistent() {
            tracing::warn!("lifetime counts disagree with the usage log");
        }

        tracing::info!(
            stock = document.stock.len(),
            used = document.used.len(),
            subscriptions = document.subscriptions.len(),
            log_entries = document.stats.logs.len(),
            "state document ready"
        );

        Ok(Self::new(document, store, roles, notifier, policy))
    }

    pub fn new(
        document: Document,
        store: Arc<dyn DocumentStore>,
        roles: Arc<dyn RoleService>,
        notifier: Arc<dyn Notifier>,
        policy: Policy,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                document,
                cooldowns: CooldownTable::new(),
            })),
            store,
            roles,
            notifier,
            policy,
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Copy of the live document.
    pub async fn snapshot(&self) -> Document {
        self.state.lock().await.document.clone()
    }

    /// Persist `staged` and make it the live document.
    pub(crate) async fn commit(
        &self,
        live: &mut Document,
        staged: Document,
    ) -> Result<(), StoreError> {
        self.store.persist(&staged).await?;
        *live = staged;
        Ok(())
    }
}
