//! Shared test utilities for ledger tests.
//!
//! `TestLedgerBuilder` constructs a `Ledger` over mocked collaborators, so
//! each test only configures the mocks it cares about.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::test_utils::{TestLedgerBuilder, at, subscription};
//!
//! let mut roles = MockRoleService::new();
//! roles.expect_revoke_role().times(1).returning(|_| Ok(()));
//!
//! let ledger = TestLedgerBuilder::new()
//!     .with_document(doc)
//!     .with_roles(roles)
//!     .build();
//! ```

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::ledger::{Ledger, Policy};
use crate::models::{Document, Subscription, UserId};
use crate::services::{MockNotifier, MockRoleService};
use crate::store::MockDocumentStore;

/// `secs` seconds after the epoch.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// A subscription for `user` with no cooldown of its own.
pub fn subscription(user: u64, expires_at: DateTime<Utc>) -> Subscription {
    Subscription {
        user_id: UserId::from(user),
        expires_at,
        cooldown: 0,
    }
}

/// Builder for a test `Ledger` with custom mocks.
///
/// Defaults: an empty document, a store that accepts every persist, a
/// notifier that accepts every notice, and a role service with no
/// expectations (any role call fails the test).
#[derive(Default)]
pub struct TestLedgerBuilder {
    document: Option<Document>,
    store: Option<MockDocumentStore>,
    roles: Option<MockRoleService>,
    notifier: Option<MockNotifier>,
    policy: Policy,
}

impl TestLedgerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_store(mut self, store: MockDocumentStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_roles(mut self, roles: MockRoleService) -> Self {
        self.roles = Some(roles);
        self
    }

    pub fn with_notifier(mut self, notifier: MockNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Ledger {
        let store = self.store.unwrap_or_else(|| {
            let mut store = MockDocumentStore::new();
            store.expect_persist().returning(|_| Ok(()));
            store
        });
        let notifier = self.notifier.unwrap_or_else(|| {
            let mut notifier = MockNotifier::new();
            notifier.expect_notify_user().returning(|_, _| Ok(()));
            notifier
        });

        Ledger::new(
            self.document.unwrap_or_default(),
            Arc::new(store),
            Arc::new(self.roles.unwrap_or_default()),
            Arc::new(notifier),
            self.policy,
        )
    }
}
