//! Entitlement gate.
//!
//! Decides whether an account may create another application. The check
//! is fail-secure: any error while reading the account or counting its
//! applications results in a denial, never in exception propagation or
//! a silent allow. The snapshot is read fresh on every call so a plan
//! change between two ingestions takes effect immediately.

use log::{debug, warn};
use serde::Serialize;

use crate::db::{account_repo, application_repo, Database, DatabaseError};

/// Limit assigned to free-tier accounts at signup. A `NULL` plan limit
/// means unlimited.
pub const DEFAULT_FREE_LIMIT: i64 = 25;

/// Usage and limit read fresh for one decision.
#[derive(Debug, Clone, Copy)]
pub struct EntitlementSnapshot {
    pub plan_limit: Option<i64>,
    pub current_count: u64,
}

/// Outcome of one entitlement check.
#[derive(Debug, Clone, Serialize)]
pub struct EntitlementDecision {
    pub allowed: bool,
    /// Populated on denial, e.g. `"limit_reached"` or
    /// `"entitlement_check_failed"`.
    pub reason: Option<String>,
    pub current_count: u64,
    pub limit: Option<i64>,
}

pub struct EntitlementGate {
    db: Database,
}

impl EntitlementGate {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Decides whether `account_id` may create another application.
    /// Never returns an error; failures deny.
    pub fn can_create(&self, account_id: &str) -> EntitlementDecision {
        match self.snapshot(account_id) {
            Ok(snapshot) => decide(snapshot),
            Err(err) => {
                warn!("Entitlement check failed for account {account_id}, denying: {err}");
                EntitlementDecision {
                    allowed: false,
                    reason: Some("entitlement_check_failed".to_string()),
                    current_count: 0,
                    limit: None,
                }
            }
        }
    }

    /// Reads the account's limit and current application count. An
    /// unregistered account gets the free-tier limit rather than an
    /// error; only actual read faults propagate.
    fn snapshot(&self, account_id: &str) -> Result<EntitlementSnapshot, DatabaseError> {
        let plan_limit = match account_repo::find_by_id(&self.db, account_id)? {
            Some(account) => account.plan_limit,
            None => {
                debug!("Account {account_id} not registered, assuming free-tier limit");
                Some(DEFAULT_FREE_LIMIT)
            }
        };
        let current_count = application_repo::count_by_account(&self.db, account_id)?;
        Ok(EntitlementSnapshot {
            plan_limit,
            current_count,
        })
    }
}

fn decide(snapshot: EntitlementSnapshot) -> EntitlementDecision {
    let allowed = match snapshot.plan_limit {
        None => true,
        Some(limit) => (snapshot.current_count as i64) < limit,
    };
    if !allowed {
        debug!(
            "Application limit reached: {}/{:?}",
            snapshot.current_count, snapshot.plan_limit
        );
    }
    EntitlementDecision {
        allowed,
        reason: (!allowed).then(|| "limit_reached".to_string()),
        current_count: snapshot.current_count,
        limit: snapshot.plan_limit,
    }
}
